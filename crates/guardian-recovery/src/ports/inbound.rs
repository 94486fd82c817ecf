//! # Driving Ports (API - Inbound)
//!
//! The public operation surface of the recovery ledger.
//!
//! Every mutating call takes the authenticated `caller` as its first
//! argument; payloads never carry identity of their own.
//!
//! | Operation | Caller requirement |
//! |-----------|--------------------|
//! | `register_record` | any (becomes owner) |
//! | `set_guardians` | any (own profile) |
//! | `initiate_recovery` | any |
//! | `endorse_recovery` | guardian of the record |
//! | `complete_recovery` | any |
//! | `pause_record` / `reactivate_record` | administrator |
//! | reads | any |

use crate::domain::entities::{
    Endorsement, GuardianProfile, Record, RecoveryRequest, RecoveryStatus,
};
use crate::domain::value_objects::{EncryptedMetadata, Principal, RecordId, RequestId};
use crate::errors::RecoveryError;

/// Primary API of the recovery ledger.
pub trait GuardianRecoveryApi: Send + Sync {
    // === Record Registry ===

    /// Register (or silently overwrite) a record owned by `caller`.
    ///
    /// # Errors
    ///
    /// * `InvalidGuardianConfig` - guardian count not in 3..=10, threshold not
    ///   in 2..=guardians, or a guardian listed twice
    /// * `MetadataTooLarge` - metadata over 256 bytes
    /// * `RecordAlreadyExists` - only when overwrites are rejected by config
    fn register_record(
        &self,
        caller: Principal,
        record_id: RecordId,
        metadata: EncryptedMetadata,
        guardians: Vec<Principal>,
        threshold: u8,
    ) -> Result<RecordId, RecoveryError>;

    /// Look up a record.
    fn get_record(&self, record_id: &RecordId) -> Result<Option<Record>, RecoveryError>;

    // === Guardian Directory ===

    /// Store `caller`'s default guardian profile, replacing any prior one.
    ///
    /// # Errors
    ///
    /// * `InvalidGuardianConfig` - same rules as `register_record`
    fn set_guardians(
        &self,
        caller: Principal,
        guardians: Vec<Principal>,
        threshold: u8,
    ) -> Result<(), RecoveryError>;

    /// Look up a guardian profile.
    fn get_guardian_profile(
        &self,
        principal: &Principal,
    ) -> Result<Option<GuardianProfile>, RecoveryError>;

    // === Recovery Request Ledger ===

    /// Open a recovery request proposing `new_owner`.
    ///
    /// # Errors
    ///
    /// * `RecordNotFound`
    /// * `RecordInactive` - record paused by the administrator
    fn initiate_recovery(
        &self,
        caller: Principal,
        record_id: RecordId,
        new_owner: Principal,
    ) -> Result<RequestId, RecoveryError>;

    /// Record `caller`'s endorsement and return the new count.
    ///
    /// # Errors
    ///
    /// Checked in this order: `RequestNotFound`, `RequestExpired`,
    /// `AlreadyCompleted`, `NotAGuardian`, `DuplicateEndorsement`,
    /// `CapacityExceeded`.
    fn endorse_recovery(
        &self,
        caller: Principal,
        request_id: RequestId,
    ) -> Result<u8, RecoveryError>;

    /// Transfer ownership and return the new owner.
    ///
    /// # Errors
    ///
    /// Checked in this order: `RequestNotFound`, `RecordNotFound`,
    /// `RequestExpired`, `AlreadyCompleted`, `InsufficientEndorsements`.
    fn complete_recovery(
        &self,
        caller: Principal,
        request_id: RequestId,
    ) -> Result<Principal, RecoveryError>;

    /// Look up a request.
    fn get_request(
        &self,
        request_id: &RequestId,
    ) -> Result<Option<RecoveryRequest>, RecoveryError>;

    /// Derived status of a request, or None if either the request or its
    /// record is missing.
    fn get_status(&self, request_id: &RequestId) -> Result<Option<RecoveryStatus>, RecoveryError>;

    // === Endorsement Registry ===

    /// Whether `guardian` endorsed `request_id`.
    fn has_endorsed(
        &self,
        request_id: &RequestId,
        guardian: &Principal,
    ) -> Result<bool, RecoveryError>;

    /// The endorsement entry for the pair, if any.
    fn get_endorsement(
        &self,
        request_id: &RequestId,
        guardian: &Principal,
    ) -> Result<Option<Endorsement>, RecoveryError>;

    // === Administrative Guard ===

    /// Block new recovery initiation for a record.
    ///
    /// # Errors
    ///
    /// * `NotAuthorized` - caller is not the administrator
    /// * `RecordNotFound`
    fn pause_record(&self, caller: Principal, record_id: RecordId) -> Result<(), RecoveryError>;

    /// Allow recovery initiation again.
    ///
    /// # Errors
    ///
    /// * `NotAuthorized` - caller is not the administrator
    /// * `RecordNotFound`
    fn reactivate_record(
        &self,
        caller: Principal,
        record_id: RecordId,
    ) -> Result<(), RecoveryError>;
}

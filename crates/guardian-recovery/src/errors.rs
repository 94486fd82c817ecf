//! # Error Types
//!
//! All error types for the recovery ledger.
//!
//! Every operation validates completely before it writes, so any error
//! returned here means nothing was committed.

use crate::domain::value_objects::{Principal, RecordId, RequestId};
use serde::Serialize;
use thiserror::Error;

// =============================================================================
// RECOVERY ERRORS
// =============================================================================

/// Errors returned by ledger operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecoveryError {
    /// Guardian count or threshold outside the allowed range.
    #[error("invalid guardian config: {reason}")]
    InvalidGuardianConfig { reason: String },

    /// Metadata payload exceeds the size bound.
    #[error("metadata too large: {size} > {max} bytes")]
    MetadataTooLarge { size: usize, max: usize },

    /// Record id already registered and overwrites are rejected.
    #[error("record already exists: {0}")]
    RecordAlreadyExists(RecordId),

    /// Record not registered.
    #[error("record not found: {0}")]
    RecordNotFound(RecordId),

    /// Record paused by the administrator.
    #[error("record inactive: {0}")]
    RecordInactive(RecordId),

    /// Request id unknown.
    #[error("recovery request not found: {0}")]
    RequestNotFound(RequestId),

    /// Deadline reached.
    #[error("recovery request expired at tick {expires_at} (now {now})")]
    RequestExpired { expires_at: u64, now: u64 },

    /// Request already completed.
    #[error("recovery request already completed: {0}")]
    AlreadyCompleted(RequestId),

    /// Caller is not in the record's guardian list.
    #[error("caller {0} is not a guardian of the record")]
    NotAGuardian(Principal),

    /// Guardian already endorsed this request.
    #[error("guardian {guardian} already endorsed request {request}")]
    DuplicateEndorsement {
        request: RequestId,
        guardian: Principal,
    },

    /// Endorser list is full.
    #[error("endorsement capacity exceeded: {max}")]
    CapacityExceeded { max: usize },

    /// Threshold not met.
    #[error("insufficient endorsements: {collected} < {required}")]
    InsufficientEndorsements { collected: u8, required: u8 },

    /// Caller lacks the administrator role.
    #[error("caller {0} is not authorized")]
    NotAuthorized(Principal),

    /// Malformed caller input not covered by a more specific variant.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Storage backend failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Environment contract breach (should not happen in production).
    #[error("internal error: {0}")]
    Internal(String),
}

impl RecoveryError {
    /// Taxonomy bucket for this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidGuardianConfig { .. } => ErrorKind::InvalidConfig,
            Self::MetadataTooLarge { .. } | Self::RecordAlreadyExists(_) | Self::InvalidInput(_) => {
                ErrorKind::InvalidInput
            }
            Self::RecordNotFound(_) | Self::RequestNotFound(_) => ErrorKind::NotFound,
            Self::RecordInactive(_) => ErrorKind::Inactive,
            Self::RequestExpired { .. } => ErrorKind::Expired,
            Self::AlreadyCompleted(_) => ErrorKind::AlreadyCompleted,
            Self::NotAGuardian(_) | Self::NotAuthorized(_) => ErrorKind::NotAuthorized,
            Self::DuplicateEndorsement { .. } => ErrorKind::DuplicateEndorsement,
            Self::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            Self::InsufficientEndorsements { .. } => ErrorKind::InsufficientEndorsements,
            Self::Store(_) => ErrorKind::Storage,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Returns true if the caller can fix the failure by changing its input.
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Storage | ErrorKind::Internal)
    }

    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidGuardianConfig {
            reason: reason.into(),
        }
    }
}

/// Error taxonomy shared by all operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller lacks the required role.
    NotAuthorized,
    /// Record or request absent.
    NotFound,
    /// Guardian count or threshold out of range.
    InvalidConfig,
    /// Other malformed input.
    InvalidInput,
    /// Record paused.
    Inactive,
    /// Terminal-state re-entry.
    AlreadyCompleted,
    /// Deadline passed.
    Expired,
    /// Threshold not met.
    InsufficientEndorsements,
    /// Same guardian endorsing twice.
    DuplicateEndorsement,
    /// List at max size.
    CapacityExceeded,
    /// Backend failure.
    Storage,
    /// Environment contract breach.
    Internal,
}

// =============================================================================
// STORE ERRORS
// =============================================================================

/// Errors from the storage port.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Lock poisoned by a panicking writer.
    #[error("store lock poisoned")]
    LockPoisoned,

    /// Snapshot could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

// =============================================================================
// TESTS
// =============================================================================

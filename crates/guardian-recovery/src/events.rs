//! # Event Schema
//!
//! Domain events published after every successful commit.
//! Failed operations publish nothing.
//!
//! | Event | Emitted by |
//! |-------|-----------|
//! | `RecordRegistered` | `register_record` |
//! | `GuardiansConfigured` | `set_guardians` |
//! | `RecoveryInitiated` | `initiate_recovery` |
//! | `RecoveryEndorsed` | `endorse_recovery` |
//! | `RecoveryCompleted` | `complete_recovery` |
//! | `RecordPaused` / `RecordReactivated` | administrative guard |

use crate::domain::value_objects::{Principal, RecordId, RequestId, Tick};
use serde::{Deserialize, Serialize};

/// A committed ledger transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RecoveryEvent {
    /// A record was registered (or overwritten).
    RecordRegistered {
        record_id: RecordId,
        owner: Principal,
        guardians: usize,
        threshold: u8,
        overwritten: bool,
        at: Tick,
    },
    /// A principal stored its default guardian profile.
    GuardiansConfigured {
        principal: Principal,
        guardians: usize,
        threshold: u8,
        at: Tick,
    },
    /// A recovery request was opened.
    RecoveryInitiated {
        request_id: RequestId,
        record_id: RecordId,
        requester: Principal,
        new_owner: Principal,
        expires_at: Tick,
    },
    /// A guardian endorsed a request.
    RecoveryEndorsed {
        request_id: RequestId,
        guardian: Principal,
        count: u8,
        at: Tick,
    },
    /// Ownership was transferred.
    RecoveryCompleted {
        request_id: RequestId,
        record_id: RecordId,
        previous_owner: Principal,
        new_owner: Principal,
        at: Tick,
    },
    /// The administrator paused a record.
    RecordPaused { record_id: RecordId, at: Tick },
    /// The administrator reactivated a record.
    RecordReactivated { record_id: RecordId, at: Tick },
}

impl RecoveryEvent {
    /// Short topic name, used as a log field.
    #[must_use]
    pub fn topic(&self) -> &'static str {
        match self {
            Self::RecordRegistered { .. } => topics::RECORD_REGISTERED,
            Self::GuardiansConfigured { .. } => topics::GUARDIANS_CONFIGURED,
            Self::RecoveryInitiated { .. } => topics::RECOVERY_INITIATED,
            Self::RecoveryEndorsed { .. } => topics::RECOVERY_ENDORSED,
            Self::RecoveryCompleted { .. } => topics::RECOVERY_COMPLETED,
            Self::RecordPaused { .. } => topics::RECORD_PAUSED,
            Self::RecordReactivated { .. } => topics::RECORD_REACTIVATED,
        }
    }
}

/// Event topic names.
pub mod topics {
    /// Record registered.
    pub const RECORD_REGISTERED: &str = "recovery.record.registered";
    /// Guardian profile stored.
    pub const GUARDIANS_CONFIGURED: &str = "recovery.guardians.configured";
    /// Request opened.
    pub const RECOVERY_INITIATED: &str = "recovery.request.initiated";
    /// Endorsement recorded.
    pub const RECOVERY_ENDORSED: &str = "recovery.request.endorsed";
    /// Ownership transferred.
    pub const RECOVERY_COMPLETED: &str = "recovery.request.completed";
    /// Record paused.
    pub const RECORD_PAUSED: &str = "recovery.record.paused";
    /// Record reactivated.
    pub const RECORD_REACTIVATED: &str = "recovery.record.reactivated";
}

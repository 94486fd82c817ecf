//! Transaction script format.
//!
//! ```json
//! {
//!   "administrator": "0xadad...",
//!   "steps": [
//!     { "caller": "0x01..", "tick": 0, "op": "register_record",
//!       "record_id": "0xaa..", "metadata": "0x0102",
//!       "guardians": ["0x11..", "0x12..", "0x13.."], "threshold": 2 },
//!     { "caller": "0x03..", "tick": 1, "op": "initiate_recovery",
//!       "record_id": "0xaa..", "new_owner": "0x02.." },
//!     { "caller": "0x11..", "tick": 2, "op": "endorse_recovery",
//!       "request": { "initiated": 0 } }
//!   ]
//! }
//! ```
//!
//! Request ids are derived at initiation time, so steps may refer to a
//! request either by its hex id or by the index of the `initiate_recovery`
//! step that produced it.

use guardian_recovery::prelude::{EncryptedMetadata, Principal, RecordId, RequestId, Tick};
use serde::Deserialize;

/// A full replay script.
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    /// Overrides the configured administrator.
    #[serde(default)]
    pub administrator: Option<Principal>,
    /// Steps applied in order.
    pub steps: Vec<Step>,
}

impl Script {
    /// Parse a script from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error for malformed JSON, an unknown `op`,
    /// or a malformed principal or id.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// One ledger call.
#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    /// Authenticated caller.
    pub caller: Principal,
    /// Logical tick to advance to before the call. Omitted keeps the current tick.
    #[serde(default)]
    pub tick: Option<Tick>,
    /// The call itself.
    #[serde(flatten)]
    pub op: Operation,
}

/// A reference to a recovery request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RequestRef {
    /// Literal id.
    Id(RequestId),
    /// The n-th successfully initiated request of this replay.
    Initiated { initiated: usize },
}

/// Ledger operations.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    RegisterRecord {
        record_id: RecordId,
        #[serde(default)]
        metadata: EncryptedMetadata,
        guardians: Vec<Principal>,
        threshold: u8,
    },
    SetGuardians {
        guardians: Vec<Principal>,
        threshold: u8,
    },
    InitiateRecovery {
        record_id: RecordId,
        new_owner: Principal,
    },
    EndorseRecovery {
        request: RequestRef,
    },
    CompleteRecovery {
        request: RequestRef,
    },
    PauseRecord {
        record_id: RecordId,
    },
    ReactivateRecord {
        record_id: RecordId,
    },
    GetRecord {
        record_id: RecordId,
    },
    GetGuardianProfile {
        principal: Principal,
    },
    GetRequest {
        request: RequestRef,
    },
    GetEndorsement {
        request: RequestRef,
        guardian: Principal,
    },
    GetStatus {
        request: RequestRef,
    },
    HasEndorsed {
        request: RequestRef,
        guardian: Principal,
    },
}

impl Operation {
    /// Operation name as written in scripts.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RegisterRecord { .. } => "register_record",
            Self::SetGuardians { .. } => "set_guardians",
            Self::InitiateRecovery { .. } => "initiate_recovery",
            Self::EndorseRecovery { .. } => "endorse_recovery",
            Self::CompleteRecovery { .. } => "complete_recovery",
            Self::PauseRecord { .. } => "pause_record",
            Self::ReactivateRecord { .. } => "reactivate_record",
            Self::GetRecord { .. } => "get_record",
            Self::GetGuardianProfile { .. } => "get_guardian_profile",
            Self::GetRequest { .. } => "get_request",
            Self::GetEndorsement { .. } => "get_endorsement",
            Self::GetStatus { .. } => "get_status",
            Self::HasEndorsed { .. } => "has_endorsed",
        }
    }
}

//! Applies script steps to an in-memory ledger.

use crate::script::{Operation, RequestRef, Script, Step};
use guardian_recovery::prelude::*;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Result of one step, printed as a JSON line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    /// Zero-based step index.
    pub step: usize,
    /// Tick at which the step ran.
    pub tick: Tick,
    /// Operation name.
    pub op: &'static str,
    /// Whether the call succeeded.
    pub ok: bool,
    /// Call output on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error category on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    /// Error message on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Drives a fresh in-memory service through a script.
pub struct Replayer {
    service: InMemoryRecoveryService,
    initiated: Vec<RequestId>,
}

impl Replayer {
    /// Build a replayer over a fresh ledger.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `config` fails validation.
    pub fn new(config: RecoveryConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            service: create_in_memory_service(config, 0)?,
            initiated: Vec::new(),
        })
    }

    /// The underlying service.
    pub fn service(&self) -> &InMemoryRecoveryService {
        &self.service
    }

    /// Requests initiated so far, in order.
    pub fn initiated(&self) -> &[RequestId] {
        &self.initiated
    }

    /// Initiated requests that are neither completed nor expired.
    ///
    /// # Errors
    ///
    /// Propagates store failures from the status reads.
    pub fn pending(&self) -> Result<usize, RecoveryError> {
        let mut pending = 0;
        for id in &self.initiated {
            if let Some(status) = self.service.get_status(id)? {
                if !status.state.is_terminal() {
                    pending += 1;
                }
            }
        }
        Ok(pending)
    }

    /// Apply every step of `script`, collecting one report per step.
    pub fn run(&mut self, script: &Script) -> Vec<StepReport> {
        script
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| self.apply(index, step))
            .collect()
    }

    /// Apply one step.
    pub fn apply(&mut self, index: usize, step: &Step) -> StepReport {
        let clock = self.service.clock();
        if let Some(tick) = step.tick {
            let now = clock.advance_to(tick);
            if now != tick {
                warn!(step = index, requested = tick, now, "Clock cannot move backwards");
            }
        }
        let tick = clock.now();
        let op = step.op.name();
        debug!(step = index, tick, op, caller = %step.caller, "Applying step");

        match self.dispatch(step) {
            Ok(result) => StepReport {
                step: index,
                tick,
                op,
                ok: true,
                result: Some(result),
                kind: None,
                error: None,
            },
            Err(err) => StepReport {
                step: index,
                tick,
                op,
                ok: false,
                result: None,
                kind: Some(err.kind()),
                error: Some(err.to_string()),
            },
        }
    }

    fn resolve(&self, request: RequestRef) -> Result<RequestId, RecoveryError> {
        match request {
            RequestRef::Id(id) => Ok(id),
            RequestRef::Initiated { initiated } => {
                self.initiated.get(initiated).copied().ok_or_else(|| {
                    RecoveryError::InvalidInput(format!(
                        "script refers to initiated request #{initiated}, only {} exist",
                        self.initiated.len()
                    ))
                })
            }
        }
    }

    fn dispatch(&mut self, step: &Step) -> Result<Value, RecoveryError> {
        let caller = step.caller;
        let service = &self.service;

        let value = match &step.op {
            Operation::RegisterRecord {
                record_id,
                metadata,
                guardians,
                threshold,
            } => {
                let id = service.register_record(
                    caller,
                    *record_id,
                    metadata.clone(),
                    guardians.clone(),
                    *threshold,
                )?;
                json!({ "record_id": id })
            }
            Operation::SetGuardians {
                guardians,
                threshold,
            } => {
                service.set_guardians(caller, guardians.clone(), *threshold)?;
                Value::Null
            }
            Operation::InitiateRecovery {
                record_id,
                new_owner,
            } => {
                let id = service.initiate_recovery(caller, *record_id, *new_owner)?;
                self.initiated.push(id);
                json!({ "request_id": id, "index": self.initiated.len() - 1 })
            }
            Operation::EndorseRecovery { request } => {
                let id = self.resolve(*request)?;
                let count = service.endorse_recovery(caller, id)?;
                json!({ "request_id": id, "count": count })
            }
            Operation::CompleteRecovery { request } => {
                let id = self.resolve(*request)?;
                let new_owner = service.complete_recovery(caller, id)?;
                json!({ "request_id": id, "new_owner": new_owner })
            }
            Operation::PauseRecord { record_id } => {
                service.pause_record(caller, *record_id)?;
                Value::Null
            }
            Operation::ReactivateRecord { record_id } => {
                service.reactivate_record(caller, *record_id)?;
                Value::Null
            }
            Operation::GetRecord { record_id } => to_value(&service.get_record(record_id)?)?,
            Operation::GetGuardianProfile { principal } => {
                to_value(&service.get_guardian_profile(principal)?)?
            }
            Operation::GetRequest { request } => {
                let id = self.resolve(*request)?;
                to_value(&service.get_request(&id)?)?
            }
            Operation::GetEndorsement { request, guardian } => {
                let id = self.resolve(*request)?;
                to_value(&service.get_endorsement(&id, guardian)?)?
            }
            Operation::GetStatus { request } => {
                let id = self.resolve(*request)?;
                to_value(&service.get_status(&id)?)?
            }
            Operation::HasEndorsed { request, guardian } => {
                let id = self.resolve(*request)?;
                Value::Bool(service.has_endorsed(&id, guardian)?)
            }
        };
        Ok(value)
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, RecoveryError> {
    serde_json::to_value(value).map_err(|e| RecoveryError::Internal(e.to_string()))
}

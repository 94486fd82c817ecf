//! # Recovery Configuration
//!
//! Ledger parameters and the administrator identity.
//!
//! ## Security Requirements
//!
//! - `administrator` MUST NOT be the default zero principal in production
//! - All limits have defaults matching the ledger constants in
//!   `domain::invariants::limits`

use crate::domain::invariants::limits;
use crate::domain::services::{GuardianBounds, ThresholdPolicy};
use crate::domain::value_objects::{ParseBytesError, Principal, Tick};
use std::env;
use thiserror::Error;

/// Complete ledger configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryConfig {
    /// The single identity allowed to pause and reactivate records.
    pub administrator: Principal,
    /// Request lifetime in logical ticks.
    pub request_timeout_ticks: Tick,
    /// Fewest guardians per list.
    pub min_guardians: usize,
    /// Most guardians per list.
    pub max_guardians: usize,
    /// Lowest allowed threshold.
    pub min_threshold: u8,
    /// Metadata payload bound in bytes.
    pub max_metadata_len: usize,
    /// Which threshold governs completion.
    pub threshold_policy: ThresholdPolicy,
    /// Reject `register_record` on an existing id instead of overwriting.
    pub reject_record_overwrite: bool,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            administrator: Principal::ZERO, // MUST be overridden in production
            request_timeout_ticks: limits::DEFAULT_REQUEST_TIMEOUT_TICKS,
            min_guardians: limits::MIN_GUARDIANS,
            max_guardians: limits::MAX_GUARDIANS,
            min_threshold: limits::MIN_THRESHOLD,
            max_metadata_len: limits::MAX_METADATA_LEN,
            threshold_policy: ThresholdPolicy::Live,
            reject_record_overwrite: false,
        }
    }
}

impl RecoveryConfig {
    /// Default configuration with the given administrator.
    #[must_use]
    pub fn with_administrator(administrator: Principal) -> Self {
        Self {
            administrator,
            ..Self::default()
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `GR_ADMINISTRATOR`: administrator principal, hex (default: zero)
    /// - `GR_REQUEST_TIMEOUT_TICKS`: request lifetime (default: 144)
    /// - `GR_THRESHOLD_POLICY`: `live` or `snapshot` (default: live)
    /// - `GR_REJECT_RECORD_OVERWRITE`: `true`/`1` to reject re-registration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(admin) = env::var("GR_ADMINISTRATOR") {
            config.administrator = admin
                .parse()
                .map_err(|source| ConfigError::InvalidAdministrator { source })?;
        }

        if let Ok(ticks) = env::var("GR_REQUEST_TIMEOUT_TICKS") {
            config.request_timeout_ticks =
                ticks.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "GR_REQUEST_TIMEOUT_TICKS",
                    value: ticks.clone(),
                })?;
        }

        if let Ok(policy) = env::var("GR_THRESHOLD_POLICY") {
            config.threshold_policy = match policy.to_lowercase().as_str() {
                "live" => ThresholdPolicy::Live,
                "snapshot" | "snapshot_at_initiation" => ThresholdPolicy::SnapshotAtInitiation,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "GR_THRESHOLD_POLICY",
                        value: policy,
                    })
                }
            };
        }

        config.reject_record_overwrite = env::var("GR_REJECT_RECORD_OVERWRITE")
            .map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or(false);

        config.validate()?;
        Ok(config)
    }

    /// Guardian list bounds derived from this configuration.
    #[must_use]
    pub fn guardian_bounds(&self) -> GuardianBounds {
        GuardianBounds {
            min_guardians: self.min_guardians,
            max_guardians: self.max_guardians,
            min_threshold: self.min_threshold,
        }
    }

    /// Check internal consistency.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a timeout is zero, bounds are inverted, the
    /// threshold floor cannot be met by the smallest list, or the largest list
    /// exceeds the endorsement capacity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_ticks == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.min_guardians > self.max_guardians {
            return Err(ConfigError::InvertedBounds {
                min: self.min_guardians,
                max: self.max_guardians,
            });
        }
        if self.min_threshold == 0 || usize::from(self.min_threshold) > self.min_guardians {
            return Err(ConfigError::UnreachableThreshold {
                min_threshold: self.min_threshold,
                min_guardians: self.min_guardians,
            });
        }
        if self.max_guardians > limits::MAX_ENDORSEMENTS {
            return Err(ConfigError::CapacityTooSmall {
                max_guardians: self.max_guardians,
                capacity: limits::MAX_ENDORSEMENTS,
            });
        }
        Ok(())
    }

    /// Validate configuration for production readiness.
    ///
    /// # Errors
    ///
    /// Everything `validate` rejects, plus a zero administrator.
    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        self.validate()?;
        if self.administrator.is_zero() {
            return Err(ConfigError::InsecureAdministrator);
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Administrator is the zero principal.
    #[error(
        "SECURITY VIOLATION: administrator is the zero principal. \
         Set GR_ADMINISTRATOR or provide it in config."
    )]
    InsecureAdministrator,

    /// Administrator could not be parsed.
    #[error("invalid administrator: {source}")]
    InvalidAdministrator { source: ParseBytesError },

    /// Environment value malformed.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    /// Requests would expire immediately.
    #[error("request timeout must be at least one tick")]
    ZeroTimeout,

    /// min_guardians > max_guardians.
    #[error("guardian bounds inverted: min {min} > max {max}")]
    InvertedBounds { min: usize, max: usize },

    /// Threshold floor cannot be satisfied.
    #[error("threshold floor {min_threshold} unreachable with {min_guardians} guardians")]
    UnreachableThreshold {
        min_threshold: u8,
        min_guardians: usize,
    },

    /// Guardian lists larger than the endorser capacity.
    #[error("max guardians {max_guardians} exceeds endorsement capacity {capacity}")]
    CapacityTooSmall {
        max_guardians: usize,
        capacity: usize,
    },
}

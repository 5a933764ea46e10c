//! Validator registry and runner.
//!
//! The registry is a flat table parallel to [`ValidatorId`]: the entry at
//! position `n` must carry id `n`. The runner refuses a dispatch when that
//! alignment is broken instead of running whatever happens to sit there.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::sbbr::{SbbrValidator, SbbrVersion};
use super::standard::AcpiStandardValidator;
use super::{ValidationContext, ValidationError, Validator};
use crate::catalog::Category;

/// Ids of every known validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidatorId {
    /// Arm SBBR 1.0 mandatory table checks.
    Sbbr10 = 0,
    /// Arm SBBR 1.1 mandatory table checks.
    Sbbr11 = 1,
    /// Arm SBBR 1.2 mandatory table checks.
    Sbbr12 = 2,
    /// Platform agnostic ACPI consistency checks.
    AcpiStandard = 3,
}

impl ValidatorId {
    pub const COUNT: usize = 4;

    pub const ALL: [ValidatorId; ValidatorId::COUNT] = [
        ValidatorId::Sbbr10,
        ValidatorId::Sbbr11,
        ValidatorId::Sbbr12,
        ValidatorId::AcpiStandard,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Look up an id from its raw value.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for ValidatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Errors from a single dispatch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("ValidatorId is not recognised. ValidatorId = {0}.")]
    UnknownValidator(usize),

    #[error("Validator cannot be retrieved. ValidatorId = {requested}, entry holds {found}.")]
    RegistryIntegrity { requested: usize, found: ValidatorId },

    #[error("{validator} validation failed: {source}")]
    Failed {
        validator: ValidatorId,
        #[source]
        source: ValidationError,
    },
}

/// Result of a dispatch that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The validator ran and found nothing wrong.
    Passed,
    /// The validator does not apply under the current options.
    Skipped,
    /// The data the validator compares was never collected.
    Unavailable(Category),
}

/// One registry row.
pub struct ValidatorEntry {
    pub id: ValidatorId,
    pub validator: Box<dyn Validator>,
}

impl ValidatorEntry {
    pub fn new(id: ValidatorId, validator: impl Validator + 'static) -> Self {
        Self {
            id,
            validator: Box::new(validator),
        }
    }
}

impl fmt::Debug for ValidatorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorEntry")
            .field("id", &self.id)
            .field("validator", &self.validator.name())
            .finish()
    }
}

static BUILTIN: OnceLock<ValidatorRegistry> = OnceLock::new();

/// Fixed table of validators, densely indexed by id.
#[derive(Debug)]
pub struct ValidatorRegistry {
    entries: Vec<ValidatorEntry>,
}

impl ValidatorRegistry {
    /// The built-in registry, constructed on first use and never modified.
    pub fn builtin() -> &'static ValidatorRegistry {
        BUILTIN.get_or_init(|| {
            Self::from_entries(vec![
                ValidatorEntry::new(ValidatorId::Sbbr10, SbbrValidator::new(SbbrVersion::V1_0)),
                ValidatorEntry::new(ValidatorId::Sbbr11, SbbrValidator::new(SbbrVersion::V1_1)),
                ValidatorEntry::new(ValidatorId::Sbbr12, SbbrValidator::new(SbbrVersion::V1_2)),
                ValidatorEntry::new(ValidatorId::AcpiStandard, AcpiStandardValidator),
            ])
        })
    }

    /// Build a registry from rows in table order.
    pub fn from_entries(entries: Vec<ValidatorEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rows in table order.
    pub fn entries(&self) -> &[ValidatorEntry] {
        &self.entries
    }

    /// Name of the validator at `id`, if that row exists and is aligned.
    pub fn name_of(&self, id: usize) -> Option<&'static str> {
        self.entries
            .get(id)
            .filter(|entry| entry.id.index() == id)
            .map(|entry| entry.validator.name())
    }

    /// Run the validator with raw id `id`.
    ///
    /// # Errors
    ///
    /// * `UnknownValidator` - `id` is past the end of the table; nothing runs
    /// * `RegistryIntegrity` - the row at `id` carries another id; nothing runs
    /// * `Failed` - the validator ran and reported a failure
    pub fn run(&self, id: usize, ctx: &ValidationContext<'_>) -> Result<Outcome, DispatchError> {
        let Some(entry) = self.entries.get(id) else {
            warn!(validator = id, registry_size = self.entries.len(), "validator id is not recognised");
            return Err(DispatchError::UnknownValidator(id));
        };

        if entry.id.index() != id {
            error!(
                validator = id,
                found = %entry.id,
                "validator registry is out of step with its ids"
            );
            return Err(DispatchError::RegistryIntegrity {
                requested: id,
                found: entry.id,
            });
        }

        let validator = &entry.validator;
        if !validator.applies(ctx.config) {
            info!(validator = %entry.id, "validator does not apply to this report");
            return Ok(Outcome::Skipped);
        }

        debug!(validator = %entry.id, name = validator.name(), "running validator");
        match validator.validate(ctx) {
            Ok(()) => Ok(Outcome::Passed),
            Err(ValidationError::DataUnavailable(category)) => {
                info!(validator = %entry.id, category = ?category, "comparison data unavailable");
                Ok(Outcome::Unavailable(category))
            }
            Err(source) => Err(DispatchError::Failed {
                validator: entry.id,
                source,
            }),
        }
    }
}

/// Serialisable status of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DispatchStatus {
    Passed,
    Skipped,
    Unavailable { category: Category },
    Failed { reason: String },
    Refused { reason: String },
}

/// What happened when one validator was dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    /// Raw id that was requested
    pub validator_id: usize,

    /// Validator name, when the id resolved to an aligned row
    pub validator: Option<String>,

    #[serde(flatten)]
    pub status: DispatchStatus,
}

impl DispatchReport {
    pub fn new(
        registry: &ValidatorRegistry,
        validator_id: usize,
        result: Result<Outcome, DispatchError>,
    ) -> Self {
        let status = match result {
            Ok(Outcome::Passed) => DispatchStatus::Passed,
            Ok(Outcome::Skipped) => DispatchStatus::Skipped,
            Ok(Outcome::Unavailable(category)) => DispatchStatus::Unavailable { category },
            Err(e @ DispatchError::Failed { .. }) => DispatchStatus::Failed {
                reason: e.to_string(),
            },
            Err(e) => DispatchStatus::Refused {
                reason: e.to_string(),
            },
        };

        Self {
            validator_id,
            validator: registry.name_of(validator_id).map(str::to_string),
            status,
        }
    }

    /// Whether this dispatch should fail the invocation.
    pub fn is_failure(&self) -> bool {
        matches!(
            self.status,
            DispatchStatus::Failed { .. } | DispatchStatus::Refused { .. }
        )
    }
}

//! Post-parse validation of the collected ACPI metadata.
//!
//! Validators run after every table has been decoded. Each one reads the
//! [`DataStore`], reports findings through the [`DiagnosticSink`], and returns
//! an outcome to the runner. A validator whose data was never collected
//! reports [`ValidationError::DataUnavailable`], which is not a failure.

mod registry;
mod sbbr;
mod standard;

pub use registry::{
    DispatchError, DispatchReport, DispatchStatus, Outcome, ValidatorEntry, ValidatorId,
    ValidatorRegistry,
};
pub use sbbr::{SbbrValidator, SbbrVersion};
pub use standard::{validate_proc_id, AcpiStandardValidator};

use thiserror::Error;
use tracing::debug;

use crate::catalog::Category;
use crate::config::AcpiViewConfig;
use crate::diagnostics::DiagnosticSink;
use crate::layout::LayoutError;
use crate::store::{DataStore, Record, StoreError};

/// Errors a validator can return.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No {0} data available for comparison")]
    DataUnavailable(Category),

    #[error("Cannot read {category} list: {source}")]
    Store {
        category: Category,
        #[source]
        source: StoreError,
    },

    #[error("malformed records skipped: {count}")]
    MalformedRecords { count: usize },

    #[error("mismatches found: {count}")]
    Mismatch { count: usize },

    #[error("Failed to allocate resources for {0}")]
    OutOfResources(&'static str),
}

impl ValidationError {
    /// Whether this outcome means "no data" rather than "bad data".
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ValidationError::DataUnavailable(_))
    }
}

/// Everything a validator may read, plus the sink it reports to.
pub struct ValidationContext<'a> {
    pub store: &'a DataStore,
    pub config: &'a AcpiViewConfig,
    pub sink: &'a dyn DiagnosticSink,
}

impl<'a> ValidationContext<'a> {
    pub fn new(
        store: &'a DataStore,
        config: &'a AcpiViewConfig,
        sink: &'a dyn DiagnosticSink,
    ) -> Self {
        Self {
            store,
            config,
            sink,
        }
    }

    /// Fetch a category for comparison.
    ///
    /// A missing category becomes `DataUnavailable` without touching the
    /// counters. Any other store failure is counted and reported.
    pub(crate) fn fetch(&self, category: Category) -> Result<&'a [Record], ValidationError> {
        match self.store.get_all(category) {
            Ok(records) => Ok(records),
            Err(StoreError::NotFound(_)) => Err(ValidationError::DataUnavailable(category)),
            Err(source) => Err(self.store_failure(category, source)),
        }
    }

    /// Count and report a store failure.
    pub(crate) fn store_failure(&self, category: Category, source: StoreError) -> ValidationError {
        self.sink
            .error(&format!("Cannot get {category} list. Status = {source}."));
        ValidationError::Store { category, source }
    }

    /// Count and report one malformed record.
    pub(crate) fn malformed(&self, index: usize, error: &LayoutError) {
        self.sink
            .error(&format!("{} record {index} is malformed: {error}.", error.category));
    }
}

/// A post-parse validation routine.
///
/// Each validator states, in its own docs, the payload layout it expects for
/// every category it reads. The store performs no structural checks.
pub trait Validator: Send + Sync {
    /// Name shown in logs and summaries.
    fn name(&self) -> &'static str;

    /// Whether this validator is meaningful under `config`.
    ///
    /// The runner skips the validator, without invoking it, when this is false.
    fn applies(&self, _config: &AcpiViewConfig) -> bool {
        true
    }

    /// Run the checks.
    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), ValidationError>;
}

/// Run the validators the invocation asked for, after parsing completes.
///
/// The standard consistency checks run when consistency checking is enabled;
/// the optional validator runs when validator status is set. A failed
/// dispatch never prevents the next one.
pub fn run_post_parse_validation(
    registry: &ValidatorRegistry,
    ctx: &ValidationContext<'_>,
) -> Vec<DispatchReport> {
    let mut reports = Vec::new();

    if ctx.config.consistency_checking {
        let id = ValidatorId::AcpiStandard.index();
        reports.push(DispatchReport::new(registry, id, registry.run(id, ctx)));
    }

    if ctx.config.validator_status {
        let id = ctx.config.validator_id;
        reports.push(DispatchReport::new(registry, id, registry.run(id, ctx)));
    }

    debug!(dispatched = reports.len(), "post-parse validation complete");
    reports
}

//! # acpiview-core
//!
//! Cross-table validation of metadata collected while decoding ACPI tables.
//!
//! Table decoders push copies of the structures they recognise into a
//! [`DataStore`]. Once every table has been parsed, registered validators
//! read the store and check that the tables agree with each other, e.g.
//! that every processor listed in the PPTT also has a GICC entry in the MADT.
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: records keep decode order, so diagnostics are reproducible
//! 2. **No partial records**: a failed store leaves the store as it was
//! 3. **Counted findings**: every mismatch is counted and reported exactly once
//! 4. **Aligned dispatch**: a validator runs only if its registry row carries its id
//!
//! ## Example
//!
//! ```rust,ignore
//! use acpiview_core::{validate, AcpiViewConfig, Category, DataStore};
//!
//! let mut store = DataStore::new();
//! store.store(Category::MadtGicC, Category::MadtGicC, &gicc_bytes)?;
//! store.store(Category::PpttProcs, Category::PpttProcs, &pptt_bytes)?;
//!
//! let summary = validate(&store, &AcpiViewConfig::default());
//! for line in &summary.diagnostics {
//!     println!("{}", line);
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod diagnostics;
pub mod layout;
pub mod snapshot;
pub mod store;
pub mod summary;
pub mod validation;

// Re-export main types at crate root
pub use catalog::Category;
pub use config::{
    signature_from_name, signature_to_string, AcpiViewConfig, ConfigError, ReportOption,
    SelectedTable,
};
pub use diagnostics::{DiagnosticCounters, DiagnosticSink};
pub use layout::{GiccEntry, LayoutError, PpttProcessor};
pub use snapshot::{RecordSnapshot, SnapshotError};
pub use store::{DataStore, Record, StoreError};
pub use summary::ValidationSummary;
pub use validation::{
    run_post_parse_validation, DispatchError, DispatchReport, DispatchStatus, Outcome,
    ValidationContext, ValidationError, Validator, ValidatorEntry, ValidatorId,
    ValidatorRegistry,
};

/// Run the post-parse validation pass with the built-in validators.
///
/// This is the main entry point once decoding has filled `store`.
///
/// # Returns
///
/// A `ValidationSummary` containing:
/// - `dispatches`: what each requested validator did
/// - `errors` / `warnings`: counter values at the end of the pass
/// - `diagnostics`: every message printed, in order
pub fn validate(store: &DataStore, config: &AcpiViewConfig) -> ValidationSummary {
    validate_with(ValidatorRegistry::builtin(), store, config)
}

/// Run the post-parse validation pass against a custom registry.
pub fn validate_with(
    registry: &ValidatorRegistry,
    store: &DataStore,
    config: &AcpiViewConfig,
) -> ValidationSummary {
    let counters = DiagnosticCounters::new();
    let ctx = ValidationContext::new(store, config, &counters);
    let dispatches = run_post_parse_validation(registry, &ctx);
    ValidationSummary::new(store.len(), dispatches, &counters)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"
installed_tables: ["dbg2", "spcr", "gtdt", "facp", "xsdt", "apic", "dsdt", "pptt"]
madt_gicc:
  - uid: 1
  - uid: 2
  - uid: 3
pptt_processors:
  - id: 100
    leaf: false
  - id: 2
  - id: 3
  - id: 4
"#;

    fn loaded_store() -> DataStore {
        let mut store = DataStore::new();
        RecordSnapshot::from_yaml(SNAPSHOT)
            .unwrap()
            .load_into(&mut store)
            .unwrap();
        store
    }

    #[test]
    fn test_basic_validation() {
        let store = loaded_store();
        let summary = validate(&store, &AcpiViewConfig::default());

        // Leaf 4 is missing from the MADT; cluster 100 is ignored
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.records, 15);
        assert_eq!(summary.dispatches.len(), 1);
        assert!(summary.diagnostics[0].contains("PPTT Processor ID 4"));
        assert!(!summary.is_clean());
    }

    #[test]
    fn test_sbbr_profiles_in_sequence() {
        let store = loaded_store();

        for id in [ValidatorId::Sbbr10, ValidatorId::Sbbr11, ValidatorId::Sbbr12] {
            let mut config = AcpiViewConfig {
                consistency_checking: false,
                ..Default::default()
            };
            config.enable_validator(id.index());

            let summary = validate(&store, &config);
            assert_eq!(summary.errors, 0, "{id} should pass");
            assert_eq!(summary.dispatches[0].status, DispatchStatus::Passed);
        }
    }

    #[test]
    fn test_empty_store_reports_unavailable() {
        let store = DataStore::new();
        let summary = validate(&store, &AcpiViewConfig::default());

        assert_eq!(summary.errors, 0);
        assert_eq!(
            summary.dispatches[0].status,
            DispatchStatus::Unavailable {
                category: Category::MadtGicC
            }
        );
        assert!(summary.is_clean());
    }

    #[test]
    fn test_store_reset_between_invocations() {
        let mut store = loaded_store();
        assert!(!validate(&store, &AcpiViewConfig::default()).is_clean());

        store.reset();
        store.init();
        assert!(validate(&store, &AcpiViewConfig::default()).is_clean());
    }
}

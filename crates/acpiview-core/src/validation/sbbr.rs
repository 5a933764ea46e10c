//! Arm Server Base Boot Requirements (SBBR) mandatory table checks.
//!
//! Reads [`Category::InstalledTables`]: 4-byte packed signature per record,
//! native byte order.
//!
//! References:
//! - Arm Server Base Boot Requirements 1.2, September 2019
//! - Arm Server Base Boot Requirements 1.1, May 2018
//! - Arm Server Base Boot Requirements 1.0, March 2016

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use super::{ValidationContext, ValidationError, Validator};
use crate::catalog::Category;
use crate::config::signature_to_string;
use crate::layout::parse_installed_signature;

const fn signature(name: &[u8; 4]) -> u32 {
    u32::from_ne_bytes(*name)
}

pub const DBG2: u32 = signature(b"DBG2");
pub const DSDT: u32 = signature(b"DSDT");
pub const FACP: u32 = signature(b"FACP");
pub const GTDT: u32 = signature(b"GTDT");
pub const MADT: u32 = signature(b"APIC");
pub const PPTT: u32 = signature(b"PPTT");
pub const SPCR: u32 = signature(b"SPCR");
pub const XSDT: u32 = signature(b"XSDT");

const SBBR_1_0_MANDATORY: &[u32] = &[DBG2, SPCR, GTDT, FACP, XSDT, MADT, DSDT];

const SBBR_1_1_MANDATORY: &[u32] = &[DBG2, SPCR, GTDT, FACP, XSDT, MADT, DSDT, PPTT];

const SBBR_1_2_MANDATORY: &[u32] = &[DBG2, SPCR, GTDT, FACP, XSDT, MADT, DSDT, PPTT];

/// Arm SBBR specification versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SbbrVersion {
    #[serde(rename = "1.0")]
    V1_0,
    #[serde(rename = "1.1")]
    V1_1,
    #[serde(rename = "1.2")]
    V1_2,
}

impl SbbrVersion {
    /// Tables every compliant platform must install.
    pub fn mandatory_tables(self) -> &'static [u32] {
        match self {
            SbbrVersion::V1_0 => SBBR_1_0_MANDATORY,
            SbbrVersion::V1_1 => SBBR_1_1_MANDATORY,
            SbbrVersion::V1_2 => SBBR_1_2_MANDATORY,
        }
    }
}

impl fmt::Display for SbbrVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SbbrVersion::V1_0 => f.write_str("1.0"),
            SbbrVersion::V1_1 => f.write_str("1.1"),
            SbbrVersion::V1_2 => f.write_str("1.2"),
        }
    }
}

/// Instance count of one mandatory table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TableCounter {
    signature: u32,
    count: u32,
}

/// Checks that every table mandated by one SBBR version is installed.
#[derive(Debug, Clone, Copy)]
pub struct SbbrValidator {
    version: SbbrVersion,
}

impl SbbrValidator {
    pub fn new(version: SbbrVersion) -> Self {
        Self { version }
    }

    pub fn version(&self) -> SbbrVersion {
        self.version
    }
}

impl Validator for SbbrValidator {
    fn name(&self) -> &'static str {
        match self.version {
            SbbrVersion::V1_0 => "Arm SBBR 1.0",
            SbbrVersion::V1_1 => "Arm SBBR 1.1",
            SbbrVersion::V1_2 => "Arm SBBR 1.2",
        }
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), ValidationError> {
        let installed = ctx.fetch(Category::InstalledTables)?;

        let mut counters: Vec<TableCounter> = self
            .version
            .mandatory_tables()
            .iter()
            .map(|&signature| TableCounter {
                signature,
                count: 0,
            })
            .collect();

        let mut malformed = 0;
        for (index, record) in installed.iter().enumerate() {
            match parse_installed_signature(record.data()) {
                Ok(signature) => {
                    if let Some(counter) =
                        counters.iter_mut().find(|c| c.signature == signature)
                    {
                        counter.count += 1;
                    }
                }
                Err(e) => {
                    ctx.malformed(index, &e);
                    malformed += 1;
                }
            }
        }

        let mut missing = 0;
        for counter in counters.iter().filter(|c| c.count == 0) {
            ctx.sink.error(&format!(
                "{} table is mandatory for SBBR {} but is not installed.",
                signature_to_string(counter.signature),
                self.version
            ));
            missing += 1;
        }

        debug!(
            version = %self.version,
            installed = installed.len(),
            missing,
            "SBBR mandatory table check complete"
        );

        let result = if missing > 0 {
            Err(ValidationError::Mismatch { count: missing })
        } else if malformed > 0 {
            Err(ValidationError::MalformedRecords { count: malformed })
        } else {
            Ok(())
        };

        if result.is_err() {
            ctx.sink.print(&format!(
                "ERROR: SBBR {} mandatory table check failed.",
                self.version
            ));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{signature_from_name, AcpiViewConfig, ReportOption};
    use crate::diagnostics::DiagnosticCounters;
    use crate::layout::encode_installed_signature;
    use crate::store::DataStore;

    fn store_with(names: &[&str]) -> DataStore {
        let mut store = DataStore::new();
        for name in names {
            store
                .store(
                    Category::InstalledTables,
                    Category::InstalledTables,
                    &encode_installed_signature(signature_from_name(name)),
                )
                .unwrap();
        }
        store
    }

    fn run(version: SbbrVersion, store: &DataStore) -> (Result<(), ValidationError>, DiagnosticCounters) {
        let config = AcpiViewConfig::default();
        let sink = DiagnosticCounters::new();
        let result = {
            let ctx = ValidationContext::new(store, &config, &sink);
            SbbrValidator::new(version).validate(&ctx)
        };
        (result, sink)
    }

    const SBBR_1_0_TABLES: [&str; 7] = ["dbg2", "spcr", "gtdt", "facp", "xsdt", "apic", "dsdt"];

    #[test]
    fn test_signature_constants_match_names() {
        assert_eq!(MADT, signature_from_name("apic"));
        assert_eq!(FACP, signature_from_name("facp"));
        assert_eq!(PPTT, signature_from_name("PPTT"));
    }

    #[test]
    fn test_compliant_platform_passes_1_0() {
        let store = store_with(&SBBR_1_0_TABLES);
        let (result, sink) = run(SbbrVersion::V1_0, &store);
        assert_eq!(result, Ok(()));
        assert_eq!(sink.errors(), 0);
    }

    #[test]
    fn test_later_versions_require_pptt() {
        let store = store_with(&SBBR_1_0_TABLES);

        for version in [SbbrVersion::V1_1, SbbrVersion::V1_2] {
            let (result, sink) = run(version, &store);
            assert_eq!(result, Err(ValidationError::Mismatch { count: 1 }));
            assert_eq!(sink.errors(), 1);
            assert!(sink.messages()[0].starts_with("ERROR: PPTT table is mandatory"));
        }
    }

    #[test]
    fn test_each_missing_table_reported() {
        let store = store_with(&["xsdt", "apic", "ssdt", "ssdt"]);
        let (result, sink) = run(SbbrVersion::V1_2, &store);

        assert_eq!(result, Err(ValidationError::Mismatch { count: 6 }));
        assert_eq!(sink.errors(), 6);
        assert_eq!(sink.messages().len(), 7);
        assert_eq!(
            sink.messages().last().unwrap(),
            "ERROR: SBBR 1.2 mandatory table check failed."
        );
    }

    #[test]
    fn test_duplicate_instances_accepted() {
        let mut names = SBBR_1_0_TABLES.to_vec();
        names.push("pptt");
        names.push("dsdt");
        let store = store_with(&names);

        let (result, _) = run(SbbrVersion::V1_1, &store);
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_no_installed_tables_is_unavailable() {
        let store = DataStore::new();
        let (result, sink) = run(SbbrVersion::V1_0, &store);
        assert_eq!(
            result,
            Err(ValidationError::DataUnavailable(Category::InstalledTables))
        );
        assert_eq!(sink.errors(), 0);
    }

    #[test]
    fn test_not_gated_by_report_option() {
        let config = AcpiViewConfig {
            report_option: ReportOption::Selected,
            ..Default::default()
        };
        assert!(SbbrValidator::new(SbbrVersion::V1_0).applies(&config));
    }

    #[test]
    fn test_version_display() {
        assert_eq!(SbbrVersion::V1_1.to_string(), "1.1");
        assert_eq!(SbbrValidator::new(SbbrVersion::V1_2).name(), "Arm SBBR 1.2");
    }
}

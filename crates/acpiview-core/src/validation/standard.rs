//! Platform agnostic ACPI consistency checks.
//!
//! Reads:
//! - [`Category::MadtGicC`]: [`GiccEntry`] layout, processor UID at offset 8
//! - [`Category::PpttProcs`]: [`PpttProcessor`] layout, flags at offset 4
//!   (bit 3 = leaf), ACPI processor ID at offset 12

use tracing::debug;

use super::{ValidationContext, ValidationError, Validator};
use crate::catalog::Category;
use crate::config::AcpiViewConfig;
use crate::layout::{GiccEntry, PpttProcessor};

/// Cross-checks processor identifiers between the MADT and the PPTT.
///
/// Only runs for full or aggregate reports: in a single-table report the
/// second table of the comparison may never have been decoded.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcpiStandardValidator;

impl Validator for AcpiStandardValidator {
    fn name(&self) -> &'static str {
        "ACPI standard"
    }

    fn applies(&self, config: &AcpiViewConfig) -> bool {
        config.cross_checks_enabled()
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), ValidationError> {
        let result = validate_proc_id(ctx);
        if let Err(e) = &result {
            if !e.is_unavailable() {
                ctx.sink.print("ERROR: Validate processor ID failed.");
            }
        }
        result
    }
}

/// Check that every PPTT leaf processor ID appears among the MADT GICC UIDs.
///
/// Each missing ID is counted and reported once and the scan carries on, so
/// one pass shows every mismatch. Clusters (non-leaf nodes) are never
/// checked.
///
/// # Returns
///
/// * `Ok(())` - every leaf ID was found
/// * `DataUnavailable` - MADT or PPTT processor data was never collected
/// * `Mismatch` - at least one leaf ID is missing from the MADT
/// * `MalformedRecords` - some records were too short to read (and no
///   mismatch was found among the rest)
pub fn validate_proc_id(ctx: &ValidationContext<'_>) -> Result<(), ValidationError> {
    let madt = ctx.fetch(Category::MadtGicC)?;
    let madt_len = ctx
        .store
        .count(Category::MadtGicC)
        .map_err(|e| ctx.store_failure(Category::MadtGicC, e))?;
    let pptt = ctx.fetch(Category::PpttProcs)?;

    let mut madt_ids: Vec<u32> = Vec::new();
    if madt_ids.try_reserve_exact(madt_len).is_err() {
        ctx.sink
            .error("Failed to allocate resources for MADT ID list.");
        return Err(ValidationError::OutOfResources("MADT ID list"));
    }

    let mut malformed = 0;
    for (index, record) in madt.iter().enumerate() {
        match GiccEntry::parse_uid(record.data()) {
            Ok(uid) => madt_ids.push(uid),
            Err(e) => {
                ctx.malformed(index, &e);
                malformed += 1;
            }
        }
    }

    let mut mismatches = 0;
    for (index, record) in pptt.iter().enumerate() {
        let node = match PpttProcessor::parse(record.data()) {
            Ok(node) => node,
            Err(e) => {
                ctx.malformed(index, &e);
                malformed += 1;
                continue;
            }
        };

        if !node.is_leaf() {
            continue;
        }

        if !madt_ids.contains(&node.acpi_processor_id) {
            ctx.sink.error(&format!(
                "PPTT Processor ID {} is not found in the MADT.",
                node.acpi_processor_id
            ));
            mismatches += 1;
        }
    }

    debug!(
        madt_entries = madt_ids.len(),
        pptt_entries = pptt.len(),
        mismatches,
        malformed,
        "processor id cross-check complete"
    );

    if mismatches > 0 {
        return Err(ValidationError::Mismatch { count: mismatches });
    }
    if malformed > 0 {
        return Err(ValidationError::MalformedRecords { count: malformed });
    }
    Ok(())
}

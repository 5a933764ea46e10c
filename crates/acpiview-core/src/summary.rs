//! Serialisable result of one validation pass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::diagnostics::DiagnosticCounters;
use crate::validation::DispatchReport;

/// What a validation pass found.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationSummary {
    /// Records held in the store during the pass
    pub records: usize,

    /// One entry per validator dispatch, in dispatch order
    pub dispatches: Vec<DispatchReport>,

    /// Error counter at the end of the pass
    pub errors: u32,

    /// Warning counter at the end of the pass
    pub warnings: u32,

    /// Diagnostics printed during the pass, in order
    pub diagnostics: Vec<String>,

    pub completed_at: DateTime<Utc>,
}

impl ValidationSummary {
    pub fn new(records: usize, dispatches: Vec<DispatchReport>, counters: &DiagnosticCounters) -> Self {
        Self {
            records,
            dispatches,
            errors: counters.errors(),
            warnings: counters.warnings(),
            diagnostics: counters.messages(),
            completed_at: Utc::now(),
        }
    }

    /// True when nothing was counted and no dispatch failed or was refused.
    pub fn is_clean(&self) -> bool {
        self.errors == 0 && !self.dispatches.iter().any(DispatchReport::is_failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticSink;
    use crate::validation::DispatchStatus;

    #[test]
    fn test_summary_copies_counters() {
        let counters = DiagnosticCounters::new();
        counters.error("bad");
        counters.warning("odd");

        let summary = ValidationSummary::new(4, vec![], &counters);
        assert_eq!(summary.records, 4);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.warnings, 1);
        assert_eq!(summary.diagnostics.len(), 2);
        assert!(!summary.is_clean());
    }

    #[test]
    fn test_refused_dispatch_is_not_clean() {
        let counters = DiagnosticCounters::new();
        let report = DispatchReport {
            validator_id: 9,
            validator: None,
            status: DispatchStatus::Refused {
                reason: "ValidatorId is not recognised. ValidatorId = 9.".to_string(),
            },
        };

        let summary = ValidationSummary::new(0, vec![report], &counters);
        assert_eq!(summary.errors, 0);
        assert!(!summary.is_clean());
    }

    #[test]
    fn test_summary_serialises_status_tag() {
        let counters = DiagnosticCounters::new();
        let report = DispatchReport {
            validator_id: 3,
            validator: Some("ACPI standard".to_string()),
            status: DispatchStatus::Passed,
        };
        let summary = ValidationSummary::new(2, vec![report], &counters);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["dispatches"][0]["status"], "passed");

        let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            ["completed_at", "diagnostics", "dispatches", "errors", "records", "warnings"]
        );
        assert!(summary.is_clean());
    }
}

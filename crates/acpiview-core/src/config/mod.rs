//! Invocation options and table selection.
//!
//! Options are threaded through the report controller as a value instead of
//! living in process-wide state.

mod options;
mod signature;

pub use options::{AcpiViewConfig, ConfigError, ReportOption, SelectedTable};
pub use signature::{signature_from_name, signature_to_string};

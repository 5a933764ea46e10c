//! Per-invocation `acpiview` options.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::signature::signature_from_name;
use crate::catalog::Category;
use crate::layout::parse_installed_signature;
use crate::store::DataStore;

/// Errors that can occur when loading a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Report option {0:?} requires a selected table")]
    MissingSelection(ReportOption),
}

/// Which tables a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportOption {
    /// Report all tables.
    #[default]
    All,
    /// Report the selected table only.
    Selected,
    /// List the installed tables.
    TableList,
    /// Dump the selected table to a file.
    DumpBinFile,
}

/// The table the user asked to inspect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SelectedTable {
    /// Name as the user typed it.
    pub name: String,

    /// Packed signature of `name`.
    pub signature: u32,

    /// Whether a table with this signature has been found.
    pub found: bool,
}

impl SelectedTable {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            signature: signature_from_name(&name),
            name,
            found: false,
        }
    }

    /// Compare against a signature read from a table header.
    pub fn matches(&self, signature: u32) -> bool {
        self.signature == signature
    }

    /// Look for this table among the installed tables and record whether it
    /// was found. Malformed signature records are ignored here.
    pub fn locate(&mut self, store: &DataStore) -> bool {
        self.found = store
            .get_all(Category::InstalledTables)
            .map(|records| {
                records
                    .iter()
                    .filter_map(|r| parse_installed_signature(r.data()).ok())
                    .any(|signature| self.matches(signature))
            })
            .unwrap_or(false);
        self.found
    }
}

impl From<String> for SelectedTable {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<SelectedTable> for String {
    fn from(table: SelectedTable) -> Self {
        table.name
    }
}

/// Options for one `acpiview` invocation.
///
/// `Default` is the documented reset state: report everything, consistency
/// checks on, highlighting off, no optional validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcpiViewConfig {
    /// Reporting mode
    pub report_option: ReportOption,

    /// Table picked with `-s`
    pub selected_table: Option<SelectedTable>,

    /// Run the cross-table consistency checks
    pub consistency_checking: bool,

    /// Colour highlight the report
    pub colour_highlighting: bool,

    /// Run the optional validator named by `validator_id`
    pub validator_status: bool,

    /// Raw id of the optional validator
    pub validator_id: usize,
}

impl Default for AcpiViewConfig {
    fn default() -> Self {
        Self {
            report_option: ReportOption::All,
            selected_table: None,
            consistency_checking: true,
            colour_highlighting: false,
            validator_status: false,
            validator_id: 0,
        }
    }
}

impl AcpiViewConfig {
    /// Parse a configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: AcpiViewConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Reset every option to its default.
    pub fn set_defaults(&mut self) {
        *self = Self::default();
    }

    /// Select a table by name; its signature is derived from the name.
    pub fn select_table(&mut self, name: impl Into<String>) {
        self.selected_table = Some(SelectedTable::new(name));
    }

    /// Enable the optional validator with the given raw id.
    pub fn enable_validator(&mut self, id: usize) {
        self.validator_status = true;
        self.validator_id = id;
    }

    /// Whether cross-table checks are meaningful for this invocation.
    ///
    /// A narrowed single-table report may never have decoded the second
    /// table of a comparison.
    pub fn cross_checks_enabled(&self) -> bool {
        self.consistency_checking && self.report_option != ReportOption::Selected
    }

    /// Check option combinations that cannot work together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.report_option == ReportOption::DumpBinFile && self.selected_table.is_none() {
            return Err(ConfigError::MissingSelection(self.report_option));
        }
        Ok(())
    }
}

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::erp::invoices::error::{EtlError, Result};
use crate::erp::invoices::model::{ColumnLayout, Language};

/// Settings of one import run, read from a TOML file:
///
/// ```toml
/// sheet = "uploadSheetClients"
/// header_rows = 1
/// language = "it"
///
/// [layout]
/// due_date = 0
/// client_id = 1
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EtlConfig {
    /// Worksheet holding the export; the first sheet when absent.
    pub sheet: Option<String>,
    /// Leading rows skipped before data rows start.
    pub header_rows: u32,
    pub language: Language,
    pub layout: ColumnLayout,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            sheet: None,
            header_rows: 1,
            language: Language::default(),
            layout: ColumnLayout::default(),
        }
    }
}

impl EtlConfig {
    pub fn from_toml(input: &str) -> Result<Self> {
        let config: EtlConfig =
            toml::from_str(input).map_err(|e| EtlError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(EtlError::MissingInput(path.to_path_buf()));
        }
        let source = fs::read_to_string(path)?;
        Self::from_toml(&source)
    }

    pub fn validate(&self) -> Result<()> {
        self.layout.validate()
    }

    /// Replaces the configured sheet when `sheet` is given.
    pub fn with_sheet(mut self, sheet: Option<String>) -> Self {
        if sheet.is_some() {
            self.sheet = sheet;
        }
        self
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use crate::erp::invoices::error::Result;
use crate::erp::invoices::pipeline::{AggregateResult, Sink};

/// Serialises a run result as pretty-printed JSON.
pub fn write_json(path: &Path, result: &AggregateResult) -> Result<()> {
    let json_string = serde_json::to_string_pretty(result)?;
    fs::write(path, json_string)?;
    Ok(())
}

/// [`Sink`] writing a run result as a JSON document.
#[derive(Debug, Clone)]
pub struct JsonSink {
    path: PathBuf,
}

impl JsonSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Sink for JsonSink {
    fn consume(&mut self, result: &AggregateResult) -> Result<()> {
        write_json(&self.path, result)
    }
}

use std::path::Path;

use tracing::{debug, info, instrument};

use crate::erp::invoices::aggregate::RunStats;
use crate::erp::invoices::config::EtlConfig;
use crate::erp::invoices::error::{EtlError, Result};
use crate::erp::invoices::io::excel_read;
use crate::erp::invoices::io::excel_write::WorkbookSink;
use crate::erp::invoices::io::json::JsonSink;
use crate::erp::invoices::pipeline::{self, AggregateResult, Sink, TabularSource};

/// Reads an ERP export workbook and runs the ingestion pipeline over it.
#[instrument(level = "info", skip_all, fields(input = %input.display()))]
pub fn ingest_workbook(input: &Path, config: &EtlConfig) -> Result<AggregateResult> {
    if !input.exists() {
        return Err(EtlError::MissingInput(input.to_path_buf()));
    }
    let source = excel_read::read_source(input, config)?;
    debug!(
        rows = source.rows().len(),
        columns = source.column_count(),
        "read export sheet"
    );
    pipeline::run(&source)
}

/// Ingests `input` and hands the result to `sink`.
pub fn ingest_into<S: Sink + ?Sized>(
    input: &Path,
    config: &EtlConfig,
    sink: &mut S,
) -> Result<RunStats> {
    let result = ingest_workbook(input, config)?;
    sink.consume(&result)?;
    Ok(result.stats)
}

/// Converts an ERP export into the `.xlsx` client invoice report.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output.display())
)]
pub fn excel_to_excel(input: &Path, output: &Path, config: &EtlConfig) -> Result<RunStats> {
    let mut sink = WorkbookSink::new(output, config.language);
    let stats = ingest_into(input, config, &mut sink)?;
    info!(invoices = stats.invoices_registered, "report workbook written");
    Ok(stats)
}

/// Converts an ERP export into a JSON document.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output.display())
)]
pub fn excel_to_json(input: &Path, output: &Path, config: &EtlConfig) -> Result<RunStats> {
    let mut sink = JsonSink::new(output);
    let stats = ingest_into(input, config, &mut sink)?;
    info!(invoices = stats.invoices_registered, "JSON report written");
    Ok(stats)
}

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::erp::invoices::aggregate::{InvoiceAggregator, RunStats};
use crate::erp::invoices::classify::{FieldFailure, Rejection, RowClass, classify_row};
use crate::erp::invoices::error::Result;
use crate::erp::invoices::model::{ClientMap, ColumnLayout, RawRow};

/// Supplies the column layout and the ordered raw rows of one run.
pub trait TabularSource {
    fn layout(&self) -> &ColumnLayout;

    /// Number of columns every row of the source spans.
    fn column_count(&self) -> usize;

    fn rows(&self) -> &[RawRow];
}

/// Consumes the result of a run, typically to persist or display it.
pub trait Sink {
    fn consume(&mut self, result: &AggregateResult) -> Result<()>;
}

/// In-memory [`TabularSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct SheetSource {
    layout: ColumnLayout,
    column_count: usize,
    rows: Vec<RawRow>,
}

impl SheetSource {
    pub fn new(layout: ColumnLayout, column_count: usize, rows: Vec<RawRow>) -> Self {
        Self {
            layout,
            column_count,
            rows,
        }
    }

    /// Builds a source whose width is the longest row.
    pub fn from_rows(layout: ColumnLayout, rows: Vec<RawRow>) -> Self {
        let column_count = rows.iter().map(|row| row.cells.len()).max().unwrap_or(0);
        Self::new(layout, column_count, rows)
    }
}

impl TabularSource for SheetSource {
    fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    fn column_count(&self) -> usize {
        self.column_count
    }

    fn rows(&self) -> &[RawRow] {
        &self.rows
    }
}

/// A row accepted with defaulted fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowWarning {
    pub row: usize,
    pub token: String,
    pub failures: Vec<FieldFailure>,
}

/// Everything a run produces: the client map, the diagnostics and the counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub clients: ClientMap,
    /// Tokens of the rows rejected because of a date, in row order.
    pub failed_dates: Vec<String>,
    pub stats: RunStats,
    pub rejections: Vec<Rejection>,
    pub warnings: Vec<RowWarning>,
}

/// Owns the mutable state of a single ingestion run.
#[derive(Debug)]
pub struct IngestionPipeline<'a> {
    layout: &'a ColumnLayout,
    aggregator: InvoiceAggregator,
    failed_dates: Vec<String>,
    rejections: Vec<Rejection>,
    warnings: Vec<RowWarning>,
}

impl<'a> IngestionPipeline<'a> {
    /// Validates `layout` against a source `column_count` columns wide. This is
    /// the only check that can abort a run.
    pub fn new(layout: &'a ColumnLayout, column_count: usize) -> Result<Self> {
        layout.check_width(column_count)?;
        Self::unsized_source(layout)
    }

    /// Validates `layout` only; for sources without rows, whose width is unknown.
    fn unsized_source(layout: &'a ColumnLayout) -> Result<Self> {
        layout.validate()?;
        Ok(Self {
            layout,
            aggregator: InvoiceAggregator::new(),
            failed_dates: Vec::new(),
            rejections: Vec::new(),
            warnings: Vec::new(),
        })
    }

    /// Classifies one row and folds it into the aggregate.
    pub fn process_row(&mut self, row: &RawRow) {
        let candidate = match classify_row(row, self.layout) {
            RowClass::Clean(candidate) => candidate,
            RowClass::Recovered(candidate, failures) => {
                for failure in &failures {
                    warn!(
                        row = row.number,
                        token = candidate.invoice.id(),
                        field = %failure.field,
                        raw = failure.error.raw(),
                        "defaulting unparseable value to zero"
                    );
                }
                self.warnings.push(RowWarning {
                    row: row.number,
                    token: candidate.invoice.id().to_string(),
                    failures,
                });
                candidate
            }
            RowClass::Rejected(rejection) => {
                for failure in &rejection.failures {
                    warn!(
                        row = rejection.row,
                        token = %rejection.token,
                        field = %failure.field,
                        kind = %failure.error.kind(),
                        raw = failure.error.raw(),
                        "rejecting row"
                    );
                }
                if rejection.has_date_failure() {
                    self.failed_dates.push(rejection.token.clone());
                }
                self.aggregator.record_rejection();
                self.rejections.push(rejection);
                return;
            }
        };

        self.aggregator.ingest(
            &candidate.client_id,
            &candidate.display_name,
            candidate.invoice,
        );
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> RunStats {
        self.aggregator.stats()
    }

    pub fn finish(self) -> AggregateResult {
        let (clients, stats) = self.aggregator.finish();
        info!(
            clients = stats.clients_registered,
            invoices = stats.invoices_registered,
            duplicates = stats.duplicate_skips,
            rejected = stats.rejected_rows,
            "ingestion finished"
        );
        AggregateResult {
            clients,
            failed_dates: self.failed_dates,
            stats,
            rejections: self.rejections,
            warnings: self.warnings,
        }
    }
}

/// Runs the whole pipeline over `source`. A source without rows yields an
/// empty result.
#[instrument(level = "info", skip_all, fields(rows = source.rows().len()))]
pub fn run<S: TabularSource + ?Sized>(source: &S) -> Result<AggregateResult> {
    if source.rows().is_empty() {
        return Ok(IngestionPipeline::unsized_source(source.layout())?.finish());
    }
    let mut pipeline = IngestionPipeline::new(source.layout(), source.column_count())?;
    for row in source.rows() {
        pipeline.process_row(row);
    }
    Ok(pipeline.finish())
}

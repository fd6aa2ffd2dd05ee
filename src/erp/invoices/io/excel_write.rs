use std::path::{Path, PathBuf};

use rust_xlsxwriter::Workbook;

use crate::erp::invoices::error::Result;
use crate::erp::invoices::model::Language;
use crate::erp::invoices::pipeline::{AggregateResult, Sink};
use crate::erp::invoices::report::{ReportCell, WorkbookData, build_workbook};

/// Writes the provided workbook data to the given path.
pub fn write_workbook(path: &Path, workbook: &WorkbookData) -> Result<()> {
    let mut workbook_writer = Workbook::new();

    for table in &workbook.tables {
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(&table.sheet_name)?;

        for (col_idx, header) in table.columns.iter().enumerate() {
            worksheet.write_string(0, col_idx as u16, header)?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            let sheet_row = (row_idx + 1) as u32;
            for (col_idx, cell) in row.iter().enumerate() {
                match cell {
                    ReportCell::Text(value) => {
                        worksheet.write_string(sheet_row, col_idx as u16, value)?;
                    }
                    ReportCell::Number(value) => {
                        worksheet.write_number(sheet_row, col_idx as u16, *value)?;
                    }
                }
            }
        }

        if table.rows.is_empty() {
            continue;
        }

        let mut excel_table = rust_xlsxwriter::Table::new();
        excel_table.set_autofilter(true);
        let col_end = (table.columns.len() as u16).saturating_sub(1);
        let row_end = table.rows.len() as u32;
        worksheet.add_table(0, 0, row_end, col_end, &excel_table)?;
    }

    workbook_writer.save(path)?;
    Ok(())
}

/// [`Sink`] materialising a run as an `.xlsx` report.
#[derive(Debug, Clone)]
pub struct WorkbookSink {
    path: PathBuf,
    language: Language,
}

impl WorkbookSink {
    pub fn new(path: impl Into<PathBuf>, language: Language) -> Self {
        Self {
            path: path.into(),
            language,
        }
    }
}

impl Sink for WorkbookSink {
    fn consume(&mut self, result: &AggregateResult) -> Result<()> {
        let workbook = build_workbook(result, self.language);
        write_workbook(&self.path, &workbook)
    }
}

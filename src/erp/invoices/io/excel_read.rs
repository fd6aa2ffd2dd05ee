use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use chrono::{Days, NaiveDate};

use crate::erp::invoices::config::EtlConfig;
use crate::erp::invoices::error::{EtlError, Result};
use crate::erp::invoices::model::{CellValue, RawRow};
use crate::erp::invoices::pipeline::SheetSource;

/// Reads the ERP export sheet described by `config` into an in-memory source.
///
/// Column positions are absolute sheet columns: column A is position 0 even
/// when the used range of the sheet starts further right.
pub fn read_source(path: &Path, config: &EtlConfig) -> Result<SheetSource> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let sheet = match &config.sheet {
        Some(name) => name.clone(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| EtlError::InvalidWorkbook("workbook has no sheets".into()))?,
    };
    let range = read_required_sheet(&mut workbook, &sheet)?;

    let (Some((start_row, _)), Some((end_row, end_col))) = (range.start(), range.end()) else {
        return Ok(SheetSource::new(config.layout.clone(), 0, Vec::new()));
    };
    let column_count = end_col as usize + 1;
    let first_row = start_row.max(config.header_rows);

    let rows = (first_row..=end_row)
        .map(|row| {
            let cells = (0..=end_col)
                .map(|col| to_cell_value(range.get_value((row, col))))
                .collect();
            RawRow::new(row as usize + 1, cells)
        })
        .collect();

    Ok(SheetSource::new(config.layout.clone(), column_count, rows))
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<calamine::Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| EtlError::InvalidWorkbook(format!("missing sheet '{name}'")))?;
    let range = range_result.map_err(EtlError::from)?;
    Ok(range)
}

fn to_cell_value(cell: Option<&DataType>) -> CellValue {
    match cell {
        Some(DataType::String(value)) => CellValue::Text(value.clone()),
        Some(DataType::Float(value)) => CellValue::Number(*value),
        Some(DataType::Int(value)) => CellValue::Number(*value as f64),
        Some(DataType::Bool(value)) => CellValue::Bool(*value),
        Some(DataType::DateTime(serial)) => match serial_to_date(*serial) {
            Some(date) => CellValue::Date(date),
            None => CellValue::Number(*serial),
        },
        Some(DataType::Error(error)) => CellValue::Error(error.to_string()),
        Some(DataType::Empty) | None => CellValue::Empty,
        Some(other) => {
            let text = other.to_string();
            match parse_iso_date(&text) {
                Some(date) => CellValue::Date(date),
                None => CellValue::Text(text),
            }
        }
    }
}

/// Converts an Excel serial day number (1900 date system) into a date.
fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial.trunc() as u64))
}

fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    let prefix = text.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

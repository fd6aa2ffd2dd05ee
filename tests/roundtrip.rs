use std::fs;
use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use invoice_etl::EtlError;
use invoice_etl::config::EtlConfig;
use invoice_etl::convert;
use invoice_etl::model::Language;
use invoice_etl::report::{CLIENTS_SHEET, DIAGNOSTICS_SHEET, INVOICES_SHEET};
use rust_xlsxwriter::Workbook;
use tempfile::tempdir;

const HEADERS: [&str; 10] = [
    "Scadenza",
    "Codice cliente",
    "Nominativo",
    "Data",
    "Numero",
    "Pagamento",
    "Importo",
    "Pagato",
    "Anticipo",
    "Note",
];

/// Writes an ERP-style export: a header row followed by `rows`, every cell a
/// string except the amounts given as numbers.
fn write_export(path: &Path, sheet: &str, rows: &[[&str; 8]], numeric_amount: Option<f64>) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet).expect("sheet named");

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .expect("header written");
    }
    for (row_idx, row) in rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            if !value.is_empty() {
                worksheet
                    .write_string((row_idx + 1) as u32, col as u16, *value)
                    .expect("cell written");
            }
        }
        worksheet
            .write_string((row_idx + 1) as u32, 8, "S")
            .expect("flag written");
    }
    if let Some(amount) = numeric_amount {
        let row = (rows.len() + 1) as u32;
        let cells = ["30/06/2024", "D", "Delta Srl", "01/06/2024", "FT-40"];
        for (col, value) in cells.iter().enumerate() {
            worksheet
                .write_string(row, col as u16, *value)
                .expect("cell written");
        }
        worksheet.write_number(row, 6, amount).expect("amount written");
    }

    workbook.save(path).expect("export saved");
}

fn sample_rows() -> Vec<[&'static str; 8]> {
    vec![
        ["31/01/2024", "A", "Alfa Spa", "01/01/2024", "FT-1", "RB", "1.234,56", "234,56"],
        ["31/01/2024", "A", "Alfa Spa", "01/01/2024", "FT-1", "RB", "999,00", ""],
        ["28/02/2024", "B", "Beta Snc", "01/02/2024", "NC-2", "BB", "-50,00", ""],
        ["Totale ordine lettura", "", "", "", "", "", "1.184,56", ""],
        ["31/04/2024", "B", "Beta Snc", "01/03/2024", "FT-3", "BB", "10,00", ""],
    ]
}

fn cell_text(range: &calamine::Range<DataType>, row: u32, col: u32) -> String {
    match range.get_value((row, col)) {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn cell_number(range: &calamine::Range<DataType>, row: u32, col: u32) -> f64 {
    match range.get_value((row, col)) {
        Some(DataType::Float(value)) => *value,
        Some(DataType::Int(value)) => *value as f64,
        other => panic!("expected a number at ({row}, {col}), got {other:?}"),
    }
}

#[test]
fn export_workbook_becomes_client_report() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("export.xlsx");
    let output = temp_dir.path().join("report.xlsx");
    write_export(&input, "uploadSheetClients", &sample_rows(), Some(75.5));

    let config = EtlConfig::default();
    let stats = convert::excel_to_excel(&input, &output, &config).expect("conversion");

    assert_eq!(stats.clients_registered, 3);
    assert_eq!(stats.invoices_registered, 3);
    assert_eq!(stats.duplicate_skips, 1);
    assert_eq!(stats.rejected_rows, 2);

    let mut report: Xlsx<_> = open_workbook(&output).expect("report opened");
    let invoices = report
        .worksheet_range(INVOICES_SHEET)
        .expect("invoice sheet present")
        .expect("invoice sheet read");

    assert_eq!(cell_text(&invoices, 0, 0), "Client code");
    assert_eq!(cell_text(&invoices, 1, 0), "A");
    assert_eq!(cell_text(&invoices, 1, 1), "Alfa Spa");
    assert_eq!(cell_text(&invoices, 1, 2), "FT-1");
    assert_eq!(cell_text(&invoices, 1, 3), "01/01/2024");
    assert!((cell_number(&invoices, 1, 5) - 1234.56).abs() < 1e-9);
    assert!((cell_number(&invoices, 1, 7) - 1000.0).abs() < 1e-9);
    assert_eq!(cell_text(&invoices, 2, 0), "B");
    assert_eq!(cell_text(&invoices, 2, 8), "Credit note");
    assert_eq!(cell_text(&invoices, 3, 0), "D");
    assert!((cell_number(&invoices, 3, 5) - 75.5).abs() < 1e-9);

    let clients = report
        .worksheet_range(CLIENTS_SHEET)
        .expect("client sheet present")
        .expect("client sheet read");
    assert_eq!(cell_text(&clients, 1, 0), "A");
    assert_eq!(cell_text(&clients, 2, 0), "B");
    assert_eq!(cell_text(&clients, 3, 0), "D");

    let diagnostics = report
        .worksheet_range(DIAGNOSTICS_SHEET)
        .expect("diagnostics sheet present")
        .expect("diagnostics sheet read");
    assert_eq!(cell_text(&diagnostics, 1, 0), "Rejected rows");
    assert!((cell_number(&diagnostics, 1, 1) - 2.0).abs() < 1e-9);
    assert_eq!(cell_text(&diagnostics, 5, 0), "Rejected");
}

#[test]
fn export_workbook_becomes_json_document() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("export.xlsx");
    let output = temp_dir.path().join("report.json");
    write_export(&input, "Sheet1", &sample_rows(), None);

    convert::excel_to_json(&input, &output, &EtlConfig::default()).expect("conversion");

    let written = fs::read_to_string(&output).expect("JSON read");
    let parsed: serde_json::Value = serde_json::from_str(&written).expect("JSON parsed");

    assert_eq!(parsed["stats"]["clients_registered"], 2);
    assert_eq!(parsed["stats"]["duplicate_skips"], 1);
    assert_eq!(parsed["stats"]["rejected_rows"], 2);
    assert_eq!(parsed["clients"]["A"]["name"], "Alfa Spa");
    assert_eq!(parsed["clients"]["B"]["invoices"][0]["kind"], "CREDIT_NOTE");
    assert_eq!(parsed["clients"]["B"]["invoices"][0]["date"], "2024-02-01");
    assert_eq!(
        parsed["failed_dates"],
        serde_json::json!(["missing_invoice_uuid_in_row", "FT-3"])
    );
}

#[test]
fn configured_layout_and_language_are_applied() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("export.xlsx");
    let output = temp_dir.path().join("report.xlsx");
    write_export(&input, "uploadSheetClients", &sample_rows(), None);

    let config = EtlConfig::from_toml(
        r#"
            sheet = "uploadSheetClients"
            language = "it"

            [layout]
            invoice_note = 8
        "#,
    )
    .expect("config parsed");
    assert_eq!(config.language, Language::It);
    assert_eq!(config.header_rows, 1);
    assert_eq!(config.layout.amount, 6);

    convert::excel_to_excel(&input, &output, &config).expect("conversion");

    let mut report: Xlsx<_> = open_workbook(&output).expect("report opened");
    let invoices = report
        .worksheet_range(INVOICES_SHEET)
        .expect("invoice sheet present")
        .expect("invoice sheet read");
    assert_eq!(cell_text(&invoices, 0, 0), "Codice cliente");
    assert_eq!(cell_text(&invoices, 1, 8), "Fattura");
    assert_eq!(cell_text(&invoices, 1, 10), "S");
    assert_eq!(cell_text(&invoices, 2, 8), "Nota di credito");
}

#[test]
fn missing_sheet_is_fatal() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("export.xlsx");
    write_export(&input, "Sheet1", &sample_rows(), None);

    let config = EtlConfig::default().with_sheet(Some("uploadSheetClients".into()));
    let error = convert::ingest_workbook(&input, &config).unwrap_err();
    assert!(matches!(error, EtlError::InvalidWorkbook(_)));
}

#[test]
fn missing_input_is_fatal() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("absent.xlsx");
    let error = convert::ingest_workbook(&input, &EtlConfig::default()).unwrap_err();
    assert!(matches!(error, EtlError::MissingInput(_)));
}

#[test]
fn invalid_config_is_rejected() {
    assert!(matches!(
        EtlConfig::from_toml("[layout]\nclient_id = 0\n"),
        Err(EtlError::InvalidLayout(_))
    ));
    assert!(matches!(
        EtlConfig::from_toml("unknown_key = true\n"),
        Err(EtlError::Config(_))
    ));
    assert!(matches!(
        EtlConfig::from_toml("header_rows = 5000000000\n"),
        Err(EtlError::Config(_))
    ));
}

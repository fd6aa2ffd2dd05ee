//! Flattens an [`AggregateResult`] into plain tables ready to be written as
//! worksheets.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::erp::invoices::model::Language;
use crate::erp::invoices::pipeline::AggregateResult;

/// Sheet listing one row per registered invoice.
pub const INVOICES_SHEET: &str = "ClientInvoices";
/// Sheet listing one row per client with its outstanding total.
pub const CLIENTS_SHEET: &str = "Clients";
/// Sheet holding run counters, rejected rows and warnings.
pub const DIAGNOSTICS_SHEET: &str = "Diagnostics";

/// Value of one output cell.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportCell {
    Text(String),
    Number(f64),
}

impl ReportCell {
    fn text(value: impl Into<String>) -> Self {
        ReportCell::Text(value.into())
    }

    fn date(value: NaiveDate) -> Self {
        ReportCell::Text(value.format("%d/%m/%Y").to_string())
    }

    fn amount(value: Decimal) -> Self {
        match value.to_f64() {
            Some(number) => ReportCell::Number(number),
            None => ReportCell::Text(value.to_string()),
        }
    }

    fn count(value: usize) -> Self {
        ReportCell::Number(value as f64)
    }
}

/// A table that will be materialised as an Excel sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<ReportCell>>,
}

/// Represents all tables required to materialise the Excel workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookData {
    pub tables: Vec<SheetTable>,
}

impl WorkbookData {
    pub fn table(&self, sheet_name: &str) -> Option<&SheetTable> {
        self.tables.iter().find(|table| table.sheet_name == sheet_name)
    }
}

/// Builds the invoice, client and diagnostics tables. Rows keep the
/// first-seen order of clients and invoices.
pub fn build_workbook(result: &AggregateResult, language: Language) -> WorkbookData {
    WorkbookData {
        tables: vec![
            invoices_table(result, language),
            clients_table(result, language),
            diagnostics_table(result, language),
        ],
    }
}

fn invoices_table(result: &AggregateResult, language: Language) -> SheetTable {
    let columns = match language {
        Language::En => [
            "Client code",
            "Client name",
            "Invoice ID",
            "Issue date",
            "Due date",
            "Amount",
            "Paid",
            "Outstanding",
            "Document type",
            "Payment method",
            "Invoice note",
        ],
        Language::It => [
            "Codice cliente",
            "Nominativo",
            "ID Fattura",
            "Data emissione",
            "Scadenza",
            "Totale da ricevere",
            "Pagamento ricevuto",
            "Residuo da pagare",
            "Tipologia fattura",
            "Metodo di pagamento",
            "Note fattura",
        ],
    };

    let rows = result
        .clients
        .iter()
        .flat_map(|client| {
            client.invoices().iter().map(move |invoice| {
                vec![
                    ReportCell::text(client.id()),
                    ReportCell::text(client.name()),
                    ReportCell::text(invoice.id()),
                    ReportCell::date(invoice.date()),
                    ReportCell::date(invoice.due_date()),
                    ReportCell::amount(invoice.amount()),
                    ReportCell::amount(invoice.paid()),
                    ReportCell::amount(invoice.amount_outstanding()),
                    ReportCell::text(invoice.kind().label(language)),
                    ReportCell::text(invoice.payment_type().unwrap_or_default()),
                    ReportCell::text(invoice.note().unwrap_or_default()),
                ]
            })
        })
        .collect();

    SheetTable {
        sheet_name: INVOICES_SHEET.to_string(),
        columns: columns.iter().map(|column| column.to_string()).collect(),
        rows,
    }
}

fn clients_table(result: &AggregateResult, language: Language) -> SheetTable {
    let columns = match language {
        Language::En => ["Client code", "Client name", "Invoices", "Total outstanding"],
        Language::It => ["Codice cliente", "Nominativo", "Fatture", "Totale residuo"],
    };

    let rows = result
        .clients
        .iter()
        .map(|client| {
            vec![
                ReportCell::text(client.id()),
                ReportCell::text(client.name()),
                ReportCell::count(client.invoices().len()),
                ReportCell::amount(client.total_outstanding()),
            ]
        })
        .collect();

    SheetTable {
        sheet_name: CLIENTS_SHEET.to_string(),
        columns: columns.iter().map(|column| column.to_string()).collect(),
        rows,
    }
}

fn diagnostics_table(result: &AggregateResult, language: Language) -> SheetTable {
    let (columns, counters, rejected, defaulted) = match language {
        Language::En => (
            ["Entry", "Row", "Token", "Field", "Problem", "Raw value"],
            [
                "Rejected rows",
                "Duplicate rows skipped",
                "Invoices registered",
                "Clients registered",
            ],
            "Rejected",
            "Defaulted to zero",
        ),
        Language::It => (
            ["Voce", "Riga", "Riferimento", "Campo", "Problema", "Valore originale"],
            [
                "Righe scartate",
                "Duplicati ignorati",
                "Fatture registrate",
                "Nuovi clienti",
            ],
            "Scartata",
            "Impostato a zero",
        ),
    };

    let stats = &result.stats;
    let values = [
        stats.rejected_rows,
        stats.duplicate_skips,
        stats.invoices_registered,
        stats.clients_registered,
    ];
    let mut rows: Vec<Vec<ReportCell>> = counters
        .iter()
        .zip(values)
        .map(|(label, value)| vec![ReportCell::text(*label), ReportCell::count(value)])
        .collect();

    for rejection in &result.rejections {
        for failure in &rejection.failures {
            rows.push(vec![
                ReportCell::text(rejected),
                ReportCell::count(rejection.row),
                ReportCell::text(rejection.token.as_str()),
                ReportCell::text(failure.field.as_str()),
                ReportCell::text(failure.error.kind().label(language)),
                ReportCell::text(failure.error.raw()),
            ]);
        }
    }

    for warning in &result.warnings {
        for failure in &warning.failures {
            rows.push(vec![
                ReportCell::text(defaulted),
                ReportCell::count(warning.row),
                ReportCell::text(warning.token.as_str()),
                ReportCell::text(failure.field.as_str()),
                ReportCell::text(failure.error.kind().label(language)),
                ReportCell::text(failure.error.raw()),
            ]);
        }
    }

    SheetTable {
        sheet_name: DIAGNOSTICS_SHEET.to_string(),
        columns: columns.iter().map(|column| column.to_string()).collect(),
        rows,
    }
}

//! Row classification: runs every sanitizer over one raw row and decides
//! whether the row is usable as-is, usable with defaults, or rejected.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::erp::invoices::error::SanitizeError;
use crate::erp::invoices::model::{CellValue, ColumnLayout, Field, Invoice, RawRow};
use crate::erp::invoices::sanitize::{
    classify_amount, sanitize_amount, sanitize_date, sanitize_identifier,
};

/// Diagnostic token used when the invoice identifier of a row is unusable.
pub const MISSING_INVOICE_TOKEN: &str = "missing_invoice_uuid_in_row";

/// A sanitizer failure tagged with the field it originated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldFailure {
    pub field: Field,
    pub error: SanitizeError,
}

/// Outcome of sanitizing one field of a row.
pub type SanitizedField<T> = std::result::Result<T, FieldFailure>;

/// A fully typed invoice ready to be folded into the aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceCandidate {
    pub client_id: String,
    /// Client name copied verbatim from the row.
    pub display_name: String,
    pub invoice: Invoice,
}

/// A row that cannot be used, with every failure found on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub row: usize,
    pub token: String,
    pub failures: Vec<FieldFailure>,
}

impl Rejection {
    /// Whether at least one failure came from date sanitization.
    pub fn has_date_failure(&self) -> bool {
        self.failures.iter().any(|failure| failure.field.is_date())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowClass {
    /// Every field sanitized cleanly.
    Clean(InvoiceCandidate),
    /// Usable, but optional fields were replaced by their defaults.
    Recovered(InvoiceCandidate, Vec<FieldFailure>),
    Rejected(Rejection),
}

/// Sanitizes the fields of `row` in dependency order (identifiers first, then
/// dates, then amounts) and classifies the result. Sanitizer failures never
/// escape: they become a rejection or a defaulted paid amount.
pub fn classify_row(row: &RawRow, layout: &ColumnLayout) -> RowClass {
    let invoice_id = sanitize_field(
        row,
        layout,
        Field::InvoiceId,
        MISSING_INVOICE_TOKEN,
        sanitize_identifier,
    );
    let token = match &invoice_id {
        Ok(id) => id.clone(),
        Err(_) => MISSING_INVOICE_TOKEN.to_string(),
    };

    let client_id = sanitize_field(row, layout, Field::ClientId, &token, sanitize_identifier);
    let date = sanitize_field(row, layout, Field::InvoiceDate, &token, sanitize_date);
    let due_date = sanitize_field(row, layout, Field::DueDate, &token, sanitize_date);
    let amount = sanitize_field(row, layout, Field::Amount, &token, sanitize_amount);
    let paid = sanitize_field(row, layout, Field::PaidAmount, &token, sanitize_amount);
    let kind = match &amount {
        Ok(value) => classify_amount(*value, &token).map_err(|error| FieldFailure {
            field: Field::Amount,
            error,
        }),
        Err(failure) => Err(failure.clone()),
    };

    match (client_id, invoice_id, date, due_date, amount, kind) {
        (Ok(client_id), Ok(invoice_id), Ok(date), Ok(due_date), Ok(amount), Ok(kind)) => {
            let (paid, defaulted) = match paid {
                Ok(paid) => (paid, Vec::new()),
                Err(failure) => (Decimal::ZERO, vec![failure]),
            };
            let invoice = Invoice::new(
                invoice_id,
                client_id.clone(),
                date,
                due_date,
                amount,
                paid,
                kind,
            )
            .with_details(
                optional_text(row, layout, Field::PaymentType),
                optional_text(row, layout, Field::InvoiceNote),
            );
            let candidate = InvoiceCandidate {
                client_id,
                display_name: required_cell(row, layout, Field::ClientName).to_string(),
                invoice,
            };
            if defaulted.is_empty() {
                RowClass::Clean(candidate)
            } else {
                RowClass::Recovered(candidate, defaulted)
            }
        }
        (client_id, invoice_id, date, due_date, _, kind) => {
            // `kind` already carries the amount failure when the amount did not parse.
            let failures = [
                client_id.err(),
                invoice_id.err(),
                date.err(),
                due_date.err(),
                kind.err(),
            ]
            .into_iter()
            .flatten()
            .collect();
            RowClass::Rejected(Rejection {
                row: row.number,
                token,
                failures,
            })
        }
    }
}

fn sanitize_field<T>(
    row: &RawRow,
    layout: &ColumnLayout,
    field: Field,
    token: &str,
    sanitizer: impl Fn(&CellValue, &str) -> std::result::Result<T, SanitizeError>,
) -> SanitizedField<T> {
    sanitizer(required_cell(row, layout, field), token)
        .map_err(|error| FieldFailure { field, error })
}

fn required_cell<'r>(row: &'r RawRow, layout: &ColumnLayout, field: Field) -> &'r CellValue {
    match layout.position(field) {
        Some(position) => row.cell(position),
        None => row.cell(usize::MAX),
    }
}

fn optional_text(row: &RawRow, layout: &ColumnLayout, field: Field) -> Option<String> {
    let position = layout.position(field)?;
    let cell = row.cell(position);
    if cell.is_empty() {
        None
    } else {
        Some(cell.to_string())
    }
}

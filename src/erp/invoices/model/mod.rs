use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::erp::invoices::error::{EtlError, Result};

/// A single untyped cell as delivered by the tabular source.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Blank cell or a position past the end of the row.
    #[default]
    Empty,
    /// Free text.
    Text(String),
    /// Numeric cell.
    Number(f64),
    /// Boolean cell.
    Bool(bool),
    /// A cell the spreadsheet already typed as a date.
    Date(NaiveDate),
    /// Spreadsheet error cell such as `#N/A`.
    Error(String),
}

impl CellValue {
    /// Whether the cell carries no value at all.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.is_empty(),
            _ => false,
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(value) => f.write_str(value),
            CellValue::Number(value) => write!(f, "{value}"),
            CellValue::Bool(value) => write!(f, "{value}"),
            CellValue::Date(value) => write!(f, "{}", value.format("%d/%m/%Y")),
            CellValue::Error(value) => f.write_str(value),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

/// One positional record from the source together with its 1-based row
/// number in the originating sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub number: usize,
    pub cells: Vec<CellValue>,
}

impl RawRow {
    pub fn new(number: usize, cells: Vec<CellValue>) -> Self {
        Self { number, cells }
    }

    /// Returns the cell at `position`, or an empty cell when the row is shorter.
    pub fn cell(&self, position: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.cells.get(position).unwrap_or(&EMPTY)
    }
}

/// Logical fields of the ERP invoice export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Field {
    ClientId,
    ClientName,
    InvoiceId,
    InvoiceDate,
    DueDate,
    Amount,
    PaidAmount,
    PaymentType,
    InvoiceNote,
}

impl Field {
    /// Fields without which no row can be processed.
    pub const REQUIRED: [Field; 7] = [
        Field::ClientId,
        Field::ClientName,
        Field::InvoiceId,
        Field::InvoiceDate,
        Field::DueDate,
        Field::Amount,
        Field::PaidAmount,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::ClientId => "CLIENT_ID",
            Field::ClientName => "CLIENT_NAME",
            Field::InvoiceId => "INVOICE_ID",
            Field::InvoiceDate => "INVOICE_DATE",
            Field::DueDate => "DUE_DATE",
            Field::Amount => "AMOUNT",
            Field::PaidAmount => "PAID_AMOUNT",
            Field::PaymentType => "PAYMENT_TYPE",
            Field::InvoiceNote => "INVOICE_NOTE",
        }
    }

    /// Whether a failure on this field comes from date sanitization.
    pub fn is_date(&self) -> bool {
        matches!(self, Field::InvoiceDate | Field::DueDate)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Zero-based column position of every logical field. Missing keys in a
/// configuration file fall back to the ERP export layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnLayout {
    pub due_date: usize,
    pub client_id: usize,
    pub client_name: usize,
    pub invoice_date: usize,
    pub invoice_id: usize,
    pub payment_type: Option<usize>,
    pub amount: usize,
    pub paid_amount: usize,
    pub invoice_note: Option<usize>,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            due_date: 0,
            client_id: 1,
            client_name: 2,
            invoice_date: 3,
            invoice_id: 4,
            payment_type: Some(5),
            amount: 6,
            paid_amount: 7,
            invoice_note: Some(9),
        }
    }
}

impl ColumnLayout {
    /// Position of `field`, or `None` for an optional field that is not mapped.
    pub fn position(&self, field: Field) -> Option<usize> {
        match field {
            Field::ClientId => Some(self.client_id),
            Field::ClientName => Some(self.client_name),
            Field::InvoiceId => Some(self.invoice_id),
            Field::InvoiceDate => Some(self.invoice_date),
            Field::DueDate => Some(self.due_date),
            Field::Amount => Some(self.amount),
            Field::PaidAmount => Some(self.paid_amount),
            Field::PaymentType => self.payment_type,
            Field::InvoiceNote => self.invoice_note,
        }
    }

    /// Every mapped field with its position.
    pub fn mapped(&self) -> Vec<(Field, usize)> {
        Field::REQUIRED
            .iter()
            .chain([Field::PaymentType, Field::InvoiceNote].iter())
            .filter_map(|field| self.position(*field).map(|position| (*field, position)))
            .collect()
    }

    /// Rejects layouts mapping two fields onto the same column.
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashMap<usize, Field> = HashMap::new();
        for (field, position) in self.mapped() {
            if let Some(previous) = seen.insert(position, field) {
                return Err(EtlError::InvalidLayout(format!(
                    "fields {previous} and {field} both map to column {position}"
                )));
            }
        }
        Ok(())
    }

    /// Checks that every required field exists in a source `width` columns wide.
    pub fn check_width(&self, width: usize) -> Result<()> {
        for field in Field::REQUIRED {
            let position = self.position(field).unwrap_or_default();
            if position >= width {
                return Err(EtlError::MissingColumn {
                    field,
                    position,
                    width,
                });
            }
        }
        Ok(())
    }
}

/// Language used for report headers and labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    It,
}

/// Document classification derived from the sign of the gross amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceKind {
    Invoice,
    CreditNote,
    /// Zero amounts; never stored in an aggregate.
    Invalid,
}

impl InvoiceKind {
    pub fn label(&self, language: Language) -> &'static str {
        match (self, language) {
            (InvoiceKind::Invoice, Language::En) => "Invoice",
            (InvoiceKind::Invoice, Language::It) => "Fattura",
            (InvoiceKind::CreditNote, Language::En) => "Credit note",
            (InvoiceKind::CreditNote, Language::It) => "Nota di credito",
            (InvoiceKind::Invalid, Language::En) => "Invalid",
            (InvoiceKind::Invalid, Language::It) => "Errore",
        }
    }
}

/// A validated invoice or credit note. Values are fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invoice {
    id: String,
    client_id: String,
    date: NaiveDate,
    due_date: NaiveDate,
    amount: Decimal,
    paid: Decimal,
    amount_outstanding: Decimal,
    kind: InvoiceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    payment_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

impl Invoice {
    pub fn new(
        id: impl Into<String>,
        client_id: impl Into<String>,
        date: NaiveDate,
        due_date: NaiveDate,
        amount: Decimal,
        paid: Decimal,
        kind: InvoiceKind,
    ) -> Self {
        Self {
            id: id.into(),
            client_id: client_id.into(),
            date,
            due_date,
            amount,
            paid,
            amount_outstanding: amount - paid,
            kind,
            payment_type: None,
            note: None,
        }
    }

    /// Attaches the free-text payment type and note copied from the row.
    pub fn with_details(mut self, payment_type: Option<String>, note: Option<String>) -> Self {
        self.payment_type = payment_type;
        self.note = note;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn paid(&self) -> Decimal {
        self.paid
    }

    /// Gross amount minus paid amount.
    pub fn amount_outstanding(&self) -> Decimal {
        self.amount_outstanding
    }

    pub fn kind(&self) -> InvoiceKind {
        self.kind
    }

    pub fn payment_type(&self) -> Option<&str> {
        self.payment_type.as_deref()
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }
}

/// A client and the invoices registered for it, in first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    id: String,
    name: String,
    invoices: Vec<Invoice>,
}

impl Client {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            invoices: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name exactly as first seen in the export.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    pub fn invoice(&self, id: &str) -> Option<&Invoice> {
        self.invoices.iter().find(|invoice| invoice.id == id)
    }

    /// Sum of the outstanding amount of every invoice and credit note.
    pub fn total_outstanding(&self) -> Decimal {
        self.invoices
            .iter()
            .map(Invoice::amount_outstanding)
            .sum()
    }

    pub(crate) fn push_invoice(&mut self, invoice: Invoice) {
        self.invoices.push(invoice);
    }
}

/// Client identifier → [`Client`] mapping that iterates in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientMap {
    clients: Vec<Client>,
    index: HashMap<String, usize>,
}

impl ClientMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Client> {
        self.index.get(id).map(|&slot| &self.clients[slot])
    }

    /// Clients in first-seen order.
    pub fn iter(&self) -> std::slice::Iter<'_, Client> {
        self.clients.iter()
    }

    /// Total number of invoices across every client.
    pub fn invoice_count(&self) -> usize {
        self.clients.iter().map(|client| client.invoices.len()).sum()
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Client> {
        match self.index.get(id) {
            Some(&slot) => self.clients.get_mut(slot),
            None => None,
        }
    }

    /// Appends `client`; an id already present keeps its first-seen client.
    pub(crate) fn insert(&mut self, client: Client) {
        if self.index.contains_key(&client.id) {
            return;
        }
        self.index.insert(client.id.clone(), self.clients.len());
        self.clients.push(client);
    }
}

impl Serialize for Client {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Client", 4)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("total_outstanding", &self.total_outstanding())?;
        state.serialize_field("invoices", &self.invoices)?;
        state.end()
    }
}

impl<'a> IntoIterator for &'a ClientMap {
    type Item = &'a Client;
    type IntoIter = std::slice::Iter<'a, Client>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for ClientMap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.clients.iter().map(|client| (&client.id, client)))
    }
}

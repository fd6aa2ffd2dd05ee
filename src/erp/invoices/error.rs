use std::path::PathBuf;

use thiserror::Error;

use crate::erp::invoices::model::{Field, Language};

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, EtlError>;

/// Error type covering the failures that abort a whole run: unreadable
/// inputs, malformed layouts, and sink failures. Per-row problems never
/// surface here; see [`SanitizeError`].
#[derive(Debug, Error)]
pub enum EtlError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when the export workbook does not contain the expected sheet.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when the TOML configuration cannot be parsed.
    #[error("config parse error: {0}")]
    Config(String),

    /// Raised when the column layout is structurally unusable.
    #[error("invalid column layout: {0}")]
    InvalidLayout(String),

    /// Raised when a required field points past the last column of the source.
    #[error("column {position} for field {field} is missing: source has {width} column(s)")]
    MissingColumn {
        field: Field,
        position: usize,
        width: usize,
    },

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

/// Tag identifying why a single cell was refused by a sanitizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidIdentifier,
    InvalidDate,
    WrongValueType,
    NotANumber,
    ZeroAmount,
}

impl ErrorKind {
    /// Stable machine-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidIdentifier => "INVALID_IDENTIFIER",
            ErrorKind::InvalidDate => "INVALID_DATE",
            ErrorKind::WrongValueType => "WRONG_VALUE_TYPE",
            ErrorKind::NotANumber => "NOT_A_NUMBER",
            ErrorKind::ZeroAmount => "ZERO_AMOUNT",
        }
    }

    /// Human-readable description used by reports.
    pub fn label(&self, language: Language) -> &'static str {
        match (self, language) {
            (ErrorKind::InvalidIdentifier, Language::En) => "Missing or invalid identifier",
            (ErrorKind::InvalidIdentifier, Language::It) => "Codice univoco assente o non valido",
            (ErrorKind::InvalidDate, Language::En) => "Date in unknown format",
            (ErrorKind::InvalidDate, Language::It) => "Data in formato sconosciuto",
            (ErrorKind::WrongValueType, Language::En) => "Unsuitable value",
            (ErrorKind::WrongValueType, Language::It) => "Valore non idoneo",
            (ErrorKind::NotANumber, Language::En) => "Value is not a finite number",
            (ErrorKind::NotANumber, Language::It) => "Il valore non è un numero finito",
            (ErrorKind::ZeroAmount, Language::En) => "Unable to determine the document type",
            (ErrorKind::ZeroAmount, Language::It) => {
                "Errore nel definire la tipologia del documento"
            }
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure raised by a field sanitizer. Each variant keeps the offending raw
/// value (rendered as text) and the diagnostic token of the row.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SanitizeError {
    #[error("invalid identifier '{raw}' (token {token})")]
    InvalidIdentifier { raw: String, token: String },

    #[error("invalid date '{raw}' (token {token})")]
    InvalidDate { raw: String, token: String },

    #[error("wrong value type '{raw}' (token {token})")]
    WrongValueType { raw: String, token: String },

    #[error("'{raw}' is not a finite number (token {token})")]
    NotANumber { raw: String, token: String },

    #[error("zero amount '{raw}' is neither an invoice nor a credit note (token {token})")]
    ZeroAmount { raw: String, token: String },
}

impl SanitizeError {
    pub fn new(kind: ErrorKind, raw: impl Into<String>, token: impl Into<String>) -> Self {
        let raw = raw.into();
        let token = token.into();
        match kind {
            ErrorKind::InvalidIdentifier => SanitizeError::InvalidIdentifier { raw, token },
            ErrorKind::InvalidDate => SanitizeError::InvalidDate { raw, token },
            ErrorKind::WrongValueType => SanitizeError::WrongValueType { raw, token },
            ErrorKind::NotANumber => SanitizeError::NotANumber { raw, token },
            ErrorKind::ZeroAmount => SanitizeError::ZeroAmount { raw, token },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SanitizeError::InvalidIdentifier { .. } => ErrorKind::InvalidIdentifier,
            SanitizeError::InvalidDate { .. } => ErrorKind::InvalidDate,
            SanitizeError::WrongValueType { .. } => ErrorKind::WrongValueType,
            SanitizeError::NotANumber { .. } => ErrorKind::NotANumber,
            SanitizeError::ZeroAmount { .. } => ErrorKind::ZeroAmount,
        }
    }

    pub fn raw(&self) -> &str {
        match self {
            SanitizeError::InvalidIdentifier { raw, .. }
            | SanitizeError::InvalidDate { raw, .. }
            | SanitizeError::WrongValueType { raw, .. }
            | SanitizeError::NotANumber { raw, .. }
            | SanitizeError::ZeroAmount { raw, .. } => raw,
        }
    }

    pub fn token(&self) -> &str {
        match self {
            SanitizeError::InvalidIdentifier { token, .. }
            | SanitizeError::InvalidDate { token, .. }
            | SanitizeError::WrongValueType { token, .. }
            | SanitizeError::NotANumber { token, .. }
            | SanitizeError::ZeroAmount { token, .. } => token,
        }
    }
}

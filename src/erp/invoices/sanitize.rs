//! Field sanitizers turning one raw cell into a typed value.
//!
//! Every function is pure: it either returns the normalized value or a
//! [`SanitizeError`] tagged with the raw input and the diagnostic token of the
//! row. Deciding what a failure means for the row is left to
//! [`classify`](crate::classify).

use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

use crate::erp::invoices::error::{ErrorKind, SanitizeError};
use crate::erp::invoices::model::{CellValue, InvoiceKind};

/// Latest year accepted for issue and due dates.
pub const MAX_YEAR: i32 = 2030;
/// Digits required in the year of a textual date; two-digit years are refused.
const YEAR_DIGITS: usize = 4;

/// Largest magnitude at which an `f64` still represents every integer exactly.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Normalizes a client or invoice identifier: trims it, collapses internal
/// whitespace and uppercases ASCII letters.
pub fn sanitize_identifier(raw: &CellValue, token: &str) -> Result<String, SanitizeError> {
    let normalized = match raw {
        CellValue::Text(value) => value
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_uppercase(),
        CellValue::Number(value) if value.is_finite() => {
            if value.fract() == 0.0 && value.abs() < EXACT_INTEGER_LIMIT {
                format!("{}", *value as i64)
            } else {
                value.to_string()
            }
        }
        _ => String::new(),
    };

    if normalized.is_empty() {
        return Err(SanitizeError::new(
            ErrorKind::InvalidIdentifier,
            raw.to_string(),
            token,
        ));
    }
    Ok(normalized)
}

/// Accepts a typed date or a `day/month/year` string.
pub fn sanitize_date(raw: &CellValue, token: &str) -> Result<NaiveDate, SanitizeError> {
    let fail = |kind| Err(SanitizeError::new(kind, raw.to_string(), token));

    match raw {
        CellValue::Date(date) => {
            if date.year() > MAX_YEAR {
                return fail(ErrorKind::InvalidDate);
            }
            Ok(*date)
        }
        CellValue::Text(value) if !value.trim().is_empty() => {
            let parts: Vec<&str> = value.trim().split('/').collect();
            if parts.len() != 3 {
                return fail(ErrorKind::WrongValueType);
            }

            let year_text = parts[2].trim();
            let (Ok(day), Ok(month), Ok(year)) = (
                parts[0].trim().parse::<u32>(),
                parts[1].trim().parse::<u32>(),
                year_text.parse::<i32>(),
            ) else {
                return fail(ErrorKind::WrongValueType);
            };

            if year_text.len() != YEAR_DIGITS {
                return fail(ErrorKind::InvalidDate);
            }
            match NaiveDate::from_ymd_opt(year, month, day) {
                Some(date) if date.year() <= MAX_YEAR => Ok(date),
                _ => fail(ErrorKind::InvalidDate),
            }
        }
        _ => fail(ErrorKind::WrongValueType),
    }
}

/// Parses a monetary amount written with `.` as thousands separator and `,`
/// as decimal separator. Blank cells mean "no amount" and yield zero.
pub fn sanitize_amount(raw: &CellValue, token: &str) -> Result<Decimal, SanitizeError> {
    match raw {
        CellValue::Empty => Ok(Decimal::ZERO),
        CellValue::Number(value) => Decimal::from_f64(*value)
            .filter(|_| value.is_finite())
            .ok_or_else(|| SanitizeError::new(ErrorKind::NotANumber, raw.to_string(), token)),
        CellValue::Text(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Ok(Decimal::ZERO);
            }
            let cleaned = trimmed.replace('.', "").replacen(',', ".", 1);
            Decimal::from_str(&cleaned)
                .map_err(|_| SanitizeError::new(ErrorKind::NotANumber, value.as_str(), token))
        }
        CellValue::Bool(_) | CellValue::Date(_) | CellValue::Error(_) => Err(SanitizeError::new(
            ErrorKind::WrongValueType,
            raw.to_string(),
            token,
        )),
    }
}

/// Positive amounts are invoices, negative ones credit notes. A zero amount
/// is never a legitimate document and fails.
pub fn classify_amount(amount: Decimal, token: &str) -> Result<InvoiceKind, SanitizeError> {
    if amount > Decimal::ZERO {
        Ok(InvoiceKind::Invoice)
    } else if amount < Decimal::ZERO {
        Ok(InvoiceKind::CreditNote)
    } else {
        Err(SanitizeError::new(
            ErrorKind::ZeroAmount,
            amount.to_string(),
            token,
        ))
    }
}

use chrono::NaiveDate;
use invoice_etl::error::{ErrorKind, SanitizeError};
use invoice_etl::model::{CellValue, InvoiceKind};
use invoice_etl::sanitize::{classify_amount, sanitize_amount, sanitize_date, sanitize_identifier};
use rust_decimal::Decimal;

fn text(value: &str) -> CellValue {
    CellValue::Text(value.to_string())
}

fn date_kind(raw: CellValue) -> ErrorKind {
    sanitize_date(&raw, "FT-1").expect_err("date rejected").kind()
}

#[test]
fn valid_day_month_year_strings_roundtrip() {
    for year in [1990, 2000, 2024, 2030] {
        for month in 1..=12u32 {
            for day in [1u32, 9, 15, 28] {
                let raw = text(&format!("{day}/{month}/{year}"));
                let date = sanitize_date(&raw, "FT-1").expect("valid date");
                assert_eq!(date, NaiveDate::from_ymd_opt(year, month, day).unwrap());
            }
        }
    }
}

#[test]
fn zero_padded_and_month_end_dates_are_accepted() {
    assert_eq!(
        sanitize_date(&text("05/03/2024"), "FT-1").unwrap(),
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    );
    assert_eq!(
        sanitize_date(&text(" 31/12/2029 "), "FT-1").unwrap(),
        NaiveDate::from_ymd_opt(2029, 12, 31).unwrap()
    );
    assert_eq!(
        sanitize_date(&text("29/2/2024"), "FT-1").unwrap(),
        NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
    );
}

#[test]
fn overflowing_calendar_dates_are_invalid() {
    assert_eq!(date_kind(text("31/4/2024")), ErrorKind::InvalidDate);
    assert_eq!(date_kind(text("29/2/2023")), ErrorKind::InvalidDate);
    assert_eq!(date_kind(text("0/1/2024")), ErrorKind::InvalidDate);
    assert_eq!(date_kind(text("1/13/2024")), ErrorKind::InvalidDate);
}

#[test]
fn years_after_ceiling_are_invalid() {
    assert_eq!(date_kind(text("1/1/2031")), ErrorKind::InvalidDate);
    let typed = NaiveDate::from_ymd_opt(2045, 6, 1).unwrap();
    assert_eq!(date_kind(CellValue::Date(typed)), ErrorKind::InvalidDate);
}

#[test]
fn four_digit_years_before_1900_roundtrip() {
    assert_eq!(
        sanitize_date(&text("15/6/1899"), "FT-1").expect("valid date"),
        NaiveDate::from_ymd_opt(1899, 6, 15).unwrap()
    );
    assert_eq!(
        sanitize_date(&text("1/1/1066"), "FT-1").expect("valid date"),
        NaiveDate::from_ymd_opt(1066, 1, 1).unwrap()
    );
}

#[test]
fn two_digit_years_are_invalid() {
    assert_eq!(date_kind(text("1/1/24")), ErrorKind::InvalidDate);
    assert_eq!(date_kind(text("1/1/99")), ErrorKind::InvalidDate);
    assert_eq!(date_kind(text("1/1/024")), ErrorKind::InvalidDate);
}

#[test]
fn typed_dates_within_ceiling_pass_through() {
    let typed = NaiveDate::from_ymd_opt(2030, 12, 31).unwrap();
    assert_eq!(sanitize_date(&CellValue::Date(typed), "FT-1").unwrap(), typed);
}

#[test]
fn malformed_date_inputs_are_wrong_type() {
    assert_eq!(date_kind(CellValue::Empty), ErrorKind::WrongValueType);
    assert_eq!(date_kind(text("")), ErrorKind::WrongValueType);
    assert_eq!(date_kind(text("2024-01-15")), ErrorKind::WrongValueType);
    assert_eq!(date_kind(text("15/01")), ErrorKind::WrongValueType);
    assert_eq!(date_kind(text("1/2/3/2024")), ErrorKind::WrongValueType);
    assert_eq!(date_kind(text("aa/bb/cccc")), ErrorKind::WrongValueType);
    assert_eq!(date_kind(text("Totale ordine lettura")), ErrorKind::WrongValueType);
    assert_eq!(date_kind(CellValue::Number(45000.0)), ErrorKind::WrongValueType);
}

#[test]
fn date_failures_keep_raw_value_and_token() {
    let error = sanitize_date(&text("31/4/2024"), "FT-77").unwrap_err();
    assert_eq!(
        error,
        SanitizeError::InvalidDate {
            raw: "31/4/2024".into(),
            token: "FT-77".into(),
        }
    );
}

#[test]
fn european_amount_strings_are_parsed() {
    assert_eq!(
        sanitize_amount(&text("1.234,56"), "FT-1").unwrap(),
        Decimal::new(123456, 2)
    );
    assert_eq!(
        sanitize_amount(&text("-50,00"), "FT-1").unwrap(),
        Decimal::new(-50, 0)
    );
    assert_eq!(
        sanitize_amount(&text("1.000.000"), "FT-1").unwrap(),
        Decimal::new(1_000_000, 0)
    );
    assert_eq!(sanitize_amount(&text("42"), "FT-1").unwrap(), Decimal::new(42, 0));
}

#[test]
fn empty_amounts_are_zero() {
    assert_eq!(sanitize_amount(&text(""), "FT-1").unwrap(), Decimal::ZERO);
    assert_eq!(sanitize_amount(&text("   "), "FT-1").unwrap(), Decimal::ZERO);
    assert_eq!(sanitize_amount(&CellValue::Empty, "FT-1").unwrap(), Decimal::ZERO);
}

#[test]
fn numeric_amounts_are_returned_unchanged() {
    assert_eq!(
        sanitize_amount(&CellValue::Number(12.5), "FT-1").unwrap(),
        Decimal::new(125, 1)
    );
    assert_eq!(
        sanitize_amount(&CellValue::Number(-300.0), "FT-1").unwrap(),
        Decimal::new(-300, 0)
    );
}

#[test]
fn unparseable_amounts_are_rejected() {
    let error = sanitize_amount(&text("abc"), "FT-9").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::NotANumber);
    assert_eq!(error.raw(), "abc");
    assert_eq!(error.token(), "FT-9");

    let error = sanitize_amount(&CellValue::Number(f64::INFINITY), "FT-9").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::NotANumber);

    let error = sanitize_amount(&CellValue::Number(1e30), "FT-9").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::NotANumber);

    let error = sanitize_amount(&CellValue::Bool(true), "FT-9").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::WrongValueType);

    let typed = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let error = sanitize_amount(&CellValue::Date(typed), "FT-9").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::WrongValueType);
}

#[test]
fn amount_sign_drives_document_kind() {
    assert_eq!(
        classify_amount(Decimal::new(5, 0), "FT-1").unwrap(),
        InvoiceKind::Invoice
    );
    assert_eq!(
        classify_amount(Decimal::new(-5, 0), "FT-1").unwrap(),
        InvoiceKind::CreditNote
    );
    let error = classify_amount(Decimal::ZERO, "FT-1").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::ZeroAmount);
}

#[test]
fn identifiers_are_trimmed_and_uppercased() {
    assert_eq!(
        sanitize_identifier(&text("  ab   12 "), "row").unwrap(),
        "AB 12"
    );
    assert_eq!(
        sanitize_identifier(&text("ft/2024/001"), "row").unwrap(),
        "FT/2024/001"
    );
}

#[test]
fn integral_numeric_identifiers_drop_the_fraction() {
    assert_eq!(
        sanitize_identifier(&CellValue::Number(1234.0), "row").unwrap(),
        "1234"
    );
    assert_eq!(
        sanitize_identifier(&CellValue::Number(12.5), "row").unwrap(),
        "12.5"
    );
}

#[test]
fn blank_identifiers_are_invalid() {
    for raw in [CellValue::Empty, text(""), text("   "), CellValue::Bool(false)] {
        let error = sanitize_identifier(&raw, "row").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidIdentifier);
    }
    let error = sanitize_identifier(&CellValue::Number(f64::NAN), "row").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::InvalidIdentifier);
}

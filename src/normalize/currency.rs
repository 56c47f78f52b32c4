//! Parsing of currency-formatted and date cells.

use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

use crate::models::CellValue;

/// Currency markers stripped from either end of an amount, lowercase.
const CURRENCY_MARKERS: [&str; 7] = ["bs.", "bs", "us$", "usd", "eur", "$", "€"];

/// Date layouts accepted for text cells.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];

/// Parses a currency-formatted string.
///
/// Accepts currency markers (`Bs`, `Bs.`, `$`, `USD`, `€`), whitespace or
/// apostrophe digit grouping, a leading minus sign or accounting
/// parentheses for negatives. Separators:
/// - when both `.` and `,` appear, the rightmost one is the decimal separator;
/// - a separator that repeats, or appears once followed by exactly three
///   digits, groups thousands;
/// - otherwise a single separator is the decimal point.
///
/// Returns `None` when the text is not an amount.
///
/// # Examples
///
/// ```
/// use payroll_engine::normalize::parse_currency;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let dec = |s| Decimal::from_str(s).unwrap();
/// assert_eq!(parse_currency("Bs 3,500.50"), Some(dec("3500.50")));
/// assert_eq!(parse_currency("3.500,50"), Some(dec("3500.50")));
/// assert_eq!(parse_currency("2750,5"), Some(dec("2750.5")));
/// assert_eq!(parse_currency("(120.00)"), Some(dec("-120.00")));
/// assert_eq!(parse_currency("n/a"), None);
/// ```
pub fn parse_currency(raw: &str) -> Option<Decimal> {
    let mut text = raw.trim().to_lowercase();
    let mut negative = false;

    if text.starts_with('(') && text.ends_with(')') && text.len() >= 2 {
        negative = true;
        text = text[1..text.len() - 1].to_string();
    }

    let mut body = strip_currency_markers(&text);
    if body.starts_with('-') {
        negative = !negative;
        body = strip_currency_markers(&body[1..]);
    }

    let compact: String = body.chars().filter(|c| *c != ' ' && *c != '\'').collect();
    if !compact.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    if !compact
        .chars()
        .all(|c| c.is_ascii_digit() || c == '.' || c == ',')
    {
        return None;
    }

    let normalized = resolve_separators(&compact)?;
    let value = Decimal::from_str(&normalized).ok()?;
    Some(if negative { -value } else { value })
}

fn strip_currency_markers(text: &str) -> String {
    let mut current = text.trim();
    loop {
        let before = current;
        for marker in CURRENCY_MARKERS {
            if let Some(rest) = current.strip_prefix(marker) {
                current = rest.trim_start();
            }
            if let Some(rest) = current.strip_suffix(marker) {
                current = rest.trim_end();
            }
        }
        if current == before {
            return current.to_string();
        }
    }
}

fn resolve_separators(text: &str) -> Option<String> {
    let last_dot = text.rfind('.');
    let last_comma = text.rfind(',');

    let normalized = match (last_dot, last_comma) {
        (Some(dot), Some(comma)) if dot > comma => text.replace(',', ""),
        (Some(_), Some(_)) => text.replace('.', "").replace(',', "."),
        (Some(_), None) => single_separator(text, '.'),
        (None, Some(_)) => single_separator(text, ','),
        (None, None) => text.to_string(),
    };

    if normalized.starts_with('.') || normalized.ends_with('.') {
        return None;
    }
    Some(normalized)
}

fn single_separator(text: &str, separator: char) -> String {
    let groups: Vec<&str> = text.split(separator).collect();
    let groups_thousands = groups.len() > 2 || groups.last().is_some_and(|g| g.len() == 3);
    if groups_thousands {
        groups.concat()
    } else {
        text.replace(separator, ".")
    }
}

/// Converts a cell to a decimal amount.
///
/// Returns `Ok(None)` for blank cells and `Err(message)` when the content is
/// not an amount.
pub fn cell_to_decimal(cell: &CellValue) -> Result<Option<Decimal>, String> {
    match cell {
        CellValue::Blank => Ok(None),
        CellValue::Number(n) => {
            if !n.is_finite() {
                return Err("not a finite number".to_string());
            }
            Decimal::from_f64(*n)
                .map(Some)
                .ok_or_else(|| "number out of range".to_string())
        }
        CellValue::Text(text) if text.trim().is_empty() => Ok(None),
        CellValue::Text(text) => parse_currency(text)
            .map(Some)
            .ok_or_else(|| "not a monetary amount".to_string()),
    }
}

/// Converts a cell to a date.
///
/// Numeric cells are spreadsheet serial dates (days since 1899-12-30).
pub fn cell_to_date(cell: &CellValue) -> Result<Option<NaiveDate>, String> {
    match cell {
        CellValue::Blank => Ok(None),
        CellValue::Number(n) => {
            if !n.is_finite() || *n < 1.0 || *n > 2_958_465.0 {
                return Err("serial date out of range".to_string());
            }
            let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).ok_or("invalid epoch")?;
            epoch
                .checked_add_signed(Duration::days(n.trunc() as i64))
                .map(Some)
                .ok_or_else(|| "serial date out of range".to_string())
        }
        CellValue::Text(text) if text.trim().is_empty() => Ok(None),
        CellValue::Text(text) => {
            let text = text.trim();
            // Spreadsheet exports sometimes append a midnight time.
            let date_part = text.split_whitespace().next().unwrap_or(text);
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
                .map(Some)
                .ok_or_else(|| "not a date (expected YYYY-MM-DD or DD/MM/YYYY)".to_string())
        }
    }
}

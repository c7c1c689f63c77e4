//! Useful functions for reading SIE fields.

use crate::{Date, Decimal, Error, ErrorLevel, ErrorType, Source};
use std::str::FromStr;

/// Markers of which at least one appears in any SIE export.
const MARKERS: [&str; 4] = ["#FLAGGA", "#SIETYP", "#KONTO", "#VER"];

/// Tells whether `text` looks like a SIE export. This is a cheap check for
/// marker keywords, not a grammar check.
pub fn is_valid(text: &str) -> bool {
    if text.trim().is_empty() {
        return false;
    }
    MARKERS.iter().any(|marker| text.contains(marker))
}

/// Strips one pair of surrounding double quotes.
#[inline]
pub fn unquote(field: &str) -> &str {
    if field.len() >= 2 && field.starts_with('"') && field.ends_with('"') {
        &field[1..field.len() - 1]
    } else {
        field
    }
}

/// Returns `None` for a missing field or a `""` placeholder.
pub fn present<'a>(field: Option<&&'a str>) -> Option<&'a str> {
    match field {
        Some(field) if !unquote(field).is_empty() => Some(field),
        _ => None,
    }
}

fn syntax_error(msg: String, src: &Source) -> Error {
    Error {
        msg,
        src: src.clone(),
        r#type: ErrorType::Syntax,
        level: ErrorLevel::Error,
    }
}

fn is_number(s: &str) -> bool {
    let digits = s.strip_prefix(|c: char| c == '-' || c == '+').unwrap_or(s);
    let mut parts = digits.splitn(2, '.');
    let int = parts.next().unwrap_or("");
    let frac = parts.next().unwrap_or("");
    (!int.is_empty() || !frac.is_empty())
        && int.bytes().all(|b| b.is_ascii_digit())
        && frac.bytes().all(|b| b.is_ascii_digit())
}

/// Parses a [`Decimal`](crate::Decimal) written with a `.` decimal point and
/// pushes the error into `errors`.
pub fn parse_decimal(num_str: &str, src: &Source, errors: &mut Vec<Error>) -> Option<Decimal> {
    let num_str = unquote(num_str);
    if !is_number(num_str) {
        errors.push(syntax_error(format!("Invalid number {}.", num_str), src));
        return None;
    }
    match Decimal::from_str(num_str) {
        Ok(num) => Some(num),
        Err(e) => {
            errors.push(syntax_error(format!("Invalid number {}: {}.", num_str, e), src));
            None
        }
    }
}

/// Parses a `YYYYMMDD` date and pushes the error into `errors`.
pub fn parse_date(date_str: &str, src: &Source, errors: &mut Vec<Error>) -> Option<Date> {
    let date_str = unquote(date_str);
    let date = if date_str.len() == 8 && date_str.bytes().all(|b| b.is_ascii_digit()) {
        let year = date_str[0..4].parse::<i32>().ok();
        let month = date_str[4..6].parse::<u32>().ok();
        let day = date_str[6..8].parse::<u32>().ok();
        match (year, month, day) {
            (Some(year), Some(month), Some(day)) => Date::from_ymd_opt(year, month, day),
            _ => None,
        }
    } else {
        None
    };
    if date.is_none() {
        errors.push(syntax_error(format!("Invalid date {}.", date_str), src));
    }
    date
}

/// Parses a signed year index and pushes the error into `errors`.
pub fn parse_year_index(index_str: &str, src: &Source, errors: &mut Vec<Error>) -> Option<i32> {
    let index_str = unquote(index_str);
    match index_str.parse::<i32>() {
        Ok(index) => Some(index),
        Err(_) => {
            errors.push(syntax_error(format!("Invalid year index {}.", index_str), src));
            None
        }
    }
}

//! Display helpers for list and detail views.

use crate::config::DateBoundary;
use crate::constants::EMPTY_PLACEHOLDER;
use chrono::{DateTime, NaiveDate, Utc};

pub fn format_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format("%d/%m/%Y").to_string(),
        None => EMPTY_PLACEHOLDER.to_string(),
    }
}

/// `dd/mm/yyyy HH:MM` in the boundary zone.
pub fn format_date_time(instant: Option<DateTime<Utc>>, boundary: DateBoundary) -> String {
    match instant {
        Some(i) => boundary.local_datetime(i).format("%d/%m/%Y %H:%M").to_string(),
        None => EMPTY_PLACEHOLDER.to_string(),
    }
}

/// Masks 10- and 11-digit Brazilian phone numbers; anything else is returned unchanged.
pub fn format_phone(phone: Option<&str>) -> String {
    let Some(phone) = phone.filter(|p| !p.is_empty()) else {
        return EMPTY_PLACEHOLDER.to_string();
    };

    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        11 => format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..]),
        10 => format!("({}) {}-{}", &digits[..2], &digits[2..6], &digits[6..]),
        _ => phone.to_string(),
    }
}

pub fn format_percentage(value: f64) -> String {
    let sign = if value >= 0.0 { "+" } else { "" };
    format!("{sign}{value:.1}%")
}

/// Cuts `text` to `max_chars` characters, appending `…` when shortened.
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((byte_index, _)) => format!("{}…", &text[..byte_index]),
    }
}

pub fn or_placeholder(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or(EMPTY_PLACEHOLDER)
}

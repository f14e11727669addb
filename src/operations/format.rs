use chrono::{DateTime, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

pub const CURRENCY_SYMBOL: &str = "₹";
pub const INVALID_DATE: &str = "Invalid Date";

/// Whole-unit amount with comma thousands separators, e.g. `₹1,234,567`.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().trunc().to_string();
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{}{}", CURRENCY_SYMBOL, sign, group_thousands(&digits))
}

/// Renders a `YYYY-MM-DD` date (or an RFC 3339 instant) as `DD/MM/YYYY`.
pub fn format_date(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return INVALID_DATE.to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return format_naive_date(date);
    }
    match DateTime::parse_from_rfc3339(raw) {
        Ok(instant) => format_naive_date(instant.date_naive()),
        Err(_) => INVALID_DATE.to_string(),
    }
}

pub fn format_naive_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// `"2024-01"` becomes `"January 2024"`.
pub fn format_month(month_key: &str) -> String {
    match NaiveDate::parse_from_str(&format!("{}-01", month_key), "%Y-%m-%d") {
        Ok(first_day) => first_day.format("%B %Y").to_string(),
        Err(_) => month_key.to_string(),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

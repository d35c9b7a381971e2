use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::types::{ConfigKey, OutputFormat};

/// Parses a duration expression such as `720h`, `30d`, `1mo2w` or `90m`.
///
/// Supported units are months (`mo`, counted as 30 days), weeks (`w`),
/// days (`d`), hours (`h`) and minutes (`m`). Segments may be chained.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let s = input.trim();
    if s.is_empty() {
        return Err("duration cannot be empty".to_string());
    }

    let mut total = Duration::zero();
    let mut chars = s.chars().peekable();

    while let Some(&next) = chars.peek() {
        if !next.is_ascii_alphanumeric() {
            return Err(format!("invalid duration '{s}': unexpected character '{next}'"));
        }

        let mut digits = String::new();
        while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
            digits.push(c);
            chars.next();
        }

        let mut unit = String::new();
        while let Some(c) = chars.peek().copied().filter(char::is_ascii_alphabetic) {
            unit.push(c.to_ascii_lowercase());
            chars.next();
        }

        if digits.is_empty() {
            return Err(format!("invalid duration '{s}': expected a number before '{unit}'"));
        }
        if unit.is_empty() {
            return Err(format!(
                "invalid duration '{s}': missing unit after '{digits}' (use mo, w, d, h or m)"
            ));
        }

        let amount: i64 = digits
            .parse()
            .map_err(|_| format!("invalid duration '{s}': '{digits}' is too large"))?;

        let segment = match unit.as_str() {
            "mo" => amount.checked_mul(30).and_then(Duration::try_days),
            "w" => Duration::try_weeks(amount),
            "d" => Duration::try_days(amount),
            "h" => Duration::try_hours(amount),
            "m" => Duration::try_minutes(amount),
            other => {
                return Err(format!(
                    "invalid duration '{s}': unknown unit '{other}' (use mo, w, d, h or m)"
                ));
            }
        }
        .ok_or_else(|| format!("invalid duration '{s}': value out of range"))?;

        total = total
            .checked_add(&segment)
            .ok_or_else(|| format!("invalid duration '{s}': value out of range"))?;
    }

    Ok(total)
}

/// Value parser for duration flags; keeps the original expression.
pub fn validate_duration(input: &str) -> Result<String, String> {
    parse_duration(input).map(|_| input.trim().to_string())
}

pub fn parse_output_format(input: &str) -> Result<OutputFormat, String> {
    input.parse()
}

pub fn parse_config_key(input: &str) -> Result<ConfigKey, String> {
    input.parse()
}

/// Parses an RFC 3339 timestamp or a plain `YYYY-MM-DD` date (midnight UTC).
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, String> {
    let s = input.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| {
            format!("invalid timestamp '{s}': expected RFC 3339 (2024-01-31T08:00:00Z) or YYYY-MM-DD")
        })
}

/// Masks a secret for display, keeping only its first four characters.
pub fn mask_secret(secret: &str) -> String {
    if secret.chars().count() <= 4 {
        return "****".to_string();
    }

    let prefix: String = secret.chars().take(4).collect();
    format!("{prefix}****")
}

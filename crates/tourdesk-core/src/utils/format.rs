use chrono::{NaiveDate, NaiveTime};

/// Truncate a string to a maximum number of characters, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional string, returning a default if None or blank
pub fn format_optional(value: &Option<String>, default: &str) -> String {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Format a date string to a more readable format
pub fn format_date(date: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        dt.format("%b %d, %Y").to_string()
    } else if let Some(day) = date.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()) {
        day.format("%b %d, %Y").to_string()
    } else {
        date.to_string()
    }
}

/// Reduce `HH:MM:SS` to `HH:MM`. Anything else is returned trimmed.
pub fn format_time(time: &str) -> String {
    let time = time.trim();
    match NaiveTime::parse_from_str(time, "%H:%M:%S") {
        Ok(t) => t.format("%H:%M").to_string(),
        Err(_) => time.to_string(),
    }
}

/// Prices arrive as strings of whole rupiah.
pub fn format_price(price: &Option<String>) -> String {
    match price.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        Some(p) => format!("Rp {}", p),
        None => "-".to_string(),
    }
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Café Braga", 6), "Caf...");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2025-03-07"), "Mar 07, 2025");
        assert_eq!(format_date("2025-03-07T10:00:00Z"), "Mar 07, 2025");
        assert_eq!(format_date("soon"), "soon");
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time("09:30:00"), "09:30");
        assert_eq!(format_time("09:30"), "09:30");
        assert_eq!(format_time(" 14:05:59 "), "14:05");
    }

    #[test]
    fn test_format_price_and_optional() {
        assert_eq!(format_price(&Some("150000".to_string())), "Rp 150000");
        assert_eq!(format_price(&None), "-");
        assert_eq!(format_optional(&Some(" ".to_string()), "-"), "-");
        assert_eq!(format_optional(&Some("Bandung".to_string()), "-"), "Bandung");
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Tangkuban Perahu", "perahu"));
        assert!(!contains_ignore_case("Kawah Putih", "merapi"));
    }
}

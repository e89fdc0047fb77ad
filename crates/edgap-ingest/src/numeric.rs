//! Numeric parsing and formatting shared by cleaning and export.

/// Parses a string as f64, returning None for invalid or empty strings.
pub fn parse_f64(value: &str) -> Option<f64> {
    if value.trim().is_empty() {
        return None;
    }
    value.trim().parse::<f64>().ok()
}

/// Formats a floating-point number without a trailing `.0` on whole values,
/// so exported tables stay byte-stable across runs.
pub fn format_numeric(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{format_numeric, parse_f64};

    #[test]
    fn test_parse_f64() {
        assert_eq!(parse_f64(" 3.5 "), Some(3.5));
        assert_eq!(parse_f64(""), None);
        assert_eq!(parse_f64("abc"), None);
    }

    #[test]
    fn test_format_numeric_strips_trailing_zeros() {
        assert_eq!(format_numeric(10.0), "10");
        assert_eq!(format_numeric(100.0), "100");
        assert_eq!(format_numeric(10.5), "10.5");
        assert_eq!(format_numeric(0.25), "0.25");
    }
}

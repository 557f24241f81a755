//! Cell parsing shared by deduplication and the warehouse loader
//!
//! Upstream exports write integer columns that contained gaps as floats
//! (`3.0`), so integral floats are accepted where an integer is expected.

/// Parse an integer cell; `None` for anything that is not an integral number
pub fn parse_int(cell: &str) -> Option<i64> {
    let trimmed = cell.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }

    let value = trimmed.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

/// Parse a floating point cell
pub fn parse_float(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Whether a cell is empty or only whitespace
pub fn is_blank(cell: &str) -> bool {
    cell.trim().is_empty()
}

/// Whether a numeric cell holds no value: blank, or a NaN as pandas writes it
///
/// Only the exact spellings `NaN` and `nan` count; text columns use
/// [`is_blank`] so a value such as `Nan` is kept as written.
pub fn is_null_number(cell: &str) -> bool {
    let trimmed = cell.trim();
    trimmed.is_empty() || trimmed == "NaN" || trimmed == "nan"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int(" -7 "), Some(-7));
        assert_eq!(parse_int("3.0"), Some(3));
        assert_eq!(parse_int("3.5"), None);
        assert_eq!(parse_int("abc"), None);
        assert_eq!(parse_int(""), None);
    }

    #[test]
    fn floats() {
        assert_eq!(parse_float("19.99"), Some(19.99));
        assert_eq!(parse_float("inf"), None);
        assert_eq!(parse_float("x"), None);
    }

    #[test]
    fn blank_cells() {
        assert!(is_blank(""));
        assert!(is_blank("  "));
        assert!(!is_blank("NaN"));
        assert!(!is_blank("Nan"));
    }

    #[test]
    fn numeric_nulls() {
        assert!(is_null_number(""));
        assert!(is_null_number(" NaN "));
        assert!(is_null_number("nan"));
        assert!(!is_null_number("NAN"));
        assert!(!is_null_number("Nan"));
        assert!(!is_null_number("0"));
    }
}

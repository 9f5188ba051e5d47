// Price-per-kWh input rules shared by the TUI and the persisted store.

/// Interpret the text of the price field.
///
/// A non-negative decimal is accepted as-is and an empty field means zero.
/// Anything else returns `None` and the caller keeps the previous price.
pub fn parse_price_input(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Some(v),
        _ => None,
    }
}

/// Text shown in the price field. Zero renders as an empty field.
pub fn format_price_input(price: f64) -> String {
    if price == 0.0 {
        String::new()
    } else {
        price.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_non_negative_decimals() {
        assert_eq!(parse_price_input("12.5"), Some(12.5));
        assert_eq!(parse_price_input(" 9 "), Some(9.0));
        assert_eq!(parse_price_input("0"), Some(0.0));
    }

    #[test]
    fn empty_means_zero() {
        assert_eq!(parse_price_input(""), Some(0.0));
        assert_eq!(parse_price_input("   "), Some(0.0));
    }

    #[test]
    fn rejects_negative_and_garbage() {
        assert_eq!(parse_price_input("-1"), None);
        assert_eq!(parse_price_input("abc"), None);
        assert_eq!(parse_price_input("1.2.3"), None);
        assert_eq!(parse_price_input("NaN"), None);
        assert_eq!(parse_price_input("inf"), None);
    }

    #[test]
    fn zero_price_displays_empty() {
        assert_eq!(format_price_input(0.0), "");
        assert_eq!(format_price_input(9.0), "9");
        assert_eq!(format_price_input(7.25), "7.25");
    }
}

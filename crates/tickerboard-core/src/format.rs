//! Display helpers for optional figures.

/// Marker shown for every absent value.
pub const NOT_AVAILABLE: &str = "N/A";

/// `$1,234.56`, or `N/A`.
pub fn price(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_owned(), |value| format!("${}", grouped(value)))
}

/// `1.23%`, or `N/A`.
pub fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_owned(), |value| format!("{value:.2}%"))
}

/// Raw market capitalization as `$2,345.67B`, or `N/A`.
pub fn market_cap(value: Option<f64>) -> String {
    value.map_or_else(
        || NOT_AVAILABLE.to_owned(),
        |value| format!("${}B", grouped(value / 1e9)),
    )
}

/// Two decimals with comma-separated thousands.
fn grouped(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut digits = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            digits.push(',');
        }
        digits.push(digit);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{digits}.{fraction}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_prices_with_thousands() {
        assert_eq!(price(Some(1234.561)), "$1,234.56");
        assert_eq!(price(Some(99.5)), "$99.50");
        assert_eq!(price(Some(1_000_000.0)), "$1,000,000.00");
        assert_eq!(price(None), "N/A");
    }

    #[test]
    fn formats_percentages() {
        assert_eq!(percent(Some(1.234)), "1.23%");
        assert_eq!(percent(Some(-0.5)), "-0.50%");
        assert_eq!(percent(None), "N/A");
    }

    #[test]
    fn formats_market_cap_in_billions() {
        assert_eq!(market_cap(Some(2_345_670_000_000.0)), "$2,345.67B");
        assert_eq!(market_cap(None), "N/A");
    }
}

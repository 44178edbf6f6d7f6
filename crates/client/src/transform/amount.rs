//! Currency amount parsing.

use std::sync::LazyLock;

use regex::Regex;

static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("digit run regex"));

/// Numeric value and ISO currency code extracted from free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedAmount {
    pub numeric: i64,
    pub currency: &'static str,
}

impl Default for ParsedAmount {
    fn default() -> Self {
        Self { numeric: 0, currency: "USD" }
    }
}

/// Parse an amount like `"$2,500"` or `"€1.000 - €3.000"`.
///
/// Thousands separators (`,`) are removed and only the first digit run is
/// read, so ranges resolve to their lower bound and decimals are dropped.
/// Absent text and the literal `varies` yield `0 USD`.
pub fn parse_amount(text: Option<&str>) -> ParsedAmount {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return ParsedAmount::default();
    };

    if text.eq_ignore_ascii_case("varies") {
        return ParsedAmount::default();
    }

    let stripped = text.replace(',', "");
    let numeric = DIGIT_RUN
        .find(&stripped)
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .unwrap_or(0);

    ParsedAmount { numeric, currency: detect_currency(text) }
}

fn detect_currency(text: &str) -> &'static str {
    if text.contains('€') {
        "EUR"
    } else if text.contains('£') {
        "GBP"
    } else if text.contains("CAD") {
        "CAD"
    } else {
        "USD"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dollar_amount_with_separator() {
        assert_eq!(parse_amount(Some("$2,500")), ParsedAmount { numeric: 2500, currency: "USD" });
    }

    #[test]
    fn test_range_takes_first_digit_run() {
        assert_eq!(parse_amount(Some("$1,000 - $2,000")).numeric, 1000);
    }

    #[test]
    fn test_decimal_is_truncated() {
        assert_eq!(parse_amount(Some("$1,250.75")).numeric, 1250);
    }

    #[test]
    fn test_varies_and_absent() {
        assert_eq!(parse_amount(Some("Varies")), ParsedAmount::default());
        assert_eq!(parse_amount(Some("  varies ")), ParsedAmount::default());
        assert_eq!(parse_amount(None), ParsedAmount::default());
        assert_eq!(parse_amount(Some("")), ParsedAmount::default());
    }

    #[test]
    fn test_no_digits() {
        assert_eq!(parse_amount(Some("Full tuition")), ParsedAmount { numeric: 0, currency: "USD" });
    }

    #[test]
    fn test_currency_detection() {
        assert_eq!(parse_amount(Some("€5,000")).currency, "EUR");
        assert_eq!(parse_amount(Some("£750")).currency, "GBP");
        assert_eq!(parse_amount(Some("3000 CAD")).currency, "CAD");
        assert_eq!(parse_amount(Some("$3000")).currency, "USD");
    }

    #[test]
    fn test_overflow_falls_back_to_zero() {
        assert_eq!(parse_amount(Some("$99999999999999999999999")).numeric, 0);
    }
}

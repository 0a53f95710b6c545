//! Payment extraction for order transcripts.

use std::str::FromStr;

use regex::Regex;
use rust_decimal::Decimal;

use super::patterns::{payment_pattern, AMOUNT_DIGITS};
use super::{ExtractionMatch, FieldExtractor};
use crate::error::ConfigError;

/// Payment field extractor (`Cod 150,000 ກີບ`).
#[derive(Debug, Clone)]
pub struct PaymentExtractor {
    pattern: Regex,
}

impl PaymentExtractor {
    pub fn new(keyword: &str, unit: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            pattern: payment_pattern(keyword, unit)?,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

impl FieldExtractor for PaymentExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.pattern.find(text).map(ExtractionMatch::from_regex)
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.pattern.find_iter(text).map(ExtractionMatch::from_regex).collect()
    }
}

/// Parse the amount out of a payment string, e.g. `Cod 150,000 ກີບ` -> 150000.
///
/// Kip amounts carry no minor unit, so `.` and `,` are both grouping separators.
pub fn parse_payment_amount(payment: &str) -> Option<Decimal> {
    let digits: String = AMOUNT_DIGITS
        .find(payment)?
        .as_str()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();

    Decimal::from_str(&digits).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> PaymentExtractor {
        PaymentExtractor::new("Cod", "ກີບ").unwrap()
    }

    #[test]
    fn test_extract_payment() {
        let result = extractor().extract("FB: Cod 150,000 ກີບ ລູທີນ 2").unwrap();
        assert_eq!(result.value, "Cod 150,000 ກີບ");
        assert_eq!(result.position, Some((4, 4 + "Cod 150,000 ກີບ".len())));
    }

    #[test]
    fn test_payment_requires_unit() {
        assert!(extractor().extract("Cod 150,000").is_none());
        assert!(extractor().extract("cod 150,000 ກີບ").is_none());
        assert!(extractor().is_match("ຍອດ Cod   90.000   ກີບ"));
    }

    #[test]
    fn test_extract_all_payments() {
        let results = extractor().extract_all("Cod 10,000 ກີບ / Cod 20,000 ກີບ");
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].value, "Cod 20,000 ກີບ");
    }

    #[test]
    fn test_parse_payment_amount() {
        assert_eq!(parse_payment_amount("Cod 150,000 ກີບ"), Some(Decimal::from(150_000)));
        assert_eq!(parse_payment_amount("Cod 1.250.000 ກີບ"), Some(Decimal::from(1_250_000)));
        assert_eq!(parse_payment_amount("-"), None);
    }
}

//! Quantity extraction for order transcripts.

use regex::Regex;

use super::patterns::quantity_pattern;
use super::{ExtractionMatch, FieldExtractor};
use crate::error::ConfigError;

/// Quantity field extractor (`ລູທີນ 2`).
#[derive(Debug, Clone)]
pub struct QuantityExtractor {
    pattern: Regex,
}

impl QuantityExtractor {
    pub fn new(keyword: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            pattern: quantity_pattern(keyword)?,
        })
    }
}

impl FieldExtractor for QuantityExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.pattern.find(text).map(ExtractionMatch::from_regex)
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.pattern.find_iter(text).map(ExtractionMatch::from_regex).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_quantity() {
        let extractor = QuantityExtractor::new("ລູທີນ").unwrap();

        assert_eq!(extractor.extract("ລູທີນ 2").unwrap().value, "ລູທີນ 2");
        assert_eq!(extractor.extract("ເອົາ ລູທີນ3 ກ່ອງ").unwrap().value, "ລູທີນ3");
        assert!(extractor.extract("ລູທີນ").is_none());
    }
}

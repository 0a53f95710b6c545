//! Date extraction for order transcripts.

use chrono::NaiveDate;

use super::patterns::{DATE_INLINE, DATE_LINE};
use super::{ExtractionMatch, FieldExtractor};

/// Format used for the date column.
pub const DATE_FORMAT: &str = "%d/%m/%y";

/// Date field extractor.
///
/// Dates are kept as the matched `dd/mm/yy` text; they are not checked
/// against the calendar.
#[derive(Debug, Clone)]
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Date at the start of a dedicated date line, trailing text dropped.
    pub fn extract_line(&self, line: &str) -> Option<ExtractionMatch<String>> {
        DATE_LINE.captures(line).and_then(|caps| caps.get(1)).map(ExtractionMatch::from_regex)
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        DATE_INLINE
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(ExtractionMatch::from_regex)
            .collect()
    }
}

/// Format a calendar date for the date column.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(format_date(date), "01/02/24");

        let date = NaiveDate::from_ymd_opt(2009, 12, 31).unwrap();
        assert_eq!(format_date(date), "31/12/09");
    }

    #[test]
    fn test_extract_inline_date() {
        let extractor = DateExtractor::new();

        let result = extractor.extract("GG1001 05/03/24 ສົ່ງດ່ວນ").unwrap();
        assert_eq!(result.value, "05/03/24");
        assert_eq!(result.position, Some((7, 15)));
    }

    #[test]
    fn test_extract_line_drops_trailing_text() {
        let extractor = DateExtractor::new();

        let result = extractor.extract_line("01/02/24   ວັນສຸກ").unwrap();
        assert_eq!(result.value, "01/02/24");

        assert!(extractor.extract_line("ວັນທີ 01/02/24").is_none());
        assert!(extractor.extract_line("01/02/2024").is_none());
    }

    #[test]
    fn test_no_date() {
        let extractor = DateExtractor::new();
        assert!(extractor.extract("FB: Cod 80,000 ກີບ").is_none());
        assert!(extractor.extract_all("").is_empty());
    }
}

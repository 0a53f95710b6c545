//! Rule-based field extractors for order transcripts.

pub mod dates;
pub mod order_type;
pub mod patterns;
pub mod payment;
pub mod quantity;

pub use dates::{format_date, DateExtractor};
pub use order_type::{OrderTypeMatch, OrderTypeMatcher};
pub use payment::{parse_payment_amount, PaymentExtractor};
pub use quantity::QuantityExtractor;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the first occurrence of the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A matched field with its location in the source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Byte range in the source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}

impl ExtractionMatch<String> {
    /// Build a match whose value is the matched text itself.
    pub(crate) fn from_regex(m: regex::Match<'_>) -> Self {
        Self::new(m.as_str().to_string(), m.as_str()).with_position(m.start(), m.end())
    }
}

//! Order-type recognition by code prefix.

use std::collections::HashSet;

use regex::Regex;

use super::patterns::order_code_pattern;
use crate::error::ConfigError;
use crate::models::config::OrderTypeConfig;

/// Result of classifying a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTypeMatch {
    /// Index into the declared type list.
    pub type_index: usize,
    /// Order code for the record.
    pub code: String,
}

/// Tests lines against the declared order types, in declaration order.
#[derive(Debug, Clone)]
pub struct OrderTypeMatcher {
    patterns: Vec<(Regex, usize)>,
}

impl OrderTypeMatcher {
    pub fn new(types: &[OrderTypeConfig]) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        let mut patterns = Vec::with_capacity(types.len());

        for t in types {
            if !seen.insert(t.name.as_str()) {
                return Err(ConfigError::DuplicateType(t.name.clone()));
            }
            patterns.push((order_code_pattern(&t.name, &t.prefix)?, t.prefix.len()));
        }

        Ok(Self { patterns })
    }

    /// First declared type with a token starting with its prefix.
    ///
    /// The code is the first token longer than the bare prefix. A line whose
    /// only such tokens are the bare prefix yields the whole line as code.
    pub fn classify(&self, line: &str) -> Option<OrderTypeMatch> {
        self.patterns
            .iter()
            .enumerate()
            .find_map(|(type_index, (pattern, prefix_len))| {
                let mut tokens = pattern
                    .captures_iter(line)
                    .filter_map(|caps| caps.get(1))
                    .peekable();
                tokens.peek()?;

                let code = tokens
                    .find(|m| m.len() > *prefix_len)
                    .map_or_else(|| line.to_string(), |m| m.as_str().to_string());
                Some(OrderTypeMatch { type_index, code })
            })
    }

    pub fn is_match(&self, line: &str) -> bool {
        self.patterns.iter().any(|(pattern, _)| pattern.is_match(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> OrderTypeMatcher {
        OrderTypeMatcher::new(&[
            OrderTypeConfig::new("GG", "GG", "sheet-gg"),
            OrderTypeConfig::new("DD", "DD", "sheet-dd"),
        ])
        .unwrap()
    }

    #[test]
    fn test_classify_token() {
        let m = matcher().classify("ສັ່ງ GG1001 ດ່ວນ").unwrap();
        assert_eq!(m.type_index, 0);
        assert_eq!(m.code, "GG1001");

        let m = matcher().classify("DD2002").unwrap();
        assert_eq!(m.type_index, 1);
        assert_eq!(m.code, "DD2002");
    }

    #[test]
    fn test_first_declared_type_wins() {
        // DD appears first in the line, but GG is declared first
        let m = matcher().classify("DD1 GG2").unwrap();
        assert_eq!(m.type_index, 0);
        assert_eq!(m.code, "GG2");
    }

    #[test]
    fn test_bare_prefix_falls_back_to_line() {
        let m = matcher().classify("order GG please").unwrap();
        assert_eq!(m.code, "order GG please");
    }

    #[test]
    fn test_code_token_after_bare_prefix() {
        let m = matcher().classify("GG GG1001").unwrap();
        assert_eq!(m.code, "GG1001");
    }

    #[test]
    fn test_prefix_inside_word_is_ignored() {
        assert!(matcher().classify("FB: ADDRESS ບ້ານ").is_none());
        assert!(matcher().classify("EGG1").is_none());

        let m = matcher().classify("ADDRESS DD3").unwrap();
        assert_eq!(m.type_index, 1);
        assert_eq!(m.code, "DD3");
    }

    #[test]
    fn test_no_match() {
        assert!(matcher().classify("hello there").is_none());
        assert!(!matcher().is_match("gg1001"));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = OrderTypeMatcher::new(&[
            OrderTypeConfig::new("GG", "GG", "a"),
            OrderTypeConfig::new("GG", "GX", "b"),
        ]);
        assert!(matches!(result, Err(ConfigError::DuplicateType(_))));
    }
}

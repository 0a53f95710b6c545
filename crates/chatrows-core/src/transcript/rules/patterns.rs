//! Regex patterns for transcript extraction.
//!
//! Dates have a fixed shape and live in statics. Everything built from
//! configured literals is compiled per parser by the builders below.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ConfigError;

lazy_static! {
    // dd/mm/yy anywhere on a line, not embedded in a longer digit run.
    // ASCII digits only: amounts are summed from these.
    pub static ref DATE_INLINE: Regex = Regex::new(
        r"\b([0-9]{2}/[0-9]{2}/[0-9]{2})\b"
    ).unwrap();

    // A line that starts with dd/mm/yy; whatever follows is discarded
    pub static ref DATE_LINE: Regex = Regex::new(
        r"^([0-9]{2}/[0-9]{2}/[0-9]{2})\b"
    ).unwrap();

    // Thousands separators inside a payment amount
    pub static ref AMOUNT_DIGITS: Regex = Regex::new(
        r"[0-9][0-9.,\s]*"
    ).unwrap();
}

/// A token starting with `<prefix>`; the code is capture group 1.
pub fn order_code_pattern(name: &str, prefix: &str) -> Result<Regex, ConfigError> {
    if prefix.is_empty() {
        return Err(ConfigError::EmptyPrefix(name.to_string()));
    }
    compile(name, &format!(r"(?:^|\s)({}\S*)", regex::escape(prefix)))
}

/// `<keyword> <amount> <unit>`, amount being digits with `.`/`,` separators.
pub fn payment_pattern(keyword: &str, unit: &str) -> Result<Regex, ConfigError> {
    if keyword.is_empty() || unit.is_empty() {
        return Err(ConfigError::MissingValue("payment keyword/unit".to_string()));
    }
    compile(
        "payment",
        &format!(r"{}\s+[0-9.,]+\s+{}", regex::escape(keyword), regex::escape(unit)),
    )
}

/// `<keyword>` followed by optional whitespace and digits.
pub fn quantity_pattern(keyword: &str) -> Result<Regex, ConfigError> {
    if keyword.is_empty() {
        return Err(ConfigError::MissingValue("quantity keyword".to_string()));
    }
    compile("quantity", &format!(r"{}\s*[0-9]+", regex::escape(keyword)))
}

fn compile(name: &str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
        name: name.to_string(),
        source,
    })
}

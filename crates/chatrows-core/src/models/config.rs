//! Configuration structures for the transcript pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

/// Main configuration for chatrows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatrowsConfig {
    /// Transcript parser configuration.
    pub parser: ParserConfig,

    /// Row sink configuration.
    pub sink: SinkConfig,
}

/// One recognised order category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTypeConfig {
    /// Type name, used as the grouping key.
    pub name: String,

    /// Literal prefix that starts an order code (e.g. "GG").
    pub prefix: String,

    /// Destination identifier rows of this type are appended to.
    pub destination: String,

    /// Fixed product name for this type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
}

impl OrderTypeConfig {
    pub fn new(
        name: impl Into<String>,
        prefix: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            destination: destination.into(),
            product: None,
        }
    }

    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self
    }
}

/// Category for blocks that match no declared prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatchAllConfig {
    /// Group name.
    pub name: String,

    /// Sentinel written into the order code column.
    pub code: String,

    /// Destination identifier.
    pub destination: String,
}

impl Default for CatchAllConfig {
    fn default() -> Self {
        Self {
            name: "other".to_string(),
            code: "UNKNOWN".to_string(),
            destination: "Other".to_string(),
        }
    }
}

/// Literals making up the payment pattern: `<keyword> <amount> <unit>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentPatternConfig {
    /// Currency keyword preceding the amount (e.g. "Cod").
    pub keyword: String,

    /// Currency unit word following the amount (e.g. "ກີບ").
    pub unit: String,
}

impl Default for PaymentPatternConfig {
    fn default() -> Self {
        Self {
            keyword: "Cod".to_string(),
            unit: "ກີບ".to_string(),
        }
    }
}

/// Transcript parser configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Order types, tested in this order. First match wins.
    pub order_types: Vec<OrderTypeConfig>,

    /// Catch-all category, never tested by pattern.
    pub catch_all: CatchAllConfig,

    /// Value for product and payment columns when nothing was found.
    pub placeholder: String,

    /// Marker that opens an annotation block at the start of a line.
    pub note_marker: String,

    /// Payment pattern literals.
    pub payment: PaymentPatternConfig,

    /// Keyword preceding the quantity digits.
    pub quantity_keyword: String,

    /// Take the product from the line preceding a payment inside a note block.
    pub infer_product: bool,

    /// Lines containing any of these are never used as an inferred product.
    pub product_exclusions: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            order_types: vec![
                OrderTypeConfig::new("GG", "GG", "GG")
                    .with_product("โลชั่นผิวขาว (ขายลูทีน)"),
                OrderTypeConfig::new("DD", "DD", "DD"),
            ],
            catch_all: CatchAllConfig::default(),
            placeholder: "-".to_string(),
            note_marker: "FB:".to_string(),
            payment: PaymentPatternConfig::default(),
            quantity_keyword: "ລູທີນ".to_string(),
            infer_product: false,
            // customer pickup, branch
            product_exclusions: vec!["ຮັບເອງ".to_string(), "ສາຂາ".to_string()],
        }
    }
}

/// Where finished rows go.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Directory for per-destination CSV files.
    pub output_dir: PathBuf,

    /// Endpoint that receives each row as JSON, if set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_url: Option<String>,

    /// Request timeout for forwarding, in seconds.
    pub timeout_secs: u64,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("rows"),
            forward_url: None,
            timeout_secs: 30,
        }
    }
}

impl ChatrowsConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let load_error =
            |e: &dyn std::fmt::Display| ConfigError::Load(format!("{}: {}", path.display(), e));

        let content = std::fs::read_to_string(path).map_err(|e| load_error(&e))?;
        serde_json::from_str(&content).map_err(|e| load_error(&e))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

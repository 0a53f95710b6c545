//! Core library for turning chat order transcripts into spreadsheet rows.
//!
//! This crate provides:
//! - A line-scanning transcript parser that segments chat messages into order records
//! - Regex field extractors (order code, date, payment, quantity)
//! - Chat webhook payload decoding
//! - The row sink seam used to forward records to spreadsheets

pub mod error;
pub mod events;
pub mod models;
pub mod sink;
pub mod transcript;

pub use error::{ChatrowsError, ConfigError, ParseError, Result, SinkError};
pub use events::{IncomingMessage, WebhookPayload};
pub use models::config::{ChatrowsConfig, OrderTypeConfig, ParserConfig};
pub use models::record::{GroupedRecords, OrderRecord, RecordGroup, ROW_HEADERS};
pub use sink::{dispatch, MemorySink, RowSink};
pub use transcript::TranscriptParser;

//! Transcript parsing: chat text to order records.

mod parser;
pub mod rules;

pub use parser::{decode_message, TranscriptParser};

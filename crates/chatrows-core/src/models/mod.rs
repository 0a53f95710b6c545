//! Data models: order records and configuration.

pub mod config;
pub mod record;

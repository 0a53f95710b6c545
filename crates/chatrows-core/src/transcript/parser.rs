//! Line-scanning transcript parser.
//!
//! One forward pass over trimmed lines with a peekable cursor. The scan is
//! an explicit state machine:
//!
//! ```text
//! Idle ──non-blank──▶ RecordOpen ──marker──▶ AccumulatingNoteBlock
//!                         ▲                        │
//!                         └──────blank line────────┘
//! any state ──order-type line──▶ RecordOpen (previous record sealed)
//! ```
//!
//! Payment, quantity and inferred product written inside a note block are
//! final for the record: lines after the block only fill fields the block
//! left unset.

use std::iter::Peekable;

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::error::{ConfigError, ParseError};
use crate::models::config::ParserConfig;
use crate::models::record::{GroupedRecords, OrderRecord, RecordGroup};

use super::rules::{
    format_date, DateExtractor, FieldExtractor, OrderTypeMatcher, PaymentExtractor,
    QuantityExtractor,
};

/// Which category a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordKind {
    Typed(usize),
    CatchAll,
}

/// A record still being built.
#[derive(Debug)]
struct OpenRecord {
    kind: RecordKind,
    record: OrderRecord,
    block_closed: bool,
    payment_final: bool,
    quantity_final: bool,
    /// Previous non-header line of the current block.
    last_block_line: Option<String>,
}

impl OpenRecord {
    fn new(kind: RecordKind, record: OrderRecord) -> Self {
        Self {
            kind,
            record,
            block_closed: false,
            payment_final: false,
            quantity_final: false,
            last_block_line: None,
        }
    }
}

enum ScanState {
    Idle,
    RecordOpen(OpenRecord),
    AccumulatingNoteBlock(OpenRecord),
}

/// Parser turning a chat transcript into order records.
///
/// Holds only immutable compiled patterns, so one instance can be shared
/// across threads.
#[derive(Debug, Clone)]
pub struct TranscriptParser {
    config: ParserConfig,
    order_types: OrderTypeMatcher,
    dates: DateExtractor,
    payment: PaymentExtractor,
    quantity: QuantityExtractor,
}

impl TranscriptParser {
    /// Build a parser, compiling every configured pattern.
    pub fn from_config(config: ParserConfig) -> Result<Self, ConfigError> {
        if config.note_marker.is_empty() {
            return Err(ConfigError::MissingValue("note_marker".to_string()));
        }

        let order_types = OrderTypeMatcher::new(&config.order_types)?;
        let payment = PaymentExtractor::new(&config.payment.keyword, &config.payment.unit)?;
        let quantity = QuantityExtractor::new(&config.quantity_keyword)?;

        Ok(Self {
            config,
            order_types,
            dates: DateExtractor::new(),
            payment,
            quantity,
        })
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a transcript into an ordered list of records, dated today.
    pub fn parse(&self, text: &str) -> Vec<OrderRecord> {
        self.parse_at(text, Local::now().date_naive())
    }

    /// Parse with an explicit "today" for records without an inline date.
    pub fn parse_at(&self, text: &str, today: NaiveDate) -> Vec<OrderRecord> {
        self.scan(text, today).into_iter().map(|(_, r)| r).collect()
    }

    /// Parse a transcript into records grouped by order type, dated today.
    pub fn parse_grouped(&self, text: &str) -> GroupedRecords {
        self.parse_grouped_at(text, Local::now().date_naive())
    }

    pub fn parse_grouped_at(&self, text: &str, today: NaiveDate) -> GroupedRecords {
        let scanned = self.scan(text, today);

        let mut groups: Vec<RecordGroup> = self
            .config
            .order_types
            .iter()
            .map(|t| RecordGroup {
                order_type: t.name.clone(),
                destination: t.destination.clone(),
                records: Vec::new(),
            })
            .collect();
        groups.push(RecordGroup {
            order_type: self.config.catch_all.name.clone(),
            destination: self.config.catch_all.destination.clone(),
            records: Vec::new(),
        });

        let catch_all = groups.len() - 1;
        for (kind, record) in scanned {
            let index = match kind {
                RecordKind::Typed(i) => i,
                RecordKind::CatchAll => catch_all,
            };
            groups[index].records.push(record);
        }

        groups.retain(|g| !g.records.is_empty());
        GroupedRecords { groups }
    }

    /// Strict entry point for raw message bodies.
    pub fn parse_bytes(&self, body: &[u8]) -> Result<Vec<OrderRecord>, ParseError> {
        Ok(self.parse(decode_message(body)?))
    }

    fn scan(&self, text: &str, today: NaiveDate) -> Vec<(RecordKind, OrderRecord)> {
        let today = format_date(today);
        let mut sealed = Vec::new();
        let mut lines = split_lines(text).peekable();
        let mut state = ScanState::Idle;
        let mut line_count = 0usize;

        while let Some(line) = lines.next() {
            line_count += 1;

            if let Some(m) = self.order_types.classify(line) {
                if let ScanState::RecordOpen(open) | ScanState::AccumulatingNoteBlock(open) = state {
                    seal(open, &mut sealed);
                }
                let date = self.record_date(line, &mut lines).unwrap_or_else(|| today.clone());
                let product = self.config.order_types[m.type_index]
                    .product
                    .clone()
                    .unwrap_or_else(|| self.config.placeholder.clone());
                let record = self.new_record(date, m.code, product);
                state = ScanState::RecordOpen(OpenRecord::new(RecordKind::Typed(m.type_index), record));
                continue;
            }

            state = match state {
                ScanState::Idle if line.is_empty() => ScanState::Idle,
                ScanState::Idle => {
                    let record = self.new_record(
                        today.clone(),
                        self.config.catch_all.code.clone(),
                        line.to_string(),
                    );
                    self.on_open_line(OpenRecord::new(RecordKind::CatchAll, record), line)
                }
                ScanState::RecordOpen(open) => self.on_open_line(open, line),
                ScanState::AccumulatingNoteBlock(mut open) => {
                    if line.is_empty() {
                        open.block_closed = true;
                        open.last_block_line = None;
                        ScanState::RecordOpen(open)
                    } else {
                        open.record.note_block.push(' ');
                        open.record.note_block.push_str(line);
                        self.extract_in_block(&mut open, line, false);
                        open.last_block_line = Some(line.to_string());
                        ScanState::AccumulatingNoteBlock(open)
                    }
                }
            };
        }

        if let ScanState::RecordOpen(open) | ScanState::AccumulatingNoteBlock(open) = state {
            seal(open, &mut sealed);
        }

        info!("Parsed {} records from {} lines", sealed.len(), line_count);
        sealed
    }

    /// Handle a non-order-type line while a record is open and no block runs.
    fn on_open_line(&self, mut open: OpenRecord, line: &str) -> ScanState {
        if !open.block_closed && line.starts_with(&self.config.note_marker) {
            open.record.note_block = line.to_string();
            self.extract_in_block(&mut open, line, true);
            return ScanState::AccumulatingNoteBlock(open);
        }

        if !open.payment_final {
            if let Some(m) = self.payment.extract(line) {
                open.record.payment = m.value;
            }
        }
        if !open.quantity_final {
            if let Some(m) = self.quantity.extract(line) {
                open.record.quantity = m.value;
            }
        }

        ScanState::RecordOpen(open)
    }

    fn extract_in_block(&self, open: &mut OpenRecord, line: &str, is_header: bool) {
        if let Some(m) = self.payment.extract(line) {
            open.record.payment = m.value;
            open.payment_final = true;

            if self.config.infer_product && !is_header {
                if let Some(product) = open.last_block_line.as_deref().filter(|p| self.is_product_line(p)) {
                    open.record.product = product.to_string();
                }
            }
        }

        if let Some(m) = self.quantity.extract(line) {
            open.record.quantity = m.value;
            open.quantity_final = true;
        }
    }

    fn is_product_line(&self, line: &str) -> bool {
        !line.is_empty()
            && !line.starts_with(&self.config.note_marker)
            && !self.order_types.is_match(line)
            && !self.payment.is_match(line)
            && !self
                .config
                .product_exclusions
                .iter()
                .any(|kw| !kw.is_empty() && line.contains(kw.as_str()))
    }

    /// Date on the order line itself, else a date line right after it.
    fn record_date<'a, I>(&self, line: &str, lines: &mut Peekable<I>) -> Option<String>
    where
        I: Iterator<Item = &'a str>,
    {
        if let Some(m) = self.dates.extract(line) {
            return Some(m.value);
        }

        // An order line that happens to start with a date opens its own record
        let m = lines
            .peek()
            .filter(|next| self.order_types.classify(next).is_none())
            .and_then(|next| self.dates.extract_line(next))?;
        lines.next();
        Some(m.value)
    }

    fn new_record(&self, date: String, order_code: String, product: String) -> OrderRecord {
        OrderRecord {
            date,
            order_code,
            product,
            note_block: String::new(),
            payment: self.config.placeholder.clone(),
            quantity: String::new(),
        }
    }
}

/// View a raw message body as text, rejecting anything that is not UTF-8.
pub fn decode_message(body: &[u8]) -> Result<&str, ParseError> {
    std::str::from_utf8(body)
        .map_err(|e| ParseError::InvalidInput(format!("message is not UTF-8 text: {}", e)))
}

fn seal(open: OpenRecord, sealed: &mut Vec<(RecordKind, OrderRecord)>) {
    debug!(
        "Sealed record {} ({:?}) payment={:?}",
        open.record.order_code, open.kind, open.record.payment
    );
    sealed.push((open.kind, open.record));
}

/// Split on `\r\n`, `\n` or a lone `\r`, trimming each line.
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split("\r\n")
        .flat_map(|chunk| chunk.split(['\n', '\r']))
        .map(str::trim)
}

//! Order records extracted from chat transcripts.

use serde::{Deserialize, Serialize};

/// Number of spreadsheet columns an order record occupies.
pub const ROW_WIDTH: usize = 6;

/// Column headers, in row order.
pub const ROW_HEADERS: [&str; ROW_WIDTH] =
    ["date", "order_code", "product", "note_block", "payment", "quantity"];

/// One order extracted from a transcript.
///
/// Field order matches the spreadsheet column order; see [`OrderRecord::to_row`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Order date as `dd/mm/yy`.
    pub date: String,

    /// Order code token, or the catch-all sentinel.
    pub order_code: String,

    /// Product name from the type table, inferred from text, or a placeholder.
    pub product: String,

    /// Space-joined annotation block, empty if none.
    pub note_block: String,

    /// Payment substring, or a placeholder.
    pub payment: String,

    /// Quantity substring, empty if none.
    pub quantity: String,
}

impl OrderRecord {
    /// Project the record onto one spreadsheet row.
    pub fn to_row(&self) -> [String; ROW_WIDTH] {
        [
            self.date.clone(),
            self.order_code.clone(),
            self.product.clone(),
            self.note_block.clone(),
            self.payment.clone(),
            self.quantity.clone(),
        ]
    }

    /// Borrowing variant of [`OrderRecord::to_row`], for writers that take `&str`.
    pub fn as_row(&self) -> [&str; ROW_WIDTH] {
        [
            &self.date,
            &self.order_code,
            &self.product,
            &self.note_block,
            &self.payment,
            &self.quantity,
        ]
    }
}

/// Records of one order type, bound for one destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordGroup {
    /// Order type name.
    pub order_type: String,

    /// Destination identifier (sheet name or similar).
    pub destination: String,

    /// Records in transcript order.
    pub records: Vec<OrderRecord>,
}

/// Parser output grouped by order type.
///
/// Groups follow the declared type order with the catch-all last. Types
/// that produced no records are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedRecords {
    pub groups: Vec<RecordGroup>,
}

impl GroupedRecords {
    /// Records for the given order type name.
    pub fn get(&self, order_type: &str) -> Option<&[OrderRecord]> {
        self.groups
            .iter()
            .find(|g| g.order_type == order_type)
            .map(|g| g.records.as_slice())
    }

    /// Total number of records across all groups.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.records.is_empty())
    }

    /// Iterate `(destination, record)` pairs in group order.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &OrderRecord)> {
        self.groups
            .iter()
            .flat_map(|g| g.records.iter().map(move |r| (g.destination.as_str(), r)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str) -> OrderRecord {
        OrderRecord {
            date: "01/02/24".to_string(),
            order_code: code.to_string(),
            product: "-".to_string(),
            note_block: String::new(),
            payment: "-".to_string(),
            quantity: String::new(),
        }
    }

    #[test]
    fn test_row_column_order() {
        let mut r = record("GG1");
        r.note_block = "FB: note".to_string();
        r.quantity = "ລູທີນ 2".to_string();

        assert_eq!(
            r.to_row(),
            [
                "01/02/24".to_string(),
                "GG1".to_string(),
                "-".to_string(),
                "FB: note".to_string(),
                "-".to_string(),
                "ລູທີນ 2".to_string(),
            ]
        );
        assert_eq!(r.as_row()[3], "FB: note");
    }

    #[test]
    fn test_grouped_lookup_and_rows() {
        let grouped = GroupedRecords {
            groups: vec![
                RecordGroup {
                    order_type: "GG".to_string(),
                    destination: "Lutein".to_string(),
                    records: vec![record("GG1"), record("GG2")],
                },
                RecordGroup {
                    order_type: "other".to_string(),
                    destination: "Unsorted".to_string(),
                    records: vec![record("-")],
                },
            ],
        };

        assert_eq!(grouped.len(), 3);
        assert!(!grouped.is_empty());
        assert_eq!(grouped.get("GG").map(|r| r.len()), Some(2));
        assert!(grouped.get("DD").is_none());

        let destinations: Vec<&str> = grouped.rows().map(|(d, _)| d).collect();
        assert_eq!(destinations, vec!["Lutein", "Lutein", "Unsorted"]);
    }
}

// crates/retail-etl-core/src/record.rs

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Logical column types reported by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Date,
    Float,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub dtype: ColumnType,
}

/// Row types the validator and the transformer's dedup step can inspect
/// uniformly. `dedup_key` must reflect full-row equality so a run's
/// duplicate-removal count and a standalone validation report of the same
/// table never disagree.
pub trait TableRecord {
    type Key: std::hash::Hash + Eq;

    fn columns() -> &'static [ColumnSpec];
    fn is_missing(&self, column: usize) -> bool;
    fn dedup_key(&self) -> Self::Key;
}

/// A transaction row as extracted from the source, before any coercion.
/// Empty cells are `None`, never sentinel strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(default)]
pub struct RawRecord {
    pub transaction_id: Option<String>,
    pub date: Option<String>,
    pub customer_id: Option<String>,
    pub product_id: Option<String>,
    pub quantity: Option<String>,
    pub price: Option<String>,
}

const RAW_COLUMNS: [ColumnSpec; 6] = [
    ColumnSpec { name: "transaction_id", dtype: ColumnType::Text },
    ColumnSpec { name: "date", dtype: ColumnType::Text },
    ColumnSpec { name: "customer_id", dtype: ColumnType::Text },
    ColumnSpec { name: "product_id", dtype: ColumnType::Text },
    ColumnSpec { name: "quantity", dtype: ColumnType::Text },
    ColumnSpec { name: "price", dtype: ColumnType::Text },
];

impl TableRecord for RawRecord {
    type Key = RawRecord;

    fn columns() -> &'static [ColumnSpec] {
        &RAW_COLUMNS
    }

    fn is_missing(&self, column: usize) -> bool {
        match column {
            0 => self.transaction_id.is_none(),
            1 => self.date.is_none(),
            2 => self.customer_id.is_none(),
            3 => self.product_id.is_none(),
            4 => self.quantity.is_none(),
            5 => self.price.is_none(),
            _ => false,
        }
    }

    fn dedup_key(&self) -> RawRecord {
        self.clone()
    }
}

/// A transaction row after cleaning. Invariants: identifier and date are
/// present, `quantity` and `price` are strictly positive, and
/// `total_amount == quantity * price`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanRecord {
    pub transaction_id: String,
    pub date: NaiveDateTime,
    pub customer_id: Option<String>,
    pub product_id: Option<String>,
    pub quantity: f64,
    pub price: f64,
    pub total_amount: f64,
}

const CLEAN_COLUMNS: [ColumnSpec; 7] = [
    ColumnSpec { name: "transaction_id", dtype: ColumnType::Text },
    ColumnSpec { name: "date", dtype: ColumnType::Date },
    ColumnSpec { name: "customer_id", dtype: ColumnType::Text },
    ColumnSpec { name: "product_id", dtype: ColumnType::Text },
    ColumnSpec { name: "quantity", dtype: ColumnType::Float },
    ColumnSpec { name: "price", dtype: ColumnType::Float },
    ColumnSpec { name: "total_amount", dtype: ColumnType::Float },
];

impl TableRecord for CleanRecord {
    // Bit-exact float comparison, matching what full-row equality means for
    // values that were parsed rather than computed differently.
    type Key = (String, NaiveDateTime, Option<String>, Option<String>, u64, u64, u64);

    fn columns() -> &'static [ColumnSpec] {
        &CLEAN_COLUMNS
    }

    fn is_missing(&self, column: usize) -> bool {
        match column {
            2 => self.customer_id.is_none(),
            3 => self.product_id.is_none(),
            _ => false,
        }
    }

    fn dedup_key(&self) -> Self::Key {
        (
            self.transaction_id.clone(),
            self.date,
            self.customer_id.clone(),
            self.product_id.clone(),
            self.quantity.to_bits(),
            self.price.to_bits(),
            self.total_amount.to_bits(),
        )
    }
}

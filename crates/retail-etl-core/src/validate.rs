use std::collections::HashSet;

use serde::Serialize;

use crate::record::{ColumnType, TableRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnReport {
    pub name: &'static str,
    pub dtype: ColumnType,
    pub missing: usize,
}

/// Summary statistics describing a table's quality. Derived and read-only;
/// producing one never alters the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub total_records: usize,
    pub duplicate_records: usize,
    pub columns: Vec<ColumnReport>,
}

impl ValidationReport {
    pub fn missing_for(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|report| report.name == column)
            .map(|report| report.missing)
    }
}

/// Compute per-column missing counts and the duplicate count for any table.
/// Duplicates use the same full-row equality as the transformer's dedup
/// step, so the two views of a table always agree.
pub fn validate<R: TableRecord>(rows: &[R]) -> ValidationReport {
    let mut columns: Vec<ColumnReport> = R::columns()
        .iter()
        .map(|spec| ColumnReport {
            name: spec.name,
            dtype: spec.dtype,
            missing: 0,
        })
        .collect();

    for row in rows {
        for (index, column) in columns.iter_mut().enumerate() {
            if row.is_missing(index) {
                column.missing += 1;
            }
        }
    }

    let mut seen = HashSet::with_capacity(rows.len());
    let duplicate_records = rows
        .iter()
        .filter(|row| !seen.insert(row.dedup_key()))
        .count();

    ValidationReport {
        total_records: rows.len(),
        duplicate_records,
        columns,
    }
}

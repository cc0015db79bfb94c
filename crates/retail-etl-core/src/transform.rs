use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::info;

use crate::error::TransformError;
use crate::record::{CleanRecord, RawRecord, TableRecord};

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M:%S"];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Clean a raw table. Step order matters: dedup runs on pre-coercion rows,
/// required-field drops happen before date parsing, and the positivity
/// filter runs last so it also excludes rows whose numerics failed to
/// coerce. Output order is input order minus removed rows.
///
/// Fails fast on the first unparseable date; no partial table is returned.
pub fn transform(rows: Vec<RawRecord>) -> Result<Vec<CleanRecord>, TransformError> {
    let initial_count = rows.len();

    // Full-row duplicate removal, first occurrence kept.
    let mut seen = HashSet::with_capacity(rows.len());
    let mut deduped = Vec::with_capacity(rows.len());
    for row in rows {
        if seen.insert(row.dedup_key()) {
            deduped.push(row);
        }
    }
    info!(removed = initial_count - deduped.len(), "removed duplicate records");

    let mut cleaned = Vec::with_capacity(deduped.len());
    for row in deduped {
        // Rows without an identifier or a date are unusable downstream.
        let (Some(transaction_id), Some(date_raw)) = (row.transaction_id, row.date) else {
            continue;
        };

        let date = parse_date(&date_raw).ok_or_else(|| TransformError::InvalidDate {
            transaction_id: transaction_id.clone(),
            value: date_raw.clone(),
        })?;

        // Coercion failures become missing values, not errors. The derived
        // total reads the same parsed operands, so an unparseable quantity
        // or price leaves the row to the filter below either way.
        let quantity = parse_number(row.quantity.as_deref());
        let price = parse_number(row.price.as_deref());

        let (Some(quantity), Some(price)) = (quantity, price) else {
            continue;
        };
        if quantity <= 0.0 || price <= 0.0 {
            continue;
        }

        cleaned.push(CleanRecord {
            transaction_id,
            date,
            customer_id: row.customer_id,
            product_id: row.product_id,
            quantity,
            price,
            total_amount: quantity * price,
        });
    }

    info!(records = cleaned.len(), "transformation complete");
    Ok(cleaned)
}

fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();

    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(parsed.and_time(NaiveTime::MIN));
        }
    }
    None
}

fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw?.trim().parse().ok()
}

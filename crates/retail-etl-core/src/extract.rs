use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use tracing::info;

use crate::error::{EtlError, Result};
use crate::record::RawRecord;

/// Read a raw table from a source file, dispatching on the filename suffix.
/// An unknown suffix is a fatal configuration error, checked before the
/// file is touched.
pub fn extract(path: &Path) -> Result<Vec<RawRecord>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let rows = match extension.as_deref() {
        Some("csv") => read_csv(path)?,
        Some("xlsx") => read_xlsx(path)?,
        _ => return Err(EtlError::UnsupportedFormat(path.to_path_buf())),
    };

    info!(records = rows.len(), source = %path.display(), "extraction complete");
    Ok(rows)
}

fn read_csv(path: &Path) -> Result<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

/// First worksheet only, header row matched by name. Cells are rendered to
/// the same string representation the CSV path produces, so the transformer
/// sees one shape of raw data.
fn read_xlsx(path: &Path) -> Result<Vec<RawRecord>> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| EtlError::Extract(format!("{} has no worksheets", path.display())))??;

    let mut sheet_rows = range.rows();
    let Some(header) = sheet_rows.next() else {
        return Ok(Vec::new());
    };

    let headers: Vec<String> = header
        .iter()
        .map(|cell| cell.to_string().trim().to_ascii_lowercase())
        .collect();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let transaction_id = column("transaction_id");
    let date = column("date");
    let customer_id = column("customer_id");
    let product_id = column("product_id");
    let quantity = column("quantity");
    let price = column("price");

    let mut rows = Vec::new();
    for sheet_row in sheet_rows {
        rows.push(RawRecord {
            transaction_id: cell_text(sheet_row, transaction_id),
            date: cell_text(sheet_row, date),
            customer_id: cell_text(sheet_row, customer_id),
            product_id: cell_text(sheet_row, product_id),
            quantity: cell_text(sheet_row, quantity),
            price: cell_text(sheet_row, price),
        });
    }
    Ok(rows)
}

fn cell_text(row: &[Data], index: Option<usize>) -> Option<String> {
    match row.get(index?)? {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Data::Float(f) => Some(format_float(*f)),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
    }
}

// Integral floats print without the trailing ".0" Excel would not show.
fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

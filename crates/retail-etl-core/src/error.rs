// crates/retail-etl-core/src/error.rs

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("failed to connect to database: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("unsupported source format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("spreadsheet parsing error: {0}")]
    Spreadsheet(#[from] calamine::XlsxError),

    #[error("extraction failed: {0}")]
    Extract(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Date integrity is load-bearing for downstream aggregation, so a
/// malformed date fails the transform stage instead of dropping the row.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("unparseable date {value:?} for transaction {transaction_id}")]
    InvalidDate {
        transaction_id: String,
        value: String,
    },
}

/// Chunk writes are independent: chunks before `failed_chunk` stay
/// committed in the destination, chunks after it were never attempted.
#[derive(Error, Debug)]
#[error("failed writing chunk {failed_chunk}/{total_chunks} to table {table}: {source}")]
pub struct LoadError {
    pub table: String,
    pub failed_chunk: usize,
    pub total_chunks: usize,
    pub chunks_written: usize,
    #[source]
    pub source: anyhow::Error,
}

pub type Result<T> = std::result::Result<T, EtlError>;

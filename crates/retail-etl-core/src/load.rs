use std::num::NonZeroUsize;

use tracing::info;

use crate::db::DbPool;
use crate::error::LoadError;
use crate::record::CleanRecord;

/// Write policy for a destination table. Only the first chunk of a run ever
/// sees `Replace` or `Fail`; later chunks always append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Add rows to the destination, creating it if absent.
    Append,
    /// Drop existing destination contents before writing.
    Replace,
    /// Error if the destination already exists.
    Fail,
}

/// Any destination supporting chunked append/replace/fail-if-exists table
/// writes.
#[allow(async_fn_in_trait)]
pub trait TableSink {
    async fn write_chunk(
        &mut self,
        table: &str,
        rows: &[CleanRecord],
        mode: WriteMode,
    ) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub chunks_written: usize,
    pub records_written: usize,
}

/// Write a cleaned table in consecutive chunks of at most `batch_size` rows.
/// Chunk writes are independent: if one fails, earlier chunks stay committed
/// (the error records how many), and later chunks are not attempted. Callers
/// needing atomicity must stage into a temporary table and swap.
pub async fn load<S: TableSink>(
    sink: &mut S,
    table: &str,
    rows: &[CleanRecord],
    initial_mode: WriteMode,
    batch_size: NonZeroUsize,
) -> Result<LoadSummary, LoadError> {
    let batch_size = batch_size.get();

    if rows.is_empty() {
        info!(table, "no records to load");
        return Ok(LoadSummary::default());
    }

    let total_chunks = rows.len().div_ceil(batch_size);
    let mut summary = LoadSummary::default();

    for (index, chunk) in rows.chunks(batch_size).enumerate() {
        // Replace/Fail apply exactly once per run; appending afterwards
        // keeps this run's earlier chunks intact.
        let mode = if index == 0 { initial_mode } else { WriteMode::Append };

        if let Err(source) = sink.write_chunk(table, chunk, mode).await {
            return Err(LoadError {
                table: table.to_string(),
                failed_chunk: index + 1,
                total_chunks,
                chunks_written: summary.chunks_written,
                source,
            });
        }

        summary.chunks_written += 1;
        summary.records_written += chunk.len();
        info!(table, chunk = index + 1, total_chunks, "loaded batch");
    }

    info!(table, records = summary.records_written, "load complete");
    Ok(summary)
}

/// Postgres-backed sink. Each chunk is inserted inside its own transaction;
/// there is deliberately no transaction spanning chunks.
pub struct PgSink {
    pool: DbPool,
}

impl PgSink {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl TableSink for PgSink {
    async fn write_chunk(
        &mut self,
        table: &str,
        rows: &[CleanRecord],
        mode: WriteMode,
    ) -> anyhow::Result<()> {
        ensure_table(&self.pool, table, mode).await?;

        let statement = format!(
            r#"
                INSERT INTO "{table}"
                    (transaction_id, date, customer_id, product_id, quantity, price, total_amount)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#
        );

        let mut tx = self.pool.begin().await?;
        for row in rows {
            sqlx::query(&statement)
                .bind(&row.transaction_id)
                .bind(row.date)
                .bind(row.customer_id.as_deref())
                .bind(row.product_id.as_deref())
                .bind(row.quantity)
                .bind(row.price)
                .bind(row.total_amount)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        Ok(())
    }
}

async fn ensure_table(pool: &DbPool, table: &str, mode: WriteMode) -> anyhow::Result<()> {
    validate_table_name(table)?;

    match mode {
        WriteMode::Replace => {
            sqlx::query(&format!(r#"DROP TABLE IF EXISTS "{table}""#))
                .execute(pool)
                .await?;
        }
        WriteMode::Fail => {
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS (SELECT 1 FROM information_schema.tables WHERE table_name = $1)",
            )
            .bind(table)
            .fetch_one(pool)
            .await?;
            if exists {
                anyhow::bail!("destination table {table} already exists");
            }
        }
        WriteMode::Append => {}
    }

    sqlx::query(&format!(
        r#"
            CREATE TABLE IF NOT EXISTS "{table}" (
                transaction_id TEXT NOT NULL,
                date TIMESTAMP NOT NULL,
                customer_id TEXT,
                product_id TEXT,
                quantity DOUBLE PRECISION NOT NULL,
                price DOUBLE PRECISION NOT NULL,
                total_amount DOUBLE PRECISION NOT NULL
            )
        "#
    ))
    .execute(pool)
    .await?;

    Ok(())
}

// Identifiers cannot be bound as statement parameters, so restrict what
// gets spliced into SQL.
fn validate_table_name(table: &str) -> anyhow::Result<()> {
    let starts_ok = table
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let rest_ok = table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !starts_ok || !rest_ok {
        anyhow::bail!("invalid destination table name {table:?}");
    }
    Ok(())
}

use std::num::NonZeroUsize;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use tracing::{error, info};

use crate::config::PipelineConfig;
use crate::db;
use crate::error::{EtlError, Result};
use crate::extract;
use crate::load::{self, PgSink, TableSink, WriteMode};
use crate::transform;

/// Produces the destination sink for one run. This is the seam tests and
/// staging setups use to swap Postgres out.
#[allow(async_fn_in_trait)]
pub trait Connector {
    type Sink: TableSink;

    async fn connect(&self) -> Result<Self::Sink>;
}

pub struct PgConnector {
    database_url: String,
}

impl PgConnector {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }
}

impl Connector for PgConnector {
    type Sink = PgSink;

    async fn connect(&self) -> Result<PgSink> {
        let pool = db::connect(&self.database_url)
            .await
            .map_err(EtlError::Connection)?;
        info!("database connection established");
        Ok(PgSink::new(pool))
    }
}

/// Outcome of one pipeline invocation. `records_processed` counts the clean
/// table, not the raw one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub success: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub records_processed: usize,
}

impl RunReport {
    pub fn duration(&self) -> Duration {
        self.finished_at - self.started_at
    }
}

/// Orchestrates one connect → extract → transform → load run. Owns the
/// configuration and the destination connector for the lifetime of a run;
/// re-running starts every stage from scratch.
pub struct Pipeline<C: Connector> {
    config: PipelineConfig,
    connector: C,
    initial_mode: WriteMode,
}

impl Pipeline<PgConnector> {
    pub fn new(config: PipelineConfig) -> Self {
        let connector = PgConnector::new(config.database_url());
        Self::with_connector(config, connector)
    }
}

impl<C: Connector> Pipeline<C> {
    pub fn with_connector(config: PipelineConfig, connector: C) -> Self {
        Self {
            config,
            connector,
            initial_mode: WriteMode::Append,
        }
    }

    /// Write policy for the run's first chunk; subsequent chunks always
    /// append.
    pub fn with_initial_mode(mut self, mode: WriteMode) -> Self {
        self.initial_mode = mode;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Execute a full run, strictly sequential, no stage retried. The first
    /// failure aborts the remaining stages; chunks already written by the
    /// load stage stay committed.
    pub async fn run(&self, source: &Path, table: &str) -> RunReport {
        let started_at = Utc::now();
        info!(source = %source.display(), table, "starting pipeline run");

        let outcome = self.execute(source, table).await;
        let finished_at = Utc::now();

        match outcome {
            Ok(records_processed) => {
                let report = RunReport {
                    success: true,
                    started_at,
                    finished_at,
                    records_processed,
                };
                info!(
                    records = records_processed,
                    duration_ms = report.duration().num_milliseconds(),
                    "pipeline completed successfully"
                );
                report
            }
            Err(err) => {
                error!(error = %err, "pipeline failed");
                RunReport {
                    success: false,
                    started_at,
                    finished_at,
                    records_processed: 0,
                }
            }
        }
    }

    async fn execute(&self, source: &Path, table: &str) -> Result<usize> {
        // from_env rejects a zero batch size, but configs can also be built
        // directly; surface the bad value instead of looping or panicking.
        let batch_size = NonZeroUsize::new(self.config.batch_size)
            .ok_or_else(|| EtlError::Config("batch size must be at least 1".to_string()))?;

        let mut sink = self.connector.connect().await?;
        let raw = extract::extract(source)?;
        let clean = transform::transform(raw)?;
        load::load(&mut sink, table, &clean, self.initial_mode, batch_size).await?;
        Ok(clean.len())
    }
}

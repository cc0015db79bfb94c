use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use retail_etl_core::config::PipelineConfig;
use retail_etl_core::extract::extract;
use retail_etl_core::load::WriteMode;
use retail_etl_core::pipeline::Pipeline;
use retail_etl_core::validate::validate;

mod logging;

#[derive(Parser, Debug)]
#[command(author, version, about = "Retail transaction ETL pipeline", long_about = None)]
struct Cli {
    /// Path to the source data file (.csv or .xlsx)
    #[arg(long, default_value = "data/sample_transactions.csv")]
    source: PathBuf,

    /// Target database table name
    #[arg(long, default_value = "fact_transactions")]
    table: String,

    /// Extract and report data quality without transforming or loading
    #[arg(long)]
    validate_only: bool,

    /// Replace the destination table contents instead of appending
    #[arg(long)]
    replace: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let _guard = logging::init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!(error = %err, "pipeline aborted");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<bool> {
    let config = PipelineConfig::from_env()?;

    if cli.validate_only {
        info!("running in validation-only mode");
        let raw = extract(&cli.source)?;
        let report = validate(&raw);
        info!(report = %serde_json::to_string(&report)?, "validation results");
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(true);
    }

    let initial_mode = if cli.replace {
        WriteMode::Replace
    } else {
        WriteMode::Append
    };

    let report = Pipeline::new(config)
        .with_initial_mode(initial_mode)
        .run(&cli.source, &cli.table)
        .await;

    Ok(report.success)
}

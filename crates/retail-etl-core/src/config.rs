use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{EtlError, Result};

/// Process-wide pipeline settings, built once at startup and read-only
/// thereafter. Missing variables fall back to defaults; malformed numeric
/// values are a construction-time error.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub db_host: String,
    pub db_port: u16,
    pub db_name: String,
    pub db_user: String,
    pub db_password: String,
    pub input_path: PathBuf,
    pub batch_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            db_host: "localhost".to_string(),
            db_port: 5432,
            db_name: "retail_db".to_string(),
            db_user: "postgres".to_string(),
            db_password: String::new(),
            input_path: PathBuf::from("data/"),
            batch_size: 1000,
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let batch_size = parse_var("BATCH_SIZE", defaults.batch_size)?;
        if batch_size == 0 {
            return Err(EtlError::Config("BATCH_SIZE must be at least 1".to_string()));
        }

        Ok(Self {
            db_host: var_or("DB_HOST", defaults.db_host),
            db_port: parse_var("DB_PORT", defaults.db_port)?,
            db_name: var_or("DB_NAME", defaults.db_name),
            db_user: var_or("DB_USER", defaults.db_user),
            db_password: var_or("DB_PASSWORD", defaults.db_password),
            input_path: PathBuf::from(var_or(
                "INPUT_PATH",
                defaults.input_path.display().to_string(),
            )),
            batch_size,
        })
    }

    /// Connection URI for the destination database.
    pub fn database_url(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.db_user, self.db_password, self.db_host, self.db_port, self.db_name
        )
    }
}

fn var_or(key: &str, default: String) -> String {
    env::var(key).unwrap_or(default)
}

fn parse_var<T: FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| EtlError::Config(format!("{key} must be numeric, got {raw:?}"))),
        Err(_) => Ok(default),
    }
}

//! Runtime configuration
//!
//! Resolved from command-line flags first, then environment variables, then
//! defaults.

use anyhow::Result;
use std::env;
use std::path::PathBuf;

// Environment variable names
pub const ENV_DB_PATH: &str = "LEADTRACK_DB";
pub const ENV_LOG: &str = "LEADTRACK_LOG";
const ENV_RUST_LOG: &str = "RUST_LOG";

const DEFAULT_LOG_FILTER: &str = "warn";

/// Where lead data comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// Seeded in-memory sample data; nothing is persisted.
    Demo,
    Sqlite(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_source: DataSource,
    pub log_filter: String,
}

impl AppConfig {
    pub fn resolve(demo: bool, db_flag: Option<PathBuf>) -> Result<Self> {
        Self::resolve_with(demo, db_flag, |key| env::var(key).ok())
    }

    /// Same as [`AppConfig::resolve`] with an injectable environment lookup.
    pub fn resolve_with<F>(demo: bool, db_flag: Option<PathBuf>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_source = if demo {
            DataSource::Demo
        } else {
            let path = match db_flag.or_else(|| non_empty(ENV_DB_PATH).map(PathBuf::from)) {
                Some(path) => path,
                None => default_db_path()?,
            };
            DataSource::Sqlite(path)
        };

        let log_filter = non_empty(ENV_LOG)
            .or_else(|| non_empty(ENV_RUST_LOG))
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            data_source,
            log_filter,
        })
    }
}

fn default_db_path() -> Result<PathBuf> {
    let config_dir =
        dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
    Ok(config_dir.join("leadtrack").join("leads.db"))
}

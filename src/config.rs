// ⚙️ Run Configuration
// Every location and name the pipeline touches, passed in explicitly

use crate::error::{EtlError, EtlResult};
use crate::extractor::ExtractorConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SOURCE_URL: &str =
    "https://web.archive.org/web/20230908091635/https://en.wikipedia.org/wiki/List_of_largest_banks";
pub const DEFAULT_RATES_SOURCE: &str = "https://cf-courses-data.s3.us.cloud-object-storage.appdomain.cloud/IBMSkillsNetwork-PY0221EN-Coursera/labs/v2/exchange_rate.csv";
pub const DEFAULT_TABLE_NAME: &str = "Largest_banks";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EtlConfig {
    /// Page holding the bank table (URL or local file)
    pub source_url: String,

    /// Exchange-rate CSV with `Currency,Rate` columns (URL or local file)
    pub rates_source: String,

    /// Columns produced by the extract stage
    pub table_attribs: Vec<String>,

    pub csv_path: PathBuf,
    pub db_path: PathBuf,
    pub table_name: String,

    /// Append-only progress log
    pub log_path: PathBuf,

    pub timeout_secs: u64,

    pub extractor: ExtractorConfig,
}

impl Default for EtlConfig {
    fn default() -> Self {
        EtlConfig {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            rates_source: DEFAULT_RATES_SOURCE.to_string(),
            table_attribs: vec!["Name".to_string(), "MC_USD_Billion".to_string()],
            csv_path: PathBuf::from("./Largest_banks_data.csv"),
            db_path: PathBuf::from("Banks.db"),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            log_path: PathBuf::from("code_log.txt"),
            timeout_secs: 30,
            extractor: ExtractorConfig::default(),
        }
    }
}

impl EtlConfig {
    /// Load config from a JSON file; missing fields keep their defaults
    pub fn from_file(path: &Path) -> EtlResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            EtlError::Config(format!("failed to read config file {}: {}", path.display(), e))
        })?;

        let config: EtlConfig = serde_json::from_str(&content).map_err(|e| {
            EtlError::Config(format!("failed to parse config file {}: {}", path.display(), e))
        })?;

        Ok(config)
    }

    pub fn validate(&self) -> EtlResult<()> {
        if self.source_url.trim().is_empty() {
            return Err(EtlError::Config("source_url is empty".to_string()));
        }
        if self.rates_source.trim().is_empty() {
            return Err(EtlError::Config("rates_source is empty".to_string()));
        }
        for (field, path) in [
            ("csv_path", &self.csv_path),
            ("db_path", &self.db_path),
            ("log_path", &self.log_path),
        ] {
            if path.as_os_str().is_empty() {
                return Err(EtlError::Config(format!("{} is empty", field)));
            }
        }
        if self.timeout_secs == 0 {
            return Err(EtlError::Config("timeout_secs must be positive".to_string()));
        }
        if !is_identifier(&self.table_name) {
            return Err(EtlError::Config(format!(
                "table name '{}' is not a plain SQL identifier",
                self.table_name
            )));
        }
        Ok(())
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*` - table names are spliced into DDL, never bound
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

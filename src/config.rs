use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tokio::fs;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ScanConfig {
    #[serde(default = "default_ports_file")]
    pub ports_file: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Probe task pool size; unset means one task per port.
    #[serde(default)]
    pub workers: Option<usize>,
}

fn default_ports_file() -> String {
    "top100.txt".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ports_file: default_ports_file(),
            log_level: default_log_level(),
            workers: None,
        }
    }
}

impl ScanConfig {
    /// `log_level` as a tracing level; `warning` is accepted for `warn`.
    pub fn get_tracing_level(&self) -> Result<tracing::Level> {
        let level = self.log_level.trim();
        let level = if level.eq_ignore_ascii_case("warning") { "warn" } else { level };
        tracing::Level::from_str(level).map_err(|_| {
            anyhow!("Invalid log level: {}. Valid levels are: trace, debug, info, warn, error", self.log_level)
        })
    }

    /// Reads `SCAN_CONFIG` (default `scan.json`), then applies `PORTS_FILE`.
    ///
    /// Runs before tracing is up, so problems go to stderr and the defaults
    /// take over.
    pub async fn load() -> Self {
        let config_file = std::env::var("SCAN_CONFIG")
            .unwrap_or_else(|_| "scan.json".to_string());

        let mut config = if Path::new(&config_file).exists() {
            match Self::load_file(&config_file).await {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Ignoring config file {}: {:#}", config_file, e);
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        if let Ok(ports_file) = std::env::var("PORTS_FILE") {
            config.ports_file = ports_file;
        }

        if let Err(e) = config.get_tracing_level() {
            eprintln!("{}; falling back to info", e);
            config.log_level = default_log_level();
        }
        if config.workers == Some(0) {
            eprintln!("workers must be at least 1; using one task per port");
            config.workers = None;
        }

        config
    }

    pub async fn load_file(file_path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(file_path).await?;
        let config: ScanConfig = serde_json::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"workers": 64}}"#).unwrap();

        let config = ScanConfig::load_file(file.path()).await.unwrap();
        assert_eq!(config.workers, Some(64));
        assert_eq!(config.ports_file, "top100.txt");
        assert_eq!(config.log_level, "info");
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "ports_file = top100.txt").unwrap();

        assert!(ScanConfig::load_file(file.path()).await.is_err());
    }

    #[test]
    fn log_level_parsing() {
        let mut config = ScanConfig {
            log_level: "WARNING".to_string(),
            ..ScanConfig::default()
        };
        assert_eq!(config.get_tracing_level().unwrap(), tracing::Level::WARN);

        config.log_level = "Debug".to_string();
        assert_eq!(config.get_tracing_level().unwrap(), tracing::Level::DEBUG);

        config.log_level = "loud".to_string();
        assert!(config.get_tracing_level().is_err());
    }
}

use crate::{
    config::{
        detect_available_parallelism, DEFAULT_CATALOG_FILENAME, DEFAULT_LOGS_DATETIME_FORMAT,
        DEFAULT_LOGS_PATH, DEFAULT_LOG_FILENAME, DEFAULT_PROMETHEUS_ROUTE,
        DEFAULT_RPC_BIND_ADDRESS, DEFAULT_STORE_PATH,
    },
    logger::LogLevel,
};
use anyhow::{Context, Result};
use clap::Parser;
use fature_common::config::VERSION;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    fs::File,
    io::Write,
    net::SocketAddr,
    path::{Path, PathBuf},
};
use thiserror::Error;

// Functions Helpers
fn default_rpc_bind_address() -> String {
    DEFAULT_RPC_BIND_ADDRESS.to_owned()
}

fn default_prometheus_route() -> String {
    DEFAULT_PROMETHEUS_ROUTE.to_owned()
}

fn default_store_path() -> String {
    DEFAULT_STORE_PATH.to_owned()
}

fn default_catalog_filename() -> String {
    DEFAULT_CATALOG_FILENAME.to_owned()
}

fn default_log_filename() -> String {
    DEFAULT_LOG_FILENAME.to_owned()
}

fn default_logs_path() -> String {
    DEFAULT_LOGS_PATH.to_owned()
}

fn default_logs_datetime_format() -> String {
    DEFAULT_LOGS_DATETIME_FORMAT.to_owned()
}

#[derive(Debug, Clone, clap::Args, Serialize, Deserialize)]
pub struct PrometheusConfig {
    /// Enable Prometheus metrics
    #[clap(long = "prometheus-enable")]
    #[serde(default)]
    pub enable: bool,
    /// Route for the Prometheus metrics export
    #[clap(long = "prometheus-route", default_value_t = default_prometheus_route())]
    #[serde(default = "default_prometheus_route")]
    pub route: String,
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            enable: false,
            route: default_prometheus_route(),
        }
    }
}

#[derive(Debug, Clone, clap::Args, Serialize, Deserialize)]
pub struct RPCConfig {
    /// RPC bind address to listen for HTTP requests
    #[clap(long = "rpc-bind-address", default_value_t = default_rpc_bind_address())]
    #[serde(default = "default_rpc_bind_address")]
    pub bind_address: String,
    /// Number of workers to spawn for the HTTP server.
    /// If not provided, it will use the number of CPUs.
    #[clap(long = "rpc-threads", default_value_t = detect_available_parallelism())]
    #[serde(default = "detect_available_parallelism")]
    pub threads: usize,
    /// Prometheus configuration
    #[clap(flatten)]
    #[serde(default)]
    pub prometheus: PrometheusConfig,
}

impl Default for RPCConfig {
    fn default() -> Self {
        Self {
            bind_address: default_rpc_bind_address(),
            threads: detect_available_parallelism(),
            prometheus: PrometheusConfig::default(),
        }
    }
}

#[derive(Debug, Clone, clap::Args, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the tier catalog file
    #[clap(long, default_value_t = default_store_path())]
    #[serde(default = "default_store_path")]
    pub store_path: String,
    /// Tier catalog filename inside the store directory
    #[clap(long, default_value_t = default_catalog_filename())]
    #[serde(default = "default_catalog_filename")]
    pub catalog_filename: String,
    /// Do not seed the built-in tier table when the store is empty.
    /// The daemon refuses to start without a stored catalog.
    #[clap(long)]
    #[serde(default)]
    pub disable_default_seed: bool,
}

impl StoreConfig {
    pub fn catalog_path(&self) -> PathBuf {
        Path::new(&self.store_path).join(&self.catalog_filename)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            catalog_filename: default_catalog_filename(),
            disable_default_seed: false,
        }
    }
}

#[derive(Debug, Clone, clap::Args, Serialize, Deserialize)]
pub struct LogConfig {
    /// Set log level
    #[clap(long, value_enum, default_value_t)]
    #[serde(default)]
    pub log_level: LogLevel,
    /// Set file log level
    /// By default, it will be the same as log level
    #[clap(long, value_enum)]
    #[serde(default)]
    pub file_log_level: Option<LogLevel>,
    /// Disable the log file
    #[clap(long)]
    #[serde(default)]
    pub disable_file_logging: bool,
    /// Disable the log filename date based
    /// If disabled, the log file will be named fature-daemon.log instead of YYYY-MM-DD.fature-daemon.log
    #[clap(long)]
    #[serde(default)]
    pub disable_file_log_date_based: bool,
    /// Disable the usage of colors in log
    #[clap(long)]
    #[serde(default)]
    pub disable_log_color: bool,
    /// Log filename
    ///
    /// File will be stored in logs directory, this is only the filename, not the full path.
    #[clap(long, default_value_t = default_log_filename())]
    #[serde(default = "default_log_filename")]
    pub filename_log: String,
    /// Logs directory
    ///
    /// By default it will be logs/ of the current directory.
    #[clap(long, default_value_t = default_logs_path())]
    #[serde(default = "default_logs_path")]
    pub logs_path: String,
    /// Change the datetime format used by the logger
    #[clap(long, default_value_t = default_logs_datetime_format())]
    #[serde(default = "default_logs_datetime_format")]
    pub datetime_format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            file_log_level: None,
            disable_file_logging: false,
            disable_file_log_date_based: false,
            disable_log_color: false,
            filename_log: default_log_filename(),
            logs_path: default_logs_path(),
            datetime_format: default_logs_datetime_format(),
        }
    }
}

#[derive(Debug, Clone, Parser, Serialize, Deserialize, Default)]
#[clap(
    name = "fature_daemon",
    version = VERSION,
    about = "Fature affiliate tier service: resolve referral counts to commission tiers and manage the tier catalog"
)]
pub struct Config {
    /// RPC configuration
    #[clap(flatten)]
    #[serde(default)]
    pub rpc: RPCConfig,
    /// Catalog store configuration
    #[clap(flatten)]
    #[serde(default)]
    pub store: StoreConfig,
    /// Log configuration
    #[clap(flatten)]
    #[serde(default)]
    pub log: LogConfig,
    /// JSON File to load the configuration from
    #[clap(long)]
    #[serde(skip)]
    pub config_file: Option<String>,
    /// Generate the template at the `config_file` path
    #[clap(long)]
    #[serde(skip)]
    pub generate_config_template: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid RPC bind address '{0}'")]
    InvalidBindAddress(String),
    #[error("RPC threads must be at least 1")]
    NoRpcThreads,
    #[error("Prometheus route '{0}' must start with '/'")]
    InvalidPrometheusRoute(String),
    #[error("{0} must not be empty")]
    EmptyValue(&'static str),
}

/// Every problem found by `Config::validate`, never empty
#[derive(Debug, PartialEq, Eq)]
pub struct ConfigErrors(pub Vec<ConfigError>);

impl ConfigErrors {
    pub fn errors(&self) -> &[ConfigError] {
        &self.0
    }
}

impl fmt::Display for ConfigErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigErrors {}

impl Config {
    /// Load a configuration from a JSON file; missing fields take their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Error while opening config file {}", path.display()))?;
        serde_json::from_reader(file)
            .with_context(|| format!("Error while reading config file {}", path.display()))
    }

    /// Write this configuration as a JSON template
    pub fn write_template<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = File::create(path).context("Error while creating config file")?;
        let json =
            serde_json::to_string_pretty(self).context("Error while serializing config file")?;
        file.write_all(json.as_bytes())
            .context("Error while writing config file")?;
        Ok(())
    }

    /// Check every setting, reporting all problems at once
    pub fn validate(&self) -> Result<(), ConfigErrors> {
        let mut errors = Vec::new();
        if self.rpc.bind_address.parse::<SocketAddr>().is_err() {
            errors.push(ConfigError::InvalidBindAddress(
                self.rpc.bind_address.clone(),
            ));
        }
        if self.rpc.threads == 0 {
            errors.push(ConfigError::NoRpcThreads);
        }
        if self.rpc.prometheus.enable && !self.rpc.prometheus.route.starts_with('/') {
            errors.push(ConfigError::InvalidPrometheusRoute(
                self.rpc.prometheus.route.clone(),
            ));
        }
        if self.store.catalog_filename.trim().is_empty() {
            errors.push(ConfigError::EmptyValue("catalog filename"));
        }
        if !self.log.disable_file_logging && self.log.filename_log.trim().is_empty() {
            errors.push(ConfigError::EmptyValue("log filename"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigErrors(errors))
        }
    }
}

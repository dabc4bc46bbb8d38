// Console and file logging on top of fern

use crate::core::config::LogConfig;
use anyhow::{Context, Result};
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    clap::ValueEnum,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

// Crates that are too chatty below warn
const QUIET_MODULES: [&str; 3] = ["actix_server", "actix_http", "mio"];

/// Build the dispatcher described by `config` without installing it
pub fn build_dispatch(config: &LogConfig) -> Result<fern::Dispatch> {
    let console_level = LevelFilter::from(config.log_level);
    let file_level = LevelFilter::from(config.file_log_level.unwrap_or(config.log_level));

    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Cyan)
        .trace(Color::White);
    let use_colors = !config.disable_log_color;
    let datetime_format = config.datetime_format.clone();

    let console = fern::Dispatch::new()
        .level(console_level)
        .format(move |out, message, record| {
            let now = chrono::Local::now().format(&datetime_format);
            if use_colors {
                out.finish(format_args!(
                    "{} {} [{}] {}",
                    now,
                    colors.color(record.level()),
                    record.target(),
                    message
                ))
            } else {
                out.finish(format_args!(
                    "{} {} [{}] {}",
                    now,
                    record.level(),
                    record.target(),
                    message
                ))
            }
        })
        .chain(std::io::stdout());

    let mut dispatch = fern::Dispatch::new()
        .level(console_level.max(file_level))
        .chain(console);
    for module in QUIET_MODULES {
        dispatch = dispatch.level_for(module, LevelFilter::Warn);
    }

    if !config.disable_file_logging {
        let dir = Path::new(&config.logs_path);
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Error while creating logs directory {}", dir.display()))?;

        let file_format = config.datetime_format.clone();
        let file = fern::Dispatch::new()
            .level(file_level)
            .format(move |out, message, record| {
                out.finish(format_args!(
                    "{} {} [{}] {}",
                    chrono::Local::now().format(&file_format),
                    record.level(),
                    record.target(),
                    message
                ))
            });

        let file = if config.disable_file_log_date_based {
            let path = dir.join(&config.filename_log);
            file.chain(fern::log_file(&path).with_context(|| {
                format!("Error while opening log file {}", path.display())
            })?)
        } else {
            // rotated daily as YYYY-MM-DD.<filename>
            file.chain(fern::DateBased::new(
                dir.join(""),
                format!("%Y-%m-%d.{}", config.filename_log),
            ))
        };
        dispatch = dispatch.chain(file);
    }

    Ok(dispatch)
}

/// Install the global logger
pub fn setup_logger(config: &LogConfig) -> Result<()> {
    build_dispatch(config)?
        .apply()
        .context("Error while installing the logger")
}

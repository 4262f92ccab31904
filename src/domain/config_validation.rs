//! Configuration validation.
//!
//! Validates the `[screen]` section and every strategy override section
//! before any data is loaded.

use crate::domain::error::ScreenerError;
use crate::domain::params::overrides_from_config;
use crate::domain::strategy::MIN_BARS;
use crate::ports::config_port::ConfigPort;
use std::path::PathBuf;

pub const SCREEN_SECTION: &str = "screen";
pub const DEFAULT_NAMES_FILE: &str = "stock_names.csv";
pub const DEFAULT_OUTPUT: &str = "signals.csv";

/// Resolved `[screen]` settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenSettings {
    pub data_dir: PathBuf,
    pub names_file: PathBuf,
    pub output: PathBuf,
    pub threads: usize,
    pub min_bars: usize,
}

impl ScreenSettings {
    /// Reads and validates `[screen]`; `data_dir` is required.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, ScreenerError> {
        let data_dir = match config.get_string(SCREEN_SECTION, "data_dir") {
            Some(s) if !s.trim().is_empty() => PathBuf::from(s.trim()),
            _ => {
                return Err(ScreenerError::ConfigMissing {
                    section: SCREEN_SECTION.to_string(),
                    key: "data_dir".to_string(),
                });
            }
        };

        let names_file = config
            .get_string(SCREEN_SECTION, "names_file")
            .map(|s| PathBuf::from(s.trim()))
            .unwrap_or_else(|| data_dir.join(DEFAULT_NAMES_FILE));
        let output = config
            .get_string(SCREEN_SECTION, "output")
            .map(|s| PathBuf::from(s.trim()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

        Ok(Self {
            data_dir,
            names_file,
            output,
            threads: validate_threads(config)?,
            min_bars: validate_min_bars(config)?,
        })
    }
}

/// Checks everything except `data_dir`, which only `select` needs.
pub fn validate_screen_config(
    config: &dyn ConfigPort,
    strategy_names: &[&str],
) -> Result<(), ScreenerError> {
    validate_threads(config)?;
    validate_min_bars(config)?;
    overrides_from_config(config, strategy_names)?;
    Ok(())
}

fn parse_count(config: &dyn ConfigPort, key: &str) -> Result<Option<usize>, ScreenerError> {
    let Some(raw) = config.get_string(SCREEN_SECTION, key) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<usize>()
        .map(Some)
        .map_err(|_| ScreenerError::ConfigInvalid {
            section: SCREEN_SECTION.to_string(),
            key: key.to_string(),
            reason: format!("{key} must be a non-negative integer, got {raw:?}"),
        })
}

fn validate_threads(config: &dyn ConfigPort) -> Result<usize, ScreenerError> {
    Ok(parse_count(config, "threads")?.unwrap_or(0))
}

fn validate_min_bars(config: &dyn ConfigPort) -> Result<usize, ScreenerError> {
    let value = parse_count(config, "min_bars")?.unwrap_or(MIN_BARS);
    if value < MIN_BARS {
        return Err(ScreenerError::ConfigInvalid {
            section: SCREEN_SECTION.to_string(),
            key: "min_bars".to_string(),
            reason: format!("min_bars must be at least {MIN_BARS}"),
        });
    }
    Ok(value)
}

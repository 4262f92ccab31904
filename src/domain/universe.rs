//! Instrument universe assembly.
//!
//! Loads every code from a [`DataPort`], pairs it with its display name and
//! drops instruments that could not be read or are too short to screen.

use crate::domain::error::ScreenerError;
use crate::domain::ohlcv::TimeSeries;
use crate::domain::runner::progress_due;
use crate::domain::strategy::MIN_BARS;
use crate::ports::data_port::DataPort;
use std::collections::BTreeMap;

/// Display name used when the names source has no entry for a code.
pub const UNKNOWN_NAME: &str = "未知";

#[derive(Debug, Clone)]
pub struct Instrument {
    pub name: String,
    pub series: TimeSeries,
}

/// Code -> instrument, iterated in code order.
#[derive(Debug, Clone, Default)]
pub struct Universe {
    instruments: BTreeMap<String, Instrument>,
}

impl Universe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: &str, name: &str, series: TimeSeries) {
        self.instruments.insert(
            code.to_string(),
            Instrument {
                name: name.to_string(),
                series,
            },
        );
    }

    pub fn get(&self, code: &str) -> Option<&Instrument> {
        self.instruments.get(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Instrument)> {
        self.instruments.iter().map(|(c, i)| (c.as_str(), i))
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// Code -> display name, the companion map for rendering results.
    pub fn names(&self) -> BTreeMap<String, String> {
        self.instruments
            .iter()
            .map(|(c, i)| (c.clone(), i.name.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoData,
    ReadError(String),
    InsufficientBars { bars: usize },
}

#[derive(Debug, Clone)]
pub struct SkippedCode {
    pub code: String,
    pub reason: SkipReason,
}

pub struct UniverseBuild {
    pub universe: Universe,
    pub skipped: Vec<SkippedCode>,
}

pub fn build_universe(
    data_port: &dyn DataPort,
    min_bars: usize,
) -> Result<UniverseBuild, ScreenerError> {
    let min_bars = min_bars.max(MIN_BARS);
    let codes = data_port.list_codes()?;
    let names = data_port.instrument_names().unwrap_or_else(|e| {
        log::warn!("instrument names unavailable ({e}); using {UNKNOWN_NAME}");
        Default::default()
    });

    let mut universe = Universe::new();
    let mut skipped = Vec::new();
    let total = codes.len();

    for (i, code) in codes.into_iter().enumerate() {
        let reason = match data_port.fetch_series(&code) {
            Err(e) => Some(SkipReason::ReadError(e.to_string())),
            Ok(series) if series.is_empty() => Some(SkipReason::NoData),
            Ok(series) if series.len() < min_bars => Some(SkipReason::InsufficientBars {
                bars: series.len(),
            }),
            Ok(series) => {
                let name = names.get(&code).map_or(UNKNOWN_NAME, String::as_str);
                universe.insert(&code, name, series);
                None
            }
        };

        if let Some(reason) = reason {
            log::debug!("skipping {code}: {reason:?}");
            skipped.push(SkippedCode { code, reason });
        }

        let done = i + 1;
        if progress_due(done, total) {
            log::info!(
                "loading: [{done}/{total}] {} usable, {} skipped",
                universe.len(),
                skipped.len()
            );
        }
    }

    if universe.is_empty() {
        return Err(ScreenerError::NoData {
            location: format!("{total} listed codes"),
        });
    }

    Ok(UniverseBuild { universe, skipped })
}

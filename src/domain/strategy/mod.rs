//! Strategy contract and the shared evaluation skeleton.
//!
//! A strategy computes an [`IndicatorFrame`] from a [`TimeSeries`] and decides
//! whether the instrument's latest observation matches. [`Strategy::evaluate`]
//! wraps both steps: length check, compute, decide, wrap.

pub mod bowl_rebound;

use crate::domain::frame::IndicatorFrame;
use crate::domain::ohlcv::TimeSeries;
use crate::domain::params::StrategyParams;
use crate::domain::signal::{Signal, SignalDetail};

/// Series shorter than this never produce a signal.
pub const MIN_BARS: usize = 60;

pub trait Strategy: Send + Sync {
    /// Registered name, also the configuration section for overrides.
    fn name(&self) -> &str;

    /// Human-readable label.
    fn display_name(&self) -> &str {
        self.name()
    }

    fn params(&self) -> &StrategyParams;

    fn compute_indicators<'a>(&self, series: &'a TimeSeries) -> IndicatorFrame<'a>;

    /// Zero or more matches for the latest observation of `frame`.
    fn decide(&self, frame: &IndicatorFrame<'_>, instrument_name: &str) -> Vec<SignalDetail>;

    fn evaluate(&self, code: &str, name: &str, series: &TimeSeries) -> Option<Signal> {
        evaluate(self, code, name, series)
    }
}

/// Never fails: short or degenerate input yields `None`.
pub fn evaluate<S: Strategy + ?Sized>(
    strategy: &S,
    code: &str,
    name: &str,
    series: &TimeSeries,
) -> Option<Signal> {
    if series.len() < MIN_BARS {
        return None;
    }

    let frame = strategy.compute_indicators(series);
    let signals = strategy.decide(&frame, name);
    if signals.is_empty() {
        return None;
    }

    Some(Signal {
        code: code.to_string(),
        name: name.to_string(),
        signals,
    })
}

//! Composite trend pair: short-term trend line and bull/bear line.
//!
//! short_term_trend = EMA(EMA(C, 10), 10)
//! bull_bear_line   = (MA(C, p1) + MA(C, p2) + MA(C, p3) + MA(C, p4)) / 4

use crate::domain::indicator::{ema, ma};
use crate::domain::ohlcv::TimeSeries;

pub const SHORT_TREND_PERIOD: usize = 10;
pub const DEFAULT_MA_PERIODS: [usize; 4] = [5, 10, 20, 30];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrendPair {
    pub short_term_trend: Vec<f64>,
    pub bull_bear_line: Vec<f64>,
}

/// Both lines over a chronological close column.
pub fn trend_lines(close: &[f64], ma_periods: [usize; 4]) -> TrendPair {
    let short_term_trend = ema(&ema(close, SHORT_TREND_PERIOD), SHORT_TREND_PERIOD);

    let averages: Vec<Vec<f64>> = ma_periods.iter().map(|&p| ma(close, p)).collect();
    let bull_bear_line = (0..close.len())
        .map(|i| averages.iter().map(|a| a[i]).sum::<f64>() / 4.0)
        .collect();

    TrendPair {
        short_term_trend,
        bull_bear_line,
    }
}

/// Trend pair for a series in either orientation, row-aligned with it.
pub fn calculate_trend(series: &TimeSeries, ma_periods: [usize; 4]) -> TrendPair {
    let close = series.chronological(|b| b.close);
    let pair = trend_lines(&close, ma_periods);
    TrendPair {
        short_term_trend: series.to_storage_order(pair.short_term_trend),
        bull_bear_line: series.to_storage_order(pair.bull_bear_line),
    }
}

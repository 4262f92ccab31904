//! Bowl rebound: a pullback into the trend "bowl" shortly after a volume surge.
//!
//! Per row (computed oldest-first, stored in the series' own order):
//! - trend_above      = short_term_trend > bull_bear_line
//! - fall_in_bowl     = bull_bear_line <= C <= short_term_trend
//! - near_short_trend = short_term_trend * 0.98 <= C <= short_term_trend * 1.02
//! - key_candle       = V / REF(V,1) >= N AND C > O AND market_cap > CAP
//! - abnormal         = EXIST(key_candle, M)
//! - signal           = abnormal AND trend_above AND J <= J_VAL
//!                      AND (fall_in_bowl OR near_short_trend)
//!
//! Only the latest row's `signal` is considered. A match is kept only if a
//! bullish key candle is found among the latest row and the M rows before it;
//! the newest such candle's date is reported.

use crate::domain::error::StrategyError;
use crate::domain::frame::IndicatorFrame;
use crate::domain::indicator::kdj::{kdj_lines, KdjParams};
use crate::domain::indicator::trend::trend_lines;
use crate::domain::indicator::{exist, ref_n};
use crate::domain::ohlcv::TimeSeries;
use crate::domain::params::{ParamMap, StrategyParams};
use crate::domain::signal::{round2, Reason, SignalDetail};
use crate::domain::strategy::Strategy;

pub const NAME: &str = "BowlReboundStrategy";
const DISPLAY_NAME: &str = "Bowl Rebound";

/// Display-name fragments marking delisted or unidentified instruments.
pub const DELISTED_MARKERS: [&str; 4] = ["退", "未知", "退市", "已退"];

const GUARD_ROWS: usize = 30;
const MAX_MEAN_ABS_J: f64 = 80.0;
const NEAR_BAND: f64 = 0.02;
const MARKET_CAP_UNIT: f64 = 1e8;

pub mod columns {
    pub const SHORT_TERM_TREND: &str = "short_term_trend";
    pub const BULL_BEAR_LINE: &str = "bull_bear_line";
    pub const TREND_ABOVE: &str = "trend_above";
    pub const FALL_IN_BOWL: &str = "fall_in_bowl";
    pub const NEAR_SHORT_TREND: &str = "near_short_trend";
    pub const K: &str = "K";
    pub const D: &str = "D";
    pub const J: &str = "J";
    pub const VOL_RATIO: &str = "vol_ratio";
    pub const VOL_SURGE: &str = "vol_surge";
    pub const POSITIVE_CANDLE: &str = "positive_candle";
    pub const MARKET_CAP_OK: &str = "market_cap_ok";
    pub const KEY_CANDLE: &str = "key_candle";
    pub const ABNORMAL: &str = "abnormal";
    pub const J_LOW: &str = "j_low";
    pub const SIGNAL: &str = "signal";
}

use columns::*;

#[derive(Debug, Clone)]
pub struct BowlRebound {
    params: StrategyParams,
    volume_multiple: f64,
    lookback: usize,
    cap_floor: f64,
    j_ceiling: f64,
    ma_periods: [usize; 4],
}

impl BowlRebound {
    pub fn default_params() -> StrategyParams {
        StrategyParams::from_defaults(&[
            ("N", 4.0),
            ("M", 15.0),
            ("CAP", 4_000_000_000.0),
            ("J_VAL", 30.0),
            ("M1", 5.0),
            ("M2", 10.0),
            ("M3", 20.0),
            ("M4", 30.0),
        ])
    }

    pub fn new(overrides: &ParamMap) -> Result<Self, StrategyError> {
        let params = Self::default_params().with_overrides(overrides);

        let volume_multiple = params.require("N")?;
        if volume_multiple <= 0.0 {
            return Err(StrategyError::invalid("N", volume_multiple, "must be positive"));
        }

        Ok(Self {
            volume_multiple,
            lookback: params.require_count("M", 1)?,
            cap_floor: params.require("CAP")?,
            j_ceiling: params.require("J_VAL")?,
            ma_periods: [
                params.require_count("M1", 1)?,
                params.require_count("M2", 1)?,
                params.require_count("M3", 1)?,
                params.require_count("M4", 1)?,
            ],
            params,
        })
    }

    pub fn with_defaults() -> Self {
        Self::new(&ParamMap::new()).expect("compiled-in defaults are valid")
    }

    fn is_delisted(name: &str) -> bool {
        DELISTED_MARKERS.iter().any(|m| name.contains(m))
    }

    /// Halted or anomalous instruments: extreme oscillator or no recent trading.
    fn fails_sanity(&self, frame: &IndicatorFrame<'_>) -> bool {
        let series = frame.series();
        let len = series.len();
        let rows: Vec<usize> = (len.saturating_sub(GUARD_ROWS)..len)
            .map(|c| series.storage_index(c))
            .collect();
        if rows.is_empty() {
            return true;
        }

        let mean_abs_j = rows
            .iter()
            .map(|&r| frame.float_at(J, r).unwrap_or(0.0).abs())
            .sum::<f64>()
            / rows.len() as f64;
        if mean_abs_j > MAX_MEAN_ABS_J {
            return true;
        }

        let volume: f64 = rows.iter().map(|&r| series.bars()[r].volume).sum();
        volume <= 0.0
    }

    /// Newest bullish key candle among the latest row and the `lookback` rows before it.
    fn key_candle_row(&self, frame: &IndicatorFrame<'_>) -> Option<usize> {
        let series = frame.series();
        let newest = series.len().checked_sub(1)?;
        let oldest = newest.saturating_sub(self.lookback);
        (oldest..=newest)
            .rev()
            .map(|c| series.storage_index(c))
            .find(|&row| frame.flag_at(KEY_CANDLE, row) && series.bars()[row].is_bullish())
    }
}

impl Strategy for BowlRebound {
    fn name(&self) -> &str {
        NAME
    }

    fn display_name(&self) -> &str {
        DISPLAY_NAME
    }

    fn params(&self) -> &StrategyParams {
        &self.params
    }

    fn compute_indicators<'a>(&self, series: &'a TimeSeries) -> IndicatorFrame<'a> {
        let close = series.chronological(|b| b.close);
        let open = series.chronological(|b| b.open);
        let high = series.chronological(|b| b.high);
        let low = series.chronological(|b| b.low);
        let volume = series.chronological(|b| b.volume);
        let market_cap = series.chronological(|b| b.market_cap);
        let rows = close.len();

        let trend = trend_lines(&close, self.ma_periods);
        let st = &trend.short_term_trend;
        let bbl = &trend.bull_bear_line;

        let trend_above: Vec<bool> = (0..rows).map(|i| st[i] > bbl[i]).collect();
        let fall_in_bowl: Vec<bool> = (0..rows)
            .map(|i| close[i] >= bbl[i] && close[i] <= st[i])
            .collect();
        let near_short_trend: Vec<bool> = (0..rows)
            .map(|i| close[i] >= st[i] * (1.0 - NEAR_BAND) && close[i] <= st[i] * (1.0 + NEAR_BAND))
            .collect();

        let kdj = kdj_lines(&close, &high, &low, KdjParams::default());

        // x/0 is +inf and still a surge; only 0/0 is undefined.
        let vol_ratio: Vec<Option<f64>> = ref_n(&volume, 1)
            .iter()
            .zip(&volume)
            .map(|(prev, v)| prev.map(|p| v / p).filter(|r| !r.is_nan()))
            .collect();
        let vol_surge: Vec<bool> = vol_ratio
            .iter()
            .map(|r| r.is_some_and(|r| r >= self.volume_multiple))
            .collect();
        let positive_candle: Vec<bool> = (0..rows).map(|i| close[i] > open[i]).collect();
        let market_cap_ok: Vec<bool> = market_cap.iter().map(|&c| c > self.cap_floor).collect();
        let key_candle: Vec<bool> = (0..rows)
            .map(|i| vol_surge[i] && positive_candle[i] && market_cap_ok[i])
            .collect();
        let abnormal = exist(&key_candle, self.lookback);
        let j_low: Vec<bool> = kdj.j.iter().map(|&j| j <= self.j_ceiling).collect();
        let signal: Vec<bool> = (0..rows)
            .map(|i| {
                abnormal[i]
                    && trend_above[i]
                    && (fall_in_bowl[i] || near_short_trend[i])
                    && j_low[i]
            })
            .collect();

        let mut frame = IndicatorFrame::new(series);
        frame.insert_float(SHORT_TERM_TREND, series.to_storage_order(trend.short_term_trend));
        frame.insert_float(BULL_BEAR_LINE, series.to_storage_order(trend.bull_bear_line));
        frame.insert_flag(TREND_ABOVE, series.to_storage_order(trend_above));
        frame.insert_flag(FALL_IN_BOWL, series.to_storage_order(fall_in_bowl));
        frame.insert_flag(NEAR_SHORT_TREND, series.to_storage_order(near_short_trend));
        frame.insert_float(K, series.to_storage_order(kdj.k));
        frame.insert_float(D, series.to_storage_order(kdj.d));
        frame.insert_float(J, series.to_storage_order(kdj.j));
        frame.insert_optional(VOL_RATIO, series.to_storage_order(vol_ratio));
        frame.insert_flag(VOL_SURGE, series.to_storage_order(vol_surge));
        frame.insert_flag(POSITIVE_CANDLE, series.to_storage_order(positive_candle));
        frame.insert_flag(MARKET_CAP_OK, series.to_storage_order(market_cap_ok));
        frame.insert_flag(KEY_CANDLE, series.to_storage_order(key_candle));
        frame.insert_flag(ABNORMAL, series.to_storage_order(abnormal));
        frame.insert_flag(J_LOW, series.to_storage_order(j_low));
        frame.insert_flag(SIGNAL, series.to_storage_order(signal));
        frame
    }

    fn decide(&self, frame: &IndicatorFrame<'_>, instrument_name: &str) -> Vec<SignalDetail> {
        if Self::is_delisted(instrument_name) {
            log::debug!("{instrument_name}: skipped, delisting marker in name");
            return vec![];
        }
        if self.fails_sanity(frame) {
            log::debug!("{instrument_name}: skipped, oscillator or volume out of range");
            return vec![];
        }

        let Some(latest) = frame.latest_index() else {
            return vec![];
        };
        if !frame.flag_at(SIGNAL, latest) {
            return vec![];
        }

        // EXIST can match at the window boundary; re-check for a bullish key candle.
        let Some(key_row) = self.key_candle_row(frame) else {
            return vec![];
        };

        let bars = frame.series().bars();
        let bar = &bars[latest];

        let mut reasons = Vec::new();
        if frame.flag_at(FALL_IN_BOWL, latest) {
            reasons.push(Reason::FallInBowl);
        }
        if frame.flag_at(NEAR_SHORT_TREND, latest) {
            reasons.push(Reason::NearShortTrend);
        }

        vec![SignalDetail {
            date: bar.date,
            close: round2(bar.close),
            j: round2(frame.float_at(J, latest).unwrap_or_default()),
            volume_ratio: frame.optional_at(VOL_RATIO, latest).map_or(1.0, round2),
            market_cap: round2(bar.market_cap / MARKET_CAP_UNIT),
            reasons,
            key_candle_date: Some(bars[key_row].date),
        }]
    }
}

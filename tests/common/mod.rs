#![allow(dead_code)]

use chrono::{Days, NaiveDate};
pub use stockscreen::domain::ohlcv::{Bar, TimeSeries};
use stockscreen::domain::error::ScreenerError;
use stockscreen::ports::data_port::DataPort;
use std::collections::HashMap;
use std::fmt::Write as _;

pub struct MockDataPort {
    pub data: HashMap<String, TimeSeries>,
    pub names: HashMap<String, String>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            names: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, code: &str, name: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(code.to_string(), TimeSeries::new(bars));
        self.names.insert(code.to_string(), name.to_string());
        self
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn list_codes(&self) -> Result<Vec<String>, ScreenerError> {
        let mut codes: Vec<String> = self.data.keys().chain(self.errors.keys()).cloned().collect();
        codes.sort();
        Ok(codes)
    }

    fn fetch_series(&self, code: &str) -> Result<TimeSeries, ScreenerError> {
        if let Some(reason) = self.errors.get(code) {
            return Err(ScreenerError::Data {
                code: code.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(code).cloned().unwrap_or_default())
    }

    fn instrument_names(&self) -> Result<HashMap<String, String>, ScreenerError> {
        Ok(self.names.clone())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn start_date() -> NaiveDate {
    date(2024, 1, 1)
}

pub fn make_bar(i: usize, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Bar {
    Bar {
        date: start_date() + Days::new(i as u64),
        open,
        high,
        low,
        close,
        volume,
        amount: 0.0,
        turnover: 0.0,
        market_cap: 5e9,
    }
}

/// Row of the volume-surge candle in [`rebound_bars`] (oldest-first index).
pub const REBOUND_KEY_ROW: usize = 57;

/// 67 bars, oldest first: 50 flat, 10 rising 3% a day with a 5x volume
/// surge on the 8th rising day, 7 falling 1.5% a day. Matches the bowl
/// rebound setup on its latest bar with default parameters.
pub fn rebound_bars() -> Vec<Bar> {
    let mut bars = Vec::new();
    let mut c: f64 = 10.0;
    for i in 0..50 {
        let o = c * 0.995;
        bars.push(make_bar(i, o, c * 1.005, o * 0.995, c, 1e6));
    }
    for k in 0..10 {
        let prev = c;
        c *= 1.03;
        let volume = if k == 7 { 5e6 } else { 1e6 };
        bars.push(make_bar(50 + k, prev, c * 1.005, prev * 0.995, c, volume));
    }
    for k in 0..7 {
        let prev = c;
        c *= 0.985;
        bars.push(make_bar(60 + k, prev, prev * 1.005, c * 0.995, c, 1e6));
    }
    bars
}

/// `count` bars, oldest first, close constant at `close`.
pub fn flat_bars(count: usize, close: f64) -> Vec<Bar> {
    (0..count)
        .map(|i| make_bar(i, close, close, close, close, 1e6))
        .collect()
}

/// Newest-first copy, the canonical on-disk order.
pub fn newest_first(mut bars: Vec<Bar>) -> Vec<Bar> {
    bars.reverse();
    bars
}

/// Renders bars as an instrument CSV file body.
pub fn to_csv(bars: &[Bar]) -> String {
    let mut out = String::from("date,open,high,low,close,volume,amount,turnover,market_cap\n");
    for b in bars {
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{}",
            b.date.format("%Y-%m-%d"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume,
            b.amount,
            b.turnover,
            b.market_cap
        )
        .unwrap();
    }
    out
}

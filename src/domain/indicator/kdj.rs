//! RSV/K/D/J stochastic oscillator.
//!
//! RSV = (C - LLV(L,n)) / (HHV(H,n) - LLV(L,n)) * 100
//! K = SMA(RSV, m1, 1), D = SMA(K, m2, 1), J = 3K - 2D
//!
//! RSV is 50 while the window is still filling (first n-1 rows) and
//! whenever the high-low range is flat. K and D are both seeded at 50.
//! The computation runs oldest-first; results come back in the caller's
//! storage order.

use crate::domain::indicator::{hhv, llv, sma};
use crate::domain::ohlcv::TimeSeries;

pub const NEUTRAL: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KdjParams {
    pub n: usize,
    pub m1: f64,
    pub m2: f64,
}

impl Default for KdjParams {
    fn default() -> Self {
        Self {
            n: 9,
            m1: 3.0,
            m2: 3.0,
        }
    }
}

/// Oscillator columns, row-aligned with the source series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Kdj {
    pub rsv: Vec<f64>,
    pub k: Vec<f64>,
    pub d: Vec<f64>,
    pub j: Vec<f64>,
}

/// RSV over chronological columns.
pub fn rsv(close: &[f64], high: &[f64], low: &[f64], n: usize) -> Vec<f64> {
    let lowest = llv(low, n);
    let highest = hhv(high, n);
    (0..close.len())
        .map(|i| {
            let range = highest[i] - lowest[i];
            if i + 1 < n || range == 0.0 {
                NEUTRAL
            } else {
                (close[i] - lowest[i]) / range * 100.0
            }
        })
        .collect()
}

/// SMA(X, N, 1) with the first row replaced by `seed`.
fn seeded_sma(input: &[f64], n: f64, seed: f64) -> Vec<f64> {
    let mut x = input.to_vec();
    if let Some(first) = x.first_mut() {
        *first = seed;
    }
    sma(&x, n, 1.0)
}

/// Oscillator over chronological columns.
pub fn kdj_lines(close: &[f64], high: &[f64], low: &[f64], params: KdjParams) -> Kdj {
    let rsv = rsv(close, high, low, params.n);
    let k = seeded_sma(&rsv, params.m1, NEUTRAL);
    let d = seeded_sma(&k, params.m2, NEUTRAL);
    let j = k.iter().zip(&d).map(|(k, d)| 3.0 * k - 2.0 * d).collect();
    Kdj { rsv, k, d, j }
}

/// Oscillator for a series in either orientation, row-aligned with it.
pub fn calculate_kdj(series: &TimeSeries, params: KdjParams) -> Kdj {
    let close = series.chronological(|b| b.close);
    let high = series.chronological(|b| b.high);
    let low = series.chronological(|b| b.low);

    let lines = kdj_lines(&close, &high, &low, params);
    Kdj {
        rsv: series.to_storage_order(lines.rsv),
        k: series.to_storage_order(lines.k),
        d: series.to_storage_order(lines.d),
        j: series.to_storage_order(lines.j),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::Bar;
    use approx::assert_relative_eq;
    use chrono::{Days, NaiveDate};

    fn make_series(closes: &[f64]) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                date: start + Days::new(i as u64),
                open: close,
                high: close + 0.5 + ((i + 1) % 3) as f64 * 0.1,
                low: close - 0.5 - (i % 4) as f64 * 0.1,
                close,
                volume: 1000.0,
                amount: 0.0,
                turnover: 0.0,
                market_cap: 1e9,
            })
            .collect()
    }

    fn wave(len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| 10.0 + (i as f64 * 0.7).sin() * 2.0 + i as f64 * 0.05)
            .collect()
    }

    #[test]
    fn rsv_neutral_during_warmup() {
        let close = [1.0, 2.0, 3.0, 4.0];
        let high = [1.5, 2.5, 3.5, 4.5];
        let low = [0.5, 1.5, 2.5, 3.5];
        let v = rsv(&close, &high, &low, 3);
        assert_eq!(v[0], NEUTRAL);
        assert_eq!(v[1], NEUTRAL);
        assert_relative_eq!(v[2], (3.0 - 0.5) / (3.5 - 0.5) * 100.0);
        // window rows 1..=3: llv 1.5, hhv 4.5
        assert_relative_eq!(v[3], (4.0 - 1.5) / (4.5 - 1.5) * 100.0);
    }

    #[test]
    fn rsv_neutral_on_flat_range() {
        let flat = [5.0; 12];
        let close: Vec<f64> = (0..12).map(|i| 3.0 + i as f64).collect();
        let v = rsv(&close, &flat, &flat, 9);
        assert!(v.iter().all(|&x| x == NEUTRAL));
    }

    #[test]
    fn flat_series_stays_at_fifty() {
        let bars: Vec<Bar> = make_series(&[10.0; 20])
            .into_iter()
            .map(|mut b| {
                b.high = 10.0;
                b.low = 10.0;
                b
            })
            .collect();
        let kdj = calculate_kdj(&TimeSeries::new(bars), KdjParams::default());
        for i in 0..20 {
            assert_eq!(kdj.k[i], NEUTRAL);
            assert_eq!(kdj.d[i], NEUTRAL);
            assert_eq!(kdj.j[i], NEUTRAL);
        }
    }

    #[test]
    fn seeds_k_and_d_at_fifty_regardless_of_rsv() {
        let bars = make_series(&wave(15));
        let kdj = calculate_kdj(&TimeSeries::new(bars), KdjParams { n: 1, m1: 3.0, m2: 3.0 });
        assert_eq!(kdj.k[0], NEUTRAL);
        assert_eq!(kdj.d[0], NEUTRAL);
        assert_ne!(kdj.rsv[0], NEUTRAL);
    }

    #[test]
    fn j_is_three_k_minus_two_d() {
        let bars = make_series(&wave(40));
        let kdj = calculate_kdj(&TimeSeries::new(bars), KdjParams::default());
        for i in 0..40 {
            assert_relative_eq!(kdj.j[i], 3.0 * kdj.k[i] - 2.0 * kdj.d[i], epsilon = 1e-9);
        }
    }

    #[test]
    fn descending_input_matches_ascending_by_row() {
        let bars = make_series(&wave(50));
        let ascending = calculate_kdj(&TimeSeries::new(bars.clone()), KdjParams::default());
        let mut reversed = bars;
        reversed.reverse();
        let descending = calculate_kdj(&TimeSeries::new(reversed), KdjParams::default());

        assert_eq!(descending.j.len(), 50);
        for i in 0..50 {
            let j = 49 - i;
            assert_eq!(ascending.k[i], descending.k[j]);
            assert_eq!(ascending.d[i], descending.d[j]);
            assert_eq!(ascending.j[i], descending.j[j]);
        }
    }

    #[test]
    fn empty_series() {
        let kdj = calculate_kdj(&TimeSeries::default(), KdjParams::default());
        assert!(kdj.j.is_empty());
    }
}

//! Technical indicator library.
//!
//! Every function takes one column in chronological (oldest-first) order and
//! returns a column of the same length. Windowed functions follow the warm-up
//! policy: the first `n - 1` rows use whatever shorter window is available
//! instead of producing undefined values. A window length of 0 is treated as 1.
//!
//! - [`ma`], [`ema`], [`llv`], [`hhv`], [`exist`]: vectorizable primitives
//! - [`ref_n`]: lagged reference, undefined for the first `n` rows
//! - [`sma`]: the sequential weighted recurrence behind the [`kdj`] oscillator

pub mod kdj;
pub mod trend;

fn window_start(i: usize, n: usize) -> usize {
    (i + 1).saturating_sub(n.max(1))
}

/// MA(X, N): arithmetic mean of the trailing `n` values.
pub fn ma(series: &[f64], n: usize) -> Vec<f64> {
    (0..series.len())
        .map(|i| {
            let window = &series[window_start(i, n)..=i];
            window.iter().sum::<f64>() / window.len() as f64
        })
        .collect()
}

/// EMA(X, N): alpha = 2/(n+1), seeded with the first observation.
pub fn ema(series: &[f64], n: usize) -> Vec<f64> {
    let alpha = 2.0 / (n.max(1) as f64 + 1.0);
    let mut values = Vec::with_capacity(series.len());
    let mut prev: Option<f64> = None;
    for &x in series {
        let y = match prev {
            None => x,
            Some(p) => alpha * x + (1.0 - alpha) * p,
        };
        values.push(y);
        prev = Some(y);
    }
    values
}

/// LLV(X, N): trailing minimum.
pub fn llv(series: &[f64], n: usize) -> Vec<f64> {
    (0..series.len())
        .map(|i| {
            series[window_start(i, n)..=i]
                .iter()
                .copied()
                .fold(f64::INFINITY, f64::min)
        })
        .collect()
}

/// HHV(X, N): trailing maximum.
pub fn hhv(series: &[f64], n: usize) -> Vec<f64> {
    (0..series.len())
        .map(|i| {
            series[window_start(i, n)..=i]
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max)
        })
        .collect()
}

/// REF(X, N): the value `n` rows earlier; `None` for the first `n` rows.
pub fn ref_n(series: &[f64], n: usize) -> Vec<Option<f64>> {
    (0..series.len())
        .map(|i| i.checked_sub(n).map(|j| series[j]))
        .collect()
}

/// EXIST(COND, N): true when `cond` held at least once in the trailing window.
pub fn exist(cond: &[bool], n: usize) -> Vec<bool> {
    (0..cond.len())
        .map(|i| cond[window_start(i, n)..=i].iter().any(|&c| c))
        .collect()
}

/// SMA(X, N, M): `y[0] = x[0]`, `y[i] = (x[i]*M + y[i-1]*(N-M)) / N`.
///
/// This is a single forward scan; each output depends on the previous one,
/// so it cannot be expressed as a rolling window.
pub fn sma(series: &[f64], n: f64, m: f64) -> Vec<f64> {
    let mut values = Vec::with_capacity(series.len());
    for (i, &x) in series.iter().enumerate() {
        let y = if i == 0 {
            x
        } else {
            (x * m + values[i - 1] * (n - m)) / n
        };
        values.push(y);
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ma_partial_window_at_head() {
        let v = ma(&[2.0, 4.0, 6.0, 8.0], 3);
        assert_relative_eq!(v[0], 2.0);
        assert_relative_eq!(v[1], 3.0);
        assert_relative_eq!(v[2], 4.0);
        assert_relative_eq!(v[3], 6.0);
    }

    #[test]
    fn ma_constant_series() {
        let series = vec![7.35; 40];
        for n in [1, 5, 10, 20, 30, 60] {
            for v in ma(&series, n) {
                assert_relative_eq!(v, 7.35, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn ema_seeded_with_first_value() {
        let v = ema(&[10.0, 20.0, 30.0], 3);
        assert_relative_eq!(v[0], 10.0);
        assert_relative_eq!(v[1], 15.0);
        assert_relative_eq!(v[2], 22.5);
    }

    #[test]
    fn ema_constant_series() {
        let series = vec![12.5; 40];
        for n in [1, 2, 10, 30] {
            for v in ema(&series, n) {
                assert_relative_eq!(v, 12.5, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn ema_period_one_is_identity() {
        let series = [3.0, 1.0, 4.0, 1.0, 5.0];
        assert_eq!(ema(&series, 1), series.to_vec());
    }

    #[test]
    fn llv_hhv_partial_window() {
        let series = [5.0, 3.0, 8.0, 1.0, 9.0];
        assert_eq!(llv(&series, 3), vec![5.0, 3.0, 3.0, 1.0, 1.0]);
        assert_eq!(hhv(&series, 3), vec![5.0, 5.0, 8.0, 8.0, 9.0]);
    }

    #[test]
    fn ref_n_shifts_and_leaves_head_undefined() {
        let v = ref_n(&[1.0, 2.0, 3.0], 1);
        assert_eq!(v, vec![None, Some(1.0), Some(2.0)]);
        assert_eq!(ref_n(&[1.0, 2.0], 0), vec![Some(1.0), Some(2.0)]);
        assert_eq!(ref_n(&[1.0, 2.0], 5), vec![None, None]);
    }

    #[test]
    fn exist_window_of_one_is_identity() {
        let cond = [true, false, false, true, false];
        assert_eq!(exist(&cond, 1), cond.to_vec());
    }

    #[test]
    fn exist_remembers_within_window() {
        let cond = [false, true, false, false, false];
        assert_eq!(exist(&cond, 3), vec![false, true, true, true, false]);
    }

    #[test]
    fn sma_recurrence() {
        let v = sma(&[50.0, 80.0, 20.0], 3.0, 1.0);
        assert_relative_eq!(v[0], 50.0);
        assert_relative_eq!(v[1], 60.0);
        assert_relative_eq!(v[2], 140.0 / 3.0);
    }

    #[test]
    fn sma_with_m_equal_n_is_identity() {
        let series = [1.5, -2.0, 30.25, 7.0, 0.0];
        assert_eq!(sma(&series, 4.0, 4.0), series.to_vec());
    }

    #[test]
    fn empty_inputs() {
        assert!(ma(&[], 5).is_empty());
        assert!(ema(&[], 5).is_empty());
        assert!(llv(&[], 5).is_empty());
        assert!(hhv(&[], 5).is_empty());
        assert!(ref_n(&[], 1).is_empty());
        assert!(exist(&[], 5).is_empty());
        assert!(sma(&[], 3.0, 1.0).is_empty());
    }

    #[test]
    fn zero_window_treated_as_one() {
        let series = [4.0, 6.0];
        assert_eq!(ma(&series, 0), series.to_vec());
        assert_eq!(hhv(&series, 0), series.to_vec());
    }
}

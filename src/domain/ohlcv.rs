//! Daily bar and per-instrument time series.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub amount: f64,
    pub turnover: f64,
    pub market_cap: f64,
}

impl Bar {
    /// close > open
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }
}

/// Storage order of a series, detected from its first and last dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Oldest first.
    Ascending,
    /// Newest first (canonical storage order).
    Descending,
}

/// Ordered bars of one instrument, kept in the order the caller supplied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    bars: Vec<Bar>,
}

impl TimeSeries {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self { bars }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn orientation(&self) -> Orientation {
        match (self.bars.first(), self.bars.last()) {
            (Some(first), Some(last)) if first.date > last.date => Orientation::Descending,
            _ => Orientation::Ascending,
        }
    }

    /// Row index of the most recent bar in storage order.
    pub fn latest_index(&self) -> Option<usize> {
        if self.bars.is_empty() {
            return None;
        }
        match self.orientation() {
            Orientation::Descending => Some(0),
            Orientation::Ascending => Some(self.bars.len() - 1),
        }
    }

    pub fn latest(&self) -> Option<&Bar> {
        self.latest_index().map(|i| &self.bars[i])
    }

    /// Extracts one field in chronological (oldest-first) order.
    pub fn chronological<F>(&self, field: F) -> Vec<f64>
    where
        F: Fn(&Bar) -> f64,
    {
        let mut values: Vec<f64> = self.bars.iter().map(field).collect();
        if self.orientation() == Orientation::Descending {
            values.reverse();
        }
        values
    }

    /// Maps a chronological column back onto storage order.
    pub fn to_storage_order<T>(&self, mut column: Vec<T>) -> Vec<T> {
        if self.orientation() == Orientation::Descending {
            column.reverse();
        }
        column
    }

    /// Converts a chronological index to a storage row index.
    pub fn storage_index(&self, chronological: usize) -> usize {
        match self.orientation() {
            Orientation::Descending => self.bars.len() - 1 - chronological,
            Orientation::Ascending => chronological,
        }
    }
}

impl From<Vec<Bar>> for TimeSeries {
    fn from(bars: Vec<Bar>) -> Self {
        Self::new(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume: 1000.0,
            amount: 0.0,
            turnover: 0.0,
            market_cap: 1e9,
        }
    }

    #[test]
    fn detects_descending() {
        let series = TimeSeries::new(vec![bar(3, 12.0), bar(2, 11.0), bar(1, 10.0)]);
        assert_eq!(series.orientation(), Orientation::Descending);
        assert_eq!(series.latest_index(), Some(0));
        assert_eq!(series.chronological(|b| b.close), vec![10.0, 11.0, 12.0]);
    }

    #[test]
    fn detects_ascending() {
        let series = TimeSeries::new(vec![bar(1, 10.0), bar(2, 11.0), bar(3, 12.0)]);
        assert_eq!(series.orientation(), Orientation::Ascending);
        assert_eq!(series.latest_index(), Some(2));
        assert_eq!(series.latest().unwrap().close, 12.0);
    }

    #[test]
    fn single_bar_is_ascending() {
        let series = TimeSeries::new(vec![bar(1, 10.0)]);
        assert_eq!(series.orientation(), Orientation::Ascending);
        assert_eq!(series.latest_index(), Some(0));
    }

    #[test]
    fn empty_series_has_no_latest() {
        let series = TimeSeries::default();
        assert!(series.is_empty());
        assert_eq!(series.latest_index(), None);
    }

    #[test]
    fn storage_order_round_trip_descending() {
        let series = TimeSeries::new(vec![bar(3, 12.0), bar(2, 11.0), bar(1, 10.0)]);
        let chrono = series.chronological(|b| b.close);
        assert_eq!(series.to_storage_order(chrono), vec![12.0, 11.0, 10.0]);
        assert_eq!(series.storage_index(0), 2);
        assert_eq!(series.storage_index(2), 0);
    }

    #[test]
    fn bullish_candle() {
        assert!(bar(1, 10.0).is_bullish());
    }
}

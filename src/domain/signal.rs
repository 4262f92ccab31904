//! Signal records emitted by strategies.

use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Why a setup matched; rendered with [`Reason::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Reason {
    FallInBowl,
    NearShortTrend,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::FallInBowl => "fall_in_bowl",
            Reason::NearShortTrend => "near_short_trend",
        }
    }
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One matched observation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalDetail {
    pub date: NaiveDate,
    pub close: f64,
    pub j: f64,
    pub volume_ratio: f64,
    /// In units of 1e8.
    pub market_cap: f64,
    pub reasons: Vec<Reason>,
    pub key_candle_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Signal {
    pub code: String,
    pub name: String,
    pub signals: Vec<SignalDetail>,
}

impl Signal {
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.signals.iter().map(|s| s.date).max()
    }
}

/// Per-strategy results together with the code -> display name map used for rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub results: BTreeMap<String, Vec<Signal>>,
    pub names: BTreeMap<String, String>,
}

impl BatchReport {
    pub fn total_signals(&self) -> usize {
        self.results.values().map(Vec::len).sum()
    }
}

/// Rounds half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_values() {
        assert_eq!(round2(12.345_678), 12.35);
        assert_eq!(round2(-18.042), -18.04);
        assert_eq!(round2(50.0), 50.0);
    }

    #[test]
    fn reason_tags() {
        assert_eq!(Reason::FallInBowl.to_string(), "fall_in_bowl");
        assert_eq!(Reason::NearShortTrend.as_str(), "near_short_trend");
    }

    #[test]
    fn latest_date_picks_newest_detail() {
        let d1 = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
        let detail = |date| SignalDetail {
            date,
            close: 1.0,
            j: 0.0,
            volume_ratio: 1.0,
            market_cap: 1.0,
            reasons: vec![],
            key_candle_date: None,
        };
        let signal = Signal {
            code: "000001".into(),
            name: "Test".into(),
            signals: vec![detail(d1), detail(d2)],
        };
        assert_eq!(signal.latest_date(), Some(d2));
    }
}

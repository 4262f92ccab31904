//! Data access port trait.

use crate::domain::error::ScreenerError;
use crate::domain::ohlcv::TimeSeries;
use std::collections::HashMap;

pub trait DataPort {
    fn list_codes(&self) -> Result<Vec<String>, ScreenerError>;

    /// Bars in the store's own order (canonically newest first).
    fn fetch_series(&self, code: &str) -> Result<TimeSeries, ScreenerError>;

    /// Instrument code -> display name.
    fn instrument_names(&self) -> Result<HashMap<String, String>, ScreenerError>;
}

//! CSV file data adapter.
//!
//! One file per instrument, either `<data_dir>/<code>.csv` or bucketed by the
//! first two characters of the code as `<data_dir>/<prefix>/<code>.csv`.
//! Rows are returned in file order (the store writes newest first).

use crate::domain::error::ScreenerError;
use crate::domain::ohlcv::{Bar, TimeSeries};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const REQUIRED_COLUMNS: [&str; 7] = [
    "date",
    "open",
    "high",
    "low",
    "close",
    "volume",
    "market_cap",
];

pub struct CsvAdapter {
    data_dir: PathBuf,
    names_file: PathBuf,
}

impl CsvAdapter {
    pub fn new(data_dir: PathBuf, names_file: PathBuf) -> Self {
        Self {
            data_dir,
            names_file,
        }
    }

    fn csv_path(&self, code: &str) -> PathBuf {
        let prefix: String = code.chars().take(2).collect();
        let bucketed = self.data_dir.join(prefix).join(format!("{code}.csv"));
        if bucketed.is_file() {
            bucketed
        } else {
            self.data_dir.join(format!("{code}.csv"))
        }
    }

    fn is_names_file(&self, path: &Path) -> bool {
        path.file_name().is_some_and(|n| Some(n) == self.names_file.file_name())
    }

    fn collect_codes(
        &self,
        dir: &Path,
        depth: usize,
        codes: &mut Vec<String>,
    ) -> Result<(), ScreenerError> {
        let entries = fs::read_dir(dir).map_err(|e| ScreenerError::NoData {
            location: format!("{} ({e})", dir.display()),
        })?;

        for entry in entries {
            let path = entry?.path();
            if path.is_dir() {
                if depth == 0 {
                    self.collect_codes(&path, depth + 1, codes)?;
                }
                continue;
            }
            if path.extension().is_some_and(|ext| ext == "csv") && !self.is_names_file(&path) {
                if let Some(stem) = path.file_stem() {
                    codes.push(stem.to_string_lossy().into_owned());
                }
            }
        }
        Ok(())
    }
}

fn data_error(code: &str, reason: impl Into<String>) -> ScreenerError {
    ScreenerError::Data {
        code: code.to_string(),
        reason: reason.into(),
    }
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time part.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn parse_field(
    record: &csv::StringRecord,
    index: Option<usize>,
    name: &str,
    code: &str,
    row: usize,
) -> Result<f64, ScreenerError> {
    let Some(index) = index else {
        return Ok(0.0);
    };
    let raw = record.get(index).unwrap_or("").trim();
    if raw.is_empty() {
        return Ok(0.0);
    }
    raw.parse()
        .map_err(|e| data_error(code, format!("row {row}: invalid {name} value {raw:?}: {e}")))
}

impl DataPort for CsvAdapter {
    fn list_codes(&self) -> Result<Vec<String>, ScreenerError> {
        let mut codes = Vec::new();
        self.collect_codes(&self.data_dir, 0, &mut codes)?;
        codes.sort();
        codes.dedup();
        Ok(codes)
    }

    fn fetch_series(&self, code: &str) -> Result<TimeSeries, ScreenerError> {
        let path = self.csv_path(code);
        let content = fs::read_to_string(&path)
            .map_err(|e| data_error(code, format!("failed to read {}: {e}", path.display())))?;
        if content.trim().is_empty() {
            return Ok(TimeSeries::default());
        }

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| data_error(code, format!("CSV header error: {e}")))?
            .clone();
        let column = |name: &str| headers.iter().position(|h| h.trim() == name);

        let mut indices = HashMap::new();
        for name in REQUIRED_COLUMNS {
            let index =
                column(name).ok_or_else(|| data_error(code, format!("missing {name} column")))?;
            indices.insert(name, index);
        }
        let amount = column("amount");
        let turnover = column("turnover");

        let mut bars = Vec::new();
        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| data_error(code, format!("CSV parse error: {e}")))?;
            let raw_date = record.get(indices["date"]).unwrap_or("");
            let date = parse_date(raw_date)
                .ok_or_else(|| data_error(code, format!("row {row}: invalid date {raw_date:?}")))?;
            let field =
                |name: &str| parse_field(&record, indices.get(name).copied(), name, code, row);

            bars.push(Bar {
                date,
                open: field("open")?,
                high: field("high")?,
                low: field("low")?,
                close: field("close")?,
                volume: field("volume")?,
                amount: parse_field(&record, amount, "amount", code, row)?,
                turnover: parse_field(&record, turnover, "turnover", code, row)?,
                market_cap: field("market_cap")?,
            });
        }

        Ok(TimeSeries::new(bars))
    }

    fn instrument_names(&self) -> Result<HashMap<String, String>, ScreenerError> {
        let content = fs::read_to_string(&self.names_file).map_err(|e| ScreenerError::Data {
            code: "names".into(),
            reason: format!("failed to read {}: {e}", self.names_file.display()),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut names = HashMap::new();
        for result in rdr.records() {
            let record = result.map_err(|e| ScreenerError::Data {
                code: "names".into(),
                reason: format!("CSV parse error: {e}"),
            })?;
            if let (Some(code), Some(name)) = (record.get(0), record.get(1)) {
                names.insert(code.trim().to_string(), name.trim().to_string());
            }
        }
        Ok(names)
    }
}

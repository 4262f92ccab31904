//! CSV report adapter implementing ReportPort.
//!
//! One row per signal detail, strategies in name order, signals in the order
//! the batch produced them.

use std::fs;
use std::path::Path;

use crate::domain::error::ScreenerError;
use crate::domain::signal::BatchReport;
use crate::ports::report_port::ReportPort;

pub const HEADER: [&str; 10] = [
    "strategy",
    "code",
    "name",
    "date",
    "close",
    "j",
    "volume_ratio",
    "market_cap",
    "reasons",
    "key_candle_date",
];

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn report_error(e: impl std::fmt::Display) -> ScreenerError {
    ScreenerError::Report {
        reason: e.to_string(),
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, report: &BatchReport, output_path: &Path) -> Result<(), ScreenerError> {
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(output_path).map_err(report_error)?;
        writer.write_record(HEADER).map_err(report_error)?;

        for (strategy, signals) in &report.results {
            for signal in signals {
                let name = report
                    .names
                    .get(&signal.code)
                    .map_or(signal.name.as_str(), String::as_str);
                for detail in &signal.signals {
                    let reasons: Vec<&str> = detail.reasons.iter().map(|r| r.as_str()).collect();
                    let record = [
                        strategy.clone(),
                        signal.code.clone(),
                        name.to_string(),
                        detail.date.format("%Y-%m-%d").to_string(),
                        format!("{:.2}", detail.close),
                        format!("{:.2}", detail.j),
                        format!("{:.2}", detail.volume_ratio),
                        format!("{:.2}", detail.market_cap),
                        reasons.join(";"),
                        detail
                            .key_candle_date
                            .map(|d| d.format("%Y-%m-%d").to_string())
                            .unwrap_or_default(),
                    ];
                    writer.write_record(&record).map_err(report_error)?;
                }
            }
        }

        writer.flush()?;
        log::info!(
            "wrote {} signals to {}",
            report.total_signals(),
            output_path.display()
        );
        Ok(())
    }
}

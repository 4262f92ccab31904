//! Report output port trait.

use crate::domain::error::ScreenerError;
use crate::domain::signal::BatchReport;
use std::path::Path;

/// Port for publishing screening results.
pub trait ReportPort {
    fn write(&self, report: &BatchReport, output_path: &Path) -> Result<(), ScreenerError>;
}

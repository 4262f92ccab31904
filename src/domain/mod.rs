//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod frame;
pub mod params;
pub mod signal;
pub mod strategy;
pub mod registry;
pub mod runner;
pub mod universe;
pub mod config_validation;
pub mod error;

//! IndicatorFrame: a time series plus derived, row-aligned columns.

use crate::domain::ohlcv::{Bar, TimeSeries};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Float(Vec<f64>),
    /// Values that may be undefined at the head (e.g. REF).
    Optional(Vec<Option<f64>>),
    Flag(Vec<bool>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Float(v) => v.len(),
            Column::Optional(v) => v.len(),
            Column::Flag(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Derived columns share the source series' storage order and row count.
#[derive(Debug, Clone)]
pub struct IndicatorFrame<'a> {
    series: &'a TimeSeries,
    columns: HashMap<String, Column>,
}

impl<'a> IndicatorFrame<'a> {
    pub fn new(series: &'a TimeSeries) -> Self {
        Self {
            series,
            columns: HashMap::new(),
        }
    }

    pub fn series(&self) -> &'a TimeSeries {
        self.series
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn bar(&self, row: usize) -> Option<&'a Bar> {
        self.series.bars().get(row)
    }

    pub fn latest_index(&self) -> Option<usize> {
        self.series.latest_index()
    }

    pub fn insert(&mut self, name: &str, column: Column) {
        debug_assert_eq!(
            column.len(),
            self.len(),
            "column {name} must have one value per row"
        );
        self.columns.insert(name.to_string(), column);
    }

    pub fn insert_float(&mut self, name: &str, values: Vec<f64>) {
        self.insert(name, Column::Float(values));
    }

    pub fn insert_flag(&mut self, name: &str, values: Vec<bool>) {
        self.insert(name, Column::Flag(values));
    }

    pub fn insert_optional(&mut self, name: &str, values: Vec<Option<f64>>) {
        self.insert(name, Column::Optional(values));
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.columns.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn float(&self, name: &str) -> Option<&[f64]> {
        match self.columns.get(name) {
            Some(Column::Float(v)) => Some(v),
            _ => None,
        }
    }

    pub fn optional(&self, name: &str) -> Option<&[Option<f64>]> {
        match self.columns.get(name) {
            Some(Column::Optional(v)) => Some(v),
            _ => None,
        }
    }

    pub fn flag(&self, name: &str) -> Option<&[bool]> {
        match self.columns.get(name) {
            Some(Column::Flag(v)) => Some(v),
            _ => None,
        }
    }

    pub fn float_at(&self, name: &str, row: usize) -> Option<f64> {
        self.float(name).and_then(|v| v.get(row).copied())
    }

    pub fn optional_at(&self, name: &str, row: usize) -> Option<f64> {
        self.optional(name).and_then(|v| v.get(row).copied().flatten())
    }

    /// Missing columns and rows read as false.
    pub fn flag_at(&self, name: &str, row: usize) -> bool {
        self.flag(name)
            .and_then(|v| v.get(row).copied())
            .unwrap_or(false)
    }
}

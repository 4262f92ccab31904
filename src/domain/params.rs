//! Strategy parameters and per-strategy overrides from configuration.

use crate::domain::error::{ScreenerError, StrategyError};
use crate::ports::config_port::ConfigPort;
use std::collections::HashMap;
use std::fmt;

/// Flat `name -> value` overrides for one strategy.
pub type ParamMap = HashMap<String, f64>;

/// Overrides keyed by registered strategy name.
pub type ParamOverrides = HashMap<String, ParamMap>;

/// Effective parameter set, kept in declaration order. Lookups ignore ASCII case.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyParams {
    values: Vec<(String, f64)>,
}

impl StrategyParams {
    pub fn from_defaults(defaults: &[(&str, f64)]) -> Self {
        Self {
            values: defaults
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
        }
    }

    /// Replaces known keys; unknown keys are ignored.
    ///
    /// Keys differing only in case (`n`, `N`) name the same parameter. The
    /// declared spelling wins, otherwise the first key in byte order; the
    /// others are logged and dropped.
    pub fn with_overrides(mut self, overrides: &ParamMap) -> Self {
        let mut keys: Vec<&str> = overrides.keys().map(String::as_str).collect();
        keys.sort_unstable();

        let mut chosen: Vec<Option<&str>> = vec![None; self.values.len()];
        for key in keys {
            let Some(i) = self.position(key) else {
                log::debug!("ignoring unknown parameter {key}");
                continue;
            };
            chosen[i] = match chosen[i] {
                None => Some(key),
                Some(prev) => {
                    let name = self.values[i].0.as_str();
                    let keep = if key == name { key } else { prev };
                    log::warn!("parameter {name} given as both {prev} and {key}; using {keep}");
                    Some(keep)
                }
            };
        }

        for (i, key) in chosen.into_iter().enumerate() {
            if let Some(value) = key.and_then(|k| overrides.get(k)) {
                self.values[i].1 = *value;
            }
        }
        self
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.values
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(key))
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.position(key).map(|i| self.values[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn require(&self, key: &str) -> Result<f64, StrategyError> {
        let value = self
            .get(key)
            .ok_or_else(|| StrategyError::invalid(key, f64::NAN, "parameter is not defined"))?;
        if !value.is_finite() {
            return Err(StrategyError::invalid(key, value, "must be finite"));
        }
        Ok(value)
    }

    /// A whole number of at least `min`.
    pub fn require_count(&self, key: &str, min: usize) -> Result<usize, StrategyError> {
        let value = self.require(key)?;
        if value.fract() != 0.0 {
            return Err(StrategyError::invalid(key, value, "must be a whole number"));
        }
        if value < min as f64 {
            return Err(StrategyError::invalid(
                key,
                value,
                &format!("must be at least {min}"),
            ));
        }
        Ok(value as usize)
    }
}

impl fmt::Display for StrategyParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{k}={v}")).collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Reads one `[<strategy name>]` section per name into a numeric override map.
///
/// Sections that are absent yield no entry. A value that is not a number is a
/// fatal configuration error.
pub fn overrides_from_config(
    config: &dyn ConfigPort,
    strategy_names: &[&str],
) -> Result<ParamOverrides, ScreenerError> {
    let mut overrides = ParamOverrides::new();
    for name in strategy_names {
        let Some(section) = config.get_section(name) else {
            continue;
        };
        let mut map = ParamMap::new();
        for (key, raw) in section {
            let value: f64 = raw
                .trim()
                .parse()
                .map_err(|_| ScreenerError::ConfigInvalid {
                    section: name.to_string(),
                    key: key.clone(),
                    reason: format!("expected a number, got {raw:?}"),
                })?;
            map.insert(key, value);
        }
        overrides.insert(name.to_string(), map);
    }
    Ok(overrides)
}

//! Strategy registry.
//!
//! Strategies are registered explicitly from a catalog of constructors. Each
//! constructor receives the overrides configured under its registered name
//! (or nothing, falling back to compiled-in defaults). A constructor that
//! fails or panics is recorded as a [`LoadFailure`] and skipped; the rest of
//! the catalog still loads.

use crate::domain::error::StrategyError;
use crate::domain::params::{ParamMap, ParamOverrides};
use crate::domain::strategy::Strategy;
use crate::domain::strategy::bowl_rebound::{self, BowlRebound};
use std::panic::{self, AssertUnwindSafe};

pub type StrategyFactory = fn(&ParamMap) -> Result<Box<dyn Strategy>, StrategyError>;

#[derive(Clone, Copy)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub factory: StrategyFactory,
}

fn build_bowl_rebound(params: &ParamMap) -> Result<Box<dyn Strategy>, StrategyError> {
    let strategy = BowlRebound::new(params)?;
    Ok(Box::new(strategy))
}

/// Every strategy shipped with the crate.
pub fn builtin_catalog() -> Vec<CatalogEntry> {
    vec![CatalogEntry {
        name: bowl_rebound::NAME,
        factory: build_bowl_rebound,
    }]
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadFailure {
    pub name: String,
    pub reason: String,
}

pub struct StrategyRegistry {
    overrides: ParamOverrides,
    strategies: Vec<(String, Box<dyn Strategy>)>,
    failures: Vec<LoadFailure>,
}

impl StrategyRegistry {
    pub fn new(overrides: ParamOverrides) -> Self {
        Self {
            overrides,
            strategies: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Registry populated from [`builtin_catalog`].
    pub fn with_builtin(overrides: ParamOverrides) -> Self {
        let mut registry = Self::new(overrides);
        registry.discover(&builtin_catalog());
        registry
    }

    /// Registers every entry, isolating failures. Returns the number loaded.
    pub fn discover(&mut self, catalog: &[CatalogEntry]) -> usize {
        let mut loaded = 0;
        for entry in catalog {
            match self.register(entry.name, entry.factory) {
                Ok(()) => {
                    log::info!("registered strategy {}", entry.name);
                    loaded += 1;
                }
                Err(failure) => {
                    log::warn!("failed to load strategy {}: {}", failure.name, failure.reason);
                    self.failures.push(failure);
                }
            }
        }
        loaded
    }

    /// Instantiates one strategy under `name`, replacing any earlier registration.
    pub fn register(&mut self, name: &str, factory: StrategyFactory) -> Result<(), LoadFailure> {
        let empty = ParamMap::new();
        let params = self.overrides.get(name).unwrap_or(&empty);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| factory(params)));
        let strategy = match outcome {
            Ok(Ok(strategy)) => strategy,
            Ok(Err(e)) => {
                return Err(LoadFailure {
                    name: name.to_string(),
                    reason: e.to_string(),
                });
            }
            Err(payload) => {
                return Err(LoadFailure {
                    name: name.to_string(),
                    reason: panic_message(payload.as_ref()),
                });
            }
        };

        match self.strategies.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = strategy,
            None => self.strategies.push((name.to_string(), strategy)),
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Strategy> {
        self.strategies
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s.as_ref())
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.strategies.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn Strategy)> {
        self.strategies.iter().map(|(n, s)| (n.as_str(), s.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn failures(&self) -> &[LoadFailure] {
        &self.failures
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

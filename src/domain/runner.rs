//! Batch runner: every registered strategy over every instrument.
//!
//! Each instrument is an independent unit of work ([`evaluate_instrument`]).
//! Work runs on a private rayon pool when one is configured; per-strategy
//! lists are assembled afterwards on the calling thread.

use crate::domain::error::ScreenerError;
use crate::domain::registry::StrategyRegistry;
use crate::domain::signal::{BatchReport, Signal};
use crate::domain::universe::{Instrument, Universe};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Instruments between progress log lines.
pub const PROGRESS_EVERY: usize = 100;

/// True every [`PROGRESS_EVERY`] items and on the last one.
pub fn progress_due(done: usize, total: usize) -> bool {
    done % PROGRESS_EVERY == 0 || done == total
}

/// Finished-instrument counter shared by the pool workers.
struct Progress {
    done: AtomicUsize,
    total: usize,
}

impl Progress {
    fn new(total: usize) -> Self {
        Self {
            done: AtomicUsize::new(0),
            total,
        }
    }

    fn tick(&self) -> usize {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        if progress_due(done, self.total) {
            log::info!("screening: [{done}/{}]", self.total);
        }
        done
    }
}

/// (strategy name, signal) pairs produced for one instrument.
pub type InstrumentHits = Vec<(String, Signal)>;

pub struct BatchRunner {
    pool: Option<rayon::ThreadPool>,
}

impl BatchRunner {
    /// `threads == 0` sizes the pool to the machine; `1` runs inline.
    pub fn new(threads: usize) -> Result<Self, ScreenerError> {
        if threads == 1 {
            return Ok(Self::sequential());
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("screen-worker-{i}"))
            .build()
            .map_err(|e| ScreenerError::ConfigInvalid {
                section: "screen".into(),
                key: "threads".into(),
                reason: e.to_string(),
            })?;
        Ok(Self { pool: Some(pool) })
    }

    pub fn sequential() -> Self {
        Self { pool: None }
    }

    pub fn threads(&self) -> usize {
        self.pool.as_ref().map_or(1, |p| p.current_num_threads())
    }

    pub fn run(&self, registry: &StrategyRegistry, universe: &Universe) -> BatchReport {
        let Some(pool) = &self.pool else {
            return self.run_sequential(registry, universe);
        };

        log::info!(
            "screening {} instruments with {} strategies on {} threads",
            universe.len(),
            registry.len(),
            pool.current_num_threads()
        );

        let instruments: Vec<(&str, &Instrument)> = universe.iter().collect();
        let progress = Progress::new(instruments.len());
        let hits: Vec<InstrumentHits> = pool.install(|| {
            instruments
                .par_iter()
                .map(|(code, instrument)| {
                    let hits = evaluate_instrument(registry, code, instrument);
                    progress.tick();
                    hits
                })
                .collect()
        });

        collect(registry, universe, hits)
    }

    pub fn run_sequential(&self, registry: &StrategyRegistry, universe: &Universe) -> BatchReport {
        log::info!(
            "screening {} instruments with {} strategies sequentially",
            universe.len(),
            registry.len()
        );

        let progress = Progress::new(universe.len());
        let hits: Vec<InstrumentHits> = universe
            .iter()
            .map(|(code, instrument)| {
                let hits = evaluate_instrument(registry, code, instrument);
                progress.tick();
                hits
            })
            .collect();

        collect(registry, universe, hits)
    }
}

/// Runs every strategy against one instrument.
///
/// A strategy that panics on this instrument is logged and contributes
/// nothing; the other strategies still run.
pub fn evaluate_instrument(
    registry: &StrategyRegistry,
    code: &str,
    instrument: &Instrument,
) -> InstrumentHits {
    let mut hits = Vec::new();
    for (name, strategy) in registry.iter() {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            strategy.evaluate(code, &instrument.name, &instrument.series)
        }));
        match outcome {
            Ok(Some(signal)) => hits.push((name.to_string(), signal)),
            Ok(None) => {}
            Err(_) => log::warn!("strategy {name} panicked on {code}; skipped"),
        }
    }
    hits
}

fn collect(
    registry: &StrategyRegistry,
    universe: &Universe,
    hits: Vec<InstrumentHits>,
) -> BatchReport {
    let mut results: BTreeMap<String, Vec<Signal>> = registry
        .names()
        .into_iter()
        .map(|n| (n.to_string(), Vec::new()))
        .collect();

    for (name, signal) in hits.into_iter().flatten() {
        results.entry(name).or_default().push(signal);
    }

    for (name, signals) in results.iter_mut() {
        sort_signals(signals);
        log::info!("{name}: {} signals", signals.len());
    }

    BatchReport {
        results,
        names: universe.names(),
    }
}

/// Latest signal date descending, then code ascending.
pub fn sort_signals(signals: &mut [Signal]) {
    signals.sort_by(|a, b| {
        b.latest_date()
            .cmp(&a.latest_date())
            .then_with(|| a.code.cmp(&b.code))
    });
}

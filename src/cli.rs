//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{validate_screen_config, ScreenSettings};
use crate::domain::error::ScreenerError;
use crate::domain::params::{overrides_from_config, ParamOverrides};
use crate::domain::registry::{builtin_catalog, StrategyRegistry};
use crate::domain::runner::BatchRunner;
use crate::domain::signal::BatchReport;
use crate::domain::universe::build_universe;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "stockscreen", about = "Technical-indicator stock screener")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Screen every instrument with every registered strategy
    Select {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Worker threads (0 = one per CPU)
        #[arg(long)]
        threads: Option<usize>,
    },
    /// List registered strategies and their effective parameters
    Strategies {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Select {
            config,
            output,
            threads,
        } => run_select(&config, output.as_deref(), threads),
        Command::Strategies { config } => run_strategies(config.as_deref()),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = ScreenerError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn catalog_names() -> Vec<&'static str> {
    builtin_catalog().iter().map(|e| e.name).collect()
}

/// Registry built from the catalog with overrides read from `config`.
pub fn build_registry(config: &dyn ConfigPort) -> Result<StrategyRegistry, ScreenerError> {
    let overrides = overrides_from_config(config, &catalog_names())?;
    let registry = StrategyRegistry::with_builtin(overrides);
    for failure in registry.failures() {
        eprintln!("warning: strategy {} failed to load: {}", failure.name, failure.reason);
    }
    if registry.is_empty() {
        return Err(ScreenerError::NoStrategies);
    }
    Ok(registry)
}

/// Load, screen and aggregate; everything `select` does short of writing files.
pub fn run_screen(
    registry: &StrategyRegistry,
    data_port: &dyn DataPort,
    min_bars: usize,
    threads: usize,
) -> Result<BatchReport, ScreenerError> {
    let build = build_universe(data_port, min_bars)?;
    if !build.skipped.is_empty() {
        eprintln!("Skipped {} instruments (unreadable, empty or too short)", build.skipped.len());
    }
    let runner = BatchRunner::new(threads)?;
    Ok(runner.run(registry, &build.universe))
}

fn run_select(config_path: &Path, output: Option<&Path>, threads: Option<usize>) -> ExitCode {
    // Stage 1: Load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let settings = match ScreenSettings::from_config(&adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 2: Discover strategies
    let registry = match build_registry(&adapter) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("Loaded {} strategies: {}", registry.len(), registry.names().join(", "));

    // Stage 3: Load universe and screen
    let data_port = CsvAdapter::new(settings.data_dir.clone(), settings.names_file.clone());
    let threads = threads.unwrap_or(settings.threads);
    let report = match run_screen(&registry, &data_port, settings.min_bars, threads) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 4: Summary and report
    print_summary(&registry, &report);

    let output = output.map(Path::to_path_buf).unwrap_or(settings.output);
    match CsvReportAdapter::new().write(&report, &output) {
        Ok(()) => {
            eprintln!("\nReport written to: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to write report: {e}");
            (&e).into()
        }
    }
}

pub fn print_summary(registry: &StrategyRegistry, report: &BatchReport) {
    eprintln!("\n=== Screening Results ===");
    for (name, signals) in &report.results {
        let label = registry.get(name).map_or(name.as_str(), |s| s.display_name());
        eprintln!("{label} ({name}): {} matches", signals.len());
        for signal in signals {
            for detail in &signal.signals {
                let reasons: Vec<&str> = detail.reasons.iter().map(|r| r.as_str()).collect();
                eprintln!(
                    "  {} {}  {}  close {:.2}  J {:.2}  vol x{:.2}  cap {:.2}e8  [{}]",
                    signal.code,
                    signal.name,
                    detail.date,
                    detail.close,
                    detail.j,
                    detail.volume_ratio,
                    detail.market_cap,
                    reasons.join(", "),
                );
            }
        }
    }
    eprintln!("Total: {} matches", report.total_signals());
}

fn run_strategies(config_path: Option<&Path>) -> ExitCode {
    let registry = match config_path {
        Some(path) => {
            let adapter = match load_config(path) {
                Ok(a) => a,
                Err(code) => return code,
            };
            match overrides_from_config(&adapter, &catalog_names()) {
                Ok(overrides) => StrategyRegistry::with_builtin(overrides),
                Err(e) => {
                    eprintln!("error: {e}");
                    return (&e).into();
                }
            }
        }
        None => StrategyRegistry::with_builtin(ParamOverrides::new()),
    };

    for (name, strategy) in registry.iter() {
        println!("{name}  \"{}\"", strategy.display_name());
        println!("  {}", strategy.params());
    }
    for failure in registry.failures() {
        println!("{}  FAILED: {}", failure.name, failure.reason);
    }

    if registry.is_empty() {
        (&ScreenerError::NoStrategies).into()
    } else {
        ExitCode::SUCCESS
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_screen_config(&adapter, &catalog_names()) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    match adapter.get_string("screen", "data_dir") {
        Some(dir) => eprintln!("  data_dir: {dir}"),
        None => eprintln!("  data_dir: (not set, required for select)"),
    }

    if let Err(e) = build_registry(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

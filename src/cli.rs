//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::cached_price_store::CachedPriceStore;
use crate::adapters::csv_input_adapter::{CsvReferenceTable, load_exclusion_rules, load_weight_table};
use crate::adapters::csv_price_adapter::{CsvPriceStore, parse_date};
use crate::adapters::csv_report_adapter::{CsvReportAdapter, format_comparison};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{initial_value, validate_run_config, validate_universe_config};
use crate::domain::constituents::{
    DEFAULT_LOOKBACK_DAYS, DEFAULT_LOOKFORWARD_DAYS, SelectorOptions, select_constituents,
};
use crate::domain::error::PortvalError;
use crate::domain::exclusion::ExclusionRules;
use crate::domain::interval::WeightMode;
use crate::domain::run::{RunConfig, RunResult, run_valuation};
use crate::domain::snapshot::WeightRecord;
use crate::domain::stitcher::{BoundaryPolicy, StitchConfig};
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PriceStore;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_BENCHMARK: &str = "^NDX";
pub const DEFAULT_PORTFOLIO_LABEL: &str = "Optimized Portfolio";

#[derive(Parser, Debug)]
#[command(name = "portval", about = "Rebalancing portfolio valuation")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Value the portfolio over its rebalancing schedule and compare it to the benchmark
    Value {
        #[arg(short, long)]
        config: PathBuf,
        /// Write the stitched series to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write the comparison table to this CSV file
        #[arg(long)]
        stats: Option<PathBuf>,
        /// Override the configured weight mode with equal weights
        #[arg(long)]
        equal: bool,
    },
    /// List the eligible constituents on a date
    Constituents {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        date: String,
    },
    /// List symbols available in the price archive
    Symbols {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Value {
            config,
            output,
            stats,
            equal,
        } => run_value(&config, output.as_deref(), stats.as_deref(), equal),
        Command::Constituents { config, date } => run_constituents(&config, &date),
        Command::Symbols { config } => run_symbols(&config),
        Command::Validate { config } => run_validate(&config),
    }
}

fn fail(err: PortvalError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        fail(PortvalError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        })
    })
}

fn required(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, PortvalError> {
    config
        .get_string(section, key)
        .ok_or_else(|| PortvalError::ConfigMissing {
            section: section.into(),
            key: key.into(),
        })
}

pub fn build_run_config(config: &dyn ConfigPort) -> Result<RunConfig, PortvalError> {
    let out_of_sample_days = config.get_int("portfolio", "out_of_sample_days", 30);
    let weight_mode = config
        .get_string("portfolio", "weight_mode")
        .map(|s| s.parse::<WeightMode>().unwrap_or_default())
        .unwrap_or_default();
    let boundary = match config.get_string("portfolio", "boundary") {
        Some(s) => s
            .parse::<BoundaryPolicy>()
            .map_err(|reason| PortvalError::ConfigInvalid {
                section: "portfolio".into(),
                key: "boundary".into(),
                reason,
            })?,
        None => BoundaryPolicy::default(),
    };
    let benchmark = config
        .get_string("data", "benchmark")
        .unwrap_or_else(|| DEFAULT_BENCHMARK.to_string());

    Ok(RunConfig {
        stitch: StitchConfig {
            initial_value: initial_value(config)?,
            out_of_sample_days,
            weight_mode,
            boundary,
        },
        portfolio_label: config
            .get_string("portfolio", "label")
            .unwrap_or_else(|| DEFAULT_PORTFOLIO_LABEL.to_string()),
        benchmark_label: config
            .get_string("data", "benchmark_label")
            .unwrap_or_else(|| benchmark.clone()),
        benchmark,
        benchmark_days: config.get_int("portfolio", "benchmark_days", out_of_sample_days),
    })
}

pub fn build_selector_options(config: &dyn ConfigPort) -> SelectorOptions {
    SelectorOptions {
        lookback_days: config.get_int("universe", "lookback_days", DEFAULT_LOOKBACK_DAYS),
        lookforward_days: config.get_int("universe", "lookforward_days", DEFAULT_LOOKFORWARD_DAYS),
        drop_symbols: config.get_list("universe", "drop"),
    }
}

pub fn load_rules(config: &dyn ConfigPort) -> Result<ExclusionRules, PortvalError> {
    match config.get_string("portfolio", "exclusions") {
        Some(path) => load_exclusion_rules(Path::new(&path)),
        None => Ok(ExclusionRules::none()),
    }
}

fn run_value(config_path: &Path, output: Option<&Path>, stats: Option<&Path>, equal: bool) -> ExitCode {
    tracing::info!(config = %config_path.display(), "loading config");
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_run_config(&adapter) {
        return fail(e);
    }

    let mut run_config = match build_run_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    if equal {
        run_config.stitch.weight_mode = WeightMode::Equal;
    }

    let inputs = required(&adapter, "data", "price_dir").and_then(|price_dir| {
        let weights = required(&adapter, "portfolio", "weights")?;
        let records = load_weight_table(Path::new(&weights))?;
        let rules = load_rules(&adapter)?;
        Ok((PathBuf::from(price_dir), records, rules))
    });
    let (price_dir, records, rules) = match inputs {
        Ok(i) => i,
        Err(e) => return fail(e),
    };

    let store = CachedPriceStore::new(CsvPriceStore::new(price_dir));
    run_value_pipeline(&store, &records, &rules, &run_config, output, stats)
}

pub fn run_value_pipeline(
    store: &dyn PriceStore,
    records: &[WeightRecord],
    rules: &ExclusionRules,
    run_config: &RunConfig,
    output: Option<&Path>,
    stats: Option<&Path>,
) -> ExitCode {
    let RunResult {
        valuation,
        comparison,
    } = match run_valuation(store, records, rules, run_config) {
        Ok(r) => r,
        Err(e) => return fail(e),
    };

    if let (Some(first), Some(last)) = (valuation.points.first(), valuation.points.last()) {
        println!(
            "{} intervals, {} to {}: {:.6} -> {:.6}",
            valuation.intervals.len(),
            first.date,
            last.date,
            run_config.stitch.initial_value,
            last.value
        );
    }
    print!("{}", format_comparison(&comparison));

    let report = CsvReportAdapter;
    if let Some(path) = output {
        if let Err(e) = report.write_series(&valuation.points, path) {
            return fail(e);
        }
        tracing::info!(path = %path.display(), points = valuation.points.len(), "series written");
    }
    if let Some(path) = stats {
        if let Err(e) = report.write_comparison(&comparison, path) {
            return fail(e);
        }
        tracing::info!(path = %path.display(), "comparison written");
    }

    ExitCode::SUCCESS
}

fn run_constituents(config_path: &Path, date: &str) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_universe_config(&adapter) {
        return fail(e);
    }

    let as_of: NaiveDate = match parse_date(date) {
        Ok(d) => d,
        Err(_) => {
            eprintln!("error: invalid date '{}' (expected YYYY-MM-DD)", date);
            return ExitCode::from(2);
        }
    };

    let paths = required(&adapter, "data", "price_dir")
        .and_then(|p| Ok((p, required(&adapter, "data", "reference_table")?)));
    let (price_dir, table_path) = match paths {
        Ok(p) => p,
        Err(e) => return fail(e),
    };

    let store = CsvPriceStore::new(PathBuf::from(price_dir));
    let table = CsvReferenceTable::new(PathBuf::from(table_path));
    let options = build_selector_options(&adapter);

    match select_constituents(&table, &store, as_of, &options) {
        Ok(selection) => {
            for symbol in &selection.symbols {
                println!("{}", symbol);
            }
            eprintln!(
                "Chose {} of {} stocks",
                selection.symbols.len(),
                selection.symbols.len() + selection.skipped.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn run_symbols(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let price_dir = match required(&adapter, "data", "price_dir") {
        Ok(p) => p,
        Err(e) => return fail(e),
    };

    match CsvPriceStore::new(PathBuf::from(price_dir)).list_symbols() {
        Ok(symbols) if symbols.is_empty() => {
            eprintln!("No symbols found");
            ExitCode::SUCCESS
        }
        Ok(symbols) => {
            for symbol in &symbols {
                println!("{}", symbol);
            }
            eprintln!("{} symbols found", symbols.len());
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_run_config(&adapter) {
        return fail(e);
    }
    let run_config = match build_run_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    let rules = match load_rules(&adapter) {
        Ok(r) => r,
        Err(e) => return fail(e),
    };

    eprintln!("  initial value:      {}", run_config.stitch.initial_value);
    eprintln!("  out-of-sample days: {}", run_config.stitch.out_of_sample_days);
    eprintln!("  weight mode:        {}", run_config.stitch.weight_mode);
    eprintln!("  boundary:           {}", run_config.stitch.boundary);
    eprintln!(
        "  benchmark:          {} ({} days)",
        run_config.benchmark, run_config.benchmark_days
    );
    eprintln!("  exclusion rules:    {}", rules.len());
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

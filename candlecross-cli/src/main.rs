//! candlecross CLI — replay bar files through the crossover signal engine.
//!
//! Commands:
//! - `replay` — load bars from CSV, run the strategy bar by bar, print signals
//! - `config` — print the default (or a loaded and validated) strategy config

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{BufWriter, Read};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use candlecross_core::replay::{Replay, ReplayReport, StepOutcome};
use candlecross_core::{Bar, CrossoverSignalEngine, StrategyConfig};

#[derive(Parser)]
#[command(
    name = "candlecross",
    about = "candlecross — SMA crossover signals with candle confirmation"
)]
struct Cli {
    /// Log level when RUST_LOG is unset (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a CSV bar file (symbol,timestamp,open,high,low,close) through the engine.
    Replay {
        /// Path to the bar CSV. Rows must be in time order per symbol.
        #[arg(long)]
        bars: PathBuf,

        /// Strategy TOML. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Only replay this symbol.
        #[arg(long)]
        symbol: Option<String>,

        /// Write every recorded metric to this CSV file.
        #[arg(long)]
        metrics_out: Option<PathBuf>,

        /// Write the full replay report as JSON.
        #[arg(long)]
        report_out: Option<PathBuf>,
    },
    /// Print the strategy configuration as TOML.
    Config {
        /// Strategy TOML to load and validate instead of the defaults.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Commands::Replay {
            bars,
            config,
            symbol,
            metrics_out,
            report_out,
        } => run_replay(&bars, config.as_deref(), symbol.as_deref(), metrics_out, report_out),
        Commands::Config { config } => run_config(config.as_deref()),
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .ok();
}

fn load_config(path: Option<&Path>) -> Result<StrategyConfig> {
    match path {
        Some(p) => StrategyConfig::load(p)
            .with_context(|| format!("loading strategy config {}", p.display())),
        None => Ok(StrategyConfig::default()),
    }
}

/// Parse bars from CSV, rejecting non-finite prices and keeping only `symbol` if given.
fn read_bars<R: Read>(reader: R, symbol: Option<&str>) -> Result<Vec<Bar>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut bars = Vec::new();
    for (line, row) in rdr.deserialize::<Bar>().enumerate() {
        // +2: header line and 1-based numbering
        let bar = row.with_context(|| format!("parsing bar on line {}", line + 2))?;
        bar.check_finite()?;
        if symbol.map_or(true, |s| s == bar.symbol) {
            bars.push(bar);
        }
    }
    Ok(bars)
}

fn run_replay(
    bars_path: &Path,
    config_path: Option<&Path>,
    symbol: Option<&str>,
    metrics_out: Option<PathBuf>,
    report_out: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let file = File::open(bars_path)
        .with_context(|| format!("opening bar file {}", bars_path.display()))?;
    let bars = read_bars(file, symbol)?;
    if bars.is_empty() {
        bail!("no bars to replay in {}", bars_path.display());
    }
    info!(bars = bars.len(), short = config.short_window, long = config.long_window, "starting replay");

    let engine = CrossoverSignalEngine::new(config)?;
    let mut replay = Replay::new(engine);
    let report = replay.run(bars)?;

    print_report(&report);

    if let Some(path) = metrics_out {
        let file = File::create(&path)
            .with_context(|| format!("creating metrics file {}", path.display()))?;
        replay.journal().write_csv(BufWriter::new(file))?;
        println!("Metrics written to {}", path.display());
    }

    if let Some(path) = report_out {
        std::fs::write(&path, report.to_json_pretty()?)
            .with_context(|| format!("writing report {}", path.display()))?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}

fn print_report(report: &ReplayReport) {
    for step in report.actionable() {
        if let StepOutcome::Signal { direction } = step.outcome {
            let metrics = step
                .metrics
                .iter()
                .map(|(k, v)| format!("{k}={v:.4}"))
                .collect::<Vec<_>>()
                .join(" ");
            println!(
                "{}  {:<8} {:<10} close={:.4} {}",
                step.timestamp.to_rfc3339(),
                step.symbol,
                direction.as_str(),
                step.close,
                metrics
            );
        }
    }

    let s = &report.summary;
    println!();
    println!("=== Replay Summary ===");
    println!("Bars:            {}", s.bars);
    println!("Warm-up:         {}", s.warmup);
    println!("Entries:         {}", s.entries);
    println!("Exits:           {}", s.exits);
    println!("Holds:           {}", s.holds);
    println!("Inconsistencies: {}", s.inconsistencies);
}

fn run_config(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}

//! KernLab CLI: run, optimize, and batch commands.
//!
//! Commands:
//! - `run`: evaluate one parameter set on a price CSV, optionally saving artifacts
//! - `optimize`: random search for the most profitable parameter set
//! - `batch`: evaluate one parameter set across many price CSVs and average
//!
//! Logging goes through `tracing`; set `RUST_LOG` to adjust (default `info`).

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use kernlab_core::ParameterSet;
use kernlab_runner::{
    load_price_csv, run_batch, run_search, run_single, run_with_params, save_artifacts,
    BatchOutcome, BatchReport, LoadedSeries, RunConfig, RunSummary, SearchProgress, SearchReport,
    TrialRecord,
};

#[derive(Parser)]
#[command(
    name = "kernlab",
    about = "KernLab CLI: kernel regression and RSI divergence backtester"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the configured parameters on one price series.
    Run {
        /// CSV with Date and Close columns.
        #[arg(long)]
        prices: PathBuf,

        /// Path to a TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Save trades, bars, divergences, and a JSON summary here.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Random search over the parameter space, then replay the best trial.
    Optimize {
        /// CSV with Date and Close columns.
        #[arg(long)]
        prices: PathBuf,

        /// Path to a TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of trials (overrides the config).
        #[arg(long)]
        trials: Option<usize>,

        /// Search seed (overrides the config).
        #[arg(long)]
        seed: Option<u64>,

        /// Save artifacts for the best trial here.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Evaluate the configured parameters on several price series.
    Batch {
        /// CSV files, one per instrument. The file stem is the symbol.
        #[arg(long, required = true, num_args = 1..)]
        prices: Vec<PathBuf>,

        /// Path to a TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            prices,
            config,
            output_dir,
        } => run_cmd(&prices, config.as_deref(), output_dir.as_deref()),
        Commands::Optimize {
            prices,
            config,
            trials,
            seed,
            output_dir,
        } => optimize_cmd(
            &prices,
            config.as_deref(),
            trials,
            seed,
            output_dir.as_deref(),
        ),
        Commands::Batch { prices, config } => batch_cmd(&prices, config.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> Result<RunConfig> {
    match path {
        Some(p) => RunConfig::from_file(p)
            .with_context(|| format!("failed to load config {}", p.display())),
        None => Ok(RunConfig::default()),
    }
}

fn load_series(path: &Path) -> Result<LoadedSeries> {
    let series = load_price_csv(path)?;
    if series.is_empty() {
        bail!("{} contains no price rows", path.display());
    }
    Ok(series)
}

fn run_cmd(prices: &Path, config: Option<&Path>, output_dir: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let series = load_series(prices)?;

    let summary = run_single(&config, &series)?;
    print_summary(&summary);

    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&summary, dir)?;
        println!();
        println!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn optimize_cmd(
    prices: &Path,
    config: Option<&Path>,
    trials: Option<usize>,
    seed: Option<u64>,
    output_dir: Option<&Path>,
) -> Result<()> {
    let mut config = load_config(config)?;
    let mut search = config.search_or_default();
    if let Some(t) = trials {
        if t == 0 {
            bail!("--trials must be >= 1");
        }
        search.trials = t;
    }
    if let Some(s) = seed {
        search.seed = s;
    }
    config.search = Some(search);

    let series = load_series(prices)?;
    let progress = StdoutProgress::default();
    let report = run_search(&config, &series, Some(&progress))?;
    print_search(&report);

    let Some(best) = &report.best else {
        bail!("search produced no trials");
    };
    let summary = run_with_params(&config, &best.params, &series)?;
    print_summary(&summary);

    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&summary, dir)?;
        println!();
        println!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn batch_cmd(prices: &[PathBuf], config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;

    let mut series = Vec::with_capacity(prices.len());
    for path in prices {
        match load_price_csv(path) {
            Ok(s) => series.push(s),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to load, skipping");
                println!("SKIP {}: {e}", path.display());
            }
        }
    }
    if series.is_empty() {
        bail!("no price file could be loaded");
    }

    let report = run_batch(
        &series,
        &config.params,
        config.backtest.initial_balance,
        config.backtest.fee,
    );
    print_batch(&report);
    Ok(())
}

/// Prints search progress roughly every tenth of the trials.
#[derive(Default)]
struct StdoutProgress {
    best: Mutex<Option<f64>>,
}

impl SearchProgress for StdoutProgress {
    fn on_trial(&self, completed: usize, total: usize, record: &TrialRecord) {
        let best = {
            let Ok(mut guard) = self.best.lock() else {
                return;
            };
            let best = guard.map_or(record.profit_pct, |b: f64| b.max(record.profit_pct));
            *guard = Some(best);
            best
        };
        let step = (total / 10).max(1);
        if completed % step == 0 || completed == total {
            println!("[{completed}/{total}] best so far: {best:.2}%");
        }
    }
}

fn print_params(params: &ParameterSet) {
    println!("[params]");
    println!("rsi_period = {}", params.rsi_period);
    println!("kr_window = {}", params.kr_window);
    println!("kr_bandwidth = {:?}", params.kr_bandwidth);
    println!("bb_k = {:?}", params.bb_k);
    println!("extrema_order = {}", params.extrema_order);
    println!("rsi_oversold = {}", params.rsi_oversold);
    println!("rsi_overbought = {}", params.rsi_overbought);
}

fn print_summary(summary: &RunSummary) {
    let result = &summary.result;
    println!();
    println!("=== Backtest Result ===");
    println!("Symbol:         {}", summary.symbol);
    if let (Some(first), Some(last)) = (result.bars.first(), result.bars.last()) {
        println!("Period:         {} to {}", first.timestamp, last.timestamp);
    }
    println!("Bars:           {}", result.bars.len());
    println!("Params:         {}", summary.fingerprint.short());
    println!("Divergences:    {}", result.divergences.len());
    println!("Trades:         {}", result.trades.len());
    println!();
    println!("--- Performance ---");
    println!("Initial:        {:.2}", summary.initial_balance);
    println!("Final Value:    {:.2}", result.final_value);
    println!("Profit:         {:.2}%", result.profit_pct);
    println!("Round Trips:    {}", result.round_trips());
    match result.win_rate() {
        Some(w) => println!("Win Rate:       {:.1}%", w * 100.0),
        None => println!("Win Rate:       n/a"),
    }
    if result.is_degenerate() {
        println!();
        println!("WARNING: history shorter than kr_window; result is degenerate");
    }
}

fn print_search(report: &SearchReport) {
    println!();
    println!("=== Search Result ===");
    println!("Trials:         {}", report.trials.len());
    println!("Seed:           {}", report.seed);
    if let Some(best) = &report.best {
        println!("Best Trial:     #{}", best.index);
        println!("Best Profit:    {:.2}%", best.profit_pct);
        println!();
        print_params(&best.params);
    }
}

fn print_batch(report: &BatchReport) {
    println!();
    println!("=== Batch Result ===");
    println!("{:<16} {:>10} {:>8}", "Symbol", "Profit %", "Trades");
    for entry in &report.entries {
        match &entry.outcome {
            BatchOutcome::Evaluated {
                profit_pct,
                trade_count,
                ..
            } => println!("{:<16} {:>10.2} {:>8}", entry.symbol, profit_pct, trade_count),
            BatchOutcome::Skipped { reason } => {
                println!("{:<16} skipped: {reason}", entry.symbol)
            }
        }
    }
    println!();
    match report.mean_profit_pct {
        Some(mean) => println!(
            "Average Profit: {mean:.2}% over {} instruments",
            report.evaluated_count()
        ),
        None => println!("No instrument could be evaluated"),
    }
}

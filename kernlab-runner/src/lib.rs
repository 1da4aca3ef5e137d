//! KernLab Runner: run orchestration around the core evaluator.
//!
//! This crate builds on `kernlab-core` to provide:
//! - TOML run configuration with defaults and validation
//! - CSV price loading with dataset hashing
//! - Single runs with provenance (symbol, dataset hash, parameter fingerprint)
//! - Deterministic parallel random search over a parameter space
//! - Batch evaluation of one parameter set across many instruments
//! - CSV/JSON artifact export

pub mod batch;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;
pub mod search;

pub use batch::{run_batch, BatchEntry, BatchOutcome, BatchReport};
pub use config::{BacktestSection, ConfigError, RunConfig, SearchSection};
pub use data_loader::{dataset_hash, load_price_csv, LoadError, LoadedSeries};
pub use export::{save_artifacts, ExportError, ResultManifest};
pub use runner::{run_search, run_single, run_with_params, RunError, RunSummary};
pub use search::{RandomSearch, SearchProgress, SearchReport, SearchSpace, TrialRecord};

//! Random parameter search.
//!
//! Samples `trials` parameter sets from a `SearchSpace`, evaluates each one
//! against a single series, and reports every trial plus the best by
//! `profit_pct`. Trial `k` draws from its own RNG seeded by BLAKE3 over
//! (seed, dataset hash, k), so a trial's parameters do not depend on thread
//! count or scheduling order.

use std::sync::atomic::{AtomicUsize, Ordering};

use kernlab_core::{evaluate, EvalError, ParameterSet, ParamsFingerprint, PriceBar};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Inclusive sampling ranges, one per parameter.
///
/// Ranges are `[low, high]` pairs. Any range omitted from a config keeps its
/// default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchSpace {
    pub kr_window: (usize, usize),
    pub kr_bandwidth: (f64, f64),
    pub bb_k: (f64, f64),
    pub rsi_period: (usize, usize),
    pub extrema_order: (usize, usize),
    pub rsi_oversold: (u32, u32),
    pub rsi_overbought: (u32, u32),
}

impl Default for SearchSpace {
    fn default() -> Self {
        Self {
            kr_window: (20, 100),
            kr_bandwidth: (0.5, 10.0),
            bb_k: (0.1, 2.0),
            rsi_period: (7, 21),
            extrema_order: (3, 10),
            rsi_oversold: (20, 40),
            rsi_overbought: (60, 80),
        }
    }
}

impl SearchSpace {
    /// Every range must be non-empty and every sample must be a valid
    /// `ParameterSet`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ranges: [(&'static str, f64, f64); 7] = [
            ("kr_window", self.kr_window.0 as f64, self.kr_window.1 as f64),
            ("kr_bandwidth", self.kr_bandwidth.0, self.kr_bandwidth.1),
            ("bb_k", self.bb_k.0, self.bb_k.1),
            ("rsi_period", self.rsi_period.0 as f64, self.rsi_period.1 as f64),
            ("extrema_order", self.extrema_order.0 as f64, self.extrema_order.1 as f64),
            ("rsi_oversold", f64::from(self.rsi_oversold.0), f64::from(self.rsi_oversold.1)),
            ("rsi_overbought", f64::from(self.rsi_overbought.0), f64::from(self.rsi_overbought.1)),
        ];
        for (name, low, high) in ranges {
            if low.is_nan() || high.is_nan() || low > high {
                return Err(ConfigError::EmptyRange { name, low, high });
            }
        }

        // Each field is checked against an interval, so both corners valid
        // means every sample is valid.
        self.corner(|(low, _)| low).validate()?;
        self.corner(|(_, high)| high).validate()?;
        Ok(())
    }

    fn corner(&self, pick: impl Fn((f64, f64)) -> f64) -> ParameterSet {
        let int = |r: (usize, usize)| pick((r.0 as f64, r.1 as f64)) as usize;
        let thr = |r: (u32, u32)| pick((f64::from(r.0), f64::from(r.1))) as u32;
        ParameterSet {
            rsi_period: int(self.rsi_period),
            kr_window: int(self.kr_window),
            kr_bandwidth: pick(self.kr_bandwidth),
            bb_k: pick(self.bb_k),
            extrema_order: int(self.extrema_order),
            rsi_oversold: thr(self.rsi_oversold),
            rsi_overbought: thr(self.rsi_overbought),
        }
    }

    /// Draw one parameter set. Fields are sampled in declaration order of
    /// `ParameterSet`.
    pub fn sample(&self, rng: &mut impl Rng) -> ParameterSet {
        ParameterSet {
            rsi_period: rng.gen_range(self.rsi_period.0..=self.rsi_period.1),
            kr_window: rng.gen_range(self.kr_window.0..=self.kr_window.1),
            kr_bandwidth: rng.gen_range(self.kr_bandwidth.0..=self.kr_bandwidth.1),
            bb_k: rng.gen_range(self.bb_k.0..=self.bb_k.1),
            extrema_order: rng.gen_range(self.extrema_order.0..=self.extrema_order.1),
            rsi_oversold: rng.gen_range(self.rsi_oversold.0..=self.rsi_oversold.1),
            rsi_overbought: rng.gen_range(self.rsi_overbought.0..=self.rsi_overbought.1),
        }
    }
}

/// One evaluated trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub index: usize,
    pub params: ParameterSet,
    pub fingerprint: ParamsFingerprint,
    pub profit_pct: f64,
    pub final_value: f64,
    pub trade_count: usize,
}

/// Outcome of a search: every trial in index order, plus the winner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchReport {
    pub seed: u64,
    pub dataset_hash: String,
    pub trials: Vec<TrialRecord>,
    /// Highest `profit_pct`; the lowest index wins ties. `None` only for zero trials.
    pub best: Option<TrialRecord>,
}

/// Receives a callback after each finished trial.
///
/// Called from worker threads; `completed` counts finished trials in
/// completion order, not index order.
pub trait SearchProgress: Sync {
    fn on_trial(&self, completed: usize, total: usize, record: &TrialRecord);
}

/// Random-search executor.
#[derive(Debug, Clone)]
pub struct RandomSearch {
    pub trials: usize,
    pub seed: u64,
    pub parallel: bool,
    pub space: SearchSpace,
}

impl RandomSearch {
    pub fn new(trials: usize, seed: u64) -> Self {
        Self {
            trials,
            seed,
            parallel: true,
            space: SearchSpace::default(),
        }
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_space(mut self, space: SearchSpace) -> Self {
        self.space = space;
        self
    }

    /// Derive the RNG seed for trial `index`.
    pub fn trial_seed(&self, dataset_hash: &str, index: usize) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.seed.to_le_bytes());
        hasher.update(dataset_hash.as_bytes());
        hasher.update(&(index as u64).to_le_bytes());
        let hash = hasher.finalize();
        let mut word = [0u8; 8];
        word.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(word)
    }

    /// Parameters for trial `index`, independent of every other trial.
    pub fn trial_params(&self, dataset_hash: &str, index: usize) -> ParameterSet {
        let mut rng = StdRng::seed_from_u64(self.trial_seed(dataset_hash, index));
        self.space.sample(&mut rng)
    }

    /// Run every trial against `bars`.
    ///
    /// Fails only on a contract violation by the series, balance, or fee,
    /// which would fail every trial alike.
    pub fn run(
        &self,
        bars: &[PriceBar],
        dataset_hash: &str,
        initial_balance: f64,
        fee: f64,
        progress: Option<&dyn SearchProgress>,
    ) -> Result<SearchReport, EvalError> {
        let completed = AtomicUsize::new(0);
        let total = self.trials;

        let run_trial = |index: usize| -> Result<TrialRecord, EvalError> {
            let params = self.trial_params(dataset_hash, index);
            let result = evaluate(bars, &params, initial_balance, fee)?;
            let record = TrialRecord {
                index,
                params,
                fingerprint: params.fingerprint(),
                profit_pct: result.profit_pct,
                final_value: result.final_value,
                trade_count: result.trades.len(),
            };
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::debug!(
                trial = index,
                profit_pct = record.profit_pct,
                fingerprint = %record.fingerprint.short(),
                "trial finished"
            );
            if let Some(p) = progress {
                p.on_trial(done, total, &record);
            }
            Ok(record)
        };

        let trials: Vec<TrialRecord> = if self.parallel {
            (0..total)
                .into_par_iter()
                .map(run_trial)
                .collect::<Result<Vec<_>, _>>()?
        } else {
            (0..total).map(run_trial).collect::<Result<Vec<_>, _>>()?
        };

        let best = best_trial(&trials).cloned();
        if let Some(b) = &best {
            tracing::info!(
                trials = total,
                best_trial = b.index,
                profit_pct = b.profit_pct,
                "search finished"
            );
        }

        Ok(SearchReport {
            seed: self.seed,
            dataset_hash: dataset_hash.to_string(),
            trials,
            best,
        })
    }
}

/// Highest profit, first index on ties. `trials` must be in index order.
fn best_trial(trials: &[TrialRecord]) -> Option<&TrialRecord> {
    trials.iter().fold(None, |best: Option<&TrialRecord>, t| match best {
        Some(b) if t.profit_pct <= b.profit_pct => Some(b),
        _ => Some(t),
    })
}

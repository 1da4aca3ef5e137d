//! Serializable run configuration, loaded from TOML.
//!
//! ```toml
//! [backtest]
//! initial_balance = 10000.0
//! fee = 0.001
//!
//! [params]
//! rsi_period = 14
//! kr_window = 50
//! kr_bandwidth = 5.0
//! bb_k = 0.7
//! extrema_order = 5
//! rsi_oversold = 30
//! rsi_overbought = 70
//!
//! [search]
//! trials = 100
//! seed = 42
//!
//! [search.space]
//! kr_window = [20, 100]
//! ```
//!
//! Every section is optional and falls back to its defaults, but a present
//! `[params]` table must be complete. Unknown keys are rejected everywhere.

use std::path::Path;

use kernlab_core::{ParamError, ParameterSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::search::SearchSpace;

/// Errors from loading or validating a `RunConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid parameters: {0}")]
    Params(#[from] ParamError),

    #[error("initial_balance must be finite and > 0, got {0}")]
    InitialBalance(f64),

    #[error("fee must be within [0, 1), got {0}")]
    Fee(f64),

    #[error("search.trials must be >= 1")]
    NoTrials,

    #[error("search.space.{name}: lower bound {low} exceeds upper bound {high}")]
    EmptyRange { name: &'static str, low: f64, high: f64 },
}

/// Complete configuration for a run, an optimization, or a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(default)]
    pub backtest: BacktestSection,

    #[serde(default)]
    pub params: ParameterSet,

    /// Only consulted by `optimize`.
    #[serde(default)]
    pub search: Option<SearchSection>,
}

/// Capital and cost settings shared by every evaluation in a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BacktestSection {
    #[serde(default = "default_initial_balance")]
    pub initial_balance: f64,
    #[serde(default = "default_fee")]
    pub fee: f64,
}

impl Default for BacktestSection {
    fn default() -> Self {
        Self {
            initial_balance: default_initial_balance(),
            fee: default_fee(),
        }
    }
}

fn default_initial_balance() -> f64 {
    10_000.0
}

fn default_fee() -> f64 {
    0.001
}

/// Random-search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchSection {
    #[serde(default = "default_trials")]
    pub trials: usize,
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    #[serde(default)]
    pub space: SearchSpace,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            trials: default_trials(),
            seed: 0,
            parallel: default_parallel(),
            space: SearchSpace::default(),
        }
    }
}

fn default_trials() -> usize {
    100
}

fn default_parallel() -> bool {
    true
}

impl RunConfig {
    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.params.validate()?;

        let balance = self.backtest.initial_balance;
        if !(balance.is_finite() && balance > 0.0) {
            return Err(ConfigError::InitialBalance(balance));
        }
        let fee = self.backtest.fee;
        if !(0.0..1.0).contains(&fee) {
            return Err(ConfigError::Fee(fee));
        }

        if let Some(search) = &self.search {
            if search.trials == 0 {
                return Err(ConfigError::NoTrials);
            }
            search.space.validate()?;
        }
        Ok(())
    }

    /// Search settings, falling back to the defaults when `[search]` is absent.
    pub fn search_or_default(&self) -> SearchSection {
        self.search.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
[backtest]
initial_balance = 5000.0
fee = 0.002

[params]
rsi_period = 10
kr_window = 40
kr_bandwidth = 3.5
bb_k = 1.2
extrema_order = 4
rsi_oversold = 25
rsi_overbought = 75

[search]
trials = 20
seed = 7
parallel = false

[search.space]
kr_window = [30, 60]
"#;

    #[test]
    fn parses_full_config() {
        let config = RunConfig::from_toml(FULL).unwrap();
        assert_eq!(config.backtest.initial_balance, 5000.0);
        assert_eq!(config.backtest.fee, 0.002);
        assert_eq!(config.params.kr_window, 40);
        assert_eq!(config.params.rsi_overbought, 75);

        let search = config.search.unwrap();
        assert_eq!(search.trials, 20);
        assert_eq!(search.seed, 7);
        assert!(!search.parallel);
        assert_eq!(search.space.kr_window, (30, 60));
        // Untouched ranges keep their defaults
        assert_eq!(search.space.rsi_period, SearchSpace::default().rsi_period);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = RunConfig::from_toml("").unwrap();
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.backtest.initial_balance, 10_000.0);
        assert_eq!(config.backtest.fee, 0.001);
        assert_eq!(config.params, ParameterSet::default());
        assert!(config.search.is_none());
        assert_eq!(config.search_or_default().trials, 100);
    }

    #[test]
    fn unknown_keys_rejected() {
        let err = RunConfig::from_toml("[params]\nrsi_period = 14\nlookahead = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(RunConfig::from_toml("[extra]\nx = 1\n").is_err());
    }

    #[test]
    fn partial_params_rejected() {
        assert!(matches!(
            RunConfig::from_toml("[params]\nkr_window = 30\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn invalid_values_rejected() {
        assert!(matches!(
            RunConfig::from_toml("[backtest]\nfee = 1.5\n"),
            Err(ConfigError::Fee(_))
        ));
        assert!(matches!(
            RunConfig::from_toml("[backtest]\ninitial_balance = 0.0\n"),
            Err(ConfigError::InitialBalance(_))
        ));
        assert!(matches!(
            RunConfig::from_toml("[search]\ntrials = 0\n"),
            Err(ConfigError::NoTrials)
        ));
        assert!(matches!(
            RunConfig::from_toml("[search.space]\nbb_k = [2.0, 1.0]\n"),
            Err(ConfigError::EmptyRange { name: "bb_k", .. })
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = RunConfig::from_file(Path::new("/nonexistent/kernlab.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/kernlab.toml"));
    }
}

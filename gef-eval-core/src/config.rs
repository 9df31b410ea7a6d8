//! Configuration for evaluation runs
//!
//! Every section is optional in the TOML file. `GEF_EVAL_STORE_ROOT` and
//! `GEF_EVAL_DATASET` override the store location after the file is read.

use crate::error::{EvalError, Result};
use crate::factuality::{EntityMatchType, EvaluationOptions};
use crate::iteration::DEFAULT_TAIL_BUCKET;
use crate::store::StoreTarget;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding `store.root`
pub const STORE_ROOT_ENV: &str = "GEF_EVAL_STORE_ROOT";
/// Environment variable overriding `store.dataset`
pub const DATASET_ENV: &str = "GEF_EVAL_DATASET";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EvalConfig {
    /// Summary and metadata store
    #[serde(default)]
    pub store: StoreConfig,

    /// Factuality evaluation defaults
    #[serde(default)]
    pub evaluation: EvaluationConfig,

    /// Iteration statistics defaults
    #[serde(default)]
    pub iterations: IterationConfig,
}

/// Store location and gold data
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Root directory of the JSON store
    pub root: PathBuf,
    /// Dataset name
    pub dataset: String,
    /// Model holding the reference summaries and our annotations
    pub gold_model: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("data/sumtool"),
            dataset: "xsum".to_string(),
            gold_model: "gold".to_string(),
        }
    }
}

impl StoreConfig {
    /// Store address of the gold data
    pub fn gold_target(&self) -> StoreTarget {
        StoreTarget::new(&self.dataset, &self.gold_model)
    }

    /// Store address of a generated model
    pub fn model_target(&self, model: &str) -> StoreTarget {
        StoreTarget::new(&self.dataset, model)
    }
}

/// Defaults for factuality evaluation
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvaluationConfig {
    /// Entity matching mode
    pub entity_match_type: EntityMatchType,
    /// Count skipped summaries as their own bucket
    pub count_skips: bool,
    /// Number of per-summary evaluations to show
    pub print_first_n: usize,
    /// Iteration budget applied to generation logs; unlimited when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<usize>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            entity_match_type: EntityMatchType::default(),
            count_skips: true,
            print_first_n: 0,
            max_iterations: None,
        }
    }
}

impl EvaluationConfig {
    /// Evaluation options seeded from this section
    pub fn options(&self) -> EvaluationOptions {
        EvaluationOptions {
            entity_match_type: self.entity_match_type,
            count_skips: self.count_skips,
            print_first_n: self.print_first_n,
            ..Default::default()
        }
    }
}

/// Defaults for iteration statistics
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct IterationConfig {
    /// Directory holding the iteration logs
    pub log_dir: PathBuf,
    /// Iteration count from which the distribution is collapsed into one bucket
    pub tail_bucket: usize,
}

impl Default for IterationConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("results/iteration-changes"),
            tail_bucket: DEFAULT_TAIL_BUCKET,
        }
    }
}

impl EvalConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| EvalError::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
        Self::from_toml_str(&content).map_err(|e| match e {
            EvalError::Config { message } => EvalError::Config {
                message: format!("{}: {message}", path.display()),
            },
            other => other,
        })
    }

    /// Apply `GEF_EVAL_STORE_ROOT` and `GEF_EVAL_DATASET`
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(root) = env::var_os(STORE_ROOT_ENV).filter(|v| !v.is_empty()) {
            self.store.root = PathBuf::from(root);
        }
        if let Ok(dataset) = env::var(DATASET_ENV) {
            if !dataset.is_empty() {
                self.store.dataset = dataset;
            }
        }
        self
    }

    /// Serialize as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| EvalError::Config {
            message: e.to_string(),
        })
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.evaluation.max_iterations == Some(0) {
            return Err(EvalError::Config {
                message: "evaluation.max_iterations must be at least 1".to_string(),
            });
        }
        if self.iterations.tail_bucket == 0 {
            return Err(EvalError::Config {
                message: "iterations.tail_bucket must be at least 1".to_string(),
            });
        }
        if self.store.dataset.is_empty() || self.store.gold_model.is_empty() {
            return Err(EvalError::Config {
                message: "store.dataset and store.gold_model must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

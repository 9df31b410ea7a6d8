//! Convergence statistics for iterative generate-and-edit runs
//!
//! Pipeline: [`IterationLog`] (read) → [`ConvergenceSeries`] (difference
//! consecutive iterations) → [`ConvergenceDistribution`] (normalize, summarize).

pub mod convergence;
pub mod distribution;
pub mod log;

pub use convergence::ConvergenceSeries;
pub use distribution::{Bucket, ConvergenceDistribution};
pub use log::{IterationLog, IterationRecord, MAX_ITERATION};

/// Default first iteration merged into the tail bucket for presentation
pub const DEFAULT_TAIL_BUCKET: usize = 8;

/// Base models with known experiment logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseModel {
    /// facebook/bart-large-xsum
    Bart,
    /// google/pegasus-xsum
    Pegasus,
}

impl BaseModel {
    /// Lowercase model name used in file names
    pub fn name(&self) -> &'static str {
        match self {
            BaseModel::Bart => "bart",
            BaseModel::Pegasus => "pegasus",
        }
    }

    /// Size of the extrinsic test split used for this model's experiments
    fn test_split_size(&self) -> usize {
        match self {
            BaseModel::Bart => 100,
            BaseModel::Pegasus => 75,
        }
    }
}

/// Experiment series recorded in iteration logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Experiment {
    /// Full test set, classifier-guided
    Full,
    /// Full test set restricted to extrinsic hallucinations
    FullExtrinsic,
    /// Extrinsic test split with oracle labels
    Oracle,
    /// Extrinsic test split with the kNN classifier
    Knn,
}

impl Experiment {
    /// All known experiments
    pub const ALL: [Experiment; 4] = [
        Experiment::Full,
        Experiment::FullExtrinsic,
        Experiment::Oracle,
        Experiment::Knn,
    ];

    /// Series name used in reports
    pub fn name(&self) -> &'static str {
        match self {
            Experiment::Full => "full",
            Experiment::FullExtrinsic => "full-extrinsic",
            Experiment::Oracle => "oracle",
            Experiment::Knn => "knn",
        }
    }

    /// Log file name for this experiment under the iteration log directory
    pub fn log_file_name(&self, model: BaseModel) -> String {
        let model_name = model.name();
        let split = model.test_split_size();
        match self {
            Experiment::Full => format!("{model_name}-full-classifier-knnv1.json"),
            Experiment::FullExtrinsic => {
                format!("{model_name}-full-extrinsic-classifier-knnv1.json")
            }
            Experiment::Oracle => format!("{model_name}-test-extrinsic-{split}-oracle.json"),
            Experiment::Knn => {
                format!("{model_name}-test-extrinsic-{split}-classifier-knnv1.json")
            }
        }
    }
}

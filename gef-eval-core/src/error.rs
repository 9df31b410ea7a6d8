//! Error types for evaluation runs
//!
//! Every variant is fatal to the current run. Messages name the offending
//! file, iteration or summary id so a bad input can be located quickly.

use std::path::PathBuf;
use thiserror::Error;

/// Evaluation errors
#[derive(Error, Debug)]
pub enum EvalError {
    /// I/O error on a specific path
    #[error("I/O error for path '{}': {source}", .path.display())]
    Io {
        /// The file that could not be read or written
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Malformed JSON or a record with missing/extra fields
    #[error("failed to parse '{}': {source}", .path.display())]
    Parse {
        /// The file being parsed
        path: PathBuf,
        /// Underlying serde error
        source: serde_json::Error,
    },

    /// Structurally valid input that violates a format rule
    #[error("invalid {context}: {message}")]
    Format {
        /// What was being read
        context: String,
        /// What was wrong with it
        message: String,
    },

    /// The same iteration number appears twice in an iteration log
    #[error("duplicate iteration {iteration} in iteration log")]
    DuplicateIteration {
        /// The repeated iteration number
        iteration: u64,
    },

    /// A convergence series cannot be turned into a distribution
    #[error("degenerate convergence distribution: {reason}")]
    DegenerateDistribution {
        /// Why normalization was refused
        reason: String,
    },

    /// A generated summary has no gold reference
    #[error("summary '{summary_id}' has no gold reference")]
    MissingGold {
        /// The summary id
        summary_id: String,
    },

    /// A generated summary has no source document
    #[error("summary '{summary_id}' has no source document")]
    MissingDocument {
        /// The summary id
        summary_id: String,
    },

    /// Annotations were supplied for a summary whose text is unknown
    #[error("no generated summary text for '{summary_id}'")]
    MissingSummary {
        /// The summary id
        summary_id: String,
    },

    /// An entity label outside the closed label set
    #[error("invalid entity label '{label}'")]
    InvalidLabel {
        /// The rejected label
        label: String,
    },

    /// Aggregation over an empty summary set
    #[error("no summaries to evaluate")]
    NoSummaries,

    /// A LaTeX macro name containing characters other than ASCII letters
    #[error("'{name}' is not a valid LaTeX macro name")]
    InvalidMacroName {
        /// The rejected name
        name: String,
    },

    /// Configuration error
    #[error("configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },
}

impl EvalError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }
}

/// Result type for evaluation operations
pub type Result<T> = std::result::Result<T, EvalError>;

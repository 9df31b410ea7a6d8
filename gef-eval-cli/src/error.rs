//! Errors raised by the CLI itself
//!
//! Failures from the evaluation library arrive as `EvalError` wrapped in
//! `anyhow` context; these cover argument and file discovery problems.

use std::fmt;

/// CLI-specific errors
#[derive(Debug)]
pub enum CliError {
    /// Explicitly named file does not exist
    FileNotFound(String),
    /// Iteration log pattern that glob rejects
    InvalidPattern(String),
    /// Configuration error
    ConfigError(String),
    /// Inconsistent command-line arguments
    InvalidArguments(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::FileNotFound(path) => write!(f, "File not found: {path}"),
            CliError::InvalidPattern(pattern) => write!(f, "Invalid file pattern: {pattern}"),
            CliError::ConfigError(msg) => write!(f, "Configuration error: {msg}"),
            CliError::InvalidArguments(msg) => write!(f, "Invalid arguments: {msg}"),
        }
    }
}

impl std::error::Error for CliError {}

//! gef-eval CLI library
//!
//! This library provides the command-line interface for computing
//! convergence and factuality statistics of generate-and-edit summarization.

pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod progress;
pub mod terminal;

pub use error::CliError;

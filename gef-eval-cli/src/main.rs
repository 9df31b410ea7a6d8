//! gef-eval command-line entry point

use clap::{ArgAction, Parser};
use gef_eval_cli::commands::{Commands, GlobalOptions};
use std::path::PathBuf;
use std::process::ExitCode;

/// Convergence and factuality statistics for generate-and-edit summarization
#[derive(Debug, Parser)]
#[command(name = "gef-eval", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (default: ./gef-eval.toml if present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Suppress progress output and logging
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Increase verbosity
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Initialize logging based on verbosity level
    fn init_logging(&self) {
        let log_level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        if !self.quiet {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
                .format_timestamp(None)
                .init();
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.init_logging();

    let globals = GlobalOptions {
        config: cli.config.clone(),
        quiet: cli.quiet,
    };
    match cli.command.execute(&globals) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

//! CLI command implementations

use anyhow::{Context, Result};
use clap::Subcommand;
use gef_eval_core::{BaseModel, EntityMatchType, Experiment};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

pub mod evaluate;
pub mod generate_config;
pub mod iteration_stats;
pub mod latex;

/// Options shared by every command
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Explicit configuration file
    pub config: Option<PathBuf>,
    /// Suppress progress output
    pub quiet: bool,
}

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Distribution of iterations until convergence for experiment logs
    IterationStats(iteration_stats::IterationStatsArgs),

    /// Entity-level factuality of generated summaries
    Evaluate(evaluate::EvaluateArgs),

    /// Render a metric table as LaTeX macros
    Latex(latex::LatexArgs),

    /// Write a configuration file with every default spelled out
    GenerateConfig(generate_config::GenerateConfigArgs),

    /// List available components
    List {
        #[command(subcommand)]
        subcommand: ListCommands,
    },
}

/// List subcommands
#[derive(Debug, Subcommand)]
pub enum ListCommands {
    /// List known experiments and their log files
    Experiments,

    /// List entity match types
    MatchTypes,
}

impl Commands {
    /// Execute the selected command
    pub fn execute(&self, globals: &GlobalOptions) -> Result<()> {
        match self {
            Commands::IterationStats(args) => {
                let config = crate::config::load_config(globals.config.as_deref())?;
                args.execute(&config)
            }
            Commands::Evaluate(args) => {
                let config = crate::config::load_config(globals.config.as_deref())?;
                args.execute(&config, globals.quiet)
            }
            Commands::Latex(args) => args.execute(),
            Commands::GenerateConfig(args) => args.execute(),
            Commands::List { subcommand } => {
                let mut stdout = io::stdout().lock();
                subcommand.write_to(&mut stdout)?;
                Ok(())
            }
        }
    }
}

impl ListCommands {
    /// Write the listing to `out`
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self {
            ListCommands::Experiments => {
                writeln!(out, "Available experiments:")?;
                for experiment in Experiment::ALL {
                    writeln!(
                        out,
                        "  {:<16} {}, {}",
                        experiment.name(),
                        experiment.log_file_name(BaseModel::Bart),
                        experiment.log_file_name(BaseModel::Pegasus)
                    )?;
                }
            }
            ListCommands::MatchTypes => {
                writeln!(out, "Available entity match types:")?;
                for match_type in EntityMatchType::ALL {
                    let description = match match_type {
                        EntityMatchType::Strict => "exact span, case-sensitive text",
                        EntityMatchType::StrictIntrinsic => {
                            "exact span for intrinsic labels, case-insensitive text"
                        }
                        EntityMatchType::Lenient => "case-insensitive text everywhere",
                    };
                    let marker = if match_type == EntityMatchType::default() {
                        " (default)"
                    } else {
                        ""
                    };
                    writeln!(out, "  {:<18} {description}{marker}", match_type.as_str())?;
                }
            }
        }
        Ok(())
    }
}

/// Open the report destination, stdout when no file is given
pub(crate) fn open_output(path: Option<&Path>) -> Result<Box<dyn Write + Send + Sync>> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout())),
    }
}

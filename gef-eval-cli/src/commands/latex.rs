//! Latex command implementation

use anyhow::{Context, Result};
use clap::Args;
use gef_eval_core::report::write_latex_file;
use gef_eval_core::MetricTable;
use std::fs;
use std::path::{Path, PathBuf};

/// Arguments for the latex command
#[derive(Debug, Args)]
pub struct LatexArgs {
    /// JSON table `{model: {metric: value}}`, values as fractions
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Output file for the `\newcommand` definitions
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,
}

impl LatexArgs {
    /// Execute the latex command
    pub fn execute(&self) -> Result<()> {
        let table = read_table(&self.input)?;
        write_latex_file(&self.output, &table)
            .with_context(|| format!("Failed to write {}", self.output.display()))?;

        println!(
            "✓ Wrote {} macros to {}",
            table.len(),
            self.output.display()
        );
        Ok(())
    }
}

fn read_table(path: &Path) -> Result<MetricTable> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a {{model: {{metric: value}}}} table", path.display()))
}

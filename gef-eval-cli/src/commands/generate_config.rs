//! Generate config command implementation

use anyhow::{Context, Result};
use clap::Args;
use gef_eval_core::EvalConfig;
use std::path::PathBuf;

/// Arguments for the generate-config command
#[derive(Debug, Args)]
pub struct GenerateConfigArgs {
    /// Output file path
    #[arg(short, long, value_name = "FILE", default_value = crate::config::DEFAULT_CONFIG_FILE)]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

impl GenerateConfigArgs {
    /// Execute the generate-config command
    pub fn execute(&self) -> Result<()> {
        use std::fs;

        if self.output.exists() && !self.force {
            anyhow::bail!(
                "{} already exists (use --force to overwrite)",
                self.output.display()
            );
        }

        let template = self.generate_template()?;
        fs::write(&self.output, template)
            .with_context(|| format!("Failed to write to {}", self.output.display()))?;

        println!("✓ Configuration written to {}", self.output.display());
        println!();
        println!("Next steps:");
        println!("1. Point [store] root at your summary store");
        println!("2. Use it for evaluation:");
        println!(
            "   gef-eval -c {} evaluate --model <NAME> --documents <FILE>",
            self.output.display()
        );

        Ok(())
    }

    /// Generate template configuration content
    fn generate_template(&self) -> Result<String> {
        let body = EvalConfig::default().to_toml_string()?;
        Ok(format!(
            "# gef-eval configuration\n\
             # GEF_EVAL_STORE_ROOT and GEF_EVAL_DATASET override [store] when set.\n\n\
             {body}"
        ))
    }
}

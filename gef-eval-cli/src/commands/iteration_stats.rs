//! Iteration-stats command implementation

use super::open_output;
use crate::error::CliError;
use crate::input::resolve_patterns;
use crate::output::{create_formatter, ConvergenceReport, OutputFormat};
use anyhow::{Context, Result};
use clap::Args;
use gef_eval_core::{BaseModel, ConvergenceDistribution, EvalConfig, Experiment, IterationLog};
use std::path::{Path, PathBuf};

/// Arguments for the iteration-stats command
#[derive(Debug, Args)]
pub struct IterationStatsArgs {
    /// Base model whose experiment logs are read
    #[arg(value_enum, required_unless_present = "input")]
    pub model: Option<ModelArg>,

    /// Experiments to report (default: full-extrinsic)
    #[arg(short, long = "experiment", value_enum, value_name = "NAME")]
    pub experiments: Vec<ExperimentArg>,

    /// Iteration log files or patterns instead of named experiments
    #[arg(
        short,
        long,
        value_name = "FILE/PATTERN",
        conflicts_with_all = ["experiments", "log_dir"]
    )]
    pub input: Vec<String>,

    /// Directory holding the experiment logs
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// First iteration count merged into a single tail bucket
    #[arg(long, value_name = "N")]
    pub tail: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Base models with experiment logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ModelArg {
    /// facebook/bart-large-xsum
    Bart,
    /// google/pegasus-xsum
    Pegasus,
}

impl From<ModelArg> for BaseModel {
    fn from(model: ModelArg) -> Self {
        match model {
            ModelArg::Bart => BaseModel::Bart,
            ModelArg::Pegasus => BaseModel::Pegasus,
        }
    }
}

/// Experiment series
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExperimentArg {
    /// Full test set, classifier-guided
    Full,
    /// Full test set, extrinsic hallucinations only
    FullExtrinsic,
    /// Extrinsic test split with oracle labels
    Oracle,
    /// Extrinsic test split with the kNN classifier
    Knn,
}

impl From<ExperimentArg> for Experiment {
    fn from(experiment: ExperimentArg) -> Self {
        match experiment {
            ExperimentArg::Full => Experiment::Full,
            ExperimentArg::FullExtrinsic => Experiment::FullExtrinsic,
            ExperimentArg::Oracle => Experiment::Oracle,
            ExperimentArg::Knn => Experiment::Knn,
        }
    }
}

impl IterationStatsArgs {
    /// Execute the iteration-stats command
    pub fn execute(&self, config: &EvalConfig) -> Result<()> {
        let tail = self.tail.unwrap_or(config.iterations.tail_bucket);
        if tail == 0 {
            return Err(CliError::InvalidArguments("--tail must be at least 1".to_string()).into());
        }

        let sources = self.log_sources(config)?;
        log::info!("Reading {} iteration log(s)", sources.len());

        let mut formatter = create_formatter(self.format, open_output(self.output.as_deref())?);
        for (name, path) in &sources {
            let report = convergence_report(name, path, tail)?;
            log::debug!(
                "{name}: {} iterations, mean {:.4}",
                report.iterations,
                report.mean
            );
            formatter.write_convergence(&report)?;
        }
        formatter.finish()
    }

    /// `(series name, log path)` pairs in reporting order
    fn log_sources(&self, config: &EvalConfig) -> Result<Vec<(String, PathBuf)>> {
        if !self.input.is_empty() {
            return Ok(resolve_patterns(&self.input)?
                .into_iter()
                .map(|path| (series_name(&path), path))
                .collect());
        }

        let model: BaseModel = self
            .model
            .ok_or_else(|| CliError::InvalidArguments("a base model is required".to_string()))?
            .into();
        let log_dir = self.log_dir.as_ref().unwrap_or(&config.iterations.log_dir);
        let experiments: Vec<Experiment> = if self.experiments.is_empty() {
            vec![Experiment::FullExtrinsic]
        } else {
            self.experiments.iter().map(|&e| e.into()).collect()
        };

        Ok(experiments
            .into_iter()
            .map(|experiment| {
                (
                    experiment.name().to_string(),
                    log_dir.join(experiment.log_file_name(model)),
                )
            })
            .collect())
    }
}

fn series_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn convergence_report(name: &str, path: &Path, tail: usize) -> Result<ConvergenceReport> {
    let log = IterationLog::from_path(path)
        .with_context(|| format!("Failed to read iteration log for {name}"))?;
    let series = log.convergence();
    for (iteration, count) in series.violations() {
        log::warn!("{name}: iteration {iteration} has {count} converged summaries");
    }
    let distribution = ConvergenceDistribution::from_series(&series)
        .with_context(|| format!("Cannot summarize {}", path.display()))?;
    Ok(ConvergenceReport::new(name, &distribution, tail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args(model: Option<ModelArg>) -> IterationStatsArgs {
        IterationStatsArgs {
            model,
            experiments: Vec::new(),
            input: Vec::new(),
            log_dir: None,
            tail: None,
            format: OutputFormat::Text,
            output: None,
        }
    }

    #[test]
    fn test_default_experiment_uses_config_log_dir() {
        let config = EvalConfig::default();
        let sources = args(Some(ModelArg::Pegasus)).log_sources(&config).unwrap();

        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].0, "full-extrinsic");
        assert_eq!(
            sources[0].1,
            config
                .iterations
                .log_dir
                .join("pegasus-full-extrinsic-classifier-knnv1.json")
        );
    }

    #[test]
    fn test_input_patterns_named_by_stem() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("oracle-run.json");
        fs::write(&path, "[]").unwrap();

        let mut args = args(None);
        args.input = vec![path.display().to_string()];
        let sources = args.log_sources(&EvalConfig::default()).unwrap();
        assert_eq!(sources, vec![("oracle-run".to_string(), path)]);
    }

    #[test]
    fn test_report_from_log() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.json");
        fs::write(
            &path,
            r#"[{"iteration": 0, "summary_generated": 10},
                {"iteration": 1, "summary_generated": 4},
                {"iteration": 2, "summary_generated": 1}]"#,
        )
        .unwrap();

        let report = convergence_report("log", &path, 2).unwrap();
        assert_eq!(report.iterations, 3);
        assert_eq!(report.buckets.len(), 2);
        assert!((report.buckets[0].probability - 0.6).abs() < 1e-9);
        assert!((report.mean - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_zero_tail_rejected() {
        let mut args = args(Some(ModelArg::Bart));
        args.tail = Some(0);
        let err = args.execute(&EvalConfig::default()).unwrap_err();
        assert!(err.to_string().contains("--tail"));
    }
}

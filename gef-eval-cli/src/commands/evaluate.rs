//! Evaluate command implementation

use super::open_output;
use crate::error::CliError;
use crate::output::{create_formatter, EvaluationReport, OutputFormat};
use crate::progress::ProgressReporter;
use crate::terminal::TerminalDecisions;
use anyhow::{Context, Result};
use clap::Args;
use gef_eval_core::data::{
    filter_by_ids, load_generation_log, load_id_filter, load_source_documents,
    summaries_from_store,
};
use gef_eval_core::report::write_latex_file;
use gef_eval_core::store::load_gold_data;
use gef_eval_core::{
    EntityMatchType, EvalConfig, EvaluationInput, EvaluationOptions, FactualityEvaluator,
    FactualityReport, GeneratedSummaries, JsonFileStore, MetadataStore, MetricTable,
};
use std::io;
use std::path::PathBuf;

/// Arguments for the evaluate command
#[derive(Debug, Args)]
pub struct EvaluateArgs {
    /// Generate-and-edit log holding the summaries to evaluate
    #[arg(
        long,
        value_name = "FILE",
        conflicts_with = "model",
        required_unless_present = "model"
    )]
    pub generation_log: Option<PathBuf>,

    /// Model whose stored summaries are evaluated
    #[arg(short, long, value_name = "NAME")]
    pub model: Option<String>,

    /// Source documents with reference summaries
    #[arg(short, long, value_name = "FILE")]
    pub documents: PathBuf,

    /// JSON array of summary ids to restrict evaluation to
    #[arg(long, value_name = "FILE")]
    pub ids: Option<PathBuf>,

    /// Use the summary of the last iteration within this budget
    #[arg(long, value_name = "N", requires = "generation_log")]
    pub max_iterations: Option<usize>,

    /// Entity match type: strict, strict_intrinsic or lenient
    #[arg(long, value_name = "TYPE")]
    pub match_type: Option<EntityMatchType>,

    /// Number of per-summary evaluations to show
    #[arg(long, value_name = "N")]
    pub print_first_n: Option<usize>,

    /// Apply the skip and fail signals of the generation log
    #[arg(long)]
    pub fbs: bool,

    /// Trust entity labels from the generation log
    #[arg(long)]
    pub oracle: bool,

    /// Evaluate skipped summaries instead of counting them separately
    #[arg(long)]
    pub no_count_skips: bool,

    /// Offer to label unknown entities interactively
    #[arg(long)]
    pub annotate: bool,

    /// Write the aggregate metrics as LaTeX macros to this file
    #[arg(long, value_name = "FILE", requires = "label")]
    pub latex: Option<PathBuf>,

    /// Model label used in reports and LaTeX macro names
    #[arg(long, value_name = "NAME")]
    pub label: Option<String>,

    /// Store root directory (overrides the configuration)
    #[arg(long, value_name = "DIR")]
    pub store: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl EvaluateArgs {
    /// Execute the evaluate command
    pub fn execute(&self, config: &EvalConfig, quiet: bool) -> Result<()> {
        let options = self.options(config);
        log::debug!("Evaluation options: {options:?}");

        let root = self.store.as_ref().unwrap_or(&config.store.root);
        let mut store = JsonFileStore::new(root);
        let gold_target = config.store.gold_target();
        let gold = load_gold_data(&store, &gold_target)
            .with_context(|| format!("Failed to load gold data from {}", root.display()))?;

        let mut generated = self.load_generated(config, &store)?;
        if let Some(path) = &self.ids {
            let ids = load_id_filter(path)?;
            generated = filter_by_ids(generated, &ids);
            log::info!(
                "Restricted to {} summaries listed in {}",
                generated.len(),
                path.display()
            );
        }
        let documents = load_source_documents(&self.documents)?;

        let input = EvaluationInput {
            generated: &generated,
            gold_summaries: &gold.summaries,
            gold_metadata: &gold.metadata,
            documents: &documents,
        };
        let evaluator = FactualityEvaluator::new(options)?;

        let report = if options.should_annotate {
            let stdin = io::stdin();
            let mut decisions = TerminalDecisions::new(stdin.lock(), io::stderr());
            let (report, session) = evaluator.evaluate_with_annotation(
                &input,
                &mut store,
                &gold_target,
                &mut decisions,
            )?;
            if let Some(session) = session {
                log::info!(
                    "Annotated {} entities ({})",
                    session.len(),
                    if session.completed { "complete" } else { "stopped early" }
                );
            }
            report
        } else {
            let mut progress = ProgressReporter::new(quiet);
            progress.init_summaries(generated.len() as u64);
            let report =
                evaluator.evaluate_with_progress(&input, |id| progress.summary_completed(id));
            progress.finish();
            report?
        };

        self.write_report(&report, options.print_first_n)?;

        if let Some(path) = &self.latex {
            let label = self
                .label
                .as_deref()
                .ok_or_else(|| CliError::InvalidArguments("--latex requires --label".to_string()))?;
            write_latex_file(path, &MetricTable::from_metrics(label, &report.metrics))
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        Ok(())
    }

    /// Configuration defaults overridden by command-line flags
    fn options(&self, config: &EvalConfig) -> EvaluationOptions {
        let mut options = config.evaluation.options();
        if let Some(match_type) = self.match_type {
            options.entity_match_type = match_type;
        }
        if let Some(n) = self.print_first_n {
            options.print_first_n = n;
        }
        if self.no_count_skips {
            options.count_skips = false;
        }
        options.is_fbs = self.fbs;
        options.is_oracle = self.oracle;
        options.should_annotate = self.annotate;
        options
    }

    fn load_generated(
        &self,
        config: &EvalConfig,
        store: &dyn MetadataStore,
    ) -> Result<GeneratedSummaries> {
        if let Some(path) = &self.generation_log {
            let max_iterations = self.max_iterations.or(config.evaluation.max_iterations);
            return load_generation_log(path, max_iterations)
                .with_context(|| format!("Failed to load generation log {}", path.display()));
        }

        let model = self.model.as_deref().ok_or_else(|| {
            CliError::InvalidArguments("either --generation-log or --model is required".to_string())
        })?;
        let stored = store
            .get_summaries(&config.store.model_target(model))
            .with_context(|| format!("Failed to load summaries of model {model}"))?;
        Ok(summaries_from_store(stored))
    }

    fn write_report(&self, report: &FactualityReport, print_first_n: usize) -> Result<()> {
        let shown = report.summaries.len().min(print_first_n);
        let mut formatter = create_formatter(self.format, open_output(self.output.as_deref())?);
        formatter.write_evaluation(&EvaluationReport {
            label: self.label.as_deref(),
            metrics: &report.metrics,
            summaries: &report.summaries[..shown],
        })?;
        formatter.finish()
    }
}

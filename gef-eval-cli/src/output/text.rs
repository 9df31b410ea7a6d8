//! Plain text output formatter

use super::{entity_rows, summary_rows, ConvergenceReport, EvaluationReport, ReportFormatter};
use anyhow::Result;
use std::io::Write;

/// Plain text formatter - aligned columns for terminals
pub struct TextFormatter<W: Write> {
    writer: W,
}

impl<W: Write> TextFormatter<W> {
    /// Create a new text formatter
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write + Send + Sync> ReportFormatter for TextFormatter<W> {
    fn write_convergence(&mut self, report: &ConvergenceReport) -> Result<()> {
        writeln!(
            self.writer,
            "{} ({} iterations)",
            report.name, report.iterations
        )?;
        for bucket in &report.buckets {
            writeln!(self.writer, "  {:<4} {:.4}", bucket.label, bucket.probability)?;
        }
        writeln!(
            self.writer,
            "{}: {:.4} ± {:.4}",
            report.name, report.mean, report.std_dev
        )?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_evaluation(&mut self, report: &EvaluationReport<'_>) -> Result<()> {
        let metrics = report.metrics;
        if let Some(label) = report.label {
            writeln!(self.writer, "{label}")?;
        }

        writeln!(self.writer, "Summaries: {}", metrics.summaries.total)?;
        for (name, fraction) in summary_rows(metrics) {
            writeln!(self.writer, "  {:<24} {:>7.2}%", name, fraction * 100.0)?;
        }
        writeln!(self.writer, "  {:<24} {:>7}", "failed", metrics.summaries.failed)?;

        writeln!(self.writer, "Entities: {}", metrics.entities.total)?;
        for (label, count) in entity_rows(metrics) {
            writeln!(self.writer, "  {:<24} {:>7}", label.as_str(), count)?;
        }

        match metrics.entities.extrinsic_factuality_ratio {
            Some(ratio) => writeln!(
                self.writer,
                "Extrinsic factuality ratio: {:.4} ± {:.4}",
                ratio.mean, ratio.stdev
            )?,
            None => writeln!(self.writer, "Extrinsic factuality ratio: n/a")?,
        }

        for summary in report.summaries {
            writeln!(self.writer)?;
            writeln!(
                self.writer,
                "[{}] {}: {}",
                summary.summary_id,
                summary.outcome.name(),
                summary.summary
            )?;
            for entity in &summary.entities {
                writeln!(
                    self.writer,
                    "  {} ({}:{}) {}",
                    entity.ent, entity.start, entity.end, entity.label
                )?;
            }
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

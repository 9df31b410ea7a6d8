//! Markdown output formatter

use super::{entity_rows, summary_rows, ConvergenceReport, EvaluationReport, ReportFormatter};
use anyhow::Result;
use std::io::Write;

/// Markdown formatter - one section with tables per report
pub struct MarkdownFormatter<W: Write> {
    writer: W,
    section_count: usize,
}

impl<W: Write> MarkdownFormatter<W> {
    /// Create a new markdown formatter
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            section_count: 0,
        }
    }
}

impl<W: Write + Send + Sync> ReportFormatter for MarkdownFormatter<W> {
    fn write_convergence(&mut self, report: &ConvergenceReport) -> Result<()> {
        self.section_count += 1;
        writeln!(self.writer, "## {}", report.name)?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Iterations | Summaries completed |")?;
        writeln!(self.writer, "|---|---|")?;
        for bucket in &report.buckets {
            writeln!(
                self.writer,
                "| {} | {:.2}% |",
                bucket.label,
                bucket.probability * 100.0
            )?;
        }
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "**Mean:** {:.4} ± {:.4}",
            report.mean, report.std_dev
        )?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_evaluation(&mut self, report: &EvaluationReport<'_>) -> Result<()> {
        self.section_count += 1;
        let metrics = report.metrics;
        writeln!(
            self.writer,
            "## {}",
            report.label.unwrap_or("Factuality evaluation")
        )?;
        writeln!(self.writer)?;

        writeln!(
            self.writer,
            "| Summaries ({}) | Share |",
            metrics.summaries.total
        )?;
        writeln!(self.writer, "|---|---|")?;
        for (name, fraction) in summary_rows(metrics) {
            writeln!(self.writer, "| {} | {:.2}% |", name, fraction * 100.0)?;
        }
        writeln!(self.writer, "| failed | {} |", metrics.summaries.failed)?;
        writeln!(self.writer)?;

        writeln!(self.writer, "| Entities ({}) | Count |", metrics.entities.total)?;
        writeln!(self.writer, "|---|---|")?;
        for (label, count) in entity_rows(metrics) {
            writeln!(self.writer, "| {label} | {count} |")?;
        }
        writeln!(self.writer)?;

        if let Some(ratio) = metrics.entities.extrinsic_factuality_ratio {
            writeln!(
                self.writer,
                "**Extrinsic factuality ratio:** {:.4} ± {:.4}",
                ratio.mean, ratio.stdev
            )?;
            writeln!(self.writer)?;
        }

        for summary in report.summaries {
            writeln!(
                self.writer,
                "- `{}` *{}*: {}",
                summary.summary_id,
                summary.outcome.name(),
                summary.summary
            )?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        writeln!(self.writer, "---")?;
        writeln!(self.writer, "*Total sections: {}*", self.section_count)?;
        self.writer.flush()?;
        Ok(())
    }
}

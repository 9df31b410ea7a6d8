//! Progress reporting module

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter for summary evaluation
pub struct ProgressReporter {
    progress_bar: Option<ProgressBar>,
    quiet: bool,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new(quiet: bool) -> Self {
        Self {
            progress_bar: None,
            quiet,
        }
    }

    /// Initialize progress bar for `total_summaries` summaries
    pub fn init_summaries(&mut self, total_summaries: u64) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(total_summaries);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} summaries {msg}")
        {
            pb.set_style(style.progress_chars("##-"));
        }
        pb.enable_steady_tick(Duration::from_millis(100));

        self.progress_bar = Some(pb);
    }

    /// Update progress for an evaluated summary
    pub fn summary_completed(&self, summary_id: &str) {
        if let Some(pb) = &self.progress_bar {
            pb.set_message(format!("Evaluated: {summary_id}"));
            pb.inc(1);
        }
    }

    /// Finish progress reporting
    pub fn finish(&self) {
        if let Some(pb) = &self.progress_bar {
            pb.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_reporter_has_no_bar() {
        let mut reporter = ProgressReporter::new(true);
        reporter.init_summaries(10);
        assert!(reporter.progress_bar.is_none());
        reporter.summary_completed("1");
        reporter.finish();
    }

    #[test]
    fn test_counts_summaries() {
        let mut reporter = ProgressReporter::new(false);
        reporter.init_summaries(2);
        reporter.summary_completed("1");
        reporter.summary_completed("2");
        assert_eq!(reporter.progress_bar.as_ref().unwrap().position(), 2);
        reporter.finish();
    }
}

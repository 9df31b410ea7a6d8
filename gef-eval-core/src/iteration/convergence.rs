//! Examples converged per iteration

use super::log::IterationLog;

/// Number of examples whose generation finished during each iteration
///
/// Dense over `0..=max_iteration`. Values are signed so that a log which
/// violates monotonicity is still representable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvergenceSeries {
    counts: Vec<i64>,
}

impl ConvergenceSeries {
    /// Wrap pre-computed counts
    pub fn from_counts(counts: Vec<i64>) -> Self {
        Self { counts }
    }

    /// Counts indexed by iteration
    pub fn counts(&self) -> &[i64] {
        &self.counts
    }

    /// Total number of converged examples
    pub fn total(&self) -> i64 {
        self.counts.iter().fold(0i64, |acc, &c| acc.saturating_add(c))
    }

    /// Number of iterations covered
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether the series is empty
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterations with a negative count
    pub fn violations(&self) -> impl Iterator<Item = (usize, i64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &count)| count < 0)
            .map(|(iteration, &count)| (iteration, count))
    }
}

impl IterationLog {
    /// Examples converged during each logged iteration
    ///
    /// `converged(i) = generated(i) - generated(i + 1)`, where an unlogged
    /// `i + 1` counts as zero generated summaries.
    pub fn convergence(&self) -> ConvergenceSeries {
        let Some(max_iteration) = self.max_iteration() else {
            return ConvergenceSeries::default();
        };

        // from_records bounds iterations by MAX_ITERATION and counts by i64::MAX
        let mut counts = Vec::new();
        for iteration in 0..=max_iteration {
            let Some(current) = self.summaries_generated(iteration) else {
                tracing::warn!("iteration {iteration} missing from log, counting 0 converged");
                counts.push(0);
                continue;
            };
            let next = iteration
                .checked_add(1)
                .and_then(|i| self.summaries_generated(i))
                .unwrap_or(0);
            let converged = signed(current) - signed(next);

            if converged < 0 {
                tracing::warn!(
                    "iteration {iteration}: {next} summaries generated after {current}, \
                     log is not monotone ({converged} converged)"
                );
            }
            counts.push(converged);
        }

        ConvergenceSeries { counts }
    }
}

fn signed(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

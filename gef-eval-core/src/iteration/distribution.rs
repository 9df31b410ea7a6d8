//! Distribution of "iterations run until convergence"

use super::convergence::ConvergenceSeries;
use crate::error::{EvalError, Result};
use serde::Serialize;

/// Probability of converging after `k` iterations, `k = 1..=len`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvergenceDistribution {
    probabilities: Vec<f64>,
}

/// One presentation bucket of a collapsed distribution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    /// Bucket label, e.g. `"3"` or `"8+"`
    pub label: String,
    /// Probability mass in the bucket
    pub probability: f64,
}

impl ConvergenceDistribution {
    /// Normalize a convergence series into a distribution
    pub fn from_series(series: &ConvergenceSeries) -> Result<Self> {
        let weights: Vec<f64> = series.counts().iter().map(|&c| c as f64).collect();
        Self::from_weights(&weights)
    }

    /// Normalize arbitrary non-negative weights; index 0 means one iteration
    pub fn from_weights(weights: &[f64]) -> Result<Self> {
        if let Some((index, weight)) = weights
            .iter()
            .enumerate()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(EvalError::DegenerateDistribution {
                reason: format!("weight {weight} at iteration {index} is not a valid count"),
            });
        }

        let total: f64 = weights.iter().sum();
        if total == 0.0 {
            return Err(EvalError::DegenerateDistribution {
                reason: "no examples converged".to_string(),
            });
        }

        Ok(Self {
            probabilities: weights.iter().map(|w| w / total).collect(),
        })
    }

    /// Probabilities, index 0 meaning "converged after one iteration"
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// `(iterations run, probability)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.probabilities
            .iter()
            .enumerate()
            .map(|(index, &p)| (index + 1, p))
    }

    /// Expected number of iterations run
    pub fn mean(&self) -> f64 {
        self.iter().map(|(k, p)| k as f64 * p).sum()
    }

    /// Population standard deviation of the number of iterations run
    pub fn std_dev(&self) -> f64 {
        let mean = self.mean();
        self.iter()
            .map(|(k, p)| {
                let d = k as f64 - mean;
                d * d * p
            })
            .sum::<f64>()
            .sqrt()
    }

    /// Merge every `k >= threshold` into a single `"{threshold}+"` bucket
    pub fn collapse_tail(&self, threshold: usize) -> Vec<Bucket> {
        let mut buckets = Vec::new();
        let mut tail: Option<f64> = None;

        for (k, p) in self.iter() {
            if threshold > 0 && k >= threshold {
                *tail.get_or_insert(0.0) += p;
            } else {
                buckets.push(Bucket {
                    label: k.to_string(),
                    probability: p,
                });
            }
        }

        if let Some(probability) = tail {
            buckets.push(Bucket {
                label: format!("{threshold}+"),
                probability,
            });
        }
        buckets
    }
}

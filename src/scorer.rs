//! Free-energy scoring of candidate hypotheses.
//!
//! `F = complexity + accuracy`, lower is better. Complexity penalizes
//! beliefs that stray from the prior (KL divergence of the renormalized
//! activation vector against a uniform prior over the same support);
//! accuracy is the negative log-likelihood of the current observation under
//! the candidate's predicted distribution. The scorer is pure and total:
//! zero-probability support never produces an infinity, only the bounded
//! penalty below.

use tracing::trace;

use crate::error::SeedError;
use crate::seed::{Observation, ThoughtSeed};

/// Finite stand-in for `-ln(0)` where the observation has mass on support
/// the candidate assigns zero probability. Keeps downstream score
/// comparisons total.
const ZERO_SUPPORT_PENALTY: f64 = 1e6;

/// Pure scalar cost function for candidates. Stateless; safe to share and
/// to invoke for independent candidates in any order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FreeEnergyScorer;

impl FreeEnergyScorer {
    pub fn new() -> Self {
        Self
    }

    /// Scores one candidate against the observation. Fails only with
    /// `InvalidDistribution` when the activation mass is not positive;
    /// the caller excludes such seeds from the tick.
    pub fn score(&self, seed: &ThoughtSeed, observation: &Observation) -> Result<f64, SeedError> {
        let predicted = self.predicted_distribution(seed)?;
        let complexity = Self::complexity(&predicted);
        let accuracy = Self::accuracy(&predicted, &observation.evidence);
        let f = complexity + accuracy;
        trace!(seed = %seed.id, complexity, accuracy, free_energy = f, "scored candidate");
        Ok(f)
    }

    /// Renormalizes `[core, sub...]` activations into a categorical.
    fn predicted_distribution(&self, seed: &ThoughtSeed) -> Result<Vec<f64>, SeedError> {
        let mut v = seed.activation_vector();
        let sum: f64 = v.iter().sum();
        if !(sum > 0.0) || !sum.is_finite() {
            return Err(SeedError::InvalidDistribution {
                seed: seed.id.clone(),
                sum,
            });
        }
        for p in v.iter_mut() {
            *p /= sum;
        }
        Ok(v)
    }

    /// KL(q || uniform) over the candidate's own support. Zero-probability
    /// slots contribute nothing (lim x->0 of x ln x is 0).
    fn complexity(predicted: &[f64]) -> f64 {
        let n = predicted.len() as f64;
        predicted
            .iter()
            .filter(|&&q| q > 0.0)
            .map(|&q| q * (q * n).ln())
            .sum()
    }

    /// Negative log-likelihood of the evidence under the predicted
    /// distribution. Evidence is aligned slot-wise; extra predicted slots
    /// carry no evidence, extra evidence slots are zero-probability support
    /// and draw the bounded penalty. Negative or non-finite evidence
    /// entries carry no mass.
    fn accuracy(predicted: &[f64], evidence: &[f64]) -> f64 {
        let mut nll = 0.0;
        for (i, &e) in evidence.iter().enumerate() {
            if !e.is_finite() || e <= 0.0 {
                continue;
            }
            let q = predicted.get(i).copied().unwrap_or(0.0);
            if q > 0.0 {
                nll -= e * q.ln();
            } else {
                nll += e * ZERO_SUPPORT_PENALTY;
            }
        }
        nll
    }
}

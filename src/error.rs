use thiserror::Error;

use crate::seed::SeedId;

/// Per-candidate errors. These are recovered locally: the offending seed is
/// excluded from the current tick and the tick continues. Nothing in this
/// enum ever aborts the scheduler.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeedError {
    /// The seed's activations sum to <= 0, so no categorical distribution
    /// can be formed for scoring.
    #[error("seed '{seed}' has an invalid activation distribution (sum = {sum})")]
    InvalidDistribution { seed: SeedId, sum: f64 },

    /// A field that must be finite and in range is not.
    #[error("seed '{seed}' has invalid field '{field}': {value}")]
    InvalidCandidate {
        seed: SeedId,
        field: &'static str,
        value: f64,
    },
}

impl SeedError {
    /// Stable machine-readable code for collaborator-side logging.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidDistribution { .. } => "INVALID_DISTRIBUTION",
            Self::InvalidCandidate { .. } => "INVALID_CANDIDATE",
        }
    }

    /// The seed the error refers to.
    pub fn seed_id(&self) -> &SeedId {
        match self {
            Self::InvalidDistribution { seed, .. } => seed,
            Self::InvalidCandidate { seed, .. } => seed,
        }
    }
}

//! Dominant selection: argmin free energy with deterministic tie-breaks.

use std::collections::HashMap;

use crate::seed::{SeedId, ThoughtSeed};

/// Picks the winner from the active pool. The comparison is a manual scan
/// rather than `Iterator::min_by` so the tie-break chain stays explicit:
/// lower free energy wins; on equal scores higher `activation_core` wins;
/// on equal activation the lexicographically smaller id wins. The result is
/// therefore independent of pool ordering.
#[derive(Debug, Clone, Copy, Default)]
pub struct DominantSelector;

impl DominantSelector {
    pub fn new() -> Self {
        Self
    }

    /// Returns `None` only for an empty pool. Pool members missing from the
    /// score map (excluded during scoring) are skipped.
    pub fn select(&self, pool: &[&ThoughtSeed], scores: &HashMap<SeedId, f64>) -> Option<SeedId> {
        let mut best: Option<(&ThoughtSeed, f64)> = None;
        for &seed in pool {
            let Some(&score) = scores.get(&seed.id) else {
                continue;
            };
            best = match best {
                None => Some((seed, score)),
                Some((incumbent, best_score)) => {
                    if Self::beats(seed, score, incumbent, best_score) {
                        Some((seed, score))
                    } else {
                        Some((incumbent, best_score))
                    }
                }
            };
        }
        best.map(|(seed, _)| seed.id.clone())
    }

    fn beats(challenger: &ThoughtSeed, c_score: f64, incumbent: &ThoughtSeed, i_score: f64) -> bool {
        if c_score != i_score {
            return c_score < i_score;
        }
        if challenger.activation_core != incumbent.activation_core {
            return challenger.activation_core > incumbent.activation_core;
        }
        challenger.id < incumbent.id
    }
}

//! Active-pool filtering: which candidates are allowed to compete this tick.

use tracing::debug;

use crate::seed::ThoughtSeed;

/// Outcome of one filtering pass, including how far the threshold had to be
/// widened. An empty pool after widening is a valid terminal state for the
/// tick (the incumbent basin is held), never an error.
#[derive(Debug)]
pub struct PoolSelection<'a> {
    pub pool: Vec<&'a ThoughtSeed>,
    /// The threshold that finally produced this pool.
    pub effective_threshold: f64,
    /// Number of widening steps taken (0 ..= max_widenings).
    pub widenings: u32,
}

impl PoolSelection<'_> {
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }
}

/// Selects candidates with `activation_core >= threshold`. If the pool
/// comes up empty, the threshold is widened by `widen_step` up to
/// `max_widenings` times before the empty pool is returned as-is.
#[derive(Debug, Clone)]
pub struct ActivePoolFilter {
    widen_step: f64,
    max_widenings: u32,
}

impl ActivePoolFilter {
    pub fn new(widen_step: f64, max_widenings: u32) -> Self {
        Self {
            widen_step,
            max_widenings,
        }
    }

    pub fn filter<'a>(&self, candidates: &'a [ThoughtSeed], threshold: f64) -> PoolSelection<'a> {
        let mut tau = threshold;
        for widenings in 0..=self.max_widenings {
            let pool: Vec<&ThoughtSeed> = candidates
                .iter()
                .filter(|s| s.activation_core >= tau)
                .collect();
            if !pool.is_empty() {
                if widenings > 0 {
                    debug!(
                        widenings,
                        effective_threshold = tau,
                        pool_size = pool.len(),
                        "pool admitted after widening"
                    );
                }
                return PoolSelection {
                    pool,
                    effective_threshold: tau,
                    widenings,
                };
            }
            if widenings < self.max_widenings {
                tau -= self.widen_step;
            }
        }
        debug!(
            effective_threshold = tau,
            "no viable hypothesis this tick, pool empty after widening"
        );
        PoolSelection {
            pool: Vec::new(),
            effective_threshold: tau,
            widenings: self.max_widenings,
        }
    }
}

impl Default for ActivePoolFilter {
    fn default() -> Self {
        Self::new(0.1, 3)
    }
}

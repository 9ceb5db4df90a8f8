use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SeedError;

/// Stable candidate identifier. Minted by the perception collaborator,
/// never by this core. Lexicographic `Ord` is the deterministic tie-break
/// of last resort in dominant selection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeedId(pub String);

impl SeedId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SeedId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Opaque reference into the externally-owned knowledge representation.
/// Identity only; this core never dereferences it and never holds a
/// back-pointer to the owning domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttractorRef(pub u64);

/// Lifecycle state of a candidate hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThoughtSeedState {
    Unmanifested,
    Inactive,
    Active,
    Dominant,
    Dissipated,
}

impl Default for ThoughtSeedState {
    fn default() -> Self {
        ThoughtSeedState::Unmanifested
    }
}

/// A candidate hypothesis competing for dominance in one cognitive cycle.
///
/// Affective tags (`valence`, `arousal`) are carried through for the
/// collaborator layer; this core reads them only during validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThoughtSeed {
    pub id: SeedId,
    pub core_attractor: AttractorRef,
    pub sub_attractors: Vec<AttractorRef>,
    /// Match strength of the core attractor, in [0, 1].
    pub activation_core: f64,
    /// Match strengths of the sub-attractors, each in [0, 1].
    pub activation_sub: Vec<f64>,
    /// Affective valence, in [-1, 1].
    pub valence: f64,
    /// Affective arousal, in [0, 1].
    pub arousal: f64,
    pub state: ThoughtSeedState,
}

impl ThoughtSeed {
    /// Rejects seeds that cannot safely enter the pool: non-finite or
    /// out-of-range activations and affect. Validation failures exclude the
    /// seed for this tick only.
    pub fn validate(&self) -> Result<(), SeedError> {
        let checks: [(&'static str, f64, f64, f64); 3] = [
            ("activation_core", self.activation_core, 0.0, 1.0),
            ("valence", self.valence, -1.0, 1.0),
            ("arousal", self.arousal, 0.0, 1.0),
        ];
        for (field, value, lo, hi) in checks {
            if !value.is_finite() || value < lo || value > hi {
                return Err(SeedError::InvalidCandidate {
                    seed: self.id.clone(),
                    field,
                    value,
                });
            }
        }
        for &a in &self.activation_sub {
            if !a.is_finite() || !(0.0..=1.0).contains(&a) {
                return Err(SeedError::InvalidCandidate {
                    seed: self.id.clone(),
                    field: "activation_sub",
                    value: a,
                });
            }
        }
        Ok(())
    }

    /// Full activation vector, core first, used as the unnormalized
    /// categorical the scorer renormalizes.
    pub fn activation_vector(&self) -> Vec<f64> {
        let mut v = Vec::with_capacity(1 + self.activation_sub.len());
        v.push(self.activation_core);
        v.extend_from_slice(&self.activation_sub);
        v
    }
}

/// Current sensory/context snapshot consumed by the scorer. `evidence` is
/// aligned slot-wise with a seed's `[core, sub...]` activation vector;
/// length mismatches are resolved by the scorer (truncate / zero-pad) so
/// scoring stays total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub evidence: Vec<f64>,
}

impl Observation {
    pub fn new(evidence: Vec<f64>) -> Self {
        Self { evidence }
    }
}

/// Tracks how long each seed's core activation has stayed below the
/// dissipation floor. A seed below the floor for `max_low_ticks`
/// consecutive ticks is dissipated and dropped from the pool, and it stays
/// dissipated on every further below-floor tick until its activation
/// recovers to the floor or above. Counters for seeds absent from the
/// current candidate list are discarded.
#[derive(Debug, Clone)]
pub struct DissipationTracker {
    floor: f64,
    max_low_ticks: u32,
    low_streaks: HashMap<SeedId, u32>,
}

impl DissipationTracker {
    pub fn new(floor: f64, max_low_ticks: u32) -> Self {
        Self {
            floor,
            max_low_ticks,
            low_streaks: HashMap::new(),
        }
    }

    /// Updates streaks for this tick's candidates and returns the ids that
    /// are dissipated as of this tick. The streak saturates at the limit,
    /// so a dissipated seed remains dissipated while its activation stays
    /// below the floor rather than re-entering the pool every N ticks.
    pub fn observe(&mut self, candidates: &[ThoughtSeed]) -> Vec<SeedId> {
        let mut next = HashMap::with_capacity(candidates.len());
        let mut dissipated = Vec::new();
        for seed in candidates {
            if seed.activation_core < self.floor {
                let prev = self.low_streaks.get(&seed.id).copied().unwrap_or(0);
                let streak = prev.saturating_add(1).min(self.max_low_ticks);
                if streak >= self.max_low_ticks {
                    if prev < self.max_low_ticks {
                        debug!(seed = %seed.id, streak, "seed dissipated after sustained low activation");
                    }
                    dissipated.push(seed.id.clone());
                }
                next.insert(seed.id.clone(), streak);
            }
            // Activation at or above the floor resets the streak by omission.
        }
        self.low_streaks = next;
        dissipated
    }

    pub fn floor(&self) -> f64 {
        self.floor
    }
}

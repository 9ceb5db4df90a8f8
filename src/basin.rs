//! Attractor-basin bookkeeping: the ball-and-hill model of dominance.
//!
//! The registry holds at most one current basin per cognitive stream. While
//! the same seed keeps winning, the basin deepens: stability counts up and
//! the activation-energy barrier grows with diminishing returns. A
//! challenger displaces the incumbent only by beating its stored free
//! energy by more than the barrier height. Displacement resets the barrier
//! and emits a transition event for the external persistence collaborator;
//! this core never writes to storage itself.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::seed::SeedId;

/// ΔF below this tags a displacement as an "aha" transition.
pub const AHA_DELTA_F: f64 = -2.0;

/// How a displacement happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    Aha,
    Gradual,
}

/// Emitted whenever basin occupancy changes. `from` is `None` for the very
/// first establishment of a stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasinTransition {
    pub from: Option<SeedId>,
    pub to: SeedId,
    pub delta_f: f64,
    pub kind: TransitionKind,
    pub tick: u64,
}

/// The currently dominant seed plus its stability bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttractorBasin {
    pub id: u64,
    pub dominant_id: SeedId,
    /// Free energy of the dominant, refreshed each tick it wins.
    pub free_energy: f64,
    /// Consecutive ticks the dominant has held (including resisted
    /// challenges and empty ticks).
    pub stability: f64,
    /// Barrier a challenger must clear: displacement requires
    /// `ΔF < -activation_energy`, strictly.
    pub activation_energy: f64,
    /// Tick at which the current dominant took the basin.
    pub established_tick: u64,
}

/// Owns the current basin and executes the per-tick transition rule.
/// `Clone` so the scheduler can mutate a copy and commit atomically.
#[derive(Debug, Clone)]
pub struct BasinRegistry {
    current: Option<AttractorBasin>,
    base_activation_energy: f64,
    stability_gain: f64,
    max_activation_energy: f64,
    next_basin_id: u64,
}

impl BasinRegistry {
    pub fn new(base_activation_energy: f64, stability_gain: f64, max_activation_energy: f64) -> Self {
        Self {
            current: None,
            base_activation_energy,
            stability_gain,
            max_activation_energy,
            next_basin_id: 0,
        }
    }

    pub fn current(&self) -> Option<&AttractorBasin> {
        self.current.as_ref()
    }

    /// Applies this tick's winner. Exactly one of four things happens:
    /// establishment (no basin yet), reinforcement (winner is the
    /// incumbent), displacement (barrier cleared), or resistance (barrier
    /// held). Returns the transition event when occupancy changed.
    ///
    /// Returns the signed ΔF that drove the decision alongside the event;
    /// the scheduler feeds its magnitude to the precision modulator.
    pub fn apply(
        &mut self,
        tick: u64,
        winner: &SeedId,
        winner_score: f64,
    ) -> (f64, Option<BasinTransition>) {
        match self.current.as_mut() {
            None => {
                let basin = AttractorBasin {
                    id: self.next_basin_id,
                    dominant_id: winner.clone(),
                    free_energy: winner_score,
                    stability: 0.0,
                    activation_energy: self.base_activation_energy,
                    established_tick: tick,
                };
                self.next_basin_id += 1;
                info!(seed = %winner, free_energy = winner_score, tick, "basin established");
                self.current = Some(basin);
                let transition = BasinTransition {
                    from: None,
                    to: winner.clone(),
                    delta_f: 0.0,
                    kind: TransitionKind::Gradual,
                    tick,
                };
                (0.0, Some(transition))
            }
            Some(basin) if basin.dominant_id == *winner => {
                let delta_f = winner_score - basin.free_energy;
                basin.stability += 1.0;
                basin.activation_energy = (basin.activation_energy
                    + self.stability_gain * (1.0 + basin.stability).ln())
                .min(self.max_activation_energy);
                basin.free_energy = winner_score;
                debug!(
                    seed = %winner,
                    stability = basin.stability,
                    barrier = basin.activation_energy,
                    "basin reinforced"
                );
                (delta_f, None)
            }
            Some(basin) => {
                let delta_f = winner_score - basin.free_energy;
                if delta_f < -basin.activation_energy {
                    let from = basin.dominant_id.clone();
                    let kind = if delta_f < AHA_DELTA_F {
                        TransitionKind::Aha
                    } else {
                        TransitionKind::Gradual
                    };
                    basin.dominant_id = winner.clone();
                    basin.free_energy = winner_score;
                    basin.stability = 0.0;
                    basin.activation_energy = self.base_activation_energy;
                    basin.established_tick = tick;
                    info!(
                        from = %from,
                        to = %winner,
                        delta_f,
                        ?kind,
                        tick,
                        "basin displaced"
                    );
                    let transition = BasinTransition {
                        from: Some(from),
                        to: winner.clone(),
                        delta_f,
                        kind,
                        tick,
                    };
                    (delta_f, Some(transition))
                } else {
                    // Barrier held. Resistance reinforces stability, but the
                    // incumbent's record is otherwise untouched.
                    basin.stability += 1.0;
                    debug!(
                        incumbent = %basin.dominant_id,
                        challenger = %winner,
                        delta_f,
                        barrier = basin.activation_energy,
                        "challenge resisted"
                    );
                    (delta_f, None)
                }
            }
        }
    }

    /// A tick with no winner re-affirms the incumbent: stability increments,
    /// nothing else moves. No-op when no basin exists yet.
    pub fn hold(&mut self) {
        if let Some(basin) = self.current.as_mut() {
            basin.stability += 1.0;
        }
    }
}

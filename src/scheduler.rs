//! The tick loop: one synchronous decision cycle per call.
//!
//! `tick()` never blocks and never performs I/O; candidates and the
//! observation arrive as arguments, results leave as the return value.
//! All state mutation is staged on clones and committed together at the
//! end of the tick (build-then-swap), so a caller that abandons a tick
//! before calling `tick()` leaves no partial state behind.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::basin::{AttractorBasin, BasinRegistry, BasinTransition};
use crate::config::{ConfigError, SchedulerConfig};
use crate::pool::ActivePoolFilter;
use crate::precision::{PrecisionModulator, ThresholdState};
use crate::scorer::FreeEnergyScorer;
use crate::seed::{DissipationTracker, Observation, SeedId, ThoughtSeed, ThoughtSeedState};
use crate::selector::DominantSelector;

/// Transitions kept in memory for inspection. Authoritative history lives
/// with the external persistence collaborator.
const TRANSITION_HISTORY_LEN: usize = 64;

/// Output of one decision cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickResult {
    pub tick: u64,
    /// The winning hypothesis, state set to `Dominant`. `None` when the
    /// tick produced no viable hypothesis (valid, not an error).
    pub dominant: Option<ThoughtSeed>,
    /// Snapshot of the current basin after this tick. `None` only before
    /// any dominant has ever been selected on this stream.
    pub basin: Option<AttractorBasin>,
    pub transition: Option<BasinTransition>,
    /// Candidates that dissipated this tick, state set to `Dissipated`.
    /// They were excluded from the pool and stay excluded until their
    /// activation recovers above the floor.
    pub dissipated: Vec<ThoughtSeed>,
}

/// Point-in-time health summary for one stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamDiagnostics {
    pub tick: u64,
    pub threshold: ThresholdState,
    pub basin: Option<AttractorBasin>,
    pub transitions_seen: u64,
}

/// One cognitive stream's scheduler. Owns its registry and threshold state
/// exclusively; independent streams get independent instances and share
/// nothing.
pub struct CycleScheduler {
    config: SchedulerConfig,
    tick: u64,
    scorer: FreeEnergyScorer,
    filter: ActivePoolFilter,
    selector: DominantSelector,
    registry: BasinRegistry,
    modulator: PrecisionModulator,
    dissipation: DissipationTracker,
    recent_transitions: VecDeque<BasinTransition>,
    transitions_seen: u64,
}

impl CycleScheduler {
    /// Fails fast on invalid configuration; a scheduler that constructs
    /// will never reject a tick.
    pub fn new(config: SchedulerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let registry = BasinRegistry::new(
            config.base_activation_energy,
            config.stability_gain,
            config.max_activation_energy,
        );
        let modulator = PrecisionModulator::new(
            config.window_size,
            config.threshold_k,
            config.tau_base,
            config.tau_min,
            config.tau_max,
        );
        let filter = ActivePoolFilter::new(config.widen_step, config.max_widenings);
        let dissipation =
            DissipationTracker::new(config.dissipation_floor, config.dissipation_ticks);
        Ok(Self {
            config,
            tick: 0,
            scorer: FreeEnergyScorer::new(),
            filter,
            selector: DominantSelector::new(),
            registry,
            modulator,
            dissipation,
            recent_transitions: VecDeque::with_capacity(TRANSITION_HISTORY_LEN),
            transitions_seen: 0,
        })
    }

    /// Runs one decision cycle. Per-candidate problems are recovered
    /// locally; this call itself cannot fail.
    pub fn tick(&mut self, candidates: &[ThoughtSeed], observation: &Observation) -> TickResult {
        let tick = self.tick + 1;

        // Stage all mutable state; committed together at the end.
        let mut registry = self.registry.clone();
        let mut modulator = self.modulator.clone();
        let mut dissipation = self.dissipation.clone();

        let (viable, dissipated) = Self::admit(candidates, &mut dissipation);

        // Periodic replanning: re-open competition at the floor threshold so
        // a deep basin cannot lock the stream in forever.
        let replanning = tick % self.config.replanning_interval == 0;
        let threshold = if replanning {
            debug!(tick, "replanning tick, threshold forced to tau_min");
            modulator.tau_min()
        } else {
            modulator.threshold()
        };

        let selection = self.filter.filter(&viable, threshold);
        let scores = self.score_pool(&selection.pool, observation);
        let winner = self.selector.select(&selection.pool, &scores);

        let (dominant, transition) = match winner {
            Some(winner_id) => {
                let winner_score = scores[&winner_id];
                let (delta_f, transition) = registry.apply(tick, &winner_id, winner_score);
                modulator.observe(delta_f);
                let mut seed = viable
                    .iter()
                    .find(|s| s.id == winner_id)
                    .cloned()
                    .expect("winner came from the viable pool");
                seed.state = ThoughtSeedState::Dominant;
                (Some(seed), transition)
            }
            None => {
                // No viable hypothesis this tick: hold the incumbent.
                registry.hold();
                modulator.observe(0.0);
                (None, None)
            }
        };

        // Commit.
        self.registry = registry;
        self.modulator = modulator;
        self.dissipation = dissipation;
        self.tick = tick;
        if let Some(t) = &transition {
            if self.recent_transitions.len() >= TRANSITION_HISTORY_LEN {
                self.recent_transitions.pop_front();
            }
            self.recent_transitions.push_back(t.clone());
            self.transitions_seen += 1;
        }

        info!(
            tick,
            pool_size = selection.pool.len(),
            effective_threshold = selection.effective_threshold,
            dominant = dominant.as_ref().map(|s| s.id.as_str()),
            displaced = transition.is_some(),
            "tick complete"
        );

        TickResult {
            tick,
            dominant,
            basin: self.registry.current().cloned(),
            transition,
            dissipated,
        }
    }

    /// Validation and dissipation gate. Malformed candidates are excluded
    /// for this tick only; seeds below the activation floor for too many
    /// consecutive ticks are dissipated and returned separately with their
    /// state marked, so the caller can retire them.
    fn admit(
        candidates: &[ThoughtSeed],
        dissipation: &mut DissipationTracker,
    ) -> (Vec<ThoughtSeed>, Vec<ThoughtSeed>) {
        let mut valid: Vec<ThoughtSeed> = Vec::with_capacity(candidates.len());
        for seed in candidates {
            match seed.validate() {
                Ok(()) => valid.push(seed.clone()),
                Err(e) => {
                    warn!(code = e.code(), error = %e, "candidate rejected");
                }
            }
        }
        let dissipated_ids = dissipation.observe(&valid);
        let mut dissipated = Vec::with_capacity(dissipated_ids.len());
        if !dissipated_ids.is_empty() {
            let mut kept = Vec::with_capacity(valid.len());
            for mut seed in valid {
                if dissipated_ids.contains(&seed.id) {
                    seed.state = ThoughtSeedState::Dissipated;
                    dissipated.push(seed);
                } else {
                    kept.push(seed);
                }
            }
            valid = kept;
        }
        (valid, dissipated)
    }

    fn score_pool(
        &self,
        pool: &[&ThoughtSeed],
        observation: &Observation,
    ) -> HashMap<SeedId, f64> {
        let mut scores = HashMap::with_capacity(pool.len());
        for &seed in pool {
            match self.scorer.score(seed, observation) {
                Ok(f) => {
                    scores.insert(seed.id.clone(), f);
                }
                Err(e) => {
                    warn!(code = e.code(), error = %e, "candidate excluded from scoring");
                }
            }
        }
        scores
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn current_basin(&self) -> Option<&AttractorBasin> {
        self.registry.current()
    }

    /// Threshold the next non-replanning tick will filter with.
    pub fn current_threshold(&self) -> f64 {
        self.modulator.threshold()
    }

    /// Recent transitions, oldest first (bounded window).
    pub fn recent_transitions(&self) -> impl Iterator<Item = &BasinTransition> {
        self.recent_transitions.iter()
    }

    pub fn diagnostics(&self) -> StreamDiagnostics {
        StreamDiagnostics {
            tick: self.tick,
            threshold: self.modulator.state(),
            basin: self.registry.current().cloned(),
            transitions_seen: self.transitions_seen,
        }
    }
}

//! Deterministic winner-take-all selection core for competing hypotheses
//! ("thoughtseeds"), driven by free-energy minimization.
//!
//! One `CycleScheduler` per cognitive stream runs a synchronous decision
//! cycle: filter candidates into an active pool, score each against the
//! current observation, pick the minimum-free-energy winner, and settle it
//! into (or displace it from) the current attractor basin. A metacognitive
//! modulator watches recent volatility and retunes the activation threshold
//! for the next tick.
//!
//! The core never blocks on I/O: candidates and observations are supplied
//! by collaborators as arguments, and the winning hypothesis plus any basin
//! transition leave as the `TickResult`. Persistence, perception, and
//! content generation all live outside this crate.

pub mod basin;
pub mod config;
pub mod error;
pub mod pool;
pub mod precision;
pub mod scheduler;
pub mod scorer;
pub mod seed;
pub mod selector;

#[cfg(test)]
mod tests_determinism;
#[cfg(test)]
mod tests_proptest;

// Curated public API (no wildcard exports).

pub use basin::{AttractorBasin, BasinRegistry, BasinTransition, TransitionKind, AHA_DELTA_F};
pub use config::{ConfigError, SchedulerConfig};
pub use error::SeedError;
pub use pool::{ActivePoolFilter, PoolSelection};
pub use precision::{PrecisionModulator, ThresholdState};
pub use scheduler::{CycleScheduler, StreamDiagnostics, TickResult};
pub use scorer::FreeEnergyScorer;
pub use seed::{
    AttractorRef, DissipationTracker, Observation, SeedId, ThoughtSeed, ThoughtSeedState,
};
pub use selector::DominantSelector;

//! Metacognitive threshold modulation.
//!
//! The modulator watches how much free energy moved tick to tick. High
//! volatility lowers the activation threshold so more candidates get to
//! challenge; a quiet stream raises it and the system trusts its current
//! read. Only this type mutates `ThresholdState`; the pool filter consumes
//! the resolved τ value.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Snapshot of the modulator's owned state, serializable for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdState {
    /// Current activation threshold.
    pub tau: f64,
    /// Bounded history of recent |ΔF| values, oldest first.
    pub recent_volatility: Vec<f64>,
    /// Precision gain: 1 / (1 + σ²). Near 1 when the stream is quiet.
    pub gamma: f64,
}

#[derive(Debug, Clone)]
pub struct PrecisionModulator {
    window: VecDeque<f64>,
    window_size: usize,
    k: f64,
    tau_base: f64,
    tau_min: f64,
    tau_max: f64,
    tau: f64,
    gamma: f64,
}

impl PrecisionModulator {
    pub fn new(window_size: usize, k: f64, tau_base: f64, tau_min: f64, tau_max: f64) -> Self {
        Self {
            window: VecDeque::with_capacity(window_size),
            window_size,
            k,
            tau_base,
            tau_min,
            tau_max,
            tau: tau_base.clamp(tau_min, tau_max),
            gamma: 1.0,
        }
    }

    /// Current threshold for the next filtering pass.
    #[inline]
    pub fn threshold(&self) -> f64 {
        self.tau
    }

    /// Floor the scheduler forces during replanning ticks.
    #[inline]
    pub fn tau_min(&self) -> f64 {
        self.tau_min
    }

    /// Records the tick's ΔF and returns the threshold for the next tick:
    /// `τ = clamp(τ_base − k·σ², τ_min, τ_max)` where σ² is the variance of
    /// the |ΔF| window.
    pub fn observe(&mut self, delta_f: f64) -> f64 {
        if self.window.len() >= self.window_size {
            self.window.pop_front();
        }
        self.window.push_back(delta_f.abs());

        let variance = self.variance();
        self.gamma = 1.0 / (1.0 + variance);
        self.tau = (self.tau_base - self.k * variance).clamp(self.tau_min, self.tau_max);
        trace!(
            delta_f,
            variance,
            tau = self.tau,
            gamma = self.gamma,
            "threshold modulated"
        );
        self.tau
    }

    fn variance(&self) -> f64 {
        let n = self.window.len();
        if n < 2 {
            return 0.0;
        }
        let mean: f64 = self.window.iter().sum::<f64>() / n as f64;
        self.window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64
    }

    pub fn state(&self) -> ThresholdState {
        ThresholdState {
            tau: self.tau,
            recent_volatility: self.window.iter().copied().collect(),
            gamma: self.gamma,
        }
    }
}

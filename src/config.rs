use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

/// Tunables for one cognitive stream. Validated eagerly at scheduler
/// construction; an invalid config never ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Barrier height a fresh basin starts with.
    pub base_activation_energy: f64,
    /// Scale of barrier growth per reinforcement tick.
    pub stability_gain: f64,
    /// Hard cap on the barrier.
    pub max_activation_energy: f64,
    /// Volatility-to-threshold coupling (k in τ = τ_base − k·σ²).
    pub threshold_k: f64,
    pub tau_base: f64,
    pub tau_min: f64,
    pub tau_max: f64,
    /// Every this many ticks the pool is re-filtered at τ_min to let the
    /// incumbent be re-evaluated against everything.
    pub replanning_interval: u64,
    /// Volatility window length for the precision modulator.
    pub window_size: usize,
    /// Threshold widening step when the pool comes up empty.
    pub widen_step: f64,
    /// Maximum widening retries before an empty pool is accepted.
    pub max_widenings: u32,
    /// Core activation below this counts toward dissipation.
    pub dissipation_floor: f64,
    /// Consecutive below-floor ticks before a seed dissipates.
    pub dissipation_ticks: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            base_activation_energy: 0.5,
            stability_gain: 0.1,
            max_activation_energy: 5.0,
            threshold_k: 0.5,
            tau_base: 0.5,
            tau_min: 0.1,
            tau_max: 0.9,
            replanning_interval: 3,
            window_size: 20,
            widen_step: 0.1,
            max_widenings: 3,
            dissipation_floor: 0.05,
            dissipation_ticks: 5,
        }
    }
}

impl SchedulerConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: SchedulerConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    /// Variables are prefixed with THOUGHTSEED_, e.g.
    /// `THOUGHTSEED_TAU_BASE=0.6`.
    pub fn from_file_with_env<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        use std::env;

        fn parse_f64(name: &str, val: String) -> Result<f64, ConfigError> {
            val.parse()
                .map_err(|_| ConfigError::Validation(format!("Invalid {}", name)))
        }

        if let Ok(val) = env::var("THOUGHTSEED_BASE_ACTIVATION_ENERGY") {
            self.base_activation_energy = parse_f64("THOUGHTSEED_BASE_ACTIVATION_ENERGY", val)?;
        }
        if let Ok(val) = env::var("THOUGHTSEED_STABILITY_GAIN") {
            self.stability_gain = parse_f64("THOUGHTSEED_STABILITY_GAIN", val)?;
        }
        if let Ok(val) = env::var("THOUGHTSEED_MAX_ACTIVATION_ENERGY") {
            self.max_activation_energy = parse_f64("THOUGHTSEED_MAX_ACTIVATION_ENERGY", val)?;
        }
        if let Ok(val) = env::var("THOUGHTSEED_THRESHOLD_K") {
            self.threshold_k = parse_f64("THOUGHTSEED_THRESHOLD_K", val)?;
        }
        if let Ok(val) = env::var("THOUGHTSEED_TAU_BASE") {
            self.tau_base = parse_f64("THOUGHTSEED_TAU_BASE", val)?;
        }
        if let Ok(val) = env::var("THOUGHTSEED_TAU_MIN") {
            self.tau_min = parse_f64("THOUGHTSEED_TAU_MIN", val)?;
        }
        if let Ok(val) = env::var("THOUGHTSEED_TAU_MAX") {
            self.tau_max = parse_f64("THOUGHTSEED_TAU_MAX", val)?;
        }
        if let Ok(val) = env::var("THOUGHTSEED_REPLANNING_INTERVAL") {
            self.replanning_interval = val.parse().map_err(|_| {
                ConfigError::Validation("Invalid THOUGHTSEED_REPLANNING_INTERVAL".to_string())
            })?;
        }
        if let Ok(val) = env::var("THOUGHTSEED_WINDOW_SIZE") {
            self.window_size = val.parse().map_err(|_| {
                ConfigError::Validation("Invalid THOUGHTSEED_WINDOW_SIZE".to_string())
            })?;
        }
        if let Ok(val) = env::var("THOUGHTSEED_WIDEN_STEP") {
            self.widen_step = parse_f64("THOUGHTSEED_WIDEN_STEP", val)?;
        }
        if let Ok(val) = env::var("THOUGHTSEED_MAX_WIDENINGS") {
            self.max_widenings = val.parse().map_err(|_| {
                ConfigError::Validation("Invalid THOUGHTSEED_MAX_WIDENINGS".to_string())
            })?;
        }
        if let Ok(val) = env::var("THOUGHTSEED_DISSIPATION_FLOOR") {
            self.dissipation_floor = parse_f64("THOUGHTSEED_DISSIPATION_FLOOR", val)?;
        }
        if let Ok(val) = env::var("THOUGHTSEED_DISSIPATION_TICKS") {
            self.dissipation_ticks = val.parse().map_err(|_| {
                ConfigError::Validation("Invalid THOUGHTSEED_DISSIPATION_TICKS".to_string())
            })?;
        }

        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_activation_energy.is_finite() || self.base_activation_energy < 0.0 {
            return Err(ConfigError::Validation(
                "base_activation_energy must be finite and >= 0".to_string(),
            ));
        }
        if !self.stability_gain.is_finite() || self.stability_gain < 0.0 {
            return Err(ConfigError::Validation(
                "stability_gain must be finite and >= 0".to_string(),
            ));
        }
        if self.max_activation_energy < self.base_activation_energy {
            return Err(ConfigError::Validation(
                "max_activation_energy must be >= base_activation_energy".to_string(),
            ));
        }
        if !self.threshold_k.is_finite() || self.threshold_k < 0.0 {
            return Err(ConfigError::Validation(
                "threshold_k must be finite and >= 0".to_string(),
            ));
        }
        if self.tau_min > self.tau_max {
            return Err(ConfigError::Validation(
                "tau_min must be <= tau_max".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.tau_min) || !(0.0..=1.0).contains(&self.tau_max) {
            return Err(ConfigError::Validation(
                "tau_min and tau_max must be in [0, 1]".to_string(),
            ));
        }
        if !self.tau_base.is_finite() {
            return Err(ConfigError::Validation(
                "tau_base must be finite".to_string(),
            ));
        }
        if self.replanning_interval == 0 {
            return Err(ConfigError::Validation(
                "replanning_interval must be > 0".to_string(),
            ));
        }
        if self.window_size < 2 {
            return Err(ConfigError::Validation(
                "window_size must be >= 2".to_string(),
            ));
        }
        if !self.widen_step.is_finite() || self.widen_step <= 0.0 {
            return Err(ConfigError::Validation(
                "widen_step must be finite and > 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.dissipation_floor) {
            return Err(ConfigError::Validation(
                "dissipation_floor must be in [0, 1]".to_string(),
            ));
        }
        if self.dissipation_ticks == 0 {
            return Err(ConfigError::Validation(
                "dissipation_ticks must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

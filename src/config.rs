// Slotted ALOHA Simulation Engine - Configuration

use serde::{Deserialize, Serialize};

use crate::node::{CW_MAX, CW_MIN};

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Rejected configuration values. The CLI layer validates before handing
/// the config to the core; the core itself assumes valid input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("population must be at least 1")]
    EmptyPopulation,
    #[error("initial contention window {0} outside [{CW_MIN}, {CW_MAX}]")]
    ContentionWindowOutOfRange(u32),
    #[error("generation probability {0} outside [0, 1]")]
    ProbabilityOutOfRange(f64),
    #[error("target packet count must be at least 1")]
    ZeroTarget,
}

// ─── SimConfig ───────────────────────────────────────────────────────────────

/// Simulation parameters, fixed for the lifetime of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Number of contending transmitters.
    pub population: usize,
    /// Contention window every node starts with.
    pub initial_cw: u32,
    /// Per-node, per-slot Bernoulli packet-generation probability.
    pub gen_prob: f64,
    /// Deliveries after which the run completes.
    pub target_packets: u64,
    /// Consecutive collisions a head packet may survive before the run
    /// aborts. Zero means the first collision already aborts.
    pub max_retries: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            population: 24,
            initial_cw: 2,
            gen_prob: 0.5,
            target_packets: 400,
            max_retries: 100,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.initial_cw < CW_MIN || self.initial_cw > CW_MAX {
            return Err(ConfigError::ContentionWindowOutOfRange(self.initial_cw));
        }
        if !(0.0..=1.0).contains(&self.gen_prob) {
            return Err(ConfigError::ProbabilityOutOfRange(self.gen_prob));
        }
        if self.target_packets == 0 {
            return Err(ConfigError::ZeroTarget);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(SimConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_values() {
        let mut cfg = SimConfig::default();
        cfg.population = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyPopulation));

        let mut cfg = SimConfig::default();
        cfg.initial_cw = 1;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::ContentionWindowOutOfRange(1))
        );

        let mut cfg = SimConfig::default();
        cfg.initial_cw = 512;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::ContentionWindowOutOfRange(512))
        );

        let mut cfg = SimConfig::default();
        cfg.gen_prob = 1.5;
        assert_eq!(cfg.validate(), Err(ConfigError::ProbabilityOutOfRange(1.5)));

        let mut cfg = SimConfig::default();
        cfg.target_packets = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroTarget));
    }
}

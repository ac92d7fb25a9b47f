//! Host-level configuration.
//!
//! Both structs are plain serde data with defaults, so hosts can embed them
//! in whatever configuration format they already load. Missing fields take
//! their default values.

use serde::{Deserialize, Serialize};

/// How often a pass reports progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateInterval {
    /// Every `n` pixels
    Pixels(u64),
    /// Every time this fraction of the task (0, 1] has been processed
    Fraction(f64),
}

impl Default for UpdateInterval {
    fn default() -> Self {
        UpdateInterval::Fraction(0.1)
    }
}

impl UpdateInterval {
    /// Number of pixels between updates for a task of `total` pixels. Never 0.
    pub fn step(self, total: u64) -> u64 {
        let step = match self {
            UpdateInterval::Pixels(n) => n,
            UpdateInterval::Fraction(f) if f.is_finite() && f > 0.0 => {
                (total as f64 * f.min(1.0)).ceil() as u64
            }
            UpdateInterval::Fraction(_) => total,
        };
        step.max(1)
    }
}

/// Settings for runtime units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Seed for `rand` and `randInt`; drawn from the OS when absent
    pub seed: Option<u64>,
    /// Progress granularity used when a listener does not choose its own
    pub progress: UpdateInterval,
}

/// Settings for the [`Executor`](crate::executor::Executor) worker pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Worker threads; 0 lets the pool pick one per CPU
    pub threads: usize,
    /// Worker thread names are this prefix followed by the worker index
    pub thread_name_prefix: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            thread_name_prefix: "jiffle-worker-".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_steps() {
        assert_eq!(UpdateInterval::Pixels(16).step(100), 16);
        assert_eq!(UpdateInterval::Pixels(0).step(100), 1);
        assert_eq!(UpdateInterval::Fraction(0.1).step(100), 10);
        assert_eq!(UpdateInterval::Fraction(0.25).step(10), 3);
        assert_eq!(UpdateInterval::Fraction(5.0).step(10), 10);
        assert_eq!(UpdateInterval::Fraction(0.0).step(10), 10);
        assert_eq!(UpdateInterval::Fraction(0.5).step(0), 1);
    }

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.seed, None);
        assert_eq!(config.progress, UpdateInterval::Fraction(0.1));
        assert_eq!(ExecutorConfig::default().threads, 0);
    }
}

//! Run-level settings.

use crate::{SimError, SimResult};

/// Top-level simulation configuration.
///
/// Model constants, parameter profiles and random seeds belong to the model
/// builders; this only carries what the driver itself needs.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Seconds per iteration.  Must be finite and positive.
    pub dt: f64,

    /// Worker thread count passed to Rayon with the `parallel` feature.
    /// `None` uses the global pool.  Ignored without the feature.
    pub num_threads: Option<usize>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { dt: 0.01, num_threads: None }
    }
}

impl SimConfig {
    pub fn validate(&self) -> SimResult<()> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(SimError::Config(format!("dt must be finite and positive, got {}", self.dt)));
        }
        if self.num_threads == Some(0) {
            return Err(SimError::Config("num_threads must be at least 1".into()));
        }
        Ok(())
    }
}

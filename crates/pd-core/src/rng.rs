//! Deterministic tie-break RNG.
//!
//! # Determinism strategy
//!
//! A model that needs randomness on the hot path (the anticipation model's
//! side choice) must not share one mutable generator across agents: phase 1
//! of a tick may visit agents in any order or in parallel.  Instead each draw
//! gets a fresh `SmallRng` seeded by:
//!
//!   seed = model_seed XOR (agent_id * MIXING) XOR (epoch * MIXING²)
//!
//! where `epoch` is a per-agent counter persisted in the agent's payload and
//! bumped by every applied update.  This means:
//!
//! - Visiting order never changes which numbers an agent sees.
//! - Cloning a model (and its agents) forks an identical random future.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::AgentId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Short-lived generator for one agent in one epoch.
pub struct TieBreakRng(SmallRng);

impl TieBreakRng {
    pub fn new(model_seed: u64, agent: AgentId, epoch: u64) -> Self {
        let seed = model_seed
            ^ agent.0.wrapping_mul(MIXING_CONSTANT)
            ^ epoch.wrapping_mul(MIXING_CONSTANT).wrapping_mul(MIXING_CONSTANT);
        TieBreakRng(SmallRng::seed_from_u64(seed))
    }

    /// Fair coin.
    #[inline]
    pub fn coin(&mut self) -> bool {
        self.0.gen_bool(0.5)
    }
}

//! The `Simulation` struct: admission and the per-iteration loop.

use pd_agent::GenericAgent;
use pd_core::{AgentId, ParametersId, SimClock, Tick};
use pd_model::{Model, OperationalModel};
use pd_spatial::{PositionIndex, RTreeNeighborhood, SegmentGeometry};
use tracing::debug;

use crate::{OperationalDecisionSystem, SimConfig, SimError, SimObserver, SimResult};

#[cfg(feature = "fx-hash")]
type AgentIndex = rustc_hash::FxHashMap<AgentId, usize>;

#[cfg(not(feature = "fx-hash"))]
type AgentIndex = std::collections::HashMap<AgentId, usize>;

// ── Simulation ────────────────────────────────────────────────────────────────

/// A population of agents moving under one operational model inside fixed
/// walls.
///
/// Each [`iterate`](Self::iterate):
///
/// 1. rebuilds the neighborhood index from the current agents,
/// 2. runs the [`OperationalDecisionSystem`] (compute all, then apply all),
/// 3. advances the clock.
///
/// Agents are stored in admission order.  Every admitted agent has passed
/// [`OperationalDecisionSystem::validate_agent`] against the population at
/// the time.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Simulation {
    pub(crate) config:    SimConfig,
    pub(crate) clock:     SimClock,
    pub(crate) decision:  OperationalDecisionSystem<Model>,
    pub(crate) geometry:  SegmentGeometry,
    pub(crate) agents:    Vec<GenericAgent>,
    pub(crate) index:     AgentIndex,
    /// Admission index over `agents`.  Built on first use and extended by
    /// each admission; dropped whenever agents move or shift slots.
    pub(crate) positions: Option<PositionIndex>,
    #[cfg(feature = "parallel")]
    pub(crate) pool:      Option<rayon::ThreadPool>,
}

impl Simulation {
    // ── Population ────────────────────────────────────────────────────────

    /// Admit `agent`.
    ///
    /// The payload must belong to the active model and the profile must be
    /// known.  A zero orientation is pointed at the destination, then the
    /// model's constraints are checked against the agents already present.
    /// On error nothing changes.
    pub fn add_agent(&mut self, mut agent: GenericAgent) -> SimResult<AgentId> {
        let id = agent.id;
        if self.index.contains_key(&id) {
            return Err(SimError::DuplicateAgent(id));
        }

        let model = self.decision.model();
        model.validate_model_data(&agent.model)?;
        self.decision.validate_agent_parameters_id(agent.parameters_id)?;
        model.initialize_agent(&mut agent);

        let positions = self.positions.get_or_insert_with(|| PositionIndex::build(&self.agents));
        if let Err(e) = self.decision.validate_agent(&agent, &positions.over(&self.agents), &self.geometry) {
            debug!(agent = %id, pos = %agent.pos, error = %e, "agent rejected");
            return Err(e);
        }

        let slot = self.agents.len();
        positions.insert(slot, agent.pos);
        self.index.insert(id, slot);
        self.agents.push(agent);
        Ok(id)
    }

    /// Move agent `id` to the profile `parameters_id`.
    ///
    /// The new profile must exist and the agent must satisfy the model's
    /// constraints under it; otherwise the old profile is kept.
    pub fn switch_profile(&mut self, id: AgentId, parameters_id: ParametersId) -> SimResult<()> {
        let slot = self.slot(id)?;
        self.decision.validate_agent_parameters_id(parameters_id)?;

        let old = std::mem::replace(&mut self.agents[slot].parameters_id, parameters_id);
        let positions = self.positions.get_or_insert_with(|| PositionIndex::build(&self.agents));
        let checked = self.decision.validate_agent(&self.agents[slot], &positions.over(&self.agents), &self.geometry);
        if let Err(e) = checked {
            self.agents[slot].parameters_id = old;
            debug!(agent = %id, from = %old, to = %parameters_id, error = %e, "profile switch rejected");
            return Err(e);
        }
        Ok(())
    }

    /// Remove agent `id` and return it.
    pub fn remove_agent(&mut self, id: AgentId) -> SimResult<GenericAgent> {
        let slot = self.slot(id)?;
        self.index.remove(&id);
        self.positions = None;
        let removed = self.agents.remove(slot);
        for (i, agent) in self.agents.iter().enumerate().skip(slot) {
            self.index.insert(agent.id, i);
        }
        Ok(removed)
    }

    pub fn agent(&self, id: AgentId) -> Option<&GenericAgent> {
        self.index.get(&id).map(|&i| &self.agents[i])
    }

    /// Write access for the layers above the operational one (destination,
    /// waypoint, journey).  Moving the agent or changing its payload here
    /// bypasses admission.
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut GenericAgent> {
        self.positions = None;
        self.index.get(&id).map(|&i| &mut self.agents[i])
    }

    pub fn agents(&self) -> &[GenericAgent] {
        &self.agents
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    fn slot(&self, id: AgentId) -> SimResult<usize> {
        self.index.get(&id).copied().ok_or(SimError::AgentNotFound(id))
    }

    // ── Iteration ─────────────────────────────────────────────────────────

    /// Run one iteration.
    pub fn iterate<O: SimObserver>(&mut self, observer: &mut O) {
        let tick = self.clock.current_tick;
        observer.on_iteration_start(tick);

        let neighborhood = RTreeNeighborhood::build(&self.agents);
        self.decide(&neighborhood);
        self.positions = None;

        self.clock.advance();
        observer.on_iteration_end(tick, &self.agents);
    }

    #[cfg(not(feature = "parallel"))]
    fn decide(&mut self, neighborhood: &RTreeNeighborhood) {
        let (dt, t) = (self.clock.dt, self.clock.elapsed_time());
        self.decision.run(dt, t, neighborhood, &self.geometry, &mut self.agents);
    }

    #[cfg(feature = "parallel")]
    fn decide(&mut self, neighborhood: &RTreeNeighborhood) {
        let (dt, t) = (self.clock.dt, self.clock.elapsed_time());

        // Explicit field borrows so the borrow checker sees disjoint access.
        let decision = &self.decision;
        let geometry = &self.geometry;
        let agents = &mut self.agents;
        match &self.pool {
            Some(pool) => pool.install(|| decision.run(dt, t, neighborhood, geometry, agents)),
            None => decision.run(dt, t, neighborhood, geometry, agents),
        }
    }

    /// Run `n` iterations.
    pub fn run_iterations<O: SimObserver>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            self.iterate(observer);
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn model(&self) -> &Model {
        self.decision.model()
    }

    pub fn geometry(&self) -> &SegmentGeometry {
        &self.geometry
    }

    /// Number of completed iterations.
    pub fn iteration_count(&self) -> Tick {
        self.clock.current_tick
    }

    /// Simulated seconds since the first iteration.
    pub fn elapsed_time(&self) -> f64 {
        self.clock.elapsed_time()
    }
}

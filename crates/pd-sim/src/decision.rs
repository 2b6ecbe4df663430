//! The two-phase operational decision system.

use pd_agent::GenericAgent;
use pd_core::ParametersId;
use pd_model::{Model, ModelUpdate, OperationalModel};
use pd_spatial::{CollisionGeometry, NeighborhoodSearch};
use tracing::trace;

use crate::SimResult;

/// Runs one operational model over a whole population.
///
/// # Two phases
///
/// ```text
/// ① Compute: every agent's ModelUpdate against the frozen pre-iteration
///             agents and index; nothing is written.
/// ② Apply:   each agent receives exactly its own update.
/// ```
///
/// No agent can observe another's post-iteration state, so the outcome does
/// not depend on visiting order.  With the `parallel` feature both phases
/// run on Rayon's pool.
///
/// Neither phase validates.  Admission ([`validate_agent`](Self::validate_agent))
/// is the only gate; an agent that slips past it produces degenerate but
/// finite motion rather than an error.
#[derive(Clone, Debug)]
pub struct OperationalDecisionSystem<M: OperationalModel = Model> {
    model: M,
}

impl<M: OperationalModel> OperationalDecisionSystem<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Advance every agent by one iteration of length `dt` at simulated time
    /// `t`.
    ///
    /// `neighborhood` must have been built from `agents` as they are now.
    pub fn run(
        &self,
        dt:           f64,
        t:            f64,
        neighborhood: &dyn NeighborhoodSearch,
        geometry:     &dyn CollisionGeometry,
        agents:       &mut [GenericAgent],
    ) {
        trace!(agents = agents.len(), dt, t, "operational decision");

        let updates = self.compute_updates(dt, neighborhood, geometry, agents);
        self.apply_updates(updates, agents);
    }

    #[cfg(not(feature = "parallel"))]
    fn compute_updates(
        &self,
        dt:           f64,
        neighborhood: &dyn NeighborhoodSearch,
        geometry:     &dyn CollisionGeometry,
        agents:       &[GenericAgent],
    ) -> Vec<ModelUpdate> {
        agents
            .iter()
            .map(|agent| self.model.compute_new_position(dt, agent, geometry, neighborhood))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn compute_updates(
        &self,
        dt:           f64,
        neighborhood: &dyn NeighborhoodSearch,
        geometry:     &dyn CollisionGeometry,
        agents:       &[GenericAgent],
    ) -> Vec<ModelUpdate> {
        use rayon::prelude::*;

        agents
            .par_iter()
            .map(|agent| self.model.compute_new_position(dt, agent, geometry, neighborhood))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn apply_updates(&self, updates: Vec<ModelUpdate>, agents: &mut [GenericAgent]) {
        for (agent, update) in agents.iter_mut().zip(updates) {
            self.model.apply_update(update, agent);
        }
    }

    #[cfg(feature = "parallel")]
    fn apply_updates(&self, updates: Vec<ModelUpdate>, agents: &mut [GenericAgent]) {
        use rayon::prelude::*;

        agents
            .par_iter_mut()
            .zip(updates.into_par_iter())
            .for_each(|(agent, update)| self.model.apply_update(update, agent));
    }

    /// Fail fast if `id` is not one of the model's profiles.
    pub fn validate_agent_parameters_id(&self, id: ParametersId) -> SimResult<()> {
        Ok(self.model.validate_parameters_id(id)?)
    }

    /// Full admission check for `agent` against the current population:
    /// payload kind, profile id, then the model's constraints.
    pub fn validate_agent(
        &self,
        agent:        &GenericAgent,
        neighborhood: &dyn NeighborhoodSearch,
        geometry:     &dyn CollisionGeometry,
    ) -> SimResult<()> {
        self.model.validate_model_data(&agent.model)?;
        self.validate_agent_parameters_id(agent.parameters_id)?;
        self.model.check_model_constraint(agent, neighborhood, geometry)?;
        Ok(())
    }
}

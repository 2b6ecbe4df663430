//! The `OperationalModel` trait and the closed `Model` enum over its variants.

use pd_agent::{GenericAgent, ModelData, ModelType};
use pd_core::{ParametersId, Point};
use pd_spatial::{CollisionGeometry, NeighborhoodSearch};
use tracing::warn;

use crate::{
    AnticipationVelocityModel, CollisionFreeSpeedModel, GeneralizedCentrifugalForceModel,
    ModelError, ModelResult, ModelUpdate, SocialForceModel, VelocityModel,
};

/// Per-iteration motion law.
///
/// # Contract
///
/// - [`compute_new_position`](Self::compute_new_position) reads the agent,
///   its neighbors and nearby walls and returns a candidate next state.  It
///   mutates nothing, so it can run for all agents in parallel against one
///   frozen snapshot.
/// - [`apply_update`](Self::apply_update) is the only method that writes to
///   an agent.
/// - [`check_model_constraint`](Self::check_model_constraint) and
///   [`validate_parameters_id`](Self::validate_parameters_id) are admission
///   checks.  The per-iteration path never calls them and never fails.
/// - `Clone` forks the model with its profile table and random seed, so a
///   cloned simulation evolves identically.
pub trait OperationalModel: Clone + Send + Sync {
    fn model_type(&self) -> ModelType;

    fn compute_new_position(
        &self,
        dt:           f64,
        agent:        &GenericAgent,
        geometry:     &dyn CollisionGeometry,
        neighborhood: &dyn NeighborhoodSearch,
    ) -> ModelUpdate;

    fn apply_update(&self, update: ModelUpdate, agent: &mut GenericAgent);

    /// Check profile ranges, overlap with neighbors within 2 m and walls
    /// inside the agent's body.
    fn check_model_constraint(
        &self,
        agent:        &GenericAgent,
        neighborhood: &dyn NeighborhoodSearch,
        geometry:     &dyn CollisionGeometry,
    ) -> ModelResult<()>;

    /// `UnknownProfile` unless `id` names one of this model's profiles.
    fn validate_parameters_id(&self, id: ParametersId) -> ModelResult<()>;

    /// Fill in state an agent needs before its first update.
    ///
    /// The default points a zero orientation at the destination (or along +x
    /// if the agent already stands on it).
    fn initialize_agent(&self, agent: &mut GenericAgent) {
        face_destination(agent);
    }

    /// `ModelMismatch` unless the agent's payload belongs to this model.
    fn validate_model_data(&self, data: &ModelData) -> ModelResult<()> {
        let expected = self.model_type();
        let found = data.model_type();
        if expected != found {
            return Err(ModelError::ModelMismatch { expected, found });
        }
        Ok(())
    }
}

/// Point a zero orientation at the destination, or along +x if there is no
/// direction to it.
pub(crate) fn face_destination(agent: &mut GenericAgent) {
    if agent.orientation == Point::ZERO {
        let desired = agent.desired_direction();
        agent.orientation = if desired == Point::ZERO { Point::new(1.0, 0.0) } else { desired };
    }
}

/// Hot-path fallback for an agent whose profile or payload does not belong
/// to the model.  Admission rules this out; reaching it means the caller
/// bypassed the simulation's checks.
pub(crate) fn hold(model: ModelType, agent: &GenericAgent) -> ModelUpdate {
    warn!(
        agent = %agent.id,
        model = %model,
        payload = %agent.model_type(),
        parameters = %agent.parameters_id,
        "agent not valid for model, holding position"
    );
    ModelUpdate::Hold
}

/// `apply_update` counterpart of [`hold`].
pub(crate) fn skip_update(model: ModelType, update: &ModelUpdate, agent: &GenericAgent) {
    if *update != ModelUpdate::Hold {
        warn!(agent = %agent.id, model = %model, "update does not match agent payload, skipped");
    }
}

// ── Model ─────────────────────────────────────────────────────────────────────

/// The active operational model of a simulation.
#[derive(Clone, Debug)]
pub enum Model {
    CollisionFreeSpeed(CollisionFreeSpeedModel),
    GeneralizedCentrifugalForce(GeneralizedCentrifugalForceModel),
    Velocity(VelocityModel),
    SocialForce(SocialForceModel),
    AnticipationVelocity(AnticipationVelocityModel),
}

macro_rules! dispatch {
    ($self:ident, $m:ident => $body:expr) => {
        match $self {
            Model::CollisionFreeSpeed($m) => $body,
            Model::GeneralizedCentrifugalForce($m) => $body,
            Model::Velocity($m) => $body,
            Model::SocialForce($m) => $body,
            Model::AnticipationVelocity($m) => $body,
        }
    };
}

impl OperationalModel for Model {
    fn model_type(&self) -> ModelType {
        dispatch!(self, m => m.model_type())
    }

    fn compute_new_position(
        &self,
        dt:           f64,
        agent:        &GenericAgent,
        geometry:     &dyn CollisionGeometry,
        neighborhood: &dyn NeighborhoodSearch,
    ) -> ModelUpdate {
        dispatch!(self, m => m.compute_new_position(dt, agent, geometry, neighborhood))
    }

    fn apply_update(&self, update: ModelUpdate, agent: &mut GenericAgent) {
        dispatch!(self, m => m.apply_update(update, agent))
    }

    fn check_model_constraint(
        &self,
        agent:        &GenericAgent,
        neighborhood: &dyn NeighborhoodSearch,
        geometry:     &dyn CollisionGeometry,
    ) -> ModelResult<()> {
        dispatch!(self, m => m.check_model_constraint(agent, neighborhood, geometry))
    }

    fn validate_parameters_id(&self, id: ParametersId) -> ModelResult<()> {
        dispatch!(self, m => m.validate_parameters_id(id))
    }

    fn initialize_agent(&self, agent: &mut GenericAgent) {
        dispatch!(self, m => m.initialize_agent(agent))
    }
}

impl From<CollisionFreeSpeedModel> for Model {
    fn from(m: CollisionFreeSpeedModel) -> Self {
        Model::CollisionFreeSpeed(m)
    }
}

impl From<GeneralizedCentrifugalForceModel> for Model {
    fn from(m: GeneralizedCentrifugalForceModel) -> Self {
        Model::GeneralizedCentrifugalForce(m)
    }
}

impl From<VelocityModel> for Model {
    fn from(m: VelocityModel) -> Self {
        Model::Velocity(m)
    }
}

impl From<SocialForceModel> for Model {
    fn from(m: SocialForceModel) -> Self {
        Model::SocialForce(m)
    }
}

impl From<AnticipationVelocityModel> for Model {
    fn from(m: AnticipationVelocityModel) -> Self {
        Model::AnticipationVelocity(m)
    }
}

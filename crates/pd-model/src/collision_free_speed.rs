//! Collision-free speed model.
//!
//! A first-order model: the agent walks along the normalised sum of its
//! desired direction and exponential repulsions from visible neighbors and
//! walls, at the largest speed that keeps a time gap `T` to the nearest
//! neighbor in its corridor.

use pd_agent::{GenericAgent, ModelData, ModelType};
use pd_core::{ParametersId, Point};
use pd_spatial::{CollisionGeometry, NeighborhoodSearch};

use crate::constraint::{
    check_neighbor_clearance, check_range, check_range_exclusive_min, check_wall_clearance,
    require_non_negative, require_positive,
};
use crate::interaction::{
    DEFAULT_CUTOFF_RADIUS, boundary_repulsion, combined_direction, neighbor_repulsion,
    optimal_speed, spacing, visible_neighbors,
};
use crate::model::{hold, skip_update};
use crate::{CollisionFreeSpeedUpdate, ModelResult, ModelUpdate, OperationalModel, ProfileTable};

// ── Parameters ────────────────────────────────────────────────────────────────

/// Physical constants of one agent profile.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollisionFreeSpeedParameters {
    /// Body radius, `(0, 2]` m.
    pub radius:   f64,
    /// Desired speed, `[0, 10]` m/s.
    pub v0:       f64,
    /// Time gap, `[0.1, 10]` s.
    pub time_gap: f64,
}

impl Default for CollisionFreeSpeedParameters {
    fn default() -> Self {
        Self { radius: 0.2, v0: 1.2, time_gap: 1.0 }
    }
}

impl CollisionFreeSpeedParameters {
    pub fn validate(&self) -> ModelResult<()> {
        check_range_exclusive_min("radius", self.radius, 0.0, 2.0)?;
        check_range("v0", self.v0, 0.0, 10.0)?;
        check_range("time_gap", self.time_gap, 0.1, 10.0)
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Validating builder for [`CollisionFreeSpeedModel`].
#[derive(Clone, Debug)]
pub struct CollisionFreeSpeedBuilder {
    strength_neighbor_repulsion: f64,
    range_neighbor_repulsion:    f64,
    strength_geometry_repulsion: f64,
    range_geometry_repulsion:    f64,
    cutoff_radius:               f64,
    profiles:                    Vec<(ParametersId, CollisionFreeSpeedParameters)>,
}

impl Default for CollisionFreeSpeedBuilder {
    fn default() -> Self {
        Self {
            strength_neighbor_repulsion: 8.0,
            range_neighbor_repulsion:    0.1,
            strength_geometry_repulsion: 5.0,
            range_geometry_repulsion:    0.02,
            cutoff_radius:               DEFAULT_CUTOFF_RADIUS,
            profiles:                    Vec::new(),
        }
    }
}

impl CollisionFreeSpeedBuilder {
    pub fn new(
        strength_neighbor_repulsion: f64,
        range_neighbor_repulsion:    f64,
        strength_geometry_repulsion: f64,
        range_geometry_repulsion:    f64,
    ) -> Self {
        Self {
            strength_neighbor_repulsion,
            range_neighbor_repulsion,
            strength_geometry_repulsion,
            range_geometry_repulsion,
            ..Self::default()
        }
    }

    pub fn cutoff_radius(mut self, radius: f64) -> Self {
        self.cutoff_radius = radius;
        self
    }

    pub fn add_profile(mut self, id: ParametersId, parameters: CollisionFreeSpeedParameters) -> Self {
        self.profiles.push((id, parameters));
        self
    }

    pub fn build(self) -> ModelResult<CollisionFreeSpeedModel> {
        require_non_negative("strength_neighbor_repulsion", self.strength_neighbor_repulsion)?;
        require_positive("range_neighbor_repulsion", self.range_neighbor_repulsion)?;
        require_non_negative("strength_geometry_repulsion", self.strength_geometry_repulsion)?;
        require_positive("range_geometry_repulsion", self.range_geometry_repulsion)?;
        require_positive("cutoff_radius", self.cutoff_radius)?;

        let mut profiles = ProfileTable::new();
        for (id, p) in self.profiles {
            p.validate()?;
            profiles.insert(id, p)?;
        }

        Ok(CollisionFreeSpeedModel {
            strength_neighbor_repulsion: self.strength_neighbor_repulsion,
            range_neighbor_repulsion:    self.range_neighbor_repulsion,
            strength_geometry_repulsion: self.strength_geometry_repulsion,
            range_geometry_repulsion:    self.range_geometry_repulsion,
            cutoff_radius:               self.cutoff_radius,
            profiles,
        })
    }
}

// ── Model ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct CollisionFreeSpeedModel {
    strength_neighbor_repulsion: f64,
    range_neighbor_repulsion:    f64,
    strength_geometry_repulsion: f64,
    range_geometry_repulsion:    f64,
    cutoff_radius:               f64,
    profiles:                    ProfileTable<CollisionFreeSpeedParameters>,
}

impl CollisionFreeSpeedModel {
    pub fn builder() -> CollisionFreeSpeedBuilder {
        CollisionFreeSpeedBuilder::default()
    }

    pub fn profiles(&self) -> &ProfileTable<CollisionFreeSpeedParameters> {
        &self.profiles
    }

    fn radius_of(&self, agent: &GenericAgent) -> Option<f64> {
        self.profiles.get(agent.parameters_id).map(|p| p.radius)
    }
}

impl OperationalModel for CollisionFreeSpeedModel {
    fn model_type(&self) -> ModelType {
        ModelType::CollisionFreeSpeed
    }

    fn compute_new_position(
        &self,
        dt:           f64,
        agent:        &GenericAgent,
        geometry:     &dyn CollisionGeometry,
        neighborhood: &dyn NeighborhoodSearch,
    ) -> ModelUpdate {
        let (Some(p), ModelData::CollisionFreeSpeed(_)) = (self.profiles.get(agent.parameters_id), &agent.model)
        else {
            return hold(self.model_type(), agent);
        };

        let neighbors = visible_neighbors(agent, self.cutoff_radius, geometry, neighborhood);
        let boundary = geometry.segments_near(agent.pos);

        let neighbor_push: Point = neighbors
            .iter()
            .filter_map(|n| {
                let contact = p.radius + self.radius_of(n)?;
                Some(neighbor_repulsion(
                    agent.pos,
                    n.pos,
                    contact,
                    self.strength_neighbor_repulsion,
                    self.range_neighbor_repulsion,
                ))
            })
            .sum();
        let boundary_push: Point = boundary
            .iter()
            .map(|s| {
                boundary_repulsion(
                    agent.pos,
                    p.radius,
                    s,
                    self.strength_geometry_repulsion,
                    self.range_geometry_repulsion,
                )
            })
            .sum();

        let direction =
            combined_direction(agent.desired_direction(), neighbor_push + boundary_push, agent.orientation);

        let min_spacing = neighbors
            .iter()
            .filter_map(|n| Some(spacing(agent.pos, direction, n.pos, p.radius + self.radius_of(n)?)))
            .fold(f64::INFINITY, f64::min);
        let speed = optimal_speed(min_spacing, p.time_gap, p.v0);

        ModelUpdate::CollisionFreeSpeed(CollisionFreeSpeedUpdate {
            position:    agent.pos + direction * speed * dt,
            orientation: direction,
            speed,
        })
    }

    fn apply_update(&self, update: ModelUpdate, agent: &mut GenericAgent) {
        if let (ModelUpdate::CollisionFreeSpeed(u), ModelData::CollisionFreeSpeed(data)) = (update, &mut agent.model) {
            data.speed = u.speed;
            agent.pos = u.position;
            agent.orientation = u.orientation;
            return;
        }
        skip_update(self.model_type(), &update, agent);
    }

    fn check_model_constraint(
        &self,
        agent:        &GenericAgent,
        neighborhood: &dyn NeighborhoodSearch,
        geometry:     &dyn CollisionGeometry,
    ) -> ModelResult<()> {
        let p = self.profiles.require(agent.parameters_id)?;
        p.validate()?;
        check_neighbor_clearance(agent, neighborhood, |n| {
            Some((agent.pos - n.pos).norm() - (p.radius + self.radius_of(n)?))
        })?;
        check_wall_clearance(agent, geometry, p.radius)
    }

    fn validate_parameters_id(&self, id: ParametersId) -> ModelResult<()> {
        self.profiles.require(id).map(|_| ())
    }
}

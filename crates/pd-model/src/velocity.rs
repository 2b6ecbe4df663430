//! Velocity model with mollified desired direction.
//!
//! Same spacing and speed law as the collision-free speed model, but the
//! desired direction is a first-order lag `e0` of the direction to the
//! destination, which suppresses instantaneous turns.  The lag restarts when
//! the agent reaches its destination.

use pd_agent::{GenericAgent, ModelData, ModelType};
use pd_core::{J_EPS_GOAL, ParametersId, Point, mollify_e0};
use pd_spatial::{CollisionGeometry, NeighborhoodSearch};

use crate::constraint::{
    check_neighbor_clearance, check_range, check_range_exclusive_min, check_wall_clearance,
    require_non_negative, require_positive,
};
use crate::interaction::{
    DEFAULT_CUTOFF_RADIUS, boundary_repulsion, combined_direction, neighbor_repulsion,
    optimal_speed, spacing, visible_neighbors,
};
use crate::model::{face_destination, hold, skip_update};
use crate::{ModelResult, ModelUpdate, OperationalModel, ProfileTable, VelocityUpdate};

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VelocityParameters {
    /// `(0, 2]` m.
    pub radius:   f64,
    /// `[0, 10]` m/s.
    pub v0:       f64,
    /// `[0.1, 10]` s.
    pub time_gap: f64,
    /// Relaxation time of the heading lag, `[0.1, 10]` s.
    pub tau:      f64,
}

impl Default for VelocityParameters {
    fn default() -> Self {
        Self { radius: 0.2, v0: 1.2, time_gap: 1.0, tau: 0.5 }
    }
}

impl VelocityParameters {
    pub fn validate(&self) -> ModelResult<()> {
        check_range_exclusive_min("radius", self.radius, 0.0, 2.0)?;
        check_range("v0", self.v0, 0.0, 10.0)?;
        check_range("time_gap", self.time_gap, 0.1, 10.0)?;
        check_range("tau", self.tau, 0.1, 10.0)
    }
}

/// Validating builder for [`VelocityModel`].
#[derive(Clone, Debug)]
pub struct VelocityBuilder {
    a_ped:         f64,
    d_ped:         f64,
    a_wall:        f64,
    d_wall:        f64,
    cutoff_radius: f64,
    profiles:      Vec<(ParametersId, VelocityParameters)>,
}

impl Default for VelocityBuilder {
    fn default() -> Self {
        Self {
            a_ped:         8.0,
            d_ped:         0.1,
            a_wall:        5.0,
            d_wall:        0.02,
            cutoff_radius: DEFAULT_CUTOFF_RADIUS,
            profiles:      Vec::new(),
        }
    }
}

impl VelocityBuilder {
    /// Repulsion strength `a` and range `d` for pedestrians and walls.
    pub fn new(a_ped: f64, d_ped: f64, a_wall: f64, d_wall: f64) -> Self {
        Self { a_ped, d_ped, a_wall, d_wall, ..Self::default() }
    }

    pub fn cutoff_radius(mut self, radius: f64) -> Self {
        self.cutoff_radius = radius;
        self
    }

    pub fn add_profile(mut self, id: ParametersId, parameters: VelocityParameters) -> Self {
        self.profiles.push((id, parameters));
        self
    }

    pub fn build(self) -> ModelResult<VelocityModel> {
        require_non_negative("a_ped", self.a_ped)?;
        require_positive("d_ped", self.d_ped)?;
        require_non_negative("a_wall", self.a_wall)?;
        require_positive("d_wall", self.d_wall)?;
        require_positive("cutoff_radius", self.cutoff_radius)?;

        let mut profiles = ProfileTable::new();
        for (id, p) in self.profiles {
            p.validate()?;
            profiles.insert(id, p)?;
        }
        Ok(VelocityModel {
            a_ped:         self.a_ped,
            d_ped:         self.d_ped,
            a_wall:        self.a_wall,
            d_wall:        self.d_wall,
            cutoff_radius: self.cutoff_radius,
            profiles,
        })
    }
}

#[derive(Clone, Debug)]
pub struct VelocityModel {
    a_ped:         f64,
    d_ped:         f64,
    a_wall:        f64,
    d_wall:        f64,
    cutoff_radius: f64,
    profiles:      ProfileTable<VelocityParameters>,
}

impl VelocityModel {
    pub fn builder() -> VelocityBuilder {
        VelocityBuilder::default()
    }

    pub fn profiles(&self) -> &ProfileTable<VelocityParameters> {
        &self.profiles
    }

    fn radius_of(&self, agent: &GenericAgent) -> Option<f64> {
        self.profiles.get(agent.parameters_id).map(|p| p.radius)
    }
}

impl OperationalModel for VelocityModel {
    fn model_type(&self) -> ModelType {
        ModelType::Velocity
    }

    fn compute_new_position(
        &self,
        dt:           f64,
        agent:        &GenericAgent,
        geometry:     &dyn CollisionGeometry,
        neighborhood: &dyn NeighborhoodSearch,
    ) -> ModelUpdate {
        let (Some(p), ModelData::Velocity(data)) = (self.profiles.get(agent.parameters_id), &agent.model) else {
            return hold(self.model_type(), agent);
        };

        let at_goal = (agent.destination - agent.pos).norm() <= J_EPS_GOAL;
        let e0 = if at_goal {
            data.e0
        } else {
            mollify_e0(agent.destination, agent.pos, dt, data.orientation_delay, p.tau, data.e0)
        };

        let neighbors = visible_neighbors(agent, self.cutoff_radius, geometry, neighborhood);
        let neighbor_push: Point = neighbors
            .iter()
            .filter_map(|n| {
                let contact = p.radius + self.radius_of(n)?;
                Some(neighbor_repulsion(agent.pos, n.pos, contact, self.a_ped, self.d_ped))
            })
            .sum();
        // An agent standing on its destination ignores walls.
        let wall_push: Point = if at_goal {
            Point::ZERO
        } else {
            geometry
                .segments_near(agent.pos)
                .iter()
                .map(|s| boundary_repulsion(agent.pos, p.radius, s, self.a_wall, self.d_wall))
                .sum()
        };

        let direction = combined_direction(e0, neighbor_push + wall_push, agent.orientation);
        let min_spacing = neighbors
            .iter()
            .filter_map(|n| Some(spacing(agent.pos, direction, n.pos, p.radius + self.radius_of(n)?)))
            .fold(f64::INFINITY, f64::min);
        let speed = optimal_speed(min_spacing, p.time_gap, p.v0);

        ModelUpdate::Velocity(VelocityUpdate {
            position:      agent.pos + direction * speed * dt,
            orientation:   direction,
            speed,
            e0,
            reset_turning: at_goal,
        })
    }

    fn apply_update(&self, update: ModelUpdate, agent: &mut GenericAgent) {
        if let (ModelUpdate::Velocity(u), ModelData::Velocity(data)) = (update, &mut agent.model) {
            data.e0 = u.e0;
            data.speed = u.speed;
            data.orientation_delay = if u.reset_turning { 0 } else { data.orientation_delay.saturating_add(1) };
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

    /// Also seeds `e0` with the initial heading so the lag starts from it.
    fn initialize_agent(&self, agent: &mut GenericAgent) {
        face_destination(agent);
        if let ModelData::Velocity(data) = &mut agent.model {
            if data.e0 == Point::ZERO {
                data.e0 = agent.orientation;
            }
        }
    }
}

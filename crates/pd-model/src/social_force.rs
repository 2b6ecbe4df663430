//! Social force model.
//!
//! Second-order, circular bodies.  The acceleration combines a relaxation
//! toward `desired_speed · e_desired` with exponential social repulsion from
//! neighbors and walls.  On physical contact a body compression force and a
//! sliding friction along the contact tangent are added.

use pd_agent::{GenericAgent, ModelData, ModelType};
use pd_core::{LineSegment, ParametersId, Point};
use pd_spatial::{CollisionGeometry, NeighborhoodSearch};
use tracing::warn;

use crate::constraint::{
    check_neighbor_clearance, check_range, check_range_exclusive_min, check_wall_clearance,
    require_non_negative, require_positive,
};
use crate::interaction::{DEFAULT_CUTOFF_RADIUS, visible_neighbors};
use crate::model::{hold, skip_update};
use crate::{ModelResult, ModelUpdate, OperationalModel, ProfileTable, SocialForceUpdate};

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SocialForceParameters {
    /// kg, `> 0`.
    pub mass:           f64,
    /// m/s, `>= 0`.
    pub desired_speed:  f64,
    /// s, `> 0`.
    pub reaction_time:  f64,
    /// m, `> 0`.
    pub radius:         f64,
    /// Social repulsion strength between agents (N), `>= 0`.
    pub agent_scale:    f64,
    /// Social repulsion strength of walls (N), `>= 0`.
    pub obstacle_scale: f64,
    /// Range of both repulsions (m), `> 0`.
    pub force_distance: f64,
}

impl Default for SocialForceParameters {
    fn default() -> Self {
        Self {
            mass:           80.0,
            desired_speed:  0.8,
            reaction_time:  0.5,
            radius:         0.3,
            agent_scale:    2000.0,
            obstacle_scale: 2000.0,
            force_distance: 0.08,
        }
    }
}

impl SocialForceParameters {
    pub fn validate(&self) -> ModelResult<()> {
        check_range_exclusive_min("mass", self.mass, 0.0, f64::MAX)?;
        check_range("desired_speed", self.desired_speed, 0.0, f64::MAX)?;
        check_range_exclusive_min("reaction_time", self.reaction_time, 0.0, f64::MAX)?;
        check_range_exclusive_min("radius", self.radius, 0.0, f64::MAX)?;
        check_range("agent_scale", self.agent_scale, 0.0, f64::MAX)?;
        check_range("obstacle_scale", self.obstacle_scale, 0.0, f64::MAX)?;
        check_range_exclusive_min("force_distance", self.force_distance, 0.0, f64::MAX)
    }
}

/// Validating builder for [`SocialForceModel`].
#[derive(Clone, Debug)]
pub struct SocialForceBuilder {
    body_force:    f64,
    friction:      f64,
    cutoff_radius: f64,
    profiles:      Vec<(ParametersId, SocialForceParameters)>,
}

impl Default for SocialForceBuilder {
    fn default() -> Self {
        Self {
            body_force:    120_000.0,
            friction:      240_000.0,
            cutoff_radius: DEFAULT_CUTOFF_RADIUS,
            profiles:      Vec::new(),
        }
    }
}

impl SocialForceBuilder {
    /// Contact constants `k` (body compression, kg/s²) and `κ` (sliding
    /// friction, kg/(m·s)).
    pub fn new(body_force: f64, friction: f64) -> Self {
        Self { body_force, friction, ..Self::default() }
    }

    pub fn cutoff_radius(mut self, radius: f64) -> Self {
        self.cutoff_radius = radius;
        self
    }

    pub fn add_profile(mut self, id: ParametersId, parameters: SocialForceParameters) -> Self {
        self.profiles.push((id, parameters));
        self
    }

    pub fn build(self) -> ModelResult<SocialForceModel> {
        require_non_negative("body_force", self.body_force)?;
        require_non_negative("friction", self.friction)?;
        require_positive("cutoff_radius", self.cutoff_radius)?;

        let mut profiles = ProfileTable::new();
        for (id, p) in self.profiles {
            p.validate()?;
            profiles.insert(id, p)?;
        }
        Ok(SocialForceModel {
            body_force: self.body_force,
            friction: self.friction,
            cutoff_radius: self.cutoff_radius,
            profiles,
        })
    }
}

#[derive(Clone, Debug)]
pub struct SocialForceModel {
    body_force:    f64,
    friction:      f64,
    cutoff_radius: f64,
    profiles:      ProfileTable<SocialForceParameters>,
}

impl SocialForceModel {
    pub fn builder() -> SocialForceBuilder {
        SocialForceBuilder::default()
    }

    pub fn profiles(&self) -> &ProfileTable<SocialForceParameters> {
        &self.profiles
    }

    /// Force on a body at `pos` from a contact partner at `other`.
    ///
    /// `contact` is the touching distance and `relative_velocity` the
    /// partner's velocity relative to the body.
    fn contact_force(
        &self,
        pos:               Point,
        other:             Point,
        contact:           f64,
        strength:          f64,
        range:             f64,
        relative_velocity: Point,
    ) -> Point {
        let (distance, n) = (pos - other).norm_and_normalized();
        let t = n.rotate90();
        let overlap = contact - distance;

        let mut push = strength * (overlap / range).exp();
        let mut slide = 0.0;
        if overlap > 0.0 {
            push += self.body_force * overlap;
            slide = self.friction * overlap * relative_velocity.dot(t);
        }
        n * push + t * slide
    }

    fn agent_force(&self, me: &GenericAgent, p: &SocialForceParameters, other: &GenericAgent) -> Point {
        let Some(q) = self.profiles.get(other.parameters_id) else { return Point::ZERO };
        self.contact_force(
            me.pos,
            other.pos,
            p.radius + q.radius,
            p.agent_scale,
            p.force_distance,
            other.velocity() - me.velocity(),
        )
    }

    fn obstacle_force(&self, me: &GenericAgent, p: &SocialForceParameters, wall: &LineSegment) -> Point {
        // A wall does not move: the relative velocity is `−v`.
        self.contact_force(
            me.pos,
            wall.shortest_point(me.pos),
            p.radius,
            p.obstacle_scale,
            p.force_distance,
            -me.velocity(),
        )
    }
}

impl OperationalModel for SocialForceModel {
    fn model_type(&self) -> ModelType {
        ModelType::SocialForce
    }

    fn compute_new_position(
        &self,
        dt:           f64,
        agent:        &GenericAgent,
        geometry:     &dyn CollisionGeometry,
        neighborhood: &dyn NeighborhoodSearch,
    ) -> ModelUpdate {
        let (Some(p), ModelData::SocialForce(data)) = (self.profiles.get(agent.parameters_id), &agent.model) else {
            return hold(self.model_type(), agent);
        };

        let driving = (agent.desired_direction() * p.desired_speed - data.velocity) * (p.mass / p.reaction_time);
        let from_agents: Point = visible_neighbors(agent, self.cutoff_radius, geometry, neighborhood)
            .into_iter()
            .map(|n| self.agent_force(agent, p, n))
            .sum();
        let from_walls: Point =
            geometry.segments_near(agent.pos).iter().map(|w| self.obstacle_force(agent, p, w)).sum();

        let acceleration = (driving + from_agents + from_walls) / p.mass;
        let velocity = data.velocity + acceleration * dt;
        if !velocity.is_finite() {
            warn!(agent = %agent.id, ?from_agents, ?from_walls, "non-finite force, holding position");
            return ModelUpdate::Hold;
        }

        ModelUpdate::SocialForce(SocialForceUpdate { position: agent.pos + velocity * dt, velocity })
    }

    fn apply_update(&self, update: ModelUpdate, agent: &mut GenericAgent) {
        if let (ModelUpdate::SocialForce(u), ModelData::SocialForce(data)) = (update, &mut agent.model) {
            data.velocity = u.velocity;
            agent.pos = u.position;
            let heading = u.velocity.normalized();
            if heading != Point::ZERO {
                agent.orientation = heading;
            }
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
            let q = self.profiles.get(n.parameters_id)?;
            Some((agent.pos - n.pos).norm() - (p.radius + q.radius))
        })?;
        check_wall_clearance(agent, geometry, p.radius)
    }

    fn validate_parameters_id(&self, id: ParametersId) -> ModelResult<()> {
        self.profiles.require(id).map(|_| ())
    }
}

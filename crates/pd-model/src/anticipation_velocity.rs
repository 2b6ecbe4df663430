//! Anticipation velocity model.
//!
//! A first-order model in the spirit of the collision-free speed model, with
//! three changes:
//!
//! - Repulsion from a neighbor is computed on the gap expected after
//!   `anticipation_time` seconds and acts sideways, perpendicular to the
//!   desired direction, on the side away from where the neighbor will be.
//! - The walking direction turns toward the computed one with a first-order
//!   lag of `reaction_time`.
//! - The velocity is persisted so that the next step can anticipate with it.
//!
//! A neighbor predicted dead ahead is dodged to a random side.  The draw comes
//! from a [`TieBreakRng`] keyed on the model seed, the agent and the agent's
//! update epoch, so results do not depend on evaluation order.

use pd_agent::{GenericAgent, ModelData, ModelType};
use pd_core::{J_EPS, LineSegment, ParametersId, Point, TieBreakRng};
use pd_spatial::{CollisionGeometry, NeighborhoodSearch};

use crate::constraint::{
    check_neighbor_clearance, check_range, check_range_exclusive_min, check_wall_clearance,
    require_non_negative, require_positive,
};
use crate::interaction::{DEFAULT_CUTOFF_RADIUS, combined_direction, optimal_speed, spacing, visible_neighbors};
use crate::model::{hold, skip_update};
use crate::{AnticipationVelocityUpdate, ModelResult, ModelUpdate, OperationalModel, ProfileTable};

const ALIGNMENT_BASE: f64 = 1.0;
const ALIGNMENT_WEIGHT: f64 = 0.5;

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnticipationVelocityParameters {
    /// `(0, 2]` m.
    pub radius:            f64,
    /// `[0, 10]` m/s.
    pub v0:                f64,
    /// `[0.1, 10]` s.
    pub time_gap:          f64,
    /// Look-ahead of the repulsion, `[0, 5]` s.
    pub anticipation_time: f64,
    /// Turning lag, `[0.05, 1]` s.
    pub reaction_time:     f64,
}

impl Default for AnticipationVelocityParameters {
    fn default() -> Self {
        Self { radius: 0.2, v0: 1.2, time_gap: 1.06, anticipation_time: 1.0, reaction_time: 0.3 }
    }
}

impl AnticipationVelocityParameters {
    pub fn validate(&self) -> ModelResult<()> {
        check_range_exclusive_min("radius", self.radius, 0.0, 2.0)?;
        check_range("v0", self.v0, 0.0, 10.0)?;
        check_range("time_gap", self.time_gap, 0.1, 10.0)?;
        check_range("anticipation_time", self.anticipation_time, 0.0, 5.0)?;
        check_range("reaction_time", self.reaction_time, 0.05, 1.0)
    }
}

/// Validating builder for [`AnticipationVelocityModel`].
#[derive(Clone, Debug)]
pub struct AnticipationVelocityBuilder {
    strength_neighbor_repulsion: f64,
    range_neighbor_repulsion:    f64,
    strength_geometry_repulsion: f64,
    range_geometry_repulsion:    f64,
    cutoff_radius:               f64,
    seed:                        u64,
    profiles:                    Vec<(ParametersId, AnticipationVelocityParameters)>,
}

impl Default for AnticipationVelocityBuilder {
    fn default() -> Self {
        Self {
            strength_neighbor_repulsion: 8.0,
            range_neighbor_repulsion:    0.1,
            strength_geometry_repulsion: 5.0,
            range_geometry_repulsion:    0.02,
            cutoff_radius:               DEFAULT_CUTOFF_RADIUS,
            seed:                        42,
            profiles:                    Vec::new(),
        }
    }
}

impl AnticipationVelocityBuilder {
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

    /// Seed of the side-choice draws.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn cutoff_radius(mut self, radius: f64) -> Self {
        self.cutoff_radius = radius;
        self
    }

    pub fn add_profile(mut self, id: ParametersId, parameters: AnticipationVelocityParameters) -> Self {
        self.profiles.push((id, parameters));
        self
    }

    pub fn build(self) -> ModelResult<AnticipationVelocityModel> {
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
        Ok(AnticipationVelocityModel {
            strength_neighbor_repulsion: self.strength_neighbor_repulsion,
            range_neighbor_repulsion:    self.range_neighbor_repulsion,
            strength_geometry_repulsion: self.strength_geometry_repulsion,
            range_geometry_repulsion:    self.range_geometry_repulsion,
            cutoff_radius:               self.cutoff_radius,
            seed:                        self.seed,
            profiles,
        })
    }
}

#[derive(Clone, Debug)]
pub struct AnticipationVelocityModel {
    strength_neighbor_repulsion: f64,
    range_neighbor_repulsion:    f64,
    strength_geometry_repulsion: f64,
    range_geometry_repulsion:    f64,
    cutoff_radius:               f64,
    seed:                        u64,
    profiles:                    ProfileTable<AnticipationVelocityParameters>,
}

impl AnticipationVelocityModel {
    pub fn builder() -> AnticipationVelocityBuilder {
        AnticipationVelocityBuilder::default()
    }

    pub fn profiles(&self) -> &ProfileTable<AnticipationVelocityParameters> {
        &self.profiles
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn radius_of(&self, agent: &GenericAgent) -> Option<f64> {
        self.profiles.get(agent.parameters_id).map(|p| p.radius)
    }

    /// Unit vector perpendicular to `desired`, on the side facing away from
    /// `predicted`.  A tie is broken with `rng`.
    pub fn influence_direction(desired: Point, predicted: Point, rng: &mut TieBreakRng) -> Point {
        let orthogonal = desired.rotate90().normalized();
        let alignment = orthogonal.dot(predicted);
        if alignment.abs() < J_EPS {
            if rng.coin() { -orthogonal } else { orthogonal }
        } else if alignment > 0.0 {
            -orthogonal
        } else {
            orthogonal
        }
    }

    fn neighbor_repulsion(
        &self,
        agent:    &GenericAgent,
        p:        &AnticipationVelocityParameters,
        velocity: Point,
        other:    &GenericAgent,
        rng:      &mut TieBreakRng,
    ) -> Point {
        let (Some(q), ModelData::AnticipationVelocity(other_data)) =
            (self.profiles.get(other.parameters_id), &other.model)
        else {
            return Point::ZERO;
        };

        let between = other.pos - agent.pos;
        let (distance, ep12) = between.norm_and_normalized();
        let desired = agent.desired_direction();

        let perceived = desired.dot(ep12) >= 0.0 || agent.orientation.dot(ep12) >= 0.0;
        if !perceived {
            return Point::ZERO;
        }

        let gap = distance - (p.radius + q.radius);
        let anticipated_closing = (velocity - other_data.velocity).dot(ep12) * p.anticipation_time;
        let remaining = (gap - anticipated_closing).max(0.0);

        let alignment = ALIGNMENT_BASE + ALIGNMENT_WEIGHT * (1.0 - desired.dot(other.orientation));
        let strength = self.strength_neighbor_repulsion * alignment * (-remaining / self.range_neighbor_repulsion).exp();

        let predicted = between + other_data.velocity * q.anticipation_time;
        Self::influence_direction(desired, predicted, rng) * strength
    }

    fn boundary_repulsion(
        &self,
        agent: &GenericAgent,
        p:     &AnticipationVelocityParameters,
        wall:  &LineSegment,
        rng:   &mut TieBreakRng,
    ) -> Point {
        let closest = wall.shortest_point(agent.pos);
        let (distance, toward_wall) = (closest - agent.pos).norm_and_normalized();
        let desired = agent.desired_direction();

        // Behind the agent both by intent and by heading.
        if desired.dot(toward_wall) < 0.0 && agent.orientation.dot(toward_wall) < 0.0 {
            return Point::ZERO;
        }

        let strength =
            self.strength_geometry_repulsion * ((p.radius - distance) / self.range_geometry_repulsion).exp();
        Self::influence_direction(desired, toward_wall, rng) * strength
    }

    /// Turn from the current heading toward `computed` with a lag of
    /// `reaction_time`.  Turns through the desired direction are taken at
    /// once.
    pub fn smooth_direction(
        agent:         &GenericAgent,
        computed:      Point,
        reaction_time: f64,
        dt:            f64,
    ) -> Point {
        let desired = agent.desired_direction();
        let current = agent.orientation;
        let turned = if desired.dot(computed) * desired.dot(current) < 0.0 {
            computed
        } else {
            current + (computed.normalized() - current) * (dt / reaction_time)
        };
        let direction = turned.normalized();
        if direction == Point::ZERO { computed } else { direction }
    }
}

impl OperationalModel for AnticipationVelocityModel {
    fn model_type(&self) -> ModelType {
        ModelType::AnticipationVelocity
    }

    fn compute_new_position(
        &self,
        dt:           f64,
        agent:        &GenericAgent,
        geometry:     &dyn CollisionGeometry,
        neighborhood: &dyn NeighborhoodSearch,
    ) -> ModelUpdate {
        let (Some(p), ModelData::AnticipationVelocity(data)) =
            (self.profiles.get(agent.parameters_id), &agent.model)
        else {
            return hold(self.model_type(), agent);
        };
        let mut rng = TieBreakRng::new(self.seed, agent.id, data.tie_break_epoch);

        let neighbors = visible_neighbors(agent, self.cutoff_radius, geometry, neighborhood);
        let neighbor_push: Point = neighbors
            .iter()
            .map(|n| self.neighbor_repulsion(agent, p, data.velocity, n, &mut rng))
            .sum();
        let boundary_push: Point = geometry
            .segments_near(agent.pos)
            .iter()
            .map(|w| self.boundary_repulsion(agent, p, w, &mut rng))
            .sum();

        let computed = combined_direction(agent.desired_direction(), neighbor_push + boundary_push, agent.orientation);
        let direction = Self::smooth_direction(agent, computed, p.reaction_time, dt);

        let min_spacing = neighbors
            .iter()
            .filter_map(|n| Some(spacing(agent.pos, direction, n.pos, p.radius + self.radius_of(n)?)))
            .fold(f64::INFINITY, f64::min);
        let velocity = direction * optimal_speed(min_spacing, p.time_gap, p.v0);

        ModelUpdate::AnticipationVelocity(AnticipationVelocityUpdate {
            position: agent.pos + velocity * dt,
            orientation: direction,
            velocity,
        })
    }

    fn apply_update(&self, update: ModelUpdate, agent: &mut GenericAgent) {
        if let (ModelUpdate::AnticipationVelocity(u), ModelData::AnticipationVelocity(data)) =
            (update, &mut agent.model)
        {
            data.velocity = u.velocity;
            data.tie_break_epoch = data.tie_break_epoch.wrapping_add(1);
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

//! Generalized centrifugal force model.
//!
//! A second-order model.  Each agent is a speed-dependent ellipse (see
//! [`pd_core::EllipseShape`]).  The acceleration is
//!
//!   a = (F_driving + Σ F_pedestrian + Σ F_wall) / mass
//!
//! with a relaxation driving force toward the mollified desired direction
//! and centrifugal repulsions `∝ (ν·v0 + v_rel)² / d_eff` shaped by a
//! [`RepulsionLaw`].

use pd_agent::{GenericAgent, ModelData, ModelType};
use pd_core::{EllipseShape, J_EPS, J_EPS_GOAL, LineSegment, ParametersId, PlacedEllipse, Point, mollify_e0};
use pd_spatial::{CollisionGeometry, NeighborhoodSearch};
use tracing::warn;

use crate::constraint::{
    check_neighbor_clearance, check_range, check_wall_clearance, require_non_negative,
};
use crate::interaction::visible_neighbors;
use crate::model::{face_destination, hold, skip_update};
use crate::{
    GeneralizedCentrifugalForceUpdate, ModelResult, ModelUpdate, OperationalModel, ProfileTable,
    RepulsionLaw,
};

/// Neighbor query radius.
pub const GCFM_CUTOFF_RADIUS: f64 = 4.0;

/// Walls with a squared length below this are ignored.
const MIN_WALL_LENGTH_SQUARE: f64 = 0.01;

/// Speed above `v0` by more than this is reported as suspicious.
const SPEED_WARN_MARGIN: f64 = 1.5;

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneralizedCentrifugalForceParameters {
    /// `[1, 100]` kg.
    pub mass:  f64,
    /// Relaxation time, `[0.1, 10]` s.
    pub tau:   f64,
    /// `[0, 10]` m/s.
    pub v0:    f64,
    /// `[0, 10]` s.
    pub a_v:   f64,
    /// `[0.1, 1]` m.
    pub a_min: f64,
    /// `[0.1, 1]` m.
    pub b_min: f64,
    /// `[b_min, 2]` m.
    pub b_max: f64,
}

impl Default for GeneralizedCentrifugalForceParameters {
    fn default() -> Self {
        Self { mass: 1.0, tau: 0.5, v0: 1.2, a_v: 1.0, a_min: 0.2, b_min: 0.2, b_max: 0.4 }
    }
}

impl GeneralizedCentrifugalForceParameters {
    pub fn validate(&self) -> ModelResult<()> {
        check_range("mass", self.mass, 1.0, 100.0)?;
        check_range("tau", self.tau, 0.1, 10.0)?;
        check_range("v0", self.v0, 0.0, 10.0)?;
        check_range("a_v", self.a_v, 0.0, 10.0)?;
        check_range("a_min", self.a_min, 0.1, 1.0)?;
        check_range("b_min", self.b_min, 0.1, 1.0)?;
        check_range("b_max", self.b_max, self.b_min, 2.0)
    }

    /// Distance a wall must keep from the centre at admission: half the
    /// larger resting semi-axis.
    pub fn wall_clearance(&self) -> f64 {
        self.a_min.max(self.b_max) / 2.0
    }

    pub fn shape(&self) -> EllipseShape {
        EllipseShape { a_v: self.a_v, a_min: self.a_min, b_min: self.b_min, b_max: self.b_max }
    }
}

/// Validating builder for [`GeneralizedCentrifugalForceModel`].
#[derive(Clone, Debug)]
pub struct GeneralizedCentrifugalForceBuilder {
    strength_neighbor_repulsion: f64,
    strength_geometry_repulsion: f64,
    /// `(max_interaction_distance, interpolation_width, max_repulsion_force)`
    neighbor_law:                (f64, f64, f64),
    geometry_law:                (f64, f64, f64),
    profiles:                    Vec<(ParametersId, GeneralizedCentrifugalForceParameters)>,
}

impl Default for GeneralizedCentrifugalForceBuilder {
    fn default() -> Self {
        Self {
            strength_neighbor_repulsion: 0.3,
            strength_geometry_repulsion: 0.2,
            neighbor_law:                (2.0, 0.1, 3.0),
            geometry_law:                (2.0, 0.1, 3.0),
            profiles:                    Vec::new(),
        }
    }
}

impl GeneralizedCentrifugalForceBuilder {
    /// `ν` for pedestrians and walls.
    pub fn new(strength_neighbor_repulsion: f64, strength_geometry_repulsion: f64) -> Self {
        Self { strength_neighbor_repulsion, strength_geometry_repulsion, ..Self::default() }
    }

    pub fn neighbor_repulsion(
        mut self,
        max_interaction_distance: f64,
        interpolation_width:      f64,
        max_repulsion_force:      f64,
    ) -> Self {
        self.neighbor_law = (max_interaction_distance, interpolation_width, max_repulsion_force);
        self
    }

    pub fn geometry_repulsion(
        mut self,
        max_interaction_distance: f64,
        interpolation_width:      f64,
        max_repulsion_force:      f64,
    ) -> Self {
        self.geometry_law = (max_interaction_distance, interpolation_width, max_repulsion_force);
        self
    }

    pub fn add_profile(mut self, id: ParametersId, parameters: GeneralizedCentrifugalForceParameters) -> Self {
        self.profiles.push((id, parameters));
        self
    }

    pub fn build(self) -> ModelResult<GeneralizedCentrifugalForceModel> {
        require_non_negative("strength_neighbor_repulsion", self.strength_neighbor_repulsion)?;
        require_non_negative("strength_geometry_repulsion", self.strength_geometry_repulsion)?;
        let (d, w, f) = self.neighbor_law;
        let neighbor_law = RepulsionLaw::new(d, w, f)?;
        let (d, w, f) = self.geometry_law;
        let geometry_law = RepulsionLaw::new(d, w, f)?;

        let mut profiles = ProfileTable::new();
        for (id, p) in self.profiles {
            p.validate()?;
            profiles.insert(id, p)?;
        }
        Ok(GeneralizedCentrifugalForceModel {
            strength_neighbor_repulsion: self.strength_neighbor_repulsion,
            strength_geometry_repulsion: self.strength_geometry_repulsion,
            neighbor_law,
            geometry_law,
            profiles,
        })
    }
}

#[derive(Clone, Debug)]
pub struct GeneralizedCentrifugalForceModel {
    strength_neighbor_repulsion: f64,
    strength_geometry_repulsion: f64,
    neighbor_law:                RepulsionLaw,
    geometry_law:                RepulsionLaw,
    profiles:                    ProfileTable<GeneralizedCentrifugalForceParameters>,
}

/// What the force terms need to know about one agent.
struct Body<'a> {
    agent:    &'a GenericAgent,
    params:   &'a GeneralizedCentrifugalForceParameters,
    velocity: Point,
    ellipse:  PlacedEllipse,
}

impl GeneralizedCentrifugalForceModel {
    pub fn builder() -> GeneralizedCentrifugalForceBuilder {
        GeneralizedCentrifugalForceBuilder::default()
    }

    pub fn profiles(&self) -> &ProfileTable<GeneralizedCentrifugalForceParameters> {
        &self.profiles
    }

    fn body<'a>(&'a self, agent: &'a GenericAgent) -> Option<Body<'a>> {
        let params = self.profiles.get(agent.parameters_id)?;
        let ModelData::GeneralizedCentrifugalForce(data) = &agent.model else { return None };
        Some(Body {
            agent,
            params,
            velocity: agent.orientation * data.speed,
            ellipse: params.shape().place(agent.pos, agent.orientation, data.speed, params.v0),
        })
    }

    /// Effective (ellipse-to-ellipse) distance between two agents.
    pub fn agent_spacing(&self, a: &GenericAgent, b: &GenericAgent) -> Option<f64> {
        let (a, b) = (self.body(a)?, self.body(b)?);
        Some(a.ellipse.effective_distance(&b.ellipse).effective)
    }

    fn pedestrian_force(&self, me: &Body<'_>, other: &Body<'_>) -> Point {
        let dist_eff = me.ellipse.effective_distance(&other.ellipse).effective;
        if dist_eff >= self.neighbor_law.max_interaction_distance() {
            return Point::ZERO;
        }
        let (distance, ep12) = (other.agent.pos - me.agent.pos).norm_and_normalized();
        if distance < J_EPS {
            warn!(
                agent = %me.agent.id,
                neighbor = %other.agent.id,
                distance,
                "agents nearly coincide, pedestrian force skipped"
            );
            return Point::ZERO;
        }

        let v_ij = (me.velocity - other.velocity).dot(ep12).max(0.0);
        let speed = me.velocity.norm();
        let k_ij = if speed < J_EPS { 0.0 } else { me.velocity.dot(ep12).max(0.0) / speed };
        if k_ij < J_EPS {
            return Point::ZERO;
        }
        let nom = (self.strength_neighbor_repulsion * me.params.v0 + v_ij).powi(2);
        ep12 * self.neighbor_law.magnitude(dist_eff, me.params.mass * k_ij * nom)
    }

    fn wall_force(&self, me: &Body<'_>, wall: &LineSegment) -> Point {
        if wall.length_square() < MIN_WALL_LENGTH_SQUARE {
            return Point::ZERO;
        }
        let pos = me.agent.pos;
        let closest = wall.shortest_point(pos);
        // Only act perpendicular to the wall, i.e. not from its end points.
        if (wall.p1 - wall.p2).dot(pos - closest).abs() > J_EPS {
            return Point::ZERO;
        }

        let (d, e) = (closest - pos).norm_and_normalized();
        if d < J_EPS {
            return Point::ZERO;
        }
        let toward = me.velocity.dot(e);
        let speed = me.velocity.norm();
        if toward <= 0.0 || speed < J_EPS {
            return Point::ZERO;
        }
        let k = toward / speed;
        let vn = wall.normal_comp(me.velocity);
        let boundary = me.ellipse.point_on_ellipse(me.ellipse.to_local(closest));
        let r = (boundary - pos).norm();
        let nominator = (self.strength_geometry_repulsion * me.params.v0 + vn).powi(2) * k;
        e * self.geometry_law.magnitude(d - r, nominator)
    }
}

impl OperationalModel for GeneralizedCentrifugalForceModel {
    fn model_type(&self) -> ModelType {
        ModelType::GeneralizedCentrifugalForce
    }

    fn compute_new_position(
        &self,
        dt:           f64,
        agent:        &GenericAgent,
        geometry:     &dyn CollisionGeometry,
        neighborhood: &dyn NeighborhoodSearch,
    ) -> ModelUpdate {
        let (Some(me), ModelData::GeneralizedCentrifugalForce(data)) = (self.body(agent), &agent.model) else {
            return hold(self.model_type(), agent);
        };
        let p = me.params;

        let f_rep: Point = visible_neighbors(agent, GCFM_CUTOFF_RADIUS, geometry, neighborhood)
            .into_iter()
            .filter_map(|n| self.body(n))
            .map(|other| self.pedestrian_force(&me, &other))
            .sum();
        let f_wall: Point = geometry.segments_near(agent.pos).iter().map(|w| self.wall_force(&me, w)).sum();

        let at_goal = (agent.destination - agent.pos).norm() <= J_EPS_GOAL;
        let e0 = if at_goal {
            data.e0
        } else {
            mollify_e0(agent.destination, agent.pos, dt, data.orientation_delay, p.tau, data.e0)
        };
        let f_driv = (e0 * p.v0 - me.velocity) * p.mass / p.tau;

        let acc = (f_driv + f_rep + f_wall) / p.mass;
        let velocity = me.velocity + acc * dt;
        if !velocity.is_finite() {
            warn!(agent = %agent.id, ?f_rep, ?f_wall, "non-finite force, holding position");
            return ModelUpdate::Hold;
        }
        let speed = velocity.norm();
        if speed > p.v0 + SPEED_WARN_MARGIN {
            warn!(agent = %agent.id, speed, v0 = p.v0, "agent moving much faster than desired");
        }

        ModelUpdate::GeneralizedCentrifugalForce(GeneralizedCentrifugalForceUpdate {
            position: agent.pos + velocity * dt,
            velocity,
            e0,
            reset_turning: at_goal,
        })
    }

    fn apply_update(&self, update: ModelUpdate, agent: &mut GenericAgent) {
        if let (ModelUpdate::GeneralizedCentrifugalForce(u), ModelData::GeneralizedCentrifugalForce(data)) =
            (update, &mut agent.model)
        {
            data.e0 = u.e0;
            data.orientation_delay = if u.reset_turning { 0 } else { data.orientation_delay.saturating_add(1) };
            let (speed, heading) = u.velocity.norm_and_normalized();
            data.speed = speed;
            agent.pos = u.position;
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
        check_neighbor_clearance(agent, neighborhood, |n| self.agent_spacing(agent, n))?;
        check_wall_clearance(agent, geometry, p.wall_clearance())
    }

    fn validate_parameters_id(&self, id: ParametersId) -> ModelResult<()> {
        self.profiles.require(id).map(|_| ())
    }

    /// Also seeds `e0` with the initial heading.
    fn initialize_agent(&self, agent: &mut GenericAgent) {
        face_destination(agent);
        if let ModelData::GeneralizedCentrifugalForce(data) = &mut agent.model {
            if data.e0 == Point::ZERO {
                data.e0 = agent.orientation;
            }
        }
    }
}

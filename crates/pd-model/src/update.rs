//! Candidate next states produced by `compute_new_position`.
//!
//! An update is computed against a frozen snapshot and later applied as a
//! whole.  Each variant carries exactly what its model's `apply_update`
//! writes back.

use pd_core::Point;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CollisionFreeSpeedUpdate {
    pub position:    Point,
    pub orientation: Point,
    pub speed:       f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VelocityUpdate {
    pub position:      Point,
    pub orientation:   Point,
    pub speed:         f64,
    /// Mollified desired direction to persist.
    pub e0:            Point,
    /// The agent reached its destination: restart the orientation delay.
    pub reset_turning: bool,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeneralizedCentrifugalForceUpdate {
    pub position:      Point,
    pub velocity:      Point,
    pub e0:            Point,
    pub reset_turning: bool,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SocialForceUpdate {
    pub position: Point,
    pub velocity: Point,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AnticipationVelocityUpdate {
    pub position:    Point,
    pub orientation: Point,
    pub velocity:    Point,
}

/// One agent's next state under the active model.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ModelUpdate {
    /// Leave the agent untouched.
    Hold,
    CollisionFreeSpeed(CollisionFreeSpeedUpdate),
    Velocity(VelocityUpdate),
    GeneralizedCentrifugalForce(GeneralizedCentrifugalForceUpdate),
    SocialForce(SocialForceUpdate),
    AnticipationVelocity(AnticipationVelocityUpdate),
}

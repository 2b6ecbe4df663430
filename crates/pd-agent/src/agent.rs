//! The generic agent record.

use pd_core::{AgentId, JourneyId, ParametersId, Point, StageId};

use crate::data::{ModelData, ModelType};

/// A simulated pedestrian.
///
/// `destination` and `waypoint` are written by the tactical/strategic layer
/// before each iteration; the operational layer only reads them.  `pos`,
/// `orientation` and `model` are written exclusively by
/// `OperationalModel::apply_update`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenericAgent {
    pub id:            AgentId,
    pub journey_id:    JourneyId,
    pub stage_id:      StageId,
    /// Next local target point.
    pub destination:   Point,
    /// Longer-horizon target.
    pub waypoint:      Point,
    pub parameters_id: ParametersId,
    pub pos:           Point,
    /// Unit heading, or zero while the agent has never moved.
    pub orientation:   Point,
    pub model:         ModelData,
}

impl GenericAgent {
    #[inline]
    pub fn model_type(&self) -> ModelType {
        self.model.model_type()
    }

    #[inline]
    pub fn velocity(&self) -> Point {
        self.model.velocity(self.orientation)
    }

    /// Unit vector from `pos` toward `destination`, or zero if already there.
    #[inline]
    pub fn desired_direction(&self) -> Point {
        (self.destination - self.pos).normalized()
    }
}

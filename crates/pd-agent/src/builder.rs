//! Fluent builder for [`GenericAgent`].
//!
//! # Usage
//!
//! ```rust
//! use pd_agent::{AgentBuilder, ModelType};
//! use pd_core::{AgentId, ParametersId, Point};
//!
//! let agent = AgentBuilder::new(AgentId(1), ModelType::CollisionFreeSpeed)
//!     .position(Point::new(0.0, 0.0))
//!     .destination(Point::new(10.0, 0.0))
//!     .parameters(ParametersId(0))
//!     .build();
//!
//! assert_eq!(agent.waypoint, agent.destination);
//! assert_eq!(agent.orientation, Point::ZERO);
//! ```

use pd_core::{AgentId, JourneyId, ParametersId, Point, StageId};

use crate::{GenericAgent, ModelData, ModelType};

/// Fluent builder for [`GenericAgent`].
///
/// Unset fields fall back to: position and destination at the origin,
/// waypoint equal to the destination, zero orientation (the simulation points
/// it at the destination on admission), `INVALID` journey/stage ids,
/// `ParametersId(0)` and an at-rest payload for the chosen model.
pub struct AgentBuilder {
    id:            AgentId,
    journey_id:    JourneyId,
    stage_id:      StageId,
    destination:   Point,
    waypoint:      Option<Point>,
    parameters_id: ParametersId,
    pos:           Point,
    orientation:   Point,
    model:         ModelData,
}

impl AgentBuilder {
    pub fn new(id: AgentId, model: ModelType) -> Self {
        Self {
            id,
            journey_id:    JourneyId::INVALID,
            stage_id:      StageId::INVALID,
            destination:   Point::ZERO,
            waypoint:      None,
            parameters_id: ParametersId(0),
            pos:           Point::ZERO,
            orientation:   Point::ZERO,
            model:         ModelData::initial(model),
        }
    }

    pub fn position(mut self, pos: Point) -> Self {
        self.pos = pos;
        self
    }

    pub fn destination(mut self, destination: Point) -> Self {
        self.destination = destination;
        self
    }

    pub fn waypoint(mut self, waypoint: Point) -> Self {
        self.waypoint = Some(waypoint);
        self
    }

    pub fn journey(mut self, journey: JourneyId, stage: StageId) -> Self {
        self.journey_id = journey;
        self.stage_id = stage;
        self
    }

    pub fn parameters(mut self, id: ParametersId) -> Self {
        self.parameters_id = id;
        self
    }

    pub fn orientation(mut self, orientation: Point) -> Self {
        self.orientation = orientation.normalized();
        self
    }

    /// Replace the at-rest payload, e.g. to start an agent already walking.
    pub fn model_data(mut self, data: ModelData) -> Self {
        self.model = data;
        self
    }

    pub fn build(self) -> GenericAgent {
        GenericAgent {
            id:            self.id,
            journey_id:    self.journey_id,
            stage_id:      self.stage_id,
            destination:   self.destination,
            waypoint:      self.waypoint.unwrap_or(self.destination),
            parameters_id: self.parameters_id,
            pos:           self.pos,
            orientation:   self.orientation,
            model:         self.model,
        }
    }
}

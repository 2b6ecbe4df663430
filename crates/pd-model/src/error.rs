//! Model-subsystem error type.

use std::fmt;

use thiserror::Error;

use pd_agent::ModelType;
use pd_core::{AgentId, ParametersId, Point};

/// What a constraint check found wrong.
#[derive(Clone, Debug, PartialEq)]
pub enum Violation {
    /// Two agents overlap (or touch) under the model's body shape.
    TooCloseToAgent {
        agent:             AgentId,
        neighbor:          AgentId,
        position:          Point,
        neighbor_position: Point,
        /// Centre-to-centre distance.
        distance:          f64,
    },
    /// A wall lies inside the agent's body.
    TooCloseToWall { agent: AgentId, position: Point, radius: f64 },
    /// A profile parameter is outside its allowed range.
    ParameterOutOfRange {
        name:          &'static str,
        value:         f64,
        min:           f64,
        max:           f64,
        exclusive_min: bool,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::TooCloseToAgent { agent, neighbor, position, neighbor_position, distance } => {
                write!(
                    f,
                    "{agent} at {position} too close to {neighbor} at {neighbor_position}: distance {distance:.4}"
                )
            }
            Violation::TooCloseToWall { agent, position, radius } => {
                write!(f, "{agent} at {position} too close to geometry boundaries, distance <= {radius}")
            }
            Violation::ParameterOutOfRange { name, value, min, max, exclusive_min } => {
                let open = if *exclusive_min { '(' } else { '[' };
                write!(f, "{name} {value} not in allowed range {open}{min}, {max}]")
            }
        }
    }
}

/// Errors produced by `pd-model`.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model constraint violation: {0}")]
    ConstraintViolation(Violation),

    #[error("duplicate parameter profile {0}")]
    DuplicateProfile(ParametersId),

    #[error("unknown parameter profile {0}")]
    UnknownProfile(ParametersId),

    #[error("agent data for {found} does not match the active {expected} model")]
    ModelMismatch { expected: ModelType, found: ModelType },

    #[error("invalid model configuration: {0}")]
    InvalidConfig(String),
}

impl From<Violation> for ModelError {
    fn from(v: Violation) -> Self {
        ModelError::ConstraintViolation(v)
    }
}

pub type ModelResult<T> = Result<T, ModelError>;

use pd_core::AgentId;
use pd_model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("agent {0} is already part of the simulation")]
    DuplicateAgent(AgentId),

    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type SimResult<T> = Result<T, SimError>;

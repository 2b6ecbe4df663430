//! `pd-agent` — the pedestrian entity read and written by the operational layer.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                     |
//! |---------------|--------------------------------------------------------------|
//! | [`agent`]     | `GenericAgent` (identity, targets, kinematics, payload)      |
//! | [`data`]      | `ModelData` (closed payload enum), per-variant data, `ModelType` |
//! | [`builder`]   | `AgentBuilder` (fluent construction)                         |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                 |
//! |---------|--------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on all public types. |
//!
//! An agent carries no physical constants: radius, desired speed and the like
//! live in the active model's parameter profiles and are referenced through
//! `GenericAgent::parameters_id`.  The payload only holds state that evolves
//! from tick to tick.

pub mod agent;
pub mod builder;
pub mod data;


pub use agent::GenericAgent;
pub use builder::AgentBuilder;
pub use data::{
    AnticipationVelocityData, CollisionFreeSpeedData, GeneralizedCentrifugalForceData, ModelData,
    ModelType, SocialForceData, VelocityData,
};

//! `pd-model` — the operational decision layer's motion laws.
//!
//! An operational model turns an agent's current state, its visible
//! neighbors and nearby walls into the agent's next position.  Every model
//! implements [`OperationalModel`]; a simulation runs exactly one of them,
//! held in the closed [`Model`] enum.
//!
//! | Model                                 | Order  | Body    | Notes                                  |
//! |---------------------------------------|--------|---------|----------------------------------------|
//! | [`CollisionFreeSpeedModel`]           | first  | circle  | exponential repulsion, time-gap speed  |
//! | [`VelocityModel`]                     | first  | circle  | as above with mollified heading        |
//! | [`GeneralizedCentrifugalForceModel`]  | second | ellipse | centrifugal forces, [`RepulsionLaw`]   |
//! | [`SocialForceModel`]                  | second | circle  | social, body and friction forces       |
//! | [`AnticipationVelocityModel`]         | first  | circle  | anticipated gaps, lagged turning       |
//!
//! Physical constants live in per-model [`ProfileTable`]s keyed by
//! `ParametersId`.  An agent's payload (`pd_agent::ModelData`) holds only the
//! state that changes from step to step.
//!
//! # Crate layout
//!
//! | Module                    | Contents                                                 |
//! |---------------------------|----------------------------------------------------------|
//! | [`model`]                 | `OperationalModel` trait, `Model` enum                   |
//! | [`update`]                | `ModelUpdate` and the per-model update structs           |
//! | [`profile`]               | `ProfileTable<P>`                                        |
//! | [`repulsion`]             | `RepulsionLaw` (piecewise Hermite-smoothed `−n/d`)       |
//! | [`interaction`]           | neighbor filtering, exponential repulsion, spacing       |
//! | [`constraint`]            | admission checks shared by the models                    |
//! | [`collision_free_speed`]  | collision-free speed model                               |
//! | [`velocity`]              | velocity model                                           |
//! | [`gcfm`]                  | generalized centrifugal force model                      |
//! | [`social_force`]          | social force model                                       |
//! | [`anticipation_velocity`] | anticipation velocity model                              |
//! | [`error`]                 | `ModelError`, `Violation`, `ModelResult<T>`              |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                   |
//! |-----------|----------------------------------------------------------|
//! | `fx-hash` | `FxHashMap` behind `ProfileTable`.                       |
//! | `serde`   | `Serialize`/`Deserialize` on the parameter structs.      |

pub mod anticipation_velocity;
pub mod collision_free_speed;
pub mod constraint;
pub mod error;
pub mod gcfm;
pub mod interaction;
pub mod model;
pub mod profile;
pub mod repulsion;
pub mod social_force;
pub mod update;
pub mod velocity;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use anticipation_velocity::{
    AnticipationVelocityBuilder, AnticipationVelocityModel, AnticipationVelocityParameters,
};
pub use collision_free_speed::{
    CollisionFreeSpeedBuilder, CollisionFreeSpeedModel, CollisionFreeSpeedParameters,
};
pub use error::{ModelError, ModelResult, Violation};
pub use gcfm::{
    GeneralizedCentrifugalForceBuilder, GeneralizedCentrifugalForceModel,
    GeneralizedCentrifugalForceParameters,
};
pub use model::{Model, OperationalModel};
pub use profile::ProfileTable;
pub use repulsion::{CONTACT_DISTANCE, RepulsionLaw};
pub use social_force::{SocialForceBuilder, SocialForceModel, SocialForceParameters};
pub use update::{
    AnticipationVelocityUpdate, CollisionFreeSpeedUpdate, GeneralizedCentrifugalForceUpdate,
    ModelUpdate, SocialForceUpdate, VelocityUpdate,
};
pub use velocity::{VelocityBuilder, VelocityModel, VelocityParameters};

//! `pd-sim` — iteration driver for the rust_pd framework.
//!
//! # Two-phase iteration
//!
//! ```text
//! for each iteration:
//!   ① Index:    rebuild the neighborhood R-tree from the current agents.
//!   ② Compute:  OperationalModel::compute_new_position for every agent
//!                against the frozen snapshot (parallel with `parallel`).
//!   ③ Apply:    OperationalModel::apply_update, one update per agent
//!                (parallel with `parallel`).
//!   ④ Clock:    advance by dt.
//! ```
//!
//! Validation happens only when an agent is admitted
//! ([`Simulation::add_agent`]) or switches profile
//! ([`Simulation::switch_profile`]).  The iteration itself cannot fail.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                       |
//! |------------|--------------------------------------------------------------|
//! | `parallel` | Runs both phases on Rayon's pool (`SimConfig::num_threads`). |
//! | `fx-hash`  | FxHash for the agent index and the model's profile tables.   |
//! | `serde`    | `Serialize`/`Deserialize` on `SimConfig` and the data types. |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use pd_agent::{AgentBuilder, ModelType};
//! use pd_core::{AgentId, ParametersId, Point};
//! use pd_model::{CollisionFreeSpeedModel, CollisionFreeSpeedParameters};
//! use pd_sim::{NoopObserver, SimBuilder, SimConfig};
//!
//! let model = CollisionFreeSpeedModel::builder()
//!     .add_profile(ParametersId(0), CollisionFreeSpeedParameters::default())
//!     .build()?;
//! let mut sim = SimBuilder::new(SimConfig::default(), model).build()?;
//! sim.add_agent(
//!     AgentBuilder::new(AgentId(0), ModelType::CollisionFreeSpeed)
//!         .destination(Point::new(10.0, 0.0))
//!         .build(),
//! )?;
//! sim.run_iterations(100, &mut NoopObserver);
//! ```

pub mod builder;
pub mod config;
pub mod decision;
pub mod error;
pub mod observer;
pub mod sim;


pub use builder::SimBuilder;
pub use config::SimConfig;
pub use decision::OperationalDecisionSystem;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use sim::Simulation;

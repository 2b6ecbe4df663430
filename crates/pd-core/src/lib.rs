//! `pd-core` — foundational types for the `rust_pd` pedestrian dynamics framework.
//!
//! This crate is a dependency of every other `pd-*` crate.  It intentionally
//! has no `pd-*` dependencies and minimal external ones (only `rand`, plus
//! optional `serde`).  Everything here is pure math or plain data: no state
//! survives a function call.
//!
//! # What lives here
//!
//! | Module          | Contents                                                    |
//! |-----------------|-------------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `ParametersId`, `JourneyId`, `StageId`           |
//! | [`geometry`]    | `Point` vector algebra, `LineSegment`                       |
//! | [`ellipse`]     | `EllipseShape`, `PlacedEllipse`, effective distance         |
//! | [`math`]        | `hermite_interp`, `mollify_e0`, numeric epsilons            |
//! | [`time`]        | `Tick`, `SimClock`                                          |
//! | [`rng`]         | `TieBreakRng` (seeded, per agent and epoch)                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public data types.   |

pub mod ellipse;
pub mod geometry;
pub mod ids;
pub mod math;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use ellipse::{EffectiveDistance, EllipseShape, PlacedEllipse};
pub use geometry::{LineSegment, Point};
pub use ids::{AgentId, JourneyId, ParametersId, StageId};
pub use math::{J_EPS, J_EPS_GOAL, hermite_interp, mollify_e0};
pub use rng::TieBreakRng;
pub use time::{SimClock, Tick};

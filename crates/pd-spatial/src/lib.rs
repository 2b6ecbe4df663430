//! `pd-spatial` — spatial queries consumed by the operational layer.
//!
//! The operational models never own a spatial index.  They read two
//! read-only collaborators that the simulation rebuilds before each
//! iteration:
//!
//! - [`NeighborhoodSearch`]: agents within a radius of a point.
//! - [`CollisionGeometry`]: wall segments near a point, and line-of-sight
//!   tests between two points.
//!
//! Both traits are `Sync` so phase 1 of an iteration may query them from many
//! threads at once.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                  |
//! |------------------|-----------------------------------------------------------|
//! | [`neighborhood`] | `NeighborhoodSearch` trait, `RTreeNeighborhood`, `PositionIndex` |
//! | [`geometry`]     | `CollisionGeometry` trait, `SegmentGeometry`              |
//! | [`error`]        | `SpatialError`, `SpatialResult<T>`                        |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Propagates `Serialize`/`Deserialize` to the core types.      |

pub mod error;
pub mod geometry;
pub mod neighborhood;


pub use error::{SpatialError, SpatialResult};
pub use geometry::{APPROX_SEARCH_RADIUS, CollisionGeometry, SegmentGeometry};
pub use neighborhood::{IndexedAgents, NeighborhoodSearch, PositionIndex, RTreeNeighborhood};

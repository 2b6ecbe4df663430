//! Neighbor and wall interaction building blocks shared by the models.
//!
//! The speed-clamped models (collision-free speed, velocity, anticipation
//! velocity) all follow the same shape: sum exponential repulsions into the
//! desired direction, normalise, then pick a speed from the smallest spacing
//! to a neighbor in the walking corridor.

use pd_agent::GenericAgent;
use pd_core::{LineSegment, Point};
use pd_spatial::{CollisionGeometry, NeighborhoodSearch};

/// Default neighbor query radius of the speed-clamped and social force models.
pub const DEFAULT_CUTOFF_RADIUS: f64 = 3.0;

/// Neighbors within `cutoff` of `agent` that it can see.
///
/// The agent itself and every neighbor hidden behind a wall are dropped.
/// The result is sorted by id so that sums over it, and random draws made
/// while walking it, do not depend on the index's internal order.
pub fn visible_neighbors<'a>(
    agent:        &GenericAgent,
    cutoff:       f64,
    geometry:     &dyn CollisionGeometry,
    neighborhood: &'a dyn NeighborhoodSearch,
) -> Vec<&'a GenericAgent> {
    let mut visible: Vec<&GenericAgent> = neighborhood
        .neighbors_within(agent.pos, cutoff)
        .into_iter()
        .filter(|n| n.id != agent.id)
        .filter(|n| !geometry.intersects_any(&LineSegment::new(agent.pos, n.pos)))
        .collect();
    visible.sort_unstable_by_key(|n| n.id);
    visible
}

/// `strength · exp((contact − distance) / range)`.
#[inline]
pub fn exp_repulsion(strength: f64, range: f64, contact: f64, distance: f64) -> f64 {
    strength * ((contact - distance) / range).exp()
}

/// Push on an agent at `pos` away from a neighbor at `other`.
pub fn neighbor_repulsion(pos: Point, other: Point, contact: f64, strength: f64, range: f64) -> Point {
    let (distance, direction) = (other - pos).norm_and_normalized();
    direction * -exp_repulsion(strength, range, contact, distance)
}

/// Push on an agent at `pos` away from the closest point of `segment`.
pub fn boundary_repulsion(pos: Point, radius: f64, segment: &LineSegment, strength: f64, range: f64) -> Point {
    let closest = segment.shortest_point(pos);
    let (distance, toward_wall) = (closest - pos).norm_and_normalized();
    toward_wall * -exp_repulsion(strength, range, radius, distance)
}

/// `normalize(desired + repulsion)`, falling back to `orientation` when the
/// sum vanishes.
#[inline]
pub fn combined_direction(desired: Point, repulsion: Point, orientation: Point) -> Point {
    let direction = (desired + repulsion).normalized();
    if direction == Point::ZERO { orientation } else { direction }
}

/// Free space in front of an agent at `pos` walking along `direction`
/// toward a neighbor at `other`.
///
/// Returns `distance − contact` if the neighbor is ahead (non-negative
/// projection on `direction`) and inside the corridor of half-width
/// `contact`; otherwise `f64::INFINITY`.
pub fn spacing(pos: Point, direction: Point, other: Point, contact: f64) -> f64 {
    let between = other - pos;
    if direction.dot(between) < 0.0 {
        return f64::INFINITY;
    }
    if direction.rotate90().dot(between).abs() > contact {
        return f64::INFINITY;
    }
    between.norm() - contact
}

/// Optimal-speed law: `clamp(spacing / time_gap, 0, v0)`.
#[inline]
pub fn optimal_speed(spacing: f64, time_gap: f64, v0: f64) -> f64 {
    (spacing / time_gap).max(0.0).min(v0)
}

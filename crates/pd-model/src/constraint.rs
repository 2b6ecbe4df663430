//! Admission-time checks shared by all models.
//!
//! None of these run on the per-iteration path.  The hot path trusts that an
//! admitted agent satisfied them; if an agent is later pushed into an invalid
//! configuration the models produce large but finite forces rather than an
//! error.

use pd_agent::GenericAgent;
use pd_spatial::{CollisionGeometry, NeighborhoodSearch};
use tracing::debug;

use crate::{ModelError, ModelResult, Violation};

/// Radius within which neighbors are tested for overlap.
pub const CONSTRAINT_NEIGHBOR_RADIUS: f64 = 2.0;

/// `min <= value <= max`.
pub fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> ModelResult<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(Violation::ParameterOutOfRange { name, value, min, max, exclusive_min: false }.into());
    }
    Ok(())
}

/// `min < value <= max`.
pub fn check_range_exclusive_min(name: &'static str, value: f64, min: f64, max: f64) -> ModelResult<()> {
    if !value.is_finite() || value <= min || value > max {
        return Err(Violation::ParameterOutOfRange { name, value, min, max, exclusive_min: true }.into());
    }
    Ok(())
}

/// Fail if any other agent within [`CONSTRAINT_NEIGHBOR_RADIUS`] has a
/// non-positive `gap` to `agent`.
///
/// `gap` returns the surface-to-surface distance under the model's body
/// shape, or `None` to skip a neighbor the model cannot judge.
pub fn check_neighbor_clearance<F>(
    agent:        &GenericAgent,
    neighborhood: &dyn NeighborhoodSearch,
    mut gap:      F,
) -> ModelResult<()>
where
    F: FnMut(&GenericAgent) -> Option<f64>,
{
    for neighbor in neighborhood.neighbors_within(agent.pos, CONSTRAINT_NEIGHBOR_RADIUS) {
        if neighbor.id == agent.id {
            continue;
        }
        let Some(g) = gap(neighbor) else { continue };
        if g <= 0.0 {
            let distance = (agent.pos - neighbor.pos).norm();
            debug!(agent = %agent.id, neighbor = %neighbor.id, distance, gap = g, "agent overlap");
            return Err(Violation::TooCloseToAgent {
                agent:             agent.id,
                neighbor:          neighbor.id,
                position:          agent.pos,
                neighbor_position: neighbor.pos,
                distance,
            }
            .into());
        }
    }
    Ok(())
}

/// Fail if any wall comes within `radius` of the agent's centre.
pub fn check_wall_clearance(agent: &GenericAgent, geometry: &dyn CollisionGeometry, radius: f64) -> ModelResult<()> {
    if !geometry.segments_within(radius, agent.pos).is_empty() {
        debug!(agent = %agent.id, radius, "wall inside agent body");
        return Err(Violation::TooCloseToWall { agent: agent.id, position: agent.pos, radius }.into());
    }
    Ok(())
}

/// Builder check for a model-wide constant that must be finite and `> 0`.
pub(crate) fn require_positive(name: &str, value: f64) -> ModelResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ModelError::InvalidConfig(format!("{name} must be positive, got {value}")));
    }
    Ok(())
}

/// Builder check for a model-wide constant that must be finite and `>= 0`.
pub(crate) fn require_non_negative(name: &str, value: f64) -> ModelResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ModelError::InvalidConfig(format!("{name} must be non-negative, got {value}")));
    }
    Ok(())
}

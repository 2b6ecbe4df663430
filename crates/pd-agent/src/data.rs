//! Per-model agent payloads.
//!
//! `ModelData` is a closed sum over the five operational models.  A
//! simulation checks the tag once when an agent is admitted; afterwards the
//! model may rely on it.

use std::fmt;

use pd_core::Point;

// ── ModelType ─────────────────────────────────────────────────────────────────

/// Tag identifying an operational model variant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModelType {
    CollisionFreeSpeed,
    GeneralizedCentrifugalForce,
    Velocity,
    SocialForce,
    AnticipationVelocity,
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ModelType::CollisionFreeSpeed => "CollisionFreeSpeed",
            ModelType::GeneralizedCentrifugalForce => "GeneralizedCentrifugalForce",
            ModelType::Velocity => "Velocity",
            ModelType::SocialForce => "SocialForce",
            ModelType::AnticipationVelocity => "AnticipationVelocity",
        };
        f.write_str(s)
    }
}

// ── Variant payloads ──────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollisionFreeSpeedData {
    /// Scalar speed chosen in the last applied update.
    pub speed: f64,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VelocityData {
    /// Mollified desired direction.
    pub e0:                Point,
    /// Ticks since the agent last reached its destination.
    pub orientation_delay: u32,
    pub speed:             f64,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneralizedCentrifugalForceData {
    /// Magnitude of the velocity; the direction is `GenericAgent::orientation`.
    pub speed:             f64,
    pub e0:                Point,
    pub orientation_delay: u32,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SocialForceData {
    pub velocity: Point,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnticipationVelocityData {
    pub velocity:       Point,
    /// Number of updates applied so far; selects the tie-break RNG stream.
    pub tie_break_epoch: u64,
}

// ── ModelData ─────────────────────────────────────────────────────────────────

/// Mutable per-agent state owned by the active operational model.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModelData {
    CollisionFreeSpeed(CollisionFreeSpeedData),
    GeneralizedCentrifugalForce(GeneralizedCentrifugalForceData),
    Velocity(VelocityData),
    SocialForce(SocialForceData),
    AnticipationVelocity(AnticipationVelocityData),
}

impl ModelData {
    pub fn model_type(&self) -> ModelType {
        match self {
            ModelData::CollisionFreeSpeed(_) => ModelType::CollisionFreeSpeed,
            ModelData::GeneralizedCentrifugalForce(_) => ModelType::GeneralizedCentrifugalForce,
            ModelData::Velocity(_) => ModelType::Velocity,
            ModelData::SocialForce(_) => ModelType::SocialForce,
            ModelData::AnticipationVelocity(_) => ModelType::AnticipationVelocity,
        }
    }

    /// Fresh, at-rest payload for `model`.
    pub fn initial(model: ModelType) -> ModelData {
        match model {
            ModelType::CollisionFreeSpeed => ModelData::CollisionFreeSpeed(Default::default()),
            ModelType::GeneralizedCentrifugalForce => {
                ModelData::GeneralizedCentrifugalForce(Default::default())
            }
            ModelType::Velocity => ModelData::Velocity(Default::default()),
            ModelType::SocialForce => ModelData::SocialForce(Default::default()),
            ModelType::AnticipationVelocity => ModelData::AnticipationVelocity(Default::default()),
        }
    }

    /// Current velocity, using `orientation` for the models that store only
    /// a scalar speed.
    pub fn velocity(&self, orientation: Point) -> Point {
        match self {
            ModelData::CollisionFreeSpeed(d) => orientation * d.speed,
            ModelData::GeneralizedCentrifugalForce(d) => orientation * d.speed,
            ModelData::Velocity(d) => orientation * d.speed,
            ModelData::SocialForce(d) => d.velocity,
            ModelData::AnticipationVelocity(d) => d.velocity,
        }
    }
}

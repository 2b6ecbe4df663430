//! Piecewise, Hermite-smoothed repulsion magnitude.
//!
//! The centrifugal force law `−n / d` diverges at contact and has no natural
//! cutoff.  It is tamed with five distance regimes:
//!
//! ```text
//!          smax     left                 right        max
//!   --------|---------|--------------------|------------|-------->  d_eff
//!      5    |    4    |          3         |      2     |    1
//! ```
//!
//! 1. `d ≥ max`: zero.
//! 2. `right ≤ d < max`: cubic Hermite from the exact law down to zero.
//! 3. `left ≤ d < right`: the exact law `−n / d`.
//! 4. `smax < d < left`: cubic Hermite from the exact law up to the clamp.
//! 5. `d ≤ smax`: the clamp `max_repulsion_force · (−n / left)`.
//!
//! with `smax = c − w`, `left = c + w`, `right = max − w` for the contact
//! distance `c` and interpolation width `w`.  Values and first derivatives
//! match at every boundary.

use pd_core::hermite_interp;

use crate::{ModelError, ModelResult};

/// Contact distance `c` of the law, in metres.
pub const CONTACT_DISTANCE: f64 = 0.5;

/// Validated regime boundaries; build with [`RepulsionLaw::new`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RepulsionLaw {
    /// Effective distance beyond which the force vanishes.
    max_interaction_distance: f64,
    /// Half-width of the two Hermite blends.
    interpolation_width:      f64,
    /// Clamp multiplier applied to the exact law at `left`.
    max_repulsion_force:      f64,
}

impl RepulsionLaw {
    pub fn new(max_interaction_distance: f64, interpolation_width: f64, max_repulsion_force: f64) -> ModelResult<Self> {
        let law = Self { max_interaction_distance, interpolation_width, max_repulsion_force };
        let all_finite = [max_interaction_distance, interpolation_width, max_repulsion_force]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(ModelError::InvalidConfig("repulsion law parameters must be finite".into()));
        }
        if interpolation_width <= 0.0 {
            return Err(ModelError::InvalidConfig(format!(
                "interpolation width {interpolation_width} must be positive"
            )));
        }
        if max_repulsion_force <= 0.0 {
            return Err(ModelError::InvalidConfig(format!(
                "max repulsion force {max_repulsion_force} must be positive"
            )));
        }
        if law.dist_intpol_left() >= law.dist_intpol_right() {
            return Err(ModelError::InvalidConfig(format!(
                "max interaction distance {max_interaction_distance} leaves no room for the exact \
                 law with interpolation width {interpolation_width}"
            )));
        }
        Ok(law)
    }

    #[inline]
    pub fn max_interaction_distance(&self) -> f64 {
        self.max_interaction_distance
    }

    #[inline]
    pub fn smax(&self) -> f64 {
        CONTACT_DISTANCE - self.interpolation_width
    }

    #[inline]
    pub fn dist_intpol_left(&self) -> f64 {
        CONTACT_DISTANCE + self.interpolation_width
    }

    #[inline]
    pub fn dist_intpol_right(&self) -> f64 {
        self.max_interaction_distance - self.interpolation_width
    }

    /// Signed magnitude at effective distance `dist_eff` for nominator `n`.
    /// Non-positive for `n ≥ 0`; the caller multiplies it onto the unit
    /// vector pointing at the source.
    pub fn magnitude(&self, dist_eff: f64, n: f64) -> f64 {
        if dist_eff >= self.max_interaction_distance {
            0.0
        } else if dist_eff <= self.smax() {
            self.clamped(n)
        } else if dist_eff >= self.dist_intpol_right() {
            self.outer_blend(dist_eff, n)
        } else if dist_eff >= self.dist_intpol_left() {
            self.exact(dist_eff, n)
        } else {
            self.inner_blend(dist_eff, n)
        }
    }

    /// Region 3: `−n / |d|`.
    #[inline]
    pub fn exact(&self, dist_eff: f64, n: f64) -> f64 {
        -n / dist_eff.abs()
    }

    /// Region 2 blend on `[right, max]`.
    pub fn outer_blend(&self, dist_eff: f64, n: f64) -> f64 {
        let right = self.dist_intpol_right();
        let f = -n / right;
        let df = n / (right * right);
        hermite_interp(dist_eff, right, self.max_interaction_distance, f, 0.0, df, 0.0)
    }

    /// Region 4 blend on `[smax, left]`.
    pub fn inner_blend(&self, dist_eff: f64, n: f64) -> f64 {
        let left = self.dist_intpol_left();
        let f = -n / left;
        let df = n / (left * left);
        hermite_interp(dist_eff, self.smax(), left, self.max_repulsion_force * f, f, 0.0, df)
    }

    /// Region 5.
    #[inline]
    pub fn clamped(&self, n: f64) -> f64 {
        self.max_repulsion_force * (-n / self.dist_intpol_left())
    }
}

impl Default for RepulsionLaw {
    /// `max = 2 m`, `w = 0.1 m`, clamp `3×`.
    fn default() -> Self {
        Self { max_interaction_distance: 2.0, interpolation_width: 0.1, max_repulsion_force: 3.0 }
    }
}

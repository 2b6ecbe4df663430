//! Speed-dependent elliptical body shape and anisotropic effective distance.
//!
//! # Shape law
//!
//! An agent occupies an ellipse centred at its position with the major axis
//! along its heading:
//!
//!   a = a_min + a_v · speed                 (semi-axis along the motion)
//!   b = b_max − (b_max − b_min) · speed / v0  (orthogonal semi-axis, ≥ b_min)
//!
//! A standing agent is round-ish (`a_min`, `b_max`); a walking agent gets
//! longer and narrower.  `EllipseShape` holds the four constants;
//! [`EllipseShape::place`] evaluates them for one agent at one instant and
//! returns a [`PlacedEllipse`] that answers the distance queries.

use crate::geometry::Point;
use crate::math::J_EPS;

// ── EllipseShape ──────────────────────────────────────────────────────────────

/// The four shape constants of a speed-dependent ellipse.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EllipseShape {
    /// Growth of the major semi-axis per m/s of speed.
    pub a_v:   f64,
    /// Major semi-axis at rest.
    pub a_min: f64,
    /// Minor semi-axis at full desired speed.
    pub b_min: f64,
    /// Minor semi-axis at rest.
    pub b_max: f64,
}

impl EllipseShape {
    #[inline]
    pub fn semi_axis_a(&self, speed: f64) -> f64 {
        self.a_min + self.a_v * speed
    }

    /// Minor semi-axis, kept within `[b_min, b_max]` so an agent pushed
    /// beyond `v0` does not collapse to a zero or negative width.  Agents
    /// that do not want to move (`v0 ≈ 0`) keep `b_max`.
    #[inline]
    pub fn semi_axis_b(&self, speed: f64, v0: f64) -> f64 {
        if v0 <= f64::EPSILON {
            return self.b_max;
        }
        (self.b_max - (self.b_max - self.b_min) * speed / v0).max(self.b_min).min(self.b_max)
    }

    /// Evaluate the shape for an agent at `center`, heading along
    /// `orientation`, moving at `speed` with desired speed `v0`.
    ///
    /// A zero `orientation` is treated as pointing along +x.
    pub fn place(&self, center: Point, orientation: Point, speed: f64, v0: f64) -> PlacedEllipse {
        let heading = orientation.normalized();
        let (cos, sin) = if heading == Point::ZERO { (1.0, 0.0) } else { (heading.x, heading.y) };
        PlacedEllipse {
            center,
            cos,
            sin,
            a: self.semi_axis_a(speed),
            b: self.semi_axis_b(speed, v0),
        }
    }
}

// ── PlacedEllipse ─────────────────────────────────────────────────────────────

/// An ellipse with concrete centre, rotation and semi-axes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlacedEllipse {
    pub center: Point,
    /// Cosine of the rotation of the major axis.
    pub cos:    f64,
    /// Sine of the rotation of the major axis.
    pub sin:    f64,
    pub a:      f64,
    pub b:      f64,
}

/// Result of [`PlacedEllipse::effective_distance`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EffectiveDistance {
    /// Gap between the two boundaries along the centre line.  Negative on
    /// overlap.
    pub effective:       f64,
    /// Distance between the two centres.
    pub center_distance: f64,
}

impl PlacedEllipse {
    /// Construct directly from axes and a heading angle given as `(cos, sin)`.
    pub fn new(center: Point, cos: f64, sin: f64, a: f64, b: f64) -> Self {
        Self { center, cos, sin, a, b }
    }

    /// Transform a Cartesian point into this ellipse's local frame.
    #[inline]
    pub fn to_local(&self, p: Point) -> Point {
        p.to_ellipse_frame(self.center, self.cos, self.sin)
    }

    /// Transform a local-frame point back into Cartesian coordinates.
    #[inline]
    pub fn to_cartesian(&self, p: Point) -> Point {
        p.to_cartesian_frame(self.center, self.cos, self.sin)
    }

    /// Boundary point on the ray from the centre through `p_local` (given in
    /// the local frame), returned in Cartesian coordinates.
    ///
    /// If `p_local` is within `J_EPS` of the centre the ray is undefined and
    /// the tip of the major axis `(a, 0)` is returned instead.
    pub fn point_on_ellipse(&self, p_local: Point) -> Point {
        let r2 = p_local.norm_square();
        if r2 < J_EPS * J_EPS {
            return self.to_cartesian(Point::new(self.a, 0.0));
        }
        let r = r2.sqrt();
        let cos_theta = p_local.x / r;
        let sin_theta = p_local.y / r;
        self.to_cartesian(Point::new(self.a * cos_theta, self.b * sin_theta))
    }

    /// Distance between the two boundaries measured along the line joining
    /// the centres.  Symmetric in its arguments.
    pub fn effective_distance(&self, other: &PlacedEllipse) -> EffectiveDistance {
        let other_in_self = self.to_local(other.center);
        let self_in_other = other.to_local(self.center);

        let center_distance = (self.center - other.center).norm();
        let r1 = self.point_on_ellipse(other_in_self);
        let r2 = other.point_on_ellipse(self_in_other);

        EffectiveDistance {
            effective: center_distance - (self.center - r1).norm() - (other.center - r2).norm(),
            center_distance,
        }
    }

    /// Distance from `p` to the boundary along the ray from the centre.
    /// Negative when `p` lies inside the ellipse.
    pub fn effective_distance_to_point(&self, p: Point) -> f64 {
        let boundary = self.point_on_ellipse(self.to_local(p));
        (p - self.center).norm() - (boundary - self.center).norm()
    }

    /// `true` if `p_local` lies strictly inside the ellipse.
    #[inline]
    pub fn contains_local(&self, p_local: Point) -> bool {
        (p_local.x * p_local.x) / (self.a * self.a) + (p_local.y * p_local.y) / (self.b * self.b) < 1.0
    }
}

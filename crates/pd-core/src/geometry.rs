//! Planar vector algebra and line segments.
//!
//! All coordinates are `f64` metres in a local Cartesian frame.  A `Point`
//! doubles as a 2-D vector (positions, velocities, headings and forces all
//! share the type), which keeps the model code close to the textbook formulas.

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

// ── Point ─────────────────────────────────────────────────────────────────────

/// A 2-D point or vector.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn norm(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[inline]
    pub fn norm_square(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Unit vector in the direction of `self`, or `ZERO` if `self` has no
    /// measurable length.
    #[inline]
    pub fn normalized(self) -> Point {
        self.norm_and_normalized().1
    }

    /// `(|self|, self / |self|)`; the second element is `ZERO` when the norm
    /// is at or below `f64::EPSILON`.
    #[inline]
    pub fn norm_and_normalized(self) -> (f64, Point) {
        let n = self.norm();
        if n <= f64::EPSILON {
            (n, Point::ZERO)
        } else {
            (n, self / n)
        }
    }

    #[inline]
    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// z-component of the 3-D cross product.
    #[inline]
    pub fn cross(self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Rotate by the angle whose cosine and sine are given.
    #[inline]
    pub fn rotate(self, cos: f64, sin: f64) -> Point {
        Point::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Counter-clockwise rotation by 90°.
    #[inline]
    pub fn rotate90(self) -> Point {
        Point::new(-self.y, self.x)
    }

    /// Express `self` in the frame of an ellipse centred at `center` whose
    /// major axis points along `(cos, sin)`.
    #[inline]
    pub fn to_ellipse_frame(self, center: Point, cos: f64, sin: f64) -> Point {
        (self - center).rotate(cos, -sin)
    }

    /// Inverse of [`Point::to_ellipse_frame`].
    #[inline]
    pub fn to_cartesian_frame(self, center: Point, cos: f64, sin: f64) -> Point {
        self.rotate(cos, sin) + center
    }

    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        (self - other).norm()
    }

    /// `true` if `|self|` is within `tolerance` of 1.
    #[inline]
    pub fn is_unit_length(self, tolerance: f64) -> bool {
        (self.norm() - 1.0).abs() <= tolerance
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Point;
    #[inline]
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    #[inline]
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;
    #[inline]
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Point {
    #[inline]
    fn sub_assign(&mut self, rhs: Point) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    #[inline]
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<Point> for f64 {
    type Output = Point;
    #[inline]
    fn mul(self, rhs: Point) -> Point {
        rhs * self
    }
}

impl Div<f64> for Point {
    type Output = Point;
    #[inline]
    fn div(self, rhs: f64) -> Point {
        Point::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Point {
    type Output = Point;
    #[inline]
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl std::iter::Sum for Point {
    fn sum<I: Iterator<Item = Point>>(iter: I) -> Point {
        iter.fold(Point::ZERO, Add::add)
    }
}

impl From<(f64, f64)> for Point {
    #[inline]
    fn from((x, y): (f64, f64)) -> Point {
        Point::new(x, y)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

// ── LineSegment ───────────────────────────────────────────────────────────────

/// A wall segment between two end points.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineSegment {
    pub p1: Point,
    pub p2: Point,
}

impl LineSegment {
    #[inline]
    pub const fn new(p1: Point, p2: Point) -> Self {
        Self { p1, p2 }
    }

    #[inline]
    pub fn length_square(&self) -> f64 {
        (self.p2 - self.p1).norm_square()
    }

    /// Point of the segment closest to `p`.
    pub fn shortest_point(&self, p: Point) -> Point {
        if self.p1 == self.p2 {
            return self.p1;
        }
        let t = self.p1 - self.p2;
        let lambda = (p - self.p2).dot(t) / t.norm_square();
        if lambda < 0.0 {
            self.p2
        } else if lambda > 1.0 {
            self.p1
        } else {
            self.p2 + t * lambda
        }
    }

    /// Euclidean distance from `p` to the segment.
    #[inline]
    pub fn dist_to(&self, p: Point) -> f64 {
        (p - self.shortest_point(p)).norm()
    }

    /// Unit normal (left-hand side of `p1 → p2`).
    #[inline]
    pub fn normal_vec(&self) -> Point {
        (self.p2 - self.p1).rotate90().normalized()
    }

    /// Absolute component of `v` normal to the segment.
    #[inline]
    pub fn normal_comp(&self, v: Point) -> f64 {
        v.dot(self.normal_vec()).abs()
    }

    /// Segment intersection test.  Touching end points and collinear overlap
    /// both count as intersecting.
    pub fn intersects(&self, other: &LineSegment) -> bool {
        let d1 = orientation(other.p1, other.p2, self.p1);
        let d2 = orientation(other.p1, other.p2, self.p2);
        let d3 = orientation(self.p1, self.p2, other.p1);
        let d4 = orientation(self.p1, self.p2, other.p2);

        if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
            && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
        {
            return true;
        }

        (d1 == 0.0 && on_segment(other.p1, other.p2, self.p1))
            || (d2 == 0.0 && on_segment(other.p1, other.p2, self.p2))
            || (d3 == 0.0 && on_segment(self.p1, self.p2, other.p1))
            || (d4 == 0.0 && on_segment(self.p1, self.p2, other.p2))
    }
}

#[inline]
fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b - a).cross(c - a)
}

/// Assumes `p` is collinear with `a`–`b`.
#[inline]
fn on_segment(a: Point, b: Point, p: Point) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

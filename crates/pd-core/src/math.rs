//! Scalar helpers shared by the force-based models.

use crate::geometry::Point;

/// General-purpose geometric tolerance (metres).
pub const J_EPS: f64 = 0.001;

/// An agent closer than this to its destination counts as arrived.
pub const J_EPS_GOAL: f64 = 0.005;

/// Cubic Hermite interpolation on `[x1, x2]`.
///
/// Returns the value at `t` of the unique cubic `p` with `p(x1) = y1`,
/// `p(x2) = y2`, `p'(x1) = dy1` and `p'(x2) = dy2`.
pub fn hermite_interp(t: f64, x1: f64, x2: f64, y1: f64, y2: f64, dy1: f64, dy2: f64) -> f64 {
    debug_assert!(x1 <= t && t <= x2, "hermite_interp: t={t} outside [{x1}, {x2}]");
    let h = x2 - x1;
    let s = (t - x1) / h;
    let s2 = s * s;
    let s3 = s2 * s;

    let h1 = 2.0 * s3 - 3.0 * s2 + 1.0;
    let h2 = -2.0 * s3 + 3.0 * s2;
    let h3 = s3 - 2.0 * s2 + s;
    let h4 = s3 - s2;

    y1 * h1 + y2 * h2 + dy1 * h3 * h + dy2 * h4 * h
}

/// First-order-lag smoothing of the desired heading.
///
/// `e0_old` is pulled toward the unit vector from `pos` to `target` by the
/// fraction `1 − exp(−orientation_delay·dt / tau)`.  The result is not
/// renormalised: a freshly reset delay keeps the previous heading, which is
/// the point of the lag.
pub fn mollify_e0(
    target:            Point,
    pos:               Point,
    dt:                f64,
    orientation_delay: u32,
    tau:               f64,
    e0_old:            Point,
) -> Point {
    let desired = (target - pos).normalized();
    let elapsed = f64::from(orientation_delay) * dt;
    let smoother = 1.0 - (-elapsed / tau).exp();
    e0_old + (desired - e0_old) * smoother
}

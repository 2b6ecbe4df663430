//! Wall segments and line-of-sight queries.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use pd_core::{LineSegment, Point};

use crate::{SpatialError, SpatialResult};

/// Radius used by [`CollisionGeometry::segments_near`].
pub const APPROX_SEARCH_RADIUS: f64 = 4.0;

// ── Contract ──────────────────────────────────────────────────────────────────

/// Read-only wall geometry.
pub trait CollisionGeometry: Sync {
    /// Walls that may influence an agent at `pos`.  Implementations may
    /// return a superset of the walls within [`APPROX_SEARCH_RADIUS`].
    fn segments_near(&self, pos: Point) -> Vec<LineSegment>;

    /// Walls whose closest point lies within `radius` of `pos`.
    fn segments_within(&self, radius: f64, pos: Point) -> Vec<LineSegment>;

    /// `true` if any wall intersects `segment`.
    fn intersects_any(&self, segment: &LineSegment) -> bool;
}

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone)]
struct SegmentEntry {
    segment: LineSegment,
}

impl RTreeObject for SegmentEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        let LineSegment { p1, p2 } = self.segment;
        AABB::from_corners([p1.x, p1.y], [p2.x, p2.y])
    }
}

impl PointDistance for SegmentEntry {
    /// Squared distance from the query point to the closest point of the
    /// segment.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let p = Point::new(point[0], point[1]);
        (p - self.segment.shortest_point(p)).norm_square()
    }
}

// ── SegmentGeometry ───────────────────────────────────────────────────────────

/// Static set of wall segments indexed by an R-tree.
pub struct SegmentGeometry {
    index: RTree<SegmentEntry>,
}

impl SegmentGeometry {
    /// Index `segments`, rejecting zero-length or non-finite ones.
    pub fn new(segments: Vec<LineSegment>) -> SpatialResult<Self> {
        for (index, s) in segments.iter().enumerate() {
            if !(s.p1.is_finite() && s.p2.is_finite()) {
                return Err(SpatialError::NonFiniteSegment { index });
            }
            if s.length_square() <= f64::EPSILON {
                return Err(SpatialError::DegenerateSegment { index });
            }
        }
        let entries = segments.into_iter().map(|segment| SegmentEntry { segment }).collect();
        Ok(Self { index: RTree::bulk_load(entries) })
    }

    /// Geometry without walls.
    pub fn empty() -> Self {
        Self { index: RTree::new() }
    }

    /// Walls along a polyline; `closed` adds the segment from the last vertex
    /// back to the first.
    pub fn from_polyline(vertices: &[Point], closed: bool) -> SpatialResult<Self> {
        if vertices.len() < 2 {
            return Err(SpatialError::TooFewVertices(vertices.len()));
        }
        let mut segments: Vec<LineSegment> =
            vertices.windows(2).map(|w| LineSegment::new(w[0], w[1])).collect();
        if closed && vertices.len() > 2 {
            segments.push(LineSegment::new(vertices[vertices.len() - 1], vertices[0]));
        }
        Self::new(segments)
    }

    pub fn len(&self) -> usize {
        self.index.size()
    }

    pub fn is_empty(&self) -> bool {
        self.index.size() == 0
    }
}

impl CollisionGeometry for SegmentGeometry {
    fn segments_near(&self, pos: Point) -> Vec<LineSegment> {
        self.segments_within(APPROX_SEARCH_RADIUS, pos)
    }

    fn segments_within(&self, radius: f64, pos: Point) -> Vec<LineSegment> {
        self.index
            .locate_within_distance([pos.x, pos.y], radius * radius)
            .map(|e| e.segment)
            .collect()
    }

    fn intersects_any(&self, segment: &LineSegment) -> bool {
        // Any wall crossing `segment` passes within half its length of the
        // midpoint.
        let mid = (segment.p1 + segment.p2) * 0.5;
        let reach = segment.length_square().sqrt() * 0.5 + f64::EPSILON;
        self.index
            .locate_within_distance([mid.x, mid.y], reach * reach)
            .any(|e| e.segment.intersects(segment))
    }
}

//! Logical decomposition of one tooth sector into four-sided sub-domains.
//!
//! A [`SubDomainLayout`] collects key points, the sampled boundary curve of
//! every edge between two key points, the regions as loops of four edge
//! sides, and the two angular seams along which neighbouring teeth meet.

use crate::errors::{GearError, Result};
use crate::float_types::{Real, tolerance};
use nalgebra::Point2;

/// One edge traversed in a given direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Side {
    pub edge: usize,
    pub forward: bool,
}

impl Side {
    pub const fn forward(edge: usize) -> Self {
        Self { edge, forward: true }
    }

    pub const fn backward(edge: usize) -> Self {
        Self { edge, forward: false }
    }

    pub const fn reversed(self) -> Self {
        Self {
            edge: self.edge,
            forward: !self.forward,
        }
    }
}

/// An edge between two key points and its boundary samples, ordered from
/// `start` to `end`.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutEdge {
    pub start: usize,
    pub end: usize,
    pub line: Vec<Point2<Real>>,
}

impl LayoutEdge {
    /// Number of segments the edge is split into.
    pub fn segments(&self) -> usize {
        self.line.len().saturating_sub(1)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubDomainLayout {
    key_points: Vec<Point2<Real>>,
    edges: Vec<LayoutEdge>,
    regions: Vec<[Side; 4]>,
    start_seam: Vec<Side>,
    end_seam: Vec<Side>,
}

impl SubDomainLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_key_point(&mut self, point: Point2<Real>) -> usize {
        self.key_points.push(point);
        self.key_points.len() - 1
    }

    /// Adds the edge `start → end` sampled by `line`; returns its index.
    pub fn add_edge(&mut self, start: usize, end: usize, line: Vec<Point2<Real>>) -> usize {
        self.edges.push(LayoutEdge { start, end, line });
        self.edges.len() - 1
    }

    /// Adds a straight edge between two existing key points.
    ///
    /// # Errors
    /// [`GearError::TopologyInconsistency`] if either key point has not been
    /// added yet.
    pub fn add_straight_edge(&mut self, start: usize, end: usize, segments: usize) -> Result<usize> {
        let line = straight_line(self.key_point(start)?, self.key_point(end)?, segments);
        Ok(self.add_edge(start, end, line))
    }

    /// Adds a circular-arc edge of `radius` about the origin, swept from
    /// angle `from` to angle `to`.
    pub fn add_arc_edge(
        &mut self,
        start: usize,
        end: usize,
        radius: Real,
        from: Real,
        to: Real,
        segments: usize,
    ) -> usize {
        self.add_edge(start, end, circular_arc(radius, from, to, segments))
    }

    /// Adds a region bounded by `sides`, listed counter-clockwise: bottom,
    /// right, top, left.
    pub fn add_region(&mut self, sides: [Side; 4]) -> usize {
        self.regions.push(sides);
        self.regions.len() - 1
    }

    /// Records the angular boundaries of the sector. `start` lies at the
    /// lower polar angle; each chain runs from the inner to the outer
    /// radius. Rotated by one tooth pitch, `start` lands on `end`.
    pub fn set_seams(&mut self, start: Vec<Side>, end: Vec<Side>) {
        self.start_seam = start;
        self.end_seam = end;
    }

    pub fn key_points(&self) -> &[Point2<Real>] {
        &self.key_points
    }

    pub fn edges(&self) -> &[LayoutEdge] {
        &self.edges
    }

    pub fn regions(&self) -> &[[Side; 4]] {
        &self.regions
    }

    pub fn start_seam(&self) -> &[Side] {
        &self.start_seam
    }

    pub fn end_seam(&self) -> &[Side] {
        &self.end_seam
    }

    /// Boundary samples of every edge, in edge order.
    pub fn lines(&self) -> Vec<Vec<Point2<Real>>> {
        self.edges.iter().map(|e| e.line.clone()).collect()
    }

    fn key_point(&self, index: usize) -> Result<Point2<Real>> {
        self.key_points.get(index).copied().ok_or_else(|| {
            GearError::topology(format!(
                "key point {index} does not exist ({} added)",
                self.key_points.len()
            ))
        })
    }

    /// Checks that every edge references existing key points and that its
    /// samples start and end on them.
    pub fn check_lines(&self) -> Result<()> {
        let count = self.key_points.len();
        for (e, edge) in self.edges.iter().enumerate() {
            if edge.start >= count || edge.end >= count {
                return Err(GearError::topology(format!(
                    "edge {e} joins key points {} and {}, but only {count} exist",
                    edge.start, edge.end
                )));
            }
            if edge.start == edge.end {
                return Err(GearError::topology(format!("edge {e} is a loop")));
            }
            if edge.line.len() < 2 {
                return Err(GearError::topology(format!(
                    "edge {e} has {} samples, at least 2 are needed",
                    edge.line.len()
                )));
            }
            let ends = [
                (edge.line[0], edge.start),
                (edge.line[edge.line.len() - 1], edge.end),
            ];
            for (sample, key) in ends {
                let target = self.key_points[key];
                let allowed = tolerance() * target.coords.norm().max(1.0);
                if (sample - target).norm() > allowed {
                    return Err(GearError::topology(format!(
                        "edge {e} ends at ({}, {}) instead of key point {key} ({}, {})",
                        sample.x, sample.y, target.x, target.y
                    )));
                }
            }
        }
        Ok(())
    }
}

/// `segments + 1` evenly spaced samples from `a` to `b`, both included.
pub fn straight_line(a: Point2<Real>, b: Point2<Real>, segments: usize) -> Vec<Point2<Real>> {
    let n = segments.max(1);
    (0..=n)
        .map(|i| a + (b - a) * (i as Real / n as Real))
        .collect()
}

/// `segments + 1` samples of the origin-centred circle of `radius`, evenly
/// spaced in angle from `from` to `to`.
pub fn circular_arc(radius: Real, from: Real, to: Real, segments: usize) -> Vec<Point2<Real>> {
    let n = segments.max(1);
    (0..=n)
        .map(|i| polar(radius, from + (to - from) * (i as Real / n as Real)))
        .collect()
}

#[inline]
pub fn polar(radius: Real, angle: Real) -> Point2<Real> {
    Point2::new(radius * angle.cos(), radius * angle.sin())
}

/// Reflection in the y axis (the tooth centerline).
#[inline]
pub fn mirror(p: &Point2<Real>) -> Point2<Real> {
    Point2::new(-p.x, p.y)
}

/// Polar angle of `p` in `(-π, π]`.
#[inline]
pub fn polar_angle(p: &Point2<Real>) -> Real {
    p.y.atan2(p.x)
}

/// Length of the polyline through `points`.
pub fn polyline_length(points: &[Point2<Real>]) -> Real {
    points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
}

/// First crossing of two polylines, scanning the segments of `a` in order.
///
/// Returns the crossing's position along each polyline in segment units:
/// `2.5` is halfway along the third segment.
pub fn polyline_crossing(a: &[Point2<Real>], b: &[Point2<Real>]) -> Option<(Real, Real)> {
    for (i, sa) in a.windows(2).enumerate() {
        let r = sa[1] - sa[0];
        for (j, sb) in b.windows(2).enumerate() {
            let q = sb[1] - sb[0];
            let denominator = r.perp(&q);
            if denominator.abs() < Real::EPSILON * r.norm() * q.norm() {
                continue;
            }
            let w = sb[0] - sa[0];
            let u = w.perp(&q) / denominator;
            let v = w.perp(&r) / denominator;
            if (0.0..=1.0).contains(&u) && (0.0..=1.0).contains(&v) {
                return Some((i as Real + u, j as Real + v));
            }
        }
    }
    None
}

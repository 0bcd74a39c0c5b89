//! Half-edge description of a sub-domain layout.
//!
//! Edge `e` of the layout owns half-edges `2e` (along the edge, start to
//! end) and `2e + 1` (against it). A half-edge bounds the region on its
//! left, or the outside when `region` is `None`; outside half-edges are
//! linked into the loop(s) of the outer boundary.

use crate::errors::{GearError, Result};
use crate::mesh::layout::{Side, SubDomainLayout};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfEdge {
    /// Key point this half-edge leaves
    pub origin: usize,
    /// Key point this half-edge points to
    pub destination: usize,
    /// Region on the left, `None` outside the layout
    pub region: Option<usize>,
    pub next: usize,
    pub prev: usize,
    pub opposite: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HalfEdgeTable {
    half_edges: Vec<HalfEdge>,
    /// First half-edge (the "bottom" side) of each region
    region_start: Vec<usize>,
    key_point_count: usize,
}

impl HalfEdgeTable {
    /// Half-edge index of a side.
    #[inline]
    pub const fn half_edge_of(side: Side) -> usize {
        2 * side.edge + if side.forward { 0 } else { 1 }
    }

    /// Side an half-edge index stands for.
    #[inline]
    pub const fn side_of(half_edge: usize) -> Side {
        Side {
            edge: half_edge / 2,
            forward: half_edge % 2 == 0,
        }
    }

    /// Builds and validates the table of `layout`.
    ///
    /// # Errors
    /// [`GearError::TopologyInconsistency`] when an edge references a
    /// missing key point, a side is claimed by two regions, a region loop is
    /// not closed, an edge bounds no region, or the outer boundary cannot be
    /// linked.
    pub fn from_layout(layout: &SubDomainLayout) -> Result<Self> {
        let key_point_count = layout.key_points().len();
        let edges = layout.edges();

        let mut half_edges = Vec::with_capacity(2 * edges.len());
        for (e, edge) in edges.iter().enumerate() {
            if edge.start >= key_point_count || edge.end >= key_point_count {
                return Err(GearError::topology(format!(
                    "edge {e} references a missing key point"
                )));
            }
            // next/prev are patched below
            half_edges.push(HalfEdge {
                origin: edge.start,
                destination: edge.end,
                region: None,
                next: usize::MAX,
                prev: usize::MAX,
                opposite: 2 * e + 1,
            });
            half_edges.push(HalfEdge {
                origin: edge.end,
                destination: edge.start,
                region: None,
                next: usize::MAX,
                prev: usize::MAX,
                opposite: 2 * e,
            });
        }

        let mut region_start = Vec::with_capacity(layout.regions().len());
        for (r, sides) in layout.regions().iter().enumerate() {
            let ids = sides.map(Self::half_edge_of);
            for (k, &h) in ids.iter().enumerate() {
                let Some(half) = half_edges.get_mut(h) else {
                    return Err(GearError::topology(format!(
                        "region {r} uses edge {}, which does not exist",
                        sides[k].edge
                    )));
                };
                if let Some(other) = half.region {
                    return Err(GearError::topology(format!(
                        "side {k} of region {r} is already claimed by region {other}"
                    )));
                }
                half.region = Some(r);
            }
            for k in 0..4 {
                let (h, g) = (ids[k], ids[(k + 1) % 4]);
                if half_edges[h].destination != half_edges[g].origin {
                    return Err(GearError::topology(format!(
                        "region {r} is not closed between sides {k} and {}",
                        (k + 1) % 4
                    )));
                }
                half_edges[h].next = g;
                half_edges[g].prev = h;
            }
            region_start.push(ids[0]);
        }

        for e in 0..edges.len() {
            if half_edges[2 * e].region.is_none() && half_edges[2 * e + 1].region.is_none() {
                return Err(GearError::topology(format!("edge {e} bounds no region")));
            }
        }

        // Link the outside half-edges by turning around their destination
        // through the interior fan until an outside half-edge is reached.
        for h in 0..half_edges.len() {
            if half_edges[h].region.is_some() {
                continue;
            }
            let mut candidate = half_edges[h].opposite;
            let mut turns = 0;
            while half_edges[candidate].region.is_some() {
                candidate = half_edges[half_edges[candidate].prev].opposite;
                turns += 1;
                if turns > half_edges.len() {
                    return Err(GearError::topology(format!(
                        "outer boundary cannot be continued at key point {}",
                        half_edges[h].destination
                    )));
                }
            }
            half_edges[h].next = candidate;
            half_edges[candidate].prev = h;
        }

        let table = Self {
            half_edges,
            region_start,
            key_point_count,
        };
        table.validate()?;
        Ok(table)
    }

    /// Checks the mutual consistency of opposite, next and prev links.
    pub fn validate(&self) -> Result<()> {
        let n = self.half_edges.len();
        for (h, half) in self.half_edges.iter().enumerate() {
            if half.next >= n || half.prev >= n || half.opposite >= n {
                return Err(GearError::topology(format!("half-edge {h} is not linked")));
            }
            let opposite = &self.half_edges[half.opposite];
            if opposite.opposite != h
                || opposite.origin != half.destination
                || opposite.destination != half.origin
            {
                return Err(GearError::topology(format!(
                    "half-edge {h} and its opposite disagree"
                )));
            }
            if self.half_edges[half.next].prev != h || self.half_edges[half.prev].next != h {
                return Err(GearError::topology(format!(
                    "next/prev links of half-edge {h} are not mutual"
                )));
            }
            if self.half_edges[half.next].origin != half.destination {
                return Err(GearError::topology(format!(
                    "half-edge {h} is not followed by a half-edge leaving its destination"
                )));
            }
            if self.half_edges[half.next].region != half.region {
                return Err(GearError::topology(format!(
                    "half-edge {h} and its successor bound different regions"
                )));
            }
        }
        Ok(())
    }

    pub fn half_edges(&self) -> &[HalfEdge] {
        &self.half_edges
    }

    pub fn region_count(&self) -> usize {
        self.region_start.len()
    }

    pub fn edge_count(&self) -> usize {
        self.half_edges.len() / 2
    }

    pub fn key_point_count(&self) -> usize {
        self.key_point_count
    }

    /// The four half-edges of region `r`, starting at its bottom side.
    pub fn region_loop(&self, r: usize) -> [usize; 4] {
        let first = self.region_start[r];
        let second = self.half_edges[first].next;
        let third = self.half_edges[second].next;
        let fourth = self.half_edges[third].next;
        [first, second, third, fourth]
    }

    /// Outside half-edges grouped into closed boundary loops.
    pub fn boundary_loops(&self) -> Vec<Vec<usize>> {
        let mut seen = vec![false; self.half_edges.len()];
        let mut loops = Vec::new();
        for h in 0..self.half_edges.len() {
            if seen[h] || self.half_edges[h].region.is_some() {
                continue;
            }
            let mut cycle = Vec::new();
            let mut current = h;
            while !seen[current] {
                seen[current] = true;
                cycle.push(current);
                current = self.half_edges[current].next;
            }
            loops.push(cycle);
        }
        loops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;

    /// Two unit squares side by side sharing the edge x = 1.
    fn two_squares() -> SubDomainLayout {
        let mut layout = SubDomainLayout::new();
        let p: Vec<usize> = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (0.0, 1.0), (1.0, 1.0), (2.0, 1.0)]
            .into_iter()
            .map(|(x, y)| layout.add_key_point(Point2::new(x, y)))
            .collect();
        let bottom_a = layout.add_straight_edge(p[0], p[1], 2).unwrap();
        let bottom_b = layout.add_straight_edge(p[1], p[2], 2).unwrap();
        let shared = layout.add_straight_edge(p[1], p[4], 3).unwrap();
        let right = layout.add_straight_edge(p[2], p[5], 3).unwrap();
        let top_a = layout.add_straight_edge(p[3], p[4], 2).unwrap();
        let top_b = layout.add_straight_edge(p[4], p[5], 2).unwrap();
        let left = layout.add_straight_edge(p[0], p[3], 3).unwrap();
        layout.add_region([
            Side::forward(bottom_a),
            Side::forward(shared),
            Side::backward(top_a),
            Side::backward(left),
        ]);
        layout.add_region([
            Side::forward(bottom_b),
            Side::forward(right),
            Side::backward(top_b),
            Side::backward(shared),
        ]);
        layout
    }

    #[test]
    fn shared_edge_bounds_both_regions() {
        let table = HalfEdgeTable::from_layout(&two_squares()).unwrap();
        let shared = &table.half_edges()[4];
        assert_eq!(shared.region, Some(0));
        assert_eq!(table.half_edges()[shared.opposite].region, Some(1));
        assert_eq!(table.boundary_loops().len(), 1);
        assert_eq!(table.boundary_loops()[0].len(), 6);
    }

    #[test]
    fn double_claim_is_rejected() {
        let mut layout = two_squares();
        let sides = layout.regions()[0];
        layout.add_region(sides);
        let err = HalfEdgeTable::from_layout(&layout).unwrap_err();
        assert!(err.to_string().contains("already claimed"));
    }

    #[test]
    fn open_loop_is_rejected() {
        let mut layout = two_squares();
        layout.add_region([
            Side::backward(0),
            Side::forward(6),
            Side::forward(5),
            Side::backward(3),
        ]);
        let err = HalfEdgeTable::from_layout(&layout).unwrap_err();
        assert!(err.to_string().contains("not closed"));
    }
}

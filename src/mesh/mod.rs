//! `QuadMesh` struct: node coordinates plus quadrilateral cells, and the
//! machinery (sub-domain layout, half-edge table, structured generator,
//! rotational stitcher) that produces one for a gear.

use crate::errors::{GearError, Result};
use crate::float_types::Real;
use hashbrown::HashMap;
use nalgebra::{Point2, Rotation2, partial_max, partial_min};
use std::sync::OnceLock;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub mod half_edge;
pub mod layout;
pub mod stitch;
pub mod subdomain;

/// Axis-aligned bounds of a planar node set, `(min, max)`.
pub type Bounds = (Point2<Real>, Point2<Real>);

#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuadMesh {
    /// Node coordinates; the index of a node is its identity
    pub nodes: Vec<Point2<Real>>,

    /// Cells as four node indices, counter-clockwise
    pub cells: Vec<[usize; 4]>,

    /// Lazily calculated bounds of `nodes`.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub bounding_box: OnceLock<Option<Bounds>>,
}

impl PartialEq for QuadMesh {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes && self.cells == other.cells
    }
}

impl QuadMesh {
    pub fn new(nodes: Vec<Point2<Real>>, cells: Vec<[usize; 4]>) -> Self {
        Self {
            nodes,
            cells,
            bounding_box: OnceLock::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Corner coordinates of cell `index`.
    pub fn cell_points(&self, index: usize) -> [Point2<Real>; 4] {
        self.cells[index].map(|node| self.nodes[node])
    }

    /// Shoelace area of a cell; positive for counter-clockwise corners.
    pub fn signed_area(&self, index: usize) -> Real {
        let p = self.cell_points(index);
        let mut twice = 0.0;
        for k in 0..4 {
            let a = p[k];
            let b = p[(k + 1) % 4];
            twice += a.x * b.y - b.x * a.y;
        }
        0.5 * twice
    }

    /// Sum of all signed cell areas.
    pub fn area(&self) -> Real {
        (0..self.cells.len()).map(|i| self.signed_area(i)).sum()
    }

    /// Indices of cells that are not strictly convex and counter-clockwise,
    /// i.e. cells with a non-positive turn at one of their corners.
    pub fn inverted_cells(&self) -> Vec<usize> {
        (0..self.cells.len())
            .filter(|&i| {
                let p = self.cell_points(i);
                (0..4).any(|k| {
                    let a = p[(k + 3) % 4];
                    let b = p[k];
                    let c = p[(k + 1) % 4];
                    (b - a).perp(&(c - b)) <= 0.0
                })
            })
            .collect()
    }

    /// Pairs `(i, j)`, `i < j`, of distinct nodes closer than `tolerance`.
    ///
    /// Nodes are bucketed on a grid of cell size `tolerance`, so only the
    /// 3×3 neighbourhood of each bucket is compared.
    pub fn duplicate_nodes(&self, tolerance: Real) -> Vec<(usize, usize)> {
        let size = tolerance.max(Real::EPSILON);
        let key = |p: &Point2<Real>| ((p.x / size).floor() as i64, (p.y / size).floor() as i64);

        let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::with_capacity(self.nodes.len());
        let mut pairs = Vec::new();
        for (j, p) in self.nodes.iter().enumerate() {
            let (kx, ky) = key(p);
            for dx in -1..=1 {
                for dy in -1..=1 {
                    if let Some(bucket) = grid.get(&(kx + dx, ky + dy)) {
                        for &i in bucket {
                            if (self.nodes[i] - p).norm() < tolerance {
                                pairs.push((i, j));
                            }
                        }
                    }
                }
            }
            grid.entry((kx, ky)).or_default().push(j);
        }
        pairs.sort_unstable();
        pairs
    }

    /// Checks that every cell references existing, pairwise distinct nodes.
    pub fn validate_indices(&self) -> Result<()> {
        let n = self.nodes.len();
        for (c, cell) in self.cells.iter().enumerate() {
            if let Some(&bad) = cell.iter().find(|&&v| v >= n) {
                return Err(GearError::topology(format!(
                    "cell {c} references node {bad}, but the mesh has {n} nodes"
                )));
            }
            for a in 0..4 {
                for b in (a + 1)..4 {
                    if cell[a] == cell[b] {
                        return Err(GearError::topology(format!(
                            "cell {c} uses node {} twice",
                            cell[a]
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Returns the bounds of the nodes, computed once and cached.
    /// `None` for an empty mesh.
    pub fn bounding_box(&self) -> Option<Bounds> {
        *self.bounding_box.get_or_init(|| {
            let first = self.nodes.first()?;
            let mut min = *first;
            let mut max = *first;
            for p in &self.nodes {
                min.x = *partial_min(&min.x, &p.x)?;
                min.y = *partial_min(&min.y, &p.y)?;
                max.x = *partial_max(&max.x, &p.x)?;
                max.y = *partial_max(&max.y, &p.y)?;
            }
            Some((min, max))
        })
    }

    /// Copy of the mesh rotated by `angle` (radians) about the origin.
    #[cfg(not(feature = "parallel"))]
    pub fn rotated(&self, angle: Real) -> QuadMesh {
        let rotation = Rotation2::new(angle);
        let nodes = self.nodes.iter().map(|p| rotation * p).collect();
        QuadMesh::new(nodes, self.cells.clone())
    }

    /// Copy of the mesh rotated by `angle` (radians) about the origin.
    #[cfg(feature = "parallel")]
    pub fn rotated(&self, angle: Real) -> QuadMesh {
        let rotation = Rotation2::new(angle);
        let nodes = self.nodes.par_iter().map(|p| rotation * p).collect();
        QuadMesh::new(nodes, self.cells.clone())
    }

    /// Index of the node nearest to `point`, if any.
    pub fn nearest_node(&self, point: &Point2<Real>) -> Option<(usize, Real)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, p)| (i, (p - point).norm()))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> QuadMesh {
        QuadMesh::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(0.0, 1.0),
            ],
            vec![[0, 1, 2, 3]],
        )
    }

    #[test]
    fn square_area_and_orientation() {
        let mesh = unit_square();
        assert!((mesh.signed_area(0) - 1.0).abs() < 1e-15);
        assert!(mesh.inverted_cells().is_empty());

        let flipped = QuadMesh::new(mesh.nodes.clone(), vec![[0, 3, 2, 1]]);
        assert_eq!(flipped.inverted_cells(), vec![0]);
    }

    #[test]
    fn finds_coincident_nodes() {
        let mut mesh = unit_square();
        mesh.nodes.push(Point2::new(1.0 + 1e-12, 1.0));
        assert_eq!(mesh.duplicate_nodes(1e-9), vec![(2, 4)]);
    }

    #[test]
    fn out_of_range_cell() {
        let mesh = QuadMesh::new(unit_square().nodes, vec![[0, 1, 2, 7]]);
        assert!(mesh.validate_indices().unwrap_err().is_topology_inconsistency());
    }

    #[test]
    fn bounding_box_and_rotation() {
        let mesh = unit_square().rotated(crate::float_types::FRAC_PI_2);
        let (min, max) = mesh.bounding_box().unwrap();
        assert!((min.x + 1.0).abs() < 1e-12 && (max.y - 1.0).abs() < 1e-12);
        assert!((mesh.signed_area(0) - 1.0).abs() < 1e-12);
    }
}

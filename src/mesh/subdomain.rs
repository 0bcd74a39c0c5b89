//! Structured quadrilateral meshing of a half-edge sub-domain layout.
//!
//! Node numbering is part of the contract, the stitcher depends on it:
//!
//! 1. the key points, in input order;
//! 2. the interior samples of every edge, edge by edge in table order, each
//!    in the direction of its line;
//! 3. the interior nodes of every region, region by region, row by row
//!    starting next to the region's bottom side.
//!
//! Region interiors are filled by transfinite (Coons) interpolation of the
//! four boundary sample sequences, so opposite sides must carry the same
//! number of samples.

use crate::errors::{GearError, Result};
use crate::float_types::{Real, tolerance};
use crate::mesh::QuadMesh;
use crate::mesh::half_edge::HalfEdgeTable;
use crate::mesh::layout::Side;
use nalgebra::Point2;

/// Generator output: the mesh of the whole layout plus, for every edge, the
/// indices of its nodes from start to end key point.
#[derive(Debug, Clone)]
pub struct SubDomainMesh {
    pub mesh: QuadMesh,
    pub edge_nodes: Vec<Vec<usize>>,
}

impl SubDomainMesh {
    /// Node indices along a chain of sides, shared corners listed once.
    ///
    /// # Errors
    /// [`GearError::TopologyInconsistency`] if consecutive sides do not meet
    /// or a side names an unknown edge.
    pub fn chain_nodes(&self, chain: &[Side]) -> Result<Vec<usize>> {
        let mut out: Vec<usize> = Vec::new();
        for side in chain {
            let ids = self.side_nodes(*side)?;
            match out.last() {
                None => out.extend(ids),
                Some(&last) if last == ids[0] => out.extend(&ids[1..]),
                Some(_) => {
                    return Err(GearError::topology(format!(
                        "edge {} does not continue the chain",
                        side.edge
                    )));
                },
            }
        }
        Ok(out)
    }

    fn side_nodes(&self, side: Side) -> Result<Vec<usize>> {
        let ids = self
            .edge_nodes
            .get(side.edge)
            .ok_or_else(|| GearError::topology(format!("unknown edge {}", side.edge)))?;
        Ok(if side.forward {
            ids.clone()
        } else {
            ids.iter().rev().copied().collect()
        })
    }
}

/// Meshes every region of `table`.
///
/// `key_points` are the corners referenced by the table and `lines[e]` the
/// samples of edge `e`, from its start to its end key point.
///
/// # Errors
/// [`GearError::TopologyInconsistency`] if the inputs disagree in size, a
/// line does not start and end on its key points, two opposite sides of a
/// region have different sample counts, or a region boundary does not run
/// counter-clockwise.
pub fn sub_domain_mesh_generator(
    table: &HalfEdgeTable,
    key_points: &[Point2<Real>],
    lines: &[Vec<Point2<Real>>],
) -> Result<SubDomainMesh> {
    if key_points.len() != table.key_point_count() {
        return Err(GearError::topology(format!(
            "table expects {} key points, got {}",
            table.key_point_count(),
            key_points.len()
        )));
    }
    if lines.len() != table.edge_count() {
        return Err(GearError::topology(format!(
            "table has {} edges, got {} lines",
            table.edge_count(),
            lines.len()
        )));
    }

    let half_edges = table.half_edges();
    let mut nodes: Vec<Point2<Real>> = key_points.to_vec();
    let mut edge_nodes = Vec::with_capacity(lines.len());

    for (e, line) in lines.iter().enumerate() {
        let start = half_edges[2 * e].origin;
        let end = half_edges[2 * e].destination;
        if line.len() < 2 {
            return Err(GearError::topology(format!("line {e} has fewer than 2 samples")));
        }
        for (sample, key) in [(line[0], start), (line[line.len() - 1], end)] {
            let target = key_points[key];
            if (sample - target).norm() > tolerance() * target.coords.norm().max(1.0) {
                return Err(GearError::topology(format!(
                    "line {e} does not end on key point {key}"
                )));
            }
        }

        let mut ids = Vec::with_capacity(line.len());
        ids.push(start);
        for p in &line[1..line.len() - 1] {
            ids.push(nodes.len());
            nodes.push(*p);
        }
        ids.push(end);
        edge_nodes.push(ids);
    }

    let mut cells = Vec::new();
    for r in 0..table.region_count() {
        let sides: Vec<Vec<usize>> = table
            .region_loop(r)
            .iter()
            .map(|&h| {
                let side = HalfEdgeTable::side_of(h);
                let ids = &edge_nodes[side.edge];
                if side.forward {
                    ids.clone()
                } else {
                    ids.iter().rev().copied().collect()
                }
            })
            .collect();

        let (bottom, right) = (&sides[0], &sides[1]);
        let nx = bottom.len() - 1;
        let ny = right.len() - 1;
        if sides[2].len() - 1 != nx || sides[3].len() - 1 != ny {
            return Err(GearError::topology(format!(
                "region {r}: opposite sides disagree ({}x{} against {}x{} segments)",
                nx,
                ny,
                sides[2].len() - 1,
                sides[3].len() - 1
            )));
        }
        let ring: Vec<Point2<Real>> = sides
            .iter()
            .flat_map(|side| side[..side.len() - 1].iter().map(|&id| nodes[id]))
            .collect();
        let area = signed_area(&ring);
        if area <= 0.0 {
            return Err(GearError::topology(format!(
                "region {r} runs clockwise (signed area {area:e})"
            )));
        }

        // top and left run backwards around the loop
        let top: Vec<usize> = sides[2].iter().rev().copied().collect();
        let left: Vec<usize> = sides[3].iter().rev().copied().collect();

        let mut grid = vec![vec![0usize; ny + 1]; nx + 1];
        for i in 0..=nx {
            grid[i][0] = bottom[i];
            grid[i][ny] = top[i];
        }
        for j in 0..=ny {
            grid[0][j] = left[j];
            grid[nx][j] = right[j];
        }

        let corner = [
            nodes[bottom[0]],
            nodes[bottom[nx]],
            nodes[top[nx]],
            nodes[top[0]],
        ];
        for j in 1..ny {
            for i in 1..nx {
                let u = i as Real / nx as Real;
                let v = j as Real / ny as Real;
                let ruled = nodes[bottom[i]].coords * (1.0 - v)
                    + nodes[top[i]].coords * v
                    + nodes[left[j]].coords * (1.0 - u)
                    + nodes[right[j]].coords * u;
                let bilinear = corner[0].coords * ((1.0 - u) * (1.0 - v))
                    + corner[1].coords * (u * (1.0 - v))
                    + corner[2].coords * (u * v)
                    + corner[3].coords * ((1.0 - u) * v);
                grid[i][j] = nodes.len();
                nodes.push(Point2::from(ruled - bilinear));
            }
        }

        for j in 0..ny {
            for i in 0..nx {
                cells.push([grid[i][j], grid[i + 1][j], grid[i + 1][j + 1], grid[i][j + 1]]);
            }
        }
    }

    log::debug!(
        "sub-domain mesh: {} regions, {} nodes, {} cells",
        table.region_count(),
        nodes.len(),
        cells.len()
    );

    Ok(SubDomainMesh {
        mesh: QuadMesh::new(nodes, cells),
        edge_nodes,
    })
}

/// Shoelace area of a closed polygon, positive when counter-clockwise.
fn signed_area(ring: &[Point2<Real>]) -> Real {
    let n = ring.len();
    (0..n)
        .map(|i| {
            let (a, b) = (ring[i], ring[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum::<Real>()
        / 2.0
}

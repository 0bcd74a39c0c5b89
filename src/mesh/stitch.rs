//! Assembles a full wheel from one tooth mesh by rotation.
//!
//! Copy `k` of the tooth is the tooth rotated by `2πk/z`. Its start seam
//! coincides with the end seam of copy `k − 1`, so those nodes are not
//! created again but mapped onto the previous copy's indices; the last copy
//! additionally maps its end seam onto the start seam of copy 0, closing the
//! ring. Every other node of copy `k ≥ 1` is fresh and numbered after all
//! nodes of the earlier copies:
//!
//! ```text
//! offset(k) = N + (k − 1)(N − s)        N: tooth nodes, s: seam length
//! ```
//!
//! The final node count is `z(N − s)` and the cell count `z·C`.

use crate::errors::{GearError, Result};
use crate::float_types::{Real, TAU};
use crate::mesh::QuadMesh;
use nalgebra::{Point2, Rotation2};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Node indices of the two angular boundaries of a tooth mesh, both ordered
/// from the inner to the outer radius. `start[j]` of copy `k + 1` is the
/// same node as `end[j]` of copy `k`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seam {
    pub start: Vec<usize>,
    pub end: Vec<usize>,
}

impl Seam {
    pub const fn new(start: Vec<usize>, end: Vec<usize>) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.start.len()
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_empty()
    }
}

/// Role of a tooth-mesh node during stitching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeRole {
    /// Position `j` on the start seam
    Start(usize),
    /// Position `j` on the end seam
    End(usize),
    Interior,
}

/// Offsets and ranks of the fresh nodes, computed once for all copies.
#[derive(Debug, Clone)]
pub struct StitchPlan {
    node_count: usize,
    teeth: usize,
    seam: Seam,
    roles: Vec<NodeRole>,
    /// Rank of each node among the fresh nodes of a middle copy (every node
    /// off the start seam)
    middle_rank: Vec<usize>,
    /// Rank of each node among the fresh nodes of the closing copy (every
    /// node off both seams)
    closing_rank: Vec<usize>,
    middle_fresh: Vec<usize>,
    closing_fresh: Vec<usize>,
}

impl StitchPlan {
    /// # Errors
    /// [`GearError::TopologyInconsistency`] if the seams differ in length,
    /// are empty, repeat or share a node, reference a node beyond
    /// `node_count`, or if `teeth < 2`.
    pub fn new(node_count: usize, seam: Seam, teeth: usize) -> Result<Self> {
        if teeth < 2 {
            return Err(GearError::topology(format!(
                "a ring needs at least 2 copies, got {teeth}"
            )));
        }
        if seam.start.len() != seam.end.len() {
            return Err(GearError::topology(format!(
                "start seam has {} nodes, end seam {}",
                seam.start.len(),
                seam.end.len()
            )));
        }
        if seam.is_empty() {
            return Err(GearError::topology("seams are empty"));
        }

        let mut roles = vec![NodeRole::Interior; node_count];
        for (j, &node) in seam.start.iter().enumerate() {
            let role = roles.get_mut(node).ok_or_else(|| {
                GearError::topology(format!("seam node {node} is out of range ({node_count})"))
            })?;
            if *role != NodeRole::Interior {
                return Err(GearError::topology(format!("node {node} repeats on the start seam")));
            }
            *role = NodeRole::Start(j);
        }
        for (j, &node) in seam.end.iter().enumerate() {
            let role = roles.get_mut(node).ok_or_else(|| {
                GearError::topology(format!("seam node {node} is out of range ({node_count})"))
            })?;
            if *role != NodeRole::Interior {
                return Err(GearError::topology(format!(
                    "node {node} lies on both seams or repeats on the end seam"
                )));
            }
            *role = NodeRole::End(j);
        }

        let mut middle_rank = vec![usize::MAX; node_count];
        let mut closing_rank = vec![usize::MAX; node_count];
        let mut middle_fresh = Vec::with_capacity(node_count);
        let mut closing_fresh = Vec::with_capacity(node_count);
        for (node, role) in roles.iter().enumerate() {
            if !matches!(role, NodeRole::Start(_)) {
                middle_rank[node] = middle_fresh.len();
                middle_fresh.push(node);
            }
            if *role == NodeRole::Interior {
                closing_rank[node] = closing_fresh.len();
                closing_fresh.push(node);
            }
        }

        Ok(Self {
            node_count,
            teeth,
            seam,
            roles,
            middle_rank,
            closing_rank,
            middle_fresh,
            closing_fresh,
        })
    }

    pub const fn teeth(&self) -> usize {
        self.teeth
    }

    /// First global index of the fresh nodes of copy `k ≥ 1`.
    pub const fn offset(&self, copy_index: usize) -> usize {
        self.node_count + (copy_index - 1) * (self.node_count - self.seam.start.len())
    }

    /// Node count of the assembled wheel, `z(N − s)`.
    pub const fn total_nodes(&self) -> usize {
        self.teeth * (self.node_count - self.seam.start.len())
    }

    const fn is_closing(&self, copy_index: usize) -> bool {
        copy_index + 1 == self.teeth
    }

    /// Tooth-mesh nodes that copy `k` adds, in global order.
    pub fn fresh_nodes(&self, copy_index: usize) -> &[usize] {
        if self.is_closing(copy_index) {
            &self.closing_fresh
        } else {
            &self.middle_fresh
        }
    }
}

/// Maps every tooth-mesh node of copy `copy_index` (`1 ≤ k < z`) to its
/// global index, given the map of copy `k − 1` (identity for copy 0).
pub fn compute_remap(previous: &[usize], copy_index: usize, plan: &StitchPlan) -> Vec<usize> {
    let offset = plan.offset(copy_index);
    let closing = plan.is_closing(copy_index);
    plan.roles
        .iter()
        .enumerate()
        .map(|(node, role)| match *role {
            NodeRole::Start(j) => previous[plan.seam.end[j]],
            NodeRole::End(j) if closing => plan.seam.start[j],
            _ if closing => offset + plan.closing_rank[node],
            _ => offset + plan.middle_rank[node],
        })
        .collect()
}

/// Replicates `tooth` around the origin `teeth` times.
///
/// # Errors
/// [`GearError::TopologyInconsistency`] if the seams are unusable (see
/// [`StitchPlan::new`]) or if a cell of `tooth` references a missing node.
pub fn stitch(tooth: &QuadMesh, seam: Seam, teeth: usize) -> Result<QuadMesh> {
    tooth.validate_indices()?;
    let plan = StitchPlan::new(tooth.node_count(), seam, teeth)?;

    let mut remaps: Vec<Vec<usize>> = Vec::with_capacity(teeth);
    remaps.push((0..tooth.node_count()).collect());
    for k in 1..teeth {
        let next = compute_remap(&remaps[k - 1], k, &plan);
        remaps.push(next);
    }

    let mut nodes = Vec::with_capacity(plan.total_nodes());
    nodes.extend_from_slice(&tooth.nodes);
    for block in rotated_blocks(tooth, &plan) {
        nodes.extend(block);
    }

    let mut cells = Vec::with_capacity(teeth * tooth.cell_count());
    for remap in &remaps {
        cells.extend(tooth.cells.iter().map(|cell| cell.map(|v| remap[v])));
    }

    debug_assert_eq!(nodes.len(), plan.total_nodes());
    log::debug!(
        "stitched {teeth} teeth: {} nodes, {} cells",
        nodes.len(),
        cells.len()
    );

    let mesh = QuadMesh::new(nodes, cells);
    mesh.validate_indices()?;
    Ok(mesh)
}

fn rotated_block(tooth: &QuadMesh, plan: &StitchPlan, copy_index: usize) -> Vec<Point2<Real>> {
    let rotation = Rotation2::new(TAU * copy_index as Real / plan.teeth as Real);
    plan.fresh_nodes(copy_index)
        .iter()
        .map(|&node| rotation * tooth.nodes[node])
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn rotated_blocks(tooth: &QuadMesh, plan: &StitchPlan) -> Vec<Vec<Point2<Real>>> {
    (1..plan.teeth)
        .map(|k| rotated_block(tooth, plan, k))
        .collect()
}

#[cfg(feature = "parallel")]
fn rotated_blocks(tooth: &QuadMesh, plan: &StitchPlan) -> Vec<Vec<Point2<Real>>> {
    (1..plan.teeth)
        .into_par_iter()
        .map(|k| rotated_block(tooth, plan, k))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Nodes 0..=5 with seams [0, 1] and [4, 5].
    fn plan(teeth: usize) -> StitchPlan {
        StitchPlan::new(6, Seam::new(vec![0, 1], vec![4, 5]), teeth).unwrap()
    }

    #[test]
    fn offsets_follow_unique_node_count() {
        let plan = plan(5);
        assert_eq!(plan.offset(1), 6);
        assert_eq!(plan.offset(2), 10);
        assert_eq!(plan.total_nodes(), 20);
    }

    #[test]
    fn middle_copy_reuses_previous_end_seam() {
        let plan = plan(4);
        let identity: Vec<usize> = (0..6).collect();
        let first = compute_remap(&identity, 1, &plan);
        assert_eq!(first, vec![4, 5, 6, 7, 8, 9]);
        let second = compute_remap(&first, 2, &plan);
        assert_eq!(second, vec![8, 9, 10, 11, 12, 13]);
    }

    #[test]
    fn closing_copy_links_back_to_copy_zero() {
        let plan = plan(3);
        let identity: Vec<usize> = (0..6).collect();
        let first = compute_remap(&identity, 1, &plan);
        let last = compute_remap(&first, 2, &plan);
        assert_eq!(last, vec![8, 9, 10, 11, 0, 1]);
    }

    #[test]
    fn rejects_overlapping_seams() {
        let err = StitchPlan::new(6, Seam::new(vec![0, 1], vec![1, 5]), 3).unwrap_err();
        assert!(err.is_topology_inconsistency());
    }
}

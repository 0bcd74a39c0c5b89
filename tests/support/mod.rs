//! Test support library
//! Provides various helper functions & utilities for tests.
#![allow(dead_code)]

use gearmesh::{
    float_types::{Real, TAU},
    gear::{ExternalGearConfig, GearConfig, MeshResolution},
    mesh::QuadMesh,
};

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// m = 2 mm, z = 20, α = 20°, standard rack, n = (5, 5, 5, 3, 3), rim of
/// 20 mm diameter.
pub fn spur_config() -> ExternalGearConfig {
    ExternalGearConfig::new(
        GearConfig::new(2.0, 20, 20.0).with_resolution(MeshResolution::new(5, 5, 5, 3, 3)),
        20.0,
    )
}

/// Asserts that every cell references existing nodes, is strictly convex
/// and counter-clockwise, and that no two nodes coincide within `1e-9`.
pub fn assert_valid_mesh(mesh: &QuadMesh) {
    mesh.validate_indices().expect("cell indices in range");
    let inverted = mesh.inverted_cells();
    assert!(inverted.is_empty(), "inverted cells: {inverted:?}");
    let duplicates = mesh.duplicate_nodes(1e-9);
    assert!(duplicates.is_empty(), "coincident nodes: {duplicates:?}");
}

/// Number of nodes that do not land on another node after rotating the mesh
/// by one tooth pitch.
pub fn closure_misses(mesh: &QuadMesh, teeth: usize, tolerance: Real) -> usize {
    let rotated = mesh.rotated(TAU / teeth as Real);
    let n = mesh.node_count();
    let mut nodes = mesh.nodes.clone();
    nodes.extend_from_slice(&rotated.nodes);
    let combined = QuadMesh::new(nodes, Vec::new());

    let mut matched = vec![false; n];
    for (i, j) in combined.duplicate_nodes(tolerance) {
        if i < n && j >= n {
            matched[j - n] = true;
        }
    }
    matched.iter().filter(|m| !**m).count()
}

use gearmesh::float_types::{Real, TAU};
use gearmesh::gear::ToothMesh;
use gearmesh::mesh::layout::{Side, SubDomainLayout, polar};
use gearmesh::mesh::stitch::{Seam, StitchPlan, stitch};
use nalgebra::Rotation2;

mod support;

/// One sector of the annulus 1 ≤ r ≤ 2, spanning `2π/teeth` symmetrically
/// about the x axis, split into `arc` × `radial` cells.
fn annular_sector(teeth: usize, arc: usize, radial: usize) -> SubDomainLayout {
    let half = TAU / teeth as Real / 2.0;
    let mut layout = SubDomainLayout::new();
    let p0 = layout.add_key_point(polar(1.0, -half));
    let p1 = layout.add_key_point(polar(1.0, half));
    let p2 = layout.add_key_point(polar(2.0, half));
    let p3 = layout.add_key_point(polar(2.0, -half));
    let inner = layout.add_arc_edge(p0, p1, 1.0, -half, half, arc);
    let end = layout.add_straight_edge(p1, p2, radial).unwrap();
    let outer = layout.add_arc_edge(p3, p2, 2.0, -half, half, arc);
    let start = layout.add_straight_edge(p0, p3, radial).unwrap();
    // the radial start edge is the bottom side, so rows follow the arcs
    layout.add_region([
        Side::forward(start),
        Side::forward(outer),
        Side::backward(end),
        Side::backward(inner),
    ]);
    layout.set_seams(vec![Side::forward(start)], vec![Side::forward(end)]);
    layout
}

/// Area of the annulus between regular `sides`-gons of radius 1 and 2.
fn polygon_annulus_area(sides: usize) -> Real {
    let n = sides as Real;
    (4.0 - 1.0) * n / 2.0 * (TAU / n).sin()
}

#[test]
fn sectors_close_into_a_ring() {
    let (teeth, arc, radial) = (6, 4, 3);
    let tooth = ToothMesh::from_layout(&annular_sector(teeth, arc, radial)).unwrap();
    assert_eq!(tooth.mesh.node_count(), (arc + 1) * (radial + 1));
    assert_eq!(tooth.seam.len(), radial + 1);

    let ring = stitch(&tooth.mesh, tooth.seam.clone(), teeth).unwrap();
    assert_eq!(ring.node_count(), teeth * arc * (radial + 1));
    assert_eq!(ring.cell_count(), teeth * arc * radial);
    support::assert_valid_mesh(&ring);
    assert_eq!(support::closure_misses(&ring, teeth, 1e-9), 0);
    assert!(support::approx_eq(ring.area(), polygon_annulus_area(teeth * arc), 1e-9));
}

#[test]
fn first_copy_keeps_tooth_numbering() {
    let teeth = 5;
    let tooth = ToothMesh::from_layout(&annular_sector(teeth, 3, 2)).unwrap();
    let ring = stitch(&tooth.mesh, tooth.seam.clone(), teeth).unwrap();
    assert_eq!(&ring.nodes[..tooth.mesh.node_count()], &tooth.mesh.nodes[..]);
    assert_eq!(&ring.cells[..tooth.mesh.cell_count()], &tooth.mesh.cells[..]);

    // the fresh nodes of copy 1 are the tooth nodes off the start seam,
    // rotated by one pitch
    let plan = StitchPlan::new(tooth.mesh.node_count(), tooth.seam.clone(), teeth).unwrap();
    let rotation = Rotation2::new(TAU / teeth as Real);
    let offset = plan.offset(1);
    for (rank, &node) in plan.fresh_nodes(1).iter().enumerate() {
        let expected = rotation * tooth.mesh.nodes[node];
        assert!((ring.nodes[offset + rank] - expected).norm() < 1e-12);
    }
}

#[test]
fn two_copies_share_both_seams() {
    let tooth = ToothMesh::from_layout(&annular_sector(2, 4, 2)).unwrap();
    let ring = stitch(&tooth.mesh, tooth.seam.clone(), 2).unwrap();
    assert_eq!(ring.node_count(), 2 * 4 * 3);
    support::assert_valid_mesh(&ring);
    assert_eq!(support::closure_misses(&ring, 2, 1e-9), 0);
}

#[test]
fn single_copy_is_rejected() {
    let tooth = ToothMesh::from_layout(&annular_sector(2, 4, 2)).unwrap();
    let err = stitch(&tooth.mesh, tooth.seam, 1).unwrap_err();
    assert!(err.is_topology_inconsistency());
}

#[test]
fn unusable_seams_are_rejected() {
    let tooth = ToothMesh::from_layout(&annular_sector(4, 3, 2)).unwrap();
    let n = tooth.mesh.node_count();

    let short = Seam::new(tooth.seam.start.clone(), tooth.seam.end[..2].to_vec());
    assert!(stitch(&tooth.mesh, short, 4).is_err());

    let outside = Seam::new(vec![0, n], vec![1, 2]);
    assert!(stitch(&tooth.mesh, outside, 4).is_err());

    assert!(stitch(&tooth.mesh, Seam::new(Vec::new(), Vec::new()), 4).is_err());
}

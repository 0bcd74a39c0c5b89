use gearmesh::float_types::{FRAC_PI_2, Real};
use gearmesh::gear::{ExternalGear, ExternalGearConfig, Gear, GearConfig, MeshResolution};
use gearmesh::mesh::half_edge::HalfEdgeTable;
use gearmesh::mesh::layout::mirror;

mod support;

#[test]
fn twenty_tooth_spur_gear() {
    let mut gear = ExternalGear::new(support::spur_config()).unwrap();
    let tooth = gear.tooth_mesh().unwrap();
    assert_eq!(tooth.mesh.cell_count(), 120);
    assert_eq!(tooth.mesh.node_count(), 148);
    support::assert_valid_mesh(&tooth.mesh);

    let mesh = gear.generate_mesh().unwrap().clone();
    assert_eq!(mesh.cell_count(), 20 * tooth.mesh.cell_count());
    assert!(mesh.node_count() < 20 * tooth.mesh.node_count());
    assert_eq!(mesh.node_count(), 20 * (tooth.mesh.node_count() - tooth.seam.len()));
    assert_eq!(mesh.node_count(), 2840);
    support::assert_valid_mesh(&mesh);
    assert_eq!(support::closure_misses(&mesh, 20, 1e-7), 0);

    assert_eq!(gear.mesh(), Some(&mesh));
}

#[test]
fn mesh_covers_the_annulus_between_rim_and_teeth() {
    let gear = ExternalGear::new(support::spur_config()).unwrap();
    let mesh = gear.build_mesh().unwrap();
    let radii = gear.radii();
    let rim = std::f64::consts::PI * (radii.root.powi(2) - gear.inner_radius().powi(2));
    let disc = std::f64::consts::PI * (radii.tip.powi(2) - gear.inner_radius().powi(2));
    assert!(mesh.area() > rim && mesh.area() < disc);

    let max = mesh.nodes.iter().map(|p| p.coords.norm()).fold(0.0, Real::max);
    assert!(support::approx_eq(max, radii.tip, 1e-9));
}

#[test]
fn full_round_fillet_selects_reduced_layout() {
    let standard = ExternalGear::new(support::spur_config()).unwrap();
    let full_round = standard.max_tip_radius_coefficient();

    let mut config = support::spur_config();
    config.gear = config.gear.with_tip_radius_coefficient(full_round);
    config.inner_diameter = 32.0;
    let mut gear = ExternalGear::new(config).unwrap();
    assert!(gear.has_full_round_fillet());

    let layout = gear.tooth_layout().unwrap();
    assert_eq!(layout.regions().len(), 6);
    assert_eq!(layout.key_points().len(), 12);

    let tooth = gear.tooth_mesh().unwrap();
    assert_eq!(tooth.mesh.cell_count(), 90);
    support::assert_valid_mesh(&tooth.mesh);

    let mesh = gear.generate_mesh().unwrap();
    assert_eq!(mesh.cell_count(), 1800);
    assert_eq!(mesh.node_count(), 2120);
    support::assert_valid_mesh(mesh);
    assert_eq!(support::closure_misses(mesh, 20, 1e-7), 0);
}

#[test]
fn standard_tool_uses_root_arc_layout() {
    let gear = ExternalGear::new(support::spur_config()).unwrap();
    assert!(!gear.has_full_round_fillet());
    let layout = gear.tooth_layout().unwrap();
    assert_eq!(layout.regions().len(), 8);
    assert_eq!(layout.key_points().len(), 16);
    HalfEdgeTable::from_layout(&layout).unwrap().validate().unwrap();
}

#[test]
fn helical_shifted_chamfered_gear() {
    let config = ExternalGearConfig::new(
        GearConfig::new(3.0, 31, 20.0)
            .with_helix_angle(15.0)
            .with_shift(0.2)
            .with_resolution(MeshResolution::new(8, 6, 4, 3, 3)),
        60.0,
    )
    .with_chamfer_diameter(0.5);
    let mut gear = ExternalGear::new(config).unwrap();
    assert!(support::approx_eq(
        gear.radii().tip,
        gear.nominal_tip_radius() - 0.25,
        1e-12
    ));

    let tooth = gear.tooth_mesh().unwrap();
    let mesh = gear.generate_mesh().unwrap();
    assert_eq!(mesh.cell_count(), 31 * tooth.mesh.cell_count());
    assert_eq!(mesh.node_count(), 31 * (tooth.mesh.node_count() - tooth.seam.len()));
    support::assert_valid_mesh(mesh);
}

#[test]
fn profile_is_mirror_symmetric() {
    let gear = ExternalGear::new(support::spur_config()).unwrap();
    let profile = gear.profile().unwrap();
    assert_eq!(profile.transition.len(), 6);
    assert_eq!(profile.involute.len(), 6);
    assert!(profile.half().iter().all(|p| p.x < 0.0));

    let full = profile.full();
    let n = full.len();
    for i in 0..n {
        assert!(support::approx_eq(full[n - 1 - i].x, -full[i].x, 1e-12));
        assert!(support::approx_eq(full[n - 1 - i].y, full[i].y, 1e-12));
    }

    let radii = gear.radii();
    let root = profile.root_point().unwrap().coords.norm();
    let tip = profile.tip_point().unwrap().coords.norm();
    assert!(support::approx_eq(root, radii.root, 1e-9));
    assert!(support::approx_eq(tip, radii.tip, 1e-9));
}

#[test]
fn fillet_meets_flank_without_gap() {
    let gear = ExternalGear::new(support::spur_config()).unwrap();
    let profile = gear.profile().unwrap();
    let junction = profile.transition.last().unwrap();
    assert!((profile.involute[0] - junction).norm() < 1e-9);

    let layout = gear.tooth_layout().unwrap();
    let key = layout.key_points();
    assert_eq!(key[1], mirror(&key[4]));
    assert_eq!(key[2], mirror(&key[5]));
    assert!(support::approx_eq(key[9].y, gear.radii().tip, 1e-12));
    assert!(key[7].y < key[8].y && key[8].y < key[9].y);
}

#[test]
fn radii_are_ordered() {
    let config = ExternalGearConfig::new(GearConfig::new(2.0, 60, 20.0), 80.0);
    let radii = ExternalGear::new(config).unwrap().radii();
    assert!(radii.base <= radii.root);
    assert!(radii.root <= radii.pitch && radii.pitch <= radii.tip);

    let radii = ExternalGear::new(support::spur_config()).unwrap().radii();
    assert!(radii.root < radii.pitch && radii.pitch < radii.tip);
    assert!(radii.base < radii.pitch);
}

#[test]
fn regenerating_replaces_the_mesh() {
    let mut gear = ExternalGear::new(support::spur_config()).unwrap();
    assert!(gear.mesh().is_none());
    let first = gear.generate_mesh().unwrap().clone();
    let second = gear.generate_mesh().unwrap();
    assert_eq!(&first, second);
}

/// m = 2 mm, α = 20°, standard rack, n = (5, 5, 5, 3, 3).
fn small_gear(teeth: usize, shift: Real, inner_diameter: Real) -> ExternalGearConfig {
    ExternalGearConfig::new(
        GearConfig::new(2.0, teeth, 20.0)
            .with_shift(shift)
            .with_resolution(MeshResolution::new(5, 5, 5, 3, 3)),
        inner_diameter,
    )
}

fn assert_radius_grows_from_root_to_tip(gear: &ExternalGear) {
    let profile = gear.profile().unwrap();
    let junction = profile.transition.last().unwrap();
    assert!((profile.involute[0] - junction).norm() < 1e-9);
    let half = profile.half();
    for pair in half.windows(2) {
        assert!(pair[1].coords.norm() > pair[0].coords.norm(), "profile folds back at {pair:?}");
    }
}

#[test]
fn undercut_full_round_gear_keeps_cells_convex() {
    let standard = ExternalGear::new(small_gear(8, -0.5, 6.0)).unwrap();
    let mut config = small_gear(8, -0.5, 6.0);
    config.gear = config.gear.with_tip_radius_coefficient(standard.max_tip_radius_coefficient());
    let mut gear = ExternalGear::new(config).unwrap();
    assert!(gear.has_full_round_fillet());
    assert_radius_grows_from_root_to_tip(&gear);

    // the involute starts where the fillet crosses it, past the tool's
    // straight-flank junction
    let profile = gear.profile().unwrap();
    let untrimmed = gear.cutter().involute(gear.cutter().involute_start());
    assert!((profile.involute[0] - untrimmed).norm() > 1e-3);

    let mesh = gear.build_mesh().unwrap();
    assert!(mesh.inverted_cells().is_empty());
    assert_eq!(mesh.cell_count(), 8 * 90);
    assert_eq!(mesh.node_count(), 848);
    support::assert_valid_mesh(&mesh);
    assert_eq!(support::closure_misses(&mesh, 8, 1e-7), 0);
    assert!(gear.generate_mesh().is_ok());
}

#[test]
fn ten_tooth_gear_is_undercut_but_valid() {
    let gear = ExternalGear::new(small_gear(10, 0.0, 10.0)).unwrap();
    assert!(!gear.has_full_round_fillet());
    assert_radius_grows_from_root_to_tip(&gear);

    let mesh = gear.build_mesh().unwrap();
    assert!(mesh.inverted_cells().is_empty());
    assert_eq!(mesh.cell_count(), 10 * 120);
    assert_eq!(mesh.node_count(), 1420);
    support::assert_valid_mesh(&mesh);
    assert_eq!(support::closure_misses(&mesh, 10, 1e-7), 0);
}

#[test]
fn mildly_undercut_gears_mesh_cleanly() {
    for (teeth, shift) in [(8, -0.3), (12, -0.2), (14, 0.0), (17, 0.0)] {
        let gear = ExternalGear::new(small_gear(teeth, shift, 6.0)).unwrap();
        assert_radius_grows_from_root_to_tip(&gear);
        let mesh = gear.build_mesh().unwrap();
        assert!(mesh.inverted_cells().is_empty(), "z = {teeth}, x = {shift}");
    }
}

#[test]
fn pointed_tooth_is_rejected() {
    let gear = ExternalGear::new(small_gear(6, 0.6, 4.0)).unwrap();
    let err = gear.build_mesh().unwrap_err();
    assert!(err.is_invalid_configuration());
    assert!(err.to_string().contains("pointed"));
}

#[test]
fn invalid_configurations() {
    let single = ExternalGearConfig::new(GearConfig::new(2.0, 1, 20.0), 0.5);
    assert!(ExternalGear::new(single).unwrap_err().is_invalid_configuration());

    let flat = ExternalGearConfig::new(GearConfig::new(0.0, 20, 20.0), 20.0);
    assert!(ExternalGear::new(flat).unwrap_err().is_invalid_configuration());

    let solid = ExternalGearConfig::new(GearConfig::new(2.0, 20, 20.0), 36.0);
    assert!(ExternalGear::new(solid).unwrap_err().is_invalid_configuration());

    let sharp = ExternalGearConfig::new(
        GearConfig::new(2.0, 20, 20.0).with_tip_radius_coefficient(0.6),
        20.0,
    );
    let err = ExternalGear::new(sharp).unwrap_err();
    assert!(err.to_string().contains("full-round"));

    let steep = ExternalGearConfig::new(GearConfig::new(2.0, 20, FRAC_PI_2), 20.0);
    assert!(ExternalGear::new(steep).unwrap_err().is_invalid_configuration());
}

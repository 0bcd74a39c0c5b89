// main.rs
//
// Meshes one external and one internal gear, prints the mesh sizes and, with
// the svg-io feature, writes the meshes to the svg/ folder.

use gearmesh::gear::{
    ExternalGear, ExternalGearConfig, Gear, GearConfig, InternalGear, InternalGearConfig,
    MeshResolution,
};
use gearmesh::mesh::QuadMesh;

fn report(name: &str, mesh: &QuadMesh) {
    println!(
        "{name}: {} nodes, {} cells, {} inverted, area {:.3} mm²",
        mesh.node_count(),
        mesh.cell_count(),
        mesh.inverted_cells().len(),
        mesh.area()
    );
    #[cfg(feature = "svg-io")]
    {
        let _ = std::fs::create_dir_all("svg");
        if let Err(err) = gearmesh::io::svg::write_svg(mesh, format!("svg/{name}.svg")) {
            eprintln!("{name}: could not write svg: {err}");
        }
    }
}

fn main() -> gearmesh::Result<()> {
    #[cfg(feature = "log-subscriber")]
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // m = 2 mm, z = 20, α = 20°, standard rack, rim of 20 mm
    let spur = ExternalGearConfig::new(GearConfig::new(2.0, 20, 20.0), 20.0);
    let mut gear = ExternalGear::new(spur)?;
    report("external_spur", gear.generate_mesh()?);

    // helical, shifted and chamfered
    let helical = ExternalGearConfig::new(
        GearConfig::new(3.0, 31, 20.0)
            .with_helix_angle(15.0)
            .with_shift(0.2)
            .with_resolution(MeshResolution::new(8, 6, 4, 3, 3)),
        60.0,
    )
    .with_chamfer_diameter(0.5);
    let mut gear = ExternalGear::new(helical)?;
    report("external_helical", gear.generate_mesh()?);

    // ring gear cut by a 20-tooth pinion cutter
    let ring = InternalGearConfig::new(GearConfig::new(2.0, 40, 20.0), 100.0, 20);
    let mut gear = InternalGear::new(ring)?;
    report("internal_ring", gear.generate_mesh()?);

    // small tool tip radius: the cutter tip circle cuts its own root arc
    let thin = InternalGearConfig::new(
        GearConfig::new(2.0, 60, 20.0).with_tip_radius_coefficient(0.1),
        140.0,
        25,
    );
    let mut gear = InternalGear::new(thin)?;
    report("internal_filleted_tip", gear.generate_mesh()?);

    Ok(())
}

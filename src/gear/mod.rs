//! Involute gears and their sector meshes.
//!
//! Both gear kinds go through the same pipeline: the cutting kinematics
//! give one flank ([`ToothProfile`]), the flank and a few derived key
//! points are laid out as four-sided sub-domains ([`SubDomainLayout`]),
//! the sub-domains are meshed and the tooth mesh is stitched into the full
//! wheel.

use crate::errors::Result;
use crate::float_types::Real;
use crate::mesh::QuadMesh;
use crate::mesh::half_edge::HalfEdgeTable;
use crate::mesh::layout::SubDomainLayout;
use crate::mesh::stitch::{Seam, stitch};
use crate::mesh::subdomain::sub_domain_mesh_generator;

pub mod config;
pub mod external;
pub mod internal;
pub mod kernel;
pub mod profile;

pub use config::{ExternalGearConfig, GearConfig, InternalGearConfig, MeshResolution};
pub use external::ExternalGear;
pub use internal::{CutterTip, InternalGear};
pub use profile::ToothProfile;

/// Characteristic radii of a gear.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GearRadii {
    /// Base circle of the involute flank
    pub base: Real,
    /// Root circle
    pub root: Real,
    /// Pitch circle
    pub pitch: Real,
    /// Tip circle (effective, after chamfering)
    pub tip: Real,
}

/// Mesh of a single tooth sector with its two seams.
#[derive(Debug, Clone)]
pub struct ToothMesh {
    pub mesh: QuadMesh,
    pub seam: Seam,
}

impl ToothMesh {
    /// Meshes `layout` and resolves its seam chains to node indices.
    ///
    /// # Errors
    /// [`crate::errors::GearError::TopologyInconsistency`] if the layout is
    /// not a valid subdivision.
    pub fn from_layout(layout: &SubDomainLayout) -> Result<Self> {
        layout.check_lines()?;
        let table = HalfEdgeTable::from_layout(layout)?;
        let generated = sub_domain_mesh_generator(&table, layout.key_points(), &layout.lines())?;
        let seam = Seam::new(
            generated.chain_nodes(layout.start_seam())?,
            generated.chain_nodes(layout.end_seam())?,
        );
        Ok(Self {
            mesh: generated.mesh,
            seam,
        })
    }
}

/// Common surface of [`ExternalGear`] and [`InternalGear`].
pub trait Gear {
    fn config(&self) -> &GearConfig;

    fn radii(&self) -> GearRadii;

    /// One flank, root to tip.
    fn profile(&self) -> Result<ToothProfile>;

    /// Sub-domain decomposition of one tooth sector.
    fn tooth_layout(&self) -> Result<SubDomainLayout>;

    /// The mesh stored by the last successful [`Gear::generate_mesh`].
    fn mesh(&self) -> Option<&QuadMesh>;

    /// Builds the full-wheel mesh and stores it, replacing any earlier one.
    /// On failure the stored mesh is left untouched.
    fn generate_mesh(&mut self) -> Result<&QuadMesh>;

    fn tooth_mesh(&self) -> Result<ToothMesh> {
        ToothMesh::from_layout(&self.tooth_layout()?)
    }

    /// The full-wheel mesh, without storing it.
    fn build_mesh(&self) -> Result<QuadMesh> {
        let tooth = self.tooth_mesh()?;
        log::debug!(
            "tooth mesh: {} nodes, {} cells, seam of {} nodes",
            tooth.mesh.node_count(),
            tooth.mesh.cell_count(),
            tooth.seam.len()
        );
        stitch(&tooth.mesh, tooth.seam, self.config().teeth)
    }
}

use crate::float_types::Real;
use crate::mesh::QuadMesh;
use ::svg::Document;
use ::svg::node::element::{Group, Polygon};
use std::path::Path;

/// Render the cells of `mesh` as outlined polygons.
///
/// The picture is flipped so that y points up, as in the gear frame. Stroke
/// width scales with the mesh size.
///
/// ```rust
/// # use gearmesh::mesh::QuadMesh;
/// # use nalgebra::Point2;
/// let mesh = QuadMesh::new(
///     vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(1.0, 1.0), Point2::new(0.0, 1.0)],
///     vec![[0, 1, 2, 3]],
/// );
/// let svg = gearmesh::io::svg::to_svg(&mesh);
/// assert!(svg.contains("<polygon"));
/// ```
pub fn to_svg(mesh: &QuadMesh) -> String {
    document(mesh).to_string()
}

/// Write [`to_svg`] output to `path`.
pub fn write_svg<P: AsRef<Path>>(mesh: &QuadMesh, path: P) -> std::io::Result<()> {
    ::svg::save(path, &document(mesh))
}

fn document(mesh: &QuadMesh) -> Document {
    let (min, max) = mesh
        .bounding_box()
        .unwrap_or((nalgebra::Point2::origin(), nalgebra::Point2::new(1.0, 1.0)));
    let extent: Real = (max.x - min.x).max(max.y - min.y).max(Real::EPSILON);
    let margin = 0.02 * extent;
    let stroke = 0.001 * extent;

    let mut cells = Group::new()
        .set("fill", "none")
        .set("stroke", "black")
        .set("stroke-width", stroke)
        .set("transform", "scale(1,-1)");
    for cell in &mesh.cells {
        let points = cell
            .iter()
            .map(|&n| format!("{},{}", mesh.nodes[n].x, mesh.nodes[n].y))
            .collect::<Vec<_>>()
            .join(" ");
        cells = cells.add(Polygon::new().set("points", points));
    }

    Document::new()
        .set(
            "viewBox",
            (
                min.x - margin,
                -max.y - margin,
                max.x - min.x + 2.0 * margin,
                max.y - min.y + 2.0 * margin,
            ),
        )
        .add(cells)
}

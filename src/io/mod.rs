//! Export of meshes for inspection. Each format sits behind its own feature.

#[cfg(feature = "svg-io")]
pub mod svg;

//! Structured **quadrilateral meshes** of involute gear cross-sections, for
//! external gears cut by a rack and internal gears cut by a pinion cutter.
//!
//! One tooth flank is computed from the cutting kinematics, the tooth
//! sector is split into four-sided sub-domains described by a half-edge
//! table, each sub-domain is meshed with a structured grid and the tooth
//! mesh is replicated `z` times by rotation, sharing the nodes on the seams
//! between neighbouring teeth.
//!
//! ```rust
//! use gearmesh::gear::{ExternalGear, ExternalGearConfig, Gear, GearConfig};
//!
//! # fn main() -> gearmesh::errors::Result<()> {
//! let config = ExternalGearConfig::new(GearConfig::new(2.0, 20, 20.0), 20.0);
//! let mut gear = ExternalGear::new(config)?;
//! let mesh = gear.generate_mesh()?;
//! assert_eq!(mesh.cell_count() % 20, 0);
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//! #### Default
//! - **svg-io**: export meshes as `.svg` drawings
//! - **log-subscriber**: install a `tracing-subscriber` logger in the demo binary
//!
//! #### Optional
//! - **parallel**: use rayon for multithreading
//! - **serde**: (de)serialize configurations and meshes

#![forbid(unsafe_code)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod errors;
pub mod float_types;
pub mod gear;
pub mod io;
pub mod mesh;
pub mod solver;

pub use errors::{GearError, Result};
pub use gear::{ExternalGear, Gear, InternalGear};
pub use mesh::QuadMesh;

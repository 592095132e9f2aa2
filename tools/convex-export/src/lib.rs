//! convex-export library
//!
//! Batch export of named meshes into a glTF container plus a convex
//! collision shape per mesh. For each mesh `<name>` the output directory gets
//! `<name>.glb` (or `<name>.gltf` + `<name>.bin`) and `<name>.convexshape`.
//!
//! ```no_run
//! use convex_export::{run_batch, ExportConfig, Mesh};
//!
//! let cube = Mesh::new(
//!     "Box",
//!     (0..8)
//!         .map(|i| [(i & 1) as f32, ((i >> 1) & 1) as f32, ((i >> 2) & 1) as f32])
//!         .collect(),
//!     vec![vec![0, 2, 3, 1], vec![4, 5, 7, 6]],
//! );
//!
//! let config = ExportConfig {
//!     output_dir: "out".into(),
//!     ..Default::default()
//! };
//! let result = run_batch(&[cube], &config)?;
//! println!("{}", result.summary_line());
//! # Ok::<(), convex_export::ConfigError>(())
//! ```

pub mod asset;
pub mod batch;
pub mod error;
pub mod manifest;
pub mod mesh;
pub mod obj;
pub mod shape;

pub use asset::{write_asset, AssetContainer, AssetStats, ExportOptions};
pub use batch::{
    check_batch, export_item, run_batch, BatchResult, ExportConfig, ItemOutcome, ItemResult,
    ItemState,
};
pub use error::{ConfigError, ExportError};
pub use mesh::{Mesh, MeshError};
pub use shape::{parse_shape, serialize_shape, ShapeParseError, ShapeRecord};

// Re-export the hull engine for callers that only need shapes
pub use convex_hull::{compute_hull, HullKind, HullPolytope, Point3};

//! GLB/GLTF generation utilities for convex-export
//!
//! This library provides builder-pattern APIs for constructing glTF 2.0 assets:
//! - BufferBuilder: Pack one aligned binary payload and its accessors
//! - MeshBuilder: Positions, optional normals, and u16/u32 triangle indices
//! - GltfBuilder: Top-level GLTF document construction
//! - assemble_glb / serialize_gltf: Single-file GLB or `.gltf` + `.bin` output
//!
//! # Example
//!
//! ```
//! use glb_builder::*;
//!
//! let mut buffer = BufferBuilder::new();
//! let mesh = MeshBuilder::new()
//!     .positions(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 1.0, 0.0]])
//!     .indices(&[0, 1, 2])
//!     .build(&mut buffer);
//!
//! let gltf = GltfBuilder::new()
//!     .buffer_byte_length(buffer.data().len() as u64)
//!     .add_mesh_from_accessors("Triangle", &mesh);
//!
//! // The whole payload sits behind one buffer view
//! let root = gltf.build(&[buffer.view()], buffer.accessors(), "glb-builder");
//! let glb_bytes = assemble_glb(&root, buffer.data()).unwrap();
//! assert_eq!(&glb_bytes[0..4], b"glTF");
//! ```

pub mod buffer;
pub mod document;
pub mod error;
pub mod mesh;
pub mod utils;

pub use buffer::{AccessorIndex, BufferBuilder, IndexWidth};
pub use document::GltfBuilder;
pub use error::ContainerError;
pub use mesh::{MeshAccessors, MeshBuilder, PrimitiveMode};
pub use utils::{
    align_buffer, assemble_glb, compute_bounds, read_glb_layout, serialize_gltf, GlbLayout,
};

// Re-export commonly used gltf-json types
pub use gltf_json as json;
pub use gltf_json::validation::Checked::Valid;

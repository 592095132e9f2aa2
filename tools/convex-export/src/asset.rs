//! Asset container writer
//!
//! Serializes one mesh into a glTF 2.0 container. The binary payload holds
//! the vertex positions as little-endian `f32` triples, followed by the
//! fan-triangulated indices (`u16` while the vertex count fits, `u32`
//! otherwise), followed by normals when requested. One buffer view spans the
//! payload and each accessor points into it by byte offset.
//!
//! The mesh is written as-is in the Z-up export space; no axis conversion
//! happens here.

use crate::ExportError;
use crate::mesh::Mesh;
use glb_builder::{
    assemble_glb, serialize_gltf, BufferBuilder, GltfBuilder, IndexWidth, MeshBuilder,
    PrimitiveMode,
};
use std::path::{Path, PathBuf};

/// Single-file binary container extension
pub const GLB_EXT: &str = "glb";
/// Split container JSON extension
pub const GLTF_EXT: &str = "gltf";
/// Split container payload extension
pub const BIN_EXT: &str = "bin";

const GENERATOR: &str = concat!("convex-export ", env!("CARGO_PKG_VERSION"));

/// Container writer options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Add a NORMAL accessor with area-weighted vertex normals
    pub embed_normals: bool,
    /// Write one `.glb`; otherwise `.gltf` JSON plus a `.bin` payload
    pub single_file: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            embed_normals: false,
            single_file: true,
        }
    }
}

/// Serialized container bytes, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetContainer {
    /// A complete GLB file
    Binary(Vec<u8>),
    /// glTF JSON whose buffer points at a companion payload file
    Split { gltf: Vec<u8>, bin: Vec<u8> },
}

impl AssetContainer {
    /// Files this container occupies for mesh `name` in `dir`, with their contents.
    pub fn files<'a>(&'a self, dir: &Path, name: &str) -> Vec<(PathBuf, &'a [u8])> {
        match self {
            AssetContainer::Binary(glb) => {
                vec![(dir.join(format!("{name}.{GLB_EXT}")), glb.as_slice())]
            }
            AssetContainer::Split { gltf, bin } => vec![
                (dir.join(format!("{name}.{GLTF_EXT}")), gltf.as_slice()),
                (dir.join(format!("{name}.{BIN_EXT}")), bin.as_slice()),
            ],
        }
    }
}

/// Summary of what went into a container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetStats {
    pub vertex_count: usize,
    pub index_count: usize,
    pub index_width: Option<IndexWidth>,
    pub payload_len: usize,
}

/// Builds the container for `mesh`.
///
/// The mesh is validated first, so a malformed mesh fails before any bytes
/// exist.
pub fn write_asset(
    mesh: &Mesh,
    options: &ExportOptions,
) -> Result<(AssetContainer, AssetStats), ExportError> {
    mesh.validate()?;
    let indices = mesh.fan_indices()?;

    let mut buffer = BufferBuilder::new();
    let mut builder = MeshBuilder::new()
        .positions(&mesh.vertices)
        .indices(&indices);
    if options.embed_normals {
        builder = builder.normals(&mesh.vertex_normals(&indices));
    }
    let accessors = builder.build(&mut buffer);

    let mut gltf = GltfBuilder::new()
        .buffer_byte_length(buffer.data().len() as u64)
        .add_mesh_from_accessors(&mesh.name, &accessors);
    if let Some(mesh_index) = gltf.last_mesh_index() {
        gltf = gltf.add_mesh_node(&mesh.name, mesh_index);
    }
    let roots: Vec<u32> = (0..gltf.node_count()).collect();
    gltf = gltf.add_scene("Scene", &roots);
    if !options.single_file {
        gltf = gltf.buffer_uri(format!("{}.{BIN_EXT}", mesh.name));
    }

    let root = gltf.build(&[buffer.view()], buffer.accessors(), GENERATOR);

    let stats = AssetStats {
        vertex_count: mesh.vertex_count(),
        index_count: indices.len(),
        index_width: accessors.index_width,
        payload_len: buffer.data().len(),
    };

    tracing::debug!(
        vertices = stats.vertex_count,
        indices = stats.index_count,
        index_width = ?stats.index_width,
        points = accessors.mode == PrimitiveMode::Points,
        payload = stats.payload_len,
        "packed asset container"
    );

    let container = if options.single_file {
        AssetContainer::Binary(assemble_glb(&root, buffer.data())?)
    } else {
        AssetContainer::Split {
            gltf: serialize_gltf(&root)?,
            bin: buffer.into_data(),
        }
    };

    Ok((container, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshError;

    fn triangle() -> Mesh {
        Mesh::new(
            "Tri",
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![vec![0, 1, 2]],
        )
    }

    #[test]
    fn test_default_options() {
        let options = ExportOptions::default();
        assert!(!options.embed_normals);
        assert!(options.single_file);
    }

    #[test]
    fn test_single_file_container() {
        let (container, stats) = write_asset(&triangle(), &ExportOptions::default()).unwrap();
        let AssetContainer::Binary(glb) = &container else {
            panic!("expected a GLB");
        };
        assert_eq!(&glb[0..4], b"glTF");
        assert_eq!(u32::from_le_bytes([glb[8], glb[9], glb[10], glb[11]]) as usize, glb.len());
        assert_eq!(stats.index_width, Some(IndexWidth::U16));
        // 36 bytes of positions, 6 bytes of indices padded to 8
        assert_eq!(stats.payload_len, 44);

        let files = container.files(Path::new("out"), "Tri");
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].0, Path::new("out").join("Tri.glb"));
    }

    #[test]
    fn test_split_container() {
        let options = ExportOptions {
            single_file: false,
            ..Default::default()
        };
        let (container, stats) = write_asset(&triangle(), &options).unwrap();
        let AssetContainer::Split { gltf, bin } = &container else {
            panic!("expected split output");
        };
        assert_eq!(bin.len(), stats.payload_len);
        let text = std::str::from_utf8(gltf).unwrap();
        assert!(text.contains("\"uri\": \"Tri.bin\""));

        let names: Vec<PathBuf> = container
            .files(Path::new("out"), "Tri")
            .into_iter()
            .map(|(p, _)| p)
            .collect();
        assert_eq!(
            names,
            vec![Path::new("out").join("Tri.gltf"), Path::new("out").join("Tri.bin")]
        );
    }

    #[test]
    fn test_normals_extend_payload() {
        let options = ExportOptions {
            embed_normals: true,
            ..Default::default()
        };
        let (_, stats) = write_asset(&triangle(), &options).unwrap();
        assert_eq!(stats.payload_len, 44 + 36);
    }

    #[test]
    fn test_malformed_mesh_fails_before_output() {
        let mut mesh = triangle();
        mesh.faces.push(vec![0, -1, 2]);
        let err = write_asset(&mesh, &ExportOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            ExportError::MalformedMesh(MeshError::IndexOutOfRange { index: -1, .. })
        ));
    }
}

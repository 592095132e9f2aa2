//! High-level mesh construction

use crate::buffer::{AccessorIndex, BufferBuilder, IndexWidth};

/// How the primitive's vertices are assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveMode {
    Triangles,
    Points,
}

/// Accessor indices for a mesh
#[derive(Debug, Clone)]
pub struct MeshAccessors {
    pub positions: AccessorIndex,
    pub normals: Option<AccessorIndex>,
    pub indices: Option<AccessorIndex>,
    pub index_width: Option<IndexWidth>,
    pub mode: PrimitiveMode,
}

/// Builder for mesh data
///
/// Packs positions first, then triangle indices, then normals.
pub struct MeshBuilder {
    positions: Vec<[f32; 3]>,
    normals: Option<Vec<[f32; 3]>>,
    indices: Option<Vec<u32>>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            normals: None,
            indices: None,
        }
    }

    /// Set positions (required)
    pub fn positions(mut self, positions: &[[f32; 3]]) -> Self {
        self.positions = positions.to_vec();
        self
    }

    /// Set normals (optional)
    pub fn normals(mut self, normals: &[[f32; 3]]) -> Self {
        self.normals = Some(normals.to_vec());
        self
    }

    /// Set triangle indices (optional)
    ///
    /// Without indices, or with an empty list, the mesh is emitted as points.
    pub fn indices(mut self, indices: &[u32]) -> Self {
        self.indices = Some(indices.to_vec());
        self
    }

    /// Build and pack into buffer
    pub fn build(self, buffer: &mut BufferBuilder) -> MeshAccessors {
        let positions = buffer.pack_positions(&self.positions);

        let (indices, index_width) = match self.indices.as_deref() {
            Some(indices) if !indices.is_empty() => {
                let width = IndexWidth::for_vertex_count(self.positions.len());
                (Some(buffer.pack_indices(indices, width)), Some(width))
            }
            _ => (None, None),
        };

        let normals = self.normals.as_ref().map(|n| buffer.pack_vec3(n));

        MeshAccessors {
            positions,
            normals,
            indices,
            index_width,
            mode: if indices.is_some() {
                PrimitiveMode::Triangles
            } else {
                PrimitiveMode::Points
            },
        }
    }
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self::new()
    }
}

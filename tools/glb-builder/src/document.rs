//! GLTF document construction

use crate::mesh::{MeshAccessors, PrimitiveMode};
use gltf_json as json;
use gltf_json::validation::Checked::Valid;
use std::collections::BTreeMap;

/// Builder for complete GLTF documents
pub struct GltfBuilder {
    nodes: Vec<json::Node>,
    meshes: Vec<json::Mesh>,
    scenes: Vec<json::Scene>,
    buffer_byte_length: u64,
    buffer_uri: Option<String>,
}

impl GltfBuilder {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            meshes: Vec::new(),
            scenes: Vec::new(),
            buffer_byte_length: 0,
            buffer_uri: None,
        }
    }

    /// Set buffer byte length (required before building)
    pub fn buffer_byte_length(mut self, length: u64) -> Self {
        self.buffer_byte_length = length;
        self
    }

    /// Point the buffer at an external file instead of the GLB binary chunk
    pub fn buffer_uri(mut self, uri: impl Into<String>) -> Self {
        self.buffer_uri = Some(uri.into());
        self
    }

    /// Add a mesh with a single primitive
    pub fn add_mesh_from_accessors(mut self, name: &str, accessors: &MeshAccessors) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert(
            Valid(json::mesh::Semantic::Positions),
            accessors.positions.as_json_index(),
        );

        if let Some(normals) = accessors.normals {
            attributes.insert(
                Valid(json::mesh::Semantic::Normals),
                normals.as_json_index(),
            );
        }

        let mode = match accessors.mode {
            PrimitiveMode::Triangles => json::mesh::Mode::Triangles,
            PrimitiveMode::Points => json::mesh::Mode::Points,
        };

        let primitive = json::mesh::Primitive {
            attributes,
            extensions: Default::default(),
            extras: Default::default(),
            indices: accessors.indices.map(|i| i.as_json_index()),
            material: None,
            mode: Valid(mode),
            targets: None,
        };

        self.meshes.push(json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(name.to_string()),
            primitives: vec![primitive],
            weights: None,
        });

        self
    }

    /// Get the index of the last added mesh
    pub fn last_mesh_index(&self) -> Option<json::Index<json::Mesh>> {
        if self.meshes.is_empty() {
            None
        } else {
            Some(json::Index::new(self.meshes.len() as u32 - 1))
        }
    }

    /// Add a node instancing a mesh
    pub fn add_mesh_node(mut self, name: &str, mesh: json::Index<json::Mesh>) -> Self {
        self.nodes.push(json::Node {
            camera: None,
            children: None,
            extensions: Default::default(),
            extras: Default::default(),
            matrix: None,
            mesh: Some(mesh),
            name: Some(name.to_string()),
            rotation: None,
            scale: None,
            translation: None,
            skin: None,
            weights: None,
        });
        self
    }

    /// Number of nodes added so far; node indices run `0..node_count()`.
    pub fn node_count(&self) -> u32 {
        self.nodes.len() as u32
    }

    /// Add a scene
    pub fn add_scene(mut self, name: &str, root_nodes: &[u32]) -> Self {
        self.scenes.push(json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(name.to_string()),
            nodes: root_nodes.iter().map(|n| json::Index::new(*n)).collect(),
        });
        self
    }

    /// Build final GLTF Root (requires the buffer view and accessors from BufferBuilder)
    pub fn build(
        self,
        buffer_views: &[json::buffer::View],
        accessors: &[json::Accessor],
        generator: &str,
    ) -> json::Root {
        let buffers = vec![json::Buffer {
            byte_length: self.buffer_byte_length.into(),
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            uri: self.buffer_uri,
        }];

        json::Root {
            accessors: accessors.to_vec(),
            animations: Vec::new(),
            asset: json::Asset {
                copyright: None,
                extensions: Default::default(),
                extras: Default::default(),
                generator: Some(generator.to_string()),
                min_version: None,
                version: "2.0".to_string(),
            },
            buffers,
            buffer_views: buffer_views.to_vec(),
            cameras: Vec::new(),
            extensions: Default::default(),
            extensions_required: Vec::new(),
            extensions_used: Vec::new(),
            extras: Default::default(),
            images: Vec::new(),
            materials: Vec::new(),
            meshes: self.meshes,
            nodes: self.nodes,
            samplers: Vec::new(),
            scene: if self.scenes.is_empty() {
                None
            } else {
                Some(json::Index::new(0))
            },
            scenes: self.scenes,
            skins: Vec::new(),
            textures: Vec::new(),
        }
    }
}

impl Default for GltfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

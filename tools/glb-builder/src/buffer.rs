//! Binary payload packing with automatic alignment and accessor creation
//!
//! Every block lands in one contiguous payload that a single buffer view
//! spans. Blocks start on a 4-byte boundary, so each accessor's byte offset
//! is a multiple of its component size.

use crate::utils::{align_buffer, compute_bounds};
use gltf_json as json;
use gltf_json::validation::Checked::Valid;

/// Accessor index returned by buffer operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessorIndex(pub u32);

impl AccessorIndex {
    pub fn as_json_index(&self) -> json::Index<json::Accessor> {
        json::Index::new(self.0)
    }
}

/// Integer width of the index accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexWidth {
    U16,
    U32,
}

impl IndexWidth {
    /// Largest vertex count that still uses 16-bit indices.
    pub const U16_VERTEX_LIMIT: usize = 65535;

    /// 16-bit when every vertex fits, 32-bit otherwise.
    pub fn for_vertex_count(vertex_count: usize) -> Self {
        if vertex_count <= Self::U16_VERTEX_LIMIT {
            IndexWidth::U16
        } else {
            IndexWidth::U32
        }
    }

    pub fn byte_size(self) -> usize {
        match self {
            IndexWidth::U16 => 2,
            IndexWidth::U32 => 4,
        }
    }

    fn component_type(self) -> json::accessor::ComponentType {
        match self {
            IndexWidth::U16 => json::accessor::ComponentType::U16,
            IndexWidth::U32 => json::accessor::ComponentType::U32,
        }
    }
}

/// Builder for the binary payload and the accessors that describe it
pub struct BufferBuilder {
    buffer: Vec<u8>,
    accessors: Vec<json::Accessor>,
}

impl BufferBuilder {
    /// Create a new empty buffer builder
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            accessors: Vec::new(),
        }
    }

    /// Get the current accessor count
    pub fn accessor_count(&self) -> u32 {
        self.accessors.len() as u32
    }

    /// Get the binary buffer data
    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    /// Consume the builder, keeping only the payload bytes
    pub fn into_data(self) -> Vec<u8> {
        self.buffer
    }

    /// Get the accessors
    pub fn accessors(&self) -> &[json::Accessor] {
        &self.accessors
    }

    /// The one buffer view spanning the whole payload.
    ///
    /// No target is set because vertex and index data share the view.
    pub fn view(&self) -> json::buffer::View {
        json::buffer::View {
            buffer: json::Index::new(0),
            byte_length: self.buffer.len().into(),
            byte_offset: Some(0u64.into()),
            byte_stride: None,
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            target: None,
        }
    }

    /// Pack Vec3 positions with bounds calculation
    pub fn pack_positions(&mut self, positions: &[[f32; 3]]) -> AccessorIndex {
        let offset = self.write_floats(positions);
        let (min, max) = compute_bounds(positions);

        self.push_accessor(
            offset,
            positions.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec3,
            Some((min, max)),
        )
    }

    /// Pack Vec3 data without bounds (normals)
    pub fn pack_vec3(&mut self, data: &[[f32; 3]]) -> AccessorIndex {
        let offset = self.write_floats(data);
        self.push_accessor(
            offset,
            data.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec3,
            None,
        )
    }

    /// Pack indices as little-endian integers of the given width.
    ///
    /// Every index must fit in `width`; [`IndexWidth::for_vertex_count`]
    /// guarantees that for indices below the vertex count.
    pub fn pack_indices(&mut self, indices: &[u32], width: IndexWidth) -> AccessorIndex {
        align_buffer(&mut self.buffer);
        let offset = self.buffer.len();
        self.buffer.reserve(indices.len() * width.byte_size());

        match width {
            IndexWidth::U16 => {
                for &idx in indices {
                    debug_assert!(idx <= u16::MAX as u32, "index {idx} does not fit in u16");
                    self.buffer.extend_from_slice(&(idx as u16).to_le_bytes());
                }
            }
            IndexWidth::U32 => {
                for &idx in indices {
                    self.buffer.extend_from_slice(&idx.to_le_bytes());
                }
            }
        }

        let accessor = self.push_accessor(
            offset,
            indices.len(),
            width.component_type(),
            json::accessor::Type::Scalar,
            None,
        );
        align_buffer(&mut self.buffer);
        accessor
    }

    fn write_floats(&mut self, data: &[[f32; 3]]) -> usize {
        align_buffer(&mut self.buffer);
        let offset = self.buffer.len();
        for item in data {
            for f in item {
                self.buffer.extend_from_slice(&f.to_le_bytes());
            }
        }
        offset
    }

    fn push_accessor(
        &mut self,
        offset: usize,
        count: usize,
        component: json::accessor::ComponentType,
        type_: json::accessor::Type,
        bounds: Option<(Vec<f32>, Vec<f32>)>,
    ) -> AccessorIndex {
        let to_json = |values: Vec<f32>| {
            json::Value::Array(values.into_iter().map(json::Value::from).collect())
        };
        let (min, max) = match bounds {
            Some((min, max)) => (Some(to_json(min)), Some(to_json(max))),
            None => (None, None),
        };

        let accessor_idx = self.accessors.len() as u32;
        self.accessors.push(json::Accessor {
            buffer_view: Some(json::Index::new(0)),
            byte_offset: Some((offset as u64).into()),
            count: count.into(),
            component_type: Valid(json::accessor::GenericComponentType(component)),
            extensions: Default::default(),
            extras: Default::default(),
            type_: Valid(type_),
            min,
            max,
            name: None,
            normalized: false,
            sparse: None,
        });
        AccessorIndex(accessor_idx)
    }
}

impl Default for BufferBuilder {
    fn default() -> Self {
        Self::new()
    }
}

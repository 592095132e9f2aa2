//! Utility functions for GLB construction

use crate::ContainerError;
use gltf_json as json;

/// File magic at offset 0
pub const GLB_MAGIC: [u8; 4] = *b"glTF";
pub const GLB_VERSION: u32 = 2;
pub const GLB_HEADER_LEN: usize = 12;
pub const CHUNK_HEADER_LEN: usize = 8;
/// "JSON"
pub const CHUNK_TYPE_JSON: u32 = 0x4E4F534A;
/// "BIN\0"
pub const CHUNK_TYPE_BIN: u32 = 0x004E4942;

/// Compute bounding box for positions
pub fn compute_bounds(positions: &[[f32; 3]]) -> (Vec<f32>, Vec<f32>) {
    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];

    for pos in positions {
        for i in 0..3 {
            min[i] = min[i].min(pos[i]);
            max[i] = max[i].max(pos[i]);
        }
    }

    (min.to_vec(), max.to_vec())
}

/// Align buffer to 4-byte boundary
pub fn align_buffer(buffer: &mut Vec<u8>) {
    while buffer.len() % 4 != 0 {
        buffer.push(0);
    }
}

fn padding_for(len: usize) -> usize {
    (4 - (len % 4)) % 4
}

/// Assemble GLB binary from JSON and buffer data
pub fn assemble_glb(root: &json::Root, buffer_data: &[u8]) -> Result<Vec<u8>, ContainerError> {
    let json_string = json::serialize::to_string(root)?;
    let json_bytes = json_string.as_bytes();

    // Pad JSON to 4-byte alignment
    let json_padding = padding_for(json_bytes.len());
    let json_chunk_length = json_bytes.len() + json_padding;

    // Pad buffer to 4-byte alignment
    let buffer_padding = padding_for(buffer_data.len());
    let buffer_chunk_length = buffer_data.len() + buffer_padding;

    // Total file length
    let total_length =
        GLB_HEADER_LEN + CHUNK_HEADER_LEN + json_chunk_length + CHUNK_HEADER_LEN + buffer_chunk_length;
    let total_u32 =
        u32::try_from(total_length).map_err(|_| ContainerError::TooLarge(total_length as u64))?;

    let mut glb = Vec::with_capacity(total_length);

    // GLB header
    glb.extend_from_slice(&GLB_MAGIC);
    glb.extend_from_slice(&GLB_VERSION.to_le_bytes());
    glb.extend_from_slice(&total_u32.to_le_bytes());

    // JSON chunk
    glb.extend_from_slice(&(json_chunk_length as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_TYPE_JSON.to_le_bytes());
    glb.extend_from_slice(json_bytes);
    glb.resize(glb.len() + json_padding, 0x20); // spaces keep the JSON valid

    // Binary chunk
    glb.extend_from_slice(&(buffer_chunk_length as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_TYPE_BIN.to_le_bytes());
    glb.extend_from_slice(buffer_data);
    glb.resize(glb.len() + buffer_padding, 0);

    debug_assert_eq!(glb.len(), total_length);
    Ok(glb)
}

/// Serialize a document as standalone `.gltf` JSON
pub fn serialize_gltf(root: &json::Root) -> Result<Vec<u8>, ContainerError> {
    Ok(serde_json::to_vec_pretty(root)?)
}

/// Layout of a GLB file as declared by its headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlbLayout {
    pub version: u32,
    pub declared_length: u32,
    /// Byte range of the JSON chunk content
    pub json: std::ops::Range<usize>,
    /// Byte range of the binary chunk content
    pub bin: Option<std::ops::Range<usize>>,
}

/// Read the header and chunk table of a GLB file.
///
/// Returns `None` when the magic is wrong or a chunk runs past the end of `bytes`.
pub fn read_glb_layout(bytes: &[u8]) -> Option<GlbLayout> {
    let word = |at: usize| -> Option<u32> {
        let raw = bytes.get(at..at + 4)?;
        Some(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
    };

    if bytes.get(0..4)? != GLB_MAGIC.as_slice() {
        return None;
    }
    let version = word(4)?;
    let declared_length = word(8)?;

    let mut at = GLB_HEADER_LEN;
    let mut chunk = |expected: u32| -> Option<std::ops::Range<usize>> {
        let len = word(at)? as usize;
        if word(at + 4)? != expected {
            return None;
        }
        let start = at + CHUNK_HEADER_LEN;
        let end = start.checked_add(len)?;
        if end > bytes.len() {
            return None;
        }
        at = end;
        Some(start..end)
    };

    let json = chunk(CHUNK_TYPE_JSON)?;
    let bin = chunk(CHUNK_TYPE_BIN);

    Some(GlbLayout {
        version,
        declared_length,
        json,
        bin,
    })
}

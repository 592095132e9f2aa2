//! Wavefront OBJ source loading
//!
//! Only geometry matters here: `v` positions and `f` faces. Texture
//! coordinates, normals, groups and materials are skipped. Faces keep their
//! full corner list; triangulation happens in the container writer.

use crate::ConfigError;
use crate::mesh::Mesh;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ObjError {
    #[error("Line {line}: vertex needs three coordinates")]
    ShortVertex { line: usize },

    #[error("Line {line}: invalid number {token:?}")]
    InvalidNumber { line: usize, token: String },

    #[error("Line {line}: invalid face reference {token:?}")]
    InvalidReference { line: usize, token: String },
}

/// Load an OBJ file as a mesh called `name`
pub fn load_obj(name: &str, path: &Path) -> Result<Mesh, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mesh = parse_obj(name, &text).map_err(|source| ConfigError::Obj {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(
        path = %path.display(),
        vertices = mesh.vertices.len(),
        faces = mesh.faces.len(),
        "loaded OBJ"
    );
    Ok(mesh)
}

/// Parse OBJ text.
///
/// Face references are converted to zero-based indices without range checks;
/// [`Mesh::validate`] reports bad ones against the mesh.
pub fn parse_obj(name: &str, text: &str) -> Result<Mesh, ObjError> {
    let mut vertices: Vec<[f32; 3]> = Vec::new();
    let mut faces: Vec<Vec<i64>> = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("v") => {
                let coords = parts
                    .take(3)
                    .map(|token| {
                        token.parse::<f32>().map_err(|_| ObjError::InvalidNumber {
                            line: line_no,
                            token: token.to_string(),
                        })
                    })
                    .collect::<Result<Vec<f32>, _>>()?;
                let [x, y, z] = coords[..] else {
                    return Err(ObjError::ShortVertex { line: line_no });
                };
                vertices.push([x, y, z]);
            }
            Some("f") => {
                let face = parts
                    .map(|token| parse_obj_vertex(token, vertices.len(), line_no))
                    .collect::<Result<Vec<i64>, _>>()?;
                faces.push(face);
            }
            _ => {}
        }
    }

    Ok(Mesh::new(name, vertices, faces))
}

/// Parse an OBJ vertex reference: "v", "v/vt", "v/vt/vn", or "v//vn"
///
/// Positive references are 1-based; negative ones count back from the most
/// recent vertex.
fn parse_obj_vertex(token: &str, defined: usize, line: usize) -> Result<i64, ObjError> {
    let invalid = || ObjError::InvalidReference {
        line,
        token: token.to_string(),
    };

    let raw: i64 = token
        .split('/')
        .next()
        .and_then(|v| v.parse().ok())
        .ok_or_else(invalid)?;

    match raw {
        0 => Err(invalid()),
        r if r > 0 => Ok(r - 1),
        r => Ok(defined as i64 + r),
    }
}

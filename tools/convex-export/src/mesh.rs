//! Mesh records handed to the export pipeline
//!
//! Positions are assumed to be in export space already (object transforms
//! applied, Z up). Faces are kept as the caller supplied them, n-gons included,
//! and validated before anything downstream touches them.

use convex_hull::Point3;
use glam::Vec3;

/// A named polygon mesh.
///
/// Face indices are signed so that bad input (a `-1` from a broken exporter)
/// survives until validation can report it.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<[f32; 3]>,
    pub faces: Vec<Vec<i64>>,
}

/// Why a mesh cannot be exported
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    #[error("Mesh has no vertices")]
    NoVertices,

    #[error("Mesh has {faces} faces but no vertices")]
    FacesWithoutVertices { faces: usize },

    #[error("Face {face} has {len} vertices, at least 3 are required")]
    FaceTooSmall { face: usize, len: usize },

    #[error("Face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        face: usize,
        index: i64,
        vertex_count: usize,
    },

    #[error("Vertex {index} has a non-finite coordinate")]
    NonFiniteVertex { index: usize },

    #[error("Invalid mesh name {0:?}: names become file names and must be non-empty without path separators")]
    InvalidName(String),
}

impl Mesh {
    pub fn new(name: impl Into<String>, vertices: Vec<[f32; 3]>, faces: Vec<Vec<i64>>) -> Self {
        Self {
            name: name.into(),
            vertices,
            faces,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Check every precondition the writers rely on.
    pub fn validate(&self) -> Result<(), MeshError> {
        validate_name(&self.name)?;

        if self.vertices.is_empty() {
            return Err(if self.faces.is_empty() {
                MeshError::NoVertices
            } else {
                MeshError::FacesWithoutVertices {
                    faces: self.faces.len(),
                }
            });
        }

        if let Some(index) = self
            .vertices
            .iter()
            .position(|v| !v.iter().all(|c| c.is_finite()))
        {
            return Err(MeshError::NonFiniteVertex { index });
        }

        self.fan_indices().map(|_| ())
    }

    /// Fan-triangulates every face from its first vertex.
    ///
    /// A face `[a, b, c, d]` becomes `[a, b, c, a, c, d]`. Fails on the first
    /// face that is too small or references a missing vertex.
    pub fn fan_indices(&self) -> Result<Vec<u32>, MeshError> {
        let vertex_count = self.vertices.len();
        let triangles: usize = self.faces.iter().map(|f| f.len().saturating_sub(2)).sum();
        let mut indices = Vec::with_capacity(triangles * 3);

        for (face, corners) in self.faces.iter().enumerate() {
            if corners.len() < 3 {
                return Err(MeshError::FaceTooSmall {
                    face,
                    len: corners.len(),
                });
            }

            let resolved = corners
                .iter()
                .map(|&index| {
                    usize::try_from(index)
                        .ok()
                        .filter(|&i| i < vertex_count)
                        .map(|i| i as u32)
                        .ok_or(MeshError::IndexOutOfRange {
                            face,
                            index,
                            vertex_count,
                        })
                })
                .collect::<Result<Vec<u32>, _>>()?;

            for pair in resolved[1..].windows(2) {
                indices.extend_from_slice(&[resolved[0], pair[0], pair[1]]);
            }
        }

        Ok(indices)
    }

    /// Area-weighted vertex normals over the fan triangulation.
    ///
    /// Vertices without incident area (isolated points, degenerate fans)
    /// get `+Z`.
    pub fn vertex_normals(&self, indices: &[u32]) -> Vec<[f32; 3]> {
        let mut sums = vec![Vec3::ZERO; self.vertices.len()];

        for tri in indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(self.vertices[i as usize]));
            // Cross product length is twice the triangle area
            let weighted = (b - a).cross(c - a);
            for &i in tri {
                sums[i as usize] += weighted;
            }
        }

        sums.into_iter()
            .map(|n| n.try_normalize().unwrap_or(Vec3::Z).to_array())
            .collect()
    }

    /// Vertex positions widened for the hull engine.
    pub fn hull_points(&self) -> Vec<Point3> {
        self.vertices
            .iter()
            .map(|v| Point3::new(v[0] as f64, v[1] as f64, v[2] as f64))
            .collect()
    }
}

fn validate_name(name: &str) -> Result<(), MeshError> {
    let bad = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if bad {
        Err(MeshError::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Mesh {
        Mesh::new(
            "Quad",
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            vec![vec![0, 1, 2, 3]],
        )
    }

    #[test]
    fn test_fan_triangulation() {
        assert_eq!(quad().fan_indices().unwrap(), vec![0, 1, 2, 0, 2, 3]);

        let mut pentagon = quad();
        pentagon.vertices.push([0.5, 1.5, 0.0]);
        pentagon.faces = vec![vec![4, 0, 1, 2, 3]];
        assert_eq!(
            pentagon.fan_indices().unwrap(),
            vec![4, 0, 1, 4, 1, 2, 4, 2, 3]
        );
    }

    #[test]
    fn test_negative_index_is_out_of_range() {
        let mut mesh = quad();
        mesh.faces = vec![vec![0, 1, 2], vec![0, -1, 2]];
        assert_eq!(
            mesh.validate(),
            Err(MeshError::IndexOutOfRange {
                face: 1,
                index: -1,
                vertex_count: 4
            })
        );
    }

    #[test]
    fn test_validation_failures() {
        let mut mesh = quad();
        mesh.faces = vec![vec![0, 4, 1]];
        assert!(matches!(
            mesh.validate(),
            Err(MeshError::IndexOutOfRange { index: 4, .. })
        ));

        mesh.faces = vec![vec![0, 1]];
        assert_eq!(
            mesh.validate(),
            Err(MeshError::FaceTooSmall { face: 0, len: 2 })
        );

        let empty = Mesh::new("Empty", vec![], vec![vec![0, 1, 2]]);
        assert_eq!(
            empty.validate(),
            Err(MeshError::FacesWithoutVertices { faces: 1 })
        );
        assert_eq!(
            Mesh::new("Nothing", vec![], vec![]).validate(),
            Err(MeshError::NoVertices)
        );

        let mut nan = quad();
        nan.vertices[2][1] = f32::NAN;
        assert_eq!(nan.validate(), Err(MeshError::NonFiniteVertex { index: 2 }));
    }

    #[test]
    fn test_names_must_be_file_safe() {
        for name in ["", "  ", "..", "a/b", "a\\b"] {
            let mut mesh = quad();
            mesh.name = name.to_string();
            assert!(matches!(mesh.validate(), Err(MeshError::InvalidName(_))), "{name:?}");
        }
        assert!(quad().validate().is_ok());
    }

    #[test]
    fn test_point_cloud_is_valid() {
        let cloud = Mesh::new("Cloud", vec![[0.0; 3], [1.0, 2.0, 3.0]], vec![]);
        assert!(cloud.validate().is_ok());
        assert!(cloud.fan_indices().unwrap().is_empty());
    }

    #[test]
    fn test_vertex_normals() {
        let mut mesh = quad();
        mesh.vertices.push([5.0, 5.0, 5.0]); // unreferenced
        let indices = mesh.fan_indices().unwrap();
        let normals = mesh.vertex_normals(&indices);

        assert_eq!(normals.len(), 5);
        for n in &normals[..4] {
            assert!((Vec3::from(*n) - Vec3::Z).length() < 1e-6);
        }
        assert_eq!(normals[4], [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_normals_point_away_from_winding() {
        // Clockwise when seen from +Z
        let mesh = Mesh::new(
            "Down",
            vec![[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]],
            vec![vec![0, 1, 2]],
        );
        let normals = mesh.vertex_normals(&mesh.fan_indices().unwrap());
        assert!(normals.iter().all(|n| n[2] < -0.99));
    }
}

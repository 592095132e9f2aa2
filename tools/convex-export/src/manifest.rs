//! Batch manifest parsing
//!
//! Parses convex.toml and turns it into meshes plus an [`ExportConfig`].
//!
//! ```toml
//! [output]
//! dir = "out"
//! single_file = true
//! embed_normals = false
//! jobs = 1
//!
//! [[mesh]]
//! name = "Box"
//! path = "box.obj"
//!
//! [[mesh]]
//! name = "Tri"
//! vertices = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]
//! faces = [[0, 1, 2]]
//! ```
//!
//! Relative paths resolve against the manifest's directory.
//!
//! Every source is read before the batch starts. An OBJ file that cannot be
//! read or parsed stops the run with a [`ConfigError`] before anything is
//! exported; only problems inside successfully loaded geometry (bad indices,
//! zero vertices) become per-item failures.

use crate::asset::ExportOptions;
use crate::batch::ExportConfig;
use crate::mesh::Mesh;
use crate::{obj, ConfigError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root manifest structure
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default, rename = "mesh")]
    pub meshes: Vec<MeshEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_true")]
    pub single_file: bool,
    #[serde(default)]
    pub embed_normals: bool,
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            single_file: true,
            embed_normals: false,
            jobs: default_jobs(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("out")
}

fn default_true() -> bool {
    true
}

fn default_jobs() -> usize {
    1
}

/// One `[[mesh]]` table: an OBJ path or inline geometry
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeshEntry {
    pub name: String,
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub vertices: Option<Vec<[f32; 3]>>,
    #[serde(default)]
    pub faces: Option<Vec<Vec<i64>>>,
}

/// Command-line values that take precedence over the manifest
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub output_dir: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub split: bool,
    pub normals: bool,
}

/// A parsed manifest and the directory its relative paths resolve against
#[derive(Debug)]
pub struct LoadedManifest {
    pub manifest: Manifest,
    pub base_dir: PathBuf,
}

/// Load and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<LoadedManifest, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let manifest = parse_manifest(&content, path)?;

    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    Ok(LoadedManifest { manifest, base_dir })
}

/// Parse manifest text; `path` is only used in error messages
pub fn parse_manifest(content: &str, path: &Path) -> Result<Manifest, ConfigError> {
    toml::from_str(content).map_err(|source| ConfigError::Manifest {
        path: path.to_path_buf(),
        source,
    })
}

impl LoadedManifest {
    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Export settings after applying command-line overrides
    pub fn export_config(&self, overrides: &Overrides) -> ExportConfig {
        let output = &self.manifest.output;
        ExportConfig {
            output_dir: overrides
                .output_dir
                .clone()
                .unwrap_or_else(|| self.resolve(&output.dir)),
            options: ExportOptions {
                embed_normals: output.embed_normals || overrides.normals,
                single_file: output.single_file && !overrides.split,
            },
            jobs: overrides.jobs.unwrap_or(output.jobs).max(1),
        }
    }

    /// Read every mesh source, in manifest order
    pub fn load_meshes(&self) -> Result<Vec<Mesh>, ConfigError> {
        self.manifest
            .meshes
            .iter()
            .map(|entry| self.load_mesh(entry))
            .collect()
    }

    fn load_mesh(&self, entry: &MeshEntry) -> Result<Mesh, ConfigError> {
        match (&entry.path, &entry.vertices) {
            (Some(path), None) => {
                if entry.faces.is_some() {
                    return Err(ConfigError::Source {
                        name: entry.name.clone(),
                        reason: "`faces` only applies to inline `vertices`".to_string(),
                    });
                }
                obj::load_obj(&entry.name, &self.resolve(path))
            }
            (None, Some(vertices)) => Ok(Mesh::new(
                entry.name.clone(),
                vertices.clone(),
                entry.faces.clone().unwrap_or_default(),
            )),
            (Some(_), Some(_)) => Err(ConfigError::Source {
                name: entry.name.clone(),
                reason: "set either `path` or `vertices`, not both".to_string(),
            }),
            (None, None) => Err(ConfigError::Source {
                name: entry.name.clone(),
                reason: "needs a `path` or inline `vertices`".to_string(),
            }),
        }
    }
}

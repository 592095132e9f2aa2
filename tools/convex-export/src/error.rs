//! Error types
//!
//! [`ConfigError`] aborts a run before any mesh is processed. [`ExportError`]
//! is scoped to one batch item and ends up in that item's outcome.

use crate::mesh::MeshError;
use crate::obj::ObjError;
use glb_builder::ContainerError;
use std::path::PathBuf;

/// Fatal problems with the run as a whole
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Output directory does not exist: {}", .0.display())]
    OutputDirMissing(PathBuf),

    #[error("Output path is not a directory: {}", .0.display())]
    OutputNotDirectory(PathBuf),

    #[error("Batch contains no meshes")]
    EmptyBatch,

    #[error("Mesh name '{0}' appears more than once in the batch")]
    DuplicateName(String),

    #[error("Failed to parse manifest {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse OBJ {}: {source}", path.display())]
    Obj {
        path: PathBuf,
        #[source]
        source: ObjError,
    },

    #[error("Mesh '{name}': {reason}")]
    Source { name: String, reason: String },
}

/// Failure of a single batch item
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("{0}")]
    MalformedMesh(#[from] MeshError),

    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Container(#[from] ContainerError),
}

impl ExportError {
    /// Short label for summaries and logs
    pub fn kind(&self) -> &'static str {
        match self {
            ExportError::MalformedMesh(_) => "MalformedMesh",
            ExportError::Io { .. } => "IOError",
            ExportError::Container(_) => "ContainerError",
        }
    }
}

//! Batch orchestration
//!
//! Each mesh moves through
//!
//! ```text
//! Pending -> TransformsAssumedApplied -> HullComputed -> AssetWritten -> ShapeWritten -> Done
//! ```
//!
//! and drops to `Failed` from whichever state it reached when something goes
//! wrong. A failed item never stops the batch: its error is recorded, any
//! files it already wrote are removed, and the next item starts.
//!
//! Items share no state, so with `jobs > 1` they run on a rayon pool. Results
//! come back in input order either way.

use crate::asset::{write_asset, AssetContainer, ExportOptions};
use crate::mesh::Mesh;
use crate::shape::{serialize_shape, ShapeRecord, SHAPE_EXT};
use crate::{ConfigError, ExportError};
use convex_hull::{compute_hull, HullKind};
use hashbrown::HashSet;
use rayon::prelude::*;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

// =============================================================================
// Configuration
// =============================================================================

/// Everything a batch run needs besides the meshes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    /// Must exist before the run starts
    pub output_dir: PathBuf,
    pub options: ExportOptions,
    /// Worker threads; 1 runs items sequentially on the caller's thread
    pub jobs: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("out"),
            options: ExportOptions::default(),
            jobs: 1,
        }
    }
}

// =============================================================================
// Item state and outcomes
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemState {
    Pending,
    /// Geometry accepted as export-space data
    TransformsAssumedApplied,
    HullComputed,
    AssetWritten,
    ShapeWritten,
    Done,
    Failed,
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug)]
pub enum ItemOutcome {
    Exported {
        /// Container file(s) followed by the shape file
        files: Vec<PathBuf>,
        hull_kind: HullKind,
        hull_vertices: usize,
    },
    Failed {
        /// Last state reached before the failure
        stage: ItemState,
        error: ExportError,
    },
}

#[derive(Debug)]
pub struct ItemResult {
    pub name: String,
    pub outcome: ItemOutcome,
}

impl ItemResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ItemOutcome::Exported { .. })
    }

    pub fn state(&self) -> ItemState {
        if self.is_success() {
            ItemState::Done
        } else {
            ItemState::Failed
        }
    }

    pub fn error(&self) -> Option<&ExportError> {
        match &self.outcome {
            ItemOutcome::Failed { error, .. } => Some(error),
            ItemOutcome::Exported { .. } => None,
        }
    }

    pub fn files(&self) -> &[PathBuf] {
        match &self.outcome {
            ItemOutcome::Exported { files, .. } => files,
            ItemOutcome::Failed { .. } => &[],
        }
    }

    /// One human-readable line describing this item
    pub fn summary_line(&self) -> String {
        match &self.outcome {
            ItemOutcome::Exported {
                files,
                hull_kind,
                hull_vertices,
            } => {
                let paths: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();
                format!(
                    "{}: ok -> {} (hull: {:?}, {} vertices)",
                    self.name,
                    paths.join(", "),
                    hull_kind,
                    hull_vertices
                )
            }
            ItemOutcome::Failed { stage, error } => format!(
                "{}: FAILED [{}] after {}: {}",
                self.name,
                error.kind(),
                stage,
                error
            ),
        }
    }
}

/// Per-item outcomes in processing order
#[derive(Debug)]
pub struct BatchResult {
    pub items: Vec<ItemResult>,
}

impl BatchResult {
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }

    pub fn summary_line(&self) -> String {
        format!("{} succeeded, {} failed", self.succeeded(), self.failed())
    }
}

// =============================================================================
// Running a batch
// =============================================================================

/// Checks the run-level preconditions: an existing output directory, at
/// least one mesh, and unique mesh names.
pub fn check_batch(meshes: &[Mesh], config: &ExportConfig) -> Result<(), ConfigError> {
    let dir = &config.output_dir;
    if !dir.exists() {
        return Err(ConfigError::OutputDirMissing(dir.clone()));
    }
    if !dir.is_dir() {
        return Err(ConfigError::OutputNotDirectory(dir.clone()));
    }
    check_meshes(meshes)
}

/// Non-empty batch with unique names
pub fn check_meshes(meshes: &[Mesh]) -> Result<(), ConfigError> {
    if meshes.is_empty() {
        return Err(ConfigError::EmptyBatch);
    }
    let mut seen: HashSet<&str> = HashSet::with_capacity(meshes.len());
    for mesh in meshes {
        if !seen.insert(mesh.name.as_str()) {
            return Err(ConfigError::DuplicateName(mesh.name.clone()));
        }
    }
    Ok(())
}

/// Exports every mesh and collects the outcomes.
///
/// Only run-level problems are returned as errors; per-item failures live in
/// the [`BatchResult`].
pub fn run_batch(meshes: &[Mesh], config: &ExportConfig) -> Result<BatchResult, ConfigError> {
    check_batch(meshes, config)?;

    tracing::info!(
        meshes = meshes.len(),
        jobs = config.jobs,
        output = %config.output_dir.display(),
        "starting batch"
    );

    let items: Vec<ItemResult> = if config.jobs > 1 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(config.jobs)
            .build()
        {
            Ok(pool) => pool.install(|| {
                meshes
                    .par_iter()
                    .map(|mesh| export_item(mesh, config))
                    .collect()
            }),
            Err(e) => {
                tracing::warn!("Failed to start worker pool ({}), running sequentially", e);
                meshes.iter().map(|mesh| export_item(mesh, config)).collect()
            }
        }
    } else {
        meshes.iter().map(|mesh| export_item(mesh, config)).collect()
    };

    let result = BatchResult { items };
    tracing::info!(
        succeeded = result.succeeded(),
        failed = result.failed(),
        "batch finished"
    );
    Ok(result)
}

/// Runs one mesh through the pipeline
pub fn export_item(mesh: &Mesh, config: &ExportConfig) -> ItemResult {
    let span = tracing::info_span!("mesh", name = %mesh.name);
    let _enter = span.enter();

    let mut run = ItemRun::new();
    let outcome = match run.execute(mesh, config) {
        Ok((hull_kind, hull_vertices)) => {
            run.advance(ItemState::Done);
            tracing::info!(files = run.written.len(), "exported");
            ItemOutcome::Exported {
                files: run.written,
                hull_kind,
                hull_vertices,
            }
        }
        Err(error) => {
            let stage = run.state;
            tracing::error!(kind = error.kind(), %stage, "{}", error);
            run.remove_partial_files();
            ItemOutcome::Failed { stage, error }
        }
    };

    ItemResult {
        name: mesh.name.clone(),
        outcome,
    }
}

struct ItemRun {
    state: ItemState,
    /// Files created so far, including one that failed mid-write
    written: Vec<PathBuf>,
}

impl ItemRun {
    fn new() -> Self {
        Self {
            state: ItemState::Pending,
            written: Vec::new(),
        }
    }

    fn advance(&mut self, next: ItemState) {
        tracing::trace!(from = %self.state, to = %next, "item state");
        self.state = next;
    }

    fn execute(
        &mut self,
        mesh: &Mesh,
        config: &ExportConfig,
    ) -> Result<(HullKind, usize), ExportError> {
        mesh.validate()?;
        self.advance(ItemState::TransformsAssumedApplied);

        let hull = compute_hull(&mesh.hull_points());
        let shape = serialize_shape(&hull);
        self.advance(ItemState::HullComputed);

        let (container, _) = write_asset(mesh, &config.options)?;
        self.write_container(&container, &config.output_dir, &mesh.name)?;
        self.advance(ItemState::AssetWritten);

        let shape_path = config
            .output_dir
            .join(format!("{}.{SHAPE_EXT}", mesh.name));
        self.write_shape(&shape, &shape_path)?;
        self.advance(ItemState::ShapeWritten);

        Ok((hull.kind(), hull.vertex_count()))
    }

    fn write_container(
        &mut self,
        container: &AssetContainer,
        dir: &Path,
        name: &str,
    ) -> Result<(), ExportError> {
        for (path, bytes) in container.files(dir, name) {
            self.write_file(&path, |w| w.write_all(bytes))?;
        }
        Ok(())
    }

    fn write_shape(&mut self, shape: &ShapeRecord, path: &Path) -> Result<(), ExportError> {
        self.write_file(path, |w| shape.write_to(w))
    }

    /// Create `path`, fill it through a buffered writer, and flush.
    ///
    /// The handle is closed when this returns, on success or failure.
    fn write_file<F>(&mut self, path: &Path, fill: F) -> Result<(), ExportError>
    where
        F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
    {
        let io_err = |source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(io_err)?;
        self.written.push(path.to_path_buf());

        let mut writer = BufWriter::new(file);
        fill(&mut writer).map_err(io_err)?;
        writer.flush().map_err(io_err)?;

        tracing::debug!(path = %path.display(), "wrote file");
        Ok(())
    }

    fn remove_partial_files(&mut self) {
        for path in self.written.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => tracing::debug!(path = %path.display(), "removed partial output"),
                Err(e) => tracing::warn!(
                    "Failed to remove partial output {}: {}",
                    path.display(),
                    e
                ),
            }
        }
    }
}

//! convex-export - batch mesh export with convex collision shapes
//!
//! Writes a glTF container and a `.convexshape` hull file for every mesh
//! listed in a convex.toml manifest.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use convex_export::manifest::{self, Overrides};
use convex_export::shape::SHAPE_EXT;
use convex_export::{batch, compute_hull, obj, serialize_shape, ExportError};

/// Exit status when at least one mesh failed
const EXIT_ITEM_FAILED: u8 = 2;

#[derive(Parser)]
#[command(name = "convex-export")]
#[command(about = "Export meshes as glTF containers with convex collision shapes")]
#[command(version)]
struct Cli {
    /// Debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export every mesh in a manifest
    Build {
        /// Path to convex.toml manifest
        #[arg(default_value = "convex.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest, must exist)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Worker threads (overrides manifest)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Write .gltf + .bin instead of a single .glb
        #[arg(long)]
        split: bool,

        /// Embed vertex normals
        #[arg(long)]
        normals: bool,
    },

    /// Validate the manifest and every mesh without writing
    Check {
        /// Path to convex.toml manifest
        #[arg(default_value = "convex.toml")]
        manifest: PathBuf,
    },

    /// Write the convex shape of a single OBJ mesh
    Hull {
        /// Input OBJ file
        input: PathBuf,

        /// Output .convexshape file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else if cli.quiet {
        tracing::Level::WARN
    } else {
        tracing::Level::INFO
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Build {
            manifest,
            output,
            jobs,
            split,
            normals,
        } => {
            let loaded = manifest::load_manifest(&manifest)
                .with_context(|| format!("Failed to load manifest {:?}", manifest))?;
            let config = loaded.export_config(&Overrides {
                output_dir: output,
                jobs,
                split,
                normals,
            });
            let meshes = loaded.load_meshes()?;

            let result = batch::run_batch(&meshes, &config)?;
            for item in &result.items {
                println!("{}", item.summary_line());
            }
            println!("{}", result.summary_line());

            Ok(if result.all_succeeded() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_ITEM_FAILED)
            })
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let loaded = manifest::load_manifest(&manifest)
                .with_context(|| format!("Failed to load manifest {:?}", manifest))?;
            let config = loaded.export_config(&Overrides::default());
            let meshes = loaded.load_meshes()?;
            batch::check_batch(&meshes, &config)?;

            let mut invalid = 0usize;
            for mesh in &meshes {
                match mesh.validate().and_then(|()| mesh.fan_indices()) {
                    Ok(indices) => println!(
                        "{}: ok ({} vertices, {} triangles)",
                        mesh.name,
                        mesh.vertex_count(),
                        indices.len() / 3
                    ),
                    Err(e) => {
                        invalid += 1;
                        let e = ExportError::from(e);
                        println!("{}: FAILED [{}] {}", mesh.name, e.kind(), e);
                    }
                }
            }
            println!("{} valid, {} invalid", meshes.len() - invalid, invalid);

            Ok(if invalid == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_ITEM_FAILED)
            })
        }

        Commands::Hull { input, output } => {
            let output = output.unwrap_or_else(|| input.with_extension(SHAPE_EXT));
            let name = input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("mesh")
                .to_string();
            tracing::info!("Computing hull {:?} -> {:?}", input, output);

            let mesh = obj::load_obj(&name, &input)?;
            mesh.validate()
                .with_context(|| format!("Mesh {:?} is malformed", input))?;

            let hull = compute_hull(&mesh.hull_points());
            let shape = serialize_shape(&hull);

            let file = File::create(&output)
                .with_context(|| format!("Failed to create output: {:?}", output))?;
            let mut writer = BufWriter::new(file);
            shape.write_to(&mut writer)?;
            writer.flush()?;

            println!(
                "{}: {:?} hull with {} vertices -> {}",
                name,
                hull.kind(),
                hull.vertex_count(),
                output.display()
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

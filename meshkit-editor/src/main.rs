//! Meshkit CLI - replays editor key presses on a mesh file.
//!
//! Usage: meshkit <INPUT> --keys <KEYS> [-o OUTPUT]
//!
//! Keys: `1`/`2`/`3`/`L` smooth, `S` grid decimation, `D` octree decimation,
//! `B` Loop subdivision, `R` reset to the loaded mesh.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::Parser;

use meshkit_core::GpuBufferSink;
use meshkit_editor::{EditorConfig, LoggingSink, MeshEditor};
use meshkit_gpu::{GpuContext, GpuMeshBuffers};

#[derive(Parser)]
#[command(name = "meshkit")]
#[command(author, version, about = "Replay mesh editor key presses", long_about = None)]
struct Cli {
    /// Input mesh file (OFF)
    input: PathBuf,

    /// Key presses to replay, in order
    #[arg(short, long, default_value = "")]
    keys: String,

    /// Write the edited mesh here
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Grid resolution for `S`
    #[arg(long)]
    resolution: Option<usize>,

    /// Octree leaf capacity for `D`
    #[arg(long)]
    leaf_capacity: Option<usize>,

    /// Smooth with uniform instead of cotangent weights
    #[arg(long)]
    no_cotangent: bool,

    /// Upload to GPU buffers instead of only logging uploads
    #[arg(long)]
    gpu: bool,
}

impl Cli {
    fn editor_config(&self) -> EditorConfig {
        let defaults = EditorConfig::default();
        EditorConfig {
            grid_resolution: self.resolution.unwrap_or(defaults.grid_resolution),
            leaf_capacity: self.leaf_capacity.unwrap_or(defaults.leaf_capacity),
            use_cotangent: !self.no_cotangent,
            ..defaults
        }
    }
}

fn replay<S: GpuBufferSink>(editor: &mut MeshEditor<S>, keys: &str) -> anyhow::Result<()> {
    for key in keys.chars().filter(|c| !c.is_whitespace()) {
        let start = Instant::now();
        let handled = editor
            .handle_key(key)
            .with_context(|| format!("key '{key}' failed"))?;
        if !handled {
            log::warn!("no command bound to key '{key}'");
            continue;
        }
        log::info!(
            "'{}': {} vertices, {} faces in {:.2?}",
            key,
            editor.mesh().vertex_count(),
            editor.mesh().face_count(),
            start.elapsed()
        );
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::builder().init();

    let cli = Cli::parse();
    let config = cli.editor_config();

    let mesh = meshkit_io::read_mesh(&cli.input)
        .with_context(|| format!("failed to load {}", cli.input.display()))?;

    let mesh = if cli.gpu {
        let context = pollster::block_on(GpuContext::new()).context("failed to create GPU context")?;
        let mut editor = MeshEditor::with_config(mesh, GpuMeshBuffers::new(Arc::new(context)), config)?;
        replay(&mut editor, &cli.keys)?;

        let gpu_positions = pollster::block_on(editor.sink().read_positions())?;
        if gpu_positions.as_slice() != editor.mesh().vertices() {
            bail!("GPU position buffer is out of sync with the mesh");
        }
        editor.into_parts().0
    } else {
        let mut editor = MeshEditor::with_config(mesh, LoggingSink::new(), config)?;
        replay(&mut editor, &cli.keys)?;
        let sink = editor.sink();
        log::info!(
            "{} full uploads, {} position uploads",
            sink.full_uploads,
            sink.position_uploads
        );
        editor.into_parts().0
    };

    println!(
        "{} vertices, {} faces",
        mesh.vertex_count(),
        mesh.face_count()
    );

    if let Some(output) = &cli.output {
        meshkit_io::write_mesh(&mesh, output)
            .with_context(|| format!("failed to write {}", output.display()))?;
    }

    Ok(())
}

//! Subcommand implementations

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glam::Vec3;
use rock_builder::procedural::{UnpackedMesh, write_obj};
use rock_builder::{
    EvaluationTarget, GeneratedRock, NoiseTextureCache, RockGenerator, RockParams, Scene,
};

/// Command line values that take precedence over the parameter file
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides {
    pub seed: Option<u64>,
    pub count: Option<u32>,
    pub spacing: Option<f32>,
}

/// How generated rocks are turned into meshes for export
#[derive(Debug, Clone, Copy)]
pub struct MeshOptions {
    pub render: bool,
    pub raw: bool,
}

impl MeshOptions {
    fn target(self) -> EvaluationTarget {
        if self.render {
            EvaluationTarget::Render
        } else {
            EvaluationTarget::Viewport
        }
    }
}

/// Load parameters, apply overrides, and validate
pub fn load_params(config: Option<&Path>, overrides: Overrides) -> Result<RockParams> {
    let mut params = match config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read parameter file: {}", path.display()))?;
            RockParams::from_toml_str(&text)
                .with_context(|| format!("Failed to parse parameter file: {}", path.display()))?
        }
        None => RockParams::default(),
    };

    if let Some(seed) = overrides.seed {
        params.seed = seed;
    }
    if let Some(count) = overrides.count {
        params.rock_count = count;
    }
    if let Some(spacing) = overrides.spacing {
        params.spacing = spacing;
    }

    params.validate().context("Invalid rock parameters")?;
    Ok(params)
}

/// Turn a generated rock into the mesh that gets written
fn finish_mesh(
    rock: &GeneratedRock,
    cache: &NoiseTextureCache,
    options: MeshOptions,
) -> Result<UnpackedMesh> {
    if options.raw {
        return Ok(rock.mesh.clone());
    }
    let mut scene = Scene::new();
    let id = RockGenerator::spawn(&mut scene, rock)?;
    Ok(scene.evaluate(id, cache, options.target())?)
}

/// Generate one rock and write it to `output`
pub fn generate(
    params: &RockParams,
    origin: Vec3,
    options: MeshOptions,
    output: &Path,
) -> Result<()> {
    let mut generator = RockGenerator::from_params(params);
    let rock = generator.generate_one(origin, params)?;
    let mesh = finish_mesh(&rock, generator.cache(), options)?;

    write_obj(&mesh, output, "Rock", rock.origin)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    tracing::info!(
        "Wrote {:?} ({} vertices, {} triangles)",
        output,
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(())
}

/// File name of the `index`-th rock of a batch
pub fn batch_file_name(index: usize) -> String {
    format!("rock_{:03}.obj", index)
}

/// Generate a batch and write one OBJ per rock into `output_dir`
///
/// Rocks produced before a failure are still written.
pub fn batch(
    params: &RockParams,
    start: Vec3,
    options: MeshOptions,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    let mut generator = RockGenerator::from_params(params);
    let (rocks, failure) = match generator.generate_batch(start, params) {
        Ok(rocks) => (rocks, None),
        Err(err) => (err.completed, Some(err.source)),
    };

    let mut written = Vec::with_capacity(rocks.len());
    for (index, rock) in rocks.iter().enumerate() {
        let mesh = finish_mesh(rock, generator.cache(), options)?;
        let path = output_dir.join(batch_file_name(index));
        write_obj(&mesh, &path, &format!("Rock.{:03}", index), rock.origin)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }
    tracing::info!("Wrote {} rock(s) to {:?}", written.len(), output_dir);

    match failure {
        Some(source) => Err(anyhow::Error::new(source)
            .context(format!("Batch stopped after {} rock(s)", written.len()))),
        None => Ok(written),
    }
}

/// Modifier stack of one rock as pretty JSON
pub fn plan(params: &RockParams) -> Result<String> {
    let mut generator = RockGenerator::from_params(params);
    let rock = generator.generate_one(Vec3::ZERO, params)?;
    Ok(serde_json::to_string_pretty(&rock.modifiers)?)
}

/// Write the default parameter file
pub fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let text = RockParams::default().to_toml_string()?;
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

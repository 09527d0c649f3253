//! rock-builder - procedural rock generator
//!
//! Generates rock meshes from a TOML parameter file and writes them as OBJ.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use glam::Vec3;
use std::path::PathBuf;

use commands::{MeshOptions, Overrides};

#[derive(Parser)]
#[command(name = "rock-builder")]
#[command(about = "Procedural rock generator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a single rock
    Generate {
        /// Parameter file (defaults are used when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Object origin as x,y,z
        #[arg(long, value_parser = parse_vec3, default_value = "0,0,0")]
        origin: Vec3,

        /// Random seed (overrides the parameter file)
        #[arg(long)]
        seed: Option<u64>,

        /// Evaluate at render subdivision level instead of viewport
        #[arg(long)]
        render: bool,

        /// Export the base mesh without evaluating the modifier stack
        #[arg(long)]
        raw: bool,

        /// Output .obj file
        #[arg(short, long, default_value = "rock.obj")]
        output: PathBuf,
    },

    /// Generate a grid of rocks, one OBJ file each
    Batch {
        /// Parameter file (defaults are used when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of rocks (overrides the parameter file)
        #[arg(short = 'n', long)]
        count: Option<u32>,

        /// Grid pitch (overrides the parameter file)
        #[arg(long)]
        spacing: Option<f32>,

        /// Grid start as x,y,z
        #[arg(long, value_parser = parse_vec3, default_value = "0,0,0")]
        start: Vec3,

        /// Random seed (overrides the parameter file)
        #[arg(long)]
        seed: Option<u64>,

        /// Evaluate at render subdivision level instead of viewport
        #[arg(long)]
        render: bool,

        /// Export base meshes without evaluating the modifier stacks
        #[arg(long)]
        raw: bool,

        /// Output directory
        #[arg(short, long, default_value = "rocks")]
        output: PathBuf,
    },

    /// Print the modifier stack of one rock as JSON
    Plan {
        /// Parameter file (defaults are used when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Random seed (overrides the parameter file)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Validate a parameter file
    Check {
        /// Path to rocks.toml
        #[arg(short, long, default_value = "rocks.toml")]
        config: PathBuf,
    },

    /// Write a default parameter file
    Init {
        /// Destination path
        #[arg(default_value = "rocks.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

/// Parse `x,y,z` into a vector
fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("expected x,y,z, got '{}'", s));
    };
    let parse = |v: &str| {
        v.parse::<f32>()
            .map_err(|e| format!("invalid component '{}': {}", v, e))
    };
    Ok(Vec3::new(parse(x)?, parse(y)?, parse(z)?))
}

fn main() -> Result<()> {
    // Initialize logging (stderr, so `plan` output stays clean)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            config,
            origin,
            seed,
            render,
            raw,
            output,
        } => {
            let params = commands::load_params(
                config.as_deref(),
                Overrides {
                    seed,
                    ..Default::default()
                },
            )?;
            commands::generate(&params, origin, MeshOptions { render, raw }, &output)?;
        }

        Commands::Batch {
            config,
            count,
            spacing,
            start,
            seed,
            render,
            raw,
            output,
        } => {
            let params = commands::load_params(
                config.as_deref(),
                Overrides {
                    seed,
                    count,
                    spacing,
                },
            )?;
            commands::batch(&params, start, MeshOptions { render, raw }, &output)?;
        }

        Commands::Plan { config, seed } => {
            let params = commands::load_params(
                config.as_deref(),
                Overrides {
                    seed,
                    ..Default::default()
                },
            )?;
            println!("{}", commands::plan(&params)?);
        }

        Commands::Check { config } => {
            tracing::info!("Checking parameters {:?}", config);
            commands::load_params(Some(config.as_path()), Overrides::default())?;
            tracing::info!("Parameters are valid!");
        }

        Commands::Init { path, force } => {
            commands::init(&path, force)?;
            tracing::info!("Wrote {:?}", path);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vec3() {
        assert_eq!(parse_vec3("1,2,3"), Ok(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(parse_vec3(" -1.5, 0 ,2"), Ok(Vec3::new(-1.5, 0.0, 2.0)));
    }

    #[test]
    fn test_parse_vec3_rejects_bad_input() {
        assert!(parse_vec3("1,2").is_err());
        assert!(parse_vec3("1,2,3,4").is_err());
        assert!(parse_vec3("a,b,c").is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

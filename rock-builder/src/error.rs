//! Error types for rock generation
//!
//! Configuration problems are caught by [`RockParams::validate`](crate::RockParams::validate)
//! before generation starts. Host failures are passed through unmodified; the
//! generator never retries, since a half-built rock may already carry part of
//! its modifier stack.

use thiserror::Error;

use crate::GeneratedRock;
use crate::host::ObjectId;

/// Rejected parameter sets and parameter files.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{field}: min ({min}) is greater than max ({max})")]
    InvalidRange {
        field: &'static str,
        min: f32,
        max: f32,
    },

    #[error("{field} must be >= 0 (got {value})")]
    Negative { field: &'static str, value: f32 },

    #[error("{field} must be > 0 (got {value})")]
    NonPositive { field: &'static str, value: f32 },

    #[error("{field} must be a finite number (got {value})")]
    NotFinite { field: &'static str, value: f32 },

    #[error("{field} must be <= {max} (got {value})")]
    TooLarge {
        field: &'static str,
        value: u32,
        max: u32,
    },

    #[error("Failed to parse parameter file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize parameters: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures reported by a host collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    #[error("Object {0:?} not found")]
    ObjectNotFound(ObjectId),

    #[error("Noise texture {0} not found")]
    TextureNotFound(usize),

    #[error("Failed to allocate {0}")]
    Allocation(String),

    #[error("Mesh too large: {vertices} vertices (limit {limit})")]
    MeshTooLarge { vertices: usize, limit: usize },
}

/// Top-level error for generation, update, and export.
#[derive(Error, Debug)]
pub enum RockError {
    #[error("No active rock object!")]
    NoActiveRock,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A batch that stopped part way through.
///
/// Rocks produced before the failure remain valid and are handed back.
#[derive(Error, Debug)]
#[error("Batch stopped after {} rock(s): {source}", .completed.len())]
pub struct BatchError {
    pub completed: Vec<GeneratedRock>,
    #[source]
    pub source: RockError,
}

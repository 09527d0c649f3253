//! Procedural mesh generation
//!
//! The base primitive for every rock (an icosphere), the f32 mesh type the
//! deformation steps operate on, and OBJ export.

mod export;
mod icosphere;
mod types;

pub use types::{MeshBuilder, UnpackedMesh};

pub use export::{write_obj, write_obj_to};

pub use icosphere::{
    MAX_ICOSPHERE_LEVEL, ProceduralPrimitives, generate_icosphere, icosphere_vertex_count,
};

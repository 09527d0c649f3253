//! Mesh modifiers used to evaluate modifier stacks

mod displacement;
mod modifiers;

pub use displacement::Displace;
pub use modifiers::{Bevel, MeshApply, MeshModifier, SmoothNormals, SubdivisionSurface};

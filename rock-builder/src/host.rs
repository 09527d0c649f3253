//! Host collaborator interfaces
//!
//! The generator core is pure data in, data out. Everything that touches an
//! editor's object model goes through these traits. [`Scene`](crate::Scene)
//! implements all of them in memory.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::HostError;
use crate::procedural::UnpackedMesh;
use crate::stack::ModifierStackEntry;

/// Opaque handle to a host object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

/// Global axis selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index into a position array
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }
}

/// Builds base primitives
pub trait PrimitiveFactory {
    /// Create an icosphere centered on the local origin
    fn create_icosphere(&self, subdivisions: u32, radius: f32) -> Result<UnpackedMesh, HostError>;
}

/// Raw mesh editing on host objects
pub trait MeshEditor {
    /// Run `edit` against the object's mesh
    ///
    /// The mesh is committed back when the closure returns; there is no way
    /// to keep the editing borrow alive past the call. Axis scaling on an
    /// installed object is [`elongate`](crate::shape::elongate) run in here.
    fn edit_mesh<T>(
        &mut self,
        id: ObjectId,
        edit: impl FnOnce(&mut UnpackedMesh) -> T,
    ) -> Result<T, HostError>;
}

/// Per-object modifier stacks
pub trait ModifierHost {
    /// Append a modifier at the end of the object's stack
    fn append_modifier(&mut self, id: ObjectId, entry: &ModifierStackEntry)
    -> Result<(), HostError>;
}

/// Object lifecycle and the generator marker
pub trait ObjectRegistry {
    /// Create an empty object at `location`
    fn create_object(&mut self, name: &str, location: Vec3) -> Result<ObjectId, HostError>;

    fn remove_object(&mut self, id: ObjectId) -> Result<(), HostError>;

    fn location(&self, id: ObjectId) -> Result<Vec3, HostError>;

    fn set_marker(&mut self, id: ObjectId, value: bool) -> Result<(), HostError>;

    /// Read the generator marker
    ///
    /// `None` when the object does not exist or was never tagged,
    /// `Some(false)` when it was tagged false explicitly.
    fn marker(&self, id: ObjectId) -> Option<bool>;
}

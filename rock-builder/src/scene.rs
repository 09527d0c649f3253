//! In-memory reference host
//!
//! [`Scene`] stands in for an editor: it stores objects with a mesh, a
//! location, a modifier stack and the generator marker, and it can evaluate
//! the stack into a final mesh for export.

use glam::Vec3;
use hashbrown::HashMap;
use tracing::{debug, warn};

use crate::error::{HostError, RockError};
use crate::host::{MeshEditor, ModifierHost, ObjectId, ObjectRegistry, PrimitiveFactory};
use crate::mesh::{Bevel, Displace, MeshApply, MeshModifier, SmoothNormals, SubdivisionSurface};
use crate::noise_cache::NoiseSourceCache;
use crate::params::MAX_SUBSURF_LEVEL;
use crate::procedural::{ProceduralPrimitives, UnpackedMesh};
use crate::stack::{BevelLimit, ModifierParams, ModifierStack, ModifierStackEntry};

/// Which subdivision level to evaluate with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvaluationTarget {
    /// Interactive preview level
    #[default]
    Viewport,
    /// Final output level
    Render,
}

/// An object stored in a [`Scene`]
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: String,
    pub location: Vec3,
    pub mesh: UnpackedMesh,
    pub modifiers: ModifierStack,
    pub marker: Option<bool>,
}

/// In-memory host implementing every collaborator trait
#[derive(Debug, Clone)]
pub struct Scene {
    objects: HashMap<ObjectId, SceneObject>,
    next_id: u64,
    max_subsurf_level: u32,
    vertex_limit: usize,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            objects: HashMap::new(),
            next_id: 1,
            max_subsurf_level: MAX_SUBSURF_LEVEL,
            vertex_limit: u32::MAX as usize,
        }
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the subdivision level used by [`Scene::evaluate`]
    pub fn with_max_subsurf_level(mut self, level: u32) -> Self {
        self.max_subsurf_level = level;
        self
    }

    /// Refuse to evaluate meshes that would exceed `limit` vertices
    pub fn with_vertex_limit(mut self, limit: usize) -> Self {
        self.vertex_limit = limit;
        self
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    /// Object ids in creation order
    pub fn ids(&self) -> Vec<ObjectId> {
        let mut ids: Vec<ObjectId> = self.objects.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn object_mut(&mut self, id: ObjectId) -> Result<&mut SceneObject, HostError> {
        self.objects.get_mut(&id).ok_or(HostError::ObjectNotFound(id))
    }

    /// Run the object's modifier stack and return the final mesh
    ///
    /// The result is in object-local coordinates. Textures are resolved
    /// through `cache`, so later rescales of a shared texture show up here.
    pub fn evaluate<C: NoiseSourceCache>(
        &self,
        id: ObjectId,
        cache: &C,
        target: EvaluationTarget,
    ) -> Result<UnpackedMesh, RockError> {
        let object = self.objects.get(&id).ok_or(HostError::ObjectNotFound(id))?;
        let mut mesh = object.mesh.clone();

        for entry in &object.modifiers {
            self.apply_entry(&mut mesh, entry, cache, target)?;
        }

        mesh.apply(SmoothNormals::default());
        debug!(
            ?id,
            ?target,
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "evaluated modifier stack"
        );
        Ok(mesh)
    }

    fn apply_entry<C: NoiseSourceCache>(
        &self,
        mesh: &mut UnpackedMesh,
        entry: &ModifierStackEntry,
        cache: &C,
        target: EvaluationTarget,
    ) -> Result<(), HostError> {
        match entry.params {
            ModifierParams::Bevel {
                width,
                segments,
                limit,
            } => {
                let angle_threshold_degrees = match limit {
                    BevelLimit::None => None,
                    BevelLimit::Angle { degrees } => Some(degrees),
                };
                Bevel {
                    width,
                    segments,
                    angle_threshold_degrees,
                }
                .apply(mesh);
            }
            ModifierParams::Subsurf {
                levels,
                render_levels,
            } => {
                let requested = match target {
                    EvaluationTarget::Viewport => levels,
                    EvaluationTarget::Render => render_levels,
                };
                let level = if requested > self.max_subsurf_level {
                    warn!(
                        requested,
                        max = self.max_subsurf_level,
                        "Subdivision level clamped"
                    );
                    self.max_subsurf_level
                } else {
                    requested
                };

                let estimate = mesh
                    .vertex_count()
                    .saturating_mul(4usize.saturating_pow(level));
                if estimate > self.vertex_limit {
                    return Err(HostError::MeshTooLarge {
                        vertices: estimate,
                        limit: self.vertex_limit,
                    });
                }
                SubdivisionSurface { levels: level }.apply(mesh);
            }
            ModifierParams::Displace {
                texture,
                direction,
                strength,
                mid_level,
            } => {
                let source = cache
                    .source(texture)
                    .ok_or(HostError::TextureNotFound(texture.0))?;
                Displace {
                    source,
                    direction,
                    strength,
                    mid_level,
                }
                .apply(mesh);
            }
        }
        Ok(())
    }
}

impl PrimitiveFactory for Scene {
    fn create_icosphere(&self, subdivisions: u32, radius: f32) -> Result<UnpackedMesh, HostError> {
        ProceduralPrimitives.create_icosphere(subdivisions, radius)
    }
}

impl MeshEditor for Scene {
    fn edit_mesh<T>(
        &mut self,
        id: ObjectId,
        edit: impl FnOnce(&mut UnpackedMesh) -> T,
    ) -> Result<T, HostError> {
        let object = self.object_mut(id)?;
        Ok(edit(&mut object.mesh))
    }
}

impl ModifierHost for Scene {
    fn append_modifier(
        &mut self,
        id: ObjectId,
        entry: &ModifierStackEntry,
    ) -> Result<(), HostError> {
        self.object_mut(id)?.modifiers.push(entry.clone());
        Ok(())
    }
}

impl ObjectRegistry for Scene {
    fn create_object(&mut self, name: &str, location: Vec3) -> Result<ObjectId, HostError> {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.insert(
            id,
            SceneObject {
                name: name.to_string(),
                location,
                mesh: UnpackedMesh::new(),
                modifiers: Vec::new(),
                marker: None,
            },
        );
        Ok(id)
    }

    fn remove_object(&mut self, id: ObjectId) -> Result<(), HostError> {
        self.objects
            .remove(&id)
            .map(|_| ())
            .ok_or(HostError::ObjectNotFound(id))
    }

    fn location(&self, id: ObjectId) -> Result<Vec3, HostError> {
        self.objects
            .get(&id)
            .map(|o| o.location)
            .ok_or(HostError::ObjectNotFound(id))
    }

    fn set_marker(&mut self, id: ObjectId, value: bool) -> Result<(), HostError> {
        self.object_mut(id)?.marker = Some(value);
        Ok(())
    }

    fn marker(&self, id: ObjectId) -> Option<bool> {
        self.objects.get(&id).and_then(|o| o.marker)
    }
}

//! Procedural mesh types
//!
//! Shared types for procedural mesh generation.

use glam::Vec3;

/// Trait for mesh construction - enables generic geometry generation
///
/// Primitive generators are written against this trait so the same code can
/// fill an [`UnpackedMesh`] or any other vertex sink a host provides.
pub trait MeshBuilder: Default {
    /// Add a vertex with position and normal, returning its index
    fn add_vertex(&mut self, position: Vec3, normal: Vec3) -> u32;

    /// Add a triangle using three vertex indices
    fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32);
}

/// Unpacked mesh data (f32 format) for deformation, modifiers and export
///
/// Positions are object-local. The object origin is carried by whoever owns
/// the mesh (see [`GeneratedRock`](crate::GeneratedRock)).
///
/// Indices are u32: a level-2 icosphere under five levels of subdivision
/// surface is well past the u16 range.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UnpackedMesh {
    /// Vertex positions as [x, y, z]
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals as [x, y, z]
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices
    pub indices: Vec<u32>,
}

impl UnpackedMesh {
    /// Create empty unpacked mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get triangle count
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate triangles as index triples
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
    }

    /// Axis-aligned bounds as (min, max), or `None` for an empty mesh
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.positions.iter().map(|p| Vec3::from(*p));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }
}

impl MeshBuilder for UnpackedMesh {
    fn add_vertex(&mut self, position: Vec3, normal: Vec3) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position.to_array());
        self.normals.push(normal.to_array());
        index
    }

    fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.extend_from_slice(&[i0, i1, i2]);
    }
}

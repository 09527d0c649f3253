//! Icosphere primitive
//!
//! An icosahedron whose faces are split into four per level, with every new
//! vertex pushed back onto the sphere.
//!
//! | Level | Vertices | Triangles |
//! |-------|----------|-----------|
//! | 0     | 12       | 20        |
//! | 1     | 42       | 80        |
//! | 2     | 162      | 320       |
//! | 3     | 642      | 1280      |

use glam::Vec3;
use hashbrown::HashMap;
use tracing::warn;

use crate::error::HostError;
use crate::host::PrimitiveFactory;
use crate::procedural::types::{MeshBuilder, UnpackedMesh};

/// Highest subdivision level accepted by [`generate_icosphere`]
pub const MAX_ICOSPHERE_LEVEL: u32 = 6;

const N: f32 = 0.525_731_1; // 1 / sqrt(1 + PHI^2)
const P: f32 = 0.850_650_8; // PHI / sqrt(1 + PHI^2)

/// Base icosahedron vertices on the unit sphere
const BASE_VERTS: [[f32; 3]; 12] = [
    // XY plane
    [-N, P, 0.0],
    [N, P, 0.0],
    [-N, -P, 0.0],
    [N, -P, 0.0],
    // YZ plane
    [0.0, -N, P],
    [0.0, N, P],
    [0.0, -N, -P],
    [0.0, N, -P],
    // ZX plane
    [P, 0.0, -N],
    [P, 0.0, N],
    [-P, 0.0, -N],
    [-P, 0.0, N],
];

/// Base icosahedron faces (20 triangles, counter-clockwise from outside)
const BASE_FACES: [[u32; 3]; 20] = [
    // 5 faces around vertex 0
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    // 5 adjacent faces
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    // 5 faces around vertex 3
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    // 5 bottom faces
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

/// Number of vertices an icosphere of `level` has
pub fn icosphere_vertex_count(level: u32) -> usize {
    // V = 10 * 4^level + 2
    10 * 4usize.pow(level) + 2
}

/// Generate an icosphere mesh centered on the local origin
///
/// # Arguments
/// * `radius` - Sphere radius (> 0.0)
/// * `level` - Subdivision level (0-6, clamped)
pub fn generate_icosphere<M: MeshBuilder>(radius: f32, level: u32) -> M {
    let radius = if radius <= 0.0 {
        warn!("generate_icosphere: radius must be > 0.0, clamping to 0.001");
        0.001
    } else {
        radius
    };

    let level = if level > MAX_ICOSPHERE_LEVEL {
        warn!(
            "generate_icosphere: level {} exceeds {}, clamping",
            level, MAX_ICOSPHERE_LEVEL
        );
        MAX_ICOSPHERE_LEVEL
    } else {
        level
    };

    // Build on the unit sphere first; radius is applied when emitting vertices.
    let mut verts: Vec<Vec3> = BASE_VERTS.iter().map(|v| Vec3::from(*v)).collect();
    let mut faces: Vec<[u32; 3]> = BASE_FACES.to_vec();

    for _ in 0..level {
        let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
        let mut next_faces = Vec::with_capacity(faces.len() * 4);

        let mut midpoint = |a: u32, b: u32, verts: &mut Vec<Vec3>| -> u32 {
            let key = if a < b { (a, b) } else { (b, a) };
            *midpoints.entry(key).or_insert_with(|| {
                let mid = ((verts[a as usize] + verts[b as usize]) * 0.5).normalize();
                verts.push(mid);
                (verts.len() - 1) as u32
            })
        };

        for [v0, v1, v2] in faces {
            let m01 = midpoint(v0, v1, &mut verts);
            let m12 = midpoint(v1, v2, &mut verts);
            let m20 = midpoint(v2, v0, &mut verts);

            next_faces.push([v0, m01, m20]);
            next_faces.push([v1, m12, m01]);
            next_faces.push([v2, m20, m12]);
            next_faces.push([m01, m12, m20]);
        }

        faces = next_faces;
    }

    let mut mesh = M::default();
    for v in &verts {
        mesh.add_vertex(*v * radius, *v);
    }
    for [i0, i1, i2] in faces {
        mesh.add_triangle(i0, i1, i2);
    }
    mesh
}

/// Pure in-process primitive factory
///
/// The default [`PrimitiveFactory`] used by the generator when no editor is
/// attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProceduralPrimitives;

impl PrimitiveFactory for ProceduralPrimitives {
    fn create_icosphere(&self, subdivisions: u32, radius: f32) -> Result<UnpackedMesh, HostError> {
        Ok(generate_icosphere(radius, subdivisions))
    }
}

//! Texture-driven vertex displacement

use glam::Vec3;

use super::modifiers::{MeshModifier, SmoothNormals};
use crate::noise_cache::NoiseSource;
use crate::planner::DisplaceDirection;
use crate::procedural::UnpackedMesh;

/// Displace vertices by a noise texture sampled at object-space positions
///
/// Each vertex moves by `(texture(p) - mid_level) * strength` along the
/// configured direction. Axis displacement ignores the stored normals, so it
/// also works on meshes without them. Normal displacement reads the vertex
/// normals, so they are recomputed first.
pub struct Displace<'a> {
    pub source: &'a NoiseSource,
    pub direction: DisplaceDirection,
    pub strength: f32,
    pub mid_level: f32,
}

impl MeshModifier for Displace<'_> {
    fn apply(&self, mesh: &mut UnpackedMesh) {
        if self.strength == 0.0 {
            return;
        }

        if self.direction == DisplaceDirection::Normal {
            SmoothNormals::default().apply(mesh);
        }

        let sampler = self.source.sampler();
        let normals = &mesh.normals;
        for (i, p) in mesh.positions.iter_mut().enumerate() {
            let pos = Vec3::from(*p);
            let amount = (sampler.sample(pos) - self.mid_level) * self.strength;
            let dir = match self.direction {
                DisplaceDirection::Axis(axis) => axis.unit(),
                DisplaceDirection::Normal => {
                    normals.get(i).map_or(Vec3::ZERO, |n| Vec3::from(*n))
                }
            };
            *p = (pos + dir * amount).to_array();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Axis;
    use crate::noise_cache::NoiseRole;
    use crate::procedural::generate_icosphere;

    fn source() -> NoiseSource {
        NoiseSource::new(NoiseRole::Coarse, 1.5, 0)
    }

    #[test]
    fn test_axis_displacement_moves_only_that_axis() {
        let source = source();
        let mut mesh: UnpackedMesh = generate_icosphere(1.0, 2);
        let before = mesh.clone();

        Displace {
            source: &source,
            direction: DisplaceDirection::Axis(Axis::Y),
            strength: 0.5,
            mid_level: 0.5,
        }
        .apply(&mut mesh);

        for (after, orig) in mesh.positions.iter().zip(&before.positions) {
            assert_eq!(after[0], orig[0]);
            assert_eq!(after[2], orig[2]);
            assert!((after[1] - orig[1]).abs() <= 0.25 + 1e-6);
        }
        assert_ne!(mesh.positions, before.positions);
    }

    #[test]
    fn test_axis_displacement_without_normals() {
        let source = source();
        let mut mesh: UnpackedMesh = generate_icosphere(1.0, 2);
        mesh.normals.clear();
        let before = mesh.clone();

        Displace {
            source: &source,
            direction: DisplaceDirection::Axis(Axis::X),
            strength: 0.5,
            mid_level: 0.5,
        }
        .apply(&mut mesh);

        let moved = mesh
            .positions
            .iter()
            .zip(&before.positions)
            .filter(|(after, orig)| after[0] != orig[0])
            .count();
        assert!(moved > mesh.vertex_count() / 2, "only {} vertices moved", moved);
        assert!(mesh.normals.is_empty());
    }

    #[test]
    fn test_normal_displacement_without_normals() {
        let source = NoiseSource::new(NoiseRole::Fine, 1.5, 0);
        let mut mesh: UnpackedMesh = generate_icosphere(1.0, 2);
        mesh.normals.clear();
        let before = mesh.clone();

        Displace {
            source: &source,
            direction: DisplaceDirection::Normal,
            strength: 0.025,
            mid_level: 0.5,
        }
        .apply(&mut mesh);

        assert_eq!(mesh.normals.len(), mesh.vertex_count());
        assert_ne!(mesh.positions, before.positions);
    }

    #[test]
    fn test_opposite_strength_opposite_offsets() {
        let source = source();
        let base: UnpackedMesh = generate_icosphere(1.0, 1);

        let mut plus = base.clone();
        let mut minus = base.clone();
        for (mesh, strength) in [(&mut plus, 0.4), (&mut minus, -0.4)] {
            Displace {
                source: &source,
                direction: DisplaceDirection::Axis(Axis::X),
                strength,
                mid_level: 0.5,
            }
            .apply(mesh);
        }

        for ((p, m), b) in plus.positions.iter().zip(&minus.positions).zip(&base.positions) {
            assert!(((p[0] - b[0]) + (m[0] - b[0])).abs() < 1e-5);
        }
    }

    #[test]
    fn test_normal_displacement_stays_radial_on_sphere() {
        let source = NoiseSource::new(NoiseRole::Fine, 1.5, 0);
        let mut mesh: UnpackedMesh = generate_icosphere(1.0, 2);
        let before = mesh.clone();

        Displace {
            source: &source,
            direction: DisplaceDirection::Normal,
            strength: 0.025,
            mid_level: 0.5,
        }
        .apply(&mut mesh);

        for (after, orig) in mesh.positions.iter().zip(&before.positions) {
            let a = Vec3::from(*after);
            let o = Vec3::from(*orig);
            assert!((a.length() - 1.0).abs() <= 0.0125 + 1e-4);
            assert!((a - o).length() <= 0.0125 + 1e-5);
        }
    }

    #[test]
    fn test_zero_strength_is_noop() {
        let source = source();
        let mut mesh: UnpackedMesh = generate_icosphere(1.0, 1);
        let before = mesh.clone();
        Displace {
            source: &source,
            direction: DisplaceDirection::Normal,
            strength: 0.0,
            mid_level: 0.5,
        }
        .apply(&mut mesh);
        assert_eq!(mesh, before);
    }
}

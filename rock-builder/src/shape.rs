//! Base shape and symmetry breaking
//!
//! A rock starts life as a radius-1 icosphere. [`BaseShapeBuilder`] stretches
//! it along the global X axis and [`VertexJitter`] nudges every vertex so the
//! displacement stack downstream has no axis of symmetry to preserve.

use rand::Rng;
use tracing::debug;

use crate::error::HostError;
use crate::host::{Axis, PrimitiveFactory};
use crate::params::FloatRange;
use crate::procedural::UnpackedMesh;

/// Radius of the base icosphere
pub const BASE_RADIUS: f32 = 1.0;

/// Builds the elongated base icosphere
pub struct BaseShapeBuilder<'a, F: PrimitiveFactory> {
    factory: &'a F,
    subdivision_level: u32,
    elongation: FloatRange,
}

impl<'a, F: PrimitiveFactory> BaseShapeBuilder<'a, F> {
    pub fn new(factory: &'a F, subdivision_level: u32, elongation: FloatRange) -> Self {
        Self {
            factory,
            subdivision_level,
            elongation,
        }
    }

    /// Create the icosphere and scale it by `(f, 1, 1)`
    ///
    /// `f` is drawn from the elongation range. The scale pivots on the object
    /// origin and is baked into the vertices, so jitter afterwards works in
    /// the stretched space.
    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<UnpackedMesh, HostError> {
        let mut mesh = self
            .factory
            .create_icosphere(self.subdivision_level, BASE_RADIUS)?;
        let factor = self.elongation.sample(rng);
        elongate(&mut mesh, Axis::X, factor);
        debug!(
            factor,
            vertices = mesh.vertex_count(),
            "built base shape"
        );
        Ok(mesh)
    }
}

/// Scale all vertices along one axis
///
/// Normals are left alone: the stack downstream recomputes them.
pub fn elongate(mesh: &mut UnpackedMesh, axis: Axis, factor: f32) {
    let i = axis.index();
    for p in &mut mesh.positions {
        p[i] *= factor;
    }
}

/// Per-vertex random offsets
///
/// Each axis of each vertex gets its own draw from `[0, magnitude)`. The
/// offsets are never negative, which biases the whole shape towards +X +Y +Z.
pub struct VertexJitter;

impl VertexJitter {
    pub fn apply<R: Rng + ?Sized>(mesh: &mut UnpackedMesh, magnitude: f32, rng: &mut R) {
        if magnitude == 0.0 {
            return;
        }
        for p in &mut mesh.positions {
            for c in p.iter_mut() {
                *c += rng.random::<f32>() * magnitude;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procedural::{ProceduralPrimitives, generate_icosphere, icosphere_vertex_count};
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    struct FailingFactory;

    impl PrimitiveFactory for FailingFactory {
        fn create_icosphere(&self, _: u32, _: f32) -> Result<UnpackedMesh, HostError> {
            Err(HostError::Allocation("icosphere".into()))
        }
    }

    #[test]
    fn test_fixed_elongation_scales_only_x() {
        let mut rng = Pcg64::seed_from_u64(0);
        let builder = BaseShapeBuilder::new(&ProceduralPrimitives, 2, FloatRange::fixed(1.4));
        let mesh = builder.build(&mut rng).unwrap();
        let sphere: UnpackedMesh = generate_icosphere(1.0, 2);

        for (stretched, original) in mesh.positions.iter().zip(&sphere.positions) {
            assert_eq!(stretched[0], original[0] * 1.4);
            assert_eq!(stretched[1], original[1]);
            assert_eq!(stretched[2], original[2]);
        }
    }

    #[test]
    fn test_base_shape_vertex_count() {
        let mut rng = Pcg64::seed_from_u64(0);
        let builder = BaseShapeBuilder::new(&ProceduralPrimitives, 2, FloatRange::new(1.0, 1.5));
        let mesh = builder.build(&mut rng).unwrap();
        assert_eq!(mesh.vertex_count(), icosphere_vertex_count(2));
    }

    #[test]
    fn test_factory_failure_propagates() {
        let mut rng = Pcg64::seed_from_u64(0);
        let builder = BaseShapeBuilder::new(&FailingFactory, 2, FloatRange::fixed(1.0));
        assert!(matches!(
            builder.build(&mut rng),
            Err(HostError::Allocation(_))
        ));
    }

    #[test]
    fn test_zero_jitter_is_identity() {
        let mut rng = Pcg64::seed_from_u64(9);
        let mut mesh: UnpackedMesh = generate_icosphere(1.0, 2);
        let before = mesh.clone();
        VertexJitter::apply(&mut mesh, 0.0, &mut rng);
        assert_eq!(mesh, before);
    }

    #[test]
    fn test_jitter_is_non_negative_and_bounded() {
        let mut rng = Pcg64::seed_from_u64(9);
        let mut mesh: UnpackedMesh = generate_icosphere(1.0, 2);
        let before = mesh.clone();
        VertexJitter::apply(&mut mesh, 0.5, &mut rng);

        assert_eq!(mesh.indices, before.indices);
        assert_eq!(mesh.vertex_count(), before.vertex_count());
        for (after, orig) in mesh.positions.iter().zip(&before.positions) {
            for axis in 0..3 {
                let delta = after[axis] - orig[axis];
                assert!((0.0..0.5 + 1e-6).contains(&delta), "delta {delta}");
            }
        }
        assert_ne!(mesh.positions, before.positions);
    }
}

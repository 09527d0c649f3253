//! Rock generator
//!
//! Orchestrates one rock: base shape, jitter, noise textures, displacement
//! plan, modifier stack. Batches lay rocks out on a grid; update-in-place
//! swaps a previously generated host object for a fresh rock at the same
//! location.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use tracing::{debug, info, warn};

use crate::error::{BatchError, HostError, RockError};
use crate::host::{MeshEditor, ModifierHost, ObjectId, ObjectRegistry, PrimitiveFactory};
use crate::noise_cache::{NoiseRole, NoiseSourceCache, NoiseTextureCache};
use crate::params::RockParams;
use crate::placement::BatchPlacer;
use crate::planner::DisplacementPlanner;
use crate::procedural::{ProceduralPrimitives, UnpackedMesh};
use crate::shape::{BaseShapeBuilder, VertexJitter};
use crate::stack::{ModifierStack, ModifierStackBuilder};

/// Name given to rock objects created in a host
pub const ROCK_OBJECT_NAME: &str = "Rock";

/// A rock before it has been installed in a host
///
/// The mesh is in object-local coordinates; `origin` is where the object
/// goes. The modifier stack has not been evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedRock {
    pub origin: Vec3,
    pub mesh: UnpackedMesh,
    pub modifiers: ModifierStack,
}

/// Generates rocks from [`RockParams`]
///
/// Owns the random source and the noise cache for a run. Two generators
/// built with the same seed produce bit-identical rocks for the same calls.
pub struct RockGenerator<C = NoiseTextureCache, F = ProceduralPrimitives, R = Pcg64> {
    cache: C,
    factory: F,
    rng: R,
}

impl RockGenerator {
    /// Default generator seeded with `seed`
    pub fn from_seed(seed: u64) -> Self {
        Self::with_parts(
            NoiseTextureCache::with_seed(seed as u32),
            ProceduralPrimitives,
            Pcg64::seed_from_u64(seed),
        )
    }

    /// Default generator seeded from `params.seed`
    pub fn from_params(params: &RockParams) -> Self {
        Self::from_seed(params.seed)
    }

    /// Install a generated rock into a host
    ///
    /// Creates the object at the rock's origin, writes the mesh, tags it and
    /// appends the modifier stack in order. A half-installed object is
    /// removed again on failure.
    pub fn spawn<H>(host: &mut H, rock: &GeneratedRock) -> Result<ObjectId, HostError>
    where
        H: ObjectRegistry + MeshEditor + ModifierHost,
    {
        let id = host.create_object(ROCK_OBJECT_NAME, rock.origin)?;

        let installed = host
            .edit_mesh(id, |mesh| *mesh = rock.mesh.clone())
            .and_then(|()| host.set_marker(id, true))
            .and_then(|()| {
                rock.modifiers
                    .iter()
                    .try_for_each(|entry| host.append_modifier(id, entry))
            });

        if let Err(e) = installed {
            if let Err(cleanup) = host.remove_object(id) {
                warn!(?id, error = %cleanup, "failed to remove partially installed rock");
            }
            return Err(e);
        }

        Ok(id)
    }
}

impl<C: NoiseSourceCache, F: PrimitiveFactory, R: Rng> RockGenerator<C, F, R> {
    /// Generator with injected collaborators
    pub fn with_parts(cache: C, factory: F, rng: R) -> Self {
        Self {
            cache,
            factory,
            rng,
        }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn into_cache(self) -> C {
        self.cache
    }

    /// Build a single rock at `origin`
    pub fn generate_one(
        &mut self,
        origin: Vec3,
        params: &RockParams,
    ) -> Result<GeneratedRock, RockError> {
        params.validate()?;

        let builder =
            BaseShapeBuilder::new(&self.factory, params.subdivision_level, params.elongation);
        let mut mesh = builder.build(&mut self.rng)?;
        VertexJitter::apply(&mut mesh, params.random_variation, &mut self.rng);

        let coarse = self
            .cache
            .get_or_create(NoiseRole::Coarse, params, &mut self.rng)?;
        let fine = self
            .cache
            .get_or_create(NoiseRole::Fine, params, &mut self.rng)?;

        let plan = DisplacementPlanner::plan(params, coarse, fine, &mut self.rng);
        let modifiers = ModifierStackBuilder::assemble(params, &plan);

        debug!(
            ?origin,
            vertices = mesh.vertex_count(),
            modifiers = modifiers.len(),
            "generated rock"
        );

        Ok(GeneratedRock {
            origin,
            mesh,
            modifiers,
        })
    }

    /// Build `params.rock_count` rocks on a grid starting at `start`
    ///
    /// Stops at the first failure; the rocks built so far come back in the
    /// error.
    pub fn generate_batch(
        &mut self,
        start: Vec3,
        params: &RockParams,
    ) -> Result<Vec<GeneratedRock>, BatchError> {
        let origins = BatchPlacer::layout(params.rock_count as usize, params.spacing, start);
        let mut rocks = Vec::with_capacity(origins.len());

        for (index, origin) in origins.into_iter().enumerate() {
            match self.generate_one(origin, params) {
                Ok(rock) => {
                    info!(index, ?origin, "placed rock");
                    rocks.push(rock);
                }
                Err(source) => {
                    warn!(index, error = %source, "batch stopped");
                    return Err(BatchError {
                        completed: rocks,
                        source,
                    });
                }
            }
        }

        Ok(rocks)
    }

    /// Replace a previously generated rock with a fresh one
    ///
    /// `target` must carry the generator marker. The replacement is built
    /// and installed before the old object is removed, so a failure leaves
    /// `target` in place. Returns the id of the new object.
    pub fn update_in_place<H>(
        &mut self,
        host: &mut H,
        target: ObjectId,
        params: &RockParams,
    ) -> Result<ObjectId, RockError>
    where
        H: ObjectRegistry + MeshEditor + ModifierHost,
    {
        if host.marker(target) != Some(true) {
            return Err(RockError::NoActiveRock);
        }

        let location = host.location(target)?;
        let rock = self.generate_one(location, params)?;
        let id = RockGenerator::spawn(host, &rock)?;
        if let Err(e) = host.remove_object(target) {
            if let Err(cleanup) = host.remove_object(id) {
                warn!(?id, error = %cleanup, "failed to remove replacement rock");
            }
            return Err(e.into());
        }

        info!(old = ?target, new = ?id, ?location, "updated rock in place");
        Ok(id)
    }
}

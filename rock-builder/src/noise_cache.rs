//! Noise texture cache
//!
//! Rocks are displaced by two cellular noise textures: a coarse one that
//! blocks out the silhouette and a fine one for surface detail. The cache owns
//! both and hands out [`NoiseHandle`]s; modifier stack entries store the handle,
//! never a copy, so a later rescale is seen by every entry bound to it.
//!
//! Coarse policy: with `reuse_coarse_texture` the existing coarse texture is
//! kept and only its scale is redrawn; without it a fresh texture is created
//! per rock. Fine policy: one texture for the whole run, scale overwritten with
//! the fixed `fine_noise_scale` on every request.

use glam::Vec3;
use noise::{NoiseFn, Worley, core::worley::ReturnType};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::HostError;
use crate::params::RockParams;

/// Which displacement layer a texture serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoiseRole {
    Coarse,
    Fine,
}

impl NoiseRole {
    /// Fixed identity a host would register the texture under
    pub fn texture_name(self) -> &'static str {
        match self {
            NoiseRole::Coarse => "ROCK_GENERATOR_BIG",
            NoiseRole::Fine => "ROCK_GENERATOR_SMALL",
        }
    }
}

/// Noise family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoiseBasis {
    /// Cellular noise, distance to the first nearest feature point
    CellularF1,
}

/// Handle to a source owned by a cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoiseHandle(pub usize);

/// A procedural noise texture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseSource {
    pub role: NoiseRole,
    /// Feature size in object units (larger = bigger cells)
    pub scale: f32,
    pub basis: NoiseBasis,
    /// Fold the value as `|2v - 1|` for sharp creases at cell borders
    pub hard: bool,
    pub seed: u32,
}

impl NoiseSource {
    pub fn new(role: NoiseRole, scale: f32, seed: u32) -> Self {
        Self {
            role,
            scale,
            basis: NoiseBasis::CellularF1,
            hard: true,
            seed,
        }
    }

    /// Build a sampler for evaluating this texture
    pub fn sampler(&self) -> NoiseSampler {
        let frequency = 1.0 / f64::from(self.scale.max(1e-4));
        let worley = Worley::new(self.seed)
            .set_frequency(frequency)
            .set_return_type(ReturnType::Distance);
        NoiseSampler {
            worley,
            hard: self.hard,
        }
    }
}

/// Evaluates a [`NoiseSource`] at object-space points
pub struct NoiseSampler {
    worley: Worley,
    hard: bool,
}

impl NoiseSampler {
    /// Texture intensity in [0, 1]
    pub fn sample(&self, p: Vec3) -> f32 {
        let raw = self.worley.get([f64::from(p.x), f64::from(p.y), f64::from(p.z)]);
        let v = ((raw + 1.0) * 0.5).clamp(0.0, 1.0) as f32;
        if self.hard { (2.0 * v - 1.0).abs() } else { v }
    }
}

/// Source of noise textures for the generator
///
/// Injected into [`RockGenerator`](crate::RockGenerator) so tests can observe
/// or fake reuse behavior.
pub trait NoiseSourceCache {
    /// Fetch the texture for `role`, creating or rescaling it per the policy
    fn get_or_create<R: Rng + ?Sized>(
        &mut self,
        role: NoiseRole,
        params: &RockParams,
        rng: &mut R,
    ) -> Result<NoiseHandle, HostError>;

    /// Resolve a handle
    fn source(&self, handle: NoiseHandle) -> Option<&NoiseSource>;
}

/// Default in-memory cache
#[derive(Debug, Clone, Default)]
pub struct NoiseTextureCache {
    sources: Vec<NoiseSource>,
    coarse: Option<NoiseHandle>,
    fine: Option<NoiseHandle>,
    seed: u32,
}

impl NoiseTextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache whose textures use `seed` for their feature points
    pub fn with_seed(seed: u32) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Number of textures created so far
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Current texture registered for `role`, if any
    pub fn current(&self, role: NoiseRole) -> Option<NoiseHandle> {
        match role {
            NoiseRole::Coarse => self.coarse,
            NoiseRole::Fine => self.fine,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (NoiseHandle, &NoiseSource)> {
        self.sources
            .iter()
            .enumerate()
            .map(|(i, s)| (NoiseHandle(i), s))
    }

    fn create(&mut self, role: NoiseRole, scale: f32) -> NoiseHandle {
        let handle = NoiseHandle(self.sources.len());
        self.sources.push(NoiseSource::new(role, scale, self.seed));
        match role {
            NoiseRole::Coarse => self.coarse = Some(handle),
            NoiseRole::Fine => self.fine = Some(handle),
        }
        debug!(?role, ?handle, scale, "created noise texture");
        handle
    }

    fn rescale(&mut self, handle: NoiseHandle, scale: f32) -> Result<(), HostError> {
        let source = self
            .sources
            .get_mut(handle.0)
            .ok_or(HostError::TextureNotFound(handle.0))?;
        source.scale = scale;
        Ok(())
    }
}

impl NoiseSourceCache for NoiseTextureCache {
    fn get_or_create<R: Rng + ?Sized>(
        &mut self,
        role: NoiseRole,
        params: &RockParams,
        rng: &mut R,
    ) -> Result<NoiseHandle, HostError> {
        match role {
            NoiseRole::Coarse => {
                let scale = params.coarse_noise_scale.sample(rng);
                match self.coarse {
                    Some(handle) if params.reuse_coarse_texture => {
                        self.rescale(handle, scale)?;
                        debug!(?handle, scale, "reusing coarse noise texture");
                        Ok(handle)
                    }
                    _ => Ok(self.create(role, scale)),
                }
            }
            NoiseRole::Fine => {
                let scale = params.fine_noise_scale;
                match self.fine {
                    Some(handle) => {
                        self.rescale(handle, scale)?;
                        Ok(handle)
                    }
                    None => Ok(self.create(role, scale)),
                }
            }
        }
    }

    fn source(&self, handle: NoiseHandle) -> Option<&NoiseSource> {
        self.sources.get(handle.0)
    }
}

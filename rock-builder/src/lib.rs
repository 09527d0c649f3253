//! Procedural rock generation
//!
//! A rock is an elongated icosphere whose vertices are randomly jittered, plus
//! a modifier stack that bevels, subdivides and displaces it with cellular
//! noise. The generator produces the base mesh and the stack as data; a host
//! (an editor, or the in-memory [`Scene`]) installs and evaluates them.
//!
//! # Example
//! ```no_run
//! use rock_builder::*;
//!
//! let params = RockParams::default();
//! let mut generator = RockGenerator::from_params(&params);
//! let mut scene = Scene::new();
//!
//! let rock = generator.generate_one(glam::Vec3::ZERO, &params)?;
//! let id = RockGenerator::spawn(&mut scene, &rock)?;
//!
//! let mesh = scene.evaluate(id, generator.cache(), EvaluationTarget::Viewport)?;
//! procedural::write_obj(&mesh, "rock.obj".as_ref(), "Rock", rock.origin)?;
//! # Ok::<(), RockError>(())
//! ```

pub mod error;
pub mod host;
pub mod mesh;
pub mod noise_cache;
pub mod params;
pub mod placement;
pub mod planner;
pub mod procedural;
pub mod scene;
pub mod shape;
pub mod stack;

mod generator;

pub use error::{BatchError, ConfigError, HostError, RockError};
pub use generator::{GeneratedRock, ROCK_OBJECT_NAME, RockGenerator};
pub use host::{Axis, MeshEditor, ModifierHost, ObjectId, ObjectRegistry, PrimitiveFactory};
pub use noise_cache::{NoiseHandle, NoiseRole, NoiseSource, NoiseSourceCache, NoiseTextureCache};
pub use params::{FloatRange, RockParams};
pub use placement::BatchPlacer;
pub use planner::{DisplaceDirection, DisplacementPass, DisplacementPlan, DisplacementPlanner};
pub use scene::{EvaluationTarget, Scene, SceneObject};
pub use shape::{BaseShapeBuilder, VertexJitter};
pub use stack::{ModifierParams, ModifierStack, ModifierStackBuilder, ModifierStackEntry};

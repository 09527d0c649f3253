//! Declarative modifier stacks
//!
//! The generator never runs the modifiers itself. It returns the stack as
//! data and the host walks it: [`RockGenerator::spawn`](crate::RockGenerator::spawn)
//! appends entries to a host object, [`Scene::evaluate`](crate::Scene::evaluate)
//! executes them.
//!
//! Order is fixed: bevel, subdivision surface, six coarse displacements, one
//! fine displacement. Displacement has to see the beveled and subdivided
//! topology, otherwise it only moves the 162 base vertices.

use serde::{Deserialize, Serialize};

use crate::noise_cache::NoiseHandle;
use crate::params::RockParams;
use crate::planner::{DisplaceDirection, DisplacementPlan};

/// Default bevel angle limit in degrees
pub const BEVEL_ANGLE_DEGREES: f32 = 30.0;

/// Modifier kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierKind {
    Bevel,
    Subsurf,
    Displace,
}

/// How the bevel picks edges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BevelLimit {
    /// Every edge
    None,
    /// Edges whose dihedral angle exceeds the threshold
    Angle { degrees: f32 },
}

/// Kind-specific modifier settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModifierParams {
    Bevel {
        width: f32,
        segments: u32,
        limit: BevelLimit,
    },
    Subsurf {
        /// Level for interactive preview
        levels: u32,
        /// Level for final output
        render_levels: u32,
    },
    Displace {
        texture: NoiseHandle,
        direction: DisplaceDirection,
        strength: f32,
        /// Texture value that maps to zero displacement
        mid_level: f32,
    },
}

/// One named entry in a modifier stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierStackEntry {
    pub name: String,
    pub params: ModifierParams,
}

impl ModifierStackEntry {
    pub fn kind(&self) -> ModifierKind {
        match self.params {
            ModifierParams::Bevel { .. } => ModifierKind::Bevel,
            ModifierParams::Subsurf { .. } => ModifierKind::Subsurf,
            ModifierParams::Displace { .. } => ModifierKind::Displace,
        }
    }
}

/// Ordered modifier entries, first applied first
pub type ModifierStack = Vec<ModifierStackEntry>;

pub struct ModifierStackBuilder;

impl ModifierStackBuilder {
    /// Assemble bevel, subsurf and the planned displacements
    pub fn assemble(params: &RockParams, plan: &DisplacementPlan) -> ModifierStack {
        let mut stack = Vec::with_capacity(plan.len() + 2);

        stack.push(ModifierStackEntry {
            name: "Bevel".to_string(),
            params: ModifierParams::Bevel {
                width: params.bevel_width,
                segments: 1,
                limit: BevelLimit::Angle {
                    degrees: BEVEL_ANGLE_DEGREES,
                },
            },
        });

        stack.push(ModifierStackEntry {
            name: "Subdivision Surface".to_string(),
            params: ModifierParams::Subsurf {
                levels: params.viewport_subdivisions,
                render_levels: params.render_subdivisions,
            },
        });

        stack.extend(plan.iter().map(|pass| ModifierStackEntry {
            name: pass.name(),
            params: ModifierParams::Displace {
                texture: pass.texture,
                direction: pass.direction,
                strength: pass.strength,
                mid_level: 0.5,
            },
        }));

        stack
    }
}

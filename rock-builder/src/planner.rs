//! Displacement planning
//!
//! Six coarse passes, one per signed axis, push the surface in and out along
//! that axis by the coarse texture. One fine pass then roughens the surface
//! along the normal. Every coarse pass draws its own magnitude, so +X and -X
//! generally differ.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::host::Axis;
use crate::noise_cache::{NoiseHandle, NoiseRole};
use crate::params::RockParams;

/// Direction a displacement pass moves vertices in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplaceDirection {
    Axis(Axis),
    Normal,
}

/// One displacement modifier to be stacked
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplacementPass {
    pub role: NoiseRole,
    pub direction: DisplaceDirection,
    /// Sign of a coarse pass (+1 or -1); fine passes carry +1
    pub sign: i8,
    pub strength: f32,
    pub texture: NoiseHandle,
}

impl DisplacementPass {
    /// Modifier name as it appears in the stack
    pub fn name(&self) -> String {
        match self.direction {
            DisplaceDirection::Axis(axis) => format!("Displace - {}{}", axis.label(), self.sign),
            DisplaceDirection::Normal => "Displace - Fine".to_string(),
        }
    }
}

/// Ordered displacement passes, coarse first
pub type DisplacementPlan = Vec<DisplacementPass>;

/// Number of coarse passes in every plan
pub const COARSE_PASSES: usize = 6;

pub struct DisplacementPlanner;

impl DisplacementPlanner {
    /// Plan the 6 coarse passes and the fine pass
    pub fn plan<R: Rng + ?Sized>(
        params: &RockParams,
        coarse: NoiseHandle,
        fine: NoiseHandle,
        rng: &mut R,
    ) -> DisplacementPlan {
        let mut passes = Vec::with_capacity(COARSE_PASSES + 1);

        for axis in Axis::ALL {
            for sign in [1i8, -1] {
                let magnitude = params.coarse_displacement.sample(rng);
                passes.push(DisplacementPass {
                    role: NoiseRole::Coarse,
                    direction: DisplaceDirection::Axis(axis),
                    sign,
                    strength: f32::from(sign) * magnitude,
                    texture: coarse,
                });
            }
        }

        passes.push(DisplacementPass {
            role: NoiseRole::Fine,
            direction: DisplaceDirection::Normal,
            sign: 1,
            strength: params.fine_displacement,
            texture: fine,
        });

        passes
    }
}

//! Rock generation parameters
//!
//! `RockParams` is the configuration boundary: parameter files (TOML) and CLI
//! flags land here, and [`RockParams::validate`] rejects bad input before any
//! geometry is built. The generator assumes validated input.
//!
//! # Parameter file (rocks.toml)
//!
//! ```toml
//! random_variation = 0.5
//! bevel_width = 0.025
//! viewport_subdivisions = 4
//! render_subdivisions = 5
//! fine_displacement = 0.025
//! fine_noise_scale = 1.5
//! reuse_coarse_texture = false
//! rock_count = 10
//! spacing = 3.0
//! seed = 0
//!
//! [elongation]
//! min = 1.0
//! max = 1.5
//!
//! [coarse_displacement]
//! min = 0.25
//! max = 0.75
//!
//! [coarse_noise_scale]
//! min = 1.25
//! max = 1.75
//! ```

use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::procedural::MAX_ICOSPHERE_LEVEL;

/// Highest subdivision surface level accepted for viewport or render output
pub const MAX_SUBSURF_LEVEL: u32 = 6;

/// Closed range a value is drawn from
///
/// A range with `min == max` is the "fixed value" mode: drawing from it always
/// yields exactly that value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatRange {
    pub min: f32,
    pub max: f32,
}

impl FloatRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Degenerate range that always draws `value`
    pub const fn fixed(value: f32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn is_fixed(&self) -> bool {
        self.min == self.max
    }

    /// Draw uniformly from the range
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let t: f32 = rng.random();
        self.min + (self.max - self.min) * t
    }

    fn check(&self, field: &'static str) -> Result<(), ConfigError> {
        for value in [self.min, self.max] {
            check_finite(field, value)?;
        }
        if self.min > self.max {
            return Err(ConfigError::InvalidRange {
                field,
                min: self.min,
                max: self.max,
            });
        }
        check_non_negative(field, self.min)
    }
}

/// Parameters for one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RockParams {
    /// Subdivision level of the base icosphere
    pub subdivision_level: u32,
    /// Scale factor range applied to the X axis of the base shape
    pub elongation: FloatRange,
    /// Per-vertex jitter magnitude
    pub random_variation: f32,
    /// Subdivision surface level for interactive preview
    pub viewport_subdivisions: u32,
    /// Subdivision surface level for final output
    pub render_subdivisions: u32,
    /// Bevel modifier width
    pub bevel_width: f32,
    /// Strength range of each coarse displacement pass
    pub coarse_displacement: FloatRange,
    /// Strength of the fine displacement pass
    pub fine_displacement: f32,
    /// Noise scale range of the coarse texture
    pub coarse_noise_scale: FloatRange,
    /// Noise scale of the fine texture
    pub fine_noise_scale: f32,
    /// Keep the coarse texture between rocks instead of creating a new one
    pub reuse_coarse_texture: bool,
    /// Number of rocks in a batch
    pub rock_count: u32,
    /// Grid pitch between rocks in a batch
    pub spacing: f32,
    /// Seed of the default random source
    pub seed: u64,
}

impl Default for RockParams {
    fn default() -> Self {
        Self {
            subdivision_level: 2,
            elongation: FloatRange::new(1.0, 1.5),
            random_variation: 0.5,
            viewport_subdivisions: 4,
            render_subdivisions: 5,
            bevel_width: 0.025,
            coarse_displacement: FloatRange::new(0.25, 0.75),
            fine_displacement: 0.025,
            coarse_noise_scale: FloatRange::new(1.25, 1.75),
            fine_noise_scale: 1.5,
            reuse_coarse_texture: false,
            rock_count: 10,
            spacing: 3.0,
            seed: 0,
        }
    }
}

impl RockParams {
    /// Parse a TOML parameter file body (missing fields take defaults)
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load and validate a TOML parameter file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let params = Self::from_toml_str(&text)?;
        params.validate()?;
        Ok(params)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject parameter sets the generator cannot honor
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.subdivision_level > MAX_ICOSPHERE_LEVEL {
            return Err(ConfigError::TooLarge {
                field: "subdivision_level",
                value: self.subdivision_level,
                max: MAX_ICOSPHERE_LEVEL,
            });
        }
        for (field, value) in [
            ("viewport_subdivisions", self.viewport_subdivisions),
            ("render_subdivisions", self.render_subdivisions),
        ] {
            if value > MAX_SUBSURF_LEVEL {
                return Err(ConfigError::TooLarge {
                    field,
                    value,
                    max: MAX_SUBSURF_LEVEL,
                });
            }
        }

        self.elongation.check("elongation")?;
        if self.elongation.min <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "elongation.min",
                value: self.elongation.min,
            });
        }

        self.coarse_displacement.check("coarse_displacement")?;
        self.coarse_noise_scale.check("coarse_noise_scale")?;

        check_non_negative("random_variation", self.random_variation)?;
        check_non_negative("bevel_width", self.bevel_width)?;
        check_non_negative("fine_displacement", self.fine_displacement)?;
        check_non_negative("fine_noise_scale", self.fine_noise_scale)?;
        check_non_negative("spacing", self.spacing)?;

        Ok(())
    }
}

fn check_finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

fn check_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    check_finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    #[test]
    fn test_defaults_validate() {
        RockParams::default().validate().unwrap();
    }

    #[test]
    fn test_fixed_range_draws_exact_value() {
        let mut rng = Pcg64::seed_from_u64(7);
        let range = FloatRange::fixed(1.3);
        for _ in 0..16 {
            assert_eq!(range.sample(&mut rng), 1.3);
        }
    }

    #[test]
    fn test_range_sample_within_bounds() {
        let mut rng = Pcg64::seed_from_u64(1);
        let range = FloatRange::new(0.25, 0.75);
        for _ in 0..256 {
            let v = range.sample(&mut rng);
            assert!((0.25..=0.75).contains(&v));
        }
    }

    #[test]
    fn test_rejects_inverted_range() {
        let params = RockParams {
            coarse_displacement: FloatRange::new(0.9, 0.1),
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::InvalidRange {
                field: "coarse_displacement",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_non_positive_elongation() {
        let params = RockParams {
            elongation: FloatRange::fixed(0.0),
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::NonPositive { .. })
        ));
    }

    #[test]
    fn test_rejects_negative_magnitudes() {
        let params = RockParams {
            random_variation: -0.1,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::Negative {
                field: "random_variation",
                ..
            })
        ));

        let params = RockParams {
            spacing: f32::NAN,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let params = RockParams {
            elongation: FloatRange::new(1.0, f32::NAN),
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::NotFinite {
                field: "elongation",
                ..
            })
        ));

        let params = RockParams {
            coarse_displacement: FloatRange::new(0.0, f32::INFINITY),
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::NotFinite {
                field: "coarse_displacement",
                ..
            })
        ));

        let params = RockParams {
            fine_noise_scale: f32::INFINITY,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::NotFinite {
                field: "fine_noise_scale",
                ..
            })
        ));

        let params = RockParams {
            spacing: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::NotFinite {
                field: "spacing",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_excessive_subdivision() {
        let params = RockParams {
            render_subdivisions: 11,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::TooLarge {
                field: "render_subdivisions",
                ..
            })
        ));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let params = RockParams::from_toml_str(
            r#"
            rock_count = 4
            reuse_coarse_texture = true

            [elongation]
            min = 2.0
            max = 2.0
            "#,
        )
        .unwrap();

        assert_eq!(params.rock_count, 4);
        assert!(params.reuse_coarse_texture);
        assert!(params.elongation.is_fixed());
        assert_eq!(params.spacing, RockParams::default().spacing);
    }

    #[test]
    fn test_toml_text_survives_reparse() {
        let params = RockParams {
            seed: 99,
            bevel_width: 0.05,
            ..Default::default()
        };
        let text = params.to_toml_string().unwrap();
        assert_eq!(RockParams::from_toml_str(&text).unwrap(), params);
    }

    #[test]
    fn test_bad_toml_reports_parse_error() {
        let err = RockParams::from_toml_str("rock_count = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}

//! Atmosphere configuration with Earth-like defaults.
//!
//! Distances are in kilometres, scattering coefficients in km^-1.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::atmosphere::sun::sun_direction_for_angle;
use crate::core::types::Result;

// ---------------------------------------------------------------------------
// Earth presets
// ---------------------------------------------------------------------------

pub const DEFAULT_VIEW_SAMPLES: i32 = 16;
pub const DEFAULT_LIGHT_SAMPLES: i32 = 8;
/// Initial sun elevation, one degree above the horizon.
pub const DEFAULT_SUN_ANGLE: f32 = 1.0 * (std::f32::consts::PI / 180.0);
pub const DEFAULT_SUN_DIR: [f32; 3] = [0.0, 1.0, 0.0];

pub const EARTH_SUN_INTENSITY: f32 = 20.0;
pub const EARTH_RADIUS: f32 = 6360.0;
pub const EARTH_ATMOSPHERE_RADIUS: f32 = 6420.0;
pub const EARTH_RAYLEIGH_COEFFICIENT: [f32; 3] = [3.8e-3, 13.5e-3, 33.1e-3];
pub const EARTH_RAYLEIGH_SCALE_HEIGHT: f32 = 7.994;
pub const EARTH_MIE_COEFFICIENT: f32 = 21e-3;
pub const EARTH_MIE_SCALE_HEIGHT: f32 = 1.2;
pub const EARTH_MIE_ANISOTROPY: f32 = 0.888;

/// Valid range for view and light ray sample counts.
pub const MIN_SAMPLES: i32 = 1;
pub const MAX_SAMPLES: i32 = 64;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Full set of scattering parameters. Serialized as JSON presets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtmosphereConfig {
    /// Samples along the primary (view) ray.
    pub view_samples: i32,
    /// Samples along the secondary (light) ray.
    pub light_samples: i32,

    /// Direction towards the sun.
    pub sun_dir: [f32; 3],
    /// Sun elevation angle in radians.
    pub sun_angle: f32,
    pub sun_intensity: f32,

    /// Planet radius `R_e`.
    pub planet_radius: f32,
    /// Outer atmosphere radius `R_a`.
    pub atmosphere_radius: f32,

    /// Rayleigh scattering coefficient per RGB wavelength (`β_R`).
    pub rayleigh_coefficient: [f32; 3],
    /// Rayleigh scale height (`H_R`).
    pub rayleigh_scale_height: f32,

    /// Mie scattering coefficient (`β_M`).
    pub mie_coefficient: f32,
    /// Mie scale height (`H_M`).
    pub mie_scale_height: f32,
    /// Mie anisotropy of the medium (`g`).
    pub mie_anisotropy: f32,

    // -- Render toggles ----------------------------------------------------
    pub tone_mapping: bool,
    pub animate_sun: bool,
    pub render_ground: bool,
}

impl Default for AtmosphereConfig {
    fn default() -> Self {
        Self {
            view_samples: DEFAULT_VIEW_SAMPLES,
            light_samples: DEFAULT_LIGHT_SAMPLES,
            sun_dir: sun_direction_for_angle(DEFAULT_SUN_DIR.into(), DEFAULT_SUN_ANGLE).to_array(),
            sun_angle: DEFAULT_SUN_ANGLE,
            sun_intensity: EARTH_SUN_INTENSITY,
            planet_radius: EARTH_RADIUS,
            atmosphere_radius: EARTH_ATMOSPHERE_RADIUS,
            rayleigh_coefficient: EARTH_RAYLEIGH_COEFFICIENT,
            rayleigh_scale_height: EARTH_RAYLEIGH_SCALE_HEIGHT,
            mie_coefficient: EARTH_MIE_COEFFICIENT,
            mie_scale_height: EARTH_MIE_SCALE_HEIGHT,
            mie_anisotropy: EARTH_MIE_ANISOTROPY,
            tone_mapping: true,
            animate_sun: false,
            render_ground: false,
        }
    }
}

impl AtmosphereConfig {
    /// Write the preset as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, json)?;
        log::info!("Saved atmosphere preset to {}", path.display());
        Ok(())
    }

    /// Read a preset. Missing fields take their Earth defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&json)?;
        config.view_samples = config.view_samples.clamp(MIN_SAMPLES, MAX_SAMPLES);
        config.light_samples = config.light_samples.clamp(MIN_SAMPLES, MAX_SAMPLES);
        log::info!("Loaded atmosphere preset from {}", path.display());
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_earth() {
        let config = AtmosphereConfig::default();
        assert_eq!(config.view_samples, 16);
        assert_eq!(config.light_samples, 8);
        assert_eq!(config.planet_radius, 6360.0);
        assert_eq!(config.atmosphere_radius, 6420.0);
        assert!(config.tone_mapping);
        assert!(!config.animate_sun);
        assert!(!config.render_ground);
    }

    #[test]
    fn test_default_sun_just_above_horizon() {
        let config = AtmosphereConfig::default();
        let [x, y, z] = config.sun_dir;
        assert_eq!(x, 0.0);
        assert!((y - DEFAULT_SUN_ANGLE.sin()).abs() < 1e-6);
        assert!((z + DEFAULT_SUN_ANGLE.cos()).abs() < 1e-6);
    }

    #[test]
    fn test_save_load_preset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("presets").join("mars.json");

        let config = AtmosphereConfig {
            planet_radius: 3390.0,
            atmosphere_radius: 3500.0,
            mie_anisotropy: 0.5,
            render_ground: true,
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = AtmosphereConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_fills_missing_and_clamps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{ "view_samples": 500, "sun_intensity": 5.0 }"#).unwrap();

        let loaded = AtmosphereConfig::load(&path).unwrap();
        assert_eq!(loaded.view_samples, MAX_SAMPLES);
        assert_eq!(loaded.sun_intensity, 5.0);
        assert_eq!(loaded.planet_radius, EARTH_RADIUS);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AtmosphereConfig::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, crate::core::error::Error::Io(_)));
    }
}

//! Rayleigh + Mie single scattering atmosphere.
//!
//! [`Atmosphere`] owns the scattering parameters, animates the sun and caches
//! the camera matrices of the current frame. The renderer reads the
//! GPU-ready blocks from [`uniform`](Atmosphere::uniform) and
//! [`planet_uniform`](Atmosphere::planet_uniform).

pub mod config;
pub mod state;
pub mod sun;

// Re-exports
pub use config::AtmosphereConfig;
pub use state::{AtmosphereUniform, PlanetUniform};

use std::path::Path;

use crate::core::types::{Mat4, Result, Vec3};
use config::{MAX_SAMPLES, MIN_SAMPLES};
use sun::{advance_sun_angle, sun_direction_for_angle};

// ---------------------------------------------------------------------------
// Atmosphere
// ---------------------------------------------------------------------------

/// Scattering parameters plus the per-frame state needed to draw them.
#[derive(Clone, Debug)]
pub struct Atmosphere {
    config: AtmosphereConfig,
    /// Uniform scale by the atmosphere radius
    model_atmosphere: Mat4,
    /// Uniform scale by the planet radius
    model_planet: Mat4,
    proj: Mat4,
    view: Mat4,
    view_pos: Vec3,
}

impl Atmosphere {
    /// Create an atmosphere from a configuration.
    pub fn new(config: AtmosphereConfig) -> Self {
        let mut atmosphere = Self {
            config: AtmosphereConfig::default(),
            model_atmosphere: Mat4::IDENTITY,
            model_planet: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            view_pos: Vec3::ZERO,
        };
        atmosphere.set_config(config);
        atmosphere
    }

    /// Replace every parameter at once (e.g. after loading a preset).
    pub fn set_config(&mut self, config: AtmosphereConfig) {
        self.config = config;
        self.config.view_samples = self.config.view_samples.clamp(MIN_SAMPLES, MAX_SAMPLES);
        self.config.light_samples = self.config.light_samples.clamp(MIN_SAMPLES, MAX_SAMPLES);
        self.rebuild_models();
    }

    #[inline]
    pub fn config(&self) -> &AtmosphereConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Defaults
    // -----------------------------------------------------------------------

    /// Reset every scattering parameter to the Earth preset.
    ///
    /// Render toggles (tone mapping, animation, ground) keep their values.
    pub fn set_defaults(&mut self) {
        let defaults = AtmosphereConfig::default();
        self.config.view_samples = defaults.view_samples;
        self.config.light_samples = defaults.light_samples;
        self.config.sun_dir = defaults.sun_dir;
        self.config.sun_angle = defaults.sun_angle;
        self.config.sun_intensity = defaults.sun_intensity;
        self.set_planet_radius(defaults.planet_radius);
        self.set_atmosphere_radius(defaults.atmosphere_radius);
        self.set_rayleigh_defaults();
        self.set_mie_defaults();
    }

    /// Reset the sun and stop its animation.
    pub fn set_sun_defaults(&mut self) {
        let defaults = AtmosphereConfig::default();
        self.config.animate_sun = false;
        self.config.sun_dir = config::DEFAULT_SUN_DIR;
        self.set_sun_angle(defaults.sun_angle);
        self.config.sun_intensity = defaults.sun_intensity;
    }

    pub fn set_rayleigh_defaults(&mut self) {
        self.config.rayleigh_coefficient = config::EARTH_RAYLEIGH_COEFFICIENT;
        self.config.rayleigh_scale_height = config::EARTH_RAYLEIGH_SCALE_HEIGHT;
    }

    pub fn set_mie_defaults(&mut self) {
        self.config.mie_coefficient = config::EARTH_MIE_COEFFICIENT;
        self.config.mie_scale_height = config::EARTH_MIE_SCALE_HEIGHT;
        self.config.mie_anisotropy = config::EARTH_MIE_ANISOTROPY;
    }

    /// Reset both radii and stop rendering the ground.
    pub fn set_size_defaults(&mut self) {
        self.config.planet_radius = config::EARTH_RADIUS;
        self.config.atmosphere_radius = config::EARTH_ATMOSPHERE_RADIUS;
        self.config.render_ground = false;
        self.rebuild_models();
    }

    // -----------------------------------------------------------------------
    // Per-frame
    // -----------------------------------------------------------------------

    /// Advance the sun animation by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        if self.config.animate_sun {
            let angle = advance_sun_angle(self.config.sun_angle, dt);
            self.set_sun_angle(angle);
        }
    }

    /// Cache the camera matrices and position for this frame.
    pub fn set_view(&mut self, proj: Mat4, view: Mat4, view_pos: Vec3) {
        self.proj = proj;
        self.view = view;
        self.view_pos = view_pos;
    }

    #[inline]
    pub fn view_pos(&self) -> Vec3 {
        self.view_pos
    }

    /// Uniform block for the atmosphere pass.
    pub fn uniform(&self) -> AtmosphereUniform {
        let c = &self.config;
        AtmosphereUniform {
            mvp: (self.proj * self.view * self.model_atmosphere).to_cols_array_2d(),
            model: self.model_atmosphere.to_cols_array_2d(),
            view_pos: self.view_pos.to_array(),
            view_samples: c.view_samples,
            sun_dir: c.sun_dir,
            light_samples: c.light_samples,
            beta_r: c.rayleigh_coefficient,
            i_sun: c.sun_intensity,
            r_e: c.planet_radius,
            r_a: c.atmosphere_radius,
            beta_m: c.mie_coefficient,
            h_r: c.rayleigh_scale_height,
            h_m: c.mie_scale_height,
            g: c.mie_anisotropy,
            tone_mapping_factor: if c.tone_mapping { 1.0 } else { 0.0 },
            _pad: 0.0,
        }
    }

    /// Uniform block for the planet pass.
    pub fn planet_uniform(&self) -> PlanetUniform {
        PlanetUniform {
            mvp: (self.proj * self.view * self.model_planet).to_cols_array_2d(),
            model: self.model_planet.to_cols_array_2d(),
            sun_dir: self.config.sun_dir,
            _pad: 0.0,
        }
    }

    #[inline]
    pub fn model_atmosphere(&self) -> Mat4 {
        self.model_atmosphere
    }

    #[inline]
    pub fn model_planet(&self) -> Mat4 {
        self.model_planet
    }

    // -----------------------------------------------------------------------
    // Presets
    // -----------------------------------------------------------------------

    pub fn save(&self, path: &Path) -> Result<()> {
        self.config.save(path)
    }

    pub fn load(&mut self, path: &Path) -> Result<()> {
        let config = AtmosphereConfig::load(path)?;
        self.set_config(config);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Sun
    // -----------------------------------------------------------------------

    /// Sun elevation in radians.
    #[inline]
    pub fn sun_angle(&self) -> f32 {
        self.config.sun_angle
    }

    /// Set the sun elevation; only the y and z of the direction change.
    pub fn set_sun_angle(&mut self, angle: f32) {
        self.config.sun_angle = angle;
        self.config.sun_dir = sun_direction_for_angle(self.sun_dir(), angle).to_array();
    }

    #[inline]
    pub fn sun_dir(&self) -> Vec3 {
        Vec3::from(self.config.sun_dir)
    }

    pub fn set_sun_dir(&mut self, dir: Vec3) {
        self.config.sun_dir = dir.to_array();
    }

    #[inline]
    pub fn sun_intensity(&self) -> f32 {
        self.config.sun_intensity
    }

    pub fn set_sun_intensity(&mut self, intensity: f32) {
        self.config.sun_intensity = intensity;
    }

    #[inline]
    pub fn is_animate_sun(&self) -> bool {
        self.config.animate_sun
    }

    pub fn set_animate_sun(&mut self, animate: bool) {
        self.config.animate_sun = animate;
    }

    // -----------------------------------------------------------------------
    // Sizes
    // -----------------------------------------------------------------------

    #[inline]
    pub fn planet_radius(&self) -> f32 {
        self.config.planet_radius
    }

    /// Set the planet radius, growing the atmosphere if it would end up inside.
    pub fn set_planet_radius(&mut self, radius: f32) {
        self.config.planet_radius = radius;
        if radius > self.config.atmosphere_radius {
            self.config.atmosphere_radius = radius;
        }
        self.rebuild_models();
    }

    #[inline]
    pub fn atmosphere_radius(&self) -> f32 {
        self.config.atmosphere_radius
    }

    pub fn set_atmosphere_radius(&mut self, radius: f32) {
        self.config.atmosphere_radius = radius;
        self.rebuild_models();
    }

    // -----------------------------------------------------------------------
    // Scattering
    // -----------------------------------------------------------------------

    #[inline]
    pub fn rayleigh_coefficient(&self) -> Vec3 {
        Vec3::from(self.config.rayleigh_coefficient)
    }

    pub fn set_rayleigh_coefficient(&mut self, beta: Vec3) {
        self.config.rayleigh_coefficient = beta.to_array();
    }

    #[inline]
    pub fn rayleigh_scale_height(&self) -> f32 {
        self.config.rayleigh_scale_height
    }

    pub fn set_rayleigh_scale_height(&mut self, height: f32) {
        self.config.rayleigh_scale_height = height;
    }

    #[inline]
    pub fn mie_coefficient(&self) -> f32 {
        self.config.mie_coefficient
    }

    pub fn set_mie_coefficient(&mut self, beta: f32) {
        self.config.mie_coefficient = beta;
    }

    #[inline]
    pub fn mie_scale_height(&self) -> f32 {
        self.config.mie_scale_height
    }

    pub fn set_mie_scale_height(&mut self, height: f32) {
        self.config.mie_scale_height = height;
    }

    #[inline]
    pub fn mie_anisotropy(&self) -> f32 {
        self.config.mie_anisotropy
    }

    pub fn set_mie_anisotropy(&mut self, g: f32) {
        self.config.mie_anisotropy = g;
    }

    // -----------------------------------------------------------------------
    // Quality and toggles
    // -----------------------------------------------------------------------

    #[inline]
    pub fn view_samples(&self) -> i32 {
        self.config.view_samples
    }

    pub fn set_view_samples(&mut self, samples: i32) {
        self.config.view_samples = samples.clamp(MIN_SAMPLES, MAX_SAMPLES);
    }

    #[inline]
    pub fn light_samples(&self) -> i32 {
        self.config.light_samples
    }

    pub fn set_light_samples(&mut self, samples: i32) {
        self.config.light_samples = samples.clamp(MIN_SAMPLES, MAX_SAMPLES);
    }

    #[inline]
    pub fn is_tone_mapping(&self) -> bool {
        self.config.tone_mapping
    }

    pub fn set_tone_mapping(&mut self, enabled: bool) {
        self.config.tone_mapping = enabled;
    }

    #[inline]
    pub fn is_render_ground(&self) -> bool {
        self.config.render_ground
    }

    pub fn set_render_ground(&mut self, enabled: bool) {
        self.config.render_ground = enabled;
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn rebuild_models(&mut self) {
        self.model_atmosphere = Mat4::from_scale(Vec3::splat(self.config.atmosphere_radius));
        self.model_planet = Mat4::from_scale(Vec3::splat(self.config.planet_radius));
    }
}

impl Default for Atmosphere {
    fn default() -> Self {
        Self::new(AtmosphereConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_set_sun_angle_keeps_x() {
        let mut atmosphere = Atmosphere::default();
        atmosphere.set_sun_dir(Vec3::new(0.5, 0.0, 0.0));
        atmosphere.set_sun_angle(PI * 0.5);
        let dir = atmosphere.sun_dir();
        assert_eq!(dir.x, 0.5);
        assert!((dir.y - 1.0).abs() < 1e-6);
        assert!(dir.z.abs() < 1e-6);
    }

    #[test]
    fn test_update_only_animates_when_enabled() {
        let mut atmosphere = Atmosphere::default();
        let angle = atmosphere.sun_angle();
        atmosphere.update(1.0);
        assert_eq!(atmosphere.sun_angle(), angle);

        atmosphere.set_animate_sun(true);
        atmosphere.update(1.0);
        assert!((atmosphere.sun_angle() - (angle + 0.5)).abs() < 1e-6);
        assert!((atmosphere.sun_dir().y - atmosphere.sun_angle().sin()).abs() < 1e-6);
    }

    #[test]
    fn test_sun_defaults_stop_animation() {
        let mut atmosphere = Atmosphere::default();
        atmosphere.set_animate_sun(true);
        atmosphere.set_sun_intensity(80.0);
        atmosphere.set_sun_dir(Vec3::new(1.0, 1.0, 1.0));
        atmosphere.set_sun_defaults();

        assert!(!atmosphere.is_animate_sun());
        assert_eq!(atmosphere.sun_intensity(), config::EARTH_SUN_INTENSITY);
        assert_eq!(atmosphere.sun_dir().x, 0.0);
        assert_eq!(atmosphere.config().sun_dir, AtmosphereConfig::default().sun_dir);
    }

    #[test]
    fn test_size_defaults_disable_ground() {
        let mut atmosphere = Atmosphere::default();
        atmosphere.set_render_ground(true);
        atmosphere.set_atmosphere_radius(9000.0);
        atmosphere.set_size_defaults();
        assert!(!atmosphere.is_render_ground());
        assert_eq!(atmosphere.atmosphere_radius(), config::EARTH_ATMOSPHERE_RADIUS);
        assert_eq!(atmosphere.model_atmosphere(), Mat4::from_scale(Vec3::splat(6420.0)));
    }

    #[test]
    fn test_defaults_keep_toggles() {
        let mut atmosphere = Atmosphere::default();
        atmosphere.set_tone_mapping(false);
        atmosphere.set_mie_anisotropy(0.1);
        atmosphere.set_defaults();
        assert!(!atmosphere.is_tone_mapping());
        assert_eq!(atmosphere.mie_anisotropy(), config::EARTH_MIE_ANISOTROPY);
    }

    #[test]
    fn test_planet_radius_raises_atmosphere() {
        let mut atmosphere = Atmosphere::default();
        atmosphere.set_planet_radius(7000.0);
        assert_eq!(atmosphere.atmosphere_radius(), 7000.0);
        assert_eq!(atmosphere.model_planet(), Mat4::from_scale(Vec3::splat(7000.0)));
        assert_eq!(atmosphere.model_atmosphere(), Mat4::from_scale(Vec3::splat(7000.0)));

        atmosphere.set_planet_radius(100.0);
        assert_eq!(atmosphere.atmosphere_radius(), 7000.0);
    }

    #[test]
    fn test_sample_counts_clamped() {
        let mut atmosphere = Atmosphere::default();
        atmosphere.set_view_samples(0);
        atmosphere.set_light_samples(1000);
        assert_eq!(atmosphere.view_samples(), 1);
        assert_eq!(atmosphere.light_samples(), 64);
    }

    #[test]
    fn test_uniform_contents() {
        let mut atmosphere = Atmosphere::default();
        let proj = Mat4::perspective_rh(1.0, 1.0, 0.1, 100.0);
        let view = Mat4::from_translation(Vec3::new(0.0, -10.0, 0.0));
        atmosphere.set_view(proj, view, Vec3::new(0.0, 10.0, 0.0));
        atmosphere.set_tone_mapping(false);

        let u = atmosphere.uniform();
        let expected = proj * view * Mat4::from_scale(Vec3::splat(6420.0));
        assert_eq!(u.mvp, expected.to_cols_array_2d());
        assert_eq!(u.view_pos, [0.0, 10.0, 0.0]);
        assert_eq!(u.view_samples, 16);
        assert_eq!(u.light_samples, 8);
        assert_eq!(u.r_e, 6360.0);
        assert_eq!(u.r_a, 6420.0);
        assert_eq!(u.tone_mapping_factor, 0.0);

        let p = atmosphere.planet_uniform();
        let expected = proj * view * Mat4::from_scale(Vec3::splat(6360.0));
        assert_eq!(p.mvp, expected.to_cols_array_2d());
        assert_eq!(p.sun_dir, u.sun_dir);
    }

    #[test]
    fn test_save_load_roundtrip_rebuilds_models() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preset.json");

        let mut atmosphere = Atmosphere::default();
        atmosphere.set_planet_radius(100.0);
        atmosphere.set_atmosphere_radius(120.0);
        atmosphere.save(&path).unwrap();

        let mut other = Atmosphere::default();
        other.load(&path).unwrap();
        assert_eq!(other.planet_radius(), 100.0);
        assert_eq!(other.model_atmosphere(), Mat4::from_scale(Vec3::splat(120.0)));
    }
}

//! GPU-ready uniform blocks for the atmosphere and planet passes.

use bytemuck::{Pod, Zeroable};

/// Uniform block of `draw_atmosphere.wgsl` (must match shader struct exactly).
///
/// WGSL vec3 has 16-byte alignment, so every vec3 is followed by a scalar.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct AtmosphereUniform {
    /// Projection * view * atmosphere model (64 bytes, offset 0)
    pub mvp: [[f32; 4]; 4],
    /// Atmosphere model matrix (64 bytes, offset 64)
    pub model: [[f32; 4]; 4],

    // -- Viewer (offset 128) --
    pub view_pos: [f32; 3],
    pub view_samples: i32,

    // -- Sun (offset 144) --
    pub sun_dir: [f32; 3],
    pub light_samples: i32,

    // -- Rayleigh (offset 160) --
    pub beta_r: [f32; 3],
    pub i_sun: f32,

    // -- Sizes (offset 176) --
    pub r_e: f32,
    pub r_a: f32,
    pub beta_m: f32,
    pub h_r: f32,

    // -- Mie + tone mapping (offset 192, total 208) --
    pub h_m: f32,
    pub g: f32,
    /// 1.0 when tone mapping is enabled, 0.0 otherwise
    pub tone_mapping_factor: f32,
    pub _pad: f32,
}

/// Uniform block of `draw_mesh.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct PlanetUniform {
    /// Projection * view * planet model (64 bytes, offset 0)
    pub mvp: [[f32; 4]; 4],
    /// Planet model matrix (64 bytes, offset 64)
    pub model: [[f32; 4]; 4],
    /// Direction towards the sun (12 bytes, offset 128)
    pub sun_dir: [f32; 3],
    /// Final padding to 144 bytes
    pub _pad: f32,
}

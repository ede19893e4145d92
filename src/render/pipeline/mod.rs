//! Render pipelines

pub mod atmosphere;
pub mod planet;

pub use atmosphere::AtmospherePipeline;
pub use planet::PlanetPipeline;

use crate::render::texture::DEPTH_FORMAT;

/// Depth test shared by both scene passes: less-than with depth writes
pub(crate) fn depth_stencil_state() -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

/// Opaque color target for the surface format
pub(crate) fn color_target(format: wgpu::TextureFormat) -> [Option<wgpu::ColorTargetState>; 1] {
    [Some(wgpu::ColorTargetState {
        format,
        blend: None,
        write_mask: wgpu::ColorWrites::ALL,
    })]
}

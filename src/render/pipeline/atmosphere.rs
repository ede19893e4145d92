//! Atmosphere pass: ray-marched single scattering on the atmosphere shell

use std::path::Path;

use crate::core::types::Result;
use crate::render::shader::{Shader, ShaderSource};

const SHADER_FILE: &str = "draw_atmosphere.wgsl";
const SHADER_SOURCE: &str = include_str!("../../../shaders/draw_atmosphere.wgsl");

/// Atmosphere pipeline
///
/// The camera normally sits inside the shell, so nothing is culled and the
/// inner faces produce the sky.
pub struct AtmospherePipeline {
    pipeline: wgpu::RenderPipeline,
}

impl AtmospherePipeline {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        uniform_layout: &wgpu::BindGroupLayout,
        vertex_layouts: &[wgpu::VertexBufferLayout<'_>],
        shader_dir: Option<&Path>,
    ) -> Result<Self> {
        let shader = Shader::from_source(
            device,
            &ShaderSource::resolve(shader_dir, SHADER_FILE, SHADER_SOURCE),
        )?;

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("atmosphere_pipeline_layout"),
            bind_group_layouts: &[uniform_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("atmosphere_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: shader.module(),
                entry_point: Some("vs_main"),
                buffers: vertex_layouts,
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(super::depth_stencil_state()),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: shader.module(),
                entry_point: Some("fs_main"),
                targets: &super::color_target(surface_format),
                compilation_options: Default::default(),
            }),
            multiview: None,
            cache: None,
        });

        log::debug!("Created atmosphere pipeline ({})", shader.label());

        Ok(Self { pipeline })
    }

    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>, uniform_bind_group: &wgpu::BindGroup) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, uniform_bind_group, &[]);
    }
}

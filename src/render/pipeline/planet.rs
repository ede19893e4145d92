//! Planet surface pass: textured sphere lit by the sun

use std::path::Path;

use crate::core::types::Result;
use crate::render::shader::{Shader, ShaderSource};
use crate::render::texture::Texture2D;

const SHADER_FILE: &str = "draw_mesh.wgsl";
const SHADER_SOURCE: &str = include_str!("../../../shaders/draw_mesh.wgsl");

/// Planet pipeline
///
/// Bind groups: 0 = `PlanetUniform`, 1 = ground texture + sampler.
pub struct PlanetPipeline {
    pipeline: wgpu::RenderPipeline,
    texture_bind_group_layout: wgpu::BindGroupLayout,
}

impl PlanetPipeline {
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

        let texture_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("planet_texture_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("planet_pipeline_layout"),
            bind_group_layouts: &[uniform_layout, &texture_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("planet_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: shader.module(),
                entry_point: Some("vs_main"),
                buffers: vertex_layouts,
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
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

        log::debug!("Created planet pipeline ({})", shader.label());

        Ok(Self {
            pipeline,
            texture_bind_group_layout,
        })
    }

    /// Bind group for the ground texture; recreate when the texture changes
    pub fn create_texture_bind_group(&self, device: &wgpu::Device, texture: &Texture2D) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("planet_texture_bind_group"),
            layout: &self.texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(texture.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(texture.sampler()),
                },
            ],
        })
    }

    /// Set the pipeline and both bind groups; the caller issues the draw
    pub fn bind(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        uniform_bind_group: &wgpu::BindGroup,
        texture_bind_group: &wgpu::BindGroup,
    ) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, uniform_bind_group, &[]);
        pass.set_bind_group(1, texture_bind_group, &[]);
    }
}

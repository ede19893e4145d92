//! Frame rendering: planet, atmosphere, then the GUI overlay

use crate::atmosphere::{Atmosphere, AtmosphereUniform, PlanetUniform};
use crate::core::config::AppConfig;
use crate::core::error::Error;
use crate::core::types::Result;
use crate::render::buffer::UniformBuffer;
use crate::render::context::GpuContext;
use crate::render::gui::{Gui, GuiFrame};
use crate::render::mesh::{Mesh, MeshData};
use crate::render::pipeline::{AtmospherePipeline, PlanetPipeline};
use crate::render::texture::{DepthTexture, Texture2D, WrapMode};

/// Clear color behind the scene
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.1,
    g: 0.1,
    b: 0.1,
    a: 1.0,
};

/// Ground color used when no texture is configured or it fails to load
const FALLBACK_GROUND: [u8; 4] = [86, 110, 64, 255];

/// GPU resources for the scene
pub struct Renderer {
    meshes: Vec<Mesh>,
    depth: DepthTexture,
    ground: Texture2D,
    ground_bind_group: wgpu::BindGroup,
    atmosphere_uniform: UniformBuffer<AtmosphereUniform>,
    planet_uniform: UniformBuffer<PlanetUniform>,
    atmosphere_pipeline: AtmospherePipeline,
    planet_pipeline: PlanetPipeline,
}

impl Renderer {
    pub fn new(gpu: &GpuContext, config: &AppConfig) -> Result<Self> {
        let device = &gpu.device;
        let meshes = Self::load_meshes(device, config)?;
        let Some(first_mesh) = meshes.first() else {
            return Err(Error::Gpu("no meshes to draw".into()));
        };

        let atmosphere_uniform = UniformBuffer::new(device, "atmosphere_uniform");
        let planet_uniform = UniformBuffer::new(device, "planet_uniform");

        let shader_dir = config.shader_dir.as_deref();
        // Every mesh shares the position/normal/texcoord layout
        let vertex_layouts = first_mesh.buffer_layouts();
        let planet_pipeline = PlanetPipeline::new(
            device,
            gpu.format(),
            planet_uniform.bind_group_layout(),
            &vertex_layouts,
            shader_dir,
        )?;
        let atmosphere_pipeline = AtmospherePipeline::new(
            device,
            gpu.format(),
            atmosphere_uniform.bind_group_layout(),
            &vertex_layouts,
            shader_dir,
        )?;

        let mut ground = Self::load_ground(gpu, config)?;
        ground.set_wrap(device, WrapMode::Repeat);
        ground.set_linear_filtering(device);
        let ground_bind_group = planet_pipeline.create_texture_bind_group(device, &ground);

        let (width, height) = gpu.size();
        let depth = DepthTexture::new(device, width, height);

        log::info!("Renderer ready ({}x{})", width, height);

        Ok(Self {
            meshes,
            depth,
            ground,
            ground_bind_group,
            atmosphere_uniform,
            planet_uniform,
            atmosphere_pipeline,
            planet_pipeline,
        })
    }

    fn load_meshes(device: &wgpu::Device, config: &AppConfig) -> Result<Vec<Mesh>> {
        if let Some(path) = &config.mesh_path {
            match Mesh::from_file(device, path) {
                Ok(meshes) if !meshes.is_empty() => return Ok(meshes),
                Ok(_) => log::warn!("{} has no models, using a UV sphere", path.display()),
                Err(e) => log::warn!("Using a UV sphere: {}", e),
            }
        }
        let data = MeshData::uv_sphere(config.sphere.stacks, config.sphere.slices);
        Ok(vec![Mesh::new(device, &data)?])
    }

    fn load_ground(gpu: &GpuContext, config: &AppConfig) -> Result<Texture2D> {
        if let Some(path) = &config.ground_texture {
            match Texture2D::load(&gpu.device, &gpu.queue, path, true) {
                Ok(texture) => return Ok(texture),
                Err(e) => log::warn!("Using flat ground color: {}", e),
            }
        }
        Texture2D::from_rgba8(&gpu.device, &gpu.queue, &FALLBACK_GROUND, 1, 1, false)
    }

    /// Recreate size-dependent targets
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.depth.resize(device, width, height);
        }
    }

    /// Meshes drawn for both the planet and the atmosphere shell
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn ground(&self) -> &Texture2D {
        &self.ground
    }

    /// Render and present one frame
    pub fn render(
        &mut self,
        gpu: &GpuContext,
        atmosphere: &Atmosphere,
        gui: &mut Gui,
        gui_frame: GuiFrame,
    ) -> Result<()> {
        let surface_texture = match gpu.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                gpu.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(Error::Gpu(e.to_string())),
        };
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let render_ground = atmosphere.is_render_ground();
        self.atmosphere_uniform.write(&gpu.queue, &atmosphere.uniform());
        if render_ground {
            self.planet_uniform.write(&gpu.queue, &atmosphere.planet_uniform());
        }

        let mut encoder = gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.depth.view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if render_ground {
                self.planet_pipeline.bind(
                    &mut pass,
                    self.planet_uniform.bind_group(),
                    &self.ground_bind_group,
                );
                for mesh in &self.meshes {
                    mesh.draw(&mut pass);
                }
            }

            self.atmosphere_pipeline
                .bind(&mut pass, self.atmosphere_uniform.bind_group());
            for mesh in &self.meshes {
                mesh.draw(&mut pass);
            }
        }

        gui.paint(&gpu.device, &gpu.queue, &mut encoder, &view, gui_frame);

        gpu.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();

        Ok(())
    }
}

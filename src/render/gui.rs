//! egui integration: winit input in, wgpu paint jobs out

use egui::{ClippedPrimitive, TexturesDelta, ViewportId};
use egui_wgpu::ScreenDescriptor;
use winit::{event::WindowEvent, window::Window};

/// Tessellated output of one GUI pass, ready to paint
pub struct GuiFrame {
    paint_jobs: Vec<ClippedPrimitive>,
    textures_delta: TexturesDelta,
    screen: ScreenDescriptor,
}

impl GuiFrame {
    pub fn is_empty(&self) -> bool {
        self.paint_jobs.is_empty() && self.textures_delta.is_empty()
    }
}

/// egui state bound to one window and one surface format
pub struct Gui {
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

impl Gui {
    pub fn new(window: &Window, device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let context = egui::Context::default();
        let state = egui_winit::State::new(
            context,
            ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            Some(winit::window::Theme::Dark),
            None,
        );
        // Drawn in its own pass without a depth attachment
        let renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self { state, renderer }
    }

    /// Feed a window event; returns true when egui consumed it
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    pub fn context(&self) -> &egui::Context {
        self.state.egui_ctx()
    }

    /// True while the pointer is over a GUI window or dragging a widget
    pub fn wants_pointer(&self) -> bool {
        self.context().wants_pointer_input()
    }

    /// Run one GUI pass and tessellate its output
    pub fn run(&mut self, window: &Window, run_ui: impl FnMut(&egui::Context)) -> GuiFrame {
        let input = self.state.take_egui_input(window);
        let context = self.state.egui_ctx().clone();
        let output = context.run(input, run_ui);

        self.state.handle_platform_output(window, output.platform_output);

        let paint_jobs = context.tessellate(output.shapes, output.pixels_per_point);
        let size = window.inner_size();

        GuiFrame {
            paint_jobs,
            textures_delta: output.textures_delta,
            screen: ScreenDescriptor {
                size_in_pixels: [size.width, size.height],
                pixels_per_point: output.pixels_per_point,
            },
        }
    }

    /// Draw the frame on top of `target`, keeping what is already there
    pub fn paint(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        frame: GuiFrame,
    ) {
        for (id, delta) in &frame.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, delta);
        }

        let user_buffers = self.renderer.update_buffers(
            device,
            queue,
            encoder,
            &frame.paint_jobs,
            &frame.screen,
        );
        if !user_buffers.is_empty() {
            queue.submit(user_buffers);
        }

        {
            let pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("gui_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.renderer
                .render(&mut pass.forget_lifetime(), &frame.paint_jobs, &frame.screen);
        }

        for id in &frame.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}

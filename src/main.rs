//! Atmoscatter - interactive atmospheric scattering viewer

use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use atmoscatter::app::{Application, SceneStats};
use atmoscatter::core::{
    config::AppConfig,
    error::Error,
    input::{AppMode, KeyAction},
    logging,
    time::FrameTimer,
};
use atmoscatter::render::{
    window::{self, WindowConfig},
    GpuContext, Gui, Renderer,
};
use atmoscatter::ui::ControlPanel;

/// Everything that needs a live window and device
struct RenderState {
    window: Arc<Window>,
    gpu: GpuContext,
    renderer: Renderer,
    gui: Gui,
}

impl RenderState {
    fn new(event_loop: &ActiveEventLoop, config: &AppConfig) -> Result<Self, Error> {
        let window_config = WindowConfig::from(config.window.clone());
        let window = event_loop
            .create_window(window_config.attributes())
            .map_err(|e| Error::Window(format!("Failed to create window: {}", e)))?;
        let window = Arc::new(window);

        let gpu = pollster::block_on(GpuContext::new(window.clone(), config.vsync))?;
        let renderer = Renderer::new(&gpu, config)?;
        let gui = Gui::new(&window, &gpu.device, gpu.format());

        let size = window.inner_size();
        log::info!("Window created: {}x{}", size.width, size.height);

        Ok(Self {
            window,
            gpu,
            renderer,
            gui,
        })
    }
}

struct App {
    config: AppConfig,
    app: Application,
    panel: ControlPanel,
    timer: FrameTimer,
    render: Option<RenderState>,
}

impl App {
    fn new(config: AppConfig) -> Self {
        let aspect = WindowConfig::from(config.window.clone()).aspect();
        let app = Application::new(&config, aspect);
        Self {
            config,
            app,
            panel: ControlPanel::new(),
            timer: FrameTimer::new(),
            render: None,
        }
    }

    fn redraw(&mut self) {
        let Self {
            app,
            panel,
            timer,
            render,
            ..
        } = self;
        let Some(state) = render else {
            return;
        };

        timer.tick();
        app.update(timer.delta_secs());

        if let Some(mode) = app.take_mode_change() {
            window::set_cursor_captured(&state.window, mode == AppMode::Freefly);
        }
        if let Some(vsync) = app.take_vsync_change() {
            state.gpu.set_vsync(vsync);
        }

        let gui_frame = state
            .gui
            .run(&state.window, |ctx| panel.show(ctx, app, timer));

        if let Err(e) = state
            .renderer
            .render(&state.gpu, app.atmosphere(), &mut state.gui, gui_frame)
        {
            log::error!("Render failed: {}", e);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.render.is_some() {
            return;
        }

        match RenderState::new(event_loop, &self.config) {
            Ok(state) => {
                let size = state.window.inner_size();
                self.app.on_resize(size.width, size.height);

                let stats = state
                    .renderer
                    .meshes()
                    .iter()
                    .map(|mesh| SceneStats {
                        vertices: mesh.vertices(),
                        indices: mesh.indices(),
                    })
                    .sum();
                self.app.set_stats(stats);
                self.render = Some(state);
            }
            Err(e) => {
                log::error!("Initialization failed: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(state) = &mut self.render else {
            return;
        };

        // The GUI sees every event first; it only swallows input while in modify mode
        let consumed = state.gui.on_window_event(&state.window, &event)
            && self.app.mode() == AppMode::Modify;

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Window close requested");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if size.width > 0 && size.height > 0 {
                    state.gpu.resize(size.width, size.height);
                    state.renderer.resize(&state.gpu.device, size.width, size.height);
                    self.app.on_resize(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } if !consumed => {
                if let (PhysicalKey::Code(code), Some(action)) = (
                    event.physical_key,
                    KeyAction::from_state(event.state, event.repeat),
                ) {
                    self.app.on_key(code, action);
                }
            }
            WindowEvent::MouseInput { state: button_state, button, .. } => {
                // Releases always get through so free-fly cannot get stuck
                let pressed = button_state.is_pressed();
                if !(pressed && consumed) {
                    self.app.on_mouse_button(button, pressed);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
                if let Some(state) = &self.render {
                    state.window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.app.on_mouse_motion(delta.0 as f32, delta.1 as f32);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.render {
            state.window.request_redraw();
        }
    }
}

fn main() {
    logging::init();
    log::info!("Atmoscatter starting...");

    let config_path = AppConfig::path_from_args(std::env::args());
    let config = match AppConfig::load_or_default(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let mut app = App::new(config);
    if let Err(e) = window::run(&mut app) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

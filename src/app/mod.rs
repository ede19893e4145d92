//! Application state: camera, atmosphere and the input mode state machine
//!
//! Nothing here touches the GPU; the binary feeds winit events in and reads
//! the atmosphere back out for rendering.

use std::path::{Path, PathBuf};

use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use crate::atmosphere::Atmosphere;
use crate::core::camera::{Camera, DEFAULT_FOV_DEG, DEFAULT_YAW_DEG};
use crate::core::camera_controller::FreeflyController;
use crate::core::config::AppConfig;
use crate::core::error::Error;
use crate::core::input::{AppMode, Command, KeyAction, KeyBindings};
use crate::core::types::{Result, Vec3};

/// Pitch of the "On Ground" camera preset, in degrees
pub const GROUND_PRESET_PITCH: f32 = 20.0;
/// Pitch of the "Above Atmosphere" camera preset, in degrees
pub const ABOVE_ATMOSPHERE_PRESET_PITCH: f32 = -10.0;
/// Distance of the camera presets from the planet axis along +Z
const PRESET_OFFSET_Z: f32 = 30.0;

/// Geometry totals shown in the metrics window
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SceneStats {
    pub vertices: u32,
    pub indices: u32,
}

impl SceneStats {
    pub fn triangles(&self) -> u32 {
        self.indices / 3
    }
}

impl std::ops::Add for SceneStats {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            vertices: self.vertices + other.vertices,
            indices: self.indices + other.indices,
        }
    }
}

impl std::iter::Sum for SceneStats {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |total, stats| total + stats)
    }
}

pub struct Application {
    mode: AppMode,
    /// Set when `mode` changed since the last `take_mode_change`
    mode_changed: bool,
    camera: Camera,
    controller: FreeflyController,
    bindings: KeyBindings,
    atmosphere: Atmosphere,
    stats: SceneStats,
    vsync: bool,
    applied_vsync: bool,
    preset_path: Option<PathBuf>,
}

impl Application {
    pub fn new(config: &AppConfig, aspect: f32) -> Self {
        let atmosphere = Atmosphere::new(config.atmosphere.clone());
        let camera = Camera::new(aspect, ground_position(&atmosphere));

        log::info!(
            "Application created: R_e = {} km, R_a = {} km",
            atmosphere.planet_radius(),
            atmosphere.atmosphere_radius()
        );

        let mut app = Self {
            mode: AppMode::Modify,
            mode_changed: false,
            camera,
            controller: FreeflyController::default(),
            bindings: KeyBindings::default(),
            atmosphere,
            stats: SceneStats::default(),
            vsync: config.vsync,
            applied_vsync: config.vsync,
            preset_path: config.preset_path.clone(),
        };
        app.sync_atmosphere_view();
        app
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Run every command bound to `key`/`action` in the current mode
    pub fn on_key(&mut self, key: KeyCode, action: KeyAction) {
        let commands = self.bindings.lookup(key, action, self.mode).to_vec();
        for command in commands {
            self.execute(command);
        }
    }

    pub fn execute(&mut self, command: Command) {
        match command {
            Command::EnterFreefly => self.set_mode(AppMode::Freefly),
            Command::EnterModify => self.set_mode(AppMode::Modify),
            Command::ResetCamera => self.controller.reset(),
            Command::Move(movement, pressed) => self.controller.set_movement(movement, pressed),
        }
    }

    /// Holding the right button flies the camera
    pub fn on_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if button != MouseButton::Right {
            return;
        }
        if pressed {
            self.set_mode(AppMode::Freefly);
        } else {
            self.set_mode(AppMode::Modify);
        }
    }

    /// Raw mouse motion; only looks around while flying
    pub fn on_mouse_motion(&mut self, dx: f32, dy: f32) {
        if self.mode == AppMode::Freefly {
            self.controller.on_mouse_motion(&mut self.camera, dx, dy);
        }
    }

    pub fn on_resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.camera.set_aspect(width as f32, height as f32);
        }
    }

    pub fn mode(&self) -> AppMode {
        self.mode
    }

    /// Switch modes; leaving free-fly clears any held movement keys
    pub fn set_mode(&mut self, mode: AppMode) {
        if mode == AppMode::Modify {
            self.controller.reset();
        }
        if mode != self.mode {
            log::debug!("Mode: {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
            self.mode_changed = true;
        }
    }

    /// The new mode if it changed since the last call
    pub fn take_mode_change(&mut self) -> Option<AppMode> {
        std::mem::take(&mut self.mode_changed).then_some(self.mode)
    }

    // -----------------------------------------------------------------------
    // Frame update
    // -----------------------------------------------------------------------

    pub fn update(&mut self, dt: f32) {
        self.controller.update(&mut self.camera, dt);
        self.atmosphere.update(dt);
        self.sync_atmosphere_view();
    }

    fn sync_atmosphere_view(&mut self) {
        self.atmosphere.set_view(
            self.camera.projection_matrix(),
            self.camera.view_matrix(),
            self.camera.position(),
        );
    }

    // -----------------------------------------------------------------------
    // Camera
    // -----------------------------------------------------------------------

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn controller(&self) -> &FreeflyController {
        &self.controller
    }

    /// Just below the surface, looking slightly up
    pub fn camera_preset_on_ground(&mut self) {
        self.apply_camera_preset(ground_position(&self.atmosphere), GROUND_PRESET_PITCH);
    }

    /// On top of the atmosphere shell, looking slightly down
    pub fn camera_preset_above_atmosphere(&mut self) {
        let position = Vec3::new(0.0, self.atmosphere.atmosphere_radius(), PRESET_OFFSET_Z);
        self.apply_camera_preset(position, ABOVE_ATMOSPHERE_PRESET_PITCH);
    }

    fn apply_camera_preset(&mut self, position: Vec3, pitch: f32) {
        self.camera.set_position(position);
        self.camera.set_pitch(pitch);
        self.camera.set_yaw(DEFAULT_YAW_DEG);
        self.camera.set_field_of_view(DEFAULT_FOV_DEG.to_radians());
        self.sync_atmosphere_view();
    }

    // -----------------------------------------------------------------------
    // Atmosphere and presets
    // -----------------------------------------------------------------------

    pub fn atmosphere(&self) -> &Atmosphere {
        &self.atmosphere
    }

    pub fn atmosphere_mut(&mut self) -> &mut Atmosphere {
        &mut self.atmosphere
    }

    pub fn preset_path(&self) -> Option<&Path> {
        self.preset_path.as_deref()
    }

    pub fn set_preset_path(&mut self, path: Option<PathBuf>) {
        self.preset_path = path;
    }

    pub fn save_preset(&self) -> Result<()> {
        let path = self.require_preset_path()?;
        self.atmosphere.save(path)
    }

    pub fn load_preset(&mut self) -> Result<()> {
        let path = self.require_preset_path()?.to_path_buf();
        self.atmosphere.load(&path)
    }

    fn require_preset_path(&self) -> Result<&Path> {
        self.preset_path
            .as_deref()
            .ok_or_else(|| Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no preset path configured",
            )))
    }

    // -----------------------------------------------------------------------
    // Settings and stats
    // -----------------------------------------------------------------------

    pub fn vsync(&self) -> bool {
        self.vsync
    }

    pub fn set_vsync(&mut self, enabled: bool) {
        self.vsync = enabled;
    }

    /// The vsync value to apply if it differs from what the surface uses
    pub fn take_vsync_change(&mut self) -> Option<bool> {
        if self.vsync != self.applied_vsync {
            self.applied_vsync = self.vsync;
            Some(self.vsync)
        } else {
            None
        }
    }

    pub fn stats(&self) -> SceneStats {
        self.stats
    }

    pub fn set_stats(&mut self, stats: SceneStats) {
        self.stats = stats;
    }
}

/// Camera start: one unit below the planet surface, offset along +Z
fn ground_position(atmosphere: &Atmosphere) -> Vec3 {
    Vec3::new(0.0, atmosphere.planet_radius() - 1.0, PRESET_OFFSET_Z)
}

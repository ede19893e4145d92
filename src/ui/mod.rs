//! egui control panels
//!
//! Sliders write straight into the application; buttons are collected as
//! [`UiAction`]s and applied once the panel has been laid out.

use egui::{CollapsingHeader, DragValue, Slider, SliderClamping, Ui};

use crate::app::Application;
use crate::core::camera::{MAX_PITCH_DEG, MAX_YAW_DEG, MIN_PITCH_DEG};
use crate::core::input::AppMode;
use crate::core::time::FrameTimer;
use crate::core::types::Vec3;
use crate::atmosphere::config::{MAX_SAMPLES, MIN_SAMPLES};

pub const CONTROLS_TITLE: &str = "Application Controls";
pub const METRICS_TITLE: &str = "Application Metrics";

/// Metrics window opacity while flying
const FREEFLY_METRICS_OPACITY: f32 = 0.35;
/// Upper bound of the radius sliders, in km
const MAX_RADIUS: f32 = 10000.0;

/// Button press from the control panel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiAction {
    CameraPresetOnGround,
    CameraPresetAboveAtmosphere,
    SunDefaults,
    RayleighDefaults,
    MieDefaults,
    AllDefaults,
    SizeDefaults,
    SavePreset,
    LoadPreset,
}

/// Whether the controls window is drawn in `mode`
pub fn controls_visible(mode: AppMode) -> bool {
    mode == AppMode::Modify
}

/// Both GUI windows plus the last preset status line
#[derive(Debug, Default)]
pub struct ControlPanel {
    status: Option<String>,
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Result of the last preset save/load
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn show(&mut self, ctx: &egui::Context, app: &mut Application, timer: &FrameTimer) {
        let mut actions = Vec::new();

        if controls_visible(app.mode()) {
            egui::Window::new(CONTROLS_TITLE)
                .default_width(360.0)
                .show(ctx, |ui| {
                    self.controls(ui, app, &mut actions);
                });
        }

        metrics_window(ctx, app, timer);

        for action in actions {
            self.apply(app, action);
        }
    }

    pub fn apply(&mut self, app: &mut Application, action: UiAction) {
        match action {
            UiAction::CameraPresetOnGround => app.camera_preset_on_ground(),
            UiAction::CameraPresetAboveAtmosphere => app.camera_preset_above_atmosphere(),
            UiAction::SunDefaults => app.atmosphere_mut().set_sun_defaults(),
            UiAction::RayleighDefaults => app.atmosphere_mut().set_rayleigh_defaults(),
            UiAction::MieDefaults => app.atmosphere_mut().set_mie_defaults(),
            UiAction::AllDefaults => app.atmosphere_mut().set_defaults(),
            UiAction::SizeDefaults => app.atmosphere_mut().set_size_defaults(),
            UiAction::SavePreset => {
                self.status = Some(match app.save_preset() {
                    Ok(()) => "Preset saved".to_string(),
                    Err(e) => {
                        log::warn!("Saving preset failed: {}", e);
                        format!("Save failed: {e}")
                    }
                });
            }
            UiAction::LoadPreset => {
                self.status = Some(match app.load_preset() {
                    Ok(()) => "Preset loaded".to_string(),
                    Err(e) => {
                        log::warn!("Loading preset failed: {}", e);
                        format!("Load failed: {e}")
                    }
                });
            }
        }
    }

    fn controls(&self, ui: &mut Ui, app: &mut Application, actions: &mut Vec<UiAction>) {
        CollapsingHeader::new("Configuration").show(ui, |ui| {
            let mut vsync = app.vsync();
            if ui.checkbox(&mut vsync, "Vertical sync").changed() {
                app.set_vsync(vsync);
            }
        });

        CollapsingHeader::new("Camera Settings").show(ui, |ui| {
            camera_settings(ui, app, actions);
        });

        CollapsingHeader::new("Atmosphere Controls")
            .default_open(true)
            .show(ui, |ui| {
                CollapsingHeader::new("Optical coefficients")
                    .default_open(true)
                    .show(ui, |ui| optical_coefficients(ui, app, actions));

                ui.separator();
                CollapsingHeader::new("Render options (Dangerous)")
                    .show(ui, |ui| render_options(ui, app, actions));
            });

        CollapsingHeader::new("Presets").show(ui, |ui| {
            match app.preset_path() {
                Some(path) => ui.label(format!("File: {}", path.display())),
                None => ui.weak("No preset file configured"),
            };
            ui.horizontal(|ui| {
                if ui.button("Save").clicked() {
                    actions.push(UiAction::SavePreset);
                }
                if ui.button("Load").clicked() {
                    actions.push(UiAction::LoadPreset);
                }
            });
            if let Some(status) = &self.status {
                ui.label(status);
            }
        });
    }
}

fn help_marker(ui: &mut Ui, text: &str) {
    ui.weak("(?)").on_hover_text(text);
}

fn vec3_drag(ui: &mut Ui, label: &str, value: &mut Vec3, speed: f64) -> bool {
    ui.horizontal(|ui| {
        let mut changed = false;
        for component in [&mut value.x, &mut value.y, &mut value.z] {
            changed |= ui.add(DragValue::new(component).speed(speed)).changed();
        }
        ui.label(label);
        changed
    })
    .inner
}

fn camera_settings(ui: &mut Ui, app: &mut Application, actions: &mut Vec<UiAction>) {
    let camera = app.camera_mut();

    let mut position = camera.position();
    if vec3_drag(ui, "Position", &mut position, 0.1) {
        camera.set_position(position);
    }

    let mut pitch = camera.pitch();
    if ui
        .add(Slider::new(&mut pitch, MIN_PITCH_DEG..=MAX_PITCH_DEG).text("Pitch angle").suffix(" deg"))
        .changed()
    {
        camera.set_pitch(pitch);
    }

    let mut yaw = camera.yaw();
    if ui
        .add(Slider::new(&mut yaw, 0.0..=MAX_YAW_DEG).text("Yaw angle").suffix(" deg"))
        .changed()
    {
        camera.set_yaw(yaw);
    }

    let mut fov = camera.field_of_view().to_degrees();
    if ui
        .add(Slider::new(&mut fov, 0.0..=180.0).text("Field of view").suffix("°"))
        .changed()
    {
        camera.set_field_of_view(fov.to_radians());
    }

    let mut near = camera.near_plane();
    if ui.add(Slider::new(&mut near, 0.0..=10.0).text("Near plane")).changed() {
        camera.set_near_plane(near);
    }

    let mut far = camera.far_plane();
    if ui.add(Slider::new(&mut far, 100.0..=3000.0).text("Far plane")).changed() {
        camera.set_far_plane(far);
    }

    ui.label("Position Presets");
    ui.separator();
    ui.horizontal(|ui| {
        if ui.button("On Ground").clicked() {
            actions.push(UiAction::CameraPresetOnGround);
        }
        if ui.button("Above Atmosphere").clicked() {
            actions.push(UiAction::CameraPresetAboveAtmosphere);
        }
    });
}

fn optical_coefficients(ui: &mut Ui, app: &mut Application, actions: &mut Vec<UiAction>) {
    let atmosphere = app.atmosphere_mut();
    let shell = (atmosphere.atmosphere_radius() - atmosphere.planet_radius()).max(1.0);

    ui.separator();
    ui.horizontal(|ui| {
        ui.label("Sun properties");
        if ui.button("Defaults").clicked() {
            actions.push(UiAction::SunDefaults);
        }
    });

    let mut intensity = atmosphere.sun_intensity();
    if ui
        .add(Slider::new(&mut intensity, 0.01..=100.0).text("Sun Intensity"))
        .changed()
    {
        atmosphere.set_sun_intensity(intensity);
    }

    // The animated angle runs past the slider range; only clamp user edits
    let mut angle = atmosphere.sun_angle().to_degrees();
    if ui
        .add(
            Slider::new(&mut angle, -10.0..=190.0)
                .text("Sun Angle")
                .suffix("°")
                .clamping(SliderClamping::Edits),
        )
        .changed()
    {
        atmosphere.set_animate_sun(false);
        atmosphere.set_sun_angle(angle.to_radians());
    }

    let mut animate = atmosphere.is_animate_sun();
    if ui.checkbox(&mut animate, "Animate").changed() {
        atmosphere.set_animate_sun(animate);
    }

    ui.separator();
    ui.horizontal(|ui| {
        ui.label("Rayleigh Scattering");
        help_marker(ui, "Simulates scattering on small particles of air.");
        if ui.button("Defaults").clicked() {
            actions.push(UiAction::RayleighDefaults);
        }
    });

    let mut beta_r = atmosphere.rayleigh_coefficient();
    let changed = ui
        .horizontal(|ui| {
            let mut changed = false;
            for component in [&mut beta_r.x, &mut beta_r.y, &mut beta_r.z] {
                changed |= ui
                    .add(
                        DragValue::new(component)
                            .speed(1e-4)
                            .range(0.0..=1.0)
                            .fixed_decimals(4),
                    )
                    .changed();
            }
            ui.label("Coefficient");
            help_marker(
                ui,
                "Scattering coefficient for the red, green and blue wavelengths.\n\
                 The lower the value, the less that color is scattered out, in [km^-1]",
            );
            changed
        })
        .inner;
    if changed {
        atmosphere.set_rayleigh_coefficient(beta_r);
    }

    let mut h_r = atmosphere.rayleigh_scale_height();
    let response = ui.horizontal(|ui| {
        let changed = ui
            .add(Slider::new(&mut h_r, 1.0..=shell).text("Scale height").clamping(SliderClamping::Edits))
            .changed();
        help_marker(ui, "Altitude over which the density decreases by a factor of e, in [km]");
        changed
    });
    if response.inner {
        atmosphere.set_rayleigh_scale_height(h_r);
    }

    ui.separator();
    ui.horizontal(|ui| {
        ui.label("Mie Scattering");
        help_marker(ui, "Simulates scattering on aerosols, i.e. larger particles of air.");
        if ui.button("Defaults").clicked() {
            actions.push(UiAction::MieDefaults);
        }
    });

    let mut beta_m = atmosphere.mie_coefficient();
    if ui
        .add(Slider::new(&mut beta_m, 1e-3..=1.0).text("Coefficient"))
        .on_hover_text("The higher the value, the foggier it gets, in [km^-1]")
        .changed()
    {
        atmosphere.set_mie_coefficient(beta_m);
    }

    let mut h_m = atmosphere.mie_scale_height();
    if ui
        .add(Slider::new(&mut h_m, 1.0..=shell).text("Scale height").clamping(SliderClamping::Edits))
        .on_hover_text("Altitude over which the density decreases by a factor of e, in [km]")
        .changed()
    {
        atmosphere.set_mie_scale_height(h_m);
    }

    let mut g = atmosphere.mie_anisotropy();
    if ui
        .add(Slider::new(&mut g, 0.01..=1.0).text("Anisotropy"))
        .on_hover_text("Higher values scatter more light forward")
        .changed()
    {
        atmosphere.set_mie_anisotropy(g);
    }

    ui.separator();
    if ui.button("All to Defaults").clicked() {
        actions.push(UiAction::AllDefaults);
    }
}

fn render_options(ui: &mut Ui, app: &mut Application, actions: &mut Vec<UiAction>) {
    let atmosphere = app.atmosphere_mut();

    ui.label("Quality options");

    let mut sun_dir = atmosphere.sun_dir();
    if vec3_drag(ui, "Sun Direction", &mut sun_dir, 0.1) {
        atmosphere.set_animate_sun(false);
        atmosphere.set_sun_dir(sun_dir);
    }

    let mut view_samples = atmosphere.view_samples();
    if ui
        .add(Slider::new(&mut view_samples, MIN_SAMPLES..=MAX_SAMPLES).text("View Samples"))
        .changed()
    {
        atmosphere.set_view_samples(view_samples);
    }

    let mut light_samples = atmosphere.light_samples();
    if ui
        .add(Slider::new(&mut light_samples, MIN_SAMPLES..=MAX_SAMPLES).text("Light Samples"))
        .changed()
    {
        atmosphere.set_light_samples(light_samples);
    }

    let mut tone_mapping = atmosphere.is_tone_mapping();
    if ui.checkbox(&mut tone_mapping, "Tone mapping").changed() {
        atmosphere.set_tone_mapping(tone_mapping);
    }

    ui.separator();
    ui.horizontal(|ui| {
        ui.label("Planet properties [km]");
        if ui.button("Defaults").clicked() {
            actions.push(UiAction::SizeDefaults);
        }
    });

    let mut r_e = atmosphere.planet_radius();
    if ui
        .add(Slider::new(&mut r_e, 1.0..=MAX_RADIUS).text("Earth radius"))
        .changed()
    {
        atmosphere.set_planet_radius(r_e);
    }

    let mut r_a = atmosphere.atmosphere_radius();
    let r_e = atmosphere.planet_radius();
    if ui
        .add(Slider::new(&mut r_a, r_e..=MAX_RADIUS.max(r_e)).text("Atmosphere radius"))
        .changed()
    {
        atmosphere.set_atmosphere_radius(r_a);
    }

    let mut render_ground = atmosphere.is_render_ground();
    if ui.checkbox(&mut render_ground, "Render Ground").changed() {
        atmosphere.set_render_ground(render_ground);
    }
}

fn metrics_window(ctx: &egui::Context, app: &Application, timer: &FrameTimer) {
    let mut frame = egui::Frame::window(&ctx.style());
    if app.mode() == AppMode::Freefly {
        frame = frame.multiply_with_opacity(FREEFLY_METRICS_OPACITY);
    }

    egui::Window::new(METRICS_TITLE)
        .frame(frame)
        .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(format!(
                "Application average {:.3} ms/frame ({:.1} FPS)",
                timer.frame_time_ms(),
                timer.fps()
            ));
            let stats = app.stats();
            ui.label(format!(
                "{} vertices, {} indices ({} triangles)",
                stats.vertices,
                stats.indices,
                stats.triangles()
            ));
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AppConfig;

    fn app() -> Application {
        Application::new(&AppConfig::default(), 1.0)
    }

    fn run_frame(panel: &mut ControlPanel, app: &mut Application) {
        let ctx = egui::Context::default();
        let timer = FrameTimer::new();
        let _ = ctx.run(egui::RawInput::default(), |ctx| panel.show(ctx, app, &timer));
    }

    #[test]
    fn test_controls_only_in_modify() {
        assert!(controls_visible(AppMode::Modify));
        assert!(!controls_visible(AppMode::Freefly));
    }

    #[test]
    fn test_panels_render_headless() {
        let mut panel = ControlPanel::new();
        let mut app = app();
        run_frame(&mut panel, &mut app);

        app.set_mode(AppMode::Freefly);
        run_frame(&mut panel, &mut app);
        assert!(panel.status().is_none());
    }

    #[test]
    fn test_showing_panels_leaves_state_untouched() {
        let mut panel = ControlPanel::new();
        let mut app = app();
        app.atmosphere_mut().set_animate_sun(true);
        app.atmosphere_mut().set_sun_angle(195f32.to_radians());
        let before = app.atmosphere().config().clone();

        run_frame(&mut panel, &mut app);

        assert_eq!(app.atmosphere().config(), &before);
        assert_eq!(app.vsync(), AppConfig::default().vsync);
    }

    #[test]
    fn test_default_actions() {
        let mut panel = ControlPanel::new();
        let mut app = app();
        let defaults = app.atmosphere().config().clone();

        app.atmosphere_mut().set_mie_anisotropy(0.1);
        app.atmosphere_mut().set_rayleigh_scale_height(2.0);
        panel.apply(&mut app, UiAction::MieDefaults);
        assert_eq!(app.atmosphere().mie_anisotropy(), defaults.mie_anisotropy);
        assert_eq!(app.atmosphere().rayleigh_scale_height(), 2.0);

        panel.apply(&mut app, UiAction::AllDefaults);
        assert_eq!(app.atmosphere().rayleigh_scale_height(), defaults.rayleigh_scale_height);

        app.atmosphere_mut().set_render_ground(true);
        app.atmosphere_mut().set_planet_radius(100.0);
        panel.apply(&mut app, UiAction::SizeDefaults);
        assert_eq!(app.atmosphere().planet_radius(), defaults.planet_radius);
        assert!(!app.atmosphere().is_render_ground());
    }

    #[test]
    fn test_camera_preset_actions() {
        let mut panel = ControlPanel::new();
        let mut app = app();
        panel.apply(&mut app, UiAction::CameraPresetAboveAtmosphere);
        assert_eq!(app.camera().position().y, app.atmosphere().atmosphere_radius());
        panel.apply(&mut app, UiAction::CameraPresetOnGround);
        assert_eq!(app.camera().position().y, app.atmosphere().planet_radius() - 1.0);
    }

    #[test]
    fn test_preset_actions_report_status() {
        let dir = tempfile::tempdir().unwrap();
        let mut panel = ControlPanel::new();
        let mut app = app();
        app.set_preset_path(Some(dir.path().join("sky.json")));

        panel.apply(&mut app, UiAction::LoadPreset);
        assert!(panel.status().is_some_and(|s| s.starts_with("Load failed")));

        panel.apply(&mut app, UiAction::SavePreset);
        assert_eq!(panel.status(), Some("Preset saved"));
        panel.apply(&mut app, UiAction::LoadPreset);
        assert_eq!(panel.status(), Some("Preset loaded"));
    }
}

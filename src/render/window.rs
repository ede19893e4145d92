//! Window management using winit

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event_loop::{ControlFlow, EventLoop},
    window::{CursorGrabMode, Window, WindowAttributes},
};

use crate::core::config::WindowSettings;
use crate::core::error::Error;

/// Window configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowSettings::default().into()
    }
}

impl From<WindowSettings> for WindowConfig {
    fn from(settings: WindowSettings) -> Self {
        Self {
            title: settings.title,
            width: settings.width.max(1),
            height: settings.height.max(1),
        }
    }
}

impl WindowConfig {
    pub fn attributes(&self) -> WindowAttributes {
        WindowAttributes::default()
            .with_title(self.title.clone())
            .with_inner_size(PhysicalSize::new(self.width, self.height))
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Grab and hide the cursor for mouse-look, or release it
pub fn set_cursor_captured(window: &Window, captured: bool) {
    if captured {
        if let Err(e) = window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
        {
            log::warn!("Failed to grab cursor: {}", e);
        }
        window.set_cursor_visible(false);
    } else {
        window.set_cursor_grab(CursorGrabMode::None).ok();
        window.set_cursor_visible(true);
    }
}

/// Creates an event loop and runs the application
pub fn run<A: ApplicationHandler>(app: &mut A) -> Result<(), Error> {
    let event_loop = EventLoop::new()
        .map_err(|e| Error::Window(format!("Failed to create event loop: {}", e)))?;

    event_loop.set_control_flow(ControlFlow::Poll);

    event_loop
        .run_app(app)
        .map_err(|e| Error::Window(format!("Event loop error: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings() {
        let config = WindowConfig::from(WindowSettings {
            title: "Sky".into(),
            width: 800,
            height: 0,
        });
        assert_eq!(config.title, "Sky");
        assert_eq!(config.width, 800);
        assert_eq!(config.height, 1);
    }

    #[test]
    fn test_default_aspect() {
        let config = WindowConfig::default();
        assert!((config.aspect() - 16.0 / 9.0).abs() < 1e-6);
    }
}

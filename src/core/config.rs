//! Application configuration loaded from JSON

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::atmosphere::AtmosphereConfig;
use crate::core::types::Result;

/// Window title and initial size
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Interactive Atmospheric Scattering".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Sphere tessellation shared by the planet and the atmosphere shell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereSettings {
    pub stacks: u32,
    pub slices: u32,
}

impl Default for SphereSettings {
    fn default() -> Self {
        Self {
            stacks: 64,
            slices: 128,
        }
    }
}

/// Top level configuration. Every field is optional in the file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowSettings,
    pub vsync: bool,
    pub sphere: SphereSettings,
    /// OBJ file drawn for the planet and the atmosphere shell; a UV sphere is used when unset
    pub mesh_path: Option<PathBuf>,
    /// Image used for the planet surface; a flat color is used when unset
    pub ground_texture: Option<PathBuf>,
    /// Directory with `draw_mesh.wgsl` / `draw_atmosphere.wgsl` overrides
    pub shader_dir: Option<PathBuf>,
    /// Where the GUI saves and loads atmosphere presets
    pub preset_path: Option<PathBuf>,
    pub atmosphere: AtmosphereConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowSettings::default(),
            vsync: true,
            sphere: SphereSettings::default(),
            mesh_path: None,
            ground_texture: None,
            shader_dir: None,
            preset_path: Some(PathBuf::from("presets/atmosphere.json")),
            atmosphere: AtmosphereConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&json)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Parse `--config <path>` from command line arguments, skipping the program name
    pub fn path_from_args<I>(args: I) -> Option<PathBuf>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter().skip(1);
        while let Some(arg) = args.next() {
            if arg == "--config" {
                return args.next().map(PathBuf::from);
            }
            if let Some(path) = arg.strip_prefix("--config=") {
                return Some(PathBuf::from(path));
            }
        }
        None
    }

    /// Load from `path` if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                log::info!("No configuration file given, using defaults");
                Ok(Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_path_from_args() {
        assert_eq!(
            AppConfig::path_from_args(args(&["atmoscatter", "--config", "a.json"])),
            Some(PathBuf::from("a.json"))
        );
        assert_eq!(
            AppConfig::path_from_args(args(&["atmoscatter", "--config=b.json"])),
            Some(PathBuf::from("b.json"))
        );
        assert_eq!(AppConfig::path_from_args(args(&["atmoscatter"])), None);
        assert_eq!(AppConfig::path_from_args(args(&["atmoscatter", "--config"])), None);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "vsync": false, "window": { "width": 640 }, "atmosphere": { "render_ground": true } }"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert!(!config.vsync);
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.sphere, SphereSettings::default());
        assert_eq!(config.mesh_path, None);
        assert!(config.atmosphere.render_ground);
        assert_eq!(config.atmosphere.planet_radius, 6360.0);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = AppConfig {
            ground_texture: Some(PathBuf::from("textures/earth.png")),
            mesh_path: Some(PathBuf::from("objects/sphere.obj")),
            sphere: SphereSettings { stacks: 8, slices: 16 },
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(AppConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, crate::core::error::Error::Config(_)));
    }

    #[test]
    fn test_load_or_default_without_path() {
        let config = AppConfig::load_or_default(None).unwrap();
        assert_eq!(config, AppConfig::default());
    }
}

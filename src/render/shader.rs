//! WGSL shader modules with validation error reporting

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::core::error::Error;
use crate::core::types::Result;

/// Where the WGSL source of a shader comes from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShaderSource {
    /// Source compiled into the binary
    Embedded {
        label: &'static str,
        source: &'static str,
    },
    /// Source read from disk at startup
    File(PathBuf),
}

impl ShaderSource {
    /// Prefer `<override_dir>/<file_name>` when it exists, else the embedded source
    pub fn resolve(
        override_dir: Option<&Path>,
        file_name: &'static str,
        embedded: &'static str,
    ) -> Self {
        if let Some(dir) = override_dir {
            let path = dir.join(file_name);
            if path.is_file() {
                return Self::File(path);
            }
            log::warn!(
                "Shader override {} not found, using built-in {file_name}",
                path.display()
            );
        }
        Self::Embedded {
            label: file_name,
            source: embedded,
        }
    }
}

/// Compiled shader module
pub struct Shader {
    module: wgpu::ShaderModule,
    label: String,
}

impl Shader {
    /// Compile WGSL source, surfacing validation errors instead of panicking later
    pub fn from_wgsl(device: &wgpu::Device, label: &str, source: &str) -> Result<Self> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(source)),
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            log::error!("Shader '{label}' failed to compile:\n{err}");
            return Err(Error::Shader {
                label: label.to_string(),
                message: err.to_string(),
            });
        }

        log::debug!("Created shader '{label}'");
        Ok(Self {
            module,
            label: label.to_string(),
        })
    }

    /// Read and compile a WGSL file
    pub fn load(device: &wgpu::Device, path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).inspect_err(|e| {
            log::error!("Failed to read shader {}: {e}", path.display());
        })?;
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_wgsl(device, &label, &source)
    }

    pub fn from_source(device: &wgpu::Device, source: &ShaderSource) -> Result<Self> {
        match source {
            ShaderSource::Embedded { label, source } => Self::from_wgsl(device, label, source),
            ShaderSource::File(path) => Self::load(device, path),
        }
    }

    pub fn module(&self) -> &wgpu::ShaderModule {
        &self.module
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

//! Error types for the renderer

use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("Window error: {0}")]
    Window(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Shader '{label}' failed to compile: {message}")]
    Shader { label: String, message: String },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Mesh error: {0}")]
    Mesh(#[from] tobj::LoadError),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid buffer layout: {0}")]
    InvalidLayout(String),

    #[error("Buffer error: {0}")]
    Buffer(String),

    #[error("Texture error: {0}")]
    Texture(String),
}

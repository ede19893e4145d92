//! Rendering system and GPU interfaces

pub mod window;
pub mod context;
pub mod buffer;
pub mod vertex_array;
pub mod shader;
pub mod texture;
pub mod mesh;
pub mod pipeline;
pub mod gui;
pub mod renderer;

pub use context::GpuContext;
pub use gui::{Gui, GuiFrame};
pub use renderer::Renderer;

//! GPU buffer management

pub mod layout;
pub mod vertex_buffer;
pub mod index_buffer;
pub mod uniform_buffer;

pub use layout::{BufferElement, BufferLayout, ElementType};
pub use vertex_buffer::VertexBuffer;
pub use index_buffer::IndexBuffer;
pub use uniform_buffer::UniformBuffer;

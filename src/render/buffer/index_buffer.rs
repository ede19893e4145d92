//! 32-bit index buffer

use wgpu::util::DeviceExt;

/// GPU index buffer of `u32` triangle indices
pub struct IndexBuffer {
    buffer: wgpu::Buffer,
    count: u32,
}

impl IndexBuffer {
    pub fn new(device: &wgpu::Device, indices: &[u32]) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("index_buffer"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            buffer,
            count: indices.len() as u32,
        }
    }

    /// Number of indices
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn format(&self) -> wgpu::IndexFormat {
        wgpu::IndexFormat::Uint32
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

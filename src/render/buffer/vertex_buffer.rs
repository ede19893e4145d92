//! Vertex buffer with an attached layout

use wgpu::util::DeviceExt;

use crate::core::error::Error;
use crate::core::types::Result;
use crate::render::buffer::layout::BufferLayout;

/// GPU vertex buffer
///
/// An immutable buffer keeps its storage for its whole life, but its
/// contents can still be replaced with [`set_data`](Self::set_data).
pub struct VertexBuffer {
    buffer: wgpu::Buffer,
    size: u64,
    immutable: bool,
    /// Whether the buffer still accepts `set_data`
    writable: bool,
    layout: BufferLayout,
}

impl VertexBuffer {
    /// Reserve `size` zeroed bytes, expecting data to be uploaded later
    pub fn new(device: &wgpu::Device, size: u64, immutable: bool) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("vertex_buffer"),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            size,
            immutable,
            writable: true,
            layout: BufferLayout::default(),
        }
    }

    /// Create the buffer and fill it with `data`
    pub fn with_data(device: &wgpu::Device, data: &[u8], immutable: bool) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("vertex_buffer"),
            contents: data,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            buffer,
            size: data.len() as u64,
            immutable,
            writable: true,
            layout: BufferLayout::default(),
        }
    }

    /// Replace `data.len()` bytes starting at `offset`
    pub fn set_data(&self, queue: &wgpu::Queue, data: &[u8], offset: u64) -> Result<()> {
        check_write(self.size, self.writable, offset, data.len() as u64)?;
        queue.write_buffer(&self.buffer, offset, data);
        Ok(())
    }

    /// Replace the storage with a new one holding `data`
    ///
    /// With `updates` set the new buffer keeps accepting [`set_data`](Self::set_data).
    pub fn reallocate(&mut self, device: &wgpu::Device, data: &[u8], updates: bool) -> Result<()> {
        check_reallocate(self.immutable)?;

        let mut usage = wgpu::BufferUsages::VERTEX;
        if updates {
            usage |= wgpu::BufferUsages::COPY_DST;
        }

        self.buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("vertex_buffer"),
            contents: data,
            usage,
        });
        self.size = data.len() as u64;
        self.writable = updates;
        log::debug!("Reallocated vertex buffer to {} bytes", self.size);
        Ok(())
    }

    pub fn set_layout(&mut self, layout: BufferLayout) {
        self.layout = layout;
    }

    /// Builder form of [`set_layout`](Self::set_layout)
    pub fn with_layout(mut self, layout: BufferLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn layout(&self) -> &BufferLayout {
        &self.layout
    }

    /// Size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn is_immutable(&self) -> bool {
        self.immutable
    }

    /// Number of whole vertices stored, based on the layout stride
    pub fn vertex_count(&self) -> u32 {
        match self.layout.stride() {
            0 => 0,
            stride => (self.size / stride as u64) as u32,
        }
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

/// Immutable buffers keep their storage
fn check_reallocate(immutable: bool) -> Result<()> {
    if immutable {
        return Err(Error::Buffer("cannot reallocate an immutable vertex buffer".into()));
    }
    Ok(())
}

/// Validate a `write_buffer` call against the buffer state
fn check_write(size: u64, writable: bool, offset: u64, len: u64) -> Result<()> {
    if !writable {
        return Err(Error::Buffer(
            "buffer was reallocated without updates and is read-only".into(),
        ));
    }
    if offset.checked_add(len).is_none_or(|end| end > size) {
        return Err(Error::Buffer(format!(
            "write of {len} bytes at offset {offset} exceeds buffer size {size}"
        )));
    }
    if offset % wgpu::COPY_BUFFER_ALIGNMENT != 0 || len % wgpu::COPY_BUFFER_ALIGNMENT != 0 {
        return Err(Error::Buffer(format!(
            "offset {offset} and size {len} must be multiples of {}",
            wgpu::COPY_BUFFER_ALIGNMENT
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_in_range() {
        assert!(check_write(64, true, 0, 64).is_ok());
        assert!(check_write(64, true, 16, 48).is_ok());
        assert!(check_write(64, true, 64, 0).is_ok());
    }

    #[test]
    fn test_write_out_of_range() {
        assert!(matches!(check_write(64, true, 16, 52), Err(Error::Buffer(_))));
        assert!(matches!(check_write(64, true, u64::MAX, 4), Err(Error::Buffer(_))));
    }

    #[test]
    fn test_write_to_read_only() {
        assert!(matches!(check_write(64, false, 0, 4), Err(Error::Buffer(_))));
    }

    #[test]
    fn test_reallocate_immutable() {
        assert!(matches!(check_reallocate(true), Err(Error::Buffer(_))));
        assert!(check_reallocate(false).is_ok());
    }

    #[test]
    fn test_write_alignment() {
        assert!(check_write(64, true, 2, 4).is_err());
        assert!(check_write(64, true, 0, 6).is_err());
    }
}

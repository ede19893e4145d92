//! Vertex array: a set of vertex buffers plus an optional index buffer
//!
//! Shader locations are assigned consecutively across all attached buffers,
//! in the order they were added.

use std::sync::Arc;

use crate::core::error::Error;
use crate::core::types::Result;
use crate::render::buffer::{BufferLayout, IndexBuffer, VertexBuffer};

struct VertexSlot {
    buffer: Arc<VertexBuffer>,
    step_mode: wgpu::VertexStepMode,
    attributes: Vec<wgpu::VertexAttribute>,
}

/// Groups the buffers a draw call reads from
#[derive(Default)]
pub struct VertexArray {
    slots: Vec<VertexSlot>,
    index_buffer: Option<Arc<IndexBuffer>>,
    next_location: u32,
}

impl VertexArray {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a vertex buffer; its layout must already be set
    pub fn add_vertex_buffer(&mut self, buffer: Arc<VertexBuffer>, instanced: bool) -> Result<()> {
        let (attributes, next_location) = assign_locations(buffer.layout(), self.next_location)?;
        self.next_location = next_location;

        let step_mode = if instanced {
            wgpu::VertexStepMode::Instance
        } else {
            wgpu::VertexStepMode::Vertex
        };

        self.slots.push(VertexSlot {
            buffer,
            step_mode,
            attributes,
        });
        Ok(())
    }

    pub fn set_index_buffer(&mut self, buffer: Arc<IndexBuffer>) {
        self.index_buffer = Some(buffer);
    }

    pub fn index_buffer(&self) -> Option<&Arc<IndexBuffer>> {
        self.index_buffer.as_ref()
    }

    pub fn has_vertex_buffers(&self) -> bool {
        !self.slots.is_empty()
    }

    pub fn total_buffers(&self) -> usize {
        self.slots.len()
    }

    pub fn buffers(&self) -> impl Iterator<Item = &Arc<VertexBuffer>> {
        self.slots.iter().map(|slot| &slot.buffer)
    }

    /// Drop all vertex buffers and restart location numbering
    pub fn clear_buffers(&mut self) {
        self.slots.clear();
        self.next_location = 0;
    }

    pub fn clear_index(&mut self) {
        self.index_buffer = None;
    }

    pub fn clear(&mut self) {
        self.clear_buffers();
        self.clear_index();
    }

    /// Layouts for `wgpu::VertexState::buffers`
    pub fn buffer_layouts(&self) -> Vec<wgpu::VertexBufferLayout<'_>> {
        self.slots
            .iter()
            .map(|slot| wgpu::VertexBufferLayout {
                array_stride: slot.buffer.layout().stride() as wgpu::BufferAddress,
                step_mode: slot.step_mode,
                attributes: &slot.attributes,
            })
            .collect()
    }

    /// Bind every vertex buffer (slot = insertion order) and the index buffer
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        for (slot_index, slot) in self.slots.iter().enumerate() {
            pass.set_vertex_buffer(slot_index as u32, slot.buffer.buffer().slice(..));
        }
        if let Some(index_buffer) = &self.index_buffer {
            pass.set_index_buffer(index_buffer.buffer().slice(..), index_buffer.format());
        }
    }
}

/// Attributes for `layout` starting at `first_location`, plus the next free location
fn assign_locations(
    layout: &BufferLayout,
    first_location: u32,
) -> Result<(Vec<wgpu::VertexAttribute>, u32)> {
    if layout.is_empty() {
        return Err(Error::InvalidLayout("vertex buffer has no buffer elements".into()));
    }
    let attributes = layout.attributes(first_location)?;
    Ok((attributes, first_location + layout.location_count()))
}

//! Vertex buffer layout description
//!
//! A [`BufferLayout`] lists the elements stored in one vertex buffer and
//! computes their byte offsets and the stride. It is converted into
//! `wgpu::VertexAttribute`s when the buffer is attached to a vertex array.

use crate::core::error::Error;
use crate::core::types::Result;

/// Alignment applied to unpacked layouts
const ALIGNMENT: u32 = 4;

/// Data type of a single buffer element
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementType {
    Bool,
    Float,
    Float2,
    Float3,
    Float4,
    Mat3,
    Mat4,
    Int,
    Int2,
    Int3,
    Int4,
    UInt8,
    UInt8_2,
    UInt8_3,
    UInt,
    UInt2,
    UInt3,
}

impl ElementType {
    /// Size in bytes
    pub const fn size(self) -> u32 {
        match self {
            Self::Bool => 1,
            Self::Float => 4,
            Self::Float2 => 4 * 2,
            Self::Float3 => 4 * 3,
            Self::Float4 => 4 * 4,
            Self::Mat3 => 4 * 3 * 3,
            Self::Mat4 => 4 * 4 * 4,
            Self::Int => 4,
            Self::Int2 => 4 * 2,
            Self::Int3 => 4 * 3,
            Self::Int4 => 4 * 4,
            Self::UInt8 => 1,
            Self::UInt8_2 => 2,
            Self::UInt8_3 => 3,
            Self::UInt => 4,
            Self::UInt2 => 4 * 2,
            Self::UInt3 => 4 * 3,
        }
    }

    /// Number of components; matrices report their column count
    pub const fn component_count(self) -> u32 {
        match self {
            Self::Bool | Self::Float | Self::Int | Self::UInt8 | Self::UInt => 1,
            Self::Float2 | Self::Int2 | Self::UInt8_2 | Self::UInt2 => 2,
            Self::Float3 | Self::Int3 | Self::UInt8_3 | Self::UInt3 | Self::Mat3 => 3,
            Self::Float4 | Self::Int4 | Self::Mat4 => 4,
        }
    }

    /// Shader locations occupied by one element (one per matrix column)
    pub const fn location_count(self) -> u32 {
        match self {
            Self::Mat3 => 3,
            Self::Mat4 => 4,
            _ => 1,
        }
    }

    /// Vertex format of one location
    ///
    /// `normalized` only affects 8-bit integers. Types without a matching
    /// vertex format are rejected.
    pub fn vertex_format(self, normalized: bool) -> Result<wgpu::VertexFormat> {
        use wgpu::VertexFormat as F;
        let format = match self {
            Self::Float => F::Float32,
            Self::Float2 => F::Float32x2,
            Self::Float3 | Self::Mat3 => F::Float32x3,
            Self::Float4 | Self::Mat4 => F::Float32x4,
            Self::Int => F::Sint32,
            Self::Int2 => F::Sint32x2,
            Self::Int3 => F::Sint32x3,
            Self::Int4 => F::Sint32x4,
            Self::UInt => F::Uint32,
            Self::UInt2 => F::Uint32x2,
            Self::UInt3 => F::Uint32x3,
            Self::UInt8_2 if normalized => F::Unorm8x2,
            Self::UInt8_2 => F::Uint8x2,
            Self::Bool | Self::UInt8 | Self::UInt8_3 => {
                return Err(Error::InvalidLayout(format!(
                    "{self:?} has no vertex format, pad it to a wider type"
                )));
            }
        };
        Ok(format)
    }
}

/// One element of a buffer, e.g. a position or a color
#[derive(Clone, Debug, PartialEq)]
pub struct BufferElement {
    pub ty: ElementType,
    /// Description only, e.g. "Position"
    pub name: String,
    pub normalized: bool,
    /// Byte offset; 0 means "place after the previous element"
    pub offset: u32,
}

impl BufferElement {
    pub fn new(ty: ElementType, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: name.into(),
            normalized: false,
            offset: 0,
        }
    }

    pub fn normalized(mut self) -> Self {
        self.normalized = true;
        self
    }

    /// Place the element at a custom byte offset
    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub fn size(&self) -> u32 {
        self.ty.size()
    }
}

/// Elements of a vertex buffer with resolved offsets and stride
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BufferLayout {
    elements: Vec<BufferElement>,
    unpacked: bool,
    stride: u32,
}

impl BufferLayout {
    /// Build a layout. When `unpacked` is set every element starts on a
    /// 4-byte boundary and the stride is padded to match.
    pub fn new(elements: Vec<BufferElement>, unpacked: bool) -> Self {
        let mut layout = Self {
            elements,
            unpacked,
            stride: 0,
        };
        layout.calc_offsets_and_stride();
        layout
    }

    /// Tightly packed layout
    pub fn packed(elements: Vec<BufferElement>) -> Self {
        Self::new(elements, false)
    }

    pub fn elements(&self) -> &[BufferElement] {
        &self.elements
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn is_unpacked(&self) -> bool {
        self.unpacked
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Total shader locations used by this layout
    pub fn location_count(&self) -> u32 {
        self.elements.iter().map(|e| e.ty.location_count()).sum()
    }

    /// Vertex attributes starting at `first_location`
    pub fn attributes(&self, first_location: u32) -> Result<Vec<wgpu::VertexAttribute>> {
        let mut attributes = Vec::with_capacity(self.location_count() as usize);
        let mut location = first_location;

        for element in &self.elements {
            let format = element.ty.vertex_format(element.normalized)?;
            let columns = element.ty.location_count();
            let column_size = element.ty.size() / columns;

            for column in 0..columns {
                attributes.push(wgpu::VertexAttribute {
                    format,
                    offset: (element.offset + column * column_size) as wgpu::BufferAddress,
                    shader_location: location,
                });
                location += 1;
            }
        }

        Ok(attributes)
    }

    fn calc_offsets_and_stride(&mut self) {
        let mut offset = 0;
        self.stride = 0;

        for element in &mut self.elements {
            let size = element.ty.size();

            if element.offset == 0 {
                element.offset = offset;
                offset += size;
                self.stride += size;
            } else {
                offset = element.offset + size;
                self.stride = element.offset + size;
            }

            if self.unpacked {
                offset = offset.next_multiple_of(ALIGNMENT);
                self.stride = self.stride.next_multiple_of(ALIGNMENT);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes() {
        assert_eq!(ElementType::Bool.size(), 1);
        assert_eq!(ElementType::Float3.size(), 12);
        assert_eq!(ElementType::Mat3.size(), 36);
        assert_eq!(ElementType::Mat4.size(), 64);
        assert_eq!(ElementType::UInt8_3.size(), 3);
        assert_eq!(ElementType::UInt.size(), 4);
        assert_eq!(ElementType::UInt3.size(), 12);
        assert_eq!(ElementType::Mat4.component_count(), 4);
    }

    #[test]
    fn test_interleaved_packed() {
        let layout = BufferLayout::packed(vec![
            BufferElement::new(ElementType::Float3, "Position"),
            BufferElement::new(ElementType::Float4, "Color"),
        ]);
        assert_eq!(layout.elements()[0].offset, 0);
        assert_eq!(layout.elements()[1].offset, 12);
        assert_eq!(layout.stride(), 28);
    }

    #[test]
    fn test_packed_keeps_odd_sizes() {
        let layout = BufferLayout::packed(vec![
            BufferElement::new(ElementType::UInt8_3, "Color"),
            BufferElement::new(ElementType::Float, "Weight"),
        ]);
        assert_eq!(layout.elements()[1].offset, 3);
        assert_eq!(layout.stride(), 7);
    }

    #[test]
    fn test_unpacked_aligns_to_four() {
        let layout = BufferLayout::new(
            vec![
                BufferElement::new(ElementType::UInt8_3, "Color"),
                BufferElement::new(ElementType::Float, "Weight"),
            ],
            true,
        );
        assert_eq!(layout.elements()[1].offset, 4);
        assert_eq!(layout.stride(), 8);
    }

    #[test]
    fn test_custom_offset_moves_cursor() {
        // struct { vec3 position; u8x3 color; } with color at offset 12
        let layout = BufferLayout::new(
            vec![
                BufferElement::new(ElementType::Float3, "Position"),
                BufferElement::new(ElementType::UInt8_3, "Color").normalized().with_offset(12),
                BufferElement::new(ElementType::Float, "Extra"),
            ],
            true,
        );
        let elements = layout.elements();
        assert_eq!(elements[1].offset, 12);
        assert_eq!(elements[2].offset, 16);
        assert_eq!(layout.stride(), 20);
    }

    #[test]
    fn test_custom_offset_sets_stride() {
        let layout = BufferLayout::packed(vec![
            BufferElement::new(ElementType::Float2, "Uv").with_offset(32),
        ]);
        assert_eq!(layout.stride(), 40);
    }

    #[test]
    fn test_matrix_attributes_use_one_location_per_column() {
        let layout = BufferLayout::packed(vec![
            BufferElement::new(ElementType::Float3, "Position"),
            BufferElement::new(ElementType::Mat4, "Model"),
        ]);
        assert_eq!(layout.location_count(), 5);

        let attributes = layout.attributes(2).unwrap();
        assert_eq!(attributes.len(), 5);
        assert_eq!(attributes[0].shader_location, 2);
        assert_eq!(attributes[1].shader_location, 3);
        assert_eq!(attributes[1].offset, 12);
        assert_eq!(attributes[4].offset, 12 + 48);
        assert_eq!(attributes[4].format, wgpu::VertexFormat::Float32x4);
    }

    #[test]
    fn test_unsupported_format_is_rejected() {
        let layout = BufferLayout::packed(vec![BufferElement::new(ElementType::Bool, "Flag")]);
        assert!(matches!(layout.attributes(0), Err(Error::InvalidLayout(_))));
    }

    #[test]
    fn test_normalized_bytes() {
        assert_eq!(
            ElementType::UInt8_2.vertex_format(true).unwrap(),
            wgpu::VertexFormat::Unorm8x2
        );
        assert_eq!(
            ElementType::UInt8_2.vertex_format(false).unwrap(),
            wgpu::VertexFormat::Uint8x2
        );
    }
}

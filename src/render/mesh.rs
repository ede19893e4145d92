//! Meshes shared by the planet and the atmosphere shell: a generated UV
//! sphere or the models of an OBJ file

use std::f32::consts::PI;
use std::path::Path;
use std::sync::Arc;

use glam::Vec3;

use crate::core::types::Result;
use crate::render::buffer::{BufferElement, BufferLayout, ElementType, IndexBuffer, VertexBuffer};
use crate::render::vertex_array::VertexArray;

/// Upper bound for sphere stacks and slices; keeps the index count within `u32`
pub const MAX_SPHERE_SEGMENTS: u32 = 4096;

/// CPU-side geometry with one array per attribute
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Unit UV sphere centered at the origin
    ///
    /// `stacks` and `slices` are clamped to `MAX_SPHERE_SEGMENTS`.
    ///
    /// Rings run from the north pole (+Y) to the south pole. Triangles are
    /// wound counter-clockwise when seen from outside, and the degenerate
    /// triangles touching the poles are skipped.
    pub fn uv_sphere(stacks: u32, slices: u32) -> Self {
        let (stacks, slices) = clamp_segments(stacks, slices);
        let vertex_count = ((stacks + 1) * (slices + 1)) as usize;

        let mut data = Self {
            positions: Vec::with_capacity(vertex_count),
            normals: Vec::with_capacity(vertex_count),
            tex_coords: Vec::with_capacity(vertex_count),
            indices: Vec::with_capacity((6 * stacks * slices) as usize),
        };

        for i in 0..=stacks {
            let v = i as f32 / stacks as f32;
            let phi = PI * 0.5 - v * PI;
            let (sin_phi, cos_phi) = phi.sin_cos();

            for j in 0..=slices {
                let u = j as f32 / slices as f32;
                let (sin_theta, cos_theta) = (u * 2.0 * PI).sin_cos();
                let p = [cos_phi * cos_theta, sin_phi, -cos_phi * sin_theta];

                data.positions.push(p);
                data.normals.push(p);
                data.tex_coords.push([u, v]);
            }
        }

        for i in 0..stacks {
            let row = i * (slices + 1);
            let next_row = row + slices + 1;

            for j in 0..slices {
                let (k1, k2) = (row + j, next_row + j);
                if i != 0 {
                    data.indices.extend_from_slice(&[k1, k2, k1 + 1]);
                }
                if i != stacks - 1 {
                    data.indices.extend_from_slice(&[k1 + 1, k2, k2 + 1]);
                }
            }
        }

        data
    }

    /// Load every model of a Wavefront OBJ file, one `MeshData` per model
    ///
    /// Faces are triangulated and attributes re-indexed so positions, normals
    /// and texture coordinates share one index. Missing normals are averaged
    /// from the faces, missing texture coordinates are zero.
    pub fn from_obj(path: &Path) -> Result<Vec<Self>> {
        let options = tobj::LoadOptions {
            single_index: true,
            triangulate: true,
            ignore_points: true,
            ignore_lines: true,
            ..Default::default()
        };
        let (models, _materials) = tobj::load_obj(path, &options)?;

        // Empty models would produce zero-sized vertex buffers
        let meshes: Vec<Self> = models
            .into_iter()
            .filter(|model| !model.mesh.positions.is_empty())
            .map(|model| {
                let mesh = model.mesh;
                let positions: Vec<[f32; 3]> =
                    mesh.positions.chunks_exact(3).map(|p| [p[0], p[1], p[2]]).collect();

                let normals = if mesh.normals.len() == mesh.positions.len() {
                    mesh.normals.chunks_exact(3).map(|n| [n[0], n[1], n[2]]).collect()
                } else {
                    face_normals(&positions, &mesh.indices)
                };

                let tex_coords = if mesh.texcoords.len() / 2 == positions.len() {
                    mesh.texcoords.chunks_exact(2).map(|t| [t[0], t[1]]).collect()
                } else {
                    vec![[0.0; 2]; positions.len()]
                };

                log::debug!(
                    "OBJ model '{}': {} vertices, {} indices",
                    model.name,
                    positions.len(),
                    mesh.indices.len()
                );

                Self {
                    positions,
                    normals,
                    tex_coords,
                    indices: mesh.indices,
                }
            })
            .collect();

        log::info!("Loaded {} model(s) from {}", meshes.len(), path.display());
        Ok(meshes)
    }

    pub fn vertex_count(&self) -> u32 {
        self.positions.len() as u32
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

/// Sphere tessellation limits: at least 2 stacks and 3 slices
fn clamp_segments(stacks: u32, slices: u32) -> (u32, u32) {
    (
        stacks.clamp(2, MAX_SPHERE_SEGMENTS),
        slices.clamp(3, MAX_SPHERE_SEGMENTS),
    )
}

/// Smooth vertex normals averaged from the triangles touching each vertex
fn face_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| i as usize);
        if a.max(b).max(c) >= positions.len() {
            continue;
        }
        let (pa, pb, pc) = (
            Vec3::from(positions[a]),
            Vec3::from(positions[b]),
            Vec3::from(positions[c]),
        );
        let normal = (pb - pa).cross(pc - pa);
        for i in [a, b, c] {
            normals[i] += normal;
        }
    }
    normals
        .into_iter()
        .map(|n| n.normalize_or_zero().to_array())
        .collect()
}

/// GPU mesh: one vertex buffer per attribute and an optional index buffer
pub struct Mesh {
    vertex_array: VertexArray,
    vertices: u32,
    indices: u32,
}

impl Mesh {
    /// Attribute locations: 0 position, 1 normal, 2 texture coordinate
    pub fn new(device: &wgpu::Device, data: &MeshData) -> Result<Self> {
        let mut vertex_array = VertexArray::new();

        let positions = VertexBuffer::with_data(device, bytemuck::cast_slice(&data.positions), true)
            .with_layout(BufferLayout::packed(vec![BufferElement::new(ElementType::Float3, "Position")]));
        vertex_array.add_vertex_buffer(Arc::new(positions), false)?;

        let normals = VertexBuffer::with_data(device, bytemuck::cast_slice(&data.normals), true)
            .with_layout(BufferLayout::packed(vec![BufferElement::new(ElementType::Float3, "Normal")]));
        vertex_array.add_vertex_buffer(Arc::new(normals), false)?;

        let tex_coords = VertexBuffer::with_data(device, bytemuck::cast_slice(&data.tex_coords), true)
            .with_layout(BufferLayout::packed(vec![BufferElement::new(ElementType::Float2, "TexCoord")]));
        vertex_array.add_vertex_buffer(Arc::new(tex_coords), false)?;

        if !data.indices.is_empty() {
            vertex_array.set_index_buffer(Arc::new(IndexBuffer::new(device, &data.indices)));
        }

        log::info!(
            "Created mesh: {} vertices, {} indices",
            data.vertex_count(),
            data.index_count()
        );

        Ok(Self {
            vertex_array,
            vertices: data.vertex_count(),
            indices: data.index_count(),
        })
    }

    /// Upload every model of an OBJ file
    pub fn from_file(device: &wgpu::Device, path: &Path) -> Result<Vec<Self>> {
        MeshData::from_obj(path)?
            .iter()
            .map(|data| Self::new(device, data))
            .collect()
    }

    /// Issue the draw call; the pipeline and bind groups must already be set
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        self.vertex_array.bind(pass);
        match self.vertex_array.index_buffer() {
            Some(index_buffer) => pass.draw_indexed(0..index_buffer.count(), 0, 0..1),
            None => pass.draw(0..self.vertices, 0..1),
        }
    }

    /// Vertex buffer layouts for pipeline creation
    pub fn buffer_layouts(&self) -> Vec<wgpu::VertexBufferLayout<'_>> {
        self.vertex_array.buffer_layouts()
    }

    pub fn vertices(&self) -> u32 {
        self.vertices
    }

    pub fn indices(&self) -> u32 {
        self.indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_counts() {
        let data = MeshData::uv_sphere(8, 16);
        assert_eq!(data.vertex_count(), 9 * 17);
        assert_eq!(data.normals.len(), data.positions.len());
        assert_eq!(data.tex_coords.len(), data.positions.len());
        // Two triangles per quad minus one per pole quad
        assert_eq!(data.index_count(), 6 * 8 * 16 - 6 * 16);
    }

    #[test]
    fn test_sphere_is_unit() {
        let data = MeshData::uv_sphere(6, 12);
        for p in &data.positions {
            assert!((Vec3::from(*p).length() - 1.0).abs() < 1e-5);
        }
        assert!((Vec3::from(data.positions[0]) - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_indices_in_range() {
        let data = MeshData::uv_sphere(5, 7);
        assert!(data.indices.iter().all(|&i| i < data.vertex_count()));
        assert_eq!(data.index_count() % 3, 0);
    }

    #[test]
    fn test_triangles_face_outward() {
        let data = MeshData::uv_sphere(12, 24);
        for tri in data.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(data.positions[i as usize]));
            let normal = (b - a).cross(c - a);
            let center = (a + b + c) / 3.0;
            assert!(normal.dot(center) > 0.0, "inward triangle {tri:?}");
        }
    }

    #[test]
    fn test_huge_tessellation_is_clamped() {
        let (stacks, slices) = clamp_segments(100_000, u32::MAX);
        assert_eq!((stacks, slices), (MAX_SPHERE_SEGMENTS, MAX_SPHERE_SEGMENTS));
        let indices = 6u64 * stacks as u64 * slices as u64;
        assert!(indices <= u32::MAX as u64);
        assert!(((stacks + 1) * (slices + 1)) < u32::MAX);
    }

    const QUAD_OBJ: &str = "\
o quad
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
vn 0.0 0.0 1.0
f 1/1/1 2/2/1 3/3/1 4/4/1
o tri
v 0.0 0.0 2.0
v 0.0 0.0 3.0
v 0.0 1.0 2.0
f 5 6 7
";

    #[test]
    fn test_obj_models() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.obj");
        std::fs::write(&path, QUAD_OBJ).unwrap();

        let meshes = MeshData::from_obj(&path).unwrap();
        assert_eq!(meshes.len(), 2);

        let quad = &meshes[0];
        assert_eq!(quad.vertex_count(), 4);
        assert_eq!(quad.index_count(), 6);
        assert_eq!(quad.positions[2], [1.0, 1.0, 0.0]);
        assert_eq!(quad.tex_coords[2], [1.0, 1.0]);
        assert!(quad.normals.iter().all(|n| *n == [0.0, 0.0, 1.0]));
        assert!(quad.indices.iter().all(|&i| i < quad.vertex_count()));

        // No normals or texture coordinates in the file
        let tri = &meshes[1];
        assert_eq!(tri.vertex_count(), 3);
        assert_eq!(tri.index_count(), 3);
        assert_eq!(tri.tex_coords, vec![[0.0; 2]; 3]);
        for n in &tri.normals {
            assert!((Vec3::from(*n) - Vec3::NEG_X).length() < 1e-6);
        }
    }

    #[test]
    fn test_missing_obj_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(MeshData::from_obj(&dir.path().join("missing.obj")).is_err());
    }

    #[test]
    fn test_degenerate_input_is_clamped() {
        let data = MeshData::uv_sphere(0, 0);
        assert_eq!(data.vertex_count(), 3 * 4);
        assert!(data.index_count() > 0);
    }
}

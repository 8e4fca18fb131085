//! Text vertex and mesh buffers
//!
//! Each quad owns four vertices in `[LB, RB, LT, RT]` order and six indices
//! `0,1,2,1,3,2`. Vertices are `#[repr(C)]` plain data so the renderer can
//! upload them with a single copy.

use bytemuck::{Pod, Zeroable};
use crate::foundation::math::{Mat4, Vec3, Vec4};

/// Floats per vertex: position (3), uv (2), color (4), extra color (4), texture index (1)
pub const FLOATS_PER_VERTEX: usize = 14;

/// Corner order of a quad's vertices
pub const QUAD_CORNERS: usize = 4;

/// Triangle list for one quad, relative to its first vertex
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 1, 3, 2];

/// Vertex data for text rendering
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct TextVertex {
    /// Position in local space
    pub position: [f32; 3],
    /// Normalized texture coordinates
    pub uv: [f32; 2],
    /// Primary color (node color times opacity)
    pub color: [f32; 4],
    /// Per-glyph color carrying visibility alpha and gradients
    pub color_extra: [f32; 4],
    /// Atlas page holding the glyph
    pub texture_index: f32,
}

/// Geometry of one quad before it is appended
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadGeometry {
    /// Corner positions in `[LB, RB, LT, RT]` order
    pub positions: [Vec3; 4],
    /// Corner UVs in `[LB, RB, LT, RT]` order
    pub uvs: [[f32; 2]; 4],
    /// Atlas page
    pub texture_id: u32,
}

/// Vertex and index buffers of one text label
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextMesh {
    /// Vertex buffer
    pub vertices: Vec<TextVertex>,
    /// Index buffer
    pub indices: Vec<u32>,
}

impl TextMesh {
    /// Create an empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove all quads
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    /// Number of quads
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / QUAD_CORNERS
    }

    /// Whether the mesh has no quads
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Append a quad with white extra color; returns its quad index
    pub fn push_quad(&mut self, quad: &QuadGeometry, color: Vec4) -> usize {
        let quad_index = self.quad_count();
        let base = (quad_index * QUAD_CORNERS) as u32;
        for (position, uv) in quad.positions.iter().zip(quad.uvs.iter()) {
            self.vertices.push(TextVertex {
                position: [position.x, position.y, position.z],
                uv: *uv,
                color: color.into(),
                color_extra: [1.0; 4],
                texture_index: quad.texture_id as f32,
            });
        }
        self.indices.extend(QUAD_INDICES.iter().map(|i| base + i));
        quad_index
    }

    /// The four vertices of a quad
    pub fn quad(&self, quad_index: usize) -> Option<&[TextVertex]> {
        let start = quad_index * QUAD_CORNERS;
        self.vertices.get(start..start + QUAD_CORNERS)
    }

    /// Mutable access to the four vertices of a quad
    pub fn quad_mut(&mut self, quad_index: usize) -> Option<&mut [TextVertex]> {
        let start = quad_index * QUAD_CORNERS;
        self.vertices.get_mut(start..start + QUAD_CORNERS)
    }

    /// Overwrite the primary color of every vertex
    pub fn set_color(&mut self, color: Vec4) {
        for vertex in &mut self.vertices {
            vertex.color = color.into();
        }
    }

    /// Raw vertex bytes for upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Fill an interleaved float buffer with positions moved into world space
    ///
    /// # Arguments
    ///
    /// * `world` - Node world matrix
    /// * `out` - Destination, cleared first; receives [`FLOATS_PER_VERTEX`] floats per vertex
    pub fn write_world_buffer(&self, world: &Mat4, out: &mut Vec<f32>) {
        out.clear();
        out.reserve(self.vertices.len() * FLOATS_PER_VERTEX);
        for vertex in &self.vertices {
            let local = nalgebra::Point3::new(vertex.position[0], vertex.position[1], vertex.position[2]);
            let p = world.transform_point(&local);
            out.extend_from_slice(&[p.x, p.y, p.z]);
            out.extend_from_slice(&vertex.uv);
            out.extend_from_slice(&vertex.color);
            out.extend_from_slice(&vertex.color_extra);
            out.push(vertex.texture_index);
        }
    }
}

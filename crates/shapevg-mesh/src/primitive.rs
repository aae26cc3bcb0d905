use bytemuck::{Pod, Zeroable};

use shapevg_core::color::PackedSrgb;
use shapevg_core::math::Point;

/// A set of vertices and indices representing a list of triangles.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Indexed<T> {
    /// The vertices of the mesh
    pub vertices: Vec<T>,

    /// The list of vertex indices that defines the triangles of the mesh.
    ///
    /// Therefore, this list should always have a length that is a multiple of 3.
    pub indices: Vec<u32>,
}

impl<T> Indexed<T> {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn with_capacity(vertices: usize, triangles: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(triangles * 3),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterates over the index triples of the mesh.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
    }
}

impl<T> Default for Indexed<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A two-dimensional vertex with a color and a texture coordinate.
#[derive(Copy, Clone, Debug, Default, PartialEq, Zeroable, Pod)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct MeshVertex2D {
    /// The vertex position in 2D space.
    pub position: [f32; 2],

    /// The color of the vertex in sRGBA.
    pub color: PackedSrgb,

    /// The texture coordinate of the vertex.
    pub uv: [f32; 2],
}

impl MeshVertex2D {
    pub fn new(
        position: impl Into<[f32; 2]>,
        color: impl Into<PackedSrgb>,
        uv: impl Into<[f32; 2]>,
    ) -> Self {
        Self {
            position: position.into(),
            color: color.into(),
            uv: uv.into(),
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.position[0], self.position[1])
    }
}

/// The mesh produced by tessellating a single shape.
pub type ShapeMesh = Indexed<MeshVertex2D>;

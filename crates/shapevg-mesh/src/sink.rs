use shapevg_core::color::PackedSrgb;
use shapevg_core::math::Point;

use crate::{Indexed, MeshVertex2D};

/// The destination of a tessellated shape.
///
/// The tessellator only ever appends to a sink. Vertex indices are handed out
/// sequentially starting at `current_vertex_count()` at the time of the call.
pub trait MeshSink {
    /// Removes every vertex and triangle.
    fn clear(&mut self);

    /// Appends a vertex and returns its index.
    fn add_vertex(&mut self, position: Point, color: PackedSrgb, uv: Point) -> u32;

    /// Appends a triangle made of three previously added vertices.
    fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32);

    fn current_vertex_count(&self) -> u32;

    /// Hint that about `vertices` more vertices and `triangles` more
    /// triangles are about to be added.
    fn reserve(&mut self, vertices: usize, triangles: usize) {
        let _ = (vertices, triangles);
    }
}

impl MeshSink for Indexed<MeshVertex2D> {
    fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    fn add_vertex(&mut self, position: Point, color: PackedSrgb, uv: Point) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(MeshVertex2D::new(position, color, uv));
        index
    }

    fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.extend_from_slice(&[i0, i1, i2]);
    }

    fn current_vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    fn reserve(&mut self, vertices: usize, triangles: usize) {
        self.vertices.reserve(vertices);
        self.indices.reserve(triangles * 3);
    }
}

impl<S: MeshSink + ?Sized> MeshSink for &mut S {
    fn clear(&mut self) {
        (**self).clear()
    }

    fn add_vertex(&mut self, position: Point, color: PackedSrgb, uv: Point) -> u32 {
        (**self).add_vertex(position, color, uv)
    }

    fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        (**self).add_triangle(i0, i1, i2)
    }

    fn current_vertex_count(&self) -> u32 {
        (**self).current_vertex_count()
    }

    fn reserve(&mut self, vertices: usize, triangles: usize) {
        (**self).reserve(vertices, triangles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_sequential() {
        let mut mesh = Indexed::<MeshVertex2D>::new();
        let a = mesh.add_vertex(Point::new(0.0, 0.0), PackedSrgb::WHITE, Point::zero());
        let b = mesh.add_vertex(Point::new(1.0, 0.0), PackedSrgb::WHITE, Point::zero());
        let c = mesh.add_vertex(Point::new(0.0, 1.0), PackedSrgb::WHITE, Point::zero());
        mesh.add_triangle(a, b, c);

        assert_eq!((a, b, c), (0, 1, 2));
        assert_eq!(mesh.current_vertex_count(), 3);
        assert_eq!(mesh.triangles().collect::<Vec<_>>(), vec![[0, 1, 2]]);

        mesh.clear();
        assert_eq!(mesh.current_vertex_count(), 0);
        assert!(mesh.is_empty());
    }
}

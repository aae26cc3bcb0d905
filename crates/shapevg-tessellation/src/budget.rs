use std::ops::{Add, AddAssign};

/// How much a shape will write, computed from its parameters alone.
///
/// `ring_records` sizes the pooled scratch buffer. `vertices` and `triangles`
/// are exact for the mesh the shape produces.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeBudget {
    pub ring_records: usize,
    pub vertices: usize,
    pub triangles: usize,
}

impl ShapeBudget {
    pub const fn new(ring_records: usize, vertices: usize, triangles: usize) -> Self {
        Self {
            ring_records,
            vertices,
            triangles,
        }
    }

    /// Extra geometry that does not go through a pooled buffer.
    pub const fn mesh(vertices: usize, triangles: usize) -> Self {
        Self::new(0, vertices, triangles)
    }
}

impl Add for ShapeBudget {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            ring_records: self.ring_records + rhs.ring_records,
            vertices: self.vertices + rhs.vertices,
            triangles: self.triangles + rhs.triangles,
        }
    }
}

impl AddAssign for ShapeBudget {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

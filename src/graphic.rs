use thunderdome::Arena;

use crate::mesh::ShapeMesh;
use crate::tessellation::{Shape, TessellationError, Tessellator};

const INIT_STORE_CAPACITY: usize = 64;

/// A shape together with its most recent mesh.
///
/// The mesh is rebuilt lazily the first time it is requested after the shape
/// changed.
#[derive(Debug, Clone)]
pub struct ShapeGraphic {
    shape: Shape,
    mesh: ShapeMesh,
    dirty: bool,
    last_error: Option<TessellationError>,
}

impl ShapeGraphic {
    pub fn new(shape: impl Into<Shape>) -> Self {
        Self {
            shape: shape.into(),
            mesh: ShapeMesh::new(),
            dirty: true,
            last_error: None,
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn set_shape(&mut self, shape: impl Into<Shape>) {
        let shape = shape.into();
        if shape != self.shape {
            self.shape = shape;
            self.dirty = true;
        }
    }

    /// Edit the shape in place. Always marks the graphic dirty.
    pub fn shape_mut(&mut self) -> &mut Shape {
        self.dirty = true;
        &mut self.shape
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The error of the last failed rebuild, if the current mesh is stale.
    pub fn last_error(&self) -> Option<&TessellationError> {
        self.last_error.as_ref()
    }

    /// Returns the mesh, rebuilding it first if the shape changed.
    ///
    /// If the shape can't be tessellated the previous mesh is kept and the
    /// graphic isn't retried until the shape changes again.
    pub fn mesh(&mut self, tessellator: &mut Tessellator) -> &ShapeMesh {
        if self.dirty {
            self.rebuild(tessellator);
        }
        &self.mesh
    }

    /// The mesh as of the last rebuild, without rebuilding.
    pub fn cached_mesh(&self) -> &ShapeMesh {
        &self.mesh
    }

    fn rebuild(&mut self, tessellator: &mut Tessellator) {
        self.dirty = false;

        // Build into a scratch mesh so that a failure leaves the old one intact.
        let mut mesh = ShapeMesh::with_capacity(self.mesh.vertices.len(), self.mesh.triangle_count());
        match tessellator.tessellate_into(&self.shape, &mut mesh) {
            Ok(()) => {
                self.mesh = mesh;
                self.last_error = None;
            }
            Err(e) => {
                log::warn!("keeping previous mesh of {}: {}", self.shape.name(), e);
                self.last_error = Some(e);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GraphicId(thunderdome::Index);

impl GraphicId {
    pub const fn dangling() -> Self {
        Self(thunderdome::Index::DANGLING)
    }
}

impl Default for GraphicId {
    fn default() -> Self {
        Self::dangling()
    }
}

/// Owns a set of graphics and the tessellator that builds their meshes.
#[derive(Debug)]
pub struct GraphicStore {
    graphics: Arena<ShapeGraphic>,
    tessellator: Tessellator,
}

impl GraphicStore {
    pub fn new() -> Self {
        Self::with_tessellator(Tessellator::new())
    }

    pub fn with_tessellator(tessellator: Tessellator) -> Self {
        Self {
            graphics: Arena::with_capacity(INIT_STORE_CAPACITY),
            tessellator,
        }
    }

    pub fn insert(&mut self, shape: impl Into<Shape>) -> GraphicId {
        GraphicId(self.graphics.insert(ShapeGraphic::new(shape)))
    }

    pub fn remove(&mut self, id: GraphicId) -> Option<ShapeGraphic> {
        self.graphics.remove(id.0)
    }

    pub fn contains(&self, id: GraphicId) -> bool {
        self.graphics.contains(id.0)
    }

    pub fn len(&self) -> usize {
        self.graphics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphics.is_empty()
    }

    pub fn get(&self, id: GraphicId) -> Option<&ShapeGraphic> {
        self.graphics.get(id.0)
    }

    pub fn get_mut(&mut self, id: GraphicId) -> Option<&mut ShapeGraphic> {
        self.graphics.get_mut(id.0)
    }

    /// Replaces the shape of a graphic. Returns `false` if `id` is stale.
    pub fn set_shape(&mut self, id: GraphicId, shape: impl Into<Shape>) -> bool {
        if let Some(graphic) = self.graphics.get_mut(id.0) {
            graphic.set_shape(shape);
            true
        } else {
            false
        }
    }

    /// The up-to-date mesh of a graphic.
    pub fn mesh(&mut self, id: GraphicId) -> Option<&ShapeMesh> {
        let graphic = self.graphics.get_mut(id.0)?;
        Some(graphic.mesh(&mut self.tessellator))
    }

    /// Rebuilds every dirty graphic. Returns how many were rebuilt.
    pub fn rebuild_dirty(&mut self) -> usize {
        let mut rebuilt = 0;
        for (_, graphic) in self.graphics.iter_mut() {
            if graphic.is_dirty() {
                graphic.rebuild(&mut self.tessellator);
                rebuilt += 1;
            }
        }
        rebuilt
    }

    pub fn iter(&self) -> impl Iterator<Item = (GraphicId, &ShapeGraphic)> {
        self.graphics.iter().map(|(index, graphic)| (GraphicId(index), graphic))
    }

    pub fn tessellator(&self) -> &Tessellator {
        &self.tessellator
    }
}

impl Default for GraphicStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::bounds;
    use crate::tessellation::shape::{CornerRadii, Ellipse, RoundedRect};

    #[test]
    fn rebuilds_only_when_dirty() {
        let mut tessellator = Tessellator::new();
        let mut graphic = ShapeGraphic::new(Ellipse::new(bounds(0.0, 0.0, 10.0, 10.0), 8));
        assert!(graphic.is_dirty());
        assert_eq!(graphic.mesh(&mut tessellator).vertices.len(), 9);
        assert!(!graphic.is_dirty());

        graphic.set_shape(Ellipse::new(bounds(0.0, 0.0, 10.0, 10.0), 8));
        assert!(!graphic.is_dirty());

        graphic.set_shape(Ellipse::new(bounds(0.0, 0.0, 10.0, 10.0), 16));
        assert!(graphic.is_dirty());
        assert_eq!(graphic.mesh(&mut tessellator).vertices.len(), 17);
    }

    #[test]
    fn failed_rebuild_keeps_previous_mesh() {
        let mut tessellator = Tessellator::new();
        let mut graphic =
            ShapeGraphic::new(RoundedRect::new(bounds(0.0, 0.0, 10.0, 10.0), CornerRadii::default()));
        assert_eq!(graphic.mesh(&mut tessellator).triangle_count(), 2);

        graphic.set_shape(RoundedRect::new(bounds(0.0, 0.0, 10.0, 0.0), CornerRadii::default()));
        assert_eq!(graphic.mesh(&mut tessellator).triangle_count(), 2);
        assert!(matches!(
            graphic.last_error(),
            Some(TessellationError::ShapeDegenerate(_))
        ));
        assert!(!graphic.is_dirty());
    }

    #[test]
    fn store_ids_go_stale_on_remove() {
        let mut store = GraphicStore::new();
        let id = store.insert(Ellipse::new(bounds(0.0, 0.0, 4.0, 4.0), 6));
        assert_eq!(store.mesh(id).map(|m| m.triangle_count()), Some(6));

        assert!(store.remove(id).is_some());
        assert!(!store.contains(id));
        assert!(store.mesh(id).is_none());
        assert!(!store.set_shape(id, Ellipse::new(bounds(0.0, 0.0, 4.0, 4.0), 3)));
        assert!(store.get(GraphicId::dangling()).is_none());
    }
}

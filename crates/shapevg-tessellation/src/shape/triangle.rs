use shapevg_core::math::{normalize_or_zero, smaller_side, Box2D, Point};
use shapevg_mesh::MeshSink;

use super::{build_ring, ShapeBuilder};
use crate::budget::ShapeBudget;
use crate::emitter::{FanAnchor, RingEmitter};
use crate::error::{ensure_at_least, ensure_bounds, ensure_range, TessellationError};
use crate::ring::{corner_join, corner_miter, BandOffsets, RingStyle, RingVertex};
use crate::tessellation::BufferPools;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriangleRounding {
    /// Distance of the tangent points from the right corner, as a fraction of
    /// the width.
    pub x: f32,
    /// Distance of the tangent points from the top and bottom corners, as a
    /// fraction of the height.
    pub y: f32,
    /// Segments per rounded corner.
    pub quality: u32,
}

impl Default for TriangleRounding {
    fn default() -> Self {
        Self {
            x: 0.1,
            y: 0.1,
            quality: 3,
        }
    }
}

/// A triangle pointing right: bottom-left, right-middle and top-left corners
/// of `bounds`.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Triangle {
    pub bounds: Box2D,
    pub rounding: Option<TriangleRounding>,
    pub style: RingStyle,
}

impl Triangle {
    pub fn new(bounds: Box2D) -> Self {
        Self {
            bounds,
            ..Default::default()
        }
    }

    /// The sharp corners in counter-clockwise order.
    pub fn corners(&self) -> [Point; 3] {
        let b = &self.bounds;
        [
            b.min,
            Point::new(b.max.x, b.center().y),
            Point::new(b.min.x, b.max.y),
        ]
    }

    pub fn centroid(&self) -> Point {
        let [a, b, c] = self.corners();
        Point::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0)
    }

    fn records(&self) -> usize {
        match &self.rounding {
            Some(r) => 3 * (r.quality as usize + 1),
            None => 3,
        }
    }

    fn emitter(&self) -> RingEmitter {
        let fan = match self.rounding {
            Some(_) => FanAnchor::Center(0),
            None => FanAnchor::Polygon,
        };
        RingEmitter::new(&self.style, true, fan)
    }
}

impl ShapeBuilder for Triangle {
    fn validate(&self) -> Result<(), TessellationError> {
        ensure_bounds(&self.bounds)?;
        if let Some(r) = &self.rounding {
            ensure_range("rounding.x", r.x, 0.0..=0.5)?;
            ensure_range("rounding.y", r.y, 0.0..=0.5)?;
            ensure_at_least("rounding.quality", r.quality, 1)?;
        }
        self.style.validate()
    }

    fn budget(&self) -> ShapeBudget {
        self.emitter().budget(self.records())
    }

    fn build<S: MeshSink>(
        &self,
        pools: &BufferPools,
        sink: &mut S,
    ) -> Result<(), TessellationError> {
        let corners = self.corners();
        let offsets = BandOffsets::resolve(&self.style, smaller_side(self.bounds) * 0.5);
        let (w, h) = (self.bounds.width(), self.bounds.height());
        let rounding = self.rounding;

        let samples = (0..3).flat_map(move |i| {
            let prev = corners[(i + 2) % 3];
            let cur = corners[i];
            let next = corners[(i + 1) % 3];

            let (start, end, segments, sharp) = match rounding {
                // The right corner is rounded along x, the others along y.
                Some(r) => {
                    let reach = if i == 1 { r.x * w } else { r.y * h };
                    (
                        cur + normalize_or_zero(prev - cur) * reach,
                        cur + normalize_or_zero(next - cur) * reach,
                        r.quality,
                        None,
                    )
                }
                None => (cur, cur, 1, Some(corner_miter(prev, cur, next))),
            };
            let count = if sharp.is_some() { 1 } else { segments as usize + 1 };

            corner_join(start, cur, end, segments)
                .take(count)
                .map(move |(p, normal)| RingVertex::along(p, sharp.unwrap_or(normal), &offsets))
        });

        let center = match self.rounding {
            Some(_) => self.centroid(),
            None => self.bounds.center(),
        };
        build_ring(
            pools,
            sink,
            &self.style,
            self.bounds,
            center,
            self.emitter(),
            self.records(),
            samples,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::RingMode;
    use shapevg_core::math::bounds;
    use shapevg_mesh::ShapeMesh;

    #[test]
    fn sharp_triangle() {
        let t = Triangle::new(bounds(0.0, 0.0, 30.0, 20.0));
        let mut mesh = ShapeMesh::new();
        t.build(&BufferPools::new(), &mut mesh).unwrap();
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.triangles().collect::<Vec<_>>(), vec![[0, 1, 2]]);
        assert_eq!(mesh.vertices[1].position, [30.0, 10.0]);
    }

    #[test]
    fn rounded_corners_fan_from_the_centroid() {
        let t = Triangle {
            rounding: Some(TriangleRounding {
                x: 0.2,
                y: 0.2,
                quality: 4,
            }),
            style: RingStyle {
                mode: RingMode::EdgeAndFill,
                ..Default::default()
            },
            ..Triangle::new(bounds(0.0, 0.0, 30.0, 30.0))
        };
        let mut mesh = ShapeMesh::new();
        t.build(&BufferPools::new(), &mut mesh).unwrap();

        let budget = t.budget();
        assert_eq!(budget.ring_records, 15);
        assert_eq!(budget.vertices, mesh.vertices.len());
        assert_eq!(budget.triangles, mesh.triangle_count());
        assert_eq!(mesh.vertices[0].position(), t.centroid());
    }
}

use std::f32::consts::FRAC_1_SQRT_2;

use shapevg_core::math::{bounds, Box2D, Point, Vector};
use shapevg_mesh::MeshSink;

use super::curved_rect::mirrored_position_and_normal;
use super::ShapeBuilder;
use crate::budget::ShapeBudget;
use crate::emitter::{oriented_quad, oriented_triangle};
use crate::error::{ensure_at_least, ensure_bounds, ensure_range, TessellationError};
use crate::fill::Fill;
use crate::ring::{RingVertex, VertexWriter};
use crate::shape::KeyframeCurve;
use crate::tessellation::BufferPools;
use crate::uv::UvRect;

/// The part of `bounds` below a curve mirrored about the vertical center
/// line. The counterpart of a [`CurvedRect`](super::CurvedRect).
///
/// The top boundary at relative position `u` of the left half is
/// `y = min.y + curve(u) * height`. The shape is filled down to the bottom
/// side.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurvedInsideRect {
    pub bounds: Box2D,
    pub curve: KeyframeCurve,
    /// Samples per half.
    pub quality: u32,
    pub fill: Fill,
    /// Width of the transparent skirt around the outline. `0.0` disables it.
    pub anti_aliasing: f32,
    pub sprite_uv: Option<UvRect>,
}

impl Default for CurvedInsideRect {
    fn default() -> Self {
        Self {
            bounds: bounds(0.0, 0.0, 100.0, 100.0),
            curve: KeyframeCurve::default(),
            quality: 10,
            fill: Fill::default(),
            anti_aliasing: 0.0,
            sprite_uv: None,
        }
    }
}

impl CurvedInsideRect {
    pub fn new(bounds: Box2D, curve: KeyframeCurve, quality: u32) -> Self {
        Self {
            bounds,
            curve,
            quality,
            ..Default::default()
        }
    }

    /// The origin of radial gradients, in the middle of the top side.
    pub fn gradient_center(&self) -> Point {
        Point::new(self.bounds.center().x, self.bounds.max.y)
    }

    fn curve_points(&self) -> usize {
        2 * self.quality as usize - 1
    }

    /// The curve point at `probe` and its unit normal facing away from the
    /// filled area.
    pub fn position_and_normal(&self, probe: f32) -> (Point, Vector) {
        let (p, n) = mirrored_position_and_normal(&self.bounds, &self.curve, probe);
        (p, -n)
    }
}

impl ShapeBuilder for CurvedInsideRect {
    fn validate(&self) -> Result<(), TessellationError> {
        ensure_bounds(&self.bounds)?;
        ensure_at_least("quality", self.quality, 3)?;
        self.curve.validate()?;
        ensure_range("anti_aliasing", self.anti_aliasing, 0.0..=f32::MAX)
    }

    fn budget(&self) -> ShapeBudget {
        let n = self.curve_points();
        // Two fans of `quality - 1` triangles and the two around the bottom
        // center.
        let mut budget = ShapeBudget::new(n, 3 + n, 2 * self.quality as usize);
        if self.anti_aliasing > 0.0 {
            // One skirt vertex per curve point and four at the corners. Three
            // side strips, the curve strip and a join at each top corner.
            budget.vertices += n + 4;
            budget.triangles += 3 * 2 + 2 * (n - 1) + 2;
        }
        budget
    }

    fn build<S: MeshSink>(
        &self,
        pools: &BufferPools,
        sink: &mut S,
    ) -> Result<(), TessellationError> {
        let b = self.bounds;
        let aa = self.anti_aliasing;
        let n = self.curve_points();
        let last = (n - 1) as f32;

        let mut writer =
            VertexWriter::single(sink, &self.fill, b, self.gradient_center(), self.sprite_uv);

        let corners = [b.min, Point::new(b.max.x, b.min.y)];
        let bottom_center = Point::new(b.center().x, b.min.y);
        let corner_indices = corners.map(|c| writer.push_main(c));
        let bottom_center_index = writer.push_main(bottom_center);

        let mut curve = pools.rings.acquire(n);
        for i in 0..n {
            let (p, normal) = self.position_and_normal(i as f32 / last);
            let mut v = RingVertex::new(p, p, p, p + normal * aa);
            v.index = writer.push_main(p);
            if aa > 0.0 {
                v.outer_aa_index = writer.push_main_transparent(v.outer_aa_position);
            }
            curve.append(v)?;
        }

        let at = |v: &RingVertex| (v.index, v.position);
        let mid = self.quality as usize - 1;
        let sink = writer.sink();

        // Left half fans out from the bottom-left corner, right half from the
        // bottom-right one.
        let left = (corner_indices[0], corners[0]);
        let right = (corner_indices[1], corners[1]);
        for k in 0..mid {
            oriented_triangle(sink, left, at(&curve[k + 1]), at(&curve[k]));
        }
        let center = (bottom_center_index, bottom_center);
        oriented_triangle(sink, left, center, at(&curve[mid]));
        oriented_triangle(sink, right, at(&curve[mid]), center);
        for k in mid..n - 1 {
            oriented_triangle(sink, right, at(&curve[k + 1]), at(&curve[k]));
        }

        if aa > 0.0 {
            let diagonal = |x: f32, y: f32| Vector::new(x, y) * (FRAC_1_SQRT_2 * aa);
            let first = &curve[0];
            let end = &curve[n - 1];

            let skirt = [
                corners[0] + diagonal(-1.0, -1.0),
                corners[1] + diagonal(1.0, -1.0),
                end.position + diagonal(1.0, 1.0),
                first.position + diagonal(-1.0, 1.0),
            ];
            let skirt_indices = skirt.map(|p| writer.push_main_transparent(p));
            let outer = |k: usize| (skirt_indices[k], skirt[k]);
            let sink = writer.sink();

            // Bottom, right and left sides.
            oriented_quad(sink, left, right, outer(0), outer(1));
            oriented_quad(sink, right, at(end), outer(1), outer(2));
            oriented_quad(sink, at(first), left, outer(3), outer(0));

            for k in 0..n - 1 {
                let (a, c) = (&curve[k], &curve[k + 1]);
                oriented_quad(
                    sink,
                    at(a),
                    at(c),
                    (a.outer_aa_index, a.outer_aa_position),
                    (c.outer_aa_index, c.outer_aa_position),
                );
            }

            oriented_triangle(sink, at(end), outer(2), (end.outer_aa_index, end.outer_aa_position));
            oriented_triangle(
                sink,
                at(first),
                (first.outer_aa_index, first.outer_aa_position),
                outer(3),
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::CurveKey;
    use shapevg_core::math::point;
    use shapevg_mesh::ShapeMesh;

    fn area(mesh: &ShapeMesh) -> f32 {
        mesh.triangles()
            .map(|[a, b, c]| {
                let p = |i: u32| mesh.vertices[i as usize].position();
                (p(b) - p(a)).cross(p(c) - p(a)) * 0.5
            })
            .sum()
    }

    #[test]
    fn default_curve_fills_below_the_v() {
        let shape = CurvedInsideRect::new(bounds(0.0, 0.0, 100.0, 50.0), KeyframeCurve::default(), 3);
        let mut mesh = ShapeMesh::new();
        shape.build(&BufferPools::new(), &mut mesh).unwrap();

        assert_eq!(mesh.vertices.len(), 3 + 5);
        assert_eq!(mesh.triangle_count(), 6);
        let hull: Vec<[f32; 2]> = mesh.vertices.iter().map(|v| v.position).collect();
        assert_eq!(
            hull,
            vec![
                [0.0, 0.0],
                [100.0, 0.0],
                [50.0, 0.0],
                [0.0, 50.0],
                [25.0, 25.0],
                [50.0, 0.0],
                [75.0, 25.0],
                [100.0, 50.0],
            ]
        );
        // Two right triangles of 50 x 50.
        assert!((area(&mesh) - 2500.0).abs() < 1e-3, "{}", area(&mesh));
    }

    #[test]
    fn covers_everything_below_the_curve() {
        let shape = CurvedInsideRect::new(
            bounds(10.0, 10.0, 90.0, 50.0),
            KeyframeCurve::new([
                CurveKey::new(0.0, 0.7),
                CurveKey::new(0.5, 0.3),
                CurveKey::new(1.0, 0.5),
            ]),
            5,
        );
        let mut inside = ShapeMesh::new();
        shape.build(&BufferPools::new(), &mut inside).unwrap();

        let samples: Vec<Point> = (0..9).map(|i| shape.position_and_normal(i as f32 / 8.0).0).collect();
        let expected: f32 = samples
            .windows(2)
            .map(|w| (w[1].x - w[0].x) * ((w[0].y + w[1].y) * 0.5 - 10.0))
            .sum();
        assert!((area(&inside) - expected).abs() < 1e-2, "{} {expected}", area(&inside));
        for tri in inside.triangles() {
            let [a, b, c] = tri.map(|i| inside.vertices[i as usize].position());
            assert!((b - a).cross(c - a) >= -1e-4, "{tri:?}");
        }
    }

    #[test]
    fn skirt_points_away_from_the_fill() {
        let shape = CurvedInsideRect {
            anti_aliasing: 2.0,
            ..CurvedInsideRect::new(bounds(0.0, 0.0, 60.0, 30.0), KeyframeCurve::linear(0.5, 1.0), 4)
        };
        let (p, n) = shape.position_and_normal(0.5);
        assert_eq!(p, point(30.0, 30.0));
        assert!(n.y > 0.999);

        let mut mesh = ShapeMesh::new();
        shape.build(&BufferPools::new(), &mut mesh).unwrap();
        let budget = shape.budget();
        assert_eq!(budget.vertices, mesh.vertices.len());
        assert_eq!(budget.triangles, mesh.triangle_count());

        // The curve rises from 15 at the sides to 30 in the middle.
        let curve_y = |x: f32| 15.0 + (30.0 - (x - 30.0).abs()) * 0.5;
        let skirt: Vec<[f32; 2]> = mesh
            .vertices
            .iter()
            .filter(|v| v.color.a() == 0.0)
            .map(|v| v.position)
            .collect();
        assert_eq!(skirt.len(), 7 + 4);
        for [x, y] in skirt {
            assert!(x < 0.0 || x > 60.0 || y < 0.0 || y > curve_y(x), "{x} {y}");
        }
    }

    #[test]
    fn needs_three_samples_per_half() {
        let shape = CurvedInsideRect::new(bounds(0.0, 0.0, 10.0, 10.0), KeyframeCurve::default(), 2);
        assert!(matches!(
            shape.validate(),
            Err(TessellationError::ParameterOutOfRange { name: "quality", .. })
        ));
    }
}

use std::f32::consts::FRAC_PI_2;

use shapevg_core::math::{bounds, Box2D, Point, Vector};
use shapevg_mesh::MeshSink;

use super::{radial_bounds, ShapeBuilder};
use crate::budget::ShapeBudget;
use crate::emitter::{band_quad, oriented_triangle};
use crate::error::{ensure_at_least, ensure_bounds, ensure_range, TessellationError};
use crate::fill::Fill;
use crate::pool::Circular;
use crate::ring::{RingVertex, VertexWriter};
use crate::tessellation::BufferPools;
use crate::uv::UvRect;

/// Everything of `bounds` outside of its inscribed ellipse.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InversedEllipse {
    pub bounds: Box2D,
    /// Arc segments per quadrant.
    pub quarter_detail: u32,
    pub keep_circle: bool,
    pub fill: Fill,
    /// Width of the transparent skirt inside the ellipse. `0.0` disables it.
    pub anti_aliasing: f32,
    pub sprite_uv: Option<UvRect>,
}

impl Default for InversedEllipse {
    fn default() -> Self {
        Self {
            bounds: bounds(0.0, 0.0, 100.0, 100.0),
            quarter_detail: 10,
            keep_circle: false,
            fill: Fill::default(),
            anti_aliasing: 0.0,
            sprite_uv: None,
        }
    }
}

impl InversedEllipse {
    pub fn new(bounds: Box2D, quarter_detail: u32) -> Self {
        Self {
            bounds,
            quarter_detail,
            ..Default::default()
        }
    }

    fn records(&self) -> usize {
        4 * self.quarter_detail as usize
    }

    fn has_bridges(&self) -> bool {
        self.keep_circle && self.bounds.width() != self.bounds.height()
    }

    /// The rect corners, one per quadrant, counter-clockwise from top-right.
    fn corners(&self) -> [Point; 4] {
        let b = &self.bounds;
        [
            b.max,
            Point::new(b.min.x, b.max.y),
            b.min,
            Point::new(b.max.x, b.min.y),
        ]
    }
}

impl ShapeBuilder for InversedEllipse {
    fn validate(&self) -> Result<(), TessellationError> {
        ensure_bounds(&self.bounds)?;
        ensure_at_least("quarter_detail", self.quarter_detail, 1)?;
        ensure_range("anti_aliasing", self.anti_aliasing, 0.0..=f32::MAX)
    }

    fn budget(&self) -> ShapeBudget {
        let n = self.records();
        let aa = self.anti_aliasing > 0.0;
        let mut budget = ShapeBudget::new(n, 4 + n, n);
        if self.has_bridges() {
            budget.triangles += 2;
        }
        if aa {
            budget.vertices += n;
            budget.triangles += 2 * n;
        }
        budget
    }

    fn build<S: MeshSink>(
        &self,
        pools: &BufferPools,
        sink: &mut S,
    ) -> Result<(), TessellationError> {
        let layout = radial_bounds(self.bounds, self.keep_circle);
        let center = layout.center();
        let half = layout.size().to_vector() * 0.5;
        let aa = self.anti_aliasing;
        let detail = self.quarter_detail as usize;
        let n = self.records();

        let mut writer = VertexWriter::single(sink, &self.fill, self.bounds, center, self.sprite_uv);
        let corners = self.corners();
        let corner_indices = corners.map(|c| writer.push_main(c));

        let mut ring = pools.rings.acquire(n);
        let step = FRAC_PI_2 / detail as f32;
        for k in 0..n {
            let (sin, cos) = (step * k as f32).sin_cos();
            let position = center + Vector::new(half.x * cos, half.y * sin);
            let inner = center
                + Vector::new((half.x - aa).max(0.0) * cos, (half.y - aa).max(0.0) * sin);

            let mut v = RingVertex::new(position, position, inner, position);
            v.index = writer.push_main(position);
            if aa > 0.0 {
                v.inner_aa_index = writer.push_main_transparent(inner);
            }
            ring.append(v)?;
        }

        let sink = writer.sink();
        for k in 0..n {
            let (next, cur) = ring.circular_pair(k + 1);
            let corner = corner_indices[k / detail];
            // The corner lies outside the arc, so the arc runs clockwise
            // around it.
            sink.add_triangle(corner, next.index, cur.index);

            if aa > 0.0 {
                band_quad(sink, cur.inner_aa_index, next.inner_aa_index, cur.index, next.index);
            }
        }

        if self.has_bridges() {
            // Close the strips between the circle and the longer sides.
            let at = |k: usize| (ring[k % n].index, ring[k % n].position);
            let corner = |q: usize| (corner_indices[q], corners[q]);
            let sides = if self.bounds.width() > self.bounds.height() {
                [(at(0), corner(3), corner(0)), (at(2 * detail), corner(1), corner(2))]
            } else {
                [(at(detail), corner(0), corner(1)), (at(3 * detail), corner(2), corner(3))]
            };
            for (tip, a, b) in sides {
                oriented_triangle(sink, tip, a, b);
            }
        }

        Ok(())
    }
}

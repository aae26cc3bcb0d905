use shapevg_core::math::{
    degrees, left_perpendicular, normalize_or_zero, radians, right_perpendicular, rotate, Point,
    Vector,
};
use shapevg_mesh::MeshSink;

use super::polyline::{StrokeLayout, StrokeVertex};
use crate::budget::ShapeBudget;
use crate::curve::QuadraticBezier;
use crate::emitter::{oriented_quad, oriented_triangle};
use crate::error::{ensure_at_least, ensure_range, TessellationError};
use crate::pool::Circular;
use crate::ring::VertexWriter;
use crate::tessellation::BufferPools;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EndingKind {
    #[default]
    None,
    /// Two strokes meeting at the tip.
    Arrow,
    /// A solid triangle.
    FilledArrow,
}

/// The decoration at one end of a [`Polyline`](super::Polyline).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ending {
    pub kind: EndingKind,
    /// Full opening angle in degrees, `1.0..=179.0`.
    pub angle: f32,
    /// Length of each wing.
    pub length: f32,
    /// Segments of the rounded tip of a hollow arrow on a rounded stroke.
    pub smoothness: u32,
}

impl Default for Ending {
    fn default() -> Self {
        Self {
            kind: EndingKind::None,
            angle: 20.0,
            length: 10.0,
            smoothness: 20,
        }
    }
}

impl Ending {
    pub fn new(kind: EndingKind, angle: f32, length: f32) -> Self {
        Self {
            kind,
            angle,
            length,
            ..Default::default()
        }
    }

    pub fn is_some(&self) -> bool {
        self.kind != EndingKind::None
    }

    fn half_angle(&self) -> f32 {
        degrees(self.angle * 0.5).radians
    }

    /// How far the stroke body stops short of the path end so that it does
    /// not overlap the ending.
    pub fn offset(&self, thickness: f32) -> f32 {
        match self.kind {
            EndingKind::None => 0.0,
            EndingKind::Arrow => (thickness * 0.5) / degrees(90.0 - self.angle * 0.5).radians.cos(),
            EndingKind::FilledArrow => self.length * self.half_angle().cos(),
        }
    }

    /// The ends of the left and right wing for a tip pointing along
    /// `direction`.
    fn wings(&self, tip: Point, direction: Vector) -> (Point, Point) {
        let back = -direction;
        let half = self.half_angle();
        (
            tip + rotate(back, radians(-half)) * self.length,
            tip + rotate(back, radians(half)) * self.length,
        )
    }

    pub(super) fn validate(&self, names: [&'static str; 3]) -> Result<(), TessellationError> {
        if !self.is_some() {
            return Ok(());
        }
        ensure_range(names[0], self.angle, 1.0..=179.0)?;
        ensure_range(names[1], self.length, 0.0..=f32::MAX)?;
        ensure_at_least(names[2], self.smoothness, 1)
    }

    pub(super) fn budget(&self, layout: StrokeLayout) -> ShapeBudget {
        let aa = usize::from(layout.has_aa());
        match self.kind {
            EndingKind::None => ShapeBudget::default(),
            EndingKind::FilledArrow => ShapeBudget::new(3, 3 + 9 * aa, 1 + 12 * aa),
            EndingKind::Arrow if !layout.rounded => ShapeBudget::new(
                3,
                3 * layout.vertices_per_record(),
                2 * layout.segment_triangles(),
            ),
            EndingKind::Arrow => {
                let steps = self.smoothness.max(1) as usize;
                let strips = ShapeBudget::new(
                    4,
                    4 * layout.vertices_per_record(),
                    2 * layout.segment_triangles(),
                );
                let tip = ShapeBudget::mesh(1 + (steps - 1) * (1 + aa), steps * (1 + 2 * aa) + 1);
                strips + tip + layout.cap_budget() + layout.cap_budget()
            }
        }
    }

    pub(super) fn build<S: MeshSink>(
        &self,
        pools: &BufferPools,
        writer: &mut VertexWriter<'_, S>,
        tip: Point,
        direction: Vector,
        layout: StrokeLayout,
    ) -> Result<(), TessellationError> {
        match self.kind {
            EndingKind::None => Ok(()),
            EndingKind::FilledArrow => {
                self.build_filled(writer, tip, direction, layout);
                Ok(())
            }
            EndingKind::Arrow => self.build_hollow(pools, writer, tip, direction, layout),
        }
    }

    fn build_filled<S: MeshSink>(
        &self,
        writer: &mut VertexWriter<'_, S>,
        tip: Point,
        direction: Vector,
        layout: StrokeLayout,
    ) {
        let (left, right) = self.wings(tip, direction);
        // Counter-clockwise.
        let corners = [tip, left, right];
        let indices = corners.map(|p| writer.push_main(p));
        let node = |i: usize| (indices[i], corners[i]);
        oriented_triangle(writer.sink(), node(0), node(1), node(2));

        if !layout.has_aa() {
            return;
        }

        // Each corner fades out along the normal of the incoming side, the
        // corner bisector and the normal of the outgoing side.
        let mut skirt = [[(0, Point::origin()); 3]; 3];
        for (i, fan) in skirt.iter_mut().enumerate() {
            let (prev, cur, next) = corners.circular_trio(i);
            let n_in = right_perpendicular(normalize_or_zero(*cur - *prev));
            let n_out = right_perpendicular(normalize_or_zero(*next - *cur));
            let mid = normalize_or_zero(n_in + n_out);
            let mid = if mid == Vector::zero() { n_in } else { mid };
            for (slot, normal) in fan.iter_mut().zip([n_in, mid, n_out]) {
                let p = *cur + normal * layout.aa;
                *slot = (writer.push_main_transparent(p), p);
            }
        }

        let sink = writer.sink();
        for i in 0..3 {
            let next = (i + 1) % 3;
            oriented_triangle(sink, node(i), skirt[i][0], skirt[i][1]);
            oriented_triangle(sink, node(i), skirt[i][1], skirt[i][2]);
            oriented_quad(sink, node(i), node(next), skirt[i][2], skirt[next][0]);
        }
    }

    fn build_hollow<S: MeshSink>(
        &self,
        pools: &BufferPools,
        writer: &mut VertexWriter<'_, S>,
        tip: Point,
        direction: Vector,
        layout: StrokeLayout,
    ) -> Result<(), TessellationError> {
        let (left, right) = self.wings(tip, direction);
        let in_dir = normalize_or_zero(tip - left);
        let out_dir = normalize_or_zero(right - tip);

        // Mitered tip: its left side is the outer corner, its right side the
        // inner one.
        let miter = 1.0 / self.half_angle().sin();
        let apex = StrokeVertex::new(
            tip,
            right_perpendicular(direction),
            layout.half * miter,
            layout.half_aa() * miter,
        );
        let left_end = layout.sample(left, in_dir);
        let right_end = layout.sample(right, out_dir);

        if !layout.rounded {
            let mut wing = pools.strokes.acquire(3);
            for mut v in [left_end, apex, right_end] {
                layout.write(writer, &mut v);
                wing.append(v)?;
            }
            layout.segment(writer.sink(), &wing[0], &wing[1]);
            layout.segment(writer.sink(), &wing[1], &wing[2]);
            return Ok(());
        }

        // Both wings stop where their inner sides meet.
        let inner = apex.right;
        let left_join = layout.sample(inner + left_perpendicular(in_dir) * layout.half, in_dir);
        let right_join = layout.sample(inner + left_perpendicular(out_dir) * layout.half, out_dir);

        let mut wing = pools.strokes.acquire(4);
        for mut v in [left_end, left_join, right_join, right_end] {
            layout.write(writer, &mut v);
            wing.append(v)?;
        }
        layout.segment(writer.sink(), &wing[0], &wing[1]);
        layout.segment(writer.sink(), &wing[2], &wing[3]);

        // Round the outer side between the two wings.
        let (from, to) = (&wing[1], &wing[2]);
        let curve = QuadraticBezier::new(from.left, apex.left, to.left);
        let curve_aa = QuadraticBezier::new(from.left_aa, apex.left_aa, to.left_aa);
        let mid = from.left.lerp(to.left, 0.5);
        let center = (writer.push_main(mid), mid);

        let steps = self.smoothness.max(1);
        let mut prev = (
            (from.left_index, from.left),
            (from.left_aa_index, from.left_aa),
        );
        for j in 1..=steps {
            let cur = if j == steps {
                ((to.left_index, to.left), (to.left_aa_index, to.left_aa))
            } else {
                let t = j as f32 / steps as f32;
                let p = curve.point(t);
                let node = (writer.push_main(p), p);
                let aa = if layout.has_aa() {
                    let pa = curve_aa.point(t);
                    (writer.push_main_transparent(pa), pa)
                } else {
                    node
                };
                (node, aa)
            };

            let sink = writer.sink();
            oriented_triangle(sink, center, prev.0, cur.0);
            if layout.has_aa() {
                oriented_quad(sink, prev.0, cur.0, prev.1, cur.1);
            }
            prev = cur;
        }

        // The gap between the rounded chord and the inner corner.
        oriented_triangle(
            writer.sink(),
            (from.left_index, from.left),
            (to.left_index, to.left),
            (from.right_index, from.right),
        );

        layout.round_cap(writer, &wing[0], true);
        layout.round_cap(writer, &wing[3], false);
        Ok(())
    }
}

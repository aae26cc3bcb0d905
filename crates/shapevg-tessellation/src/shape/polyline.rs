use std::f32::consts::PI;

use shapevg_core::math::{
    bounds, left_perpendicular, normalize_or_zero, radians, rotate, vector, Box2D, Point, Vector,
};
use shapevg_mesh::MeshSink;
use smallvec::{smallvec, SmallVec};

use super::ending::Ending;
use super::ShapeBuilder;
use crate::budget::ShapeBudget;
use crate::curve::{ArcLengthTable, CubicBezier};
use crate::dash::DashPattern;
use crate::emitter::{oriented_quad, oriented_triangle};
use crate::error::{ensure_at_least, ensure_bounds, ensure_range, TessellationError};
use crate::fill::Fill;
use crate::ring::VertexWriter;
use crate::tessellation::BufferPools;
use crate::uv::UvRect;

/// Segments of a semicircular stroke cap.
const CAP_SEGMENTS: u32 = 10;

const START_NAMES: [&str; 3] = ["start.angle", "start.length", "start.smoothness"];
const END_NAMES: [&str; 3] = ["end.angle", "end.length", "end.smoothness"];

/// A point the stroke passes through.
///
/// In spline mode the curve from one knot to the next uses `next_tangent` of
/// the first and `prev_tangent` of the second as control points. A missing
/// tangent falls back to the knot position.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Knot {
    pub position: Point,
    pub prev_tangent: Option<Point>,
    pub next_tangent: Option<Point>,
}

impl Knot {
    pub const fn new(position: Point) -> Self {
        Self {
            position,
            prev_tangent: None,
            next_tangent: None,
        }
    }

    pub const fn with_tangents(
        position: Point,
        prev_tangent: Option<Point>,
        next_tangent: Option<Point>,
    ) -> Self {
        Self {
            position,
            prev_tangent,
            next_tangent,
        }
    }
}

/// One sample of a stroke with the positions of its two sides.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct StrokeVertex {
    pub center: Point,
    /// Unit travel direction.
    pub direction: Vector,
    pub left: Point,
    pub right: Point,
    pub left_aa: Point,
    pub right_aa: Point,

    pub center_index: u32,
    pub left_index: u32,
    pub right_index: u32,
    pub left_aa_index: u32,
    pub right_aa_index: u32,
}

impl StrokeVertex {
    /// `half` and `half_aa` are the distances of the solid and the faded
    /// boundaries from the center line.
    pub fn new(center: Point, direction: Vector, half: f32, half_aa: f32) -> Self {
        let side = left_perpendicular(direction);
        Self {
            center,
            direction,
            left: center + side * half,
            right: center - side * half,
            left_aa: center + side * half_aa,
            right_aa: center - side * half_aa,
            ..Default::default()
        }
    }

    fn left_node(&self) -> (u32, Point) {
        (self.left_index, self.left)
    }

    fn right_node(&self) -> (u32, Point) {
        (self.right_index, self.right)
    }

    fn left_aa_node(&self) -> (u32, Point) {
        (self.left_aa_index, self.left_aa)
    }

    fn right_aa_node(&self) -> (u32, Point) {
        (self.right_aa_index, self.right_aa)
    }
}

/// The vertex layout and triangle patterns shared by the stroke body and the
/// endings.
#[derive(Debug, Clone, Copy)]
pub(super) struct StrokeLayout {
    pub half: f32,
    /// Width of the faded skirt on both sides.
    pub aa: f32,
    /// Whether records carry a center vertex for round caps.
    pub rounded: bool,
}

impl StrokeLayout {
    pub fn has_aa(self) -> bool {
        self.aa > 0.0
    }

    pub fn half_aa(self) -> f32 {
        self.half + self.aa
    }

    pub fn vertices_per_record(self) -> usize {
        2 + usize::from(self.rounded) + 2 * usize::from(self.has_aa())
    }

    pub fn segment_triangles(self) -> usize {
        if self.has_aa() {
            6
        } else {
            2
        }
    }

    pub fn cap_budget(self) -> ShapeBudget {
        let inner = CAP_SEGMENTS as usize - 1;
        let segments = CAP_SEGMENTS as usize;
        if self.has_aa() {
            ShapeBudget::mesh(2 * inner, 3 * segments)
        } else {
            ShapeBudget::mesh(inner, segments)
        }
    }

    pub fn sample(self, center: Point, direction: Vector) -> StrokeVertex {
        StrokeVertex::new(center, direction, self.half, self.half_aa())
    }

    pub fn write<S: MeshSink>(self, writer: &mut VertexWriter<'_, S>, v: &mut StrokeVertex) {
        if self.rounded {
            v.center_index = writer.push_main(v.center);
        }
        v.left_index = writer.push_main(v.left);
        v.right_index = writer.push_main(v.right);
        if self.has_aa() {
            v.left_aa_index = writer.push_main_transparent(v.left_aa);
            v.right_aa_index = writer.push_main_transparent(v.right_aa);
        }
    }

    /// The solid quad between two samples and its skirts.
    pub fn segment<S: MeshSink>(self, sink: &mut S, prev: &StrokeVertex, cur: &StrokeVertex) {
        oriented_quad(
            sink,
            prev.left_node(),
            cur.left_node(),
            prev.right_node(),
            cur.right_node(),
        );
        if self.has_aa() {
            oriented_quad(
                sink,
                prev.left_aa_node(),
                cur.left_aa_node(),
                prev.left_node(),
                cur.left_node(),
            );
            oriented_quad(
                sink,
                prev.right_node(),
                cur.right_node(),
                prev.right_aa_node(),
                cur.right_aa_node(),
            );
        }
    }

    /// A semicircle around `v.center`, behind the sample when `start` is set
    /// and ahead of it otherwise. `v` must have a center vertex.
    pub fn round_cap<S: MeshSink>(
        self,
        writer: &mut VertexWriter<'_, S>,
        v: &StrokeVertex,
        start: bool,
    ) {
        let (first, last) = if start {
            ((v.left_node(), v.left_aa_node()), (v.right_node(), v.right_aa_node()))
        } else {
            ((v.right_node(), v.right_aa_node()), (v.left_node(), v.left_aa_node()))
        };

        let from = first.0 .1 - v.center;
        let radius = from.length();
        let radius_aa = (first.1 .1 - v.center).length();
        let dir = normalize_or_zero(from);
        let step = PI / CAP_SEGMENTS as f32;
        let center = (v.center_index, v.center);

        let mut prev = first;
        for j in 1..=CAP_SEGMENTS {
            let cur = if j == CAP_SEGMENTS {
                last
            } else {
                let r = rotate(dir, radians(step * j as f32));
                let p = v.center + r * radius;
                let node = (writer.push_main(p), p);
                let aa = if self.has_aa() {
                    let pa = v.center + r * radius_aa;
                    (writer.push_main_transparent(pa), pa)
                } else {
                    node
                };
                (node, aa)
            };

            let sink = writer.sink();
            oriented_triangle(sink, center, prev.0, cur.0);
            if self.has_aa() {
                oriented_quad(sink, prev.0, cur.0, prev.1, cur.1);
            }
            prev = cur;
        }
    }
}

/// A stroke through two or more knots, with optional arrow endings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polyline {
    pub knots: SmallVec<[Knot; 4]>,
    /// Interpolate cubic curves between knots instead of straight lines.
    pub spline: bool,
    pub thickness: f32,
    /// Width of the faded skirt on both sides. `0.0` disables it.
    pub anti_aliasing: f32,
    /// Segments per knot pair.
    pub segments: u32,
    /// Round caps on the path ends and dash boundaries, and rounded hollow
    /// arrow tips.
    pub rounded: bool,
    /// Only draw the endings.
    pub endings_only: bool,
    pub dash: Option<DashPattern>,
    pub start: Ending,
    pub end: Ending,
    pub fill: Fill,
    /// The rect texture coordinates and gradients are laid out in.
    pub bounds: Box2D,
    pub sprite_uv: Option<UvRect>,
}

impl Default for Polyline {
    fn default() -> Self {
        Self {
            knots: smallvec![
                Knot::new(Point::new(-30.0, 0.0)),
                Knot::new(Point::new(30.0, 0.0))
            ],
            spline: false,
            thickness: 1.0,
            anti_aliasing: 0.0,
            segments: 1,
            rounded: false,
            endings_only: false,
            dash: None,
            start: Ending::default(),
            end: Ending::default(),
            fill: Fill::default(),
            bounds: bounds(-50.0, -50.0, 50.0, 50.0),
            sprite_uv: None,
        }
    }
}

impl Polyline {
    pub fn new(knots: impl IntoIterator<Item = Knot>, thickness: f32) -> Self {
        Self {
            knots: knots.into_iter().collect(),
            thickness,
            ..Default::default()
        }
    }

    /// A copy with knot positions and tangents moved from `old` to `new`,
    /// keeping their position relative to the rect.
    pub fn rescaled(&self, old: Box2D, new: Box2D) -> Self {
        let (w, h) = (old.width(), old.height());
        if w <= 0.0 || h <= 0.0 {
            log::warn!("cannot rescale knots from an empty rect");
            return Self {
                bounds: new,
                ..self.clone()
            };
        }

        let scale = vector(new.width() / w, new.height() / h);
        let map = |p: Point| new.min + (p - old.min).component_mul(scale);
        Self {
            knots: self
                .knots
                .iter()
                .map(|k| Knot {
                    position: map(k.position),
                    prev_tangent: k.prev_tangent.map(map),
                    next_tangent: k.next_tangent.map(map),
                })
                .collect(),
            bounds: new,
            ..self.clone()
        }
    }

    fn layout(&self) -> StrokeLayout {
        StrokeLayout {
            half: self.thickness * 0.5,
            aa: self.anti_aliasing,
            rounded: self.rounded,
        }
    }

    fn pairs(&self) -> usize {
        self.knots.len().saturating_sub(1)
    }

    fn records(&self) -> usize {
        self.pairs() * (self.segments as usize + 1)
    }

    fn body_dash(&self) -> Option<DashPattern> {
        self.dash.filter(|d| !d.is_solid())
    }

    /// How far the body is pulled back from the first and last knot of the
    /// pair to make room for the endings.
    fn pair_offsets(&self, pair: usize) -> (f32, f32) {
        let start = if pair == 0 {
            self.start.offset(self.thickness)
        } else {
            0.0
        };
        let end = if pair + 1 == self.pairs() {
            self.end.offset(self.thickness)
        } else {
            0.0
        };
        (start, end)
    }

    fn curve(&self, pair: usize) -> CubicBezier {
        let (a, b) = (&self.knots[pair], &self.knots[pair + 1]);
        CubicBezier::new(
            a.position,
            a.next_tangent.unwrap_or(a.position),
            b.prev_tangent.unwrap_or(b.position),
            b.position,
        )
    }
}

/// Points away from the body, towards `tip`.
fn ending_direction(tip: Point, near: Point, far: Point) -> Vector {
    let d = tip - near;
    if d.square_length() > 1e-12 {
        normalize_or_zero(d)
    } else {
        normalize_or_zero(near - far)
    }
}

impl ShapeBuilder for Polyline {
    fn validate(&self) -> Result<(), TessellationError> {
        ensure_bounds(&self.bounds)?;
        if self.knots.len() < 2 {
            return Err(TessellationError::ShapeDegenerate(
                "a stroke needs at least two knots",
            ));
        }
        if !(self.thickness > 0.0) {
            return Err(TessellationError::ShapeDegenerate(
                "stroke thickness must be positive",
            ));
        }
        ensure_range("thickness", self.thickness, 0.0..=f32::MAX)?;
        ensure_range("anti_aliasing", self.anti_aliasing, 0.0..=f32::MAX)?;
        ensure_at_least("segments", self.segments, 1)?;
        for knot in &self.knots {
            ensure_range("knot.x", knot.position.x, f32::MIN..=f32::MAX)?;
            ensure_range("knot.y", knot.position.y, f32::MIN..=f32::MAX)?;
        }
        if self.knots.windows(2).any(|w| w[0].position == w[1].position) {
            return Err(TessellationError::ShapeDegenerate("coincident knots"));
        }
        if let Some(dash) = &self.dash {
            dash.validate()?;
        }
        self.start.validate(START_NAMES)?;
        self.end.validate(END_NAMES)?;

        for pair in 0..self.pairs() {
            let (start, end) = self.pair_offsets(pair);
            let chord = (self.knots[pair + 1].position - self.knots[pair].position).length();
            if chord - start - end <= 0.0 {
                return Err(TessellationError::ShapeDegenerate(
                    "stroke is shorter than its endings",
                ));
            }
        }
        Ok(())
    }

    fn budget(&self) -> ShapeBudget {
        let layout = self.layout();
        let records = self.records();
        let mut budget = ShapeBudget::new(records, 0, 0);

        if !self.endings_only {
            budget.vertices += records * layout.vertices_per_record();
            let dash = self.body_dash();
            for s in 1..records {
                let s = s as i64;
                if !dash.map_or(true, |d| d.is_drawn(s)) {
                    continue;
                }
                budget.triangles += layout.segment_triangles();
                if let (Some(d), true) = (dash, self.rounded) {
                    if d.is_dash_start(s) {
                        budget += layout.cap_budget();
                    }
                    if d.is_dash_end(s) {
                        budget += layout.cap_budget();
                    }
                }
            }
            if self.rounded && dash.is_none() {
                if !self.start.is_some() {
                    budget += layout.cap_budget();
                }
                if !self.end.is_some() {
                    budget += layout.cap_budget();
                }
            }
        }

        budget + self.start.budget(layout) + self.end.budget(layout)
    }

    fn build<S: MeshSink>(
        &self,
        pools: &BufferPools,
        sink: &mut S,
    ) -> Result<(), TessellationError> {
        let layout = self.layout();
        let segments = self.segments as usize;
        let pairs = self.pairs();
        let mut writer =
            VertexWriter::single(sink, &self.fill, self.bounds, self.bounds.center(), self.sprite_uv);

        let mut body = pools.strokes.acquire(self.records());
        for pair in 0..pairs {
            let (start_offset, end_offset) = self.pair_offsets(pair);
            let curve = self.curve(pair);
            let chord = normalize_or_zero(curve.to - curve.from);
            let lut = if self.spline {
                Some(ArcLengthTable::build(
                    &curve,
                    pools.lut_precision(),
                    &pools.lengths,
                )?)
            } else {
                None
            };
            let length = match &lut {
                Some(lut) => lut.total_length(),
                None => (curve.to - curve.from).length(),
            };
            let step = (length - start_offset - end_offset) / segments as f32;

            for i in 0..=segments {
                let distance = start_offset + step * i as f32;
                let (center, direction) = match &lut {
                    Some(lut) => {
                        let t = lut.parameter_at_distance(distance);
                        let p = curve.point(t);
                        // Pin the pulled back ends to the chord from the knot.
                        let p = if i == 0 {
                            curve.from + normalize_or_zero(p - curve.from) * start_offset
                        } else if i == segments {
                            curve.to + normalize_or_zero(p - curve.to) * end_offset
                        } else {
                            p
                        };
                        (p, curve.tangent(t))
                    }
                    None => (curve.from + chord * distance, chord),
                };

                let mut v = layout.sample(center, direction);
                if !self.endings_only {
                    layout.write(&mut writer, &mut v);
                }
                body.append(v)?;
            }
        }

        if !self.endings_only {
            let dash = self.body_dash();
            for s in 1..body.len() {
                let (prev, cur) = (&body[s - 1], &body[s]);
                let segment = s as i64;
                if !dash.map_or(true, |d| d.is_drawn(segment)) {
                    continue;
                }
                layout.segment(writer.sink(), prev, cur);

                if let (Some(d), true) = (dash, self.rounded) {
                    if d.is_dash_start(segment) {
                        layout.round_cap(&mut writer, prev, true);
                    }
                    if d.is_dash_end(segment) {
                        layout.round_cap(&mut writer, cur, false);
                    }
                }
            }

            if self.rounded && dash.is_none() {
                if !self.start.is_some() {
                    layout.round_cap(&mut writer, &body[0], true);
                }
                if !self.end.is_some() {
                    layout.round_cap(&mut writer, &body[body.len() - 1], false);
                }
            }
        }

        let n = body.len();
        if self.start.is_some() {
            let tip = self.knots[0].position;
            let direction = ending_direction(tip, body[0].center, body[1].center);
            self.start.build(pools, &mut writer, tip, direction, layout)?;
        }
        if self.end.is_some() {
            let tip = self.knots[self.knots.len() - 1].position;
            let direction = ending_direction(tip, body[n - 1].center, body[n - 2].center);
            self.end.build(pools, &mut writer, tip, direction, layout)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::EndingKind;
    use shapevg_core::math::point;
    use shapevg_mesh::ShapeMesh;

    fn line(from: Point, to: Point, thickness: f32) -> Polyline {
        Polyline::new([Knot::new(from), Knot::new(to)], thickness)
    }

    fn build(shape: &Polyline) -> ShapeMesh {
        let mut mesh = ShapeMesh::new();
        shape.validate().unwrap();
        shape.build(&BufferPools::new(), &mut mesh).unwrap();
        let budget = shape.budget();
        assert_eq!(budget.vertices, mesh.vertices.len(), "{shape:?}");
        assert_eq!(budget.triangles, mesh.triangle_count(), "{shape:?}");
        for [a, b, c] in mesh.triangles() {
            let p = |i: u32| mesh.vertices[i as usize].position();
            assert!((p(b) - p(a)).cross(p(c) - p(a)) >= -1e-4);
        }
        mesh
    }

    #[test]
    fn straight_line_is_offset_by_half_the_thickness() {
        let mesh = build(&line(point(0.0, 0.0), point(10.0, 0.0), 2.0));
        let positions: Vec<[f32; 2]> = mesh.vertices.iter().map(|v| v.position).collect();
        assert_eq!(
            positions,
            vec![[0.0, 1.0], [0.0, -1.0], [10.0, 1.0], [10.0, -1.0]]
        );
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn dashes_skip_segments() {
        let shape = Polyline {
            segments: 6,
            dash: Some(DashPattern::new(1, 1, 0)),
            ..line(point(0.0, 0.0), point(60.0, 0.0), 2.0)
        };
        let mesh = build(&shape);
        assert_eq!(mesh.triangle_count(), 3 * 2);
    }

    #[test]
    fn rounded_ends_get_semicircles() {
        let shape = Polyline {
            rounded: true,
            anti_aliasing: 1.0,
            ..line(point(0.0, 0.0), point(10.0, 0.0), 4.0)
        };
        let mesh = build(&shape);
        // 2 records of 5 vertices, 2 caps of 9 arc points with skirts.
        assert_eq!(mesh.vertices.len(), 2 * 5 + 2 * 18);
        assert_eq!(mesh.triangle_count(), 6 + 2 * 30);

        let behind = mesh
            .vertices
            .iter()
            .map(|v| v.position().x)
            .fold(f32::MAX, f32::min);
        assert!((behind + 3.0).abs() < 1e-4);
    }

    #[test]
    fn rounded_dashes_cap_every_run() {
        let shape = Polyline {
            rounded: true,
            segments: 8,
            dash: Some(DashPattern::new(2, 2, 0)),
            ..line(point(0.0, 0.0), point(80.0, 0.0), 2.0)
        };
        build(&shape);
        assert_eq!(shape.budget().triangles, 4 * 2 + 4 * 10);
    }

    #[test]
    fn multi_knot_path_has_a_sample_run_per_pair() {
        let shape = Polyline {
            segments: 3,
            ..Polyline::new(
                [
                    Knot::new(point(0.0, 0.0)),
                    Knot::new(point(30.0, 0.0)),
                    Knot::new(point(30.0, 30.0)),
                ],
                2.0,
            )
        };
        assert_eq!(shape.budget().ring_records, 8);
        build(&shape);
    }

    #[test]
    fn spline_samples_are_evenly_spaced() {
        let shape = Polyline {
            spline: true,
            segments: 10,
            ..Polyline::new(
                [
                    Knot::with_tangents(point(0.0, 0.0), None, Some(point(0.0, 60.0))),
                    Knot::with_tangents(point(100.0, 0.0), Some(point(100.0, 60.0)), None),
                ],
                2.0,
            )
        };
        let mesh = build(&shape);
        let centers: Vec<Point> = mesh
            .vertices
            .chunks(2)
            .map(|pair| pair[0].position().lerp(pair[1].position(), 0.5))
            .collect();
        assert_eq!(centers.len(), 11);
        assert!((centers[0] - point(0.0, 0.0)).length() < 1e-4);
        assert!((centers[10] - point(100.0, 0.0)).length() < 1e-3);

        let steps: Vec<f32> = centers.windows(2).map(|w| (w[1] - w[0]).length()).collect();
        let mean = steps.iter().sum::<f32>() / steps.len() as f32;
        for step in steps {
            assert!((step - mean).abs() < mean * 0.05, "{step} vs {mean}");
        }
    }

    #[test]
    fn arrow_endings_pull_the_body_back() {
        let shape = Polyline {
            end: Ending {
                kind: EndingKind::FilledArrow,
                angle: 60.0,
                length: 10.0,
                ..Default::default()
            },
            anti_aliasing: 0.5,
            ..line(point(0.0, 0.0), point(100.0, 0.0), 2.0)
        };
        let mesh = build(&shape);
        let offset = 10.0 * 30f32.to_radians().cos();
        // The last body record sits at the base of the arrow head.
        let base = mesh.vertices[5].position();
        assert!((base.x - (100.0 - offset)).abs() < 1e-3, "{base:?}");
    }

    #[test]
    fn hollow_arrows_in_every_style() {
        for rounded in [false, true] {
            for aa in [0.0, 1.0] {
                let shape = Polyline {
                    rounded,
                    anti_aliasing: aa,
                    start: Ending {
                        kind: EndingKind::Arrow,
                        smoothness: 6,
                        ..Default::default()
                    },
                    end: Ending {
                        kind: EndingKind::Arrow,
                        ..Default::default()
                    },
                    ..line(point(0.0, 0.0), point(100.0, 40.0), 3.0)
                };
                build(&shape);
            }
        }
    }

    #[test]
    fn endings_only_skips_the_body() {
        let shape = Polyline {
            endings_only: true,
            end: Ending {
                kind: EndingKind::FilledArrow,
                ..Default::default()
            },
            ..line(point(0.0, 0.0), point(100.0, 0.0), 2.0)
        };
        let mesh = build(&shape);
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn rescaling_keeps_relative_positions() {
        let shape = Polyline {
            knots: smallvec![
                Knot::with_tangents(point(10.0, 10.0), None, Some(point(20.0, 0.0))),
                Knot::new(point(100.0, 50.0)),
            ],
            bounds: bounds(0.0, 0.0, 100.0, 50.0),
            ..Default::default()
        };
        let scaled = shape.rescaled(shape.bounds, bounds(0.0, 0.0, 200.0, 200.0));
        assert_eq!(scaled.knots[0].position, point(20.0, 40.0));
        assert_eq!(scaled.knots[0].next_tangent, Some(point(40.0, 0.0)));
        assert_eq!(scaled.knots[1].position, point(200.0, 200.0));
        assert_eq!(scaled.bounds, bounds(0.0, 0.0, 200.0, 200.0));
    }

    #[test]
    fn degenerate_strokes_are_rejected() {
        let single = Polyline::new([Knot::new(point(0.0, 0.0))], 1.0);
        assert!(matches!(
            single.validate(),
            Err(TessellationError::ShapeDegenerate(_))
        ));

        let flat = line(point(0.0, 0.0), point(10.0, 0.0), 0.0);
        assert!(matches!(
            flat.validate(),
            Err(TessellationError::ShapeDegenerate(_))
        ));

        let same = line(point(5.0, 5.0), point(5.0, 5.0), 1.0);
        assert!(matches!(
            same.validate(),
            Err(TessellationError::ShapeDegenerate(_))
        ));
    }
}

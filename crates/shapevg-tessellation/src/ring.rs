//! Shared pieces of every closed or open outline: the per-vertex band
//! offsets and the writer that turns ring records into mesh vertices.

use bitflags::bitflags;

use shapevg_core::color::PackedSrgb;
use shapevg_core::math::{right_perpendicular, Box2D, Point, Vector};
use shapevg_mesh::MeshSink;

use crate::curve::QuadraticBezier;
use crate::dash::DashPattern;
use crate::error::{ensure_range, TessellationError};
use crate::fill::{ColorEvaluator, Fill};
use crate::uv::{uv_at, UvRect};

/// Which parts of a shape are drawn.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RingMode {
    /// Only the interior.
    #[default]
    Fill,
    /// Only a band of the given thickness along the outline.
    Edge,
    /// The interior in the main fill, bordered by the edge band.
    EdgeAndFill,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EdgeThickness {
    /// In logical points.
    Absolute(f32),
    /// A fraction `0.0..=1.0` of half the smaller side of the bounds.
    Relative(f32),
}

impl EdgeThickness {
    pub fn resolve(&self, half_smaller_side: f32) -> f32 {
        match *self {
            Self::Absolute(t) => t,
            Self::Relative(f) => f * half_smaller_side,
        }
    }
}

impl Default for EdgeThickness {
    fn default() -> Self {
        Self::Absolute(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeSpec {
    pub thickness: EdgeThickness,
    pub fill: Fill,
    /// Width of the soft transition on the inner side of the edge.
    pub inner_aa: f32,
}

impl Default for EdgeSpec {
    fn default() -> Self {
        Self {
            thickness: EdgeThickness::default(),
            fill: Fill::Solid(PackedSrgb::BLACK),
            inner_aa: 0.0,
        }
    }
}

/// The look of a ring-based shape.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RingStyle {
    pub mode: RingMode,
    pub fill: Fill,
    pub edge: EdgeSpec,
    /// Width of the transparent skirt outside the outline. `0.0` disables it.
    pub anti_aliasing: f32,
    /// Only applies to the edge band.
    pub dash: Option<DashPattern>,
    pub sprite_uv: Option<UvRect>,
}

impl RingStyle {
    pub fn validate(&self) -> Result<(), TessellationError> {
        ensure_range("anti_aliasing", self.anti_aliasing, 0.0..=f32::MAX)?;
        ensure_range("edge.inner_aa", self.edge.inner_aa, 0.0..=f32::MAX)?;
        match self.edge.thickness {
            EdgeThickness::Absolute(t) => ensure_range("edge.thickness", t, 0.0..=f32::MAX)?,
            EdgeThickness::Relative(f) => ensure_range("edge.thickness", f, 0.0..=1.0)?,
        }
        if let Some(dash) = &self.dash {
            dash.validate()?;
        }
        Ok(())
    }

    pub fn bands(&self) -> Bands {
        Bands::new(self.mode, self.anti_aliasing > 0.0)
    }

    /// The dash pattern if it actually hides something.
    pub(crate) fn effective_dash(&self) -> Option<DashPattern> {
        match self.mode {
            RingMode::Fill => None,
            _ => self.dash.filter(|d| !d.is_solid()),
        }
    }
}

bitflags! {
    /// The bands emitted for each ring record.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Bands: u8 {
        /// Triangles covering the interior.
        const FILL = 1 << 0;
        /// The edge band and the skirt on its inner side.
        const EDGE = 1 << 1;
        /// The transparent skirt outside the outline.
        const OUTER_AA = 1 << 2;
    }
}

impl Bands {
    pub fn new(mode: RingMode, outer_aa: bool) -> Self {
        let mut bands = match mode {
            RingMode::Fill => Self::FILL,
            RingMode::Edge => Self::EDGE,
            RingMode::EdgeAndFill => Self::FILL | Self::EDGE,
        };
        bands.set(Self::OUTER_AA, outer_aa);
        bands
    }

    pub fn vertices_per_record(self) -> usize {
        let mut n = 1;
        if self.contains(Self::EDGE) {
            n += 2;
        }
        if self.contains(Self::OUTER_AA) {
            n += 1;
        }
        n
    }
}

/// Distances of the band boundaries from the outline, all non-negative.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct BandOffsets {
    /// Outwards.
    pub outer_aa: f32,
    /// Inwards, to the inner side of the edge band.
    pub edge: f32,
    /// Inwards, to the inner side of the inner skirt.
    pub inner_depth: f32,
}

impl BandOffsets {
    pub fn resolve(style: &RingStyle, half_smaller_side: f32) -> Self {
        let mut edge = style.edge.thickness.resolve(half_smaller_side).max(0.0);
        if style.mode != RingMode::Fill && edge > half_smaller_side {
            log::warn!("edge thickness {edge} is wider than the shape, clamping to {half_smaller_side}");
            edge = half_smaller_side;
        }

        let inner_depth = match style.mode {
            RingMode::Fill => 0.0,
            _ => (edge + style.edge.inner_aa.max(0.0)).min(half_smaller_side.max(edge)),
        };

        Self {
            outer_aa: style.anti_aliasing.max(0.0),
            edge: if style.mode == RingMode::Fill { 0.0 } else { edge },
            inner_depth,
        }
    }
}

/// One sample of an outline and the positions of its band boundaries.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RingVertex {
    pub position: Point,
    pub edge_position: Point,
    pub inner_aa_position: Point,
    pub outer_aa_position: Point,

    pub index: u32,
    pub edge_index: u32,
    pub inner_aa_index: u32,
    pub outer_aa_index: u32,
}

impl RingVertex {
    pub fn new(
        position: Point,
        edge_position: Point,
        inner_aa_position: Point,
        outer_aa_position: Point,
    ) -> Self {
        Self {
            position,
            edge_position,
            inner_aa_position,
            outer_aa_position,
            ..Default::default()
        }
    }

    /// Places the band boundaries along `outward`.
    ///
    /// `outward` is usually a unit normal. At sharp corners pass a
    /// [`miter`] so the bands keep their width along both sides.
    pub fn along(position: Point, outward: Vector, offsets: &BandOffsets) -> Self {
        Self::new(
            position,
            position - outward * offsets.edge,
            position - outward * offsets.inner_depth,
            position + outward * offsets.outer_aa,
        )
    }
}

/// The outward offset direction at a corner between two unit normals, scaled
/// so that offsetting by `d` moves both adjacent sides by `d`.
pub fn miter(n1: Vector, n2: Vector) -> Vector {
    let denom = 1.0 + n1.dot(n2);
    if denom < 1e-3 {
        return n1;
    }
    (n1 + n2) / denom
}

/// The outward miter at `cur` for an outline travelling counter-clockwise
/// from `prev` through `cur` to `next`.
pub fn corner_miter(prev: Point, cur: Point, next: Point) -> Vector {
    let n1 = right_perpendicular(shapevg_core::math::normalize_or_zero(cur - prev));
    let n2 = right_perpendicular(shapevg_core::math::normalize_or_zero(next - cur));
    miter(n1, n2)
}

/// Samples a rounded corner as a quadratic curve from `start` to `end` with
/// `corner` as control point. Yields `segments + 1` points, each with the
/// outward unit normal of a counter-clockwise outline.
pub fn corner_join(
    start: Point,
    corner: Point,
    end: Point,
    segments: u32,
) -> impl Iterator<Item = (Point, Vector)> {
    let curve = QuadraticBezier::new(start, corner, end);
    let segments = segments.max(1);
    (0..=segments).map(move |j| {
        let t = j as f32 / segments as f32;
        (curve.point(t), right_perpendicular(curve.tangent(t)))
    })
}

/// Appends mesh vertices, resolving colors and texture coordinates.
pub struct VertexWriter<'a, S> {
    sink: &'a mut S,
    main: ColorEvaluator<'a>,
    edge: ColorEvaluator<'a>,
    bounds: Box2D,
    sprite_uv: Option<UvRect>,
}

impl<'a, S: MeshSink> VertexWriter<'a, S> {
    /// `center` is where radial gradients start.
    pub fn new(sink: &'a mut S, style: &'a RingStyle, bounds: Box2D, center: Point) -> Self {
        Self {
            sink,
            main: ColorEvaluator::new(&style.fill, bounds, center),
            edge: ColorEvaluator::new(&style.edge.fill, bounds, center),
            bounds,
            sprite_uv: style.sprite_uv,
        }
    }

    /// A writer for shapes that only have a single fill.
    pub fn single(
        sink: &'a mut S,
        fill: &'a Fill,
        bounds: Box2D,
        center: Point,
        sprite_uv: Option<UvRect>,
    ) -> Self {
        let eval = ColorEvaluator::new(fill, bounds, center);
        Self {
            sink,
            main: eval,
            edge: eval,
            bounds,
            sprite_uv,
        }
    }

    pub fn sink(&mut self) -> &mut S {
        &mut *self.sink
    }

    pub fn push(&mut self, p: Point, color: PackedSrgb) -> u32 {
        let uv = uv_at(p, &self.bounds, self.sprite_uv.as_ref());
        self.sink.add_vertex(p, color, uv)
    }

    pub fn push_main(&mut self, p: Point) -> u32 {
        let color = self.main.color_at(p);
        self.push(p, color)
    }

    pub fn push_main_transparent(&mut self, p: Point) -> u32 {
        let color = self.main.color_at(p).with_alpha(0.0);
        self.push(p, color)
    }

    pub fn push_edge(&mut self, p: Point) -> u32 {
        let color = self.edge.color_at(p);
        self.push(p, color)
    }

    pub fn push_edge_transparent(&mut self, p: Point) -> u32 {
        let color = self.edge.color_at(p).with_alpha(0.0);
        self.push(p, color)
    }

    /// Emits the mesh vertices of a ring record and stores their indices.
    pub fn write_ring_vertex(&mut self, v: &mut RingVertex, bands: Bands) {
        if bands.contains(Bands::EDGE) {
            v.index = self.push_edge(v.position);
            v.edge_index = self.push_edge(v.edge_position);
            v.inner_aa_index = if bands.contains(Bands::FILL) {
                self.push_main(v.inner_aa_position)
            } else {
                self.push_edge_transparent(v.inner_aa_position)
            };
            if bands.contains(Bands::OUTER_AA) {
                v.outer_aa_index = self.push_edge_transparent(v.outer_aa_position);
            }
        } else {
            v.index = self.push_main(v.position);
            v.edge_index = v.index;
            v.inner_aa_index = v.index;
            if bands.contains(Bands::OUTER_AA) {
                v.outer_aa_index = self.push_main_transparent(v.outer_aa_position);
            }
        }
    }
}

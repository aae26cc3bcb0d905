//! The shape parameter models and their ring builders.

use shapevg_core::math::{Box2D, Point};
use shapevg_mesh::MeshSink;

use crate::budget::ShapeBudget;
use crate::emitter::{FanAnchor, RingEmitter};
use crate::error::TessellationError;
use crate::ring::{RingStyle, RingVertex, VertexWriter};
use crate::tessellation::BufferPools;

mod curved_inside_rect;
mod curved_rect;
mod ellipse;
mod ending;
mod inversed_ellipse;
mod polyline;
mod rounded_rect;
mod smooth_sunburst;
mod sunburst;
mod triangle;

pub use curved_inside_rect::CurvedInsideRect;
pub use curved_rect::{CurveKey, CurvedRect, KeyframeCurve};
pub use ellipse::Ellipse;
pub use ending::{Ending, EndingKind};
pub use inversed_ellipse::InversedEllipse;
pub use polyline::{Knot, Polyline, StrokeVertex};
pub use rounded_rect::{CornerRadii, RoundedRect};
pub use smooth_sunburst::SmoothSunburst;
pub use sunburst::Sunburst;
pub use triangle::{Triangle, TriangleRounding};

/// A parameter model that knows how to turn itself into triangles.
pub trait ShapeBuilder {
    /// Checks the parameters without producing anything.
    fn validate(&self) -> Result<(), TessellationError>;

    /// The exact amount of geometry [`build`](Self::build) produces.
    fn budget(&self) -> ShapeBudget;

    /// Appends the mesh to `sink`. Parameters must have been validated.
    fn build<S: MeshSink>(&self, pools: &BufferPools, sink: &mut S)
        -> Result<(), TessellationError>;
}

/// Any of the supported shapes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shape {
    Ellipse(Ellipse),
    RoundedRect(RoundedRect),
    Sunburst(Sunburst),
    SmoothSunburst(SmoothSunburst),
    Triangle(Triangle),
    CurvedRect(CurvedRect),
    CurvedInsideRect(CurvedInsideRect),
    InversedEllipse(InversedEllipse),
    Polyline(Polyline),
}

macro_rules! dispatch {
    ($self:expr, $shape:ident => $body:expr) => {
        match $self {
            Shape::Ellipse($shape) => $body,
            Shape::RoundedRect($shape) => $body,
            Shape::Sunburst($shape) => $body,
            Shape::SmoothSunburst($shape) => $body,
            Shape::Triangle($shape) => $body,
            Shape::CurvedRect($shape) => $body,
            Shape::CurvedInsideRect($shape) => $body,
            Shape::InversedEllipse($shape) => $body,
            Shape::Polyline($shape) => $body,
        }
    };
}

impl Shape {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ellipse(_) => "ellipse",
            Self::RoundedRect(_) => "rounded rect",
            Self::Sunburst(_) => "sunburst",
            Self::SmoothSunburst(_) => "smooth sunburst",
            Self::Triangle(_) => "triangle",
            Self::CurvedRect(_) => "curved rect",
            Self::CurvedInsideRect(_) => "curved inside rect",
            Self::InversedEllipse(_) => "inversed ellipse",
            Self::Polyline(_) => "polyline",
        }
    }
}

impl ShapeBuilder for Shape {
    fn validate(&self) -> Result<(), TessellationError> {
        dispatch!(self, s => s.validate())
    }

    fn budget(&self) -> ShapeBudget {
        dispatch!(self, s => s.budget())
    }

    fn build<S: MeshSink>(
        &self,
        pools: &BufferPools,
        sink: &mut S,
    ) -> Result<(), TessellationError> {
        dispatch!(self, s => s.build(pools, sink))
    }
}

macro_rules! impl_from_shape {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Shape {
                fn from(shape: $variant) -> Self {
                    Self::$variant(shape)
                }
            }
        )*
    };
}

impl_from_shape!(
    Ellipse,
    RoundedRect,
    Sunburst,
    SmoothSunburst,
    Triangle,
    CurvedRect,
    CurvedInsideRect,
    InversedEllipse,
    Polyline
);

/// Writes a ring of `records` samples and connects it with `emitter`.
///
/// `center` is the origin of radial gradients and, for a
/// [`FanAnchor::Center`] emitter, the position of the fan vertex.
#[allow(clippy::too_many_arguments)]
pub(crate) fn build_ring<S: MeshSink>(
    pools: &BufferPools,
    sink: &mut S,
    style: &RingStyle,
    bounds: Box2D,
    center: Point,
    emitter: RingEmitter,
    records: usize,
    samples: impl IntoIterator<Item = RingVertex>,
) -> Result<(), TessellationError> {
    let mut ring = pools.rings.acquire(records);
    let mut writer = VertexWriter::new(sink, style, bounds, center);

    let emitter = match emitter.fan {
        FanAnchor::Center(_) => emitter.with_fan(FanAnchor::Center(writer.push_main(center))),
        _ => emitter,
    };

    for mut v in samples {
        writer.write_ring_vertex(&mut v, emitter.bands);
        ring.append(v)?;
    }

    emitter.emit(&mut writer, &ring);
    Ok(())
}

/// The rectangle a radial shape is laid out in.
pub(crate) fn radial_bounds(bounds: Box2D, keep_circle: bool) -> Box2D {
    if keep_circle {
        shapevg_core::math::square_about_center(bounds)
    } else {
        bounds
    }
}

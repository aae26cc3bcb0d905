use shapevg_core::color::{PackedSrgb, RGB8, RGBA8};
use shapevg_core::math::{Box2D, Point};

#[cfg(feature = "gradient")]
use shapevg_core::gradient::{Gradient, GradientKind, RadialMode};

/// The coloring style of a shape or of its edge.
///
/// By default, it is set to [`Fill::Solid`] with opaque white.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Fill {
    /// A solid [`PackedSrgb`] color.
    Solid(PackedSrgb),

    #[cfg(feature = "gradient")]
    /// A [`Gradient`] evaluated per vertex.
    Gradient(Gradient),
}

impl Default for Fill {
    fn default() -> Self {
        Self::Solid(PackedSrgb::WHITE)
    }
}

impl From<PackedSrgb> for Fill {
    fn from(color: PackedSrgb) -> Self {
        Self::Solid(color)
    }
}

impl From<RGB8> for Fill {
    fn from(color: RGB8) -> Self {
        Self::Solid(color.into())
    }
}

impl From<RGBA8> for Fill {
    fn from(color: RGBA8) -> Self {
        Self::Solid(color.into())
    }
}

#[cfg(feature = "gradient")]
impl From<Gradient> for Fill {
    fn from(gradient: Gradient) -> Self {
        Self::Gradient(gradient)
    }
}

/// Resolves the color of a [`Fill`] at any position of a shape.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(not(feature = "gradient"), allow(dead_code))]
pub struct ColorEvaluator<'a> {
    fill: &'a Fill,
    bounds: Box2D,
    center: Point,
    max_radius: f32,
}

impl<'a> ColorEvaluator<'a> {
    /// `center` is where radial gradients start. The radius spans to the
    /// corner of `bounds` farthest from it.
    pub fn new(fill: &'a Fill, bounds: Box2D, center: Point) -> Self {
        Self {
            fill,
            bounds,
            center,
            max_radius: shapevg_core::math::farthest_corner_distance(bounds, center),
        }
    }

    pub fn color_at(&self, p: Point) -> PackedSrgb {
        match self.fill {
            Fill::Solid(color) => *color,
            #[cfg(feature = "gradient")]
            Fill::Gradient(gradient) => gradient.evaluate(self.gradient_t(gradient, p)),
        }
    }

    #[cfg(feature = "gradient")]
    fn gradient_t(&self, gradient: &Gradient, p: Point) -> f32 {
        let ratio = |num: f32, den: f32| if den > 0.0 { num / den } else { 0.0 };

        match gradient.kind {
            GradientKind::Horizontal => ratio(p.x - self.bounds.min.x, self.bounds.width()),
            GradientKind::Vertical => ratio(p.y - self.bounds.min.y, self.bounds.height()),
            GradientKind::Radial => match gradient.radial_mode {
                RadialMode::Distance => ratio((p - self.center).length(), self.max_radius),
                RadialMode::CenterStep => {
                    if (p - self.center).square_length() <= f32::EPSILON {
                        0.0
                    } else {
                        1.0
                    }
                }
            },
        }
    }
}

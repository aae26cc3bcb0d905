use std::cmp::Ordering;

use super::color::PackedSrgb;

pub const MAX_STOPS: usize = 8;

/// The axis along which a [`Gradient`] is sampled.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GradientKind {
    /// `t` grows from the left edge of the bounds to the right edge.
    #[default]
    Horizontal,
    /// `t` grows from the bottom edge of the bounds to the top edge.
    Vertical,
    /// `t` grows with the distance from the center of the shape.
    Radial,
}

/// How a [`GradientKind::Radial`] gradient maps a position to `t`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RadialMode {
    /// `t = clamp01(distance_to_center / max_radius)`.
    #[default]
    Distance,
    /// `t = 0` exactly at the center and `t = 1` everywhere else.
    ///
    /// This reproduces the look of older meshes where only the center vertex
    /// of a fan received the inner color.
    CenterStep,
}

/// A point along the gradient where the specified [`color`] is unmixed.
///
/// [`color`]: Self::color
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorStop {
    /// Offset along the gradient in the range `[0.0, 1.0]`.
    pub offset: f32,

    /// The color of the gradient at the specified [`offset`].
    ///
    /// [`offset`]: Self::offset
    pub color: PackedSrgb,
}

/// A fill which transitions colors progressively along an axis or away from
/// a center point.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gradient {
    pub kind: GradientKind,
    pub radial_mode: RadialMode,
    /// [`ColorStop`]s sorted by offset. Unused slots are `None` and always
    /// come after the used ones.
    pub stops: [Option<ColorStop>; MAX_STOPS],
}

impl Gradient {
    pub const fn new(kind: GradientKind) -> Self {
        Self {
            kind,
            radial_mode: RadialMode::Distance,
            stops: [None; MAX_STOPS],
        }
    }

    pub const fn horizontal() -> Self {
        Self::new(GradientKind::Horizontal)
    }

    pub const fn vertical() -> Self {
        Self::new(GradientKind::Vertical)
    }

    pub const fn radial() -> Self {
        Self::new(GradientKind::Radial)
    }

    pub const fn with_radial_mode(mut self, mode: RadialMode) -> Self {
        self.radial_mode = mode;
        self
    }

    /// Adds a new [`ColorStop`], defined by an offset and a color, to the gradient.
    ///
    /// Any `offset` that is not within `0.0..=1.0` will be ignored with a warning.
    ///
    /// Any stop added after the 8th will be ignored with a warning.
    pub fn add_stop(mut self, offset: f32, color: impl Into<PackedSrgb>) -> Self {
        if !(offset.is_finite() && (0.0..=1.0).contains(&offset)) {
            log::warn!("Gradient color stop must be within 0.0..=1.0 range, got {offset}.");
            return self;
        }

        if self.stops[MAX_STOPS - 1].is_some() {
            log::warn!("Gradient already holds {MAX_STOPS} color stops, ignoring stop at {offset}.");
            return self;
        }

        let (Ok(index) | Err(index)) = self.stops.binary_search_by(|stop| match stop {
            None => Ordering::Greater,
            Some(stop) => stop.offset.total_cmp(&offset),
        });

        self.stops[index..].rotate_right(1);
        self.stops[index] = Some(ColorStop {
            offset,
            color: color.into(),
        });

        self
    }

    /// Samples the gradient at `t`, clamped to `0.0..=1.0`.
    ///
    /// A gradient without stops is opaque white.
    pub fn evaluate(&self, t: f32) -> PackedSrgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        let mut stops = self.stops.iter().flatten();
        let Some(first) = stops.next() else {
            return PackedSrgb::WHITE;
        };

        if t <= first.offset {
            return first.color;
        }

        let mut prev = first;
        for stop in stops {
            if t <= stop.offset {
                let span = stop.offset - prev.offset;
                if span <= f32::EPSILON {
                    return stop.color;
                }
                return prev.color.lerp(stop.color, (t - prev.offset) / span);
            }
            prev = stop;
        }

        prev.color
    }
}

impl Default for Gradient {
    fn default() -> Self {
        Self::horizontal()
    }
}

use std::f32::consts::FRAC_PI_2;

use shapevg_core::math::{bounds, radians, rotate, smaller_side, vector, Box2D, Point, Vector};
use shapevg_mesh::MeshSink;

use super::{build_ring, ShapeBuilder};
use crate::budget::ShapeBudget;
use crate::emitter::{FanAnchor, RingEmitter};
use crate::error::{ensure_at_least, ensure_bounds, ensure_range, TessellationError};
use crate::ring::{BandOffsets, RingStyle, RingVertex};
use crate::tessellation::BufferPools;

/// Corner radii as fractions `0.0..=0.5` of the shorter side of the rect.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CornerRadii {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_right: f32,
    pub bottom_left: f32,
    /// Segments per rounded corner.
    pub quality: u32,
}

impl CornerRadii {
    pub const fn uniform(radius: f32, quality: u32) -> Self {
        Self {
            top_left: radius,
            top_right: radius,
            bottom_right: radius,
            bottom_left: radius,
            quality,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.top_left == 0.0
            && self.top_right == 0.0
            && self.bottom_right == 0.0
            && self.bottom_left == 0.0
    }
}

impl Default for CornerRadii {
    fn default() -> Self {
        Self::uniform(0.0, 4)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundedRect {
    pub bounds: Box2D,
    pub radii: CornerRadii,
    pub style: RingStyle,
}

impl Default for RoundedRect {
    fn default() -> Self {
        Self {
            bounds: bounds(0.0, 0.0, 100.0, 100.0),
            radii: CornerRadii::default(),
            style: RingStyle::default(),
        }
    }
}

/// A corner of the outline in counter-clockwise order, starting bottom-right.
#[derive(Clone, Copy)]
struct Corner {
    point: Point,
    /// Outward diagonal of the sharp corner.
    miter: Vector,
    radius: f32,
    /// Angle of the first arc point around the rounding center.
    start: f32,
}

impl RoundedRect {
    pub fn new(bounds: Box2D, radii: CornerRadii) -> Self {
        Self {
            bounds,
            radii,
            ..Default::default()
        }
    }

    fn corners(&self) -> [Corner; 4] {
        let b = &self.bounds;
        let side = smaller_side(*b);
        let r = |f: f32| f.clamp(0.0, 0.5) * side;
        [
            Corner {
                point: Point::new(b.max.x, b.min.y),
                miter: vector(1.0, -1.0),
                radius: r(self.radii.bottom_right),
                start: -FRAC_PI_2,
            },
            Corner {
                point: b.max,
                miter: vector(1.0, 1.0),
                radius: r(self.radii.top_right),
                start: 0.0,
            },
            Corner {
                point: Point::new(b.min.x, b.max.y),
                miter: vector(-1.0, 1.0),
                radius: r(self.radii.top_left),
                start: FRAC_PI_2,
            },
            Corner {
                point: b.min,
                miter: vector(-1.0, -1.0),
                radius: r(self.radii.bottom_left),
                start: 2.0 * FRAC_PI_2,
            },
        ]
    }

    fn records(&self) -> usize {
        self.corners()
            .iter()
            .map(|c| {
                if c.radius > 0.0 {
                    self.radii.quality as usize + 1
                } else {
                    1
                }
            })
            .sum()
    }

    fn emitter(&self) -> RingEmitter {
        let fan = if self.radii.is_zero() {
            FanAnchor::Polygon
        } else {
            FanAnchor::Center(0)
        };
        RingEmitter::new(&self.style, true, fan)
    }
}

impl ShapeBuilder for RoundedRect {
    fn validate(&self) -> Result<(), TessellationError> {
        ensure_bounds(&self.bounds)?;
        ensure_range("radii.top_left", self.radii.top_left, 0.0..=0.5)?;
        ensure_range("radii.top_right", self.radii.top_right, 0.0..=0.5)?;
        ensure_range("radii.bottom_right", self.radii.bottom_right, 0.0..=0.5)?;
        ensure_range("radii.bottom_left", self.radii.bottom_left, 0.0..=0.5)?;
        ensure_at_least("radii.quality", self.radii.quality, 1)?;
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
        let offsets = BandOffsets::resolve(&self.style, smaller_side(self.bounds) * 0.5);
        let quality = self.radii.quality.max(1);
        let step = FRAC_PI_2 / quality as f32;

        let samples = self.corners().into_iter().flat_map(move |corner| {
            let count = if corner.radius > 0.0 { quality + 1 } else { 1 };
            (0..count).map(move |j| {
                if corner.radius <= 0.0 {
                    return RingVertex::along(corner.point, corner.miter, &offsets);
                }
                // Rotate the first anchor around the rounding center.
                let center = corner.point - corner.miter * corner.radius;
                let radial = rotate(
                    vector(corner.radius, 0.0),
                    radians(corner.start + step * j as f32),
                );
                RingVertex::along(center + radial, radial / corner.radius, &offsets)
            })
        });

        build_ring(
            pools,
            sink,
            &self.style,
            self.bounds,
            self.bounds.center(),
            self.emitter(),
            self.records(),
            samples,
        )
    }
}

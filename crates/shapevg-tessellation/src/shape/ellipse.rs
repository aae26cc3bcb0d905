use std::f32::consts::TAU;

use shapevg_core::math::{bounds, degrees, Box2D, Point, Vector};
use shapevg_mesh::MeshSink;

use super::{build_ring, radial_bounds, ShapeBuilder};
use crate::budget::ShapeBudget;
use crate::emitter::{FanAnchor, RingEmitter};
use crate::error::{ensure_at_least, ensure_bounds, ensure_range, TessellationError};
use crate::ring::{BandOffsets, RingStyle, RingVertex};
use crate::tessellation::BufferPools;

/// An ellipse inscribed in `bounds`, approximated by `hull_sections` points.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ellipse {
    pub bounds: Box2D,
    pub hull_sections: u32,
    /// Angle of the first hull point in degrees, counter-clockwise from +x.
    pub start_angle: f32,
    /// Use a circle inscribed in the shorter side instead.
    pub keep_circle: bool,
    pub style: RingStyle,
}

impl Default for Ellipse {
    fn default() -> Self {
        Self {
            bounds: bounds(0.0, 0.0, 100.0, 100.0),
            hull_sections: 40,
            start_angle: 0.0,
            keep_circle: false,
            style: RingStyle::default(),
        }
    }
}

impl Ellipse {
    pub fn new(bounds: Box2D, hull_sections: u32) -> Self {
        Self {
            bounds,
            hull_sections,
            ..Default::default()
        }
    }

    fn emitter(&self) -> RingEmitter {
        RingEmitter::new(&self.style, true, FanAnchor::Center(0))
    }
}

/// Scales a per-axis half size by `d` along `dir`, never crossing the center.
fn radial(center: Point, half: Vector, dir: Vector, d: f32) -> Point {
    center + Vector::new((half.x + d).max(0.0) * dir.x, (half.y + d).max(0.0) * dir.y)
}

impl ShapeBuilder for Ellipse {
    fn validate(&self) -> Result<(), TessellationError> {
        ensure_bounds(&self.bounds)?;
        ensure_at_least("hull_sections", self.hull_sections, 3)?;
        ensure_range("start_angle", self.start_angle, f32::MIN..=f32::MAX)?;
        self.style.validate()
    }

    fn budget(&self) -> ShapeBudget {
        self.emitter().budget(self.hull_sections as usize)
    }

    fn build<S: MeshSink>(
        &self,
        pools: &BufferPools,
        sink: &mut S,
    ) -> Result<(), TessellationError> {
        let layout = radial_bounds(self.bounds, self.keep_circle);
        let center = layout.center();
        let half = layout.size().to_vector() * 0.5;
        let offsets = BandOffsets::resolve(&self.style, half.x.min(half.y));

        let n = self.hull_sections as usize;
        let start = degrees(self.start_angle).radians;
        let step = TAU / n as f32;

        let samples = (0..n).map(|i| {
            let (sin, cos) = (start + step * i as f32).sin_cos();
            let dir = Vector::new(cos, sin);
            RingVertex::new(
                radial(center, half, dir, 0.0),
                radial(center, half, dir, -offsets.edge),
                radial(center, half, dir, -offsets.inner_depth),
                radial(center, half, dir, offsets.outer_aa),
            )
        });

        build_ring(
            pools,
            sink,
            &self.style,
            self.bounds,
            center,
            self.emitter(),
            n,
            samples,
        )
    }
}

use std::f32::consts::PI;

use shapevg_core::math::{bounds, degrees, Box2D, Point, Vector};
use shapevg_mesh::MeshSink;

use super::{build_ring, radial_bounds, ShapeBuilder};
use crate::budget::ShapeBudget;
use crate::emitter::{FanAnchor, RingEmitter};
use crate::error::{ensure_at_least, ensure_bounds, ensure_range, TessellationError};
use crate::ring::{corner_miter, BandOffsets, RingStyle, RingVertex};
use crate::tessellation::BufferPools;

/// A star with straight sides alternating between an inner and an outer
/// radius.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sunburst {
    pub bounds: Box2D,
    pub peaks: u32,
    /// Radius of the valleys as a fraction `0.0..=1.0` of the half size.
    pub inner_factor: f32,
    /// Radius of the peaks as a fraction `1.0..=2.0` of the half size.
    pub outer_factor: f32,
    /// Degrees, counter-clockwise from +x.
    pub start_angle: f32,
    pub keep_circle: bool,
    pub style: RingStyle,
}

impl Default for Sunburst {
    fn default() -> Self {
        Self {
            bounds: bounds(0.0, 0.0, 100.0, 100.0),
            peaks: 10,
            inner_factor: 1.0,
            outer_factor: 1.0,
            start_angle: 0.0,
            keep_circle: false,
            style: RingStyle::default(),
        }
    }
}

impl Sunburst {
    pub fn new(bounds: Box2D, peaks: u32, inner_factor: f32, outer_factor: f32) -> Self {
        Self {
            bounds,
            peaks,
            inner_factor,
            outer_factor,
            ..Default::default()
        }
    }

    fn sections(&self) -> usize {
        self.peaks as usize * 2
    }

    fn emitter(&self) -> RingEmitter {
        RingEmitter::new(&self.style, true, FanAnchor::Center(0))
    }
}

/// Evenly spaced star points, even indices on the inner radius.
pub(super) struct StarLayout {
    pub center: Point,
    pub half: Vector,
    pub start: f32,
    pub step: f32,
    pub inner_factor: f32,
    pub outer_factor: f32,
    pub sections: usize,
}

impl StarLayout {
    pub fn new(
        bounds: Box2D,
        keep_circle: bool,
        peaks: u32,
        start_angle: f32,
        inner_factor: f32,
        outer_factor: f32,
    ) -> Self {
        let layout = radial_bounds(bounds, keep_circle);
        Self {
            center: layout.center(),
            half: layout.size().to_vector() * 0.5,
            start: degrees(start_angle).radians,
            step: PI / peaks as f32,
            inner_factor,
            outer_factor,
            sections: peaks as usize * 2,
        }
    }

    pub fn direction(&self, i: usize) -> Vector {
        let (sin, cos) = (self.start + self.step * i as f32).sin_cos();
        Vector::new(cos, sin)
    }

    pub fn half_at(&self, i: usize) -> Vector {
        let factor = if i % 2 == 0 {
            self.inner_factor
        } else {
            self.outer_factor
        };
        self.half * factor
    }

    pub fn point(&self, i: usize) -> Point {
        let i = i % self.sections;
        self.center + self.half_at(i).component_mul(self.direction(i))
    }
}

impl ShapeBuilder for Sunburst {
    fn validate(&self) -> Result<(), TessellationError> {
        ensure_bounds(&self.bounds)?;
        ensure_at_least("peaks", self.peaks, 2)?;
        ensure_range("inner_factor", self.inner_factor, 0.0..=1.0)?;
        ensure_range("outer_factor", self.outer_factor, 1.0..=2.0)?;
        ensure_range("start_angle", self.start_angle, f32::MIN..=f32::MAX)?;
        self.style.validate()
    }

    fn budget(&self) -> ShapeBudget {
        self.emitter().budget(self.sections())
    }

    fn build<S: MeshSink>(
        &self,
        pools: &BufferPools,
        sink: &mut S,
    ) -> Result<(), TessellationError> {
        let star = StarLayout::new(
            self.bounds,
            self.keep_circle,
            self.peaks,
            self.start_angle,
            self.inner_factor,
            self.outer_factor,
        );
        let offsets = BandOffsets::resolve(&self.style, star.half.x.min(star.half.y));
        let n = star.sections;

        let samples = (0..n).map(|i| {
            let cur = star.point(i);
            let outward = corner_miter(star.point(i + n - 1), cur, star.point(i + 1));
            RingVertex::along(cur, outward, &offsets)
        });

        build_ring(
            pools,
            sink,
            &self.style,
            self.bounds,
            star.center,
            self.emitter(),
            n,
            samples,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapevg_mesh::ShapeMesh;

    #[test]
    fn five_peaks() {
        let sunburst = Sunburst::new(bounds(0.0, 0.0, 100.0, 100.0), 5, 0.5, 1.0);
        let mut mesh = ShapeMesh::new();
        sunburst.build(&BufferPools::new(), &mut mesh).unwrap();
        assert_eq!(mesh.vertices.len(), 11);
        assert_eq!(mesh.triangle_count(), 10);

        let radius = |i: usize| (mesh.vertices[i + 1].position() - Point::new(50.0, 50.0)).length();
        assert!((radius(0) - 25.0).abs() < 1e-3);
        assert!((radius(1) - 50.0).abs() < 1e-3);
    }

    #[test]
    fn factors_are_range_checked() {
        let mut s = Sunburst::new(bounds(0.0, 0.0, 10.0, 10.0), 5, 0.5, 2.5);
        assert!(s.validate().is_err());
        s.outer_factor = 2.0;
        s.inner_factor = -0.1;
        assert!(s.validate().is_err());
        s.inner_factor = 0.0;
        assert!(s.validate().is_ok());
    }
}

use shapevg_core::math::{
    bounds, left_perpendicular, normalize_or_zero, right_perpendicular, Box2D, Vector,
};
use shapevg_mesh::MeshSink;

use super::sunburst::StarLayout;
use super::{build_ring, ShapeBuilder};
use crate::budget::ShapeBudget;
use crate::curve::CubicBezier;
use crate::emitter::{FanAnchor, RingEmitter};
use crate::error::{ensure_at_least, ensure_bounds, ensure_range, TessellationError};
use crate::ring::{BandOffsets, RingStyle, RingVertex};
use crate::tessellation::BufferPools;

/// A sunburst whose sides are cubic curves from each peak to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SmoothSunburst {
    pub bounds: Box2D,
    pub peaks: u32,
    pub inner_factor: f32,
    pub outer_factor: f32,
    /// Moves the control points next to valleys away from the center, as a
    /// fraction `-1.0..=1.0` of the difference between the two radii.
    pub inner_shift: f32,
    /// Same as `inner_shift`, for the control points next to peaks.
    pub outer_shift: f32,
    /// Moves the control points next to valleys sideways, as a fraction
    /// `-1.0..=1.0` of the valley half size.
    pub inner_shift_perp: f32,
    pub outer_shift_perp: f32,
    /// Samples per curve.
    pub smoothness: u32,
    pub start_angle: f32,
    pub keep_circle: bool,
    pub style: RingStyle,
}

impl Default for SmoothSunburst {
    fn default() -> Self {
        Self {
            bounds: bounds(0.0, 0.0, 100.0, 100.0),
            peaks: 10,
            inner_factor: 1.0,
            outer_factor: 1.0,
            inner_shift: 0.0,
            outer_shift: 0.0,
            inner_shift_perp: 0.0,
            outer_shift_perp: 0.0,
            smoothness: 10,
            start_angle: 0.0,
            keep_circle: false,
            style: RingStyle::default(),
        }
    }
}

impl SmoothSunburst {
    fn records(&self) -> usize {
        self.peaks as usize * 2 * self.smoothness as usize
    }

    fn emitter(&self) -> RingEmitter {
        RingEmitter::new(&self.style, true, FanAnchor::Center(0))
    }

    /// The curve from section `i` to section `i + 1`.
    fn section_curve(&self, star: &StarLayout, i: usize) -> CubicBezier {
        let next = i + 1;
        let even = i % 2 == 0;

        let peak = star.point(i);
        let next_peak = star.point(next);
        // Chord midpoints towards the same radius at the neighbouring angle.
        let mut ctrl1 = peak.lerp(
            star.center + star.half_at(i).component_mul(star.direction(next)),
            0.5,
        );
        let mut ctrl2 = next_peak.lerp(
            star.center + star.half_at(next).component_mul(star.direction(i)),
            0.5,
        );

        let diff = (star.half * star.outer_factor).length() - (star.half * star.inner_factor).length();
        let diff = diff.abs();
        let (shift, next_shift) = if even {
            (self.inner_shift, self.outer_shift)
        } else {
            (self.outer_shift, self.inner_shift)
        };
        let (perp, next_perp) = if even {
            (self.inner_shift_perp, self.outer_shift_perp)
        } else {
            (self.outer_shift_perp, self.inner_shift_perp)
        };

        let dir1 = normalize_or_zero(ctrl1 - star.center);
        let dir2 = normalize_or_zero(ctrl2 - star.center);
        ctrl1 += dir1 * (shift * diff);
        ctrl2 += dir2 * (next_shift * diff);
        ctrl1 -= left_perpendicular(dir1).component_mul(star.half_at(i) * perp);
        ctrl2 += left_perpendicular(dir2).component_mul(star.half_at(next) * next_perp);

        CubicBezier::new(peak, ctrl1, ctrl2, next_peak)
    }
}

impl ShapeBuilder for SmoothSunburst {
    fn validate(&self) -> Result<(), TessellationError> {
        ensure_bounds(&self.bounds)?;
        ensure_at_least("peaks", self.peaks, 3)?;
        ensure_at_least("smoothness", self.smoothness, 1)?;
        ensure_range("inner_factor", self.inner_factor, 0.0..=1.0)?;
        ensure_range("outer_factor", self.outer_factor, 1.0..=2.0)?;
        ensure_range("inner_shift", self.inner_shift, -1.0..=1.0)?;
        ensure_range("outer_shift", self.outer_shift, -1.0..=1.0)?;
        ensure_range("inner_shift_perp", self.inner_shift_perp, -1.0..=1.0)?;
        ensure_range("outer_shift_perp", self.outer_shift_perp, -1.0..=1.0)?;
        ensure_range("start_angle", self.start_angle, f32::MIN..=f32::MAX)?;
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
        let star = StarLayout::new(
            self.bounds,
            self.keep_circle,
            self.peaks,
            self.start_angle,
            self.inner_factor,
            self.outer_factor,
        );
        let offsets = BandOffsets::resolve(&self.style, star.half.x.min(star.half.y));
        let steps = self.smoothness as usize;

        let samples = (0..star.sections).flat_map(|i| {
            let curve = self.section_curve(&star, i);
            let radial = normalize_or_zero(curve.from - star.center);
            let offsets = &offsets;
            (0..steps).map(move |j| {
                let t = j as f32 / steps as f32;
                let outward = if j == 0 && radial != Vector::zero() {
                    radial
                } else {
                    right_perpendicular(curve.tangent(t))
                };
                RingVertex::along(curve.point(t), outward, offsets)
            })
        });

        build_ring(
            pools,
            sink,
            &self.style,
            self.bounds,
            star.center,
            self.emitter(),
            self.records(),
            samples,
        )
    }
}

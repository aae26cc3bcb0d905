//! Bézier curves and arc-length parametrization.

use shapevg_core::math::{normalize_or_zero, Point, Vector};

use crate::error::TessellationError;
use crate::pool::{BufferPool, Lease};

/// The number of samples used by [`ArcLengthTable`] when nothing else is
/// configured.
pub const DEFAULT_LUT_PRECISION: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub from: Point,
    pub ctrl1: Point,
    pub ctrl2: Point,
    pub to: Point,
}

impl CubicBezier {
    pub const fn new(from: Point, ctrl1: Point, ctrl2: Point, to: Point) -> Self {
        Self {
            from,
            ctrl1,
            ctrl2,
            to,
        }
    }

    pub fn point(&self, t: f32) -> Point {
        let u = 1.0 - t;
        let a = u * u * u;
        let b = 3.0 * u * u * t;
        let c = 3.0 * u * t * t;
        let d = t * t * t;
        Point::new(
            a * self.from.x + b * self.ctrl1.x + c * self.ctrl2.x + d * self.to.x,
            a * self.from.y + b * self.ctrl1.y + c * self.ctrl2.y + d * self.to.y,
        )
    }

    pub fn derivative(&self, t: f32) -> Vector {
        let u = 1.0 - t;
        (self.ctrl1 - self.from) * (3.0 * u * u)
            + (self.ctrl2 - self.ctrl1) * (6.0 * u * t)
            + (self.to - self.ctrl2) * (3.0 * t * t)
    }

    /// The unit direction of travel at `t`.
    ///
    /// Where the derivative vanishes (a control point sitting on an end point)
    /// the direction towards the next distinct control point is used instead.
    pub fn tangent(&self, t: f32) -> Vector {
        let d = normalize_or_zero(self.derivative(t));
        if d != Vector::zero() {
            return d;
        }

        let fallback = if t < 0.5 {
            self.ctrl2 - self.from
        } else {
            self.to - self.ctrl1
        };
        let d = normalize_or_zero(fallback);
        if d != Vector::zero() {
            return d;
        }

        normalize_or_zero(self.to - self.from)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticBezier {
    pub from: Point,
    pub ctrl: Point,
    pub to: Point,
}

impl QuadraticBezier {
    pub const fn new(from: Point, ctrl: Point, to: Point) -> Self {
        Self { from, ctrl, to }
    }

    pub fn point(&self, t: f32) -> Point {
        let u = 1.0 - t;
        let a = u * u;
        let b = 2.0 * u * t;
        let c = t * t;
        Point::new(
            a * self.from.x + b * self.ctrl.x + c * self.to.x,
            a * self.from.y + b * self.ctrl.y + c * self.to.y,
        )
    }

    pub fn derivative(&self, t: f32) -> Vector {
        (self.ctrl - self.from) * (2.0 * (1.0 - t)) + (self.to - self.ctrl) * (2.0 * t)
    }

    pub fn tangent(&self, t: f32) -> Vector {
        let d = normalize_or_zero(self.derivative(t));
        if d != Vector::zero() {
            d
        } else {
            normalize_or_zero(self.to - self.from)
        }
    }
}

/// Cumulative chord lengths of a cubic curve sampled at `precision + 1`
/// evenly spaced parameters.
///
/// The table lives in a pooled buffer and is handed back when dropped.
pub struct ArcLengthTable<'a> {
    lengths: Lease<'a, f32>,
}

impl<'a> ArcLengthTable<'a> {
    pub fn build(
        curve: &CubicBezier,
        precision: usize,
        pool: &'a BufferPool<f32>,
    ) -> Result<Self, TessellationError> {
        let precision = precision.max(1);
        let mut lengths = pool.acquire(precision + 1);

        lengths.append(0.0)?;
        let mut total = 0.0;
        let mut prev = curve.from;
        for i in 1..=precision {
            let p = curve.point(i as f32 / precision as f32);
            total += (p - prev).length();
            prev = p;
            lengths.append(total)?;
        }

        Ok(Self { lengths })
    }

    pub fn precision(&self) -> usize {
        self.lengths.len() - 1
    }

    pub fn total_length(&self) -> f32 {
        self.lengths.last().copied().unwrap_or(0.0)
    }

    pub fn lengths(&self) -> &[f32] {
        &self.lengths
    }

    /// Inverts the table: the curve parameter at which the traveled distance
    /// reaches `distance`.
    ///
    /// The result is linearly interpolated between the two bracketing samples
    /// and clamped to `0.0..=1.0`.
    pub fn parameter_at_distance(&self, distance: f32) -> f32 {
        let total = self.total_length();
        if !(distance > 0.0) || total <= 0.0 {
            return 0.0;
        }
        if distance >= total {
            return 1.0;
        }

        let n = self.precision();
        // lengths[0] == 0 < distance, so i >= 1.
        let i = self.lengths.partition_point(|&l| l < distance).clamp(1, n);
        let (lo, hi) = (self.lengths[i - 1], self.lengths[i]);
        let span = hi - lo;
        let ratio = if span > 0.0 {
            (distance - lo) / span
        } else {
            0.0
        };

        ((i - 1) as f32 + ratio) / n as f32
    }
}

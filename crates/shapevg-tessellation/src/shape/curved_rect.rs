use shapevg_core::math::{
    bounds, normalize_or_zero, right_perpendicular, smaller_side, Box2D, Point, Vector,
};
use shapevg_mesh::MeshSink;
use smallvec::{smallvec, SmallVec};

use super::{build_ring, ShapeBuilder};
use crate::budget::ShapeBudget;
use crate::emitter::{FanAnchor, RingEmitter};
use crate::error::{ensure_at_least, ensure_bounds, ensure_range, TessellationError};
use crate::ring::{BandOffsets, RingStyle, RingVertex};
use crate::tessellation::BufferPools;

const NORMAL_PROBE_DELTA: f32 = 0.001;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurveKey {
    pub time: f32,
    pub value: f32,
}

impl CurveKey {
    pub const fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// A piecewise-linear curve through keys sorted by time. Evaluation clamps to
/// the first and last key.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyframeCurve {
    keys: SmallVec<[CurveKey; 4]>,
}

impl KeyframeCurve {
    pub fn new(keys: impl IntoIterator<Item = CurveKey>) -> Self {
        let mut keys: SmallVec<[CurveKey; 4]> = keys.into_iter().collect();
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    /// A straight line from `(0, from)` to `(1, to)`.
    pub fn linear(from: f32, to: f32) -> Self {
        Self {
            keys: smallvec![CurveKey::new(0.0, from), CurveKey::new(1.0, to)],
        }
    }

    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    pub fn evaluate(&self, time: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        if time <= first.time {
            return first.value;
        }
        if time >= last.time {
            return last.value;
        }

        let i = self.keys.partition_point(|k| k.time <= time);
        let (a, b) = (self.keys[i - 1], self.keys[i]);
        let span = b.time - a.time;
        if span <= f32::EPSILON {
            return b.value;
        }
        a.value + (b.value - a.value) * ((time - a.time) / span)
    }

    pub fn validate(&self) -> Result<(), TessellationError> {
        if self.keys.is_empty() {
            return Err(TessellationError::ShapeDegenerate("curve has no keys"));
        }
        for key in &self.keys {
            ensure_range("curve.time", key.time, f32::MIN..=f32::MAX)?;
            ensure_range("curve.value", key.value, f32::MIN..=f32::MAX)?;
        }
        Ok(())
    }
}

impl Default for KeyframeCurve {
    fn default() -> Self {
        Self::linear(1.0, 0.0)
    }
}

/// A rect whose bottom side follows `curve`, mirrored about the vertical
/// center line.
///
/// The bottom boundary at relative position `u` of the left half is
/// `y = min.y + curve(u) * height`. The shape is filled up to the top side.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurvedRect {
    pub bounds: Box2D,
    pub curve: KeyframeCurve,
    /// Samples per half.
    pub quality: u32,
    pub style: RingStyle,
}

impl Default for CurvedRect {
    fn default() -> Self {
        Self {
            bounds: bounds(0.0, 0.0, 100.0, 100.0),
            curve: KeyframeCurve::default(),
            quality: 10,
            style: RingStyle::default(),
        }
    }
}

impl CurvedRect {
    pub fn new(bounds: Box2D, curve: KeyframeCurve, quality: u32) -> Self {
        Self {
            bounds,
            curve,
            quality,
            ..Default::default()
        }
    }

    /// The fan center and origin of radial gradients, in the middle of the top
    /// side.
    pub fn fan_center(&self) -> Point {
        Point::new(self.bounds.center().x, self.bounds.max.y)
    }

    fn records(&self) -> usize {
        2 * self.quality as usize - 1
    }

    fn emitter(&self) -> RingEmitter {
        RingEmitter::new(&self.style, false, FanAnchor::Center(0))
    }

    /// The boundary point at `probe` (`0.0` is the left end, `1.0` the right
    /// end) and its outward unit normal.
    pub fn position_and_normal(&self, probe: f32) -> (Point, Vector) {
        mirrored_position_and_normal(&self.bounds, &self.curve, probe)
    }
}

fn mirrored_position(bounds: &Box2D, curve: &KeyframeCurve, probe: f32) -> Point {
    let s = probe.clamp(0.0, 1.0);
    let u = if s <= 0.5 { s * 2.0 } else { (1.0 - s) * 2.0 };
    Point::new(
        bounds.min.x + s * bounds.width(),
        bounds.min.y + curve.evaluate(u) * bounds.height(),
    )
}

/// A point of `curve` mirrored about the vertical center line of `bounds`,
/// with the unit normal to the right of left-to-right travel (facing down on a
/// flat curve).
pub(crate) fn mirrored_position_and_normal(
    bounds: &Box2D,
    curve: &KeyframeCurve,
    probe: f32,
) -> (Point, Vector) {
    let lo = mirrored_position(bounds, curve, probe - NORMAL_PROBE_DELTA);
    let hi = mirrored_position(bounds, curve, probe + NORMAL_PROBE_DELTA);
    let normal = right_perpendicular(normalize_or_zero(hi - lo));
    (mirrored_position(bounds, curve, probe), normal)
}

impl ShapeBuilder for CurvedRect {
    fn validate(&self) -> Result<(), TessellationError> {
        ensure_bounds(&self.bounds)?;
        ensure_at_least("quality", self.quality, 2)?;
        self.curve.validate()?;
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
        let last = (self.records() - 1) as f32;

        let samples = (0..self.records()).map(|i| {
            let (p, normal) = self.position_and_normal(i as f32 / last);
            RingVertex::along(p, normal, &offsets)
        });

        build_ring(
            pools,
            sink,
            &self.style,
            self.bounds,
            self.fan_center(),
            self.emitter(),
            self.records(),
            samples,
        )
    }
}

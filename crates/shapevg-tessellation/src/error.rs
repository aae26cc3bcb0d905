use std::ops::RangeInclusive;

use shapevg_core::math::Box2D;

/// An error returned while tessellating a shape.
///
/// When any of these is returned the sink has been cleared and every pooled
/// buffer leased for the call has been given back.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TessellationError {
    #[error("shape is degenerate: {0}")]
    ShapeDegenerate(&'static str),

    #[error("pooled vertex buffer is full ({capacity} records)")]
    BufferCapacityExceeded { capacity: usize },

    #[error("parameter `{name}` is out of range: got {value}, expected {min}..={max}")]
    ParameterOutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
}

pub(crate) fn ensure_bounds(bounds: &Box2D) -> Result<(), TessellationError> {
    let (w, h) = (bounds.width(), bounds.height());
    if !(w.is_finite() && h.is_finite()) || w <= 0.0 || h <= 0.0 {
        return Err(TessellationError::ShapeDegenerate(
            "bounding rectangle has zero area",
        ));
    }
    Ok(())
}

pub(crate) fn ensure_range(
    name: &'static str,
    value: f32,
    range: RangeInclusive<f32>,
) -> Result<(), TessellationError> {
    if value.is_finite() && range.contains(&value) {
        Ok(())
    } else {
        Err(TessellationError::ParameterOutOfRange {
            name,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

pub(crate) fn ensure_at_least(
    name: &'static str,
    value: u32,
    min: u32,
) -> Result<(), TessellationError> {
    if value >= min {
        Ok(())
    } else {
        Err(TessellationError::ParameterOutOfRange {
            name,
            value: value as f32,
            min: min as f32,
            max: f32::INFINITY,
        })
    }
}

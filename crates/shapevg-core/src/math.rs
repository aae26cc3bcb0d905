//! Geometry aliases and small vector helpers.
//!
//! All shapes are laid out in a y-up space: `min.y` is the bottom edge of a
//! bounding box and angles grow counter-clockwise.

/// A point in units of logical points.
///
/// Alias for ```euclid::default::Point2D<f32>```.
pub type Point = euclid::default::Point2D<f32>;

/// A vector in units of logical points.
///
/// Alias for ```euclid::default::Vector2D<f32>```.
pub type Vector = euclid::default::Vector2D<f32>;

/// A size in units of logical points.
///
/// Alias for ```euclid::default::Size2D<f32>```.
pub type Size = euclid::default::Size2D<f32>;

/// An axis-aligned bounding box given by its min and max corners.
///
/// Alias for ```euclid::default::Box2D<f32>```
pub type Box2D = euclid::default::Box2D<f32>;

/// An angle in radians (f32).
///
/// Alias for ```euclid::Angle<f32>```
pub type Angle = euclid::Angle<f32>;

/// Shorthand for `Vector::new(x, y)`.
#[inline]
pub const fn vector(x: f32, y: f32) -> Vector {
    Vector::new(x, y)
}

/// Shorthand for `Point::new(x, y)`.
#[inline]
pub const fn point(x: f32, y: f32) -> Point {
    Point::new(x, y)
}

/// Shorthand for `Box2D::new(Point::new(min_x, min_y), Point::new(max_x, max_y))`.
#[inline]
pub const fn bounds(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Box2D {
    Box2D::new(Point::new(min_x, min_y), Point::new(max_x, max_y))
}

/// Shorthand for `Angle { radians: value }`.
#[inline]
pub const fn radians(radians: f32) -> Angle {
    Angle { radians }
}

/// Shorthand for `Angle { radians: value * PI / 180.0 }`.
#[inline]
pub fn degrees(degrees: f32) -> Angle {
    Angle {
        radians: degrees * (std::f32::consts::PI / 180.0),
    }
}

/// The vector rotated by 90 degrees counter-clockwise, `(-y, x)`.
#[inline]
pub fn left_perpendicular(v: Vector) -> Vector {
    Vector::new(-v.y, v.x)
}

/// The vector rotated by 90 degrees clockwise, `(y, -x)`.
#[inline]
pub fn right_perpendicular(v: Vector) -> Vector {
    Vector::new(v.y, -v.x)
}

/// Normalizes `v`, returning the zero vector when `v` is too short to have a
/// direction.
#[inline]
pub fn normalize_or_zero(v: Vector) -> Vector {
    let len = v.length();
    if len > 1e-6 {
        v / len
    } else {
        Vector::zero()
    }
}

/// Rotates `v` counter-clockwise by `angle`.
#[inline]
pub fn rotate(v: Vector, angle: Angle) -> Vector {
    let (sin, cos) = angle.radians.sin_cos();
    Vector::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Shrinks the longer side of `bounds` so that the box becomes a square
/// centered on the original center.
pub fn square_about_center(bounds: Box2D) -> Box2D {
    let half = smaller_side(bounds) * 0.5;
    let center = bounds.center();
    Box2D::new(
        Point::new(center.x - half, center.y - half),
        Point::new(center.x + half, center.y + half),
    )
}

/// The length of the shorter side of `bounds`.
#[inline]
pub fn smaller_side(bounds: Box2D) -> f32 {
    bounds.width().min(bounds.height())
}

/// Distance from `from` to the farthest corner of `bounds`.
pub fn farthest_corner_distance(bounds: Box2D, from: Point) -> f32 {
    let dx = (from.x - bounds.min.x).abs().max((bounds.max.x - from.x).abs());
    let dy = (from.y - bounds.min.y).abs().max((bounds.max.y - from.y).abs());
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perpendiculars_are_orthogonal() {
        let v = vector(3.0, 4.0);
        assert_eq!(left_perpendicular(v), vector(-4.0, 3.0));
        assert_eq!(right_perpendicular(v), vector(4.0, -3.0));
        assert_eq!(left_perpendicular(v).dot(v), 0.0);
    }

    #[test]
    fn rotate_quarter_turn() {
        let r = rotate(vector(1.0, 0.0), degrees(90.0));
        assert!((r.x).abs() < 1e-6);
        assert!((r.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn square_keeps_center() {
        let b = square_about_center(bounds(0.0, 0.0, 100.0, 40.0));
        assert_eq!(b.center(), point(50.0, 20.0));
        assert_eq!(b.width(), 40.0);
        assert_eq!(b.height(), 40.0);
    }

    #[test]
    fn normalize_zero_vector() {
        assert_eq!(normalize_or_zero(Vector::zero()), Vector::zero());
    }
}

use shapevg_core::math::{Box2D, Point};

/// The sub-rectangle of a texture atlas a shape samples from.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UvRect {
    pub bottom_left: Point,
    pub top_right: Point,
}

impl UvRect {
    /// The whole texture.
    pub const FULL: Self = Self {
        bottom_left: Point::new(0.0, 0.0),
        top_right: Point::new(1.0, 1.0),
    };

    pub const fn new(bottom_left: Point, top_right: Point) -> Self {
        Self {
            bottom_left,
            top_right,
        }
    }

    /// The bounding rectangle of a set of texture coordinates, as found in the
    /// vertices of a tightly packed sprite.
    pub fn enclosing(uvs: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut uvs = uvs.into_iter();
        let first = uvs.next()?;
        let (min, max) = uvs.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self::new(min, max))
    }

    /// Maps a normalized coordinate into this rectangle.
    pub fn map(&self, uv: Point) -> Point {
        self.bottom_left + (self.top_right - self.bottom_left).component_mul(uv.to_vector())
    }
}

impl Default for UvRect {
    fn default() -> Self {
        Self::FULL
    }
}

/// The texture coordinate of `p`: its position normalized to `bounds`,
/// remapped into `sprite` when there is one.
pub fn uv_at(p: Point, bounds: &Box2D, sprite: Option<&UvRect>) -> Point {
    let (w, h) = (bounds.width(), bounds.height());
    let u = if w > 0.0 { (p.x - bounds.min.x) / w } else { 0.0 };
    let v = if h > 0.0 { (p.y - bounds.min.y) / h } else { 0.0 };
    let uv = Point::new(u, v);
    match sprite {
        Some(rect) => rect.map(uv),
        None => uv,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapevg_core::math::{bounds, point};

    #[test]
    fn corners_map_to_unit_square() {
        let b = bounds(10.0, 20.0, 30.0, 60.0);
        assert_eq!(uv_at(point(10.0, 20.0), &b, None), point(0.0, 0.0));
        assert_eq!(uv_at(point(30.0, 60.0), &b, None), point(1.0, 1.0));
        assert_eq!(uv_at(point(20.0, 40.0), &b, None), point(0.5, 0.5));
    }

    #[test]
    fn sprite_rect_is_applied() {
        let b = bounds(0.0, 0.0, 10.0, 10.0);
        let sprite = UvRect::new(point(0.5, 0.25), point(1.0, 0.75));
        assert_eq!(uv_at(point(0.0, 0.0), &b, Some(&sprite)), point(0.5, 0.25));
        assert_eq!(uv_at(point(10.0, 10.0), &b, Some(&sprite)), point(1.0, 0.75));
        assert_eq!(uv_at(point(5.0, 5.0), &b, Some(&sprite)), point(0.75, 0.5));
    }

    #[test]
    fn enclosing_rect() {
        let r = UvRect::enclosing([point(0.2, 0.9), point(0.6, 0.1), point(0.4, 0.5)]).unwrap();
        assert_eq!(r, UvRect::new(point(0.2, 0.1), point(0.6, 0.9)));
        assert!(UvRect::enclosing(std::iter::empty()).is_none());
    }
}

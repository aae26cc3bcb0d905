use crate::error::{ensure_at_least, TessellationError};

/// A repeating on/off pattern over segment indices.
///
/// Segments are counted from `1`. For a period `P = dash_length + gap_length`
/// the phase of segment `i` is `(i - offset - 1) mod P`, so the pattern is
/// purely periodic and continues across the seam of a closed contour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DashPattern {
    /// How many consecutive segments are drawn. Must be at least 1.
    pub dash_length: u32,
    /// How many consecutive segments are skipped.
    pub gap_length: u32,
    /// Shifts the pattern forward by this many segments.
    pub offset: i32,
}

impl DashPattern {
    pub const fn new(dash_length: u32, gap_length: u32, offset: i32) -> Self {
        Self {
            dash_length,
            gap_length,
            offset,
        }
    }

    pub fn period(&self) -> i64 {
        i64::from(self.dash_length) + i64::from(self.gap_length)
    }

    pub fn phase(&self, segment: i64) -> i64 {
        let period = self.period();
        if period == 0 {
            return 0;
        }
        (segment - i64::from(self.offset) - 1).rem_euclid(period)
    }

    pub fn is_drawn(&self, segment: i64) -> bool {
        self.phase(segment) < i64::from(self.dash_length)
    }

    /// Whether `segment` is the first drawn segment of a dash.
    pub fn is_dash_start(&self, segment: i64) -> bool {
        self.is_drawn(segment) && self.phase(segment) == 0
    }

    /// Whether `segment` is the last drawn segment of a dash.
    pub fn is_dash_end(&self, segment: i64) -> bool {
        self.is_drawn(segment) && self.phase(segment) == i64::from(self.dash_length) - 1
    }

    /// A pattern without gaps draws everything.
    pub fn is_solid(&self) -> bool {
        self.gap_length == 0
    }

    pub fn validate(&self) -> Result<(), TessellationError> {
        ensure_at_least("dash_length", self.dash_length, 1)
    }
}

impl Default for DashPattern {
    fn default() -> Self {
        Self::new(1, 1, 0)
    }
}

//! This module re-exports the types from the [`rgb`](https://crates.io/crates/rgb) crate.

pub use rgb::*;

/// The color black with full opacity
pub const BLACK: RGBA8 = RGBA8 {
    r: 0,
    g: 0,
    b: 0,
    a: 255,
};
/// The color white with full opacity
pub const WHITE: RGBA8 = RGBA8 {
    r: 255,
    g: 255,
    b: 255,
    a: 255,
};
/// A color with no opacity
pub const TRANSPARENT: RGBA8 = RGBA8 {
    r: 0,
    g: 0,
    b: 0,
    a: 0,
};

/// A color packed as 4 floats representing RGBA channels in the `0.0..=1.0`
/// range.
///
/// Channels are kept in sRGB space and interpolated component-wise, the same
/// way vertex colors are blended by a UI renderer.
#[repr(C)]
#[derive(Default, Debug, Clone, Copy, PartialEq, bytemuck::Zeroable, bytemuck::Pod)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PackedSrgb(pub [f32; 4]);

impl PackedSrgb {
    /// The color black with full opacity
    pub const BLACK: Self = Self([0.0, 0.0, 0.0, 1.0]);
    /// The color white with full opacity
    pub const WHITE: Self = Self([1.0, 1.0, 1.0, 1.0]);
    /// A color with no opacity
    pub const TRANSPARENT: Self = Self([0.0, 0.0, 0.0, 0.0]);

    /// Creates a [`PackedSrgb`] from its SRGBA components.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self([r, g, b, a])
    }

    pub fn r(&self) -> f32 {
        self.0[0]
    }
    pub fn g(&self) -> f32 {
        self.0[1]
    }
    pub fn b(&self) -> f32 {
        self.0[2]
    }
    pub fn a(&self) -> f32 {
        self.0[3]
    }

    /// The same color with its alpha channel replaced.
    pub const fn with_alpha(self, a: f32) -> Self {
        Self([self.0[0], self.0[1], self.0[2], a])
    }

    /// Linear interpolation between `self` and `other`, channel by channel.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let mut out = self.0;
        for (c, o) in out.iter_mut().zip(other.0) {
            *c += (o - *c) * t;
        }
        Self(out)
    }
}

impl From<RGB8> for PackedSrgb {
    fn from(color: RGB8) -> Self {
        Self([
            f32::from(color.r) * (1.0 / 255.0),
            f32::from(color.g) * (1.0 / 255.0),
            f32::from(color.b) * (1.0 / 255.0),
            1.0,
        ])
    }
}

impl From<RGBA8> for PackedSrgb {
    fn from(color: RGBA8) -> Self {
        Self([
            f32::from(color.r) * (1.0 / 255.0),
            f32::from(color.g) * (1.0 / 255.0),
            f32::from(color.b) * (1.0 / 255.0),
            f32::from(color.a) * (1.0 / 255.0),
        ])
    }
}

impl From<[f32; 3]> for PackedSrgb {
    fn from(color: [f32; 3]) -> Self {
        Self([color[0], color[1], color[2], 1.0])
    }
}

impl From<[f32; 4]> for PackedSrgb {
    fn from(color: [f32; 4]) -> Self {
        Self(color)
    }
}

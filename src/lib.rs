//! Declarative 2D UI shapes tessellated into anti-aliased triangle meshes.
//!
//! ```
//! use shapevg::math::bounds;
//! use shapevg::tessellation::{shape::Ellipse, Tessellator};
//!
//! let mesh = Tessellator::new()
//!     .tessellate(&Ellipse::new(bounds(0.0, 0.0, 40.0, 20.0), 16).into())
//!     .unwrap();
//! assert_eq!(mesh.triangle_count(), 16);
//! ```

#[cfg(feature = "tessellation")]
mod graphic;

#[cfg(feature = "tessellation")]
pub use graphic::{GraphicId, GraphicStore, ShapeGraphic};

pub use shapevg_core::*;

#[cfg(any(feature = "mesh", feature = "tessellation"))]
pub use shapevg_mesh as mesh;

#[cfg(feature = "tessellation")]
pub use shapevg_tessellation as tessellation;

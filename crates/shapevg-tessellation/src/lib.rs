//! Turns declarative shape descriptions into anti-aliased triangle meshes.
//!
//! Coordinates are y-up and every emitted triangle winds counter-clockwise.

mod budget;
mod emitter;
mod ring;
mod tessellation;

pub mod curve;
pub mod dash;
pub mod error;
pub mod fill;
pub mod pool;
pub mod shape;
pub mod uv;

pub use budget::ShapeBudget;
pub use emitter::{band_quad, fan_triangle, oriented_quad, oriented_triangle, FanAnchor, RingEmitter};
pub use error::TessellationError;
pub use fill::Fill;
pub use ring::{
    corner_join, corner_miter, miter, BandOffsets, Bands, EdgeSpec, EdgeThickness, RingMode,
    RingStyle, RingVertex, VertexWriter,
};
pub use shape::{Shape, ShapeBuilder};
pub use tessellation::{
    tessellate, tessellate_shared, with_shared_pools, BufferPools, Tessellator,
};

pub use shapevg_core::*;
pub use shapevg_mesh as mesh;

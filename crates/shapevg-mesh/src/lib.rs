//! Draw triangles!
mod primitive;
mod sink;

pub use primitive::*;
pub use sink::*;

//! Ember math - vector types, rays, bounds and sampling warps.
//!
//! Everything here is renderer-agnostic. `glam` is re-exported so the
//! rest of the workspace shares one `Vec3`.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod frame;
mod interval;
mod ray;
pub mod sampling;

pub use aabb::Aabb;
pub use frame::{build_orthonormal_basis, to_world};
pub use interval::Interval;
pub use ray::Ray;

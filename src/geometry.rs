//! Axis-aligned box collision primitives.
//!
//! This module handles:
//! - Overlap testing between boxes (strict separating-axis test)
//! - Penetration (minimum translation vector) computation
//! - Ray versus box edge queries
//!
//! Every function here is pure, synchronous and free of shared state, so it is
//! safe to call from any thread, including from inside scheduled jobs.
//!
//! # Example
//!
//! ```rust
//! use peregrine_kernel::fixed_math::FixedVec2;
//! use peregrine_kernel::geometry::Aabb;
//!
//! let a = Aabb::new(FixedVec2::from_ints(0, 0), FixedVec2::from_ints(2, 2));
//! let b = Aabb::new(FixedVec2::from_ints(1, 1), FixedVec2::from_ints(3, 3));
//!
//! let penetration = Aabb::compute_penetration(a, b).expect("boxes overlap");
//! let separated = a.translated(penetration.vector());
//! assert!(!separated.intersects(&b));
//! ```

pub mod aabb;
pub mod raycast;


pub use aabb::{Aabb, Penetration};
pub use raycast::{RaycastHit, RaycastMode};

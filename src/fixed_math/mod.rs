//! Deterministic fixed-point mathematics library.
//!
//! This module provides deterministic math types and operations using fixed-point
//! arithmetic to ensure identical behavior across different platforms and architectures.
//! This is critical for lockstep and rollback simulation where every peer must compute
//! bit-identical collision results.

use fixed::types::{I48F16, I96F32};

pub use segment::{ccw, compare_points, line_intersection, segments_intersect};
pub use vec2::FixedVec2;

mod segment;
mod vec2;


/// Fixed-point number type used throughout the kernel.
///
/// Uses I48F16 format: 48 bits for the integer part, 16 bits for the fractional part.
/// This provides a range of approximately ±140 trillion with a precision of ~0.000015.
pub type FixedNum = I48F16;

/// Intermediate type for products of two `FixedNum`s. Holds any such product
/// exactly, so cross products and squared lengths never overflow in it.
pub(crate) type WideNum = I96F32;

/// Sign of `value` as a fixed-point number, with zero counted as positive.
///
/// Penetration resolution needs a push direction even when two centers coincide,
/// so this never returns zero.
#[inline]
pub fn sign_or_positive(value: FixedNum) -> FixedNum {
    if value < FixedNum::ZERO {
        FixedNum::NEG_ONE
    } else {
        FixedNum::ONE
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{segment, FixedNum, WideNum};

/// Two-component fixed-point vector.
///
/// A plain value type: compared and combined purely by value. Every operation is
/// exact under the `FixedNum` rounding rule and never touches floating point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixedVec2 {
    pub x: FixedNum,
    pub y: FixedNum,
}

impl FixedVec2 {
    pub const ZERO: Self = Self { x: FixedNum::ZERO, y: FixedNum::ZERO };
    pub const ONE: Self = Self { x: FixedNum::ONE, y: FixedNum::ONE };
    pub const RIGHT: Self = Self { x: FixedNum::ONE, y: FixedNum::ZERO };
    pub const LEFT: Self = Self { x: FixedNum::NEG_ONE, y: FixedNum::ZERO };
    pub const UP: Self = Self { x: FixedNum::ZERO, y: FixedNum::ONE };
    pub const DOWN: Self = Self { x: FixedNum::ZERO, y: FixedNum::NEG_ONE };

    pub const fn new(x: FixedNum, y: FixedNum) -> Self {
        Self { x, y }
    }

    pub fn from_ints(x: i32, y: i32) -> Self {
        Self {
            x: FixedNum::from_num(x),
            y: FixedNum::from_num(y),
        }
    }

    /// `x² + y²` in `FixedNum`.
    ///
    /// Overflows once the result passes `FixedNum::MAX` (about 1.4e14), i.e. for
    /// components beyond roughly 8.3e6. [`FixedVec2::length`] has no such limit.
    pub fn length_squared(self) -> FixedNum {
        self.x * self.x + self.y * self.y
    }

    /// Euclidean length. The squares are summed in `WideNum`, so this is
    /// valid over the whole `FixedNum` range; a result above `FixedNum::MAX`
    /// saturates.
    pub fn length(self) -> FixedNum {
        let (x, y) = (WideNum::from_num(self.x), WideNum::from_num(self.y));
        let len_sq = (x * x).saturating_add(y * y);
        if len_sq == WideNum::ZERO {
            return FixedNum::ZERO;
        }
        FixedNum::saturating_from_num(len_sq.sqrt())
    }

    /// Unit vector pointing the same way as `self`.
    ///
    /// # Panics
    ///
    /// Panics if `self` is the zero vector. Use [`FixedVec2::try_normalize`] when the
    /// input may be degenerate.
    ///
    /// Any non-zero vector whose components fit in `FixedNum` normalizes: the
    /// length goes through [`FixedVec2::length`], not `length_squared`.
    pub fn normalize(self) -> Self {
        match self.try_normalize() {
            Some(unit) => unit,
            None => panic!("cannot normalize a zero-length FixedVec2"),
        }
    }

    /// Unit vector pointing the same way as `self`, or `None` for the zero vector.
    pub fn try_normalize(self) -> Option<Self> {
        let len = self.length();
        if len == FixedNum::ZERO {
            None
        } else {
            Some(self / len)
        }
    }

    pub fn dot(self, other: Self) -> FixedNum {
        self.x * other.x + self.y * other.y
    }

    /// Scalar 2D cross product `x1*y2 - x2*y1`.
    pub fn cross(self, other: Self) -> FixedNum {
        self.x * other.y - self.y * other.x
    }

    /// Whether segments `a0-a1` and `b0-b1` cross or touch.
    ///
    /// See [`segment::segments_intersect`].
    pub fn segments_intersect(a0: Self, a1: Self, b0: Self, b1: Self) -> bool {
        segment::segments_intersect(a0, a1, b0, b1)
    }
}

impl fmt::Display for FixedVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl std::ops::Add for FixedVec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl std::ops::AddAssign for FixedVec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for FixedVec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl std::ops::SubAssign for FixedVec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl std::ops::Mul<FixedNum> for FixedVec2 {
    type Output = Self;
    fn mul(self, rhs: FixedNum) -> Self::Output {
        Self { x: self.x * rhs, y: self.y * rhs }
    }
}

impl std::ops::Div<FixedNum> for FixedVec2 {
    type Output = Self;
    fn div(self, rhs: FixedNum) -> Self::Output {
        Self { x: self.x / rhs, y: self.y / rhs }
    }
}

impl std::ops::Neg for FixedVec2 {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self { x: -self.x, y: -self.y }
    }
}

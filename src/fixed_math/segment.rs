//! Orientation-based segment predicates.

use std::cmp::Ordering;

use super::{FixedNum, FixedVec2, WideNum};

/// Orientation of `p2` relative to the directed line `p0 -> p1`.
///
/// Returns `1` for counter-clockwise, `-1` for clockwise and `0` when the three
/// points are collinear.
pub fn ccw(p0: FixedVec2, p1: FixedVec2, p2: FixedVec2) -> i32 {
    let (u, v) = (p1 - p0, p2 - p0);
    // Sign of u × v, comparing the two products so nothing is subtracted in WideNum
    let lhs = WideNum::from_num(u.x) * WideNum::from_num(v.y);
    let rhs = WideNum::from_num(u.y) * WideNum::from_num(v.x);
    match lhs.cmp(&rhs) {
        Ordering::Greater => 1,
        Ordering::Less => -1,
        Ordering::Equal => 0,
    }
}

/// Total order on points: by `x`, then by `y`.
pub fn compare_points(p: FixedVec2, q: FixedVec2) -> Ordering {
    p.x.cmp(&q.x).then(p.y.cmp(&q.y))
}

/// Whether the closed segments `a0-a1` and `b0-b1` share at least one point.
///
/// Proper crossings, an endpoint resting on the other segment, and overlapping
/// collinear segments all count. Zero-length segments go through the collinear
/// branch and behave like points.
pub fn segments_intersect(a0: FixedVec2, a1: FixedVec2, b0: FixedVec2, b1: FixedVec2) -> bool {
    let ab = ccw(a0, a1, b0) * ccw(a0, a1, b1);
    let cd = ccw(b0, b1, a0) * ccw(b0, b1, a1);

    if ab == 0 && cd == 0 {
        // Collinear (or sharing an endpoint): compare the ordered intervals.
        let (a_lo, a_hi) = ordered(a0, a1);
        let (b_lo, b_hi) = ordered(b0, b1);
        return compare_points(b_lo, a_hi) != Ordering::Greater
            && compare_points(a_lo, b_hi) != Ordering::Greater;
    }

    ab <= 0 && cd <= 0
}

/// Intersection point of the infinite lines through `a0-a1` and `b0-b1`.
///
/// Evaluates the two-line determinant form
/// `((a0×a1)(b0−b1) − (a0−a1)(b0×b1)) / ((a0−a1)×(b0−b1))` with every point
/// taken relative to `a0`, where it reduces to `a0 + (a1−a0)·t` with
/// `t = (b0'×b1') / ((a1−a0)×(b1−b0))`. Products are kept in `WideNum`, so a
/// long ray far from the origin does not overflow.
///
/// Returns `None` when the denominator is zero (parallel or degenerate lines),
/// or when the intersection lies outside the `FixedNum` range.
pub fn line_intersection(
    a0: FixedVec2,
    a1: FixedVec2,
    b0: FixedVec2,
    b1: FixedVec2,
) -> Option<FixedVec2> {
    let dir = a1 - a0;
    let p = b0 - a0;
    let q = b1 - a0;

    let denom = wide_cross(dir, q - p)?;
    if denom == WideNum::ZERO {
        return None;
    }
    let num = wide_cross(p, q)?;

    let offset = |component: FixedNum| -> Option<FixedNum> {
        let scaled = WideNum::from_num(component).checked_mul(num)?.checked_div(denom)?;
        FixedNum::checked_from_num(scaled)
    };
    Some(FixedVec2::new(
        a0.x.checked_add(offset(dir.x)?)?,
        a0.y.checked_add(offset(dir.y)?)?,
    ))
}

fn wide_cross(u: FixedVec2, v: FixedVec2) -> Option<WideNum> {
    let lhs = WideNum::from_num(u.x) * WideNum::from_num(v.y);
    let rhs = WideNum::from_num(u.y) * WideNum::from_num(v.x);
    lhs.checked_sub(rhs)
}

fn ordered(p: FixedVec2, q: FixedVec2) -> (FixedVec2, FixedVec2) {
    if compare_points(q, p) == Ordering::Less {
        (q, p)
    } else {
        (p, q)
    }
}

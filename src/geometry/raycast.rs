use serde::{Deserialize, Serialize};

use crate::fixed_math::{FixedNum, FixedVec2};

/// Where a ray met a box edge, and that edge's outward normal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaycastHit {
    pub point: FixedVec2,
    pub normal: FixedVec2,
}

impl RaycastHit {
    pub fn new(point: FixedVec2, normal: FixedVec2) -> Self {
        Self { point, normal }
    }

    pub fn distance_from(&self, origin: FixedVec2) -> FixedNum {
        (self.point - origin).length()
    }
}

/// Which qualifying edge a raycast reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaycastMode {
    /// First edge in bottom, left, right, top order that faces the ray and is
    /// crossed by it. Not necessarily the closest one to the origin.
    #[default]
    FirstEdge,
    /// Closest qualifying hit to the ray origin. Ties go to the earlier edge.
    ///
    /// For a single box this always agrees with [`RaycastMode::FirstEdge`]: a ray
    /// segment crosses at most one edge facing it, except through a corner,
    /// where both edges report the same point and the earlier one wins.
    Nearest,
}

/// One box edge: its two vertices and the fixed outward normal.
#[derive(Clone, Copy, Debug)]
pub(crate) struct BoxEdge {
    pub start: FixedVec2,
    pub end: FixedVec2,
    pub normal: FixedVec2,
}

/// Edges of the box `[min, max]` in the order raycasts visit them:
/// bottom, left, right, top.
pub(crate) fn box_edges(min: FixedVec2, max: FixedVec2) -> [BoxEdge; 4] {
    let bottom_left = min;
    let bottom_right = FixedVec2::new(max.x, min.y);
    let top_left = FixedVec2::new(min.x, max.y);
    let top_right = max;

    [
        BoxEdge { start: bottom_left, end: bottom_right, normal: FixedVec2::DOWN },
        BoxEdge { start: bottom_left, end: top_left, normal: FixedVec2::LEFT },
        BoxEdge { start: bottom_right, end: top_right, normal: FixedVec2::RIGHT },
        BoxEdge { start: top_left, end: top_right, normal: FixedVec2::UP },
    ]
}

use serde::{Deserialize, Serialize};

use super::raycast::{box_edges, RaycastHit, RaycastMode};
use crate::fixed_math::{line_intersection, segments_intersect, sign_or_positive, FixedNum, FixedVec2};

/// Axis-aligned bounding box defined by its minimum and maximum corners.
///
/// Invariants:
/// - `min.x <= max.x` and `min.y <= max.y` for any box handed to the queries below.
///   The queries do not repair an inverted box; the result is unspecified.
///
/// Boxes are built fresh from body state every tick. [`Aabb::set_center`] and
/// [`Aabb::translate`] exist for the case where a box is re-positioned in place.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Aabb {
    pub min: FixedVec2,
    pub max: FixedVec2,
}

/// Minimum translation that moves the first box out of the second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Penetration {
    /// Unit vector along the separation axis.
    pub direction: FixedVec2,
    /// Overlap length along `direction`.
    pub distance: FixedNum,
}

impl Penetration {
    /// `direction * distance`.
    pub fn vector(&self) -> FixedVec2 {
        self.direction * self.distance
    }
}

impl Aabb {
    pub const fn new(min: FixedVec2, max: FixedVec2) -> Self {
        Self { min, max }
    }

    pub fn from_center_half_extents(center: FixedVec2, half_extents: FixedVec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn center(&self) -> FixedVec2 {
        (self.min + self.max) / FixedNum::from_num(2)
    }

    /// Full size of the box along each axis (`max - min`).
    pub fn extents(&self) -> FixedVec2 {
        self.max - self.min
    }

    /// Moves the box so its center lands on `center`, keeping its size.
    pub fn set_center(&mut self, center: FixedVec2) {
        let delta = center - self.center();
        self.translate(delta);
    }

    pub fn translate(&mut self, delta: FixedVec2) {
        self.min += delta;
        self.max += delta;
    }

    pub fn translated(mut self, delta: FixedVec2) -> Self {
        self.translate(delta);
        self
    }

    /// Strict overlap test. Boxes that only touch along an edge do not intersect.
    pub fn intersects(&self, other: &Self) -> bool {
        Self::intersect(*self, *other)
    }

    /// Whether `a` and `b` overlap on both axes.
    ///
    /// Per axis, the boxes are separated when one box's max is `<=` the other's min.
    pub fn intersect(a: Self, b: Self) -> bool {
        if a.max.x <= b.min.x || a.min.x >= b.max.x {
            return false;
        }
        if a.max.y <= b.min.y || a.min.y >= b.max.y {
            return false;
        }
        true
    }

    /// Penetration of `a` into `b`: the translation that moves `a` out of `b`
    /// along a single axis.
    ///
    /// Returns `None` when the boxes do not overlap, or when the chosen overlap
    /// is zero.
    ///
    /// # Axis selection
    ///
    /// Each axis' overlap is multiplied by the sign of the center delta
    /// `a.center - b.center` (zero delta counts as positive), and the axis with
    /// the smaller *signed* value wins. When the two signs differ this can pick
    /// the deeper axis rather than the shallowest one.
    pub fn compute_penetration(a: Self, b: Self) -> Option<Penetration> {
        if !Self::intersect(a, b) {
            return None;
        }

        let a_extents = a.extents();
        let b_extents = b.extents();

        // Union span per axis
        let span_x = a.max.x.max(b.max.x) - a.min.x.min(b.min.x);
        let span_y = a.max.y.max(b.max.y) - a.min.y.min(b.min.y);

        // Overlap = combined extents minus the union span
        let overlap_x = a_extents.x + b_extents.x - span_x;
        let overlap_y = a_extents.y + b_extents.y - span_y;

        let delta = a.center() - b.center();
        let signed_x = overlap_x * sign_or_positive(delta.x);
        let signed_y = overlap_y * sign_or_positive(delta.y);

        let penetration = if signed_x < signed_y {
            FixedVec2::new(signed_x, FixedNum::ZERO)
        } else {
            FixedVec2::new(FixedNum::ZERO, signed_y)
        };

        let distance = penetration.length();
        if distance == FixedNum::ZERO {
            return None;
        }

        Some(Penetration {
            direction: penetration / distance,
            distance,
        })
    }

    /// Casts a ray against the box edges, reporting the first qualifying edge in
    /// bottom, left, right, top order.
    ///
    /// See [`Aabb::raycast_with_mode`].
    pub fn raycast(
        &self,
        origin: FixedVec2,
        direction: FixedVec2,
        max_distance: FixedNum,
    ) -> Option<RaycastHit> {
        self.raycast_with_mode(origin, direction, max_distance, RaycastMode::FirstEdge)
    }

    /// Casts the segment `origin -> origin + normalize(direction) * max_distance`
    /// against the box edges.
    ///
    /// An edge qualifies when its outward normal faces against the ray
    /// (`dot(normal, direction) < 0`) and the ray segment touches it. The hit
    /// normal is the edge's outward normal. A non-positive `max_distance` always
    /// misses.
    ///
    /// # Panics
    ///
    /// Panics if `direction` is the zero vector.
    pub fn raycast_with_mode(
        &self,
        origin: FixedVec2,
        direction: FixedVec2,
        max_distance: FixedNum,
        mode: RaycastMode,
    ) -> Option<RaycastHit> {
        let unit = direction.normalize();
        if max_distance <= FixedNum::ZERO {
            return None;
        }
        let end = origin + unit * max_distance;

        let mut best: Option<(RaycastHit, FixedNum)> = None;

        for edge in box_edges(self.min, self.max) {
            // Only faces turned towards the ray can be entered from outside
            if edge.normal.dot(unit) >= FixedNum::ZERO {
                continue;
            }
            if !segments_intersect(origin, end, edge.start, edge.end) {
                continue;
            }
            let Some(point) = line_intersection(origin, end, edge.start, edge.end) else {
                continue;
            };

            let hit = RaycastHit::new(point, edge.normal);
            match mode {
                RaycastMode::FirstEdge => return Some(hit),
                RaycastMode::Nearest => {
                    let dist = hit.distance_from(origin);
                    match best {
                        Some((_, best_dist)) if best_dist <= dist => {}
                        _ => best = Some((hit, dist)),
                    }
                }
            }
        }

        best.map(|(hit, _)| hit)
    }
}

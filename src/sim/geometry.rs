//! Footprint geometry for block collision
//!
//! Blocks are compared in the horizontal X/Z plane. Here that plane is a plain
//! 2D space: a point's `x` is world X and its `y` is world Z. All coordinates
//! are fixed-point integers, so clipping is exact up to floor rounding of
//! intersection points.
//!
//! The interesting part is Sutherland–Hodgman clipping of a rotated footprint
//! against the axis-aligned footprint of the block beneath it. The clipped
//! polygon is always convex; fewer than 3 vertices means no overlap.

use glam::I64Vec2;
use serde::{Deserialize, Serialize};

use super::fixed::{self, SCALE};

/// A footprint point (`x` = world X, `y` = world Z)
pub type Point = I64Vec2;

/// Axis-aligned box in the footprint plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Point,
    pub max: Point,
}

impl Aabb {
    #[inline]
    pub fn width(&self) -> i64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> i64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x).div_euclid(2),
            (self.min.y + self.max.y).div_euclid(2),
        )
    }

    /// Corners in counter-clockwise order
    pub fn corners(&self) -> [Point; 4] {
        [
            self.min,
            Point::new(self.max.x, self.min.y),
            self.max,
            Point::new(self.min.x, self.max.y),
        ]
    }
}

/// Build a box from its centre and extents.
///
/// `min` is `centre - extent / 2` (floored) and `max` is `min + extent`, so the
/// box always has exactly the requested size.
pub fn create_aabb(cx: i64, cy: i64, w: i64, h: i64) -> Aabb {
    let min = Point::new(cx - w.div_euclid(2), cy - h.div_euclid(2));
    Aabb {
        min,
        max: Point::new(min.x + w, min.y + h),
    }
}

/// Strict overlap test (touching edges do not count)
pub fn aabb_intersects(a: &Aabb, b: &Aabb) -> bool {
    a.min.x < b.max.x && a.max.x > b.min.x && a.min.y < b.max.y && a.max.y > b.min.y
}

/// The overlapping box, if any
pub fn aabb_intersection(a: &Aabb, b: &Aabb) -> Option<Aabb> {
    if !aabb_intersects(a, b) {
        return None;
    }
    Some(Aabb {
        min: a.min.max(b.min),
        max: a.max.min(b.max),
    })
}

/// Overlap area in fixed-point units (0 when disjoint)
pub fn aabb_intersection_area(a: &Aabb, b: &Aabb) -> i64 {
    aabb_intersection(a, b)
        .map(|i| fixed::multiply(i.width(), i.height(), SCALE))
        .unwrap_or(0)
}

/// Rotate `p` about `center` by `angle` millidegrees (counter-clockwise)
pub fn rotate_point(p: Point, center: Point, angle: i64) -> Point {
    let c = fixed::cos(angle);
    let s = fixed::sin(angle);
    let d = p - center;
    Point::new(
        center.x + fixed::multiply(d.x, c, SCALE) - fixed::multiply(d.y, s, SCALE),
        center.y + fixed::multiply(d.x, s, SCALE) + fixed::multiply(d.y, c, SCALE),
    )
}

/// Corners of a `w` x `h` rectangle centred at `(cx, cy)` and rotated about its
/// own centre, counter-clockwise.
pub fn create_rotated_rect(cx: i64, cy: i64, w: i64, h: i64, angle: i64) -> [Point; 4] {
    let center = Point::new(cx, cy);
    create_aabb(cx, cy, w, h)
        .corners()
        .map(|corner| rotate_point(corner, center, angle))
}

/// Polygon area (shoelace formula) in fixed-point units
pub fn polygon_area(points: &[Point]) -> i64 {
    if points.len() < 3 {
        return 0;
    }
    let twice: i128 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| cross(*a, *b))
        .sum();
    (twice.abs() / 2 / SCALE as i128) as i64
}

/// Bounding box of a polygon; `None` when it has fewer than 3 vertices
pub fn polygon_bounds(points: &[Point]) -> Option<Aabb> {
    if points.len() < 3 {
        return None;
    }
    let mut min = points[0];
    let mut max = points[0];
    for p in &points[1..] {
        min = min.min(*p);
        max = max.max(*p);
    }
    Some(Aabb { min, max })
}

/// Distance between two points (fixed-point)
pub fn distance(a: Point, b: Point) -> i64 {
    let d = b - a;
    fixed::sqrt(
        fixed::multiply(d.x, d.x, SCALE).saturating_add(fixed::multiply(d.y, d.y, SCALE)),
        SCALE,
    )
}

/// Radius of the circle enclosing a `w` x `h` rectangle at any rotation
pub fn bounding_radius(w: i64, h: i64) -> i64 {
    let diagonal = fixed::sqrt(
        fixed::multiply(w, w, SCALE).saturating_add(fixed::multiply(h, h, SCALE)),
        SCALE,
    );
    // Round up so the circle never undershoots the corners
    (diagonal + 1) / 2 + 1
}

/// Clip a polygon to an axis-aligned box (Sutherland–Hodgman).
///
/// Works for any convex input polygon in either winding. The result is the
/// convex intersection; callers treat fewer than 3 vertices as no overlap.
pub fn clip_polygon_to_aabb(polygon: &[Point], aabb: &Aabb) -> Vec<Point> {
    let [bl, br, tr, tl] = aabb.corners();
    // Edges walk the box counter-clockwise so the interior is on the left:
    // left, right, bottom, top.
    let edges = [(tl, bl), (br, tr), (bl, br), (tr, tl)];

    let mut output = polygon.to_vec();
    for (a, b) in edges {
        if output.is_empty() {
            break;
        }
        output = clip_against_edge(&output, a, b);
    }
    output
}

/// One Sutherland–Hodgman pass against the half-plane left of `a -> b`
fn clip_against_edge(polygon: &[Point], a: Point, b: Point) -> Vec<Point> {
    let inside = |p: Point| cross(b - a, p - a) >= 0;
    let mut out = Vec::with_capacity(polygon.len() + 2);

    for (i, &current) in polygon.iter().enumerate() {
        let previous = polygon[(i + polygon.len() - 1) % polygon.len()];
        match (inside(previous), inside(current)) {
            (true, true) => out.push(current),
            (true, false) => {
                if let Some(p) = line_intersection(previous, current, a, b) {
                    out.push(p);
                }
            }
            (false, true) => {
                if let Some(p) = line_intersection(previous, current, a, b) {
                    out.push(p);
                }
                out.push(current);
            }
            (false, false) => {}
        }
    }
    out
}

/// Intersection of segment `p1 -> p2` with the infinite line through `p3, p4`.
/// Parallel lines give `None`.
fn line_intersection(p1: Point, p2: Point, p3: Point, p4: Point) -> Option<Point> {
    let denom = cross(p1 - p2, p3 - p4);
    if denom == 0 {
        return None;
    }
    let t_num = cross(p1 - p3, p3 - p4);
    let d = p2 - p1;
    let x = p1.x as i128 + floor_div(d.x as i128 * t_num, denom);
    let y = p1.y as i128 + floor_div(d.y as i128 * t_num, denom);
    Some(Point::new(x as i64, y as i64))
}

#[inline]
fn cross(a: Point, b: Point) -> i128 {
    a.x as i128 * b.y as i128 - a.y as i128 * b.x as i128
}

fn floor_div(n: i128, d: i128) -> i128 {
    let q = n / d;
    if n % d != 0 && ((n < 0) != (d < 0)) {
        q - 1
    } else {
        q
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_create_aabb_preserves_extent() {
        let b = create_aabb(0, 0, 8000, 3001);
        assert_eq!(b.width(), 8000);
        assert_eq!(b.height(), 3001);
        assert_eq!(b.min, Point::new(-4000, -1501));
    }

    #[test]
    fn test_aabb_intersection_area() {
        let a = create_aabb(0, 0, 2000, 2000);
        let b = create_aabb(1000, 0, 2000, 2000);
        assert!(aabb_intersects(&a, &b));
        assert_eq!(aabb_intersection_area(&a, &b), 2000);

        // Touching edges do not overlap
        let c = create_aabb(2000, 0, 2000, 2000);
        assert!(!aabb_intersects(&a, &c));
        assert_eq!(aabb_intersection_area(&a, &c), 0);
    }

    #[test]
    fn test_rotate_point_quarter_turn() {
        let p = rotate_point(Point::new(1000, 0), Point::ZERO, 90_000);
        assert_eq!(p, Point::new(0, 1000));
    }

    #[test]
    fn test_rotated_rect_keeps_area() {
        let square = create_rotated_rect(0, 0, 2000, 2000, 45_000);
        let area = polygon_area(&square);
        assert!((area - 4000).abs() <= 40, "area {area}");
    }

    #[test]
    fn test_clip_inside_polygon_is_unchanged() {
        let poly = create_aabb(0, 0, 1000, 1000).corners();
        let clipped = clip_polygon_to_aabb(&poly, &create_aabb(0, 0, 4000, 4000));
        assert_eq!(clipped.len(), 4);
        assert_eq!(polygon_area(&clipped), 1000);
    }

    #[test]
    fn test_clip_rotated_square_outside_is_empty() {
        let poly = create_rotated_rect(10_000, 10_000, 2000, 2000, 45_000);
        let clipped = clip_polygon_to_aabb(&poly, &create_aabb(0, 0, 2000, 2000));
        assert!(clipped.len() < 3);
        assert_eq!(polygon_area(&clipped), 0);
        assert!(polygon_bounds(&clipped).is_none());
    }

    #[test]
    fn test_clip_partial_overlap() {
        let poly = create_aabb(1000, 1000, 2000, 2000).corners();
        let clipped = clip_polygon_to_aabb(&poly, &create_aabb(2000, 1000, 2000, 2000));
        let bounds = polygon_bounds(&clipped).unwrap();
        assert_eq!(bounds.min, Point::new(1000, 0));
        assert_eq!(bounds.max, Point::new(2000, 2000));
        assert_eq!(polygon_area(&clipped), 2000);
    }

    #[test]
    fn test_clip_rotated_square_over_box() {
        // Diamond with half-diagonal ~1414 fully covering a 2000 box corner region
        let poly = create_rotated_rect(0, 0, 2000, 2000, 45_000);
        let clipped = clip_polygon_to_aabb(&poly, &create_aabb(0, 0, 2000, 2000));
        // Octagon: box minus four corner triangles
        assert_eq!(clipped.len(), 8);
        let area = polygon_area(&clipped);
        assert!(area < 4000 && area > 3000, "area {area}");
    }

    #[test]
    fn test_line_intersection_parallel_is_none() {
        let hit = line_intersection(
            Point::new(0, 0),
            Point::new(0, 10),
            Point::new(5, 0),
            Point::new(5, 10),
        );
        assert!(hit.is_none());

        let hit = line_intersection(
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(5, -5),
            Point::new(5, 5),
        );
        assert_eq!(hit, Some(Point::new(5, 0)));
    }

    #[test]
    fn test_bounding_radius_covers_corners() {
        let r = bounding_radius(2000, 2000);
        let corner = Point::new(1000, 1000);
        assert!(distance(Point::ZERO, corner) <= r);
    }

    proptest! {
        #[test]
        fn prop_clip_stays_inside_box(
            cx in -5000i64..5000,
            cy in -5000i64..5000,
            w in 100i64..6000,
            h in 100i64..6000,
            angle in 0i64..360_000,
        ) {
            let aabb = create_aabb(0, 0, 4000, 4000);
            let poly = create_rotated_rect(cx, cy, w, h, angle);
            let clipped = clip_polygon_to_aabb(&poly, &aabb);
            for p in &clipped {
                prop_assert!(p.x >= aabb.min.x - 1 && p.x <= aabb.max.x + 1);
                prop_assert!(p.y >= aabb.min.y - 1 && p.y <= aabb.max.y + 1);
            }
            let area = polygon_area(&clipped);
            prop_assert!(area <= polygon_area(&aabb.corners()));
        }
    }
}

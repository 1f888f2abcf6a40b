/*
 * Region Module
 *
 * This module defines the Region struct, an axis-aligned rectangle described
 * by a center and a half extent. It is used both as the world border of the
 * simulation and as the query window for range queries on the quadtree.
 *
 * Containment is half-open (min inclusive, max exclusive) so that a point on
 * an edge shared by two sibling quadrants belongs to exactly one of them.
 */

use nannou::prelude::*;

// Precomputed boundary of a region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub xmin: f32,
    pub xmax: f32,
    pub ymin: f32,
    pub ymax: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    center: Vec2,
    half_extent: Vec2,
    bounds: Bounds,
}

impl Region {
    // Build a region from its center and half extent.
    // Negative half extents are flipped so that xmin <= xmax and ymin <= ymax always hold.
    pub fn new(center: Vec2, half_extent: Vec2) -> Self {
        let half_extent = half_extent.abs();
        let bounds = Bounds {
            xmin: center.x - half_extent.x,
            xmax: center.x + half_extent.x,
            ymin: center.y - half_extent.y,
            ymax: center.y + half_extent.y,
        };

        Self {
            center,
            half_extent,
            bounds,
        }
    }

    // Build a region from explicit boundaries, keeping them bit-exact.
    // Quadrants are built this way so that siblings share their edges exactly.
    pub fn from_bounds(xmin: f32, xmax: f32, ymin: f32, ymax: f32) -> Self {
        let (xmin, xmax) = if xmin <= xmax { (xmin, xmax) } else { (xmax, xmin) };
        let (ymin, ymax) = if ymin <= ymax { (ymin, ymax) } else { (ymax, ymin) };

        Self {
            center: vec2((xmin + xmax) * 0.5, (ymin + ymax) * 0.5),
            half_extent: vec2((xmax - xmin) * 0.5, (ymax - ymin) * 0.5),
            bounds: Bounds { xmin, xmax, ymin, ymax },
        }
    }

    // Square window centered on a point, used for pointer and neighbor queries
    pub fn around(center: Vec2, half_size: f32) -> Self {
        Self::new(center, vec2(half_size, half_size))
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.center
    }

    #[inline]
    pub fn half_extent(&self) -> Vec2 {
        self.half_extent
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn width(&self) -> f32 {
        self.bounds.xmax - self.bounds.xmin
    }

    pub fn height(&self) -> f32 {
        self.bounds.ymax - self.bounds.ymin
    }

    // Half-open containment test: xmin <= x < xmax and ymin <= y < ymax
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        let b = &self.bounds;
        b.xmin <= point.x && point.x < b.xmax && b.ymin <= point.y && point.y < b.ymax
    }

    // Inclusive rectangle overlap test, touching edges count as intersecting
    #[inline]
    pub fn intersects(&self, other: &Region) -> bool {
        let a = &self.bounds;
        let b = &other.bounds;

        // One box is left or right of the other
        if a.xmax < b.xmin || b.xmax < a.xmin {
            return false;
        }

        // One box is above or below the other
        if a.ymax < b.ymin || b.ymax < a.ymin {
            return false;
        }

        true
    }

    // Split into four equal quadrants in NW, NE, SW, SE order (north is +y).
    // The split lines are the parent's center, so the four children cover the
    // parent exactly under half-open containment.
    pub fn quadrants(&self) -> [Region; 4] {
        let b = &self.bounds;
        let cx = self.center.x;
        let cy = self.center.y;

        [
            Region::from_bounds(b.xmin, cx, cy, b.ymax),
            Region::from_bounds(cx, b.xmax, cy, b.ymax),
            Region::from_bounds(b.xmin, cx, b.ymin, cy),
            Region::from_bounds(cx, b.xmax, b.ymin, cy),
        ]
    }

    pub fn is_finite(&self) -> bool {
        self.center.is_finite() && self.half_extent.is_finite()
    }

    // Corner points for drawing, counter-clockwise from the bottom left
    pub fn corners(&self) -> [Vec2; 4] {
        let b = &self.bounds;
        [
            vec2(b.xmin, b.ymin),
            vec2(b.xmax, b.ymin),
            vec2(b.xmax, b.ymax),
            vec2(b.xmin, b.ymax),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_derived_from_center_and_half_extent() {
        let r = Region::new(vec2(1.0, -2.0), vec2(3.0, 4.0));
        let b = r.bounds();
        assert_eq!(b.xmin, -2.0);
        assert_eq!(b.xmax, 4.0);
        assert_eq!(b.ymin, -6.0);
        assert_eq!(b.ymax, 2.0);
    }

    #[test]
    fn negative_half_extent_is_normalized() {
        let r = Region::new(Vec2::ZERO, vec2(-2.0, -1.0));
        let b = r.bounds();
        assert!(b.xmin <= b.xmax);
        assert!(b.ymin <= b.ymax);
        assert_eq!(r.half_extent(), vec2(2.0, 1.0));
    }

    #[test]
    fn containment_is_half_open() {
        let r = Region::new(Vec2::ZERO, vec2(1.0, 1.0));
        assert!(r.contains(vec2(-1.0, -1.0)));
        assert!(r.contains(vec2(0.0, 0.0)));
        assert!(!r.contains(vec2(1.0, 0.0)));
        assert!(!r.contains(vec2(0.0, 1.0)));
        assert!(!r.contains(vec2(1.0, 1.0)));
    }

    #[test]
    fn intersection_is_symmetric_and_inclusive() {
        let a = Region::new(Vec2::ZERO, vec2(1.0, 1.0));
        let touching = Region::new(vec2(2.0, 0.0), vec2(1.0, 1.0));
        let apart = Region::new(vec2(2.5, 0.0), vec2(1.0, 1.0));
        let inside = Region::new(vec2(0.1, 0.1), vec2(0.1, 0.1));

        assert!(a.intersects(&touching));
        assert!(touching.intersects(&a));
        assert!(!a.intersects(&apart));
        assert!(!apart.intersects(&a));
        assert!(a.intersects(&inside));
        assert!(inside.intersects(&a));
    }

    #[test]
    fn quadrants_partition_every_point() {
        let r = Region::new(vec2(0.3, -0.7), vec2(10.0, 6.0));
        let quads = r.quadrants();

        // Grid of points including the split lines and the parent's min edges
        let b = r.bounds();
        let steps = 40;
        for i in 0..steps {
            for j in 0..steps {
                let x = b.xmin + (b.xmax - b.xmin) * i as f32 / steps as f32;
                let y = b.ymin + (b.ymax - b.ymin) * j as f32 / steps as f32;
                for p in [vec2(x, y), vec2(r.center().x, y), vec2(x, r.center().y)] {
                    if !r.contains(p) {
                        continue;
                    }
                    let owners = quads.iter().filter(|q| q.contains(p)).count();
                    assert_eq!(owners, 1, "point {:?} owned by {} quadrants", p, owners);
                }
            }
        }
    }

    #[test]
    fn quadrants_follow_nw_ne_sw_se_order() {
        let r = Region::new(Vec2::ZERO, vec2(2.0, 2.0));
        let [nw, ne, sw, se] = r.quadrants();
        assert_eq!(nw.center(), vec2(-1.0, 1.0));
        assert_eq!(ne.center(), vec2(1.0, 1.0));
        assert_eq!(sw.center(), vec2(-1.0, -1.0));
        assert_eq!(se.center(), vec2(1.0, -1.0));
        assert_eq!(nw.half_extent(), vec2(1.0, 1.0));
    }
}

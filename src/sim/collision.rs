//! Collision primitives
//!
//! Everything in the play area is an axis-aligned box. Overlap tests use
//! strict inequalities on all four edges: boxes that only touch don't collide.

use glam::Vec2;

use crate::Rect;

/// Strict AABB overlap
#[inline]
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.pos.x < b.right() && a.right() > b.pos.x && a.pos.y < b.bottom() && a.bottom() > b.pos.y
}

/// Strictly inside a circle
#[inline]
pub fn within_radius(center: Vec2, radius: f32, point: Vec2) -> bool {
    center.distance(point) < radius
}

/// Unit push direction from `from` toward `to`, scaled by `force`.
///
/// Coincident centers give a zero vector. May still be non-finite if either
/// point is; callers must check before applying.
#[inline]
pub fn knockback(from: Vec2, to: Vec2, force: f32) -> Vec2 {
    (to - from).normalize_or_zero() * force
}

/// Clamp a box's top-left corner so the box lies inside `[0, w] x [0, h]`
#[inline]
pub fn clamp_into(pos: Vec2, size: Vec2, width: f32, height: f32) -> Vec2 {
    pos.clamp(Vec2::ZERO, Vec2::new(width - size.x, height - size.y).max(Vec2::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f32, y: f32, w: f32, h: f32) -> Rect {
        Rect::new(Vec2::new(x, y), Vec2::new(w, h))
    }

    #[test]
    fn test_overlap() {
        assert!(overlaps(&rect(0.0, 0.0, 10.0, 10.0), &rect(5.0, 5.0, 10.0, 10.0)));
        assert!(overlaps(&rect(5.0, 5.0, 10.0, 10.0), &rect(0.0, 0.0, 10.0, 10.0)));
        assert!(overlaps(&rect(0.0, 0.0, 100.0, 100.0), &rect(40.0, 40.0, 2.0, 2.0)));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        assert!(!overlaps(&a, &rect(10.0, 0.0, 10.0, 10.0)));
        assert!(!overlaps(&a, &rect(0.0, 10.0, 10.0, 10.0)));
        assert!(!overlaps(&a, &rect(-10.0, 0.0, 10.0, 10.0)));
        assert!(!overlaps(&a, &rect(0.0, -10.0, 10.0, 10.0)));
    }

    #[test]
    fn test_within_radius_strict() {
        assert!(within_radius(Vec2::ZERO, 5.0, Vec2::new(3.0, 3.9)));
        assert!(!within_radius(Vec2::ZERO, 5.0, Vec2::new(3.0, 4.0)));
    }

    #[test]
    fn test_knockback_direction() {
        let k = knockback(Vec2::ZERO, Vec2::new(0.0, 10.0), 4.0);
        assert_eq!(k, Vec2::new(0.0, 4.0));
        assert_eq!(knockback(Vec2::ONE, Vec2::ONE, 4.0), Vec2::ZERO);
    }

    #[test]
    fn test_clamp_into() {
        let p = clamp_into(Vec2::new(900.0, -5.0), Vec2::splat(30.0), 800.0, 600.0);
        assert_eq!(p, Vec2::new(770.0, 0.0));
    }
}

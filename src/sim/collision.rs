//! Collision detection for the reference world
//!
//! Dynamic bodies are circles (the bunny); ground is axis-aligned
//! rectangles. Rectangles never rotate.

use glam::Vec2;

use super::ports::Shape;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether the shapes overlap
    pub hit: bool,
    /// Contact point on the second shape's surface
    pub point: Vec2,
    /// Unit normal pointing from the second shape toward the first
    pub normal: Vec2,
    /// Overlap depth along `normal`
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Circle against axis-aligned rectangle
pub fn circle_rect_collision(center: Vec2, radius: f32, rect_center: Vec2, rect_size: Vec2) -> CollisionResult {
    let half = rect_size * 0.5;
    let min = rect_center - half;
    let max = rect_center + half;
    let closest = center.clamp(min, max);
    let delta = center - closest;
    let dist_sq = delta.length_squared();

    if dist_sq > radius * radius {
        return CollisionResult::miss();
    }

    if dist_sq > f32::EPSILON {
        let dist = dist_sq.sqrt();
        return CollisionResult {
            hit: true,
            point: closest,
            normal: delta / dist,
            penetration: radius - dist,
        };
    }

    // Center inside the rectangle: push out through the nearest face
    let to_left = center.x - min.x;
    let to_right = max.x - center.x;
    let to_bottom = center.y - min.y;
    let to_top = max.y - center.y;
    let nearest = to_left.min(to_right).min(to_bottom).min(to_top);

    let (normal, point) = if nearest == to_top {
        (Vec2::Y, Vec2::new(center.x, max.y))
    } else if nearest == to_bottom {
        (Vec2::NEG_Y, Vec2::new(center.x, min.y))
    } else if nearest == to_left {
        (Vec2::NEG_X, Vec2::new(min.x, center.y))
    } else {
        (Vec2::X, Vec2::new(max.x, center.y))
    };

    CollisionResult {
        hit: true,
        point,
        normal,
        penetration: nearest + radius,
    }
}

/// Circle against circle
pub fn circle_circle_collision(a: Vec2, ra: f32, b: Vec2, rb: f32) -> CollisionResult {
    let delta = a - b;
    let dist = delta.length();
    if dist > ra + rb {
        return CollisionResult::miss();
    }
    let normal = if dist > f32::EPSILON { delta / dist } else { Vec2::Y };
    CollisionResult {
        hit: true,
        point: b + normal * rb,
        normal,
        penetration: ra + rb - dist,
    }
}

/// Axis-aligned rectangle overlap
pub fn rect_rect_overlap(a: Vec2, size_a: Vec2, b: Vec2, size_b: Vec2) -> bool {
    let d = (a - b).abs();
    let reach = (size_a + size_b) * 0.5;
    d.x <= reach.x && d.y <= reach.y
}

/// Collision between two positioned shapes; normal points from `b` to `a`
pub fn shapes_collide(a: Vec2, shape_a: &Shape, b: Vec2, shape_b: &Shape) -> CollisionResult {
    match (*shape_a, *shape_b) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circle_circle_collision(a, ra, b, rb)
        }
        (Shape::Circle { radius }, Shape::Rect { size }) => circle_rect_collision(a, radius, b, size),
        (Shape::Rect { size }, Shape::Circle { radius }) => {
            let mut result = circle_rect_collision(b, radius, a, size);
            result.normal = -result.normal;
            result
        }
        (Shape::Rect { size: sa }, Shape::Rect { size: sb }) => {
            if rect_rect_overlap(a, sa, b, sb) {
                CollisionResult {
                    hit: true,
                    point: (a + b) * 0.5,
                    normal: if a.y >= b.y { Vec2::Y } else { Vec2::NEG_Y },
                    penetration: (sa.y + sb.y) * 0.5 - (a.y - b.y).abs(),
                }
            } else {
                CollisionResult::miss()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_resting_on_rect_top() {
        let result = circle_rect_collision(Vec2::new(0.0, 58.0), 10.0, Vec2::ZERO, Vec2::new(100.0, 100.0));
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::Y);
        assert!((result.penetration - 2.0).abs() < 1e-4);
        assert_eq!(result.point, Vec2::new(0.0, 50.0));
    }

    #[test]
    fn test_circle_clear_of_rect() {
        let result = circle_rect_collision(Vec2::new(0.0, 61.0), 10.0, Vec2::ZERO, Vec2::new(100.0, 100.0));
        assert!(!result.hit);
    }

    #[test]
    fn test_circle_center_inside_rect_pushes_up_nearest_face() {
        let result = circle_rect_collision(Vec2::new(0.0, 45.0), 10.0, Vec2::ZERO, Vec2::new(100.0, 100.0));
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::Y);
        assert!((result.penetration - 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_circle_hits_rect_corner() {
        let result = circle_rect_collision(Vec2::new(56.0, 56.0), 10.0, Vec2::ZERO, Vec2::new(100.0, 100.0));
        assert!(result.hit);
        assert!((result.normal - Vec2::new(1.0, 1.0).normalize()).length() < 1e-5);
    }

    #[test]
    fn test_circle_circle() {
        let result = circle_circle_collision(Vec2::new(15.0, 0.0), 10.0, Vec2::ZERO, 10.0);
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::X);
        assert!((result.penetration - 5.0).abs() < 1e-5);
        assert!(!circle_circle_collision(Vec2::new(25.0, 0.0), 10.0, Vec2::ZERO, 10.0).hit);
    }

    #[test]
    fn test_shape_order_flips_normal() {
        let circle = Shape::Circle { radius: 10.0 };
        let rect = Shape::Rect { size: Vec2::new(100.0, 100.0) };
        let ab = shapes_collide(Vec2::new(0.0, 58.0), &circle, Vec2::ZERO, &rect);
        let ba = shapes_collide(Vec2::ZERO, &rect, Vec2::new(0.0, 58.0), &circle);
        assert_eq!(ab.normal, -ba.normal);
    }

    #[test]
    fn test_rect_overlap() {
        assert!(rect_rect_overlap(Vec2::ZERO, Vec2::splat(10.0), Vec2::new(9.0, 0.0), Vec2::splat(10.0)));
        assert!(!rect_rect_overlap(Vec2::ZERO, Vec2::splat(10.0), Vec2::new(11.0, 0.0), Vec2::splat(10.0)));
    }
}

//! Host engine seams
//!
//! The controller never integrates physics itself. It registers colliders,
//! issues impulses and velocity changes, and reads positions back through
//! `PhysicsWorldPort`. Contact notifications arrive as `Contact` values.

use std::ops::BitOr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Handle to a body owned by the physics host
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// Collision category bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Category(pub u32);

impl Category {
    pub const NONE: Category = Category(0);
    pub const GROUND: Category = Category(0b001);
    pub const BUNNY: Category = Category(0b010);
    pub const CARROT: Category = Category(0b100);

    #[inline]
    pub fn intersects(self, other: Category) -> bool {
        self.0 & other.0 != 0
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::NONE => "none",
            Category::GROUND => "ground",
            Category::BUNNY => "bunny",
            Category::CARROT => "carrot",
            _ => "mixed",
        }
    }
}

impl BitOr for Category {
    type Output = Category;

    fn bitor(self, rhs: Category) -> Category {
        Category(self.0 | rhs.0)
    }
}

/// Collision shape, centered on the body position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle { radius: f32 },
    Rect { size: Vec2 },
}

impl Shape {
    /// Horizontal half extent
    pub fn half_width(&self) -> f32 {
        match *self {
            Shape::Circle { radius } => radius,
            Shape::Rect { size } => size.x * 0.5,
        }
    }
}

/// Everything the host needs to create a body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDesc {
    pub shape: Shape,
    pub position: Vec2,
    /// Dynamic bodies are moved by the simulation; static ones never are
    pub dynamic: bool,
    pub category: Category,
    /// Categories this body is pushed out of
    pub collides_with: Category,
    /// Categories that raise a contact event with this body
    pub contact_test: Category,
    pub mass: f32,
    pub restitution: f32,
    pub friction: f32,
    pub linear_damping: f32,
    pub affected_by_gravity: bool,
    pub allows_rotation: bool,
}

impl BodyDesc {
    /// Dynamic body with engine-style defaults
    pub fn dynamic(shape: Shape, position: Vec2) -> Self {
        Self {
            shape,
            position,
            dynamic: true,
            category: Category::NONE,
            collides_with: Category::NONE,
            contact_test: Category::NONE,
            mass: 1.0,
            restitution: 0.2,
            friction: 0.2,
            linear_damping: 0.1,
            affected_by_gravity: true,
            allows_rotation: true,
        }
    }

    /// Static collider; never moves, ignores gravity
    pub fn fixed(shape: Shape, position: Vec2) -> Self {
        Self {
            dynamic: false,
            affected_by_gravity: false,
            allows_rotation: false,
            ..Self::dynamic(shape, position)
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn colliding_with(mut self, mask: Category) -> Self {
        self.collides_with = mask;
        self
    }

    pub fn reporting_contacts(mut self, mask: Category) -> Self {
        self.contact_test = mask;
        self
    }

    /// Right-most x covered by this body
    pub fn max_x(&self) -> f32 {
        self.position.x + self.shape.half_width()
    }
}

/// Begin-contact notification between two bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub body_a: BodyId,
    pub category_a: Category,
    pub body_b: BodyId,
    pub category_b: Category,
}

/// Commands and queries the controller issues against the physics host.
///
/// Operations on a body that no longer exists are ignored by implementors.
pub trait PhysicsWorldPort {
    /// Register a collider and return its handle
    fn add_body(&mut self, desc: BodyDesc) -> BodyId;
    fn remove_body(&mut self, id: BodyId);
    fn contains(&self, id: BodyId) -> bool;

    fn position(&self, id: BodyId) -> Option<Vec2>;
    fn set_position(&mut self, id: BodyId, position: Vec2);

    fn velocity(&self, id: BodyId) -> Option<Vec2>;
    fn set_velocity(&mut self, id: BodyId, velocity: Vec2);
    /// Additive change of momentum
    fn apply_impulse(&mut self, id: BodyId, impulse: Vec2);

    fn rotation(&self, id: BodyId) -> Option<f32>;
    fn set_rotation(&mut self, id: BodyId, radians: f32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_are_disjoint_bits() {
        assert!(!Category::GROUND.intersects(Category::BUNNY));
        assert!(!Category::BUNNY.intersects(Category::CARROT));
        assert!(!Category::GROUND.intersects(Category::CARROT));
        assert!((Category::GROUND | Category::CARROT).intersects(Category::CARROT));
        assert_eq!((Category::GROUND | Category::BUNNY).name(), "mixed");
    }

    #[test]
    fn test_fixed_desc_has_static_defaults() {
        let desc = BodyDesc::fixed(Shape::Rect { size: Vec2::new(64.0, 32.0) }, Vec2::new(100.0, 0.0))
            .with_category(Category::GROUND);
        assert!(!desc.dynamic);
        assert!(!desc.affected_by_gravity);
        assert_eq!(desc.max_x(), 132.0);
    }
}

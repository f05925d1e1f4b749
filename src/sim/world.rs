//! Headless reference physics host
//!
//! Implements `PhysicsWorldPort` well enough to drive the scene without an
//! engine: gravity, linear damping, circle-vs-rect resolution with
//! restitution and friction, rolling rotation, and begin-contact events.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;

use super::collision::shapes_collide;
use super::ports::{BodyDesc, BodyId, Contact, PhysicsWorldPort, Shape};

#[derive(Debug, Clone)]
struct Body {
    desc: BodyDesc,
    position: Vec2,
    velocity: Vec2,
    rotation: f32,
    angular_velocity: f32,
}

/// Simple world stepping bodies in id order
#[derive(Debug, Clone)]
pub struct ReferenceWorld {
    pub gravity: Vec2,
    bodies: BTreeMap<BodyId, Body>,
    next_id: u32,
    /// Pairs (lower id first) in contact at the end of the last step
    touching: BTreeSet<(BodyId, BodyId)>,
}

impl ReferenceWorld {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            bodies: BTreeMap::new(),
            next_id: 1,
            touching: BTreeSet::new(),
        }
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Advance the simulation by `dt` and return the contacts that began
    pub fn step(&mut self, dt: f32) -> Vec<Contact> {
        let gravity = self.gravity;
        for body in self.bodies.values_mut().filter(|b| b.desc.dynamic) {
            if body.desc.affected_by_gravity {
                body.velocity += gravity * dt;
            }
            body.velocity *= 1.0 / (1.0 + body.desc.linear_damping * dt);
            body.position += body.velocity * dt;
            if body.desc.allows_rotation {
                body.rotation += body.angular_velocity * dt;
            }
        }

        self.resolve_collisions();
        self.collect_contacts()
    }

    fn resolve_collisions(&mut self) {
        let statics: Vec<(Vec2, BodyDesc)> = self
            .bodies
            .values()
            .filter(|b| !b.desc.dynamic)
            .map(|b| (b.position, b.desc.clone()))
            .collect();

        for body in self.bodies.values_mut().filter(|b| b.desc.dynamic) {
            for (position, other) in &statics {
                if !body.desc.collides_with.intersects(other.category) {
                    continue;
                }
                let hit = shapes_collide(body.position, &body.desc.shape, *position, &other.shape);
                if !hit.hit {
                    continue;
                }

                body.position += hit.normal * hit.penetration;

                let vn = body.velocity.dot(hit.normal);
                if vn < 0.0 {
                    let restitution = body.desc.restitution.max(other.restitution);
                    let normal_change = -(1.0 + restitution) * vn;
                    body.velocity += hit.normal * normal_change;

                    // Coulomb friction, bounded by the normal impulse
                    let tangent_velocity = body.velocity - hit.normal * body.velocity.dot(hit.normal);
                    let friction = (body.desc.friction * other.friction).sqrt();
                    let max_change = friction * normal_change;
                    let speed = tangent_velocity.length();
                    if speed > 0.0 {
                        let change = speed.min(max_change);
                        body.velocity -= tangent_velocity / speed * change;
                    }
                }

                if let Shape::Circle { radius } = body.desc.shape {
                    if body.desc.allows_rotation && radius > 0.0 {
                        // Rolling: clockwise when moving right along a floor
                        let tangent = Vec2::new(hit.normal.y, -hit.normal.x);
                        body.angular_velocity = -body.velocity.dot(tangent) / radius;
                    }
                }
            }
        }
    }

    fn collect_contacts(&mut self) -> Vec<Contact> {
        let bodies: Vec<(&BodyId, &Body)> = self.bodies.iter().collect();
        let mut now_touching = BTreeSet::new();
        let mut began = Vec::new();

        for (i, (id_a, a)) in bodies.iter().enumerate() {
            for (id_b, b) in bodies.iter().skip(i + 1) {
                if !a.desc.dynamic && !b.desc.dynamic {
                    continue;
                }
                let reports = a.desc.contact_test.intersects(b.desc.category)
                    || b.desc.contact_test.intersects(a.desc.category);
                if !reports {
                    continue;
                }
                if !shapes_collide(a.position, &a.desc.shape, b.position, &b.desc.shape).hit {
                    continue;
                }
                let key = (**id_a, **id_b);
                now_touching.insert(key);
                if !self.touching.contains(&key) {
                    began.push(Contact {
                        body_a: **id_a,
                        category_a: a.desc.category,
                        body_b: **id_b,
                        category_b: b.desc.category,
                    });
                }
            }
        }

        self.touching = now_touching;
        began
    }
}

impl PhysicsWorldPort for ReferenceWorld {
    fn add_body(&mut self, desc: BodyDesc) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        self.bodies.insert(
            id,
            Body {
                position: desc.position,
                velocity: Vec2::ZERO,
                rotation: 0.0,
                angular_velocity: 0.0,
                desc,
            },
        );
        id
    }

    fn remove_body(&mut self, id: BodyId) {
        self.bodies.remove(&id);
        self.touching.retain(|&(a, b)| a != id && b != id);
    }

    fn contains(&self, id: BodyId) -> bool {
        self.bodies.contains_key(&id)
    }

    fn position(&self, id: BodyId) -> Option<Vec2> {
        self.bodies.get(&id).map(|b| b.position)
    }

    fn set_position(&mut self, id: BodyId, position: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.position = position;
        }
    }

    fn velocity(&self, id: BodyId) -> Option<Vec2> {
        self.bodies.get(&id).map(|b| b.velocity)
    }

    fn set_velocity(&mut self, id: BodyId, velocity: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id).filter(|b| b.desc.dynamic) {
            body.velocity = velocity;
        }
    }

    fn apply_impulse(&mut self, id: BodyId, impulse: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id).filter(|b| b.desc.dynamic) {
            body.velocity += impulse / body.desc.mass.max(f32::EPSILON);
        }
    }

    fn rotation(&self, id: BodyId) -> Option<f32> {
        self.bodies.get(&id).map(|b| b.rotation)
    }

    fn set_rotation(&mut self, id: BodyId, radians: f32) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.rotation = radians;
        }
    }
}

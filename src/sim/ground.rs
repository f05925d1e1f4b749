//! Procedural ground generation
//!
//! Segments are laid end to end starting at a level's start x. The frontier
//! (`current_ground_end`) only ever moves right until the generator is reset
//! by a level transition.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ports::{BodyDesc, Category, Shape};
use crate::consts::*;

/// A rectangular span of ground resting on the scene floor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundSegment {
    pub start_x: f32,
    pub width: f32,
    pub height: f32,
    pub is_static: bool,
}

impl GroundSegment {
    pub fn end_x(&self) -> f32 {
        self.start_x + self.width
    }

    /// Collider for this segment with its bottom edge on `floor_y`
    pub fn collider_desc(&self, floor_y: f32) -> BodyDesc {
        let size = Vec2::new(self.width, self.height);
        let center = Vec2::new(self.start_x + self.width * 0.5, floor_y + self.height * 0.5);
        let mut desc = if self.is_static {
            BodyDesc::fixed(Shape::Rect { size }, center)
        } else {
            BodyDesc::dynamic(Shape::Rect { size }, center)
        }
        .with_category(Category::GROUND)
        .colliding_with(Category::BUNNY);
        desc.friction = GROUND_FRICTION;
        desc.restitution = 0.0;
        desc
    }
}

/// Seeded segment generator with a monotonic frontier
#[derive(Debug, Clone)]
pub struct GroundGenerator {
    rng: Pcg32,
    width_min: f32,
    width_max: f32,
    height: f32,
    current_ground_end: f32,
}

impl GroundGenerator {
    pub fn new(seed: u64, width_min: f32, width_max: f32, height: f32) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            width_min,
            width_max,
            height,
            current_ground_end: 0.0,
        }
    }

    pub fn current_ground_end(&self) -> f32 {
        self.current_ground_end
    }

    /// Restart the frontier for a new level. The RNG stream continues.
    pub fn reset(&mut self, start_x: f32) {
        self.current_ground_end = start_x;
    }

    /// Append one segment at the frontier
    pub fn next_segment(&mut self) -> GroundSegment {
        let width = if self.width_max > self.width_min {
            self.rng.random_range(self.width_min..=self.width_max)
        } else {
            self.width_min
        };
        let segment = GroundSegment {
            start_x: self.current_ground_end,
            width,
            height: self.height,
            is_static: true,
        };
        self.current_ground_end = segment.end_x();
        segment
    }

    /// Segments needed for the frontier to reach `x`.
    ///
    /// Stops early if a segment no longer moves the frontier (f32 precision
    /// exhausted far from the origin).
    pub fn fill_to(&mut self, x: f32) -> Vec<GroundSegment> {
        let mut segments = Vec::new();
        while self.current_ground_end < x {
            let before = self.current_ground_end;
            let segment = self.next_segment();
            if self.current_ground_end <= before {
                log::warn!("Ground frontier stalled at {}, target {}", before, x);
                break;
            }
            segments.push(segment);
        }
        segments
    }

    /// Whether the look-ahead edge has come within the margin of the frontier
    pub fn needs_extension(&self, player_x: f32, half_screen_width: f32) -> bool {
        player_x + half_screen_width > self.current_ground_end - GROUND_LOOKAHEAD_MARGIN
    }
}

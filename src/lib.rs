//! Bunny Run - an endless-runner scene controller
//!
//! Core modules:
//! - `sim`: Scene controller (player, camera, level lifecycle, ground streaming)
//! - `assets`: Named tilemaps and sprite sheets
//! - `input`: Jump signal plumbing from pointer/keyboard events
//! - `settings`: Scene profiles (one per gameplay variant)
//! - `error`: Failure classes surfaced to the host

pub mod assets;
pub mod error;
pub mod input;
pub mod settings;
pub mod sim;

pub use assets::AssetLibrary;
pub use error::SceneError;
pub use settings::{GroundMode, JumpPolicy, JumpTrigger, SceneProfile};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Scene configuration constants
pub mod consts {
    /// Host frame step used by the headless driver (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Number of authored levels; the counter wraps back to 1 after this
    pub const MAX_LEVEL: u32 = 5;

    /// Largest accepted scene dimension or segment width
    pub const MAX_SCENE_EXTENT: f32 = 100_000.0;

    /// Spawn point offset from the scene frame's left edge
    pub const SPAWN_OFFSET_X: f32 = 100.0;
    /// Right boundary inset from the scene frame's right edge (tilemap profile)
    pub const RIGHT_BOUNDARY_INSET: f32 = 200.0;

    /// Camera travel needed before the next tile window is activated
    pub const TILE_TRIGGER_DISTANCE: f32 = 1200.0;
    /// Columns activated past the trigger edge
    pub const TILE_LOOKAHEAD_COLUMNS: i64 = 25;
    /// Trigger value meaning "nothing activated yet"
    pub const TILE_TRIGGER_UNARMED: f32 = -1_000_000.0;
    /// Tile names containing this (case-insensitive) get a collider
    pub const SOLID_TILE_MARKER: &str = "center";

    /// Generate a new segment once the look-ahead edge is this close to the frontier
    pub const GROUND_LOOKAHEAD_MARGIN: f32 = 150.0;
    pub const SEGMENT_WIDTH_MIN: f32 = 150.0;
    pub const SEGMENT_WIDTH_MAX: f32 = 300.0;
    pub const GROUND_HEIGHT: f32 = 192.0;
    /// Upper bound on segments appended in one frame when catch-up is enabled
    pub const MAX_CATCH_UP_SEGMENTS: u32 = 32;

    /// Player sprite sheet layout (1 row x 4 columns)
    pub const PLAYER_SHEET_ROWS: u32 = 1;
    pub const PLAYER_SHEET_COLUMNS: u32 = 4;
    /// Seconds each run-cycle frame is shown
    pub const PLAYER_FRAME_TIME: f64 = 0.09;
    /// Collision circle radius as a fraction of the sprite frame width
    pub const PLAYER_RADIUS_FACTOR: f32 = 1.0 / 3.0;
    pub const PLAYER_RESTITUTION: f32 = 0.3;
    pub const PLAYER_MASS: f32 = 0.5;

    /// Ground collider material
    pub const GROUND_FRICTION: f32 = 0.8;
    pub const GROUND_LINEAR_DAMPING: f32 = 60.0;

    /// Forward kick when the carrot is collected
    pub const CARROT_IMPULSE: (f32, f32) = (800.0, 0.0);
    pub const CARROT_RADIUS: f32 = 24.0;

    /// Decorative sun attached to the camera
    pub const SUN_SIZE: f32 = 350.0;
    pub const SUN_PADDING: f32 = 50.0;

    /// Points per meter used to scale gravity
    pub const POINTS_PER_METER: f32 = 150.0;
    pub const GRAVITY_MPS2: f32 = -9.8;

    /// Asset names
    pub const PLAYER_SHEET: &str = "bunny";
    pub const SUN_IMAGE: &str = "sun";
    pub const LEVEL_PREFIX: &str = "level";
}

/// Axis-aligned rectangle in scene coordinates (y up)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    /// Rectangle of `size` centered on `center`
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn mid(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Inclusive containment test
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Name of the tilemap asset for a 1-based level number
#[inline]
pub fn level_asset_name(level: u32) -> String {
    format!("{}{}", consts::LEVEL_PREFIX, level)
}

/// Next level number, wrapping `max` back to 1
#[inline]
pub fn next_level(level: u32, max: u32) -> u32 {
    if max == 0 { 1 } else { level % max + 1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_from_center() {
        let b = Bounds::from_center(Vec2::new(10.0, 0.0), Vec2::new(100.0, 50.0));
        assert_eq!(b.min, Vec2::new(-40.0, -25.0));
        assert_eq!(b.max, Vec2::new(60.0, 25.0));
        assert_eq!(b.mid(), Vec2::new(10.0, 0.0));
        assert!(b.contains(Vec2::new(60.0, 25.0)));
        assert!(!b.contains(Vec2::new(60.1, 0.0)));
    }

    #[test]
    fn test_next_level_wraps() {
        assert_eq!(next_level(1, 5), 2);
        assert_eq!(next_level(4, 5), 5);
        assert_eq!(next_level(5, 5), 1);
    }

    #[test]
    fn test_level_asset_name() {
        assert_eq!(level_asset_name(3), "level3");
    }
}

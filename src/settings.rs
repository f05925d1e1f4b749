//! Scene profiles
//!
//! Each gameplay variant (static tilemap, procedural ground, hybrid) is a
//! profile rather than a code path. Profiles serialize to JSON so a host can
//! ship tweaked variants without a rebuild.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Result, SceneError};

/// Where ground colliders come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroundMode {
    /// Authored tilemap, columns activated as the camera approaches
    #[default]
    Tilemap,
    /// Segments synthesized at the frontier
    Procedural,
    /// Authored tilemap followed by synthesized segments
    Hybrid,
}

impl GroundMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroundMode::Tilemap => "tilemap",
            GroundMode::Procedural => "procedural",
            GroundMode::Hybrid => "hybrid",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tilemap" | "tiles" | "static" => Some(GroundMode::Tilemap),
            "procedural" | "dynamic" => Some(GroundMode::Procedural),
            "hybrid" => Some(GroundMode::Hybrid),
            _ => None,
        }
    }

    /// Whether levels are loaded from tilemap assets
    pub fn uses_tiles(&self) -> bool {
        matches!(self, GroundMode::Tilemap | GroundMode::Hybrid)
    }

    /// Whether the segment generator runs
    pub fn uses_generator(&self) -> bool {
        matches!(self, GroundMode::Procedural | GroundMode::Hybrid)
    }
}

/// How a jump signal changes the player's velocity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JumpPolicy {
    /// Add an impulse; repeated jumps compound
    Impulse { dx: f32, dy: f32 },
    /// Overwrite the velocity; repeated jumps are idempotent
    SetVelocity { dx: f32, dy: f32 },
}

impl JumpPolicy {
    pub fn vector(&self) -> Vec2 {
        match *self {
            JumpPolicy::Impulse { dx, dy } | JumpPolicy::SetVelocity { dx, dy } => {
                Vec2::new(dx, dy)
            }
        }
    }
}

/// Which pointer phases fire a jump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JumpTrigger {
    /// Only touch-began / mouse-down
    #[default]
    PressOnly,
    /// Began, moved and ended all fire
    Continuous,
}

/// Right edge of the play area used by the boundary check
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RightLimit {
    /// Fixed line at `frame.max_x - inset`
    SceneFrame { inset: f32 },
    /// Right edge of the camera view (the player can never cross it)
    CameraView,
}

/// Scene profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneProfile {
    /// Display name
    pub name: String,

    // === World ===
    /// Scene frame size; the frame is centered on the origin
    pub scene_size: Vec2,
    /// Gravity in points/s²
    pub gravity: Vec2,
    /// Number of levels before the counter wraps
    pub level_count: u32,

    // === Ground ===
    pub ground_mode: GroundMode,
    /// Seed for segment widths
    pub seed: u64,
    pub segment_width_min: f32,
    pub segment_width_max: f32,
    pub ground_height: f32,
    /// Append segments until caught up instead of one per frame
    pub catch_up: bool,
    /// Remove colliders this far behind the camera's left edge (None keeps them)
    pub cull_margin: Option<f32>,

    // === Player ===
    pub jump: JumpPolicy,
    pub jump_trigger: JumpTrigger,
    pub player_mass: f32,
    pub right_limit: RightLimit,

    // === Collectibles ===
    /// Spawn the level's carrot (if the tilemap places one)
    pub carrots: bool,
}

impl Default for SceneProfile {
    fn default() -> Self {
        Self::tilemap()
    }
}

impl SceneProfile {
    /// Static tilemap with a carrot; jump adds an impulse on press
    pub fn tilemap() -> Self {
        Self {
            name: "tilemap".to_string(),

            scene_size: Vec2::new(1366.0, 1024.0),
            gravity: Vec2::new(0.0, GRAVITY_MPS2 * POINTS_PER_METER),
            level_count: MAX_LEVEL,

            ground_mode: GroundMode::Tilemap,
            seed: 0x5eed_b0b5,
            segment_width_min: SEGMENT_WIDTH_MIN,
            segment_width_max: SEGMENT_WIDTH_MAX,
            ground_height: GROUND_HEIGHT,
            catch_up: false,
            cull_margin: None,

            jump: JumpPolicy::Impulse { dx: 300.0, dy: 300.0 },
            jump_trigger: JumpTrigger::PressOnly,
            player_mass: PLAYER_MASS,
            right_limit: RightLimit::SceneFrame {
                inset: RIGHT_BOUNDARY_INSET,
            },

            carrots: true,
        }
    }

    /// Endless procedural ground; jump sets velocity on press
    pub fn procedural() -> Self {
        Self {
            name: "procedural".to_string(),
            ground_mode: GroundMode::Procedural,
            cull_margin: Some(400.0),
            jump: JumpPolicy::SetVelocity { dx: 400.0, dy: 650.0 },
            right_limit: RightLimit::CameraView,
            carrots: false,
            ..Self::tilemap()
        }
    }

    /// Tilemap start, procedural tail; every pointer phase jumps
    pub fn hybrid() -> Self {
        Self {
            name: "hybrid".to_string(),
            ground_mode: GroundMode::Hybrid,
            catch_up: true,
            jump_trigger: JumpTrigger::Continuous,
            ..Self::procedural()
        }
    }

    /// Look up a preset by name
    pub fn from_name(name: &str) -> Result<Self> {
        match GroundMode::from_str(name) {
            Some(GroundMode::Tilemap) => Ok(Self::tilemap()),
            Some(GroundMode::Procedural) => Ok(Self::procedural()),
            Some(GroundMode::Hybrid) => Ok(Self::hybrid()),
            None => Err(SceneError::UnknownProfile(name.to_string())),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let profile: Self = serde_json::from_str(json)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a profile from a JSON file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let profile = Self::from_json(&json)?;
        log::info!("Loaded scene profile '{}' from {}", profile.name, path.display());
        Ok(profile)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Reject profiles the controller cannot run
    pub fn validate(&self) -> Result<()> {
        let name = format!("profile {}", self.name);
        if self.level_count == 0 {
            return Err(SceneError::invalid(name, "level_count must be at least 1"));
        }
        let extent = 0.0..=MAX_SCENE_EXTENT;
        if !(self.segment_width_min > 0.0
            && self.segment_width_min <= self.segment_width_max
            && extent.contains(&self.segment_width_max))
        {
            return Err(SceneError::invalid(
                name,
                "segment width range must be positive, ordered and bounded",
            ));
        }
        if !(self.scene_size.x > 0.0
            && self.scene_size.y > 0.0
            && extent.contains(&self.scene_size.x)
            && extent.contains(&self.scene_size.y))
        {
            return Err(SceneError::invalid(
                name,
                format!("scene_size must be positive and at most {}", MAX_SCENE_EXTENT),
            ));
        }
        if !extent.contains(&self.ground_height) {
            return Err(SceneError::invalid(name, "ground_height must be finite and non-negative"));
        }
        if !self.gravity.is_finite() || self.cull_margin.is_some_and(|m| !m.is_finite()) {
            return Err(SceneError::invalid(name, "gravity and cull_margin must be finite"));
        }
        if !(self.player_mass > 0.0 && self.player_mass.is_finite()) {
            return Err(SceneError::invalid(name, "player_mass must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_differ_in_jump_semantics() {
        let tiles = SceneProfile::tilemap();
        let proc = SceneProfile::procedural();
        let hybrid = SceneProfile::hybrid();

        assert!(matches!(tiles.jump, JumpPolicy::Impulse { .. }));
        assert!(matches!(proc.jump, JumpPolicy::SetVelocity { .. }));
        assert_eq!(tiles.jump_trigger, JumpTrigger::PressOnly);
        assert_eq!(hybrid.jump_trigger, JumpTrigger::Continuous);
        assert!(hybrid.catch_up);
        assert!(!proc.catch_up);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(SceneProfile::from_name("Hybrid").unwrap().ground_mode, GroundMode::Hybrid);
        assert_eq!(SceneProfile::from_name("dynamic").unwrap().ground_mode, GroundMode::Procedural);
        assert!(matches!(
            SceneProfile::from_name("isometric"),
            Err(SceneError::UnknownProfile(_))
        ));
    }

    #[test]
    fn test_json_partial_profile_uses_defaults() {
        let profile = SceneProfile::from_json(r#"{ "name": "short", "level_count": 2 }"#).unwrap();
        assert_eq!(profile.name, "short");
        assert_eq!(profile.level_count, 2);
        assert_eq!(profile.ground_mode, GroundMode::Tilemap);
        assert_eq!(profile.segment_width_max, SEGMENT_WIDTH_MAX);
    }

    #[test]
    fn test_json_roundtrip_keeps_tagged_enums() {
        let profile = SceneProfile::hybrid();
        let json = profile.to_json().unwrap();
        assert!(json.contains("\"set_velocity\""));
        assert_eq!(SceneProfile::from_json(&json).unwrap(), profile);
    }

    #[test]
    fn test_validate_rejects_unbounded_sizes() {
        for json in [
            r#"{ "ground_mode": "procedural", "scene_size": [2.0e10, 1024.0] }"#,
            r#"{ "segment_width_min": 150.0, "segment_width_max": 1.0e12 }"#,
        ] {
            assert!(
                matches!(SceneProfile::from_json(json), Err(SceneError::InvalidAsset { .. })),
                "accepted {}",
                json
            );
        }

        let mut profile = SceneProfile::procedural();
        profile.scene_size.x = f32::INFINITY;
        assert!(profile.validate().is_err());
        profile.scene_size.x = f32::NAN;
        assert!(profile.validate().is_err());
        profile.scene_size.x = MAX_SCENE_EXTENT;
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join(format!("bunny-run-profile-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("hybrid.json");

        let mut profile = SceneProfile::hybrid();
        profile.seed = 77;
        profile.save_to(&path).unwrap();
        assert_eq!(SceneProfile::load_from(&path).unwrap(), profile);

        assert!(matches!(
            SceneProfile::load_from(dir.join("absent.json")),
            Err(SceneError::Io(_))
        ));

        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(SceneProfile::load_from(&path), Err(SceneError::Json(_))));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_validate_rejects_inverted_width_range() {
        let json = r#"{ "segment_width_min": 300.0, "segment_width_max": 150.0 }"#;
        assert!(matches!(
            SceneProfile::from_json(json),
            Err(SceneError::InvalidAsset { .. })
        ));
    }
}

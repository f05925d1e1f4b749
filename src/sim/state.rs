//! Scene state and entity types
//!
//! Positions and velocities here are copies read back from the physics host
//! each frame; the host owns the authoritative values.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::level::LevelLifecycle;
use super::ports::{BodyDesc, BodyId, Category, PhysicsWorldPort, Shape};
use crate::Bounds;
use crate::assets::{FrameRect, SpriteSheet};
use crate::consts::*;
use crate::settings::{RightLimit, SceneProfile};

/// Looping frame cursor driven by the host timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Animation {
    pub frame_count: usize,
    /// Seconds per frame
    pub frame_time: f64,
    /// Timestamp of the first update; the loop is measured from here
    start_time: Option<f64>,
    pub frame: usize,
}

impl Animation {
    pub fn new(frame_count: usize, frame_time: f64) -> Self {
        Self {
            frame_count: frame_count.max(1),
            frame_time,
            start_time: None,
            frame: 0,
        }
    }

    /// Move the cursor to the frame shown at `current_time`
    pub fn advance(&mut self, current_time: f64) -> usize {
        let start = *self.start_time.get_or_insert(current_time);
        let elapsed = (current_time - start).max(0.0);
        if self.frame_time > 0.0 {
            self.frame = (elapsed / self.frame_time) as usize % self.frame_count;
        }
        self.frame
    }
}

/// The bunny
#[derive(Debug, Clone)]
pub struct Player {
    pub body: BodyId,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Sprite frame size in scene units
    pub size: Vec2,
    pub radius: f32,
    /// Sprite is drawn mirrored (x scale -1)
    pub mirrored: bool,
    pub animation: Animation,
    frames: Vec<FrameRect>,
}

impl Player {
    /// Register the player's body and build the entity
    pub fn spawn<W: PhysicsWorldPort>(
        world: &mut W,
        sheet: &SpriteSheet,
        position: Vec2,
        mass: f32,
    ) -> Self {
        let size = sheet.frame_size();
        let radius = size.x * PLAYER_RADIUS_FACTOR;
        let body = world.add_body(Self::body_desc(position, radius, mass));
        let frames = sheet.frames();

        Self {
            body,
            position,
            velocity: Vec2::ZERO,
            size,
            radius,
            mirrored: true,
            animation: Animation::new(frames.len(), PLAYER_FRAME_TIME),
            frames,
        }
    }

    pub fn body_desc(position: Vec2, radius: f32, mass: f32) -> BodyDesc {
        let mut desc = BodyDesc::dynamic(Shape::Circle { radius }, position)
            .with_category(Category::BUNNY)
            .colliding_with(Category::GROUND)
            .reporting_contacts(Category::CARROT);
        desc.restitution = PLAYER_RESTITUTION;
        desc.mass = mass;
        desc
    }

    #[inline]
    pub fn half_width(&self) -> f32 {
        self.size.x * 0.5
    }

    /// Texture rectangle for the current animation frame
    pub fn texture_rect(&self) -> FrameRect {
        self.frames
            .get(self.animation.frame)
            .copied()
            .unwrap_or(FrameRect {
                x: 0.0,
                y: 0.0,
                w: 1.0,
                h: 1.0,
            })
    }
}

/// Camera: horizontal follow, vertical lock
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec2,
    pub viewport: Vec2,
}

impl Camera {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            position: Vec2::ZERO,
            viewport,
        }
    }

    pub fn follow(&mut self, player: &Player, mid_y: f32) {
        self.position = Vec2::new(player.position.x + player.half_width(), mid_y);
    }

    /// Visible rectangle
    pub fn view(&self) -> Bounds {
        Bounds::from_center(self.position, self.viewport)
    }
}

/// Decorative sun parented to the camera
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sun {
    pub image: String,
    /// Offset from the camera position
    pub offset: Vec2,
    pub size: Vec2,
    pub z: f32,
}

impl Sun {
    pub fn new(sheet: &SpriteSheet) -> Self {
        Self {
            image: sheet.name.clone(),
            offset: Vec2::new(-SUN_PADDING, SUN_SIZE),
            size: Vec2::splat(SUN_SIZE),
            z: -1.0,
        }
    }

    pub fn world_position(&self, camera: &Camera) -> Vec2 {
        camera.position + self.offset
    }
}

/// One-shot collectible
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Carrot {
    pub body: BodyId,
    pub position: Vec2,
}

impl Carrot {
    pub fn body_desc(position: Vec2) -> BodyDesc {
        BodyDesc::fixed(
            Shape::Circle {
                radius: CARROT_RADIUS,
            },
            position,
        )
        .with_category(Category::CARROT)
        .reporting_contacts(Category::BUNNY)
    }
}

/// Notable things that happened during a callback, drained by the host
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    LevelLoaded { level: u32 },
    PlayerReset { from_level: u32, to_level: u32 },
    TilesActivated { from: usize, until: usize, colliders: usize },
    SegmentsAdded { count: u32, ground_end: f32 },
    CollidersCulled { count: usize },
    CarrotCollected { position: Vec2 },
    Jumped,
}

/// Complete scene state owned by the controller
#[derive(Debug)]
pub struct SceneState {
    pub profile: SceneProfile,
    /// Scene frame, centered on the origin
    pub frame: Bounds,
    pub spawn: Vec2,
    pub player: Player,
    pub camera: Camera,
    pub sun: Sun,
    pub level: LevelLifecycle,
    /// Frames processed by `tick`
    pub frames: u64,
    pub resets: u32,
    events: Vec<SceneEvent>,
}

impl SceneState {
    pub fn new(
        profile: SceneProfile,
        frame: Bounds,
        player: Player,
        sun: Sun,
        level: LevelLifecycle,
    ) -> Self {
        let spawn = player.position;
        let mut camera = Camera::new(profile.scene_size);
        camera.follow(&player, frame.mid().y);
        Self {
            profile,
            frame,
            spawn,
            player,
            camera,
            sun,
            level,
            frames: 0,
            resets: 0,
            events: Vec::new(),
        }
    }

    /// Current level number, in `[1, level_count]`
    pub fn level_number(&self) -> u32 {
        self.level.level()
    }

    /// Right edge of the play area
    pub fn right_boundary(&self) -> f32 {
        match self.profile.right_limit {
            RightLimit::SceneFrame { inset } => self.frame.max.x - inset,
            RightLimit::CameraView => self.camera.view().max.x,
        }
    }

    /// Whether `p` has left the play area
    pub fn is_out_of_bounds(&self, p: Vec2) -> bool {
        let view = self.camera.view();
        p.x < view.min.x || p.x > self.right_boundary() || p.y < view.min.y || p.y > view.max.y
    }

    pub fn push_event(&mut self, event: SceneEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_animation_loops_at_frame_time() {
        let mut anim = Animation::new(4, PLAYER_FRAME_TIME);
        assert_eq!(anim.advance(10.0), 0);
        assert_eq!(anim.advance(10.1), 1);
        assert_eq!(anim.advance(10.2), 2);
        assert_eq!(anim.advance(10.3), 3);
        assert_eq!(anim.advance(10.37), 0);
        // Clock going backwards holds the first frame
        assert_eq!(anim.advance(5.0), 0);
    }

    #[test]
    fn test_camera_view_is_centered() {
        let mut camera = Camera::new(Vec2::new(1000.0, 800.0));
        camera.position = Vec2::new(50.0, 0.0);
        let view = camera.view();
        assert_eq!(view.min, Vec2::new(-450.0, -400.0));
        assert_eq!(view.max, Vec2::new(550.0, 400.0));
    }

    #[test]
    fn test_player_body_desc() {
        let desc = Player::body_desc(Vec2::ZERO, 20.0, 0.5);
        assert!(desc.dynamic);
        assert_eq!(desc.category, Category::BUNNY);
        assert_eq!(desc.collides_with, Category::GROUND);
        assert_eq!(desc.contact_test, Category::CARROT);
        assert_eq!(desc.restitution, PLAYER_RESTITUTION);
    }

    #[test]
    fn test_carrot_is_a_sensor() {
        let desc = Carrot::body_desc(Vec2::new(10.0, 10.0));
        assert!(!desc.dynamic);
        assert_eq!(desc.collides_with, Category::NONE);
        assert_eq!(desc.contact_test, Category::BUNNY);
    }

    #[test]
    fn test_sun_follows_camera() {
        let sheet = SpriteSheet::new(SUN_IMAGE, 32.0, 32.0, 1, 1);
        let sun = Sun::new(&sheet);
        let mut camera = Camera::new(Vec2::new(100.0, 100.0));
        camera.position = Vec2::new(400.0, 0.0);
        assert_eq!(sun.world_position(&camera), Vec2::new(350.0, 350.0));
        assert_eq!(sun.z, -1.0);
    }
}

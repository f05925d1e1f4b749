//! Scene controller callbacks
//!
//! `setup` builds the scene, `tick` runs once per rendered frame, `jump` and
//! `on_contact` react to discrete host events. Everything runs to completion
//! on the caller's thread.

use glam::Vec2;

use super::contact::{ContactAction, dispatch};
use super::level::{LevelLifecycle, StreamReport};
use super::ports::{Contact, PhysicsWorldPort};
use super::state::{Player, SceneEvent, SceneState, Sun};
use super::tilemap::Tilemap;
use crate::assets::AssetLibrary;
use crate::consts::*;
use crate::error::Result;
use crate::input::InputPort;
use crate::settings::{JumpPolicy, SceneProfile};
use crate::{Bounds, level_asset_name};

/// Build the scene: player, camera, sun, level 1 and its first colliders.
///
/// Every asset the session can need is resolved here, so a missing level or
/// image fails at startup rather than on a later level change.
pub fn setup<W: PhysicsWorldPort>(
    profile: SceneProfile,
    assets: &AssetLibrary,
    world: &mut W,
) -> Result<SceneState> {
    profile.validate()?;
    let frame = Bounds::from_center(Vec2::ZERO, profile.scene_size);

    let player_sheet = assets.sheet(PLAYER_SHEET)?;
    let sun = Sun::new(assets.sheet(SUN_IMAGE)?);

    let maps = if profile.ground_mode.uses_tiles() {
        (1..=profile.level_count)
            .map(|level| Tilemap::from_asset(assets.tilemap(&level_asset_name(level))?, frame.min))
            .collect::<Result<Vec<_>>>()?
    } else {
        Vec::new()
    };

    let spawn = Vec2::new(frame.min.x + SPAWN_OFFSET_X, frame.mid().y);
    let player = Player::spawn(world, player_sheet, spawn, profile.player_mass);

    let mut level = LevelLifecycle::new(&profile, frame, maps);
    level.load(world, 1);

    let mut scene = SceneState::new(profile, frame, player, sun, level);
    scene.push_event(SceneEvent::LevelLoaded { level: 1 });
    stream_ground(&mut scene, world);

    log::info!(
        "Scene '{}' ready: frame {:?}, spawn {:?}",
        scene.profile.name,
        scene.frame,
        scene.spawn
    );
    Ok(scene)
}

/// Per-frame update
pub fn tick<W: PhysicsWorldPort>(scene: &mut SceneState, world: &mut W, current_time: f64) {
    scene.frames += 1;
    let body = scene.player.body;

    // No tumbling
    world.set_rotation(body, 0.0);

    let Some(position) = world.position(body) else {
        log::warn!("Player body {:?} missing from physics world", body);
        return;
    };
    scene.player.position = position;
    scene.player.velocity = world.velocity(body).unwrap_or(Vec2::ZERO);

    let mid_y = scene.frame.mid().y;
    scene.camera.follow(&scene.player, mid_y);

    if scene.is_out_of_bounds(position) {
        reset_player(scene, world);
    }

    stream_ground(scene, world);

    scene.player.animation.advance(current_time);

    if let Some(margin) = scene.profile.cull_margin {
        let left_x = scene.camera.view().min.x - margin;
        let culled = scene.level.cull(world, left_x);
        if culled > 0 {
            log::debug!("Culled {} colliders left of {:.1}", culled, left_x);
            scene.push_event(SceneEvent::CollidersCulled { count: culled });
        }
    }
}

/// Apply the profile's jump policy. No grounded check, no cooldown.
pub fn jump<W: PhysicsWorldPort>(scene: &mut SceneState, world: &mut W) {
    let body = scene.player.body;
    let vector = scene.profile.jump.vector();
    match scene.profile.jump {
        JumpPolicy::Impulse { .. } => world.apply_impulse(body, vector),
        JumpPolicy::SetVelocity { .. } => world.set_velocity(body, vector),
    }
    scene.push_event(SceneEvent::Jumped);
}

/// Drain pending jump signals. Returns how many were applied.
pub fn pump_input<W: PhysicsWorldPort, I: InputPort>(
    scene: &mut SceneState,
    world: &mut W,
    input: &mut I,
) -> u32 {
    let jumps = input.take_jumps();
    for _ in 0..jumps {
        jump(scene, world);
    }
    jumps
}

/// Begin-contact callback from the physics host
pub fn on_contact<W: PhysicsWorldPort>(scene: &mut SceneState, world: &mut W, contact: &Contact) {
    match dispatch(contact) {
        ContactAction::CollectCarrot { player, carrot } => {
            if player != scene.player.body {
                log::trace!("Carrot contact with foreign body {:?}", player);
                return;
            }
            let Some(taken) = scene.level.take_carrot(carrot) else {
                log::trace!("Carrot {:?} already collected", carrot);
                return;
            };
            let (dx, dy) = CARROT_IMPULSE;
            world.apply_impulse(player, Vec2::new(dx, dy));
            world.remove_body(taken.body);
            log::info!("Carrot collected at {:?}", taken.position);
            scene.push_event(SceneEvent::CarrotCollected {
                position: taken.position,
            });
        }
        ContactAction::Ignore => {}
    }
}

/// Back to spawn, stopped, on the next level
fn reset_player<W: PhysicsWorldPort>(scene: &mut SceneState, world: &mut W) {
    let body = scene.player.body;
    let spawn = scene.spawn;
    world.set_position(body, spawn);
    world.set_velocity(body, Vec2::ZERO);
    world.set_rotation(body, 0.0);
    scene.player.position = spawn;
    scene.player.velocity = Vec2::ZERO;

    let from_level = scene.level.level();
    let to_level = scene.level.advance(world);
    scene.resets += 1;

    let mid_y = scene.frame.mid().y;
    scene.camera.follow(&scene.player, mid_y);

    log::info!("Player reset: level {} -> {}", from_level, to_level);
    scene.push_event(SceneEvent::PlayerReset {
        from_level,
        to_level,
    });
    scene.push_event(SceneEvent::LevelLoaded { level: to_level });
}

fn stream_ground<W: PhysicsWorldPort>(scene: &mut SceneState, world: &mut W) {
    let half_width = scene.frame.width() * 0.5;
    let report: StreamReport = scene.level.stream(
        world,
        scene.camera.position.x,
        scene.player.position.x,
        half_width,
    );

    if let Some(window) = report.tile_window {
        scene.push_event(SceneEvent::TilesActivated {
            from: window.from,
            until: window.until,
            colliders: report.tiles_activated,
        });
    }
    if report.segments_added > 0 {
        if let Some(ground_end) = scene.level.current_ground_end() {
            scene.push_event(SceneEvent::SegmentsAdded {
                count: report.segments_added,
                ground_end,
            });
        }
    }
}

//! Level lifecycle
//!
//! `Loaded(n)` -> `Unloading(n)` -> `Loaded(n % MAX + 1)`, forever. Every
//! frontier counter (tile window, tile trigger, ground end) lives here and is
//! reset in one place when a level is unloaded.

use glam::Vec2;

use super::ground::GroundGenerator;
use super::ports::{BodyId, PhysicsWorldPort};
use super::state::Carrot;
use super::tilemap::{TileWindow, Tilemap};
use crate::consts::*;
use crate::settings::{GroundMode, SceneProfile};
use crate::{Bounds, next_level};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelPhase {
    Loaded { level: u32 },
    /// Colliders detached, counters zeroed, next level not yet loaded
    Unloading { level: u32 },
}

impl LevelPhase {
    pub fn level(&self) -> u32 {
        match *self {
            LevelPhase::Loaded { level } | LevelPhase::Unloading { level } => level,
        }
    }
}

/// A collider this level registered with the physics host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveCollider {
    pub body: BodyId,
    /// Right-most x the collider covers
    pub max_x: f32,
}

/// What one streaming pass produced
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StreamReport {
    /// Window after activation, if tiles were activated this pass
    pub tile_window: Option<TileWindow>,
    pub tiles_activated: usize,
    pub segments_added: u32,
}

#[derive(Debug)]
pub struct LevelLifecycle {
    phase: LevelPhase,
    level_count: u32,
    mode: GroundMode,
    catch_up: bool,
    spawn_carrots: bool,
    frame: Bounds,
    /// One map per level, index `level - 1`; empty in procedural mode
    maps: Vec<Tilemap>,
    tiles: TileWindow,
    /// Trigger edge of the last tile activation
    tile_trigger_x: f32,
    ground: GroundGenerator,
    colliders: Vec<ActiveCollider>,
    carrot: Option<Carrot>,
}

impl LevelLifecycle {
    /// Create the lifecycle in `Unloading { level: 0 }`; call `load` next
    pub fn new(profile: &SceneProfile, frame: Bounds, maps: Vec<Tilemap>) -> Self {
        Self {
            phase: LevelPhase::Unloading { level: 0 },
            level_count: profile.level_count.max(1),
            mode: profile.ground_mode,
            catch_up: profile.catch_up,
            spawn_carrots: profile.carrots,
            frame,
            maps,
            tiles: TileWindow::default(),
            tile_trigger_x: TILE_TRIGGER_UNARMED,
            ground: GroundGenerator::new(
                profile.seed,
                profile.segment_width_min,
                profile.segment_width_max,
                profile.ground_height,
            ),
            colliders: Vec::new(),
            carrot: None,
        }
    }

    pub fn phase(&self) -> LevelPhase {
        self.phase
    }

    pub fn level(&self) -> u32 {
        self.phase.level()
    }

    pub fn tile_window(&self) -> TileWindow {
        self.tiles
    }

    pub fn tile_trigger_x(&self) -> f32 {
        self.tile_trigger_x
    }

    /// Ground frontier, when the generator is in use
    pub fn current_ground_end(&self) -> Option<f32> {
        self.mode.uses_generator().then(|| self.ground.current_ground_end())
    }

    pub fn colliders(&self) -> &[ActiveCollider] {
        &self.colliders
    }

    pub fn carrot(&self) -> Option<&Carrot> {
        self.carrot.as_ref()
    }

    pub fn current_map(&self) -> Option<&Tilemap> {
        let index = self.level().checked_sub(1)? as usize;
        self.maps.get(index)
    }

    /// Enter `Loaded { level }`: place the carrot and the initial ground run.
    ///
    /// Tile colliders are not created here; the first `stream` call activates
    /// the window around the camera.
    pub fn load<W: PhysicsWorldPort>(&mut self, world: &mut W, level: u32) {
        self.phase = LevelPhase::Loaded { level };

        let map_edge = self.current_map().map(|m| m.right_edge());
        let carrot_at = self
            .current_map()
            .filter(|_| self.spawn_carrots)
            .and_then(|m| m.carrot_position());

        if let Some(position) = carrot_at {
            let body = world.add_body(Carrot::body_desc(position));
            self.carrot = Some(Carrot { body, position });
        }

        if self.mode.uses_generator() {
            let start_x = match self.mode {
                GroundMode::Hybrid => map_edge.unwrap_or(self.frame.min.x),
                _ => self.frame.min.x,
            };
            self.ground.reset(start_x);
            let initial = self.ground.fill_to(self.frame.max.x);
            for segment in initial {
                let body = world.add_body(segment.collider_desc(self.frame.min.y));
                self.colliders.push(ActiveCollider {
                    body,
                    max_x: segment.end_x(),
                });
            }
        }

        log::info!(
            "Loaded level {} ({} mode, {} initial colliders)",
            level,
            self.mode.as_str(),
            self.colliders.len()
        );
    }

    /// Enter `Unloading`: detach every collider and zero the frontiers
    pub fn unload<W: PhysicsWorldPort>(&mut self, world: &mut W) {
        let level = self.level();
        self.phase = LevelPhase::Unloading { level };

        let detached = self.colliders.len();
        for collider in self.colliders.drain(..) {
            world.remove_body(collider.body);
        }
        if let Some(carrot) = self.carrot.take() {
            world.remove_body(carrot.body);
        }
        self.tiles.reset();
        self.tile_trigger_x = TILE_TRIGGER_UNARMED;

        log::debug!("Unloaded level {} ({} colliders detached)", level, detached);
    }

    /// Unload the current level and load the next one. Returns the new level.
    pub fn advance<W: PhysicsWorldPort>(&mut self, world: &mut W) -> u32 {
        let next = next_level(self.level(), self.level_count);
        self.unload(world);
        self.load(world, next);
        next
    }

    /// Extend tiles and/or ground toward the camera.
    ///
    /// Tiles: when `camera_x + half_width` has moved more than
    /// `TILE_TRIGGER_DISTANCE` past the last trigger, activate the next window.
    /// Ground: append one segment when the look-ahead edge nears the frontier,
    /// or keep appending when catch-up is enabled.
    pub fn stream<W: PhysicsWorldPort>(
        &mut self,
        world: &mut W,
        camera_x: f32,
        player_x: f32,
        half_width: f32,
    ) -> StreamReport {
        let mut report = StreamReport::default();
        if !matches!(self.phase, LevelPhase::Loaded { .. }) {
            return report;
        }

        let trigger_edge = camera_x + half_width;
        if self.mode.uses_tiles() && trigger_edge - self.tile_trigger_x > TILE_TRIGGER_DISTANCE {
            self.tile_trigger_x = trigger_edge;
            let index = self.level().saturating_sub(1) as usize;
            if let Some(map) = self.maps.get(index) {
                let cells = self.tiles.advance(map, trigger_edge);
                for &(column, row) in &cells {
                    let desc = map.collider_desc(column, row);
                    let max_x = desc.max_x();
                    let body = world.add_body(desc);
                    self.colliders.push(ActiveCollider { body, max_x });
                }
                report.tiles_activated = cells.len();
                report.tile_window = Some(self.tiles);
                log::debug!(
                    "Activated {} tile colliders, window now {}..{}",
                    cells.len(),
                    self.tiles.from,
                    self.tiles.until
                );
            }
        }

        if self.mode.uses_generator() {
            let limit = if self.catch_up { MAX_CATCH_UP_SEGMENTS } else { 1 };
            while report.segments_added < limit && self.ground.needs_extension(player_x, half_width) {
                let segment = self.ground.next_segment();
                let body = world.add_body(segment.collider_desc(self.frame.min.y));
                self.colliders.push(ActiveCollider {
                    body,
                    max_x: segment.end_x(),
                });
                report.segments_added += 1;
            }
            if report.segments_added > 0 {
                log::debug!(
                    "Appended {} ground segments, frontier at {:.1}",
                    report.segments_added,
                    self.ground.current_ground_end()
                );
            }
        }

        report
    }

    /// Remove colliders lying entirely left of `left_x`. Frontiers are untouched.
    pub fn cull<W: PhysicsWorldPort>(&mut self, world: &mut W, left_x: f32) -> usize {
        let before = self.colliders.len();
        self.colliders.retain(|collider| {
            let keep = collider.max_x >= left_x;
            if !keep {
                world.remove_body(collider.body);
            }
            keep
        });
        before - self.colliders.len()
    }

    /// Remove the carrot if `body` is it. Returns `None` once it has been taken.
    pub fn take_carrot(&mut self, body: BodyId) -> Option<Carrot> {
        match self.carrot {
            Some(carrot) if carrot.body == body => self.carrot.take(),
            _ => None,
        }
    }

    /// Scene position where the carrot currently sits
    pub fn carrot_position(&self) -> Option<Vec2> {
        self.carrot.map(|c| c.position)
    }
}

//! Scene simulation module
//!
//! All gameplay logic lives here. The physics host sits behind
//! `PhysicsWorldPort`; nothing in this module renders or touches a platform:
//! - Callbacks run to completion on the caller's thread
//! - Seeded RNG only
//! - Stable iteration order (by body ID)

pub mod collision;
pub mod contact;
pub mod ground;
pub mod level;
pub mod ports;
pub mod state;
pub mod tick;
pub mod tilemap;
pub mod world;

pub use collision::{CollisionResult, shapes_collide};
pub use contact::{ContactAction, dispatch};
pub use ground::{GroundGenerator, GroundSegment};
pub use level::{ActiveCollider, LevelLifecycle, LevelPhase, StreamReport};
pub use ports::{BodyDesc, BodyId, Category, Contact, PhysicsWorldPort, Shape};
pub use state::{Animation, Camera, Carrot, Player, SceneEvent, SceneState, Sun};
pub use tick::{jump, on_contact, pump_input, setup, tick};
pub use tilemap::{TileWindow, Tilemap};
pub use world::ReferenceWorld;

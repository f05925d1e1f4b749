//! Bunny Run headless driver
//!
//! Runs a scene against the reference physics world with a scripted jump
//! pattern and logs what happens.
//!
//! Usage: `bunny-run [profile-name | profile.json] [asset-dir] [frames]`

use std::path::Path;

use bunny_run::assets::AssetLibrary;
use bunny_run::consts::SIM_DT;
use bunny_run::error::Result;
use bunny_run::input::{PointerPhase, QueuedInput};
use bunny_run::settings::SceneProfile;
use bunny_run::sim::{ReferenceWorld, SceneEvent, on_contact, pump_input, setup, tick};

/// Frames between scripted taps
const TAP_INTERVAL: u64 = 45;
const DEFAULT_FRAMES: u64 = 3600;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Bunny Run (headless) starting...");

    if let Err(err) = run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is embedded by a host on wasm; there is no driver
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let profile = match args.first() {
        Some(arg) if arg.ends_with(".json") => SceneProfile::load_from(arg)?,
        Some(arg) => SceneProfile::from_name(arg)?,
        None => SceneProfile::default(),
    };

    let assets = match args.get(1) {
        Some(dir) => AssetLibrary::load_dir(Path::new(dir))?,
        None => AssetLibrary::builtin(profile.seed),
    };

    let frames = args
        .get(2)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_FRAMES);

    let mut world = ReferenceWorld::new(profile.gravity);
    let mut input = QueuedInput::new(profile.jump_trigger);
    let mut scene = setup(profile, &assets, &mut world)?;

    let mut jumps = 0u32;
    let mut carrots = 0u32;
    let mut time = 0.0f64;

    for frame in 0..frames {
        if frame % TAP_INTERVAL == 0 {
            input.pointer(PointerPhase::Began, 1);
        }
        if frame % TAP_INTERVAL == 1 {
            input.pointer(PointerPhase::Ended, 1);
        }

        jumps += pump_input(&mut scene, &mut world, &mut input);
        tick(&mut scene, &mut world, time);

        for contact in world.step(SIM_DT) {
            on_contact(&mut scene, &mut world, &contact);
        }
        time += SIM_DT as f64;

        for event in scene.drain_events() {
            match event {
                SceneEvent::CarrotCollected { .. } => {
                    carrots += 1;
                    log::info!("frame {}: {:?}", frame, event);
                }
                SceneEvent::PlayerReset { .. } | SceneEvent::LevelLoaded { .. } => {
                    log::info!("frame {}: {:?}", frame, event);
                }
                SceneEvent::Jumped => {}
                other => log::debug!("frame {}: {:?}", frame, other),
            }
        }
    }

    println!("Profile:    {}", scene.profile.name);
    println!("Frames:     {}", scene.frames);
    println!("Level:      {}", scene.level_number());
    println!("Resets:     {}", scene.resets);
    println!("Jumps:      {}", jumps);
    println!("Carrots:    {}", carrots);
    println!("Colliders:  {}", scene.level.colliders().len());
    println!("Bodies:     {}", world.body_count());
    println!("Player at:  {:.1}, {:.1}", scene.player.position.x, scene.player.position.y);
    if let Some(end) = scene.level.current_ground_end() {
        println!("Ground end: {:.1}", end);
    }

    Ok(())
}

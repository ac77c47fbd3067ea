//! Orbit scene demo.
//!
//! Builds a small world with an auto-rotating camera and a few drifting
//! bodies, runs it on the fixed-timestep tick loop, then saves the world as a
//! scene and restores it into a fresh coordinator.
//!
//! ```text
//! orbit_scene [SCENE_PATH]
//! ```
//!
//! The scene format follows the file extension (`.json`, `.mpk`). Set
//! `ECS_CONFIG` to a JSON file to override the world capacities.

mod serializers;
mod systems;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glam::Vec3;
use tracing::info;
use tracing_subscriber::EnvFilter;

use components::{Camera, Name, Transform, Velocity};
use engine_app::{Coordinator, TickConfig, TickLoop};
use engine_component::{EcsConfig, EcsError, Signature};
use engine_scene::{SceneFormat, SceneManager};

use systems::{BoundsSystem, CameraSystem, MovementSystem};

const BOUNDS_RADIUS: f32 = 6.0;

/// Register every demo component and system and declare system signatures.
pub fn register(coordinator: &mut Coordinator, radius: f32) -> Result<(), EcsError> {
    let transform = coordinator.register_component::<Transform>()?;
    let velocity = coordinator.register_component::<Velocity>()?;
    let camera = coordinator.register_component::<Camera>()?;
    coordinator.register_component::<Name>()?;

    coordinator.register_system(CameraSystem)?;
    coordinator.register_system(MovementSystem)?;
    coordinator.register_system(BoundsSystem::new(radius))?;

    coordinator.set_system_signature::<CameraSystem>(Signature::EMPTY.with(camera).with(transform))?;
    let moving = Signature::EMPTY.with(transform).with(velocity);
    coordinator.set_system_signature::<MovementSystem>(moving)?;
    coordinator.set_system_signature::<BoundsSystem>(moving)?;
    Ok(())
}

fn populate(coordinator: &mut Coordinator) -> Result<(), EcsError> {
    let camera = coordinator.create_entity()?;
    coordinator.add_component(camera, Name::new("camera"))?;
    coordinator.add_component(camera, Transform::default())?;
    coordinator.add_component(
        camera,
        Camera {
            distance: 8.0,
            pitch: 0.4,
            auto_rotate: true,
            ..Camera::default()
        },
    )?;

    let headings = [
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 0.5, 1.0),
        Vec3::new(-0.75, 0.25, 0.0),
    ];
    for (i, heading) in headings.into_iter().enumerate() {
        let body = coordinator.create_entity()?;
        coordinator.add_component(body, Name::new(format!("body-{i}")))?;
        coordinator.add_component(body, Transform::default())?;
        coordinator.add_component(body, Velocity { linear: heading })?;
    }
    Ok(())
}

fn load_config() -> Result<EcsConfig> {
    let Some(path) = std::env::var_os("ECS_CONFIG") else {
        return Ok(EcsConfig::default());
    };
    let path = Path::new(&path);
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading ECS config {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("parsing ECS config {}", path.display()))?;
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("orbit_scene=info".parse()?))
        .init();

    let config = load_config()?;
    let scene_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("orbit_scene.json"));
    let format = SceneFormat::from_path(&scene_path);

    let mut coordinator = Coordinator::with_config(config)?;
    register(&mut coordinator, BOUNDS_RADIUS)?;
    populate(&mut coordinator)?;

    let mut tick_loop = TickLoop::new(
        TickConfig {
            tick_rate: 120.0,
            max_ticks: 600,
        },
        coordinator,
    )?;
    tick_loop.add_system::<CameraSystem>()?;
    tick_loop.add_system::<MovementSystem>()?;
    tick_loop.add_system::<BoundsSystem>()?;
    tick_loop.run()?;

    let coordinator = tick_loop.into_coordinator();
    info!(
        entities = coordinator.entity_count(),
        respawned = coordinator.system::<BoundsSystem>()?.respawned,
        "simulation finished"
    );

    let scenes = SceneManager::new(serializers::registry());
    scenes.save_scene(&coordinator, &scene_path, format)?;

    let mut restored = Coordinator::with_config(config)?;
    register(&mut restored, BOUNDS_RADIUS)?;
    scenes.load_scene(&mut restored, &scene_path, format)?;

    anyhow::ensure!(
        restored.all_entities() == coordinator.all_entities(),
        "restored world has different entities"
    );
    for &entity in coordinator.all_entities() {
        if let Ok(camera) = coordinator.component::<Camera>(entity) {
            let eye = camera.eye();
            info!(%entity, x = eye.x, y = eye.y, z = eye.z, "camera eye");
            anyhow::ensure!(
                restored.component::<Camera>(entity)? == camera,
                "camera of {entity} changed across save and load"
            );
        }
    }
    info!(path = %scene_path.display(), entities = restored.entity_count(), "scene reloaded");
    Ok(())
}

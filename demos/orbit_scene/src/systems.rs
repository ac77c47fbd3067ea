//! Demo systems.

use glam::Vec3;
use tracing::debug;

use components::{Camera, Name, Transform, Velocity};
use engine_component::EcsError;
use engine_system::{System, SystemContext};

/// Moves every active orbit camera and writes its pose into the entity's
/// [`Transform`].
#[derive(Debug, Default)]
pub struct CameraSystem;

impl System for CameraSystem {
    fn update(&mut self, ctx: &mut SystemContext<'_>) -> Result<(), EcsError> {
        let dt = ctx.dt as f32;
        for &entity in ctx.entities() {
            let camera = {
                let camera = ctx.get_mut::<Camera>(entity)?;
                if !camera.active {
                    continue;
                }
                if camera.auto_rotate {
                    camera.yaw += camera.auto_rotate_speed * dt;
                }
                camera.pitch = camera.pitch.clamp(camera.min_pitch, camera.max_pitch);
                *camera
            };

            let transform = ctx.get_mut::<Transform>(entity)?;
            transform.position = camera.eye();
            transform.rotation = Vec3::new(camera.pitch, camera.yaw, 0.0);
        }
        Ok(())
    }
}

/// Integrates [`Velocity`] into [`Transform`].
#[derive(Debug, Default)]
pub struct MovementSystem;

impl System for MovementSystem {
    fn update(&mut self, ctx: &mut SystemContext<'_>) -> Result<(), EcsError> {
        let dt = ctx.dt as f32;
        for &entity in ctx.entities() {
            let velocity = ctx.get::<Velocity>(entity)?.linear;
            ctx.get_mut::<Transform>(entity)?.position += velocity * dt;
        }
        Ok(())
    }
}

/// Replaces bodies that drift beyond `radius` with a fresh one at the origin.
#[derive(Debug)]
pub struct BoundsSystem {
    pub radius: f32,
    pub respawned: usize,
}

impl BoundsSystem {
    #[must_use]
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            respawned: 0,
        }
    }
}

impl System for BoundsSystem {
    fn update(&mut self, ctx: &mut SystemContext<'_>) -> Result<(), EcsError> {
        for &entity in ctx.entities() {
            if ctx.get::<Transform>(entity)?.position.length() <= self.radius {
                continue;
            }
            let velocity = *ctx.get::<Velocity>(entity)?;
            let name = ctx
                .get::<Name>(entity)
                .cloned()
                .unwrap_or_else(|_| Name::new("body"));

            debug!(%entity, name = %name.value, "body left bounds");
            ctx.commands().destroy(entity);
            ctx.commands()
                .spawn()
                .with(Transform::default())
                .with(velocity)
                .with(name);
            self.respawned += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use engine_app::Coordinator;
    use engine_component::Signature;

    use super::*;
    use crate::register;

    fn world() -> Coordinator {
        let mut c = Coordinator::new();
        register(&mut c, 4.0).unwrap();
        c
    }

    #[test]
    fn test_movement_integrates_velocity() {
        let mut c = world();
        let e = c.create_entity().unwrap();
        c.add_component(e, Transform::default()).unwrap();
        c.add_component(e, Velocity::new(2.0, 0.0, 0.0)).unwrap();

        c.run_system::<MovementSystem>(0.25).unwrap();
        assert_eq!(c.component::<Transform>(e).unwrap().position, Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn test_camera_rotates_and_updates_transform() {
        let mut c = world();
        let e = c.create_entity().unwrap();
        c.add_component(e, Transform::default()).unwrap();
        c.add_component(
            e,
            Camera {
                auto_rotate: true,
                auto_rotate_speed: 1.0,
                ..Camera::default()
            },
        )
        .unwrap();

        c.run_system::<CameraSystem>(0.5).unwrap();
        let camera = *c.component::<Camera>(e).unwrap();
        assert_eq!(camera.yaw, 0.5);
        let transform = c.component::<Transform>(e).unwrap();
        assert_eq!(transform.position, camera.eye());
        assert_eq!(transform.rotation.y, 0.5);
    }

    #[test]
    fn test_inactive_camera_is_left_alone() {
        let mut c = world();
        let e = c.create_entity().unwrap();
        c.add_component(e, Transform::default()).unwrap();
        c.add_component(
            e,
            Camera {
                active: false,
                auto_rotate: true,
                ..Camera::default()
            },
        )
        .unwrap();

        c.run_system::<CameraSystem>(1.0).unwrap();
        assert_eq!(c.component::<Camera>(e).unwrap().yaw, 0.0);
        assert_eq!(c.component::<Transform>(e).unwrap(), &Transform::default());
    }

    #[test]
    fn test_bounds_respawns_through_commands() {
        let mut c = world();
        let inside = c.create_entity().unwrap();
        c.add_component(inside, Transform::default()).unwrap();
        c.add_component(inside, Velocity::ZERO).unwrap();
        let outside = c.create_entity().unwrap();
        c.add_component(outside, Transform::from_position(Vec3::new(10.0, 0.0, 0.0)))
            .unwrap();
        c.add_component(outside, Velocity::new(1.0, 0.0, 0.0)).unwrap();
        c.add_component(outside, Name::new("drifter")).unwrap();

        c.run_system::<BoundsSystem>(0.0).unwrap();

        assert!(!c.is_alive(outside));
        assert_eq!(c.system::<BoundsSystem>().unwrap().respawned, 1);
        assert_eq!(c.entity_count(), 2);
        let fresh = *c.all_entities().last().unwrap();
        assert_eq!(c.component::<Name>(fresh).unwrap(), &Name::new("drifter"));
        assert_eq!(c.component::<Transform>(fresh).unwrap().position, Vec3::ZERO);
        assert!(c.system_entities::<MovementSystem>().unwrap().contains(&fresh));
        assert_ne!(c.signature(fresh).unwrap(), Signature::EMPTY);
    }
}

//! Scene serializers for the demo components.
//!
//! `Transform` is stored in a flat layout so scene files stay easy to edit by
//! hand; the other kinds use their serde form.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use components::{Camera, Name, Transform, Velocity};
use engine_app::Coordinator;
use engine_component::Entity;
use engine_scene::{ComponentSerializer, SceneError, SerializationRegistry};

#[derive(Debug, Serialize, Deserialize)]
struct FlatTransform {
    pos_x: f32,
    pos_y: f32,
    pos_z: f32,
    rot_x: f32,
    rot_y: f32,
    rot_z: f32,
    scale_x: f32,
    scale_y: f32,
    scale_z: f32,
}

fn save_transform(coordinator: &Coordinator, entity: Entity) -> Result<Value, SceneError> {
    let t = coordinator.component::<Transform>(entity)?;
    let flat = FlatTransform {
        pos_x: t.position.x,
        pos_y: t.position.y,
        pos_z: t.position.z,
        rot_x: t.rotation.x,
        rot_y: t.rotation.y,
        rot_z: t.rotation.z,
        scale_x: t.scale.x,
        scale_y: t.scale.y,
        scale_z: t.scale.z,
    };
    Ok(serde_json::to_value(flat)?)
}

fn check_transform(data: &Value) -> Result<(), SceneError> {
    FlatTransform::deserialize(data)?;
    Ok(())
}

fn load_transform(
    coordinator: &mut Coordinator,
    entity: Entity,
    data: &Value,
) -> Result<(), SceneError> {
    let flat = FlatTransform::deserialize(data)?;
    let transform = Transform {
        position: Vec3::new(flat.pos_x, flat.pos_y, flat.pos_z),
        rotation: Vec3::new(flat.rot_x, flat.rot_y, flat.rot_z),
        scale: Vec3::new(flat.scale_x, flat.scale_y, flat.scale_z),
    };
    coordinator.upsert_component(entity, transform)?;
    Ok(())
}

/// Serializers for every demo component kind.
#[must_use]
pub fn registry() -> SerializationRegistry {
    let mut registry = SerializationRegistry::new();
    registry.register::<Transform>(ComponentSerializer::new::<Transform>(
        1,
        save_transform,
        load_transform,
    )
    .with_check(check_transform));
    registry.register_serde::<Velocity>();
    registry.register_serde::<Camera>();
    registry.register_serde::<Name>();
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_uses_flat_layout() {
        let mut c = Coordinator::new();
        c.register_component::<Transform>().unwrap();
        let e = c.create_entity().unwrap();
        let original = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Vec3::new(0.0, 0.5, 0.0),
            scale: Vec3::splat(2.0),
        };
        c.add_component(e, original).unwrap();

        let data = save_transform(&c, e).unwrap();
        assert_eq!(data["pos_y"], 2.0);
        assert_eq!(data["scale_z"], 2.0);

        c.component_mut::<Transform>(e).unwrap().position = Vec3::ZERO;
        load_transform(&mut c, e, &data).unwrap();
        assert_eq!(c.component::<Transform>(e).unwrap(), &original);
    }

    #[test]
    fn test_transform_check_rejects_nested_layout() {
        let registry = registry();
        let serializer = registry.find_by_name("Transform").unwrap();
        let nested = serde_json::to_value(Transform::IDENTITY).unwrap();
        assert!((serializer.check)(&nested).is_err());

        let mut c = Coordinator::new();
        c.register_component::<Transform>().unwrap();
        let e = c.create_entity().unwrap();
        c.add_component(e, Transform::IDENTITY).unwrap();
        let flat = save_transform(&c, e).unwrap();
        assert!((serializer.check)(&flat).is_ok());
    }

    #[test]
    fn test_registry_covers_demo_kinds() {
        let registry = registry();
        let names: Vec<_> = registry.iter().map(|(_, s)| s.name).collect();
        assert_eq!(names, ["Transform", "Velocity", "Camera", "Name"]);
    }
}

//! Saving and restoring whole worlds.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info, warn};

use engine_app::Coordinator;
use engine_component::EcsError;

use crate::error::SceneError;
use crate::registry::{ComponentSerializer, SerializationRegistry};
use crate::scene::{Scene, SceneEntity, SceneFormat};

/// The serializer and saved data for each component of one entity.
type Restore<'a> = Vec<(&'a ComponentSerializer, &'a Value)>;

/// Converts between a [`Coordinator`] and [`Scene`] snapshots using a
/// [`SerializationRegistry`].
#[derive(Debug, Default)]
pub struct SceneManager {
    registry: SerializationRegistry,
}

impl SceneManager {
    /// A manager saving and restoring the kinds in `registry`.
    #[must_use]
    pub fn new(registry: SerializationRegistry) -> Self {
        Self { registry }
    }

    /// The serializers in use.
    #[must_use]
    pub fn registry(&self) -> &SerializationRegistry {
        &self.registry
    }

    /// Mutable access to the serializers, for registering more kinds.
    pub fn registry_mut(&mut self) -> &mut SerializationRegistry {
        &mut self.registry
    }

    /// Snapshot every living entity and each of its components that has a
    /// registered serializer.
    ///
    /// # Errors
    ///
    /// Returns the first serializer failure.
    pub fn serialize_scene(&self, coordinator: &Coordinator) -> Result<Scene, SceneError> {
        // Serializers for kinds the world never registered cannot match anything.
        let active: Vec<_> = self
            .registry
            .iter()
            .filter_map(|(id, serializer)| {
                coordinator
                    .component_info(id)
                    .map(|info| (info.ty, serializer))
            })
            .collect();

        let mut entities = Vec::with_capacity(coordinator.entity_count());
        for &entity in coordinator.all_entities() {
            let mut components = BTreeMap::new();
            for &(ty, serializer) in &active {
                if coordinator.has_component_type(ty, entity) {
                    let data = (serializer.serialize)(coordinator, entity)?;
                    components.insert(serializer.name.to_string(), data);
                }
            }
            entities.push(SceneEntity {
                id: entity,
                components,
            });
        }

        let schemas = active
            .iter()
            .map(|(_, serializer)| (serializer.name.to_string(), serializer.schema_version))
            .collect();

        debug!(entities = entities.len(), kinds = active.len(), "serialized scene");
        Ok(Scene { schemas, entities })
    }

    /// Recreate the entities of `scene` under their saved ids and attach
    /// their components.
    ///
    /// Ids, component names and component data are all checked before the
    /// world is touched. Only a custom deserializer registered without a
    /// [check](ComponentSerializer::with_check) can still fail partway, and
    /// then the entities restored so far stay in place.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::UnknownComponent`] for a name without a
    /// serializer, [`SceneError::Ecs`] if an id is taken, repeated or out of
    /// range or a kind is not registered with the world, or the first failing
    /// data check or deserializer.
    pub fn deserialize_scene(
        &self,
        coordinator: &mut Coordinator,
        scene: &Scene,
    ) -> Result<(), SceneError> {
        let plan = self.plan(coordinator, scene, false)?;
        Self::restore(coordinator, scene, plan)
    }

    /// Resolve every saved component to its serializer and validate the
    /// scene against the world. With `replacing`, ids living in the world
    /// are accepted because the world is about to be reset.
    fn plan<'a>(
        &'a self,
        coordinator: &Coordinator,
        scene: &'a Scene,
        replacing: bool,
    ) -> Result<Vec<Restore<'a>>, SceneError> {
        let max = coordinator.config().max_entities;
        let mut seen = BTreeSet::new();
        let mut plan = Vec::with_capacity(scene.entities.len());

        for saved in &scene.entities {
            let id = saved.id;
            if id.0 >= max {
                return Err(EcsError::OutOfRange { entity: id, max }.into());
            }
            if !seen.insert(id) || (!replacing && coordinator.is_alive(id)) {
                return Err(EcsError::IdInUse(id).into());
            }

            let mut components = Vec::with_capacity(saved.components.len());
            for (name, data) in &saved.components {
                let (id, serializer) = self
                    .registry
                    .entry(name)
                    .ok_or_else(|| SceneError::UnknownComponent(name.clone()))?;
                if coordinator.component_info(id).is_none() {
                    return Err(EcsError::UnregisteredComponent(serializer.name).into());
                }
                (serializer.check)(data)?;
                components.push((serializer, data));
            }
            plan.push(components);
        }

        for (name, &version) in &scene.schemas {
            if let Some(serializer) = self.registry.find_by_name(name) {
                if serializer.schema_version != version {
                    warn!(
                        component = serializer.name,
                        saved = version,
                        current = serializer.schema_version,
                        "scene written with a different component schema version"
                    );
                }
            }
        }
        Ok(plan)
    }

    fn restore(
        coordinator: &mut Coordinator,
        scene: &Scene,
        plan: Vec<Restore<'_>>,
    ) -> Result<(), SceneError> {
        for (saved, components) in scene.entities.iter().zip(plan) {
            let entity = coordinator.create_entity_with_id(saved.id)?;
            for (serializer, data) in components {
                (serializer.deserialize)(coordinator, entity, data)?;
            }
        }

        debug!(entities = scene.entities.len(), "deserialized scene");
        Ok(())
    }

    /// Serialize the world and write it to `path`.
    ///
    /// # Errors
    ///
    /// Returns serializer, encoding or I/O failures.
    pub fn save_scene(
        &self,
        coordinator: &Coordinator,
        path: impl AsRef<Path>,
        format: SceneFormat,
    ) -> Result<(), SceneError> {
        let path = path.as_ref();
        let bytes = self.serialize_scene(coordinator)?.to_bytes(format)?;
        std::fs::write(path, &bytes)?;
        info!(path = %path.display(), ?format, bytes = bytes.len(), "scene saved");
        Ok(())
    }

    /// Replace the world's entities with the scene stored at `path`.
    ///
    /// The file is read, decoded and validated as in
    /// [`SceneManager::deserialize_scene`] before the world is reset, so a
    /// missing, malformed or inconsistent file leaves the world untouched.
    ///
    /// # Errors
    ///
    /// Returns I/O, decoding or restore failures.
    pub fn load_scene(
        &self,
        coordinator: &mut Coordinator,
        path: impl AsRef<Path>,
        format: SceneFormat,
    ) -> Result<(), SceneError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let scene = Scene::from_bytes(&bytes, format)?;
        let plan = self.plan(coordinator, &scene, true)?;

        coordinator.destroy_all_entities();
        Self::restore(coordinator, &scene, plan)?;
        info!(path = %path.display(), ?format, entities = scene.len(), "scene loaded");
        Ok(())
    }
}

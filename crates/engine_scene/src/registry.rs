//! Per-component serializer registry.
//!
//! The ECS core knows nothing about persistence. Applications register one
//! [`ComponentSerializer`] per component kind they want saved; kinds without
//! a serializer are simply left out of scene files.

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use engine_app::Coordinator;
use engine_component::{Component, ComponentTypeId, Entity};

use crate::error::SceneError;

/// Produces the data form of the component attached to an entity.
pub type SerializeFn = fn(&Coordinator, Entity) -> Result<Value, SceneError>;

/// Attaches a component to an entity from its data form.
pub type DeserializeFn = fn(&mut Coordinator, Entity, &Value) -> Result<(), SceneError>;

/// Checks that a data form can be restored, without touching any world.
pub type CheckFn = fn(&Value) -> Result<(), SceneError>;

/// A serialize/deserialize pair for one component kind.
#[derive(Debug, Clone, Copy)]
pub struct ComponentSerializer {
    /// The component kind's name; the key used in scene files.
    pub name: &'static str,
    /// Version of the data layout this serializer reads and writes.
    pub schema_version: u32,
    /// Reads the component off an entity.
    pub serialize: SerializeFn,
    /// Writes the component onto an entity.
    pub deserialize: DeserializeFn,
    /// Run over every value of a scene before the world is modified.
    pub check: CheckFn,
}

impl ComponentSerializer {
    /// A serializer for `T` built from explicit conversion functions.
    ///
    /// It accepts any data until [`ComponentSerializer::with_check`] installs
    /// a check, so a malformed value only surfaces once restoring has begun.
    #[must_use]
    pub fn new<T: Component>(
        schema_version: u32,
        serialize: SerializeFn,
        deserialize: DeserializeFn,
    ) -> Self {
        Self {
            name: T::type_name(),
            schema_version,
            serialize,
            deserialize,
            check: accept_any,
        }
    }

    /// Replace the data check run before restoring.
    #[must_use]
    pub fn with_check(self, check: CheckFn) -> Self {
        Self { check, ..self }
    }

    /// A serializer for `T` using its serde representation.
    ///
    /// Restoring overwrites any `T` the entity already holds.
    #[must_use]
    pub fn serde<T>(schema_version: u32) -> Self
    where
        T: Component + Serialize + DeserializeOwned,
    {
        Self::new::<T>(schema_version, serialize_serde::<T>, deserialize_serde::<T>)
            .with_check(check_serde::<T>)
    }
}

fn accept_any(_data: &Value) -> Result<(), SceneError> {
    Ok(())
}

fn decode<T>(data: &Value) -> Result<T, SceneError>
where
    T: Component + DeserializeOwned,
{
    T::deserialize(data).map_err(|source| SceneError::Component {
        component: T::type_name(),
        source,
    })
}

fn check_serde<T>(data: &Value) -> Result<(), SceneError>
where
    T: Component + DeserializeOwned,
{
    decode::<T>(data).map(|_| ())
}

fn serialize_serde<T>(coordinator: &Coordinator, entity: Entity) -> Result<Value, SceneError>
where
    T: Component + Serialize,
{
    let value = coordinator.component::<T>(entity)?;
    serde_json::to_value(value).map_err(|source| SceneError::Component {
        component: T::type_name(),
        source,
    })
}

fn deserialize_serde<T>(
    coordinator: &mut Coordinator,
    entity: Entity,
    data: &Value,
) -> Result<(), SceneError>
where
    T: Component + DeserializeOwned,
{
    coordinator.upsert_component(entity, decode::<T>(data)?)?;
    Ok(())
}

/// Serializers keyed by component identity, kept in registration order.
#[derive(Debug, Default)]
pub struct SerializationRegistry {
    serializers: Vec<(ComponentTypeId, ComponentSerializer)>,
    by_id: HashMap<ComponentTypeId, usize>,
    by_name: HashMap<&'static str, usize>,
}

impl SerializationRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the serializer for `T`, returning the one it replaces.
    pub fn register<T: Component>(
        &mut self,
        serializer: ComponentSerializer,
    ) -> Option<ComponentSerializer> {
        let id = T::component_type_id();
        let serializer = ComponentSerializer {
            name: T::type_name(),
            ..serializer
        };
        debug!(component = serializer.name, schema_version = serializer.schema_version, "registered serializer");

        if let Some(&index) = self.by_id.get(&id) {
            return Some(std::mem::replace(&mut self.serializers[index].1, serializer));
        }
        let index = self.serializers.len();
        self.serializers.push((id, serializer));
        self.by_id.insert(id, index);
        self.by_name.insert(serializer.name, index);
        None
    }

    /// Register the serde-backed serializer for `T` at schema version 1.
    pub fn register_serde<T>(&mut self) -> Option<ComponentSerializer>
    where
        T: Component + Serialize + DeserializeOwned,
    {
        self.register::<T>(ComponentSerializer::serde::<T>(1))
    }

    /// The serializer registered for the kind `id`.
    #[must_use]
    pub fn find(&self, id: ComponentTypeId) -> Option<&ComponentSerializer> {
        self.by_id.get(&id).map(|&index| &self.serializers[index].1)
    }

    /// The serializer whose scene key is `name`.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&ComponentSerializer> {
        self.by_name.get(name).map(|&index| &self.serializers[index].1)
    }

    /// Like [`SerializationRegistry::find_by_name`], paired with the kind's id.
    pub(crate) fn entry(&self, name: &str) -> Option<(ComponentTypeId, &ComponentSerializer)> {
        self.by_name.get(name).map(|&index| {
            let (id, serializer) = &self.serializers[index];
            (*id, serializer)
        })
    }

    /// Every registered serializer in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (ComponentTypeId, &ComponentSerializer)> {
        self.serializers.iter().map(|(id, s)| (*id, s))
    }

    /// Number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.serializers.len()
    }

    /// Whether no kind has a serializer.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.serializers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Health(u32);

    impl Component for Health {
        fn type_name() -> &'static str {
            "Health"
        }
    }

    fn save_doubled(c: &Coordinator, e: Entity) -> Result<Value, SceneError> {
        Ok(Value::from(c.component::<Health>(e)?.0 * 2))
    }

    fn load_halved(c: &mut Coordinator, e: Entity, data: &Value) -> Result<(), SceneError> {
        let raw = u32::deserialize(data)?;
        c.upsert_component(e, Health(raw / 2))?;
        Ok(())
    }

    #[test]
    fn test_register_and_find() {
        let mut registry = SerializationRegistry::new();
        assert!(registry.register_serde::<Health>().is_none());
        let found = registry.find(Health::component_type_id()).unwrap();
        assert_eq!(found.name, "Health");
        assert_eq!(found.schema_version, 1);
        assert!(registry.find_by_name("Health").is_some());
        assert!(registry.find_by_name("Mana").is_none());
    }

    #[test]
    fn test_reregister_replaces() {
        let mut registry = SerializationRegistry::new();
        registry.register_serde::<Health>();
        let previous = registry
            .register::<Health>(ComponentSerializer::new::<Health>(2, save_doubled, load_halved));
        assert_eq!(previous.map(|s| s.schema_version), Some(1));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.iter().next().unwrap().1.schema_version, 2);
    }

    #[test]
    fn test_serde_serializer_round_trips_value() {
        let mut c = Coordinator::new();
        c.register_component::<Health>().unwrap();
        let e = c.create_entity().unwrap();
        c.add_component(e, Health(40)).unwrap();

        let serializer = ComponentSerializer::serde::<Health>(1);
        let data = (serializer.serialize)(&c, e).unwrap();
        assert_eq!(data, Value::from(40));

        (serializer.deserialize)(&mut c, e, &Value::from(7)).unwrap();
        assert_eq!(c.component::<Health>(e).unwrap(), &Health(7));
    }

    #[test]
    fn test_custom_serializer() {
        let mut c = Coordinator::new();
        c.register_component::<Health>().unwrap();
        let e = c.create_entity().unwrap();
        c.add_component(e, Health(10)).unwrap();

        let serializer = ComponentSerializer::new::<Health>(2, save_doubled, load_halved);
        let data = (serializer.serialize)(&c, e).unwrap();
        (serializer.deserialize)(&mut c, e, &data).unwrap();
        assert_eq!(c.component::<Health>(e).unwrap(), &Health(10));
    }

    #[test]
    fn test_check_matches_deserializer() {
        let serde = ComponentSerializer::serde::<Health>(1);
        assert!((serde.check)(&Value::from(3)).is_ok());
        assert!(matches!(
            (serde.check)(&Value::from("full")),
            Err(SceneError::Component { component: "Health", .. })
        ));

        let custom = ComponentSerializer::new::<Health>(2, save_doubled, load_halved);
        assert!((custom.check)(&Value::from("full")).is_ok());
        let checked = custom.with_check(check_serde::<Health>);
        assert!((checked.check)(&Value::from("full")).is_err());
        assert_eq!(checked.schema_version, 2);
    }

    #[test]
    fn test_bad_data_reports_component() {
        let mut c = Coordinator::new();
        c.register_component::<Health>().unwrap();
        let e = c.create_entity().unwrap();
        let err = (ComponentSerializer::serde::<Health>(1).deserialize)(
            &mut c,
            e,
            &Value::from("full"),
        )
        .unwrap_err();
        assert!(matches!(err, SceneError::Component { component: "Health", .. }));
        assert!(!c.has_component::<Health>(e));
    }
}

//! Component registry: one [`ComponentStore`] per registered kind.
//!
//! Stores are kept behind the [`ComponentStorage`] capability trait in a
//! vector indexed by [`ComponentType`]. A name-derived [`ComponentTypeId`]
//! maps each kind to its slot; typed access downcasts the boxed store back to
//! its concrete [`ComponentStore<T>`].

use std::collections::HashMap;

use tracing::info;

use crate::component::{Component, ComponentInfo, ComponentType, ComponentTypeId};
use crate::entity::Entity;
use crate::error::EcsError;
use crate::signature::MAX_COMPONENT_TYPES;
use crate::storage::{ComponentStorage, ComponentStore};

struct Registered {
    info: ComponentInfo,
    store: Box<dyn ComponentStorage>,
}

/// Owns every component store of a world.
pub struct ComponentManager {
    /// Stores in registration order; position `i` holds `ComponentType(i)`.
    registered: Vec<Registered>,
    /// Stable id → registration index.
    by_id: HashMap<ComponentTypeId, ComponentType>,
    max_component_types: usize,
}

impl ComponentManager {
    /// Creates an empty registry accepting up to `max_component_types` kinds.
    ///
    /// The limit is capped at [`MAX_COMPONENT_TYPES`], the signature width.
    #[must_use]
    pub fn new(max_component_types: usize) -> Self {
        Self {
            registered: Vec::new(),
            by_id: HashMap::new(),
            max_component_types: max_component_types.min(MAX_COMPONENT_TYPES),
        }
    }

    /// The effective kind limit.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.max_component_types
    }

    /// Register component kind `T` and assign it the next [`ComponentType`].
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::DuplicateRegistration`] if a kind with the same
    /// name is already registered and [`EcsError::CapacityExceeded`] when the
    /// kind limit is reached.
    pub fn register<T: Component>(&mut self) -> Result<ComponentType, EcsError> {
        let id = T::component_type_id();
        if self.by_id.contains_key(&id) {
            return Err(EcsError::DuplicateRegistration(T::type_name().to_string()));
        }
        if self.registered.len() >= self.max_component_types {
            return Err(EcsError::CapacityExceeded {
                resource: "component type",
                capacity: self.max_component_types,
            });
        }

        // `max_component_types` never exceeds the signature width, so the
        // index fits in a u8.
        let ty = ComponentType(self.registered.len() as u8);
        let info = ComponentInfo {
            ty,
            id,
            name: T::type_name(),
        };
        self.registered.push(Registered {
            info,
            store: Box::new(ComponentStore::<T>::new()),
        });
        self.by_id.insert(id, ty);

        info!(component = info.name, ty = ty.0, "registered component type");
        Ok(ty)
    }

    /// Returns the [`ComponentType`] of `T`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnregisteredComponent`] if `T` was never registered.
    pub fn component_type<T: Component>(&self) -> Result<ComponentType, EcsError> {
        self.by_id
            .get(&T::component_type_id())
            .copied()
            .ok_or(EcsError::UnregisteredComponent(T::type_name()))
    }

    /// Looks a kind up by its stable id.
    #[must_use]
    pub fn info_by_id(&self, id: ComponentTypeId) -> Option<ComponentInfo> {
        let ty = self.by_id.get(&id)?;
        Some(self.registered[ty.index()].info)
    }

    /// Every registered kind in registration order.
    pub fn infos(&self) -> impl Iterator<Item = ComponentInfo> + '_ {
        self.registered.iter().map(|r| r.info)
    }

    /// Number of registered kinds.
    #[must_use]
    pub fn registered_count(&self) -> usize {
        self.registered.len()
    }

    /// Typed store of `T`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnregisteredComponent`] if `T` was never registered.
    pub fn store<T: Component>(&self) -> Result<&ComponentStore<T>, EcsError> {
        let ty = self.component_type::<T>()?;
        self.registered[ty.index()]
            .store
            .as_any()
            .downcast_ref::<ComponentStore<T>>()
            .ok_or(EcsError::UnregisteredComponent(T::type_name()))
    }

    /// Typed mutable store of `T`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnregisteredComponent`] if `T` was never registered.
    pub fn store_mut<T: Component>(&mut self) -> Result<&mut ComponentStore<T>, EcsError> {
        let ty = self.component_type::<T>()?;
        self.registered[ty.index()]
            .store
            .as_any_mut()
            .downcast_mut::<ComponentStore<T>>()
            .ok_or(EcsError::UnregisteredComponent(T::type_name()))
    }

    /// Returns `true` if `entity` holds a `T`. Unregistered kinds report
    /// `false`.
    #[must_use]
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.store::<T>().is_ok_and(|store| store.has(entity))
    }

    /// Type-erased presence check by registration index.
    #[must_use]
    pub fn has_type(&self, ty: ComponentType, entity: Entity) -> bool {
        self.registered
            .get(ty.index())
            .is_some_and(|r| r.store.has(entity))
    }

    /// Type-erased store by registration index.
    #[must_use]
    pub fn storage(&self, ty: ComponentType) -> Option<&dyn ComponentStorage> {
        self.registered.get(ty.index()).map(|r| r.store.as_ref())
    }

    /// Purge `entity` from every store.
    pub fn entity_destroyed(&mut self, entity: Entity) {
        for registered in &mut self.registered {
            registered.store.on_entity_destroyed(entity);
        }
    }

    /// Empty every store, keeping the registrations.
    pub fn clear_all(&mut self) {
        for registered in &mut self.registered {
            registered.store.clear();
        }
    }
}

impl std::fmt::Debug for ComponentManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentManager")
            .field(
                "registered",
                &self.registered.iter().map(|r| r.info.name).collect::<Vec<_>>(),
            )
            .field("max_component_types", &self.max_component_types)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Position(i32, i32);

    impl Component for Position {
        fn type_name() -> &'static str {
            "Position"
        }
    }

    #[derive(Debug, PartialEq)]
    struct Tag;

    impl Component for Tag {
        fn type_name() -> &'static str {
            "Tag"
        }
    }

    #[test]
    fn test_types_assigned_in_registration_order() {
        let mut components = ComponentManager::new(8);
        assert_eq!(components.register::<Tag>().unwrap(), ComponentType(0));
        assert_eq!(components.register::<Position>().unwrap(), ComponentType(1));
        assert_eq!(components.component_type::<Position>().unwrap(), ComponentType(1));

        let names: Vec<_> = components.infos().map(|i| i.name).collect();
        assert_eq!(names, ["Tag", "Position"]);
    }

    #[test]
    fn test_duplicate_registration() {
        let mut components = ComponentManager::new(8);
        components.register::<Tag>().unwrap();
        assert_eq!(
            components.register::<Tag>(),
            Err(EcsError::DuplicateRegistration("Tag".into()))
        );
        assert_eq!(components.registered_count(), 1);
    }

    #[test]
    fn test_component_kind_capacity() {
        let mut components = ComponentManager::new(1);
        components.register::<Tag>().unwrap();
        assert!(matches!(
            components.register::<Position>(),
            Err(EcsError::CapacityExceeded { capacity: 1, .. })
        ));
    }

    struct Kind<const N: usize>;

    impl<const N: usize> Component for Kind<N> {
        fn type_name() -> &'static str {
            std::any::type_name::<Self>()
        }
    }

    macro_rules! register_kinds {
        ($components:expr; $($n:literal)*) => {
            vec![$($components.register::<Kind<$n>>()),*]
        };
    }

    #[test]
    fn test_kind_limit_capped_at_signature_width() {
        let mut components = ComponentManager::new(100);
        assert_eq!(components.capacity(), MAX_COMPONENT_TYPES);

        let results = register_kinds!(components;
            0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15
            16 17 18 19 20 21 22 23 24 25 26 27 28 29 30 31
            32 33 34 35 36 37 38 39 40 41 42 43 44 45 46 47
            48 49 50 51 52 53 54 55 56 57 58 59 60 61 62 63
            64);
        let (ok, rejected) = results.split_at(MAX_COMPONENT_TYPES);
        assert!(ok.iter().all(Result::is_ok));
        assert_eq!(ok[63], Ok(ComponentType(63)));
        assert_eq!(
            rejected,
            [Err(EcsError::CapacityExceeded {
                resource: "component type",
                capacity: MAX_COMPONENT_TYPES,
            })]
        );
        assert_eq!(components.registered_count(), MAX_COMPONENT_TYPES);
    }

    #[test]
    fn test_unregistered_access() {
        let mut components = ComponentManager::new(8);
        assert_eq!(
            components.store_mut::<Position>().unwrap_err(),
            EcsError::UnregisteredComponent("Position")
        );
        assert!(!components.has::<Position>(Entity(0)));
    }

    #[test]
    fn test_type_erased_operations() {
        let mut components = ComponentManager::new(8);
        let pos = components.register::<Position>().unwrap();
        let tag = components.register::<Tag>().unwrap();
        components.store_mut::<Position>().unwrap().insert(Entity(1), Position(1, 2)).unwrap();
        components.store_mut::<Tag>().unwrap().insert(Entity(1), Tag).unwrap();
        components.store_mut::<Tag>().unwrap().insert(Entity(2), Tag).unwrap();

        assert!(components.has_type(pos, Entity(1)));
        assert!(!components.has_type(pos, Entity(2)));
        assert!(!components.has_type(ComponentType(9), Entity(1)));

        components.entity_destroyed(Entity(1));
        assert!(!components.has::<Position>(Entity(1)));
        assert!(!components.has::<Tag>(Entity(1)));
        assert_eq!(components.storage(tag).map(|s| s.len()), Some(1));

        components.clear_all();
        assert_eq!(components.storage(tag).map(|s| s.len()), Some(0));
        assert_eq!(components.registered_count(), 2);
    }

    #[test]
    fn test_info_by_id() {
        let mut components = ComponentManager::new(8);
        components.register::<Position>().unwrap();
        let info = components
            .info_by_id(ComponentTypeId::from_name("Position"))
            .unwrap();
        assert_eq!(info.ty, ComponentType(0));
        assert!(components.info_by_id(ComponentTypeId::from_name("Tag")).is_none());
    }
}

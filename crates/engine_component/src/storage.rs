//! Packed per-kind component storage.
//!
//! A [`ComponentStore<T>`] keeps every `T` in one contiguous vector with no
//! gaps. Two index maps tie it to entities:
//!
//! - `sparse[entity]` → slot in `dense` (or `None`)
//! - `entities[slot]` → owning entity
//!
//! Removal swaps the last element into the freed slot and patches the moved
//! entity's sparse entry, so insert, remove and lookup are all O(1).

use std::any::Any;

use crate::component::Component;
use crate::entity::Entity;
use crate::error::EcsError;

/// Type-erased capability interface over a [`ComponentStore`].
///
/// The [`ComponentManager`](crate::ComponentManager) uses it for bulk work
/// (entity destruction, full resets, presence checks) without knowing the
/// concrete component kind.
pub trait ComponentStorage: Any {
    /// Drop the entity's component if present. No-op otherwise.
    fn on_entity_destroyed(&mut self, entity: Entity);

    /// Returns `true` if the entity holds a component in this store.
    fn has(&self, entity: Entity) -> bool;

    /// Number of packed components.
    fn len(&self) -> usize;

    /// Returns `true` if the store holds no component.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every component.
    fn clear(&mut self);

    /// Name of the stored component kind.
    fn component_name(&self) -> &'static str;

    /// Upcast for typed downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for typed downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Dense storage for one component kind.
#[derive(Debug)]
pub struct ComponentStore<T> {
    /// Packed component values.
    dense: Vec<T>,
    /// Owning entity of each packed slot. Always the same length as `dense`.
    entities: Vec<Entity>,
    /// Packed slot of each entity, indexed by [`Entity::index`].
    sparse: Vec<Option<usize>>,
}

impl<T: Component> ComponentStore<T> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dense: Vec::new(),
            entities: Vec::new(),
            sparse: Vec::new(),
        }
    }

    /// Attach `value` to `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::DuplicateComponent`] if the entity already holds a
    /// value; the existing value is left untouched.
    pub fn insert(&mut self, entity: Entity, value: T) -> Result<(), EcsError> {
        if self.has(entity) {
            return Err(EcsError::DuplicateComponent {
                component: T::type_name(),
                entity,
            });
        }
        if entity.index() >= self.sparse.len() {
            self.sparse.resize(entity.index() + 1, None);
        }
        self.sparse[entity.index()] = Some(self.dense.len());
        self.dense.push(value);
        self.entities.push(entity);
        Ok(())
    }

    /// Detach and return the entity's value.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentNotFound`] if the entity holds no value.
    pub fn remove(&mut self, entity: Entity) -> Result<T, EcsError> {
        let slot = self.slot(entity)?;
        let value = self.dense.swap_remove(slot);
        self.entities.swap_remove(slot);
        // The former last element now lives in `slot`.
        if let Some(&moved) = self.entities.get(slot) {
            self.sparse[moved.index()] = Some(slot);
        }
        self.sparse[entity.index()] = None;
        Ok(value)
    }

    /// Overwrite the entity's existing value, returning the old one.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentNotFound`] if the entity holds no value.
    pub fn replace(&mut self, entity: Entity, value: T) -> Result<T, EcsError> {
        let slot = self.slot(entity)?;
        Ok(std::mem::replace(&mut self.dense[slot], value))
    }

    /// Returns the entity's value.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentNotFound`] if the entity holds no value.
    pub fn get(&self, entity: Entity) -> Result<&T, EcsError> {
        let slot = self.slot(entity)?;
        Ok(&self.dense[slot])
    }

    /// Returns the entity's value mutably.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentNotFound`] if the entity holds no value.
    pub fn get_mut(&mut self, entity: Entity) -> Result<&mut T, EcsError> {
        let slot = self.slot(entity)?;
        Ok(&mut self.dense[slot])
    }

    /// Entities in packed order.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Iterate `(entity, &value)` pairs in packed order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.entities.iter().copied().zip(self.dense.iter())
    }

    /// Iterate `(entity, &mut value)` pairs in packed order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.entities.iter().copied().zip(self.dense.iter_mut())
    }

    fn slot(&self, entity: Entity) -> Result<usize, EcsError> {
        self.sparse
            .get(entity.index())
            .copied()
            .flatten()
            .ok_or(EcsError::ComponentNotFound {
                component: T::type_name(),
                entity,
            })
    }
}

impl<T: Component> Default for ComponentStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> ComponentStorage for ComponentStore<T> {
    fn on_entity_destroyed(&mut self, entity: Entity) {
        if self.has(entity) {
            let _ = self.remove(entity);
        }
    }

    fn has(&self, entity: Entity) -> bool {
        matches!(self.sparse.get(entity.index()), Some(Some(_)))
    }

    fn len(&self) -> usize {
        self.dense.len()
    }

    fn clear(&mut self) {
        self.dense.clear();
        self.entities.clear();
        self.sparse.clear();
    }

    fn component_name(&self) -> &'static str {
        T::type_name()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Mass(f32);

    impl Component for Mass {
        fn type_name() -> &'static str {
            "Mass"
        }
    }

    fn packed_consistent(store: &ComponentStore<Mass>) -> bool {
        store.dense.len() == store.entities.len()
            && store
                .entities
                .iter()
                .enumerate()
                .all(|(slot, e)| store.sparse[e.index()] == Some(slot))
            && store.sparse.iter().flatten().count() == store.dense.len()
    }

    #[test]
    fn test_insert_and_get() {
        let mut store = ComponentStore::new();
        store.insert(Entity(4), Mass(2.5)).unwrap();
        assert_eq!(store.get(Entity(4)).unwrap(), &Mass(2.5));
        assert!(store.has(Entity(4)));
        assert!(!store.has(Entity(3)));
        assert!(!store.has(Entity(400)));
    }

    #[test]
    fn test_duplicate_insert_keeps_original() {
        let mut store = ComponentStore::new();
        store.insert(Entity(1), Mass(1.0)).unwrap();
        let err = store.insert(Entity(1), Mass(9.0)).unwrap_err();
        assert_eq!(
            err,
            EcsError::DuplicateComponent {
                component: "Mass",
                entity: Entity(1)
            }
        );
        assert_eq!(store.get(Entity(1)).unwrap(), &Mass(1.0));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_swaps_last_into_hole() {
        let mut store = ComponentStore::new();
        for (i, e) in [3u32, 7, 9].into_iter().enumerate() {
            store.insert(Entity(e), Mass(i as f32)).unwrap();
        }
        assert_eq!(store.remove(Entity(3)).unwrap(), Mass(0.0));

        assert_eq!(store.entities(), &[Entity(9), Entity(7)]);
        assert_eq!(store.get(Entity(9)).unwrap(), &Mass(2.0));
        assert_eq!(store.len(), 2);
        assert!(packed_consistent(&store));
    }

    #[test]
    fn test_remove_last_element() {
        let mut store = ComponentStore::new();
        store.insert(Entity(0), Mass(0.0)).unwrap();
        store.insert(Entity(1), Mass(1.0)).unwrap();
        store.remove(Entity(1)).unwrap();
        assert!(!store.has(Entity(1)));
        assert!(packed_consistent(&store));
    }

    #[test]
    fn test_missing_component_errors() {
        let mut store: ComponentStore<Mass> = ComponentStore::new();
        let expected = EcsError::ComponentNotFound {
            component: "Mass",
            entity: Entity(2),
        };
        assert_eq!(store.get(Entity(2)).unwrap_err(), expected);
        assert_eq!(store.get_mut(Entity(2)).unwrap_err(), expected);
        assert_eq!(store.remove(Entity(2)).unwrap_err(), expected);
        assert_eq!(store.replace(Entity(2), Mass(1.0)).unwrap_err(), expected);
    }

    #[test]
    fn test_replace_and_get_mut() {
        let mut store = ComponentStore::new();
        store.insert(Entity(0), Mass(1.0)).unwrap();
        assert_eq!(store.replace(Entity(0), Mass(2.0)).unwrap(), Mass(1.0));
        store.get_mut(Entity(0)).unwrap().0 += 1.0;
        assert_eq!(store.get(Entity(0)).unwrap(), &Mass(3.0));
    }

    #[test]
    fn test_on_entity_destroyed_is_idempotent() {
        let mut store = ComponentStore::new();
        store.insert(Entity(5), Mass(5.0)).unwrap();
        store.on_entity_destroyed(Entity(5));
        store.on_entity_destroyed(Entity(5));
        store.on_entity_destroyed(Entity(99));
        assert!(store.is_empty());
    }

    #[test]
    fn test_churn_keeps_store_packed() {
        let mut store = ComponentStore::new();
        for e in 0..20 {
            store.insert(Entity(e), Mass(e as f32)).unwrap();
        }
        for e in (0..20).step_by(3) {
            store.remove(Entity(e)).unwrap();
            assert!(packed_consistent(&store));
        }
        for (e, m) in store.iter() {
            assert_eq!(m.0, e.id() as f32);
        }
        for (_, m) in store.iter_mut() {
            m.0 = -1.0;
        }
        assert!(store.iter().all(|(_, m)| m.0 == -1.0));
        store.clear();
        assert!(store.is_empty());
        assert!(!store.has(Entity(1)));
    }
}

//! Per-pass execution context provided to systems.

use std::collections::BTreeSet;

use engine_component::{Component, ComponentManager, EcsError, Entity};

use crate::commands::Commands;

/// Context handed to a system for one pass over its entities.
///
/// Gives read/write access to component *values* and read access to the
/// system's own matching set. Structural changes go through
/// [`SystemContext::commands`] and are applied after the pass.
pub struct SystemContext<'a> {
    /// Delta time since the last tick, in seconds.
    pub dt: f64,
    entities: &'a BTreeSet<Entity>,
    components: &'a mut ComponentManager,
    commands: &'a mut Commands,
}

impl<'a> SystemContext<'a> {
    /// Create a context for one pass.
    #[must_use]
    pub fn new(
        dt: f64,
        entities: &'a BTreeSet<Entity>,
        components: &'a mut ComponentManager,
        commands: &'a mut Commands,
    ) -> Self {
        Self {
            dt,
            entities,
            components,
            commands,
        }
    }

    /// The system's matching entities, in ascending id order.
    ///
    /// The returned set borrows from the world rather than from the context,
    /// so component accessors stay usable while it is iterated.
    #[must_use]
    pub fn entities(&self) -> &'a BTreeSet<Entity> {
        self.entities
    }

    /// Read a component of any living entity.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnregisteredComponent`] or
    /// [`EcsError::ComponentNotFound`].
    pub fn get<T: Component>(&self, entity: Entity) -> Result<&T, EcsError> {
        self.components.store::<T>()?.get(entity)
    }

    /// Mutate a component of any living entity in place.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnregisteredComponent`] or
    /// [`EcsError::ComponentNotFound`].
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T, EcsError> {
        self.components.store_mut::<T>()?.get_mut(entity)
    }

    /// Returns `true` if `entity` holds a `T`.
    #[must_use]
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.components.has::<T>(entity)
    }

    /// Iterate every `(entity, &T)` in the world, matching or not.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnregisteredComponent`] if `T` was never registered.
    pub fn iter<T: Component>(&self) -> Result<impl Iterator<Item = (Entity, &T)>, EcsError> {
        Ok(self.components.store::<T>()?.iter())
    }

    /// Queue structural changes to apply after this pass.
    pub fn commands(&mut self) -> &mut Commands {
        self.commands
    }
}

impl std::fmt::Debug for SystemContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemContext")
            .field("dt", &self.dt)
            .field("entities", &self.entities.len())
            .field("queued_commands", &self.commands.len())
            .finish()
    }
}

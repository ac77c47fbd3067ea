//! Deferred structural mutations.
//!
//! Systems cannot create or destroy entities, or attach and detach
//! components, while they iterate their own entity set. They queue those
//! changes on a [`Commands`] buffer instead; the coordinator applies the
//! buffer in FIFO order once the system pass returns.

use std::collections::VecDeque;

use engine_component::{
    Component, ComponentManager, ComponentStorage, ComponentType, EcsError, Entity,
};

/// A typed component operation with its concrete type erased.
///
/// Applies itself to the component stores and returns the [`ComponentType`]
/// whose signature bit the caller must update.
pub type ComponentOp =
    Box<dyn FnOnce(&mut ComponentManager, Entity) -> Result<ComponentType, EcsError>>;

/// Build the op attaching `value`. Fails on a duplicate.
#[must_use]
pub fn insert_op<T: Component>(value: T) -> ComponentOp {
    Box::new(move |components: &mut ComponentManager, entity: Entity| {
        let ty = components.component_type::<T>()?;
        components.store_mut::<T>()?.insert(entity, value)?;
        Ok(ty)
    })
}

/// Build the op attaching `value`, or overwriting the existing value.
#[must_use]
pub fn upsert_op<T: Component>(value: T) -> ComponentOp {
    Box::new(move |components: &mut ComponentManager, entity: Entity| {
        let ty = components.component_type::<T>()?;
        let store = components.store_mut::<T>()?;
        if store.has(entity) {
            store.replace(entity, value)?;
        } else {
            store.insert(entity, value)?;
        }
        Ok(ty)
    })
}

/// Build the op detaching a `T`, dropping the value.
#[must_use]
pub fn remove_op<T: Component>() -> ComponentOp {
    Box::new(|components: &mut ComponentManager, entity: Entity| {
        let ty = components.component_type::<T>()?;
        components.store_mut::<T>()?.remove(entity)?;
        Ok(ty)
    })
}

/// One queued structural mutation.
pub enum Command {
    /// Create an entity and attach the given components to it.
    Spawn(Vec<ComponentOp>),
    /// Destroy an entity.
    Destroy(Entity),
    /// Attach (or upsert) a component; sets the signature bit.
    Attach(Entity, ComponentOp),
    /// Detach a component; clears the signature bit.
    Detach(Entity, ComponentOp),
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spawn(ops) => write!(f, "Spawn({} components)", ops.len()),
            Self::Destroy(e) => write!(f, "Destroy({e})"),
            Self::Attach(e, _) => write!(f, "Attach({e})"),
            Self::Detach(e, _) => write!(f, "Detach({e})"),
        }
    }
}

/// FIFO buffer of [`Command`]s.
#[derive(Debug, Default)]
pub struct Commands {
    queue: VecDeque<Command>,
}

impl Commands {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the creation of a new entity. Components added through the
    /// returned builder are attached right after creation.
    pub fn spawn(&mut self) -> SpawnCommands<'_> {
        self.queue.push_back(Command::Spawn(Vec::new()));
        SpawnCommands { commands: self }
    }

    /// Queue the destruction of `entity`.
    pub fn destroy(&mut self, entity: Entity) {
        self.queue.push_back(Command::Destroy(entity));
    }

    /// Queue attaching `value` to `entity`.
    pub fn insert<T: Component>(&mut self, entity: Entity, value: T) {
        self.queue
            .push_back(Command::Attach(entity, insert_op(value)));
    }

    /// Queue attaching or overwriting `value` on `entity`.
    pub fn upsert<T: Component>(&mut self, entity: Entity, value: T) {
        self.queue
            .push_back(Command::Attach(entity, upsert_op(value)));
    }

    /// Queue detaching a `T` from `entity`.
    pub fn remove<T: Component>(&mut self, entity: Entity) {
        self.queue
            .push_back(Command::Detach(entity, remove_op::<T>()));
    }

    /// Number of queued commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Pop the oldest command.
    pub fn pop(&mut self) -> Option<Command> {
        self.queue.pop_front()
    }
}

/// Builder returned by [`Commands::spawn`].
#[derive(Debug)]
pub struct SpawnCommands<'a> {
    commands: &'a mut Commands,
}

impl SpawnCommands<'_> {
    /// Attach `value` to the entity being spawned.
    pub fn with<T: Component>(&mut self, value: T) -> &mut Self {
        if let Some(Command::Spawn(ops)) = self.commands.queue.back_mut() {
            ops.push(insert_op(value));
        }
        self
    }
}

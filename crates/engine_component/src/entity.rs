//! Entity handles and the entity manager.
//!
//! An [`Entity`] is a lightweight `u32` identifier with no inherent data. The
//! [`EntityManager`] hands ids out of a fixed pool `[0, max_entities)` and
//! stores one [`Signature`] per id.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::EcsError;
use crate::signature::Signature;

/// A unique entity identifier.
///
/// Entities are pure identifiers; they carry no data of their own. Components
/// are attached to entities to give them meaning. An id is unique among living
/// entities and is only handed out again after its owner has been destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity(pub u32);

impl Entity {
    /// Create an entity from a raw `u32` identifier.
    #[must_use]
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw `u32` identifier.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }

    /// Returns the identifier as a table index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Allocates and recycles entity ids and owns the per-entity signatures.
///
/// Free ids are kept in a FIFO queue: fresh ids are handed out in ascending
/// order and destroyed ids go to the back of the queue. A full reset through
/// [`EntityManager::destroy_all_entities`] restores the initial ascending
/// order.
#[derive(Debug)]
pub struct EntityManager {
    /// Ids available for allocation, front first.
    available: VecDeque<Entity>,
    /// One signature per id, indexed by [`Entity::index`].
    signatures: Vec<Signature>,
    /// Liveness flag per id.
    alive: Vec<bool>,
    /// Living entities in creation order.
    living: Vec<Entity>,
    max_entities: u32,
}

impl EntityManager {
    /// Creates a manager with room for `max_entities` living entities.
    #[must_use]
    pub fn new(max_entities: u32) -> Self {
        let len = max_entities as usize;
        Self {
            available: (0..max_entities).map(Entity).collect(),
            signatures: vec![Signature::EMPTY; len],
            alive: vec![false; len],
            living: Vec::new(),
            max_entities,
        }
    }

    /// Returns the entity capacity.
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.max_entities
    }

    /// Allocates the next free id.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::CapacityExceeded`] when every id is in use.
    pub fn create_entity(&mut self) -> Result<Entity, EcsError> {
        let entity = self
            .available
            .pop_front()
            .ok_or(EcsError::CapacityExceeded {
                resource: "entity",
                capacity: self.max_entities as usize,
            })?;
        self.mark_alive(entity);
        Ok(entity)
    }

    /// Reserves a caller-chosen id, e.g. when restoring a saved scene.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::OutOfRange`] if `id` is outside the pool and
    /// [`EcsError::IdInUse`] if it is already living.
    pub fn create_entity_with_id(&mut self, id: Entity) -> Result<Entity, EcsError> {
        self.check_range(id)?;
        if self.alive[id.index()] {
            return Err(EcsError::IdInUse(id));
        }
        let pos = self
            .available
            .iter()
            .position(|&e| e == id)
            .ok_or(EcsError::IdInUse(id))?;
        self.available.remove(pos);
        self.mark_alive(id);
        Ok(id)
    }

    /// Returns a living entity to the free pool and clears its signature.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::OutOfRange`] or [`EcsError::EntityNotFound`] if
    /// `entity` is not living.
    pub fn destroy_entity(&mut self, entity: Entity) -> Result<(), EcsError> {
        self.check_alive(entity)?;
        self.signatures[entity.index()].reset();
        self.alive[entity.index()] = false;
        if let Some(pos) = self.living.iter().position(|&e| e == entity) {
            self.living.remove(pos);
        }
        self.available.push_back(entity);
        Ok(())
    }

    /// Undoes the creation of `entity`, returning its id to the *front* of
    /// the pool so the next [`EntityManager::create_entity`] hands it out
    /// again.
    ///
    /// Used to roll back a spawn whose components failed to attach.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::OutOfRange`] or [`EcsError::EntityNotFound`] if
    /// `entity` is not living.
    pub fn cancel_create(&mut self, entity: Entity) -> Result<(), EcsError> {
        self.check_alive(entity)?;
        self.signatures[entity.index()].reset();
        self.alive[entity.index()] = false;
        if let Some(pos) = self.living.iter().rposition(|&e| e == entity) {
            self.living.remove(pos);
        }
        self.available.push_front(entity);
        Ok(())
    }

    /// Destroys every living entity and restores the full ascending pool.
    pub fn destroy_all_entities(&mut self) {
        for entity in self.living.drain(..) {
            self.signatures[entity.index()].reset();
            self.alive[entity.index()] = false;
        }
        self.available = (0..self.max_entities).map(Entity).collect();
    }

    /// Replace the signature of a living entity.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::OutOfRange`] or [`EcsError::EntityNotFound`].
    pub fn set_signature(&mut self, entity: Entity, signature: Signature) -> Result<(), EcsError> {
        self.check_alive(entity)?;
        self.signatures[entity.index()] = signature;
        Ok(())
    }

    /// Returns the signature of a living entity.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::OutOfRange`] or [`EcsError::EntityNotFound`].
    pub fn signature(&self, entity: Entity) -> Result<Signature, EcsError> {
        self.check_alive(entity)?;
        Ok(self.signatures[entity.index()])
    }

    /// Returns `true` if `entity` is living.
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.alive.get(entity.index()).copied().unwrap_or(false)
    }

    /// Living entities in creation order.
    #[must_use]
    pub fn living_entities(&self) -> &[Entity] {
        &self.living
    }

    /// Living entities paired with their signatures, in creation order.
    pub fn living_signatures(&self) -> impl Iterator<Item = (Entity, Signature)> + '_ {
        self.living
            .iter()
            .map(|&e| (e, self.signatures[e.index()]))
    }

    /// Number of living entities.
    #[must_use]
    pub fn living_count(&self) -> usize {
        self.living.len()
    }

    fn mark_alive(&mut self, entity: Entity) {
        self.signatures[entity.index()].reset();
        self.alive[entity.index()] = true;
        self.living.push(entity);
    }

    fn check_range(&self, entity: Entity) -> Result<(), EcsError> {
        if entity.0 >= self.max_entities {
            return Err(EcsError::OutOfRange {
                entity,
                max: self.max_entities,
            });
        }
        Ok(())
    }

    fn check_alive(&self, entity: Entity) -> Result<(), EcsError> {
        self.check_range(entity)?;
        if !self.alive[entity.index()] {
            return Err(EcsError::EntityNotFound(entity));
        }
        Ok(())
    }
}

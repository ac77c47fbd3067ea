//! System registry with incrementally maintained membership sets.
//!
//! Each registered system owns a required [`Signature`] and the ordered set
//! of living entities whose signature contains it. The set is never rebuilt
//! from scratch during normal operation: the coordinator reports every
//! signature change and every destruction, and the manager patches each
//! system's set in time linear in the number of systems.

use std::any::{Any, TypeId};
use std::collections::{BTreeSet, HashMap};

use tracing::{debug, info};

use engine_component::{EcsError, Entity, Signature};

use crate::system::System;

struct SystemEntry {
    name: &'static str,
    /// `None` until declared; an undeclared system tracks nothing.
    required: Option<Signature>,
    entities: BTreeSet<Entity>,
    instance: Box<dyn Any>,
}

impl SystemEntry {
    fn update_membership(&mut self, entity: Entity, signature: Signature) {
        match self.required {
            Some(required) if signature.contains(required) => {
                self.entities.insert(entity);
            }
            _ => {
                self.entities.remove(&entity);
            }
        }
    }
}

/// Owns every system instance and its matching entity set.
#[derive(Default)]
pub struct SystemManager {
    /// Systems in registration order.
    systems: Vec<SystemEntry>,
    by_type: HashMap<TypeId, usize>,
}

impl SystemManager {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `system` and return a handle to it.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::DuplicateRegistration`] if a system of type `S` is
    /// already registered.
    pub fn register<S: System>(&mut self, system: S) -> Result<&mut S, EcsError> {
        let type_id = TypeId::of::<S>();
        if self.by_type.contains_key(&type_id) {
            return Err(EcsError::DuplicateRegistration(S::name().to_string()));
        }

        let index = self.systems.len();
        self.systems.push(SystemEntry {
            name: S::name(),
            required: None,
            entities: BTreeSet::new(),
            instance: Box::new(system),
        });
        self.by_type.insert(type_id, index);
        info!(system = S::name(), "registered system");

        self.get_mut::<S>()
    }

    /// Declare the signature `S` requires and seed its set from `living`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::SystemNotFound`] if `S` is unregistered and
    /// [`EcsError::DuplicateRegistration`] if its signature was already set.
    pub fn set_signature<S: System>(
        &mut self,
        signature: Signature,
        living: impl IntoIterator<Item = (Entity, Signature)>,
    ) -> Result<(), EcsError> {
        let entry = self.entry_mut::<S>()?;
        if entry.required.is_some() {
            return Err(EcsError::DuplicateRegistration(format!(
                "signature of {}",
                entry.name
            )));
        }
        entry.required = Some(signature);
        for (entity, entity_signature) in living {
            entry.update_membership(entity, entity_signature);
        }
        info!(system = entry.name, %signature, matched = entry.entities.len(), "set system signature");
        Ok(())
    }

    /// The declared signature of `S`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::SystemNotFound`] if `S` is unregistered.
    pub fn signature<S: System>(&self) -> Result<Option<Signature>, EcsError> {
        Ok(self.entry::<S>()?.required)
    }

    /// Shared handle to `S`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::SystemNotFound`] if `S` is unregistered.
    pub fn get<S: System>(&self) -> Result<&S, EcsError> {
        self.entry::<S>()?
            .instance
            .downcast_ref::<S>()
            .ok_or(EcsError::SystemNotFound(S::name()))
    }

    /// Mutable handle to `S`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::SystemNotFound`] if `S` is unregistered.
    pub fn get_mut<S: System>(&mut self) -> Result<&mut S, EcsError> {
        self.entry_mut::<S>()?
            .instance
            .downcast_mut::<S>()
            .ok_or(EcsError::SystemNotFound(S::name()))
    }

    /// The entities currently matching `S`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::SystemNotFound`] if `S` is unregistered.
    pub fn entities<S: System>(&self) -> Result<&BTreeSet<Entity>, EcsError> {
        Ok(&self.entry::<S>()?.entities)
    }

    /// Mutable handle to `S` together with its matching set, for a system
    /// pass.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::SystemNotFound`] if `S` is unregistered.
    pub fn split_mut<S: System>(&mut self) -> Result<(&mut S, &BTreeSet<Entity>), EcsError> {
        let entry = self.entry_mut::<S>()?;
        let system = entry
            .instance
            .downcast_mut::<S>()
            .ok_or(EcsError::SystemNotFound(S::name()))?;
        Ok((system, &entry.entities))
    }

    /// Re-evaluate `entity` against every system after its signature changed.
    pub fn entity_signature_changed(&mut self, entity: Entity, signature: Signature) {
        for entry in &mut self.systems {
            entry.update_membership(entity, signature);
        }
    }

    /// Drop `entity` from every set, regardless of its signature.
    pub fn entity_destroyed(&mut self, entity: Entity) {
        for entry in &mut self.systems {
            entry.entities.remove(&entity);
        }
    }

    /// Empty every set, keeping registrations and signatures.
    pub fn clear(&mut self) {
        for entry in &mut self.systems {
            entry.entities.clear();
        }
        debug!(systems = self.systems.len(), "cleared system entity sets");
    }

    /// Registered system names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.systems.iter().map(|entry| entry.name)
    }

    /// Number of registered systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Returns `true` if no system is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    fn entry<S: System>(&self) -> Result<&SystemEntry, EcsError> {
        self.by_type
            .get(&TypeId::of::<S>())
            .map(|&index| &self.systems[index])
            .ok_or(EcsError::SystemNotFound(S::name()))
    }

    fn entry_mut<S: System>(&mut self) -> Result<&mut SystemEntry, EcsError> {
        let index = *self
            .by_type
            .get(&TypeId::of::<S>())
            .ok_or(EcsError::SystemNotFound(S::name()))?;
        Ok(&mut self.systems[index])
    }
}

impl std::fmt::Debug for SystemManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(
                self.systems
                    .iter()
                    .map(|entry| (entry.name, entry.entities.len())),
            )
            .finish()
    }
}

//! The [`Coordinator`] facade.
//!
//! The coordinator is the single owner of world state. Every public mutation
//! updates the component stores, then the entity's signature, then system
//! membership, and validates all preconditions before touching any of them,
//! so a failed call leaves the world exactly as it was.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use engine_component::{
    Component, ComponentInfo, ComponentManager, ComponentStore, ComponentType, ComponentTypeId,
    EcsConfig, EcsError, Entity, EntityManager, Signature,
};
use engine_system::commands::{insert_op, upsert_op};
use engine_system::{Command, Commands, ComponentOp, System, SystemContext, SystemManager};

/// Facade composing entity, component and system management.
#[derive(Debug)]
pub struct Coordinator {
    config: EcsConfig,
    entities: EntityManager,
    components: ComponentManager,
    systems: SystemManager,
}

impl Coordinator {
    /// Create a coordinator with the default capacities.
    #[must_use]
    pub fn new() -> Self {
        Self::build(EcsConfig::default())
    }

    /// Create a coordinator with custom capacities.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if the configuration is rejected by
    /// [`EcsConfig::validate`].
    pub fn with_config(config: EcsConfig) -> Result<Self, EcsError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EcsConfig) -> Self {
        Self {
            config,
            entities: EntityManager::new(config.max_entities),
            components: ComponentManager::new(config.max_component_types),
            systems: SystemManager::new(),
        }
    }

    /// The capacities this coordinator was built with.
    #[must_use]
    pub fn config(&self) -> &EcsConfig {
        &self.config
    }

    // -- Component kinds --

    /// Register component kind `T`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::DuplicateRegistration`] or
    /// [`EcsError::CapacityExceeded`].
    pub fn register_component<T: Component>(&mut self) -> Result<ComponentType, EcsError> {
        self.components.register::<T>()
    }

    /// The signature bit of `T`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnregisteredComponent`].
    pub fn component_type<T: Component>(&self) -> Result<ComponentType, EcsError> {
        self.components.component_type::<T>()
    }

    /// Every registered component kind, in registration order.
    pub fn component_types(&self) -> impl Iterator<Item = ComponentInfo> + '_ {
        self.components.infos()
    }

    /// Look a component kind up by its stable id.
    #[must_use]
    pub fn component_info(&self, id: ComponentTypeId) -> Option<ComponentInfo> {
        self.components.info_by_id(id)
    }

    // -- Entity lifecycle --

    /// Create an entity with an empty signature.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::CapacityExceeded`] when every id is in use.
    pub fn create_entity(&mut self) -> Result<Entity, EcsError> {
        let entity = self.entities.create_entity()?;
        self.systems.entity_signature_changed(entity, Signature::EMPTY);
        debug!(%entity, "created entity");
        Ok(entity)
    }

    /// Create an entity with a caller-chosen id.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::IdInUse`] or [`EcsError::OutOfRange`].
    pub fn create_entity_with_id(&mut self, id: Entity) -> Result<Entity, EcsError> {
        let entity = self.entities.create_entity_with_id(id)?;
        self.systems.entity_signature_changed(entity, Signature::EMPTY);
        debug!(%entity, "created entity with explicit id");
        Ok(entity)
    }

    /// Destroy a living entity and every component attached to it.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] or [`EcsError::OutOfRange`].
    pub fn destroy_entity(&mut self, entity: Entity) -> Result<(), EcsError> {
        self.entities.signature(entity)?;
        self.components.entity_destroyed(entity);
        self.entities.destroy_entity(entity)?;
        self.systems.entity_destroyed(entity);
        debug!(%entity, "destroyed entity");
        Ok(())
    }

    /// Destroy every entity. Registrations and system signatures survive.
    pub fn destroy_all_entities(&mut self) {
        let count = self.entities.living_count();
        self.components.clear_all();
        self.entities.destroy_all_entities();
        self.systems.clear();
        debug!(count, "destroyed all entities");
    }

    /// Living entities in creation order.
    #[must_use]
    pub fn all_entities(&self) -> &[Entity] {
        self.entities.living_entities()
    }

    /// Returns `true` if `entity` is living.
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Number of living entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.living_count()
    }

    /// The signature of a living entity.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] or [`EcsError::OutOfRange`].
    pub fn signature(&self, entity: Entity) -> Result<Signature, EcsError> {
        self.entities.signature(entity)
    }

    // -- Components --

    /// Attach `value` to `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`], [`EcsError::UnregisteredComponent`]
    /// or [`EcsError::DuplicateComponent`]; the existing value is kept.
    pub fn add_component<T: Component>(&mut self, entity: Entity, value: T) -> Result<(), EcsError> {
        self.attach(entity, insert_op(value))
    }

    /// Attach `value` to `entity`, overwriting any existing `T`.
    ///
    /// This is the explicit create-or-replace path; [`Coordinator::add_component`]
    /// never overwrites.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] or
    /// [`EcsError::UnregisteredComponent`].
    pub fn upsert_component<T: Component>(
        &mut self,
        entity: Entity,
        value: T,
    ) -> Result<(), EcsError> {
        self.attach(entity, upsert_op(value))
    }

    /// Detach and return the `T` of `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`], [`EcsError::UnregisteredComponent`]
    /// or [`EcsError::ComponentNotFound`].
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Result<T, EcsError> {
        self.entities.signature(entity)?;
        let ty = self.components.component_type::<T>()?;
        let value = self.components.store_mut::<T>()?.remove(entity)?;
        self.update_signature(entity, ty, false)?;
        Ok(value)
    }

    /// Read the `T` of `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnregisteredComponent`] or
    /// [`EcsError::ComponentNotFound`].
    pub fn component<T: Component>(&self, entity: Entity) -> Result<&T, EcsError> {
        self.components.store::<T>()?.get(entity)
    }

    /// Mutate the `T` of `entity` in place.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnregisteredComponent`] or
    /// [`EcsError::ComponentNotFound`].
    pub fn component_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T, EcsError> {
        self.components.store_mut::<T>()?.get_mut(entity)
    }

    /// Returns `true` if `entity` holds a `T`.
    #[must_use]
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.components.has::<T>(entity)
    }

    /// Type-erased presence check, for collaborators that only know the
    /// [`ComponentType`].
    #[must_use]
    pub fn has_component_type(&self, ty: ComponentType, entity: Entity) -> bool {
        self.components.has_type(ty, entity)
    }

    /// Read-only access to the whole store of `T`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnregisteredComponent`].
    pub fn components<T: Component>(&self) -> Result<&ComponentStore<T>, EcsError> {
        self.components.store::<T>()
    }

    // -- Systems --

    /// Register a system instance.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::DuplicateRegistration`].
    pub fn register_system<S: System>(&mut self, system: S) -> Result<&mut S, EcsError> {
        self.systems.register(system)
    }

    /// Declare the signature `S` requires. Entities that are already living
    /// are matched immediately.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::SystemNotFound`] or
    /// [`EcsError::DuplicateRegistration`] on a second declaration.
    pub fn set_system_signature<S: System>(&mut self, signature: Signature) -> Result<(), EcsError> {
        self.systems
            .set_signature::<S>(signature, self.entities.living_signatures())
    }

    /// Shared handle to `S`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::SystemNotFound`].
    pub fn system<S: System>(&self) -> Result<&S, EcsError> {
        self.systems.get::<S>()
    }

    /// Mutable handle to `S`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::SystemNotFound`].
    pub fn system_mut<S: System>(&mut self) -> Result<&mut S, EcsError> {
        self.systems.get_mut::<S>()
    }

    /// The entities currently matching `S`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::SystemNotFound`].
    pub fn system_entities<S: System>(&self) -> Result<&BTreeSet<Entity>, EcsError> {
        self.systems.entities::<S>()
    }

    /// Run `f` with `S` and a [`SystemContext`] over its entities, then apply
    /// the structural changes it queued.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::SystemNotFound`] or the first failing deferred
    /// command.
    pub fn with_system<S, R>(
        &mut self,
        dt: f64,
        f: impl FnOnce(&mut S, &mut SystemContext<'_>) -> R,
    ) -> Result<R, EcsError>
    where
        S: System,
    {
        let (result, commands) = self.pass::<S, R>(dt, f)?;
        self.apply_commands(commands)?;
        Ok(result)
    }

    /// Run one [`System::update`] pass of `S`.
    ///
    /// Commands queued by a failing pass are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::SystemNotFound`], the error of the pass, or the
    /// first failing deferred command.
    pub fn run_system<S: System>(&mut self, dt: f64) -> Result<(), EcsError> {
        let (result, commands) = self.pass::<S, _>(dt, |system, ctx| system.update(ctx))?;
        if let Err(err) = result {
            if !commands.is_empty() {
                warn!(system = S::name(), dropped = commands.len(), "system pass failed; discarding queued commands");
            }
            return Err(err);
        }
        self.apply_commands(commands)
    }

    fn pass<S, R>(
        &mut self,
        dt: f64,
        f: impl FnOnce(&mut S, &mut SystemContext<'_>) -> R,
    ) -> Result<(R, Commands), EcsError>
    where
        S: System,
    {
        let mut commands = Commands::new();
        let (system, entities) = self.systems.split_mut::<S>()?;
        let mut ctx = SystemContext::new(dt, entities, &mut self.components, &mut commands);
        let result = f(system, &mut ctx);
        Ok((result, commands))
    }

    // -- Deferred commands --

    /// Apply queued commands in FIFO order, stopping at the first failure.
    ///
    /// Commands applied before the failure stay applied; the rest are dropped.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing command.
    pub fn apply_commands(&mut self, mut commands: Commands) -> Result<(), EcsError> {
        let mut applied = 0usize;
        while let Some(command) = commands.pop() {
            if let Err(err) = self.apply(command) {
                warn!(%err, applied, dropped = commands.len(), "deferred command failed");
                return Err(err);
            }
            applied += 1;
        }
        if applied > 0 {
            debug!(applied, "applied deferred commands");
        }
        Ok(())
    }

    /// Apply one command as a single atomic operation.
    ///
    /// A spawn whose component fails to attach is rolled back, including its
    /// place in the id pool.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying operation.
    pub fn apply(&mut self, command: Command) -> Result<(), EcsError> {
        match command {
            Command::Spawn(ops) => {
                let entity = self.create_entity()?;
                for op in ops {
                    if let Err(err) = self.attach(entity, op) {
                        self.cancel_spawn(entity)?;
                        return Err(err);
                    }
                }
                Ok(())
            }
            Command::Destroy(entity) => self.destroy_entity(entity),
            Command::Attach(entity, op) => self.attach(entity, op),
            Command::Detach(entity, op) => {
                self.entities.signature(entity)?;
                let ty = op(&mut self.components, entity)?;
                self.update_signature(entity, ty, false)
            }
        }
    }

    /// Undo a partially applied spawn. The id goes back to the front of the
    /// free pool, so allocation order is as if the spawn never happened.
    fn cancel_spawn(&mut self, entity: Entity) -> Result<(), EcsError> {
        self.components.entity_destroyed(entity);
        self.entities.cancel_create(entity)?;
        self.systems.entity_destroyed(entity);
        debug!(%entity, "rolled back spawn");
        Ok(())
    }

    fn attach(&mut self, entity: Entity, op: ComponentOp) -> Result<(), EcsError> {
        self.entities.signature(entity)?;
        let ty = op(&mut self.components, entity)?;
        self.update_signature(entity, ty, true)
    }

    fn update_signature(
        &mut self,
        entity: Entity,
        ty: ComponentType,
        present: bool,
    ) -> Result<(), EcsError> {
        let mut signature = self.entities.signature(entity)?;
        signature.set(ty, present);
        self.entities.set_signature(entity, signature)?;
        self.systems.entity_signature_changed(entity, signature);
        Ok(())
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

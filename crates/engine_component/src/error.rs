//! ECS error types.

use crate::entity::Entity;

/// Errors returned by entity, component and system operations.
///
/// Every fallible ECS operation reports its first failure through this type
/// and leaves the world untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EcsError {
    /// A fixed capacity (entities or component kinds) is exhausted.
    #[error("{resource} capacity exceeded (limit {capacity})")]
    CapacityExceeded {
        /// What ran out, e.g. `"entity"`.
        resource: &'static str,
        /// The configured limit.
        capacity: usize,
    },

    /// A component kind or system was registered twice.
    #[error("'{0}' is already registered")]
    DuplicateRegistration(String),

    /// An id-preserving creation targeted an entity that is already living.
    #[error("{0} is already in use")]
    IdInUse(Entity),

    /// The entity id lies outside `[0, max)`.
    #[error("{entity} is out of range (max {max})")]
    OutOfRange {
        /// The offending id.
        entity: Entity,
        /// The exclusive upper bound.
        max: u32,
    },

    /// The entity is not living.
    #[error("{0} not found")]
    EntityNotFound(Entity),

    /// The entity does not hold a component of this kind.
    #[error("component '{component}' not found on {entity}")]
    ComponentNotFound {
        /// Name of the component kind.
        component: &'static str,
        /// The entity that was queried.
        entity: Entity,
    },

    /// The component kind was used before registration.
    #[error("component '{0}' is not registered")]
    UnregisteredComponent(&'static str),

    /// The system kind was used before registration.
    #[error("system '{0}' is not registered")]
    SystemNotFound(&'static str),

    /// The entity already holds a component of this kind.
    #[error("{entity} already has component '{component}'")]
    DuplicateComponent {
        /// Name of the component kind.
        component: &'static str,
        /// The entity that already holds it.
        entity: Entity,
    },

    /// The configuration cannot be honoured.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = EcsError::DuplicateComponent {
            component: "Health",
            entity: Entity::from_raw(3),
        };
        assert_eq!(err.to_string(), "Entity(3) already has component 'Health'");

        let err = EcsError::CapacityExceeded {
            resource: "entity",
            capacity: 10,
        };
        assert_eq!(err.to_string(), "entity capacity exceeded (limit 10)");
    }
}

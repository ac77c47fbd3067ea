//! World capacity configuration.

use serde::{Deserialize, Serialize};

use crate::error::EcsError;
use crate::signature::MAX_COMPONENT_TYPES;

/// Default number of simultaneously living entities.
pub const DEFAULT_MAX_ENTITIES: u32 = 5000;

/// Default number of registrable component kinds.
pub const DEFAULT_MAX_COMPONENT_TYPES: usize = 32;

/// Fixed capacities of an ECS world, chosen once at initialisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcsConfig {
    /// Maximum number of simultaneously living entities.
    pub max_entities: u32,
    /// Maximum number of component kinds. Must not exceed
    /// [`MAX_COMPONENT_TYPES`].
    pub max_component_types: usize,
}

impl EcsConfig {
    /// Override the entity capacity.
    #[must_use]
    pub fn with_max_entities(mut self, max_entities: u32) -> Self {
        self.max_entities = max_entities;
        self
    }

    /// Override the component kind capacity.
    #[must_use]
    pub fn with_max_component_types(mut self, max_component_types: usize) -> Self {
        self.max_component_types = max_component_types;
        self
    }

    /// Check the configuration against the hard limits of the signature width.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] when a capacity is zero or the
    /// component kind limit exceeds the signature width.
    pub fn validate(&self) -> Result<(), EcsError> {
        if self.max_entities == 0 {
            return Err(EcsError::InvalidConfig(
                "max_entities must be greater than zero".into(),
            ));
        }
        if self.max_component_types == 0 || self.max_component_types > MAX_COMPONENT_TYPES {
            return Err(EcsError::InvalidConfig(format!(
                "max_component_types must be in 1..={MAX_COMPONENT_TYPES}, got {}",
                self.max_component_types
            )));
        }
        Ok(())
    }
}

impl Default for EcsConfig {
    fn default() -> Self {
        Self {
            max_entities: DEFAULT_MAX_ENTITIES,
            max_component_types: DEFAULT_MAX_COMPONENT_TYPES,
        }
    }
}

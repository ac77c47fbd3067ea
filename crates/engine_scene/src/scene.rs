//! Scene snapshot data and its on-disk encodings.
//!
//! A scene is the list of living entities, each with its id and a map from
//! component name to component data:
//!
//! ```json
//! { "entities": [ { "id": 0, "components": { "Name": "camera" } } ] }
//! ```
//!
//! The same structure is written as JSON or as MessagePack.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use engine_component::Entity;

use crate::error::SceneError;

/// One saved entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEntity {
    /// The id the entity is restored under.
    pub id: Entity,
    /// Component data keyed by component name.
    #[serde(default)]
    pub components: BTreeMap<String, Value>,
}

/// A whole-world snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Schema version of each serializer that wrote data into this scene.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub schemas: BTreeMap<String, u32>,
    /// Entities in creation order.
    pub entities: Vec<SceneEntity>,
}

/// Encoding of a scene file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneFormat {
    Json,
    MessagePack,
}

impl SceneFormat {
    /// Pick the format from a file extension: `.msgpack` / `.mpk` select
    /// MessagePack, anything else JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("msgpack" | "mpk") => Self::MessagePack,
            _ => Self::Json,
        }
    }
}

impl Scene {
    /// Encode the scene.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Json`] or [`SceneError::Encode`].
    pub fn to_bytes(&self, format: SceneFormat) -> Result<Vec<u8>, SceneError> {
        match format {
            SceneFormat::Json => Ok(serde_json::to_vec_pretty(self)?),
            SceneFormat::MessagePack => Ok(rmp_serde::to_vec_named(self)?),
        }
    }

    /// Decode a scene.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Json`] or [`SceneError::Decode`].
    pub fn from_bytes(bytes: &[u8], format: SceneFormat) -> Result<Self, SceneError> {
        match format {
            SceneFormat::Json => Ok(serde_json::from_slice(bytes)?),
            SceneFormat::MessagePack => Ok(rmp_serde::from_slice(bytes)?),
        }
    }

    /// Number of saved entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

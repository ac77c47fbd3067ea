//! # engine_scene
//!
//! Persistence for ECS worlds. The core crates expose enough to enumerate
//! entities and component kinds; this crate adds the per-component
//! serializers and the scene file format on top.
//!
//! - [`SerializationRegistry`]: one [`ComponentSerializer`] per saved kind.
//! - [`SceneManager`]: world ⇄ [`Scene`] conversion plus file I/O.
//! - [`SceneFormat`]: JSON or MessagePack encoding.

pub mod error;
pub mod manager;
pub mod registry;
pub mod scene;

pub use error::SceneError;
pub use manager::SceneManager;
pub use registry::{CheckFn, ComponentSerializer, DeserializeFn, SerializationRegistry, SerializeFn};
pub use scene::{Scene, SceneEntity, SceneFormat};

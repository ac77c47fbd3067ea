//! # engine_component
//!
//! The "E" and "C" in ECS: entity handles, component storage and the
//! signatures that tie them together.
//!
//! This crate provides:
//!
//! - [`Entity`]: lightweight `u32` entity identifiers.
//! - [`EntityManager`]: fixed-capacity id pool plus per-entity signatures.
//! - [`Signature`]: one bit per registered [`ComponentType`].
//! - [`Component`] trait: the contract all ECS data must satisfy.
//! - [`ComponentStore`]: packed, gap-free storage for one component kind.
//! - [`ComponentManager`]: the registry owning one store per kind.
//! - [`EcsConfig`] / [`EcsError`]: capacities and the shared error type.

pub mod component;
pub mod config;
pub mod entity;
pub mod error;
pub mod manager;
pub mod signature;
pub mod storage;

pub use component::{Component, ComponentInfo, ComponentType, ComponentTypeId};
pub use config::EcsConfig;
pub use entity::{Entity, EntityManager};
pub use error::EcsError;
pub use manager::ComponentManager;
pub use signature::{MAX_COMPONENT_TYPES, Signature};
pub use storage::{ComponentStorage, ComponentStore};

//! # engine_system
//!
//! The "S" in ECS: systems and the bookkeeping that keeps their entity sets
//! in sync with entity signatures.
//!
//! This crate provides:
//!
//! - [`System`] trait: a behaviour run once per pass over its entities.
//! - [`SystemManager`]: owns system instances, their required signatures
//!   and their incrementally maintained entity sets.
//! - [`SystemContext`]: what a system sees during a pass.
//! - [`Commands`]: structural changes deferred until the pass ends.
//!
//! ## Usage
//!
//! ```rust
//! use engine_component::{ComponentType, EcsError, Entity, Signature};
//! use engine_system::{System, SystemContext, SystemManager};
//!
//! struct Gravity;
//!
//! impl System for Gravity {
//!     fn update(&mut self, _ctx: &mut SystemContext<'_>) -> Result<(), EcsError> {
//!         Ok(())
//!     }
//! }
//!
//! let mut systems = SystemManager::new();
//! systems.register(Gravity).unwrap();
//! let required = Signature::EMPTY.with(ComponentType(0));
//! systems.set_signature::<Gravity>(required, Vec::<(Entity, Signature)>::new()).unwrap();
//! systems.entity_signature_changed(Entity(1), required);
//! assert!(systems.entities::<Gravity>().unwrap().contains(&Entity(1)));
//! ```

pub mod commands;
pub mod context;
pub mod manager;
pub mod system;

pub use commands::{Command, Commands, ComponentOp, SpawnCommands};
pub use context::SystemContext;
pub use manager::SystemManager;
pub use system::System;

//! # engine_app
//!
//! The [`Coordinator`] facade, the single entry point applications use to
//! drive an ECS world, and the [`TickLoop`] that runs scheduled systems at a
//! fixed rate.

pub mod coordinator;
pub mod tick;

pub use coordinator::Coordinator;
pub use tick::{TickConfig, TickLoop};

//! The [`System`] trait.

use engine_component::EcsError;

use crate::context::SystemContext;

/// A behaviour unit run once per pass over its matching entities.
///
/// The set of matching entities is maintained by the
/// [`SystemManager`](crate::SystemManager) from the system's required
/// signature; the system itself only reads it through
/// [`SystemContext::entities`].
///
/// # Examples
///
/// ```rust
/// use engine_component::EcsError;
/// use engine_system::{System, SystemContext};
///
/// #[derive(Default)]
/// struct Counter {
///     passes: u32,
/// }
///
/// impl System for Counter {
///     fn update(&mut self, ctx: &mut SystemContext<'_>) -> Result<(), EcsError> {
///         self.passes += ctx.entities().len() as u32;
///         Ok(())
///     }
/// }
/// ```
pub trait System: 'static {
    /// A human-readable name, used in logs and errors.
    fn name() -> &'static str
    where
        Self: Sized,
    {
        std::any::type_name::<Self>()
    }

    /// Run one pass.
    ///
    /// # Errors
    ///
    /// Implementations propagate component access failures.
    fn update(&mut self, ctx: &mut SystemContext<'_>) -> Result<(), EcsError>;
}

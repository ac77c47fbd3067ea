//! Scene-layer error types.

use engine_component::EcsError;

/// Errors that can occur while saving or restoring a scene.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// Reading or writing the scene file failed.
    #[error("scene file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON scene file or component value was malformed.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to encode a scene to MessagePack.
    #[error("failed to encode scene: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// Failed to decode a scene from MessagePack.
    #[error("failed to decode scene: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    /// The world rejected an entity or component while restoring.
    #[error(transparent)]
    Ecs(#[from] EcsError),

    /// The scene names a component kind with no registered serializer.
    #[error("no serializer registered for component {0:?}")]
    UnknownComponent(String),

    /// A component value could not be converted to or from its data form.
    #[error("component {component} could not be converted: {source}")]
    Component {
        component: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

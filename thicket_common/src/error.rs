use thicket_core::action::ActionType;
use thicket_core::{ActionError, AssetId, StructuralError, VariableError};
use thiserror::Error;
use uuid::Uuid;

/// Everything that can go wrong while loading, saving or instantiating trees.
#[derive(Debug, Error)]
pub enum ThicketError {
    #[error(transparent)]
    Structural(#[from] StructuralError),
    #[error(transparent)]
    Variable(#[from] VariableError),
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config serialization: {0}")]
    Serde(#[from] erased_serde::Error),
    #[error("no support registered for action type '{0}'")]
    UnknownActionType(ActionType),
    #[error("action type '{0}' has a config but no converter")]
    MissingConfigConverter(ActionType),
    #[error("node {0} is referenced but not defined")]
    UnknownNode(Uuid),
    #[error("node {0} is defined more than once")]
    DuplicateNode(Uuid),
    #[error("subtree {0} is defined more than once")]
    DuplicateSubtree(AssetId),
    #[error("expected config {expected}, got {actual}")]
    ConfigMismatch {
        expected: &'static str,
        actual: String,
    },
    #[error("subtree {0} is referenced but not defined")]
    MissingSubtree(AssetId),
}

use thiserror::Error;

use crate::widget::WidgetId;

/// Unified result type for the grid engine.
pub type Result<T> = std::result::Result<T, GridError>;

/// Errors surfaced by the grid container and packing engine.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("widget `{0}` not found")]
    WidgetNotFound(WidgetId),
    #[error("widget `{0}` is already registered")]
    DuplicateWidget(WidgetId),
    #[error("cannot cascade with a position but no size")]
    CascadeWithoutSize,
    #[error("a drag or resize gesture is in progress")]
    GestureInProgress,
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors raised while parsing container or widget options.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid options document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown cascade direction `{0}`")]
    UnknownCascade(String),
}

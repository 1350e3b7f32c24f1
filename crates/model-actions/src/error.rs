use thiserror::Error;

use crate::transport::TransportError;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("perform must be called with a non-empty action name")]
    MissingActionName,

    #[error("no adapter registered for model '{0}'")]
    MissingAdapter(String),

    #[error("no serializer registered for model '{0}'")]
    MissingSerializer(String),

    #[error("action '{action}' did not resolve to a URL")]
    MissingUrl { action: String },

    #[error("new attributes for action '{action}' must be null or an object, got {found}")]
    InvalidAttributes { action: String, found: &'static str },

    #[error("a rollback is already attached to the pending '{action}' action")]
    ContinuationAttached { action: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ActionError>;

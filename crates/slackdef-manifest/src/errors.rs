use std::io;
use thiserror::Error;

/// Errors that can occur while loading a definition or assembling a manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse JSON definition: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse TOML definition: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse YAML definition: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unsupported definition format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid definition: {0}")]
    InvalidDefinition(String),

    #[error("Custom type '{id}' is referenced but never declared")]
    UnknownTypeReference { id: String },

    #[error("Custom type reference(s) could not be resolved: {0}")]
    UnresolvedTypeReference(String),

    #[error("Custom type '{0}' declares both `name` and `callback_id`")]
    ConflictingTypeIdentity(String),

    #[error("Type reference '{expected}' cannot be bound to custom type '{found}'")]
    TypeReferenceMismatch { expected: String, found: String },

    #[error("Type reference '{0}' is already bound")]
    TypeReferenceAlreadyBound(String),

    #[error("Workflow '{workflow}' references unknown function '{function_id}'")]
    UnknownFunction {
        workflow: String,
        function_id: String,
    },

    #[error("`{0}` is only valid for remote apps (set `slack_hosted = false`)")]
    RemoteOnlyField(&'static str),

    #[error("`{0}` is only valid for Slack hosted apps")]
    HostedOnlyField(&'static str),
}

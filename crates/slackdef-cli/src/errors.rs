//! Error type for CLI commands

use slackdef_config::ConfigError;
use slackdef_manifest::ManifestError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No definition file given and no `default-definition` configured")]
    MissingDefinition,

    #[error("File '{0}' already exists")]
    FileExists(String),
}

pub mod build;
pub mod config;
pub mod init;
pub mod types;

use crate::errors::CommandError;
use slackdef_config::Config;
use std::path::PathBuf;

/// Definition given on the command line, else the configured default
pub(crate) fn resolve_definition_path(
    definition: Option<PathBuf>,
    config: &Config,
) -> Result<PathBuf, CommandError> {
    definition
        .or_else(|| config.default_definition.as_ref().map(PathBuf::from))
        .ok_or(CommandError::MissingDefinition)
}

//! Functions
//!
//! [`ManifestFunction`] is the contract the registry needs from a function builder;
//! [`SlackFunction`] is the declarative implementation used by definition files and
//! by the built-in Slack function catalog.

use crate::parameters::{CustomTypeRef, ParameterSetDefinition};
use crate::registry::ManifestRegistry;
use crate::types::FunctionSchema;
use serde::Deserialize;
use std::fmt;

/// Prefix shared by every function Slack provides
pub const SLACK_FUNCTION_PREFIX: &str = "slack#/functions/";

/// Whether `id` names a Slack-provided function rather than one the app defines
pub fn is_slack_function(id: &str) -> bool {
    id.starts_with(SLACK_FUNCTION_PREFIX)
}

pub trait ManifestFunction: fmt::Debug {
    /// Key of this function in the manifest's `functions` section
    fn id(&self) -> &str;

    /// Schema fragment emitted under `functions.<id>`
    fn export(&self) -> FunctionSchema;

    /// Report every custom type used by the function's parameters
    fn register_parameter_types(&self, registry: &mut ManifestRegistry);

    /// How workflow steps refer to this function
    fn reference(&self) -> String {
        if is_slack_function(self.id()) {
            self.id().to_string()
        } else {
            format!("#/functions/{}", self.id())
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlackFunction {
    pub callback_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source_file: String,
    #[serde(default)]
    pub input_parameters: ParameterSetDefinition,
    #[serde(default)]
    pub output_parameters: ParameterSetDefinition,
}

impl SlackFunction {
    pub fn new(callback_id: impl Into<String>, source_file: impl Into<String>) -> Self {
        SlackFunction {
            callback_id: callback_id.into(),
            title: None,
            description: None,
            source_file: source_file.into(),
            input_parameters: ParameterSetDefinition::default(),
            output_parameters: ParameterSetDefinition::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_input_parameters(mut self, parameters: ParameterSetDefinition) -> Self {
        self.input_parameters = parameters;
        self
    }

    pub fn with_output_parameters(mut self, parameters: ParameterSetDefinition) -> Self {
        self.output_parameters = parameters;
        self
    }

    pub fn type_refs(&self) -> Vec<&CustomTypeRef> {
        let mut refs = self.input_parameters.type_refs();
        refs.extend(self.output_parameters.type_refs());
        refs
    }
}

impl ManifestFunction for SlackFunction {
    fn id(&self) -> &str {
        &self.callback_id
    }

    fn export(&self) -> FunctionSchema {
        FunctionSchema {
            title: self.title.clone(),
            description: self.description.clone(),
            source_file: self.source_file.clone(),
            input_parameters: self.input_parameters.clone(),
            output_parameters: self.output_parameters.clone(),
        }
    }

    fn register_parameter_types(&self, registry: &mut ManifestRegistry) {
        self.input_parameters.register_types(registry);
        self.output_parameters.register_types(registry);
    }
}

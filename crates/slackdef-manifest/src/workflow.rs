use crate::function::{is_slack_function, ManifestFunction};
use crate::parameters::{CustomTypeRef, ParameterSetDefinition};
use crate::registry::ManifestRegistry;
use crate::types::{WorkflowSchema, WorkflowStepSchema};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

pub trait ManifestWorkflow: fmt::Debug {
    /// Key of this workflow in the manifest's `workflows` section
    fn id(&self) -> &str;

    fn export(&self) -> WorkflowSchema;

    /// Register the app functions the steps call, so they are emitted even when
    /// they are not declared at the top level
    fn register_step_functions(&self, registry: &mut ManifestRegistry);

    fn register_parameter_types(&self, registry: &mut ManifestRegistry);
}

/// One step of a workflow: a function call with its inputs
#[derive(Debug, Clone)]
pub struct WorkflowStep {
    pub function: Arc<dyn ManifestFunction>,
    pub inputs: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct SlackWorkflow {
    pub callback_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub input_parameters: Option<ParameterSetDefinition>,
    pub steps: Vec<WorkflowStep>,
}

impl SlackWorkflow {
    pub fn new(callback_id: impl Into<String>) -> Self {
        SlackWorkflow {
            callback_id: callback_id.into(),
            title: None,
            description: None,
            input_parameters: None,
            steps: Vec::new(),
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
        self.input_parameters = Some(parameters);
        self
    }

    /// Append a step; its id is its position in the workflow
    pub fn add_step(mut self, function: Arc<dyn ManifestFunction>, inputs: Map<String, Value>) -> Self {
        self.steps.push(WorkflowStep { function, inputs });
        self
    }

    pub fn type_refs(&self) -> Vec<&CustomTypeRef> {
        self.input_parameters
            .as_ref()
            .map(ParameterSetDefinition::type_refs)
            .unwrap_or_default()
    }
}

impl ManifestWorkflow for SlackWorkflow {
    fn id(&self) -> &str {
        &self.callback_id
    }

    fn export(&self) -> WorkflowSchema {
        WorkflowSchema {
            title: self.title.clone(),
            description: self.description.clone(),
            input_parameters: self.input_parameters.clone(),
            steps: self
                .steps
                .iter()
                .enumerate()
                .map(|(idx, step)| WorkflowStepSchema {
                    id: idx.to_string(),
                    function_id: step.function.reference(),
                    inputs: step.inputs.clone(),
                })
                .collect(),
        }
    }

    fn register_step_functions(&self, registry: &mut ManifestRegistry) {
        for step in &self.steps {
            if !is_slack_function(step.function.id()) {
                registry.register_function(Arc::clone(&step.function));
            }
        }
    }

    fn register_parameter_types(&self, registry: &mut ManifestRegistry) {
        if let Some(parameters) = &self.input_parameters {
            parameters.register_types(registry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::SlackFunction;
    use crate::schema::slack::functions;

    #[test]
    fn test_steps_are_numbered_and_referenced() {
        let greet: Arc<dyn ManifestFunction> = Arc::new(SlackFunction::new("greet", "functions/greet.ts"));
        let mut inputs = Map::new();
        inputs.insert("channel_id".to_string(), Value::from("{{inputs.channel}}"));

        let workflow = SlackWorkflow::new("welcome")
            .with_title("Welcome")
            .add_step(greet, Map::new())
            .add_step(functions::send_message(), inputs);

        let schema = workflow.export();
        assert_eq!(schema.steps.len(), 2);
        assert_eq!(schema.steps[0].id, "0");
        assert_eq!(schema.steps[0].function_id, "#/functions/greet");
        assert_eq!(schema.steps[1].id, "1");
        assert_eq!(schema.steps[1].function_id, "slack#/functions/send_message");
        assert_eq!(
            schema.steps[1].inputs.get("channel_id"),
            Some(&Value::from("{{inputs.channel}}"))
        );
    }
}

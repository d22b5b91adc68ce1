//! Definition files
//!
//! Reads an app definition from JSON, TOML or YAML and turns it into a
//! [`ManifestDefinition`]. Parsing happens in two steps: serde fills the raw
//! `*File` structs, then [`DefinitionFile::into_definition`] validates the hosting
//! variant, binds `#/types/<id>` references to declared types and resolves the
//! function each workflow step calls.

use crate::custom_type::CustomType;
use crate::datastore::Datastore;
use crate::definition::{
    AppHomeOverride, HostedOptions, Hosting, ManifestDefinition, RemoteBotUser, RemoteFeatures,
    RemoteOptions, RemoteSettings,
};
use crate::errors::ManifestError;
use crate::function::{is_slack_function, ManifestFunction, SlackFunction};
use crate::parameters::{CustomTypeRef, ParameterSetDefinition};
use crate::schema::slack::functions as slack_functions;
use crate::types::{
    AppDirectorySchema, EventSubscriptionsSchema, ShortcutSchema, SlashCommandSchema,
    WorkflowStepFeatureSchema,
};
use crate::workflow::{ManifestWorkflow, SlackWorkflow};
use ahash::AHashMap;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionFormat {
    Json,
    Toml,
    Yaml,
}

impl DefinitionFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "json" => Ok(DefinitionFormat::Json),
            "toml" => Ok(DefinitionFormat::Toml),
            "yaml" | "yml" => Ok(DefinitionFormat::Yaml),
            _ => Err(ManifestError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Read and parse a definition file
pub fn load_definition(path: &Path) -> Result<ManifestDefinition, ManifestError> {
    debug!("Loading definition from: {:?}", path);
    let format = DefinitionFormat::from_path(path)?;
    let content = fs::read_to_string(path)?;
    let definition = parse_definition(&content, format)?;
    info!("Loaded definition '{}' from {:?}", definition.name, path);
    Ok(definition)
}

/// Parse definition text in the given format
pub fn parse_definition(content: &str, format: DefinitionFormat) -> Result<ManifestDefinition, ManifestError> {
    let file: DefinitionFile = match format {
        DefinitionFormat::Json => serde_json::from_str(content)?,
        DefinitionFormat::Toml => toml::from_str(content)?,
        DefinitionFormat::Yaml => serde_yaml::from_str(content)?,
    };
    file.into_definition()
}

// =============================================================================
// RAW FILE SHAPE
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DefinitionFile {
    name: String,
    description: String,
    icon: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    background_color: Option<String>,
    #[serde(default)]
    long_description: Option<String>,
    #[serde(default)]
    bot_scopes: Vec<String>,
    #[serde(default)]
    slack_hosted: Option<bool>,

    #[serde(default)]
    functions: Option<Vec<SlackFunction>>,
    #[serde(default)]
    workflows: Option<Vec<WorkflowFile>>,
    #[serde(default)]
    types: Option<Vec<CustomType>>,
    #[serde(default)]
    datastores: Option<Vec<Datastore>>,

    #[serde(default)]
    outgoing_domains: Option<Vec<String>>,
    #[serde(default)]
    features: Option<FeaturesFile>,

    #[serde(default)]
    settings: Option<RemoteSettings>,
    #[serde(default)]
    event_subscriptions: Option<EventSubscriptionsSchema>,
    #[serde(default)]
    socket_mode_enabled: Option<bool>,
    #[serde(default)]
    token_rotation_enabled: Option<bool>,
    #[serde(default)]
    app_directory: Option<AppDirectorySchema>,
    #[serde(default)]
    user_scopes: Option<Vec<String>>,
    #[serde(default)]
    redirect_urls: Option<Vec<String>>,
    #[serde(default)]
    token_management_enabled: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FeaturesFile {
    #[serde(default)]
    app_home: Option<AppHomeOverride>,
    #[serde(default)]
    bot_user: Option<RemoteBotUser>,
    #[serde(default)]
    shortcuts: Option<Vec<ShortcutSchema>>,
    #[serde(default)]
    slash_commands: Option<Vec<SlashCommandSchema>>,
    #[serde(default)]
    unfurl_domains: Option<Vec<String>>,
    #[serde(default)]
    workflow_steps: Option<Vec<WorkflowStepFeatureSchema>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WorkflowFile {
    callback_id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    input_parameters: Option<ParameterSetDefinition>,
    #[serde(default)]
    steps: Vec<StepFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StepFile {
    #[serde(default)]
    function_id: Option<String>,
    #[serde(default)]
    function: Option<SlackFunction>,
    #[serde(default)]
    inputs: Map<String, Value>,
}

impl DefinitionFile {
    fn into_definition(mut self) -> Result<ManifestDefinition, ManifestError> {
        let hosting = self.take_hosting()?;

        let types: Option<Vec<Arc<CustomType>>> = self
            .types
            .take()
            .map(|types| types.into_iter().map(Arc::new).collect());
        let declared_types = index_types(types.as_deref().unwrap_or_default());

        let functions: Option<Vec<Arc<SlackFunction>>> = self
            .functions
            .take()
            .map(|functions| functions.into_iter().map(Arc::new).collect());
        let mut declared_functions: AHashMap<String, Arc<dyn ManifestFunction>> = AHashMap::new();
        for function in functions.iter().flatten() {
            declared_functions
                .entry(function.callback_id.clone())
                .or_insert_with(|| Arc::clone(function) as Arc<dyn ManifestFunction>);
        }

        // Bind every `#/types/<id>` reference before the definitions are frozen
        let mut references: Vec<&CustomTypeRef> = Vec::new();
        for custom_type in types.iter().flatten() {
            references.extend(custom_type.definition().type_refs());
        }
        for function in functions.iter().flatten() {
            references.extend(function.type_refs());
        }
        for datastore in self.datastores.iter().flatten() {
            for attribute in datastore.attributes.values() {
                references.extend(attribute.type_refs());
            }
        }
        for workflow in self.workflows.iter().flatten() {
            if let Some(parameters) = &workflow.input_parameters {
                references.extend(parameters.type_refs());
            }
            for step in &workflow.steps {
                if let Some(function) = &step.function {
                    references.extend(function.type_refs());
                }
            }
        }
        bind_references(&references, &declared_types)?;

        let workflows = self
            .workflows
            .take()
            .map(|workflows| {
                workflows
                    .into_iter()
                    .map(|workflow| workflow.into_workflow(&declared_functions))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        Ok(ManifestDefinition {
            name: self.name,
            description: self.description,
            icon: self.icon,
            display_name: self.display_name,
            background_color: self.background_color,
            long_description: self.long_description,
            bot_scopes: self.bot_scopes,
            functions: functions.map(|functions| {
                functions
                    .into_iter()
                    .map(|function| function as Arc<dyn ManifestFunction>)
                    .collect()
            }),
            workflows,
            types,
            datastores: self.datastores,
            hosting,
        })
    }

    fn take_hosting(&mut self) -> Result<Hosting, ManifestError> {
        let features = self.features.take().unwrap_or_default();

        if self.slack_hosted.unwrap_or(true) {
            let remote_only: [(&'static str, bool); 13] = [
                ("settings", self.settings.is_some()),
                ("event_subscriptions", self.event_subscriptions.is_some()),
                ("socket_mode_enabled", self.socket_mode_enabled.is_some()),
                ("token_rotation_enabled", self.token_rotation_enabled.is_some()),
                ("app_directory", self.app_directory.is_some()),
                ("user_scopes", self.user_scopes.is_some()),
                ("redirect_urls", self.redirect_urls.is_some()),
                ("token_management_enabled", self.token_management_enabled.is_some()),
                ("features.bot_user", features.bot_user.is_some()),
                ("features.shortcuts", features.shortcuts.is_some()),
                ("features.slash_commands", features.slash_commands.is_some()),
                ("features.unfurl_domains", features.unfurl_domains.is_some()),
                ("features.workflow_steps", features.workflow_steps.is_some()),
            ];
            if let Some((field, _)) = remote_only.iter().find(|(_, present)| *present) {
                return Err(ManifestError::RemoteOnlyField(*field));
            }

            return Ok(Hosting::Hosted(HostedOptions {
                outgoing_domains: self.outgoing_domains.take(),
                app_home: features.app_home,
            }));
        }

        if self.outgoing_domains.is_some() {
            return Err(ManifestError::HostedOnlyField("outgoing_domains"));
        }

        let has_features = features.app_home.is_some()
            || features.bot_user.is_some()
            || features.shortcuts.is_some()
            || features.slash_commands.is_some()
            || features.unfurl_domains.is_some()
            || features.workflow_steps.is_some();

        Ok(Hosting::remote(RemoteOptions {
            settings: self.settings.take(),
            event_subscriptions: self.event_subscriptions.take(),
            socket_mode_enabled: self.socket_mode_enabled,
            token_rotation_enabled: self.token_rotation_enabled,
            app_directory: self.app_directory.take(),
            user_scopes: self.user_scopes.take(),
            redirect_urls: self.redirect_urls.take(),
            token_management_enabled: self.token_management_enabled,
            features: has_features.then(|| RemoteFeatures {
                app_home: features.app_home,
                bot_user: features.bot_user,
                shortcuts: features.shortcuts,
                slash_commands: features.slash_commands,
                unfurl_domains: features.unfurl_domains,
                workflow_steps: features.workflow_steps,
            }),
        }))
    }
}

impl WorkflowFile {
    fn into_workflow(
        self,
        declared_functions: &AHashMap<String, Arc<dyn ManifestFunction>>,
    ) -> Result<Arc<dyn ManifestWorkflow>, ManifestError> {
        let mut workflow = SlackWorkflow::new(self.callback_id);
        workflow.title = self.title;
        workflow.description = self.description;
        workflow.input_parameters = self.input_parameters;

        for (idx, step) in self.steps.into_iter().enumerate() {
            let function = match (step.function_id, step.function) {
                (Some(function_id), None) => {
                    resolve_step_function(&workflow.callback_id, &function_id, declared_functions)?
                }
                (None, Some(function)) => Arc::new(function) as Arc<dyn ManifestFunction>,
                _ => {
                    return Err(ManifestError::InvalidDefinition(format!(
                        "step {idx} of workflow '{}' must set exactly one of `function_id` or `function`",
                        workflow.callback_id
                    )))
                }
            };
            workflow = workflow.add_step(function, step.inputs);
        }

        Ok(Arc::new(workflow))
    }
}

fn resolve_step_function(
    workflow: &str,
    function_id: &str,
    declared_functions: &AHashMap<String, Arc<dyn ManifestFunction>>,
) -> Result<Arc<dyn ManifestFunction>, ManifestError> {
    if let Some(function) = declared_functions.get(function_id) {
        return Ok(Arc::clone(function));
    }

    if is_slack_function(function_id) {
        // Built-ins are only referenced by id, never exported
        return Ok(slack_functions::lookup(function_id).unwrap_or_else(|| {
            debug!("Built-in function '{}' not in catalog, referencing by id", function_id);
            Arc::new(SlackFunction::new(function_id, ""))
        }));
    }

    Err(ManifestError::UnknownFunction {
        workflow: workflow.to_string(),
        function_id: function_id.to_string(),
    })
}

/// First declaration wins, matching the registry's dedup policy
fn index_types(types: &[Arc<CustomType>]) -> AHashMap<&str, &Arc<CustomType>> {
    let mut index = AHashMap::new();
    for custom_type in types {
        index.entry(custom_type.id()).or_insert(custom_type);
    }
    index
}

fn bind_references(
    references: &[&CustomTypeRef],
    declared_types: &AHashMap<&str, &Arc<CustomType>>,
) -> Result<(), ManifestError> {
    for reference in references {
        if reference.is_bound() {
            continue;
        }
        let Some(target) = declared_types.get(reference.id()) else {
            return Err(ManifestError::UnknownTypeReference {
                id: reference.id().to_string(),
            });
        };
        reference.bind(target)?;
    }
    debug!("Bound {} type references", references.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ManifestRegistry;
    use serde_json::json;
    use std::io::Write;

    fn export(definition: ManifestDefinition) -> Value {
        match ManifestRegistry::new(definition).and_then(|registry| registry.export()) {
            Ok(manifest) => serde_json::to_value(manifest).unwrap_or_default(),
            Err(e) => panic!("registry failed: {e}"),
        }
    }

    const HOSTED_YAML: &str = r##"
name: Incident Bot
description: Files incident reports
icon: assets/icon.png
bot_scopes: [chat:write]
outgoing_domains: [status.example.com]
features:
  app_home:
    home_tab_enabled: true
types:
  - name: severity
    type: string
    enum: [low, high]
  - callback_id: incident
    type: object
    properties:
      severity:
        type: "#/types/severity"
      summary:
        type: string
functions:
  - callback_id: file_incident
    title: File incident
    source_file: functions/file_incident.ts
    input_parameters:
      properties:
        incident:
          type: "#/types/incident"
      required: [incident]
workflows:
  - callback_id: report
    title: Report an incident
    steps:
      - function_id: file_incident
        inputs:
          incident: "{{inputs.incident}}"
      - function_id: slack#/functions/send_message
        inputs:
          channel_id: C123
          message: Filed
"##;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            DefinitionFormat::from_path(Path::new("app.JSON")).ok(),
            Some(DefinitionFormat::Json)
        );
        assert_eq!(
            DefinitionFormat::from_path(Path::new("app.yml")).ok(),
            Some(DefinitionFormat::Yaml)
        );
        assert_eq!(
            DefinitionFormat::from_path(Path::new("app.toml")).ok(),
            Some(DefinitionFormat::Toml)
        );
        assert!(matches!(
            DefinitionFormat::from_path(Path::new("app.txt")),
            Err(ManifestError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_hosted_yaml_definition() {
        let definition = parse_definition(HOSTED_YAML, DefinitionFormat::Yaml);
        assert!(definition.is_ok(), "parse failed: {:?}", definition.err());
        let Ok(definition) = definition else {
            return;
        };
        assert!(matches!(definition.hosting, Hosting::Hosted(_)));

        let value = export(definition);
        assert_eq!(value["settings"]["function_runtime"], json!("slack"));
        assert_eq!(value["outgoing_domains"], json!(["status.example.com"]));
        assert_eq!(value["features"]["app_home"]["home_tab_enabled"], json!(true));
        assert_eq!(
            value["types"]["incident"]["properties"]["severity"]["type"],
            json!("#/types/severity")
        );
        assert_eq!(value["types"]["severity"]["enum"], json!(["low", "high"]));
        assert!(value["types"]["severity"].get("name").is_none());
        assert_eq!(
            value["workflows"]["report"]["steps"][0]["function_id"],
            json!("#/functions/file_incident")
        );
        assert_eq!(
            value["workflows"]["report"]["steps"][1]["function_id"],
            json!("slack#/functions/send_message")
        );
        assert!(value["functions"].get("slack#/functions/send_message").is_none());
    }

    #[test]
    fn test_remote_json_definition() {
        let content = json!({
            "name": "Remote App",
            "description": "Runs elsewhere",
            "icon": "icon.png",
            "slack_hosted": false,
            "socket_mode_enabled": true,
            "user_scopes": ["users:read"],
            "settings": {"org_deploy_enabled": true},
            "features": {"bot_user": {"always_online": true}}
        })
        .to_string();

        let definition = parse_definition(&content, DefinitionFormat::Json);
        assert!(definition.is_ok(), "parse failed: {:?}", definition.err());
        let Ok(definition) = definition else {
            return;
        };

        let value = export(definition);
        assert_eq!(
            value["settings"],
            json!({"org_deploy_enabled": true, "socket_mode_enabled": true, "function_runtime": "remote"})
        );
        assert_eq!(value["oauth_config"]["scopes"]["user"], json!(["users:read"]));
        assert_eq!(value["features"]["bot_user"]["always_online"], json!(true));
    }

    #[test]
    fn test_cyclic_types_in_toml() {
        let content = r##"
name = "Graph"
description = "Cyclic types"
icon = "icon.png"

[[types]]
callback_id = "node"
type = "object"
properties.next = { type = "#/types/edge" }

[[types]]
callback_id = "edge"
type = "object"
properties.target = { type = "#/types/node" }

[[functions]]
callback_id = "walk"
source_file = "functions/walk.ts"
input_parameters.properties.start = { type = "#/types/node" }
"##;

        let definition = parse_definition(content, DefinitionFormat::Toml);
        assert!(definition.is_ok(), "parse failed: {:?}", definition.err());
        let Ok(definition) = definition else {
            return;
        };

        let value = export(definition);
        let types = value["types"].as_object().cloned().unwrap_or_default();
        assert_eq!(types.keys().collect::<Vec<_>>(), vec!["edge", "node"]);
    }

    #[test]
    fn test_unknown_type_reference_is_rejected() {
        let content = json!({
            "name": "A", "description": "B", "icon": "c.png",
            "functions": [{
                "callback_id": "f",
                "source_file": "f.ts",
                "input_parameters": {"properties": {"x": {"type": "#/types/missing"}}}
            }]
        })
        .to_string();

        assert!(matches!(
            parse_definition(&content, DefinitionFormat::Json),
            Err(ManifestError::UnknownTypeReference { id }) if id == "missing"
        ));
    }

    #[test]
    fn test_remote_only_field_on_hosted_app() {
        let content = json!({
            "name": "A", "description": "B", "icon": "c.png",
            "socket_mode_enabled": true
        })
        .to_string();
        assert!(matches!(
            parse_definition(&content, DefinitionFormat::Json),
            Err(ManifestError::RemoteOnlyField("socket_mode_enabled"))
        ));

        let content = json!({
            "name": "A", "description": "B", "icon": "c.png",
            "slack_hosted": true,
            "features": {"shortcuts": []}
        })
        .to_string();
        assert!(matches!(
            parse_definition(&content, DefinitionFormat::Json),
            Err(ManifestError::RemoteOnlyField("features.shortcuts"))
        ));
    }

    #[test]
    fn test_outgoing_domains_on_remote_app() {
        let content = json!({
            "name": "A", "description": "B", "icon": "c.png",
            "slack_hosted": false,
            "outgoing_domains": ["example.com"]
        })
        .to_string();
        assert!(matches!(
            parse_definition(&content, DefinitionFormat::Json),
            Err(ManifestError::HostedOnlyField("outgoing_domains"))
        ));
    }

    #[test]
    fn test_non_boolean_discriminant_is_rejected() {
        let content = r#"{"name": "A", "description": "B", "icon": "c.png", "slack_hosted": "no"}"#;
        assert!(matches!(
            parse_definition(content, DefinitionFormat::Json),
            Err(ManifestError::Json(_))
        ));
    }

    #[test]
    fn test_step_must_name_exactly_one_function() {
        let content = json!({
            "name": "A", "description": "B", "icon": "c.png",
            "workflows": [{"callback_id": "w", "steps": [{"inputs": {}}]}]
        })
        .to_string();
        assert!(matches!(
            parse_definition(&content, DefinitionFormat::Json),
            Err(ManifestError::InvalidDefinition(_))
        ));
    }

    #[test]
    fn test_unknown_step_function() {
        let content = json!({
            "name": "A", "description": "B", "icon": "c.png",
            "workflows": [{"callback_id": "w", "steps": [{"function_id": "nope"}]}]
        })
        .to_string();
        assert!(matches!(
            parse_definition(&content, DefinitionFormat::Json),
            Err(ManifestError::UnknownFunction { workflow, function_id })
                if workflow == "w" && function_id == "nope"
        ));
    }

    #[test]
    fn test_inline_step_function_is_registered() {
        let content = json!({
            "name": "A", "description": "B", "icon": "c.png",
            "workflows": [{
                "callback_id": "w",
                "steps": [{"function": {"callback_id": "inline", "source_file": "inline.ts"}}]
            }]
        })
        .to_string();

        let Ok(definition) = parse_definition(&content, DefinitionFormat::Json) else {
            panic!("parse failed");
        };
        assert!(definition.functions.is_none());

        let value = export(definition);
        assert_eq!(value["functions"]["inline"]["source_file"], json!("inline.ts"));
    }

    #[test]
    fn test_declared_property_order_is_kept() {
        let content = r##"{
            "name": "A", "description": "B", "icon": "c.png",
            "types": [{
                "name": "pair", "type": "object",
                "properties": {"zeta": {"type": "string"}, "alpha": {"type": "string"}}
            }],
            "datastores": [{
                "name": "pairs", "primary_key": "zeta",
                "attributes": {"zeta": {"type": "string"}, "alpha": {"type": "#/types/pair"}}
            }],
            "functions": [{
                "callback_id": "swap", "source_file": "swap.ts",
                "input_parameters": {
                    "properties": {"zeta": {"type": "string", "title": "Z"}, "alpha": {"type": "string"}}
                }
            }],
            "workflows": [{
                "callback_id": "w",
                "steps": [{"function_id": "swap", "inputs": {"zeta": "1", "alpha": "2"}}]
            }]
        }"##;
        let Ok(definition) = parse_definition(content, DefinitionFormat::Json) else {
            panic!("parse failed");
        };
        let value = export(definition);

        let keys = |v: &Value| -> Vec<String> {
            v.as_object()
                .map(|o| o.keys().cloned().collect())
                .unwrap_or_default()
        };
        let expected = vec!["zeta".to_string(), "alpha".to_string()];
        assert_eq!(keys(&value["functions"]["swap"]["input_parameters"]["properties"]), expected);
        assert_eq!(keys(&value["functions"]["swap"]["input_parameters"]["properties"]["zeta"]), vec!["type", "title"]);
        assert_eq!(keys(&value["types"]["pair"]["properties"]), expected);
        assert_eq!(keys(&value["datastores"]["pairs"]["attributes"]), expected);
        assert_eq!(keys(&value["workflows"]["w"]["steps"][0]["inputs"]), expected);
    }

    #[test]
    fn test_load_definition_from_file() {
        let Ok(mut file) = tempfile::Builder::new().suffix(".yaml").tempfile() else {
            return;
        };
        assert!(file.write_all(HOSTED_YAML.as_bytes()).is_ok());

        let definition = load_definition(file.path());
        assert!(definition.is_ok_and(|d| d.name == "Incident Bot"));

        assert!(matches!(
            load_definition(Path::new("/nonexistent/app.yaml")),
            Err(ManifestError::Io(_))
        ));
    }
}

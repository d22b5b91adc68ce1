//! App definition model
//!
//! `ManifestDefinition` is what an app author writes. It does not map 1:1 onto
//! [`ManifestSchema`](crate::types::ManifestSchema): it carries affordances such as the
//! display-name fallback and app-home defaults, and it separates Slack hosted apps
//! from remote (self-hosted) apps with the [`Hosting`] sum type.

use crate::custom_type::CustomType;
use crate::datastore::Datastore;
use crate::function::ManifestFunction;
use crate::types::{
    AppDirectorySchema, EventSubscriptionsSchema, FunctionRuntime, InteractivitySchema,
    ShortcutSchema, SiwsLinksSchema, SlashCommandSchema, WorkflowStepFeatureSchema,
};
use crate::workflow::ManifestWorkflow;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Root input for one manifest build
#[derive(Debug, Clone)]
pub struct ManifestDefinition {
    pub name: String,
    pub description: String,
    pub icon: String,
    pub display_name: Option<String>,
    pub background_color: Option<String>,
    pub long_description: Option<String>,
    pub bot_scopes: Vec<String>,
    pub functions: Option<Vec<Arc<dyn ManifestFunction>>>,
    pub workflows: Option<Vec<Arc<dyn ManifestWorkflow>>>,
    pub types: Option<Vec<Arc<CustomType>>>,
    pub datastores: Option<Vec<Datastore>>,
    pub hosting: Hosting,
}

impl ManifestDefinition {
    /// A Slack hosted app with no entities and no bot scopes
    pub fn new(name: impl Into<String>, description: impl Into<String>, icon: impl Into<String>) -> Self {
        ManifestDefinition {
            name: name.into(),
            description: description.into(),
            icon: icon.into(),
            display_name: None,
            background_color: None,
            long_description: None,
            bot_scopes: Vec::new(),
            functions: None,
            workflows: None,
            types: None,
            datastores: None,
            hosting: Hosting::default(),
        }
    }

    pub fn with_hosting(mut self, hosting: Hosting) -> Self {
        self.hosting = hosting;
        self
    }

    pub fn with_bot_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bot_scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_function(mut self, function: Arc<dyn ManifestFunction>) -> Self {
        self.functions.get_or_insert_with(Vec::new).push(function);
        self
    }

    pub fn with_workflow(mut self, workflow: Arc<dyn ManifestWorkflow>) -> Self {
        self.workflows.get_or_insert_with(Vec::new).push(workflow);
        self
    }

    pub fn with_type(mut self, custom_type: Arc<CustomType>) -> Self {
        self.types.get_or_insert_with(Vec::new).push(custom_type);
        self
    }

    pub fn with_datastore(mut self, datastore: Datastore) -> Self {
        self.datastores.get_or_insert_with(Vec::new).push(datastore);
        self
    }

    /// Bot display name, falling back to the app name when unset or empty
    pub fn bot_display_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.name)
    }
}

// =============================================================================
// HOSTING VARIANTS
// =============================================================================

/// Where the app runs. Exactly one variant per definition.
#[derive(Debug, Clone)]
pub enum Hosting {
    Hosted(HostedOptions),
    Remote(Box<RemoteOptions>),
}

impl Default for Hosting {
    fn default() -> Self {
        Hosting::Hosted(HostedOptions::default())
    }
}

impl Hosting {
    pub fn remote(options: RemoteOptions) -> Self {
        Hosting::Remote(Box::new(options))
    }

    pub fn function_runtime(&self) -> FunctionRuntime {
        match self {
            Hosting::Hosted(_) => FunctionRuntime::Slack,
            Hosting::Remote(_) => FunctionRuntime::Remote,
        }
    }

    pub fn app_home(&self) -> Option<&AppHomeOverride> {
        match self {
            Hosting::Hosted(options) => options.app_home.as_ref(),
            Hosting::Remote(options) => options
                .features
                .as_ref()
                .and_then(|features| features.app_home.as_ref()),
        }
    }
}

/// Options for apps whose functions run on Slack's infrastructure
#[derive(Debug, Clone, Default)]
pub struct HostedOptions {
    pub outgoing_domains: Option<Vec<String>>,
    pub app_home: Option<AppHomeOverride>,
}

/// Options for self-hosted apps
#[derive(Debug, Clone, Default)]
pub struct RemoteOptions {
    pub settings: Option<RemoteSettings>,
    pub event_subscriptions: Option<EventSubscriptionsSchema>,
    pub socket_mode_enabled: Option<bool>,
    pub token_rotation_enabled: Option<bool>,
    pub app_directory: Option<AppDirectorySchema>,
    pub user_scopes: Option<Vec<String>>,
    pub redirect_urls: Option<Vec<String>>,
    pub token_management_enabled: Option<bool>,
    pub features: Option<RemoteFeatures>,
}

/// Settings a remote app may declare. `function_runtime`, `event_subscriptions`,
/// `socket_mode_enabled` and `token_rotation_enabled` live on [`RemoteOptions`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RemoteSettings {
    #[serde(default)]
    pub allowed_ip_address_ranges: Option<Vec<String>>,
    #[serde(default)]
    pub incoming_webhooks: Option<bool>,
    #[serde(default)]
    pub interactivity: Option<InteractivitySchema>,
    #[serde(default)]
    pub org_deploy_enabled: Option<bool>,
    #[serde(default)]
    pub siws_links: Option<SiwsLinksSchema>,
}

#[derive(Debug, Clone, Default)]
pub struct RemoteFeatures {
    pub app_home: Option<AppHomeOverride>,
    pub bot_user: Option<RemoteBotUser>,
    pub shortcuts: Option<Vec<ShortcutSchema>>,
    pub slash_commands: Option<Vec<SlashCommandSchema>>,
    pub unfurl_domains: Option<Vec<String>>,
    pub workflow_steps: Option<Vec<WorkflowStepFeatureSchema>>,
}

/// Bot user options for remote apps; the display name always comes from the
/// definition itself
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteBotUser {
    #[serde(default)]
    pub always_online: Option<bool>,
}

// =============================================================================
// APP HOME
// =============================================================================

/// Explicit app-home values. `None` keeps the default; `Some(false)` is an override.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppHomeOverride {
    #[serde(default)]
    pub home_tab_enabled: Option<bool>,
    #[serde(default)]
    pub messages_tab_enabled: Option<bool>,
    #[serde(default)]
    pub messages_tab_read_only_enabled: Option<bool>,
}

/// Resolve one field of a defaulted block
pub fn merge(default: bool, value: Option<bool>) -> bool {
    value.unwrap_or(default)
}

//! Manifest schema types
//!
//! These types mirror the platform's app manifest exactly: field names and nesting
//! are parsed by key on the other side, so every name here is part of the wire
//! format. Optional sections are skipped when unset rather than emitted as `null`.

use crate::parameters::{ParameterDefinition, ParameterSet, ParameterSetDefinition};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Major version of the manifest format this crate emits
pub const MANIFEST_MAJOR_VERSION: u32 = 2;

// =============================================================================
// MANIFEST - Top-level document
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestSchema {
    #[serde(rename = "_metadata")]
    pub metadata: MetadataSchema,
    pub settings: SettingsSchema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_directory: Option<AppDirectorySchema>,
    pub display_information: DisplayInformationSchema,
    pub icon: String,
    pub oauth_config: OauthConfigSchema,
    pub features: FeaturesSchema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub functions: Option<BTreeMap<String, FunctionSchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflows: Option<BTreeMap<String, WorkflowSchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outgoing_domains: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub types: Option<BTreeMap<String, ParameterDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datastores: Option<BTreeMap<String, DatastoreSchema>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetadataSchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major_version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minor_version: Option<u32>,
}

impl Default for MetadataSchema {
    fn default() -> Self {
        MetadataSchema {
            major_version: Some(MANIFEST_MAJOR_VERSION),
            minor_version: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplayInformationSchema {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,
}

// =============================================================================
// SETTINGS
// =============================================================================

/// Where the app's functions run
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FunctionRuntime {
    #[default]
    Slack,
    Remote,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SettingsSchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_ip_address_ranges: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_subscriptions: Option<EventSubscriptionsSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incoming_webhooks: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interactivity: Option<InteractivitySchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_deploy_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socket_mode_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_rotation_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub siws_links: Option<SiwsLinksSchema>,
    pub function_runtime: FunctionRuntime,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventSubscriptionsSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_events: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_events: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_subscriptions: Option<Vec<MetadataSubscriptionSchema>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetadataSubscriptionSchema {
    pub app_id: String,
    pub event_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InteractivitySchema {
    pub is_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_menu_options_url: Option<String>,
}

/// Sign in with Slack
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiwsLinksSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiate_uri: Option<String>,
}

// =============================================================================
// APP DIRECTORY
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppDirectorySchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_directory_categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_direct_install: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_install_url: Option<String>,
    pub installation_landing_page: String,
    pub privacy_policy_url: String,
    pub support_url: String,
    pub support_email: String,
    pub supported_languages: Vec<String>,
    pub pricing: String,
}

// =============================================================================
// OAUTH
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OauthConfigSchema {
    pub scopes: ScopesSchema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_management_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScopesSchema {
    pub bot: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Vec<String>>,
}

// =============================================================================
// FEATURES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeaturesSchema {
    pub bot_user: BotUserSchema,
    pub app_home: AppHomeSchema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortcuts: Option<Vec<ShortcutSchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slash_commands: Option<Vec<SlashCommandSchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unfurl_domains: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_steps: Option<Vec<WorkflowStepFeatureSchema>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BotUserSchema {
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub always_online: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppHomeSchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_tab_enabled: Option<bool>,
    pub messages_tab_enabled: bool,
    pub messages_tab_read_only_enabled: bool,
}

impl Default for AppHomeSchema {
    fn default() -> Self {
        AppHomeSchema {
            home_tab_enabled: None,
            messages_tab_enabled: true,
            messages_tab_read_only_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ShortcutType {
    Message,
    Global,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShortcutSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub shortcut_type: ShortcutType,
    pub callback_id: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlashCommandSchema {
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub should_escape: Option<bool>,
}

/// Legacy "steps from apps" feature entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkflowStepFeatureSchema {
    pub name: String,
    pub callback_id: String,
}

// =============================================================================
// ENTITY FRAGMENTS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub source_file: String,
    pub input_parameters: ParameterSetDefinition,
    pub output_parameters: ParameterSetDefinition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowSchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_parameters: Option<ParameterSetDefinition>,
    pub steps: Vec<WorkflowStepSchema>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowStepSchema {
    pub id: String,
    pub function_id: String,
    pub inputs: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatastoreSchema {
    pub primary_key: String,
    pub attributes: ParameterSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_runtime_wire_names() {
        assert_eq!(
            serde_json::to_value(FunctionRuntime::Slack).ok(),
            Some(serde_json::json!("slack"))
        );
        assert_eq!(
            serde_json::to_value(FunctionRuntime::Remote).ok(),
            Some(serde_json::json!("remote"))
        );
    }

    #[test]
    fn test_app_home_defaults() {
        assert_eq!(
            serde_json::to_value(AppHomeSchema::default()).ok(),
            Some(serde_json::json!({
                "messages_tab_enabled": true,
                "messages_tab_read_only_enabled": true
            }))
        );
    }

    #[test]
    fn test_unset_settings_are_skipped() {
        let settings = SettingsSchema::default();
        assert_eq!(
            serde_json::to_value(settings).ok(),
            Some(serde_json::json!({"function_runtime": "slack"}))
        );
    }

    #[test]
    fn test_shortcut_type_field_name() {
        let shortcut = ShortcutSchema {
            name: "Report".to_string(),
            shortcut_type: ShortcutType::Message,
            callback_id: "report".to_string(),
            description: "Report a message".to_string(),
        };
        let value = serde_json::to_value(shortcut).unwrap_or_default();
        assert_eq!(value["type"], serde_json::json!("message"));
    }
}

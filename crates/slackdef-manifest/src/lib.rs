//! slackdef manifest assembly
//!
//! This crate turns a developer-facing app definition into the normalized manifest
//! document the platform consumes. A [`ManifestDefinition`] describes the app: its
//! functions, workflows, custom types and datastores plus either Slack hosted or
//! remote options. [`ManifestRegistry`] walks those entities, discovers every custom
//! type they use (transitively, cycles included) and exports a [`ManifestSchema`].
//!
//! Definitions can be built in code or loaded from JSON, TOML or YAML files with
//! [`load_definition`].

pub mod custom_type;
pub mod datastore;
pub mod definition;
pub mod errors;
pub mod function;
pub mod loader;
pub mod manifest_writer;
pub mod parameters;
pub mod registry;
mod remote;
pub mod schema;
pub mod types;
pub mod workflow;

pub use custom_type::{CustomType, TypeIdentity, TypeShape};
pub use datastore::Datastore;
pub use definition::{
    merge, AppHomeOverride, HostedOptions, Hosting, ManifestDefinition, RemoteBotUser,
    RemoteFeatures, RemoteOptions, RemoteSettings,
};
pub use errors::ManifestError;
pub use function::{is_slack_function, ManifestFunction, SlackFunction};
pub use loader::{load_definition, parse_definition, DefinitionFormat};
pub use parameters::{
    CustomTypeRef, ParameterDefinition, ParameterSet, ParameterSetDefinition, TypeRef,
};
pub use registry::ManifestRegistry;
pub use types::{FunctionRuntime, ManifestSchema};
pub use workflow::{ManifestWorkflow, SlackWorkflow, WorkflowStep};

// Re-export manifest output helpers
pub use manifest_writer::{read_from_path, to_json_string, write_to_path};

/// Run the registration pass over `definition` and export the manifest
pub fn build_manifest(definition: ManifestDefinition) -> Result<ManifestSchema, ManifestError> {
    ManifestRegistry::new(definition)?.export()
}

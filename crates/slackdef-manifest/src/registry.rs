//! Manifest registry
//!
//! The registry owns the working set of one manifest build. Construction runs the
//! registration pass, during which entities report the custom types and step
//! functions they use; [`ManifestRegistry::export`] then assembles the document.
//!
//! Registration is idempotent per identifier: the first entity registered under an
//! id wins and later ones are dropped. That is also what makes cyclic type graphs
//! terminate, since a type already in the list is never appended (and so never
//! walked) twice.

use crate::custom_type::CustomType;
use crate::definition::{merge, AppHomeOverride, Hosting, ManifestDefinition};
use crate::errors::ManifestError;
use crate::function::ManifestFunction;
use crate::parameters::{CustomTypeRef, ParameterSet};
use crate::remote::assign_remote_properties;
use crate::types::{
    AppHomeSchema, BotUserSchema, DisplayInformationSchema, FeaturesSchema, ManifestSchema,
    MetadataSchema, OauthConfigSchema, ScopesSchema, SettingsSchema,
};
use ahash::AHashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Scopes every app with at least one datastore needs
pub const DATASTORE_SCOPES: [&str; 2] = ["datastore:read", "datastore:write"];

/// Single-use registry for one manifest build
#[derive(Debug)]
pub struct ManifestRegistry {
    definition: ManifestDefinition,
    functions: Option<Vec<Arc<dyn ManifestFunction>>>,
    types: Option<Vec<Arc<CustomType>>>,

    /// id -> position in `functions`
    function_index: AHashMap<String, usize>,
    /// id -> position in `types`
    type_index: AHashMap<String, usize>,

    /// Referenced types that could not be resolved, in discovery order
    unresolved: Vec<String>,
}

impl ManifestRegistry {
    /// Take ownership of a definition and run the registration pass
    pub fn new(mut definition: ManifestDefinition) -> Result<Self, ManifestError> {
        let declared_functions = definition.functions.take();
        let declared_types = definition.types.take();

        let mut registry = ManifestRegistry {
            functions: declared_functions.as_ref().map(|_| Vec::new()),
            types: declared_types.as_ref().map(|_| Vec::new()),
            definition,
            function_index: AHashMap::new(),
            type_index: AHashMap::new(),
            unresolved: Vec::new(),
        };

        for function in declared_functions.into_iter().flatten() {
            registry.register_function(function);
        }
        for custom_type in declared_types.into_iter().flatten() {
            registry.insert_type(custom_type);
        }

        registry.register_features();
        registry.check_resolved()?;

        debug!(
            "Registration complete: {} functions, {} types",
            registry.functions().len(),
            registry.types().len()
        );
        Ok(registry)
    }

    fn register_features(&mut self) {
        // Workflows first: their step functions join the function list walked below
        let workflows = self.definition.workflows.clone().unwrap_or_default();
        for workflow in &workflows {
            workflow.register_step_functions(self);
            workflow.register_parameter_types(self);
        }

        let functions = self.functions.clone().unwrap_or_default();
        for function in &functions {
            function.register_parameter_types(self);
        }

        let datastores = self.definition.datastores.take();
        for datastore in datastores.iter().flatten() {
            datastore.register_attribute_types(self);
        }
        self.definition.datastores = datastores;

        // Walk by index: types appended while walking are visited in this same pass
        let mut cursor = 0;
        while let Some(custom_type) = self.types.as_ref().and_then(|types| types.get(cursor)).cloned() {
            custom_type.register_parameter_types(self);
            cursor += 1;
        }
    }

    /// Add a function unless one with the same id is already registered
    pub fn register_function(&mut self, function: Arc<dyn ManifestFunction>) {
        if self.function_index.contains_key(function.id()) {
            debug!("Function '{}' already registered, skipping", function.id());
            return;
        }

        let functions = self.functions.get_or_insert_with(Vec::new);
        self.function_index
            .insert(function.id().to_string(), functions.len());
        functions.push(function);
    }

    /// Add the referenced custom type unless one with the same id is already registered
    pub fn register_type(&mut self, reference: &CustomTypeRef) {
        if self.type_index.contains_key(reference.id()) {
            return;
        }

        match reference.resolve() {
            Some(custom_type) => self.insert_type(custom_type),
            None => {
                warn!("Custom type '{}' is referenced but unresolved", reference.id());
                if !self.unresolved.iter().any(|id| id == reference.id()) {
                    self.unresolved.push(reference.id().to_string());
                }
            }
        }
    }

    /// Register every parameter whose type is a custom type
    pub fn register_types(&mut self, parameters: &ParameterSet) {
        for parameter in parameters.values() {
            if let Some(reference) = parameter.param_type.as_custom() {
                self.register_type(reference);
            }
        }
    }

    fn insert_type(&mut self, custom_type: Arc<CustomType>) {
        if self.type_index.contains_key(custom_type.id()) {
            debug!("Custom type '{}' already registered, skipping", custom_type.id());
            return;
        }

        let types = self.types.get_or_insert_with(Vec::new);
        debug!("Registered custom type '{}'", custom_type.id());
        self.type_index
            .insert(custom_type.id().to_string(), types.len());
        types.push(custom_type);
    }

    pub fn definition(&self) -> &ManifestDefinition {
        &self.definition
    }

    /// Registered functions in registration order
    pub fn functions(&self) -> &[Arc<dyn ManifestFunction>] {
        self.functions.as_deref().unwrap_or_default()
    }

    /// Registered custom types in registration order
    pub fn types(&self) -> &[Arc<CustomType>] {
        self.types.as_deref().unwrap_or_default()
    }

    pub fn get_function(&self, id: &str) -> Option<&Arc<dyn ManifestFunction>> {
        self.function_index
            .get(id)
            .and_then(|&idx| self.functions().get(idx))
    }

    pub fn get_type(&self, id: &str) -> Option<&Arc<CustomType>> {
        self.type_index.get(id).and_then(|&idx| self.types().get(idx))
    }

    /// Fails while any referenced type is still unresolved, including references
    /// registered after construction
    fn check_resolved(&self) -> Result<(), ManifestError> {
        if self.unresolved.is_empty() {
            Ok(())
        } else {
            Err(ManifestError::UnresolvedTypeReference(self.unresolved.join(", ")))
        }
    }

    /// Assemble the manifest document
    pub fn export(&self) -> Result<ManifestSchema, ManifestError> {
        self.check_resolved()?;
        let def = &self.definition;

        let mut manifest = ManifestSchema {
            metadata: MetadataSchema::default(),
            settings: SettingsSchema {
                function_runtime: def.hosting.function_runtime(),
                ..Default::default()
            },
            app_directory: None,
            display_information: DisplayInformationSchema {
                name: def.name.clone(),
                description: def.description.clone(),
                background_color: def.background_color.clone(),
                long_description: def.long_description.clone(),
            },
            icon: def.icon.clone(),
            oauth_config: OauthConfigSchema {
                scopes: ScopesSchema {
                    bot: self.bot_scopes(),
                    user: None,
                },
                ..Default::default()
            },
            features: FeaturesSchema {
                bot_user: BotUserSchema {
                    display_name: def.bot_display_name().to_string(),
                    always_online: None,
                },
                app_home: resolve_app_home(def.hosting.app_home()),
                shortcuts: None,
                slash_commands: None,
                unfurl_domains: None,
                workflow_steps: None,
            },
            functions: self.functions.as_ref().map(|functions| {
                functions
                    .iter()
                    .map(|function| (function.id().to_string(), function.export()))
                    .collect()
            }),
            workflows: def.workflows.as_ref().map(|workflows| {
                workflows
                    .iter()
                    .map(|workflow| (workflow.id().to_string(), workflow.export()))
                    .collect()
            }),
            outgoing_domains: None,
            types: self.types.as_ref().map(|types| {
                types
                    .iter()
                    .map(|custom_type| (custom_type.id().to_string(), custom_type.export()))
                    .collect()
            }),
            datastores: def.datastores.as_ref().map(|datastores| {
                datastores
                    .iter()
                    .map(|datastore| (datastore.id().to_string(), datastore.export()))
                    .collect()
            }),
        };

        match &def.hosting {
            Hosting::Hosted(options) => {
                manifest.outgoing_domains = Some(options.outgoing_domains.clone().unwrap_or_default());
            }
            Hosting::Remote(options) => assign_remote_properties(&mut manifest, options),
        }

        info!(
            "Assembled manifest for '{}': {} functions, {} workflows, {} types, {} datastores",
            def.name,
            manifest.functions.as_ref().map_or(0, |m| m.len()),
            manifest.workflows.as_ref().map_or(0, |m| m.len()),
            manifest.types.as_ref().map_or(0, |m| m.len()),
            manifest.datastores.as_ref().map_or(0, |m| m.len()),
        );

        Ok(manifest)
    }

    /// Declared bot scopes plus the datastore scopes when any datastore is declared
    fn bot_scopes(&self) -> Vec<String> {
        let mut scopes = self.definition.bot_scopes.clone();

        let has_datastores = self
            .definition
            .datastores
            .as_ref()
            .is_some_and(|datastores| !datastores.is_empty());
        if has_datastores {
            for scope in DATASTORE_SCOPES {
                if !scopes.iter().any(|s| s == scope) {
                    scopes.push(scope.to_string());
                }
            }
        }

        scopes
    }
}

fn resolve_app_home(overrides: Option<&AppHomeOverride>) -> AppHomeSchema {
    let defaults = AppHomeSchema::default();
    let Some(overrides) = overrides else {
        return defaults;
    };

    AppHomeSchema {
        home_tab_enabled: overrides.home_tab_enabled,
        messages_tab_enabled: merge(defaults.messages_tab_enabled, overrides.messages_tab_enabled),
        messages_tab_read_only_enabled: merge(
            defaults.messages_tab_read_only_enabled,
            overrides.messages_tab_read_only_enabled,
        ),
    }
}

//! User-defined custom types
//!
//! A custom type is identified either by `name` (enum and primitive aliases) or by
//! `callback_id` (structured object types). In the manifest it appears once under
//! `types`, keyed by that identifier, and everywhere else as `#/types/<id>`.

use crate::errors::ManifestError;
use crate::parameters::{ParameterDefinition, ParameterSet, TypeRef, TYPE_REFERENCE_PREFIX};
use crate::registry::ManifestRegistry;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// How a custom type declaration identifies itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeIdentity {
    Name(String),
    CallbackId(String),
}

impl TypeIdentity {
    pub fn as_str(&self) -> &str {
        match self {
            TypeIdentity::Name(id) | TypeIdentity::CallbackId(id) => id,
        }
    }
}

/// Structural shape of a declaration, which decides what it can reference
#[derive(Debug, Clone, Copy)]
pub enum TypeShape<'a> {
    /// Array type; references its item type
    List(&'a ParameterDefinition),
    /// Object type; references its property types
    Object(&'a ParameterSet),
    /// Alias of another type
    Scalar(&'a TypeRef),
}

/// A custom type declaration
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "CustomTypeDeclaration")]
pub struct CustomType {
    identity: TypeIdentity,
    definition: ParameterDefinition,
}

impl CustomType {
    pub fn new(identity: TypeIdentity, definition: ParameterDefinition) -> Self {
        CustomType {
            identity,
            definition,
        }
    }

    /// Declare an enum or alias type identified by `name`
    pub fn named(name: impl Into<String>, definition: ParameterDefinition) -> Self {
        Self::new(TypeIdentity::Name(name.into()), definition)
    }

    /// Declare a structured type identified by `callback_id`
    pub fn with_callback_id(callback_id: impl Into<String>, definition: ParameterDefinition) -> Self {
        Self::new(TypeIdentity::CallbackId(callback_id.into()), definition)
    }

    pub fn id(&self) -> &str {
        self.identity.as_str()
    }

    pub fn identity(&self) -> &TypeIdentity {
        &self.identity
    }

    pub fn definition(&self) -> &ParameterDefinition {
        &self.definition
    }

    pub fn title(&self) -> Option<&str> {
        self.definition.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.definition.description.as_deref()
    }

    pub fn shape(&self) -> TypeShape<'_> {
        match (&self.definition.items, &self.definition.properties) {
            (Some(items), _) => TypeShape::List(items),
            (None, Some(properties)) => TypeShape::Object(properties),
            (None, None) => TypeShape::Scalar(&self.definition.param_type),
        }
    }

    pub fn register_parameter_types(&self, registry: &mut ManifestRegistry) {
        match self.shape() {
            TypeShape::List(items) => {
                if let Some(reference) = items.param_type.as_custom() {
                    registry.register_type(reference);
                }
            }
            TypeShape::Object(properties) => registry.register_types(properties),
            TypeShape::Scalar(param_type) => {
                if let Some(reference) = param_type.as_custom() {
                    registry.register_type(reference);
                }
            }
        }
    }

    /// The declaration without its identifier, which the manifest uses as the map key
    pub fn export(&self) -> ParameterDefinition {
        self.definition.clone()
    }
}

impl fmt::Display for CustomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", TYPE_REFERENCE_PREFIX, self.id())
    }
}

impl Serialize for CustomType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// On-disk form of a custom type: the definition plus exactly one identifier
#[derive(Deserialize)]
struct CustomTypeDeclaration {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    callback_id: Option<String>,
    #[serde(flatten)]
    definition: ParameterDefinition,
}

impl TryFrom<CustomTypeDeclaration> for CustomType {
    type Error = ManifestError;

    fn try_from(declaration: CustomTypeDeclaration) -> Result<Self, Self::Error> {
        let identity = match (declaration.name, declaration.callback_id) {
            (Some(name), None) => TypeIdentity::Name(name),
            (None, Some(callback_id)) => TypeIdentity::CallbackId(callback_id),
            (Some(name), Some(_)) => return Err(ManifestError::ConflictingTypeIdentity(name)),
            (None, None) => {
                return Err(ManifestError::InvalidDefinition(
                    "custom type requires either `name` or `callback_id`".to_string(),
                ))
            }
        };

        Ok(CustomType::new(identity, declaration.definition))
    }
}

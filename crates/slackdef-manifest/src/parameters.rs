//! Parameter and type-reference model shared by functions, workflows, datastores and
//! custom types.
//!
//! A parameter's `type` is either a primitive tag (`"string"`, `"slack#/types/user_id"`)
//! or a reference to a [`CustomType`]. References serialize as `#/types/<id>`; any
//! reference found on a parameter is reported to the registry so the referenced type
//! ends up in the manifest's `types` section.

use crate::custom_type::CustomType;
use crate::errors::ManifestError;
use crate::registry::ManifestRegistry;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

/// Prefix used when a custom type is rendered as a reference string
pub const TYPE_REFERENCE_PREFIX: &str = "#/types/";

/// Named parameters, keyed by parameter name, in declaration order
pub type ParameterSet = IndexMap<String, ParameterDefinition>;

// =============================================================================
// CUSTOM TYPE REFERENCE
// =============================================================================

#[derive(Clone)]
enum RefTarget {
    /// Holds the referenced type alive
    Owned(Arc<CustomType>),
    /// Bound after construction; never keeps the target alive
    Deferred(Arc<OnceLock<Weak<CustomType>>>),
}

/// Reference from a parameter to a [`CustomType`].
///
/// Owning references are the common case. Deferred references carry only the
/// identifier until [`CustomTypeRef::bind`] is called, which is how mutually
/// referencing types are declared without an `Arc` cycle.
#[derive(Clone)]
pub struct CustomTypeRef {
    id: String,
    target: RefTarget,
}

impl CustomTypeRef {
    pub fn new(custom_type: Arc<CustomType>) -> Self {
        CustomTypeRef {
            id: custom_type.id().to_string(),
            target: RefTarget::Owned(custom_type),
        }
    }

    /// Reference a type by identifier, to be bound later
    pub fn deferred(id: impl Into<String>) -> Self {
        CustomTypeRef {
            id: id.into(),
            target: RefTarget::Deferred(Arc::new(OnceLock::new())),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self.target, RefTarget::Deferred(_))
    }

    pub fn is_bound(&self) -> bool {
        match &self.target {
            RefTarget::Owned(_) => true,
            RefTarget::Deferred(slot) => slot.get().is_some(),
        }
    }

    /// Bind a deferred reference to its target. Clones of this reference share the
    /// binding.
    pub fn bind(&self, custom_type: &Arc<CustomType>) -> Result<(), ManifestError> {
        if custom_type.id() != self.id {
            return Err(ManifestError::TypeReferenceMismatch {
                expected: self.id.clone(),
                found: custom_type.id().to_string(),
            });
        }

        match &self.target {
            RefTarget::Owned(_) => Err(ManifestError::TypeReferenceAlreadyBound(self.id.clone())),
            RefTarget::Deferred(slot) => slot
                .set(Arc::downgrade(custom_type))
                .map_err(|_| ManifestError::TypeReferenceAlreadyBound(self.id.clone())),
        }
    }

    /// The referenced type, if it is bound and still alive
    pub fn resolve(&self) -> Option<Arc<CustomType>> {
        match &self.target {
            RefTarget::Owned(custom_type) => Some(Arc::clone(custom_type)),
            RefTarget::Deferred(slot) => slot.get().and_then(Weak::upgrade),
        }
    }
}

impl From<Arc<CustomType>> for CustomTypeRef {
    fn from(custom_type: Arc<CustomType>) -> Self {
        CustomTypeRef::new(custom_type)
    }
}

impl From<&Arc<CustomType>> for CustomTypeRef {
    fn from(custom_type: &Arc<CustomType>) -> Self {
        CustomTypeRef::new(Arc::clone(custom_type))
    }
}

impl fmt::Display for CustomTypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", TYPE_REFERENCE_PREFIX, self.id)
    }
}

// Only the identifier: following the target could recurse through a type cycle.
impl fmt::Debug for CustomTypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomTypeRef")
            .field("id", &self.id)
            .field("bound", &self.is_bound())
            .finish()
    }
}

// =============================================================================
// TYPE REF
// =============================================================================

/// Value of a parameter's `type` field
#[derive(Debug, Clone)]
pub enum TypeRef {
    Primitive(String),
    Custom(CustomTypeRef),
}

impl TypeRef {
    pub fn primitive(tag: impl Into<String>) -> Self {
        TypeRef::Primitive(tag.into())
    }

    pub fn as_custom(&self) -> Option<&CustomTypeRef> {
        match self {
            TypeRef::Custom(reference) => Some(reference),
            TypeRef::Primitive(_) => None,
        }
    }
}

impl From<&str> for TypeRef {
    fn from(tag: &str) -> Self {
        TypeRef::Primitive(tag.to_string())
    }
}

impl From<String> for TypeRef {
    fn from(tag: String) -> Self {
        TypeRef::Primitive(tag)
    }
}

impl From<CustomTypeRef> for TypeRef {
    fn from(reference: CustomTypeRef) -> Self {
        TypeRef::Custom(reference)
    }
}

impl From<Arc<CustomType>> for TypeRef {
    fn from(custom_type: Arc<CustomType>) -> Self {
        TypeRef::Custom(CustomTypeRef::new(custom_type))
    }
}

impl From<&Arc<CustomType>> for TypeRef {
    fn from(custom_type: &Arc<CustomType>) -> Self {
        TypeRef::Custom(CustomTypeRef::from(custom_type))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(tag) => f.write_str(tag),
            TypeRef::Custom(reference) => reference.fmt(f),
        }
    }
}

impl Serialize for TypeRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// `#/types/<id>` becomes an unbound deferred reference; anything else is a primitive tag
impl<'de> Deserialize<'de> for TypeRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.strip_prefix(TYPE_REFERENCE_PREFIX) {
            Some(id) if !id.is_empty() => TypeRef::Custom(CustomTypeRef::deferred(id)),
            _ => TypeRef::Primitive(raw),
        })
    }
}

// =============================================================================
// PARAMETER DEFINITION
// =============================================================================

/// A single parameter, property, attribute, or custom type body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterDefinition {
    #[serde(rename = "type")]
    pub param_type: TypeRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Value>>,
    /// For array types - the item definition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ParameterDefinition>>,
    /// For object types - nested properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<ParameterSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<bool>,
    /// Keys this model does not know about, passed through untouched
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl ParameterDefinition {
    pub fn new(param_type: impl Into<TypeRef>) -> Self {
        ParameterDefinition {
            param_type: param_type.into(),
            title: None,
            description: None,
            hint: None,
            default: None,
            enum_values: None,
            choices: None,
            items: None,
            properties: None,
            required: None,
            additional_properties: None,
            extra: IndexMap::new(),
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

    pub fn with_items(mut self, items: ParameterDefinition) -> Self {
        self.items = Some(Box::new(items));
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, property: ParameterDefinition) -> Self {
        self.properties
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), property);
        self
    }

    pub fn with_required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Every custom type reference in this definition, including those nested in
    /// `items` and `properties`
    pub fn type_refs(&self) -> Vec<&CustomTypeRef> {
        let mut refs = Vec::new();
        self.collect_type_refs(&mut refs);
        refs
    }

    fn collect_type_refs<'a>(&'a self, refs: &mut Vec<&'a CustomTypeRef>) {
        if let Some(reference) = self.param_type.as_custom() {
            refs.push(reference);
        }
        if let Some(items) = &self.items {
            items.collect_type_refs(refs);
        }
        if let Some(properties) = &self.properties {
            for property in properties.values() {
                property.collect_type_refs(refs);
            }
        }
    }
}

// =============================================================================
// PARAMETER SET DEFINITION
// =============================================================================

/// Input or output parameters of a function or workflow
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParameterSetDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(default)]
    pub properties: ParameterSet,
}

impl ParameterSetDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_property(mut self, name: impl Into<String>, property: ParameterDefinition) -> Self {
        self.properties.insert(name.into(), property);
        self
    }

    pub fn with_required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Report every custom type used directly by these parameters
    pub fn register_types(&self, registry: &mut ManifestRegistry) {
        registry.register_types(&self.properties);
    }

    pub fn type_refs(&self) -> Vec<&CustomTypeRef> {
        self.properties
            .values()
            .flat_map(ParameterDefinition::type_refs)
            .collect()
    }
}

use crate::parameters::ParameterSet;
use crate::registry::ManifestRegistry;
use crate::types::DatastoreSchema;
use serde::Deserialize;

/// A datastore declaration: a primary key plus typed attributes
#[derive(Debug, Clone, Deserialize)]
pub struct Datastore {
    pub name: String,
    pub primary_key: String,
    #[serde(default)]
    pub attributes: ParameterSet,
}

impl Datastore {
    pub fn new(name: impl Into<String>, primary_key: impl Into<String>, attributes: ParameterSet) -> Self {
        Datastore {
            name: name.into(),
            primary_key: primary_key.into(),
            attributes,
        }
    }

    pub fn id(&self) -> &str {
        &self.name
    }

    pub fn register_attribute_types(&self, registry: &mut ManifestRegistry) {
        registry.register_types(&self.attributes);
    }

    pub fn export(&self) -> DatastoreSchema {
        DatastoreSchema {
            primary_key: self.primary_key.clone(),
            attributes: self.attributes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ParameterDefinition;

    #[test]
    fn test_export_is_key_and_attributes() {
        let mut attributes = ParameterSet::new();
        attributes.insert("id".to_string(), ParameterDefinition::new("string"));
        attributes.insert("count".to_string(), ParameterDefinition::new("integer"));
        let datastore = Datastore::new("tallies", "id", attributes);

        assert_eq!(datastore.id(), "tallies");
        assert_eq!(
            serde_json::to_value(datastore.export()).ok(),
            Some(serde_json::json!({
                "primary_key": "id",
                "attributes": {
                    "count": {"type": "integer"},
                    "id": {"type": "string"}
                }
            }))
        );
    }
}

//! Ontology data model.
//!
//! Plain data with serde derives, so an ontology can be written to and read
//! back from JSON as well as derived from a schema. JSON field names are
//! camelCase (`eType`, `rType`, `ePairs`, `sideAType`, ...).

use serde::{Deserialize, Serialize};

/// Id field assumed for entity types that declare none.
pub const DEFAULT_ID_FIELD: &str = "id";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ontology {
    pub name: String,
    #[serde(default)]
    pub entity_types: Vec<EntityType>,
    #[serde(default)]
    pub relationship_types: Vec<RelationshipType>,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub enumerated_types: Vec<EnumeratedType>,
    #[serde(default)]
    pub primitive_types: Vec<String>,
}

impl Ontology {
    pub fn new(name: impl Into<String>) -> Self {
        Ontology {
            name: name.into(),
            ..Ontology::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityType {
    pub e_type: String,
    pub name: String,
    #[serde(default)]
    pub properties: Vec<String>,
    #[serde(default)]
    pub id_fields: Vec<String>,
    #[serde(default)]
    pub display: Vec<String>,
    #[serde(default)]
    pub mandatory: Vec<String>,
    #[serde(default)]
    pub parent_types: Vec<String>,
    #[serde(default)]
    pub is_abstract: bool,
}

impl EntityType {
    /// An entity type whose name and `e_type` are both `name`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        EntityType {
            e_type: name.clone(),
            name,
            ..EntityType::default()
        }
    }

    #[must_use]
    pub fn with_properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties.extend(properties.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_fields.push(field.into());
        self
    }

    /// The primary id field.
    pub fn id_field(&self) -> &str {
        self.id_fields
            .first()
            .map_or(DEFAULT_ID_FIELD, String::as_str)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.iter().any(|p| p == name)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipType {
    pub name: String,
    pub r_type: String,
    #[serde(default)]
    pub directional: bool,
    #[serde(default)]
    pub e_pairs: Vec<EPair>,
    #[serde(default)]
    pub properties: Vec<String>,
}

impl RelationshipType {
    /// The pair whose side A is `e_type`.
    pub fn pair_from(&self, e_type: &str) -> Option<&EPair> {
        self.e_pairs.iter().find(|p| p.side_a_type == e_type)
    }

    /// The pair whose side B is `e_type`.
    pub fn pair_to(&self, e_type: &str) -> Option<&EPair> {
        self.e_pairs.iter().find(|p| p.side_b_type == e_type)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationReferenceType {
    #[default]
    OneToOne,
    OneToMany,
    ManyToMany,
}

/// One (side A, side B) entity pairing of a relationship.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EPair {
    pub name: String,
    #[serde(default)]
    pub reference_type: RelationReferenceType,
    pub side_a_type: String,
    /// Field on side A that holds the relation.
    #[serde(default)]
    pub side_a_field: String,
    #[serde(default)]
    pub side_a_id: String,
    pub side_b_type: String,
    #[serde(default)]
    pub side_b_id: String,
}

impl EPair {
    /// Name used when no `@relation(name:)` is given: `A->B`.
    pub fn default_name(side_a: &str, side_b: &str) -> String {
        format!("{side_a}->{side_b}")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub name: String,
    pub p_type: String,
    /// Primitive name (`string`, `int`, ...), enum name, or `[T]` for lists.
    #[serde(rename = "type")]
    pub ty: String,
}

impl Property {
    /// A property whose `p_type` equals its name.
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        let name = name.into();
        Property {
            p_type: name.clone(),
            name,
            ty: ty.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumeratedType {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;

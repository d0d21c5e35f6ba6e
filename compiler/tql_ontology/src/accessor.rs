//! Indexed, read-only access to an [`Ontology`].

use rustc_hash::FxHashMap;

use crate::model::{EntityType, EnumeratedType, Ontology, Property, RelationshipType};

/// Name indexes over an owned ontology. Lookups are by name; the first
/// element wins when names repeat.
#[derive(Clone, Debug)]
pub struct Accessor {
    ontology: Ontology,
    entities: FxHashMap<String, usize>,
    relations: FxHashMap<String, usize>,
    relations_by_type: FxHashMap<String, usize>,
    properties: FxHashMap<String, usize>,
    enums: FxHashMap<String, usize>,
}

fn index<T>(items: &[T], key: impl Fn(&T) -> &str) -> FxHashMap<String, usize> {
    let mut map = FxHashMap::default();
    for (i, item) in items.iter().enumerate() {
        map.entry(key(item).to_owned()).or_insert(i);
    }
    map
}

impl Accessor {
    pub fn new(ontology: Ontology) -> Self {
        Accessor {
            entities: index(&ontology.entity_types, |e| e.name.as_str()),
            relations: index(&ontology.relationship_types, |r| r.name.as_str()),
            relations_by_type: index(&ontology.relationship_types, |r| r.r_type.as_str()),
            properties: index(&ontology.properties, |p| p.name.as_str()),
            enums: index(&ontology.enumerated_types, |e| e.name.as_str()),
            ontology,
        }
    }

    pub fn ontology(&self) -> &Ontology {
        &self.ontology
    }

    pub fn into_ontology(self) -> Ontology {
        self.ontology
    }

    pub fn name(&self) -> &str {
        &self.ontology.name
    }

    pub fn entity(&self, name: &str) -> Option<&EntityType> {
        self.entities
            .get(name)
            .map(|&i| &self.ontology.entity_types[i])
    }

    pub fn relation(&self, name: &str) -> Option<&RelationshipType> {
        self.relations
            .get(name)
            .map(|&i| &self.ontology.relationship_types[i])
    }

    pub fn relation_by_type(&self, r_type: &str) -> Option<&RelationshipType> {
        self.relations_by_type
            .get(r_type)
            .map(|&i| &self.ontology.relationship_types[i])
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties
            .get(name)
            .map(|&i| &self.ontology.properties[i])
    }

    pub fn enumerated_type(&self, name: &str) -> Option<&EnumeratedType> {
        self.enums
            .get(name)
            .map(|&i| &self.ontology.enumerated_types[i])
    }

    pub fn enum_values(&self, name: &str) -> Option<&[String]> {
        self.enumerated_type(name).map(|e| e.values.as_slice())
    }

    /// Relationships with a pair whose side A is `e_type`.
    pub fn relations_from<'a>(
        &'a self,
        e_type: &'a str,
    ) -> impl Iterator<Item = &'a RelationshipType> + 'a {
        self.relations()
            .filter(move |r| r.pair_from(e_type).is_some())
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityType> {
        self.ontology.entity_types.iter()
    }

    pub fn relations(&self) -> impl Iterator<Item = &RelationshipType> {
        self.ontology.relationship_types.iter()
    }

    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.ontology.properties.iter()
    }
}

impl From<Ontology> for Accessor {
    fn from(ontology: Ontology) -> Self {
        Accessor::new(ontology)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]

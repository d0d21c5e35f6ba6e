//! Ontology for TQL.
//!
//! An ontology names the entity types, relationship types and properties a
//! query can traverse. The translator consults it for every field: which
//! entity a type is, which relationship a field follows, which property type
//! a scalar field has.
//!
//! Ontologies are usually derived from the same GraphQL schema the queries
//! are written against ([`derive_ontology`]), but can also be loaded from
//! JSON since the model is plain serde data.

mod accessor;
mod derive;
mod model;

pub use accessor::Accessor;
pub use derive::{derive_ontology, OntologyError, BUILTIN_PRIMITIVES};
pub use model::{
    EPair, EntityType, EnumeratedType, Ontology, Property, RelationReferenceType,
    RelationshipType, DEFAULT_ID_FIELD,
};

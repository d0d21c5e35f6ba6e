//! Ontology derivation from a compiled GraphQL schema.
//!
//! Derivation runs a fixed list of passes over one accumulating context.
//! Each pass reads the schema and fills in one section of
//! the ontology; later passes rely on what earlier ones recorded (relations
//! need the entity types, entity types need the interfaces).
//!
//! Mapping:
//!
//! | Schema                        | Ontology                                    |
//! |-------------------------------|---------------------------------------------|
//! | object type                   | entity type                                 |
//! | interface                     | abstract entity type, parent of implementors|
//! | scalar / enum field           | property (`[t]` for lists)                  |
//! | field typed by an entity      | relationship named after the field          |
//! | enum                          | enumerated type                             |
//! | custom scalar                 | primitive type                              |
//!
//! Root operation types, the where-clause prelude, introspection types and
//! types marked `@autoGen` are not part of the domain and are skipped.

use tql_graphql::ast::{find_directive, TypeRef, Value};
use tql_graphql::prelude::{is_prelude_type, PRELUDE_TYPES};
use tql_graphql::{FieldDef, OperationKind, Schema, TypeDef, TypeKind};

use crate::model::{
    EPair, EntityType, EnumeratedType, Ontology, Property, RelationReferenceType,
    RelationshipType,
};

/// Primitive types every ontology knows.
pub const BUILTIN_PRIMITIVES: [&str; 13] = [
    "id", "boolean", "int", "long", "string", "text", "float", "time", "date", "datetime", "ip",
    "geopoint", "json",
];

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OntologyError {
    /// The schema lacks types the query language depends on.
    #[error("schema does not declare the query language types: missing {}", .0.join(", "))]
    MissingLanguageTypes(Vec<String>),
}

/// Accumulated state shared by the passes.
#[derive(Debug, Default)]
struct Derivation {
    /// Object and interface types that take part in the domain.
    domain_types: Vec<String>,
    /// Leaf-field properties in first-seen order.
    properties: Vec<Property>,
    ontology: Ontology,
}

type Pass = fn(&Schema, &mut Derivation);

const PASSES: [(&str, Pass); 7] = [
    ("domain types", collect_domain_types),
    ("primitives", collect_primitives),
    ("interfaces", collect_interfaces),
    ("entities", collect_entities),
    ("relations", collect_relations),
    ("properties", collect_properties),
    ("enums", collect_enums),
];

/// Derive the ontology named `name` from `schema`.
///
/// # Errors
///
/// Fails when the schema does not declare the where-clause prelude and a
/// query root.
pub fn derive_ontology(name: &str, schema: &Schema) -> Result<Ontology, OntologyError> {
    check_language_types(schema)?;

    let mut derivation = Derivation {
        ontology: Ontology::new(name),
        ..Derivation::default()
    };
    for (label, pass) in PASSES {
        pass(schema, &mut derivation);
        tracing::trace!(pass = label, "ontology pass done");
    }

    let ontology = derivation.ontology;
    tracing::debug!(
        ontology = %ontology.name,
        entities = ontology.entity_types.len(),
        relations = ontology.relationship_types.len(),
        properties = ontology.properties.len(),
        "ontology derived"
    );
    Ok(ontology)
}

fn check_language_types(schema: &Schema) -> Result<(), OntologyError> {
    let mut missing: Vec<String> = PRELUDE_TYPES
        .iter()
        .filter(|name| schema.get(name).is_none())
        .map(|name| (*name).to_owned())
        .collect();
    if schema.root_type(OperationKind::Query).is_none() {
        missing.push(schema.query_type_name().to_owned());
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(OntologyError::MissingLanguageTypes(missing))
    }
}

/// Whether `ty` belongs to the domain rather than to the language.
fn is_domain_type(schema: &Schema, ty: &TypeDef) -> bool {
    !ty.name.starts_with("__")
        && !is_prelude_type(&ty.name)
        && !schema.is_root_type(&ty.name)
        && find_directive(&ty.directives, "autoGen").is_none()
}

fn domain_types<'s>(schema: &'s Schema, kind: TypeKind) -> impl Iterator<Item = &'s TypeDef> {
    schema
        .types()
        .filter(move |t| t.kind() == kind && is_domain_type(schema, t))
}

// ── Passes ──────────────────────────────────────────────────────────

fn collect_domain_types(schema: &Schema, derivation: &mut Derivation) {
    derivation.domain_types = schema
        .types()
        .filter(|t| t.kind().is_composite() && is_domain_type(schema, t))
        .map(|t| t.name.clone())
        .collect();
}

fn collect_primitives(schema: &Schema, derivation: &mut Derivation) {
    let primitives = &mut derivation.ontology.primitive_types;
    primitives.extend(BUILTIN_PRIMITIVES.iter().map(|p| (*p).to_owned()));
    for scalar in schema.types().filter(|t| t.kind() == TypeKind::Scalar) {
        let name = scalar.name.to_lowercase();
        if !primitives.contains(&name) {
            primitives.push(name);
        }
    }
}

fn collect_interfaces(schema: &Schema, derivation: &mut Derivation) {
    for interface in domain_types(schema, TypeKind::Interface) {
        let mut entity = entity_for(schema, interface, derivation);
        entity.is_abstract = true;
        derivation.ontology.entity_types.push(entity);
    }
}

fn collect_entities(schema: &Schema, derivation: &mut Derivation) {
    for object in domain_types(schema, TypeKind::Object) {
        let mut entity = entity_for(schema, object, derivation);
        if let Some(id) = object.fields().iter().find(|f| is_id_field(&f.ty)) {
            entity.id_fields.push(id.name.clone());
        }
        entity.parent_types = object
            .interfaces()
            .iter()
            .filter(|i| {
                derivation
                    .ontology
                    .entity_types
                    .iter()
                    .any(|e| e.name == **i)
            })
            .cloned()
            .collect();
        derivation.ontology.entity_types.push(entity);
    }
}

/// One relationship per distinct field name; every declaring object type
/// contributes a pair.
fn collect_relations(schema: &Schema, derivation: &mut Derivation) {
    let mut relations: Vec<RelationshipType> = Vec::new();
    for object in domain_types(schema, TypeKind::Object) {
        for field in object.fields() {
            let target = field.ty.named_type();
            if !derivation.domain_types.iter().any(|t| t == target) {
                continue;
            }
            let pair = pair_for(object, field, &derivation.ontology);
            let r_type = relation_type(target);
            match relations.iter_mut().find(|r| r.name == field.name) {
                Some(existing) => {
                    if existing.r_type != r_type {
                        tracing::warn!(
                            relation = %field.name,
                            kept = %existing.r_type,
                            ignored = %r_type,
                            "relation declared with different targets; keeping the first"
                        );
                    }
                    existing.e_pairs.push(pair);
                }
                None => relations.push(RelationshipType {
                    name: field.name.clone(),
                    r_type,
                    directional: true,
                    e_pairs: vec![pair],
                    properties: Vec::new(),
                }),
            }
        }
    }
    derivation.ontology.relationship_types = relations;
}

fn collect_properties(_schema: &Schema, derivation: &mut Derivation) {
    derivation.ontology.properties = std::mem::take(&mut derivation.properties);
}

fn collect_enums(schema: &Schema, derivation: &mut Derivation) {
    derivation.ontology.enumerated_types = domain_types(schema, TypeKind::Enum)
        .map(|e| EnumeratedType {
            name: e.name.clone(),
            values: e.enum_values().to_vec(),
        })
        .collect();
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Entity type for an object or interface, registering its leaf fields as
/// properties.
fn entity_for(schema: &Schema, ty: &TypeDef, derivation: &mut Derivation) -> EntityType {
    let mut entity = EntityType::new(&ty.name);
    for field in ty.fields() {
        if !schema.kind_of(&field.ty).is_some_and(TypeKind::is_leaf) {
            continue;
        }
        entity.properties.push(field.name.clone());
        if field.ty.is_non_null() {
            entity.mandatory.push(field.name.clone());
        }
        register_property(derivation, Property::new(&field.name, property_type(schema, &field.ty)));
    }
    entity
}

fn register_property(derivation: &mut Derivation, property: Property) {
    match derivation.properties.iter().find(|p| p.name == property.name) {
        Some(existing) if existing.ty != property.ty => {
            tracing::warn!(
                property = %property.name,
                kept = %existing.ty,
                ignored = %property.ty,
                "property declared with different types; keeping the first"
            );
        }
        Some(_) => {}
        None => derivation.properties.push(property),
    }
}

/// `string`, `int`, ... for scalars, the enum name for enums, `[t]` for lists.
fn property_type(schema: &Schema, ty: &TypeRef) -> String {
    match ty {
        TypeRef::NonNull(inner) => property_type(schema, inner),
        TypeRef::List(inner) => format!("[{}]", property_type(schema, inner)),
        TypeRef::Named(name) => {
            if schema.get(name).map(TypeDef::kind) == Some(TypeKind::Enum) {
                name.clone()
            } else {
                name.to_lowercase()
            }
        }
    }
}

fn is_id_field(ty: &TypeRef) -> bool {
    match ty {
        TypeRef::NonNull(inner) => is_id_field(inner),
        TypeRef::Named(name) => name == "ID",
        TypeRef::List(_) => false,
    }
}

fn relation_type(target: &str) -> String {
    const HAS: &str = "has_";
    if target.starts_with(HAS) {
        target.to_owned()
    } else {
        format!("{HAS}{target}")
    }
}

fn pair_for(object: &TypeDef, field: &FieldDef, ontology: &Ontology) -> EPair {
    let target = field.ty.named_type();
    let id_of = |name: &str| {
        ontology
            .entity_types
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.id_field().to_owned())
            .unwrap_or_default()
    };
    let name = find_directive(&field.directives, "relation")
        .and_then(|d| d.argument("name"))
        .and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            _ => None,
        })
        .unwrap_or_else(|| EPair::default_name(&object.name, target));
    // Many-to-many needs both sides inspected and is never inferred here.
    let reference_type = if field.ty.is_list() {
        RelationReferenceType::OneToMany
    } else {
        RelationReferenceType::OneToOne
    };
    EPair {
        name,
        reference_type,
        side_a_type: object.name.clone(),
        side_a_field: field.name.clone(),
        side_a_id: id_of(&object.name),
        side_b_type: target.to_owned(),
        side_b_id: id_of(target),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]

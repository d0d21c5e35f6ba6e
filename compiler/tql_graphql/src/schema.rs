//! Compiled GraphQL schema.
//!
//! [`Schema::compile`] merges one or more SDL sources into a checked,
//! indexed set of type definitions. A compiled schema is immutable; share it
//! behind an `Arc` to serve concurrent requests.

use rustc_hash::FxHashMap;

use crate::ast::{
    Definition, Directive, FieldDefinition, InputValueDefinition, OperationKind, TypeDefinition,
    TypeDefinitionKind, TypeRef, Value,
};
use crate::lexer::SyntaxError;
use crate::parser::parse_document;
use crate::prelude::WHERE_PRELUDE;

/// Scalars every schema has.
pub const BUILTIN_SCALARS: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Enum,
    InputObject,
}

impl TypeKind {
    /// Objects and interfaces: types with selectable fields.
    pub fn is_composite(self) -> bool {
        matches!(self, TypeKind::Object | TypeKind::Interface)
    }

    /// Scalars and enums: types selected without sub-fields.
    pub fn is_leaf(self) -> bool {
        matches!(self, TypeKind::Scalar | TypeKind::Enum)
    }

    /// Types allowed for arguments and variables.
    pub fn is_input(self) -> bool {
        matches!(self, TypeKind::Scalar | TypeKind::Enum | TypeKind::InputObject)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub args: Vec<InputValue>,
    pub ty: TypeRef,
    pub directives: Vec<Directive>,
}

impl FieldDef {
    pub fn arg(&self, name: &str) -> Option<&InputValue> {
        self.args.iter().find(|a| a.name == name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct InputValue {
    pub name: String,
    pub ty: TypeRef,
    pub default: Option<Value>,
}

impl InputValue {
    /// Non-null without a default: the caller must supply it.
    pub fn is_required(&self) -> bool {
        self.ty.is_non_null() && self.default.is_none()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypeBody {
    Scalar,
    Object {
        interfaces: Vec<String>,
        fields: Vec<FieldDef>,
    },
    Interface {
        interfaces: Vec<String>,
        fields: Vec<FieldDef>,
    },
    Enum {
        values: Vec<String>,
    },
    InputObject {
        fields: Vec<InputValue>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeDef {
    pub name: String,
    pub body: TypeBody,
    pub directives: Vec<Directive>,
}

impl TypeDef {
    pub fn kind(&self) -> TypeKind {
        match self.body {
            TypeBody::Scalar => TypeKind::Scalar,
            TypeBody::Object { .. } => TypeKind::Object,
            TypeBody::Interface { .. } => TypeKind::Interface,
            TypeBody::Enum { .. } => TypeKind::Enum,
            TypeBody::InputObject { .. } => TypeKind::InputObject,
        }
    }

    /// Output fields of an object or interface; empty otherwise.
    pub fn fields(&self) -> &[FieldDef] {
        match &self.body {
            TypeBody::Object { fields, .. } | TypeBody::Interface { fields, .. } => fields,
            _ => &[],
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields().iter().find(|f| f.name == name)
    }

    pub fn interfaces(&self) -> &[String] {
        match &self.body {
            TypeBody::Object { interfaces, .. } | TypeBody::Interface { interfaces, .. } => {
                interfaces
            }
            _ => &[],
        }
    }

    pub fn enum_values(&self) -> &[String] {
        match &self.body {
            TypeBody::Enum { values } => values,
            _ => &[],
        }
    }

    pub fn input_fields(&self) -> &[InputValue] {
        match &self.body {
            TypeBody::InputObject { fields } => fields,
            _ => &[],
        }
    }

    pub fn input_field(&self, name: &str) -> Option<&InputValue> {
        self.input_fields().iter().find(|f| f.name == name)
    }
}

/// Why a set of SDL sources did not compile.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("syntax error in schema source {source_index}: {error}")]
    Syntax {
        source_index: usize,
        #[source]
        error: SyntaxError,
    },
    #[error("schema source {0} contains an operation or fragment")]
    ExecutableDefinition(usize),
    #[error("type `{0}` is defined more than once")]
    DuplicateType(String),
    #[error("field `{field}` is defined more than once in `{ty}`")]
    DuplicateField { ty: String, field: String },
    #[error("cannot extend `{0}`: no such type")]
    ExtendsUnknown(String),
    #[error("cannot extend `{0}` with a definition of a different kind")]
    ExtensionKindMismatch(String),
    #[error("type `{referenced}` used in `{site}` is not defined")]
    UnknownType { site: String, referenced: String },
    #[error("`{ty}` implements `{interface}`, which is not an interface")]
    NotAnInterface { ty: String, interface: String },
    #[error("`{site}` must have an output type, found `{found}`")]
    NotAnOutputType { site: String, found: String },
    #[error("`{site}` must have an input type, found `{found}`")]
    NotAnInputType { site: String, found: String },
    #[error("schema has no query root type")]
    MissingQueryRoot,
}

/// A compiled, immutable GraphQL schema.
#[derive(Clone, Debug)]
pub struct Schema {
    types: Vec<TypeDef>,
    index: FxHashMap<String, usize>,
    roots: FxHashMap<OperationKind, String>,
}

impl Schema {
    /// Parse and merge SDL sources into a schema.
    pub fn compile<'s, I>(sources: I) -> Result<Schema, SchemaError>
    where
        I: IntoIterator<Item = &'s str>,
    {
        let mut builder = SchemaBuilder::default();
        for (source_index, source) in sources.into_iter().enumerate() {
            let document = parse_document(source)
                .map_err(|error| SchemaError::Syntax {
                    source_index,
                    error,
                })?;
            for definition in document.definitions {
                if definition.is_executable() {
                    return Err(SchemaError::ExecutableDefinition(source_index));
                }
                builder.add(definition)?;
            }
        }
        builder.finish()
    }

    /// [`Schema::compile`] with the where-clause prelude prepended.
    pub fn with_prelude<'s, I>(sources: I) -> Result<Schema, SchemaError>
    where
        I: IntoIterator<Item = &'s str>,
    {
        Schema::compile(std::iter::once(WHERE_PRELUDE).chain(sources))
    }

    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.index.get(name).map(|&i| &self.types[i])
    }

    /// All types in declaration order, built-in scalars first.
    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.iter()
    }

    /// Root type for an operation kind, if the schema declares one.
    pub fn root_type(&self, kind: OperationKind) -> Option<&TypeDef> {
        self.roots.get(&kind).and_then(|name| self.get(name))
    }

    pub fn query_type_name(&self) -> &str {
        self.roots
            .get(&OperationKind::Query)
            .map_or("Query", String::as_str)
    }

    /// Whether `name` is the root type of any operation.
    pub fn is_root_type(&self, name: &str) -> bool {
        self.roots.values().any(|root| root == name)
    }

    /// Kind of the named type behind any list / non-null wrappers.
    pub fn kind_of(&self, ty: &TypeRef) -> Option<TypeKind> {
        self.get(ty.named_type()).map(TypeDef::kind)
    }

    /// Object types implementing `interface`, in declaration order.
    pub fn implementations<'a>(&'a self, interface: &'a str) -> impl Iterator<Item = &'a TypeDef> {
        self.types.iter().filter(move |t| {
            t.kind() == TypeKind::Object && t.interfaces().iter().any(|i| i == interface)
        })
    }

    /// Whether a value of type `object` can appear where `condition` is
    /// expected (same type, or an interface it implements).
    pub fn applies(&self, condition: &str, object: &TypeDef) -> bool {
        condition == object.name || object.interfaces().iter().any(|i| i == condition)
    }
}

// ── Compilation ─────────────────────────────────────────────────────

#[derive(Default)]
struct SchemaBuilder {
    types: Vec<TypeDef>,
    index: FxHashMap<String, usize>,
    extensions: Vec<TypeDefinition>,
    roots: FxHashMap<OperationKind, String>,
}

impl SchemaBuilder {
    fn add(&mut self, definition: Definition) -> Result<(), SchemaError> {
        match definition {
            Definition::Schema(schema) => {
                self.roots.extend(schema.operation_types);
            }
            Definition::Type(ty) if ty.extension => self.extensions.push(ty),
            Definition::Type(ty) => {
                if self.index.contains_key(&ty.name) || BUILTIN_SCALARS.contains(&ty.name.as_str())
                {
                    return Err(SchemaError::DuplicateType(ty.name));
                }
                self.index.insert(ty.name.clone(), self.types.len());
                self.types.push(lower_type(ty));
            }
            // Directive declarations carry no semantics here; executable
            // definitions are rejected by the caller.
            Definition::Directive(_) | Definition::Operation(_) | Definition::Fragment(_) => {}
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Schema, SchemaError> {
        for extension in std::mem::take(&mut self.extensions) {
            self.apply_extension(extension)?;
        }

        let mut types: Vec<TypeDef> = BUILTIN_SCALARS
            .iter()
            .map(|name| TypeDef {
                name: (*name).to_owned(),
                body: TypeBody::Scalar,
                directives: Vec::new(),
            })
            .collect();
        types.extend(self.types);
        let index: FxHashMap<String, usize> = types
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.clone(), i))
            .collect();

        let mut roots = self.roots;
        for kind in [
            OperationKind::Query,
            OperationKind::Mutation,
            OperationKind::Subscription,
        ] {
            let conventional = match kind {
                OperationKind::Query => "Query",
                OperationKind::Mutation => "Mutation",
                OperationKind::Subscription => "Subscription",
            };
            if !roots.contains_key(&kind) && index.contains_key(conventional) {
                roots.insert(kind, conventional.to_owned());
            }
        }

        let schema = Schema {
            types,
            index,
            roots,
        };
        check(&schema)?;
        tracing::debug!(types = schema.types.len(), "schema compiled");
        Ok(schema)
    }

    fn apply_extension(&mut self, extension: TypeDefinition) -> Result<(), SchemaError> {
        let Some(&i) = self.index.get(&extension.name) else {
            return Err(SchemaError::ExtendsUnknown(extension.name));
        };
        let lowered = lower_type(extension);
        let target = &mut self.types[i];
        target.directives.extend(lowered.directives);
        match (&mut target.body, lowered.body) {
            (TypeBody::Scalar, TypeBody::Scalar) => {}
            (
                TypeBody::Object { interfaces, fields },
                TypeBody::Object {
                    interfaces: more_interfaces,
                    fields: more_fields,
                },
            )
            | (
                TypeBody::Interface { interfaces, fields },
                TypeBody::Interface {
                    interfaces: more_interfaces,
                    fields: more_fields,
                },
            ) => {
                interfaces.extend(more_interfaces);
                fields.extend(more_fields);
            }
            (TypeBody::Enum { values }, TypeBody::Enum { values: more }) => values.extend(more),
            (TypeBody::InputObject { fields }, TypeBody::InputObject { fields: more }) => {
                fields.extend(more);
            }
            _ => return Err(SchemaError::ExtensionKindMismatch(lowered.name)),
        }
        Ok(())
    }
}

fn lower_type(definition: TypeDefinition) -> TypeDef {
    let body = match definition.kind {
        TypeDefinitionKind::Scalar => TypeBody::Scalar,
        TypeDefinitionKind::Object { interfaces, fields } => TypeBody::Object {
            interfaces,
            fields: fields.into_iter().map(lower_field).collect(),
        },
        TypeDefinitionKind::Interface { interfaces, fields } => TypeBody::Interface {
            interfaces,
            fields: fields.into_iter().map(lower_field).collect(),
        },
        TypeDefinitionKind::Enum { values } => TypeBody::Enum { values },
        TypeDefinitionKind::InputObject { fields } => TypeBody::InputObject {
            fields: fields.into_iter().map(lower_input).collect(),
        },
    };
    TypeDef {
        name: definition.name,
        body,
        directives: definition.directives,
    }
}

fn lower_field(field: FieldDefinition) -> FieldDef {
    FieldDef {
        name: field.name,
        args: field.arguments.into_iter().map(lower_input).collect(),
        ty: field.ty,
        directives: field.directives,
    }
}

fn lower_input(value: InputValueDefinition) -> InputValue {
    InputValue {
        name: value.name,
        ty: value.ty,
        default: value.default,
    }
}

/// Reference and shape checks over the merged schema.
fn check(schema: &Schema) -> Result<(), SchemaError> {
    if schema.root_type(OperationKind::Query).is_none() {
        return Err(SchemaError::MissingQueryRoot);
    }
    for root in schema.roots.values() {
        match schema.get(root) {
            Some(t) if t.kind() == TypeKind::Object => {}
            Some(t) => {
                return Err(SchemaError::NotAnOutputType {
                    site: "schema".to_owned(),
                    found: t.name.clone(),
                });
            }
            None => {
                return Err(SchemaError::UnknownType {
                    site: "schema".to_owned(),
                    referenced: root.clone(),
                });
            }
        }
    }

    for ty in &schema.types {
        for interface in ty.interfaces() {
            match schema.get(interface) {
                Some(i) if i.kind() == TypeKind::Interface => {}
                Some(_) => {
                    return Err(SchemaError::NotAnInterface {
                        ty: ty.name.clone(),
                        interface: interface.clone(),
                    });
                }
                None => {
                    return Err(SchemaError::UnknownType {
                        site: ty.name.clone(),
                        referenced: interface.clone(),
                    });
                }
            }
        }

        let mut seen = rustc_hash::FxHashSet::default();
        for field in ty.fields() {
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    ty: ty.name.clone(),
                    field: field.name.clone(),
                });
            }
            let site = format!("{}.{}", ty.name, field.name);
            let kind = resolve(schema, &site, &field.ty)?;
            if kind == TypeKind::InputObject {
                return Err(SchemaError::NotAnOutputType {
                    site,
                    found: field.ty.to_string(),
                });
            }
            for arg in &field.args {
                check_input(schema, &format!("{site}({})", arg.name), arg)?;
            }
        }
        for input in ty.input_fields() {
            check_input(schema, &format!("{}.{}", ty.name, input.name), input)?;
        }
    }
    Ok(())
}

fn check_input(schema: &Schema, site: &str, value: &InputValue) -> Result<(), SchemaError> {
    if resolve(schema, site, &value.ty)?.is_input() {
        Ok(())
    } else {
        Err(SchemaError::NotAnInputType {
            site: site.to_owned(),
            found: value.ty.to_string(),
        })
    }
}

fn resolve(schema: &Schema, site: &str, ty: &TypeRef) -> Result<TypeKind, SchemaError> {
    schema.kind_of(ty).ok_or_else(|| SchemaError::UnknownType {
        site: site.to_owned(),
        referenced: ty.named_type().to_owned(),
    })
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]

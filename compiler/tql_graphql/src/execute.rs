//! Mock execution.
//!
//! The engine walks the selected operation depth first and asks a
//! [`FieldResolver`] for every field it reaches. A resolver answers with a
//! [`MockValue`]; object answers make the engine descend into the field's
//! sub-selection. Parents are always resolved before their children.
//!
//! No data source is involved: the point of execution is the sequence of
//! resolver calls, each carrying the field's definition, its coerced
//! arguments, its result path and its parent.

mod coerce;
mod path;

use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value as Json;
use tql_stack::ensure_sufficient_stack;

use crate::ast::{Directive, Field, FragmentDefinition, Selection, SelectionSet, Value};
use crate::lexer::SyntaxError;
use crate::parser::parse_document;
use crate::schema::{FieldDef, Schema, TypeDef, TypeKind};
use crate::validate::{select_operation, validate, ValidationError};

pub use coerce::JsonMap;
pub use path::{PathSegment, ResultPath};

use coerce::{coerce_variables, Coercer};

/// What a resolver returns for one field.
#[derive(Clone, Debug, PartialEq)]
pub enum MockValue {
    /// An object; the engine continues into the field's selection.
    Object,
    /// A leaf value, used as-is.
    Leaf(Json),
    /// Nothing; the engine does not descend.
    Null,
}

/// The enclosing field of a field being resolved.
#[derive(Clone, Debug)]
pub struct ParentField<'a> {
    pub definition: &'a FieldDef,
    pub path: ResultPath,
}

/// Everything a resolver learns about one field.
#[derive(Debug)]
pub struct FieldContext<'a> {
    pub schema: &'a Schema,
    /// The object type the field is selected on.
    pub parent_type: &'a TypeDef,
    pub definition: &'a FieldDef,
    pub response_key: &'a str,
    /// Result path of this field. List-typed fields end in `[0]`.
    pub path: &'a ResultPath,
    /// `None` for root fields.
    pub parent: Option<&'a ParentField<'a>>,
    /// Coerced arguments, variables substituted and defaults applied.
    pub arguments: &'a JsonMap,
}

impl FieldContext<'_> {
    /// The named type behind the field's declared output type.
    pub fn output_type(&self) -> Option<&TypeDef> {
        self.schema.get(self.definition.ty.named_type())
    }

    /// Path of the parent field, or the root path for root fields.
    pub fn parent_path(&self) -> ResultPath {
        self.parent
            .map_or_else(ResultPath::root, |parent| parent.path.clone())
    }
}

/// Per-field callback driven by [`Engine::execute`].
pub trait FieldResolver {
    type Error;

    fn resolve(&mut self, field: &FieldContext<'_>) -> Result<MockValue, Self::Error>;
}

/// One execution request.
#[derive(Clone, Copy, Debug, Default)]
pub struct Request<'q> {
    pub query: &'q str,
    pub operation_name: Option<&'q str>,
    pub variables: Option<&'q JsonMap>,
}

impl<'q> Request<'q> {
    pub fn new(query: &'q str) -> Self {
        Request {
            query,
            ..Request::default()
        }
    }

    #[must_use]
    pub fn with_operation(mut self, name: Option<&'q str>) -> Self {
        self.operation_name = name;
        self
    }

    #[must_use]
    pub fn with_variables(mut self, variables: Option<&'q JsonMap>) -> Self {
        self.variables = variables;
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExecuteError<E> {
    #[error("query does not parse: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("query is invalid: {}", join_messages(.0))]
    Validation(Vec<ValidationError>),
    #[error("resolver failed: {0}")]
    Resolver(E),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Executes queries against one schema. Holds no per-request state.
#[derive(Clone, Copy, Debug)]
pub struct Engine<'s> {
    schema: &'s Schema,
}

impl<'s> Engine<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Engine { schema }
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// Parse, validate and walk `request`, calling `resolver` once per
    /// selected field. Returns the assembled data tree.
    ///
    /// # Errors
    ///
    /// Syntax and validation failures are reported before the first
    /// resolver call. A resolver error aborts the walk.
    pub fn execute<R: FieldResolver>(
        &self,
        request: &Request<'_>,
        resolver: &mut R,
    ) -> Result<Json, ExecuteError<R::Error>> {
        let document = parse_document(request.query)?;
        let errors = validate(self.schema, &document, request.operation_name);
        if !errors.is_empty() {
            return Err(ExecuteError::Validation(errors));
        }
        let operation = select_operation(&document, request.operation_name)
            .map_err(|e| ExecuteError::Validation(vec![e]))?;
        let variables = coerce_variables(self.schema, &operation.variables, request.variables)
            .map_err(ExecuteError::Validation)?;
        let Some(root) = self.schema.root_type(operation.kind) else {
            return Err(ExecuteError::Validation(vec![ValidationError::new(
                format!("schema does not support {} operations", operation.kind.as_str()),
                "",
            )]));
        };

        tracing::debug!(
            operation = operation.name.as_deref().unwrap_or("<anonymous>"),
            kind = operation.kind.as_str(),
            "executing"
        );
        let mut walk = Walk {
            schema: self.schema,
            fragments: document.fragments().map(|f| (f.name.as_str(), f)).collect(),
            variables: &variables,
            resolver,
        };
        let data = walk
            .selection_sets(root, &[&operation.selection_set], &ResultPath::root(), None)
            .map_err(ExecuteError::Resolver)?;
        Ok(Json::Object(data))
    }
}

// ── Walk ────────────────────────────────────────────────────────────

struct Walk<'a, R> {
    schema: &'a Schema,
    fragments: FxHashMap<&'a str, &'a FragmentDefinition>,
    variables: &'a JsonMap,
    resolver: &'a mut R,
}

impl<'a, R: FieldResolver> Walk<'a, R> {
    /// Execute the merged selection sets of one object.
    fn selection_sets(
        &mut self,
        object_type: &'a TypeDef,
        sets: &[&'a SelectionSet],
        path: &ResultPath,
        parent: Option<&ParentField<'a>>,
    ) -> Result<JsonMap, R::Error> {
        let mut grouped: Vec<(&'a str, Vec<&'a Field>)> = Vec::new();
        let mut visited = FxHashSet::default();
        for set in sets {
            self.collect_fields(object_type, set, &mut grouped, &mut visited);
        }

        let mut data = JsonMap::new();
        for (key, fields) in grouped {
            let value = self.field(object_type, key, &fields, path, parent)?;
            data.insert(key.to_owned(), value);
        }
        Ok(data)
    }

    /// Group selected fields by response key, expanding fragments that
    /// apply to `object_type` and dropping `@skip`ped selections.
    fn collect_fields(
        &self,
        object_type: &TypeDef,
        set: &'a SelectionSet,
        grouped: &mut Vec<(&'a str, Vec<&'a Field>)>,
        visited: &mut FxHashSet<&'a str>,
    ) {
        ensure_sufficient_stack(|| self.collect_fields_inner(object_type, set, grouped, visited));
    }

    fn collect_fields_inner(
        &self,
        object_type: &TypeDef,
        set: &'a SelectionSet,
        grouped: &mut Vec<(&'a str, Vec<&'a Field>)>,
        visited: &mut FxHashSet<&'a str>,
    ) {
        for item in &set.items {
            match item {
                Selection::Field(field) => {
                    if !self.included(&field.directives) {
                        continue;
                    }
                    let key = field.response_key();
                    match grouped.iter_mut().find(|(k, _)| *k == key) {
                        Some((_, fields)) => fields.push(field),
                        None => grouped.push((key, vec![field])),
                    }
                }
                Selection::FragmentSpread(spread) => {
                    if !self.included(&spread.directives) || !visited.insert(&spread.name) {
                        continue;
                    }
                    if let Some(fragment) = self.fragments.get(spread.name.as_str()).copied() {
                        if self.schema.applies(&fragment.type_condition, object_type) {
                            self.collect_fields(object_type, &fragment.selection_set, grouped, visited);
                        }
                    }
                }
                Selection::InlineFragment(inline) => {
                    if !self.included(&inline.directives) {
                        continue;
                    }
                    let applies = match &inline.type_condition {
                        Some(condition) => self.schema.applies(condition, object_type),
                        None => true,
                    };
                    if applies {
                        self.collect_fields(object_type, &inline.selection_set, grouped, visited);
                    }
                }
            }
        }
    }

    fn included(&self, directives: &[Directive]) -> bool {
        let condition = |name: &str| {
            directives
                .iter()
                .find(|d| d.name == name)
                .and_then(|d| d.argument("if"))
                .map(|value| match value {
                    Value::Boolean(b) => *b,
                    Value::Variable(v) => self.variables.get(v).and_then(Json::as_bool) == Some(true),
                    _ => false,
                })
        };
        condition("skip") != Some(true) && condition("include") != Some(false)
    }

    fn field(
        &mut self,
        parent_type: &'a TypeDef,
        key: &'a str,
        fields: &[&'a Field],
        path: &ResultPath,
        parent: Option<&ParentField<'a>>,
    ) -> Result<Json, R::Error> {
        ensure_sufficient_stack(|| self.field_inner(parent_type, key, fields, path, parent))
    }

    fn field_inner(
        &mut self,
        parent_type: &'a TypeDef,
        key: &'a str,
        fields: &[&'a Field],
        path: &ResultPath,
        parent: Option<&ParentField<'a>>,
    ) -> Result<Json, R::Error> {
        let Some(first) = fields.first() else {
            return Ok(Json::Null);
        };
        if first.name == "__typename" {
            return Ok(Json::String(parent_type.name.clone()));
        }
        let Some(definition) = parent_type.field(&first.name) else {
            return Ok(Json::Null);
        };

        let is_list = definition.ty.is_list();
        let mut field_path = path.child(key);
        if is_list {
            field_path = field_path.index(0);
        }
        let coercer = Coercer {
            schema: self.schema,
            variables: self.variables,
        };
        let arguments = coercer.fields(&definition.args, |name| {
            first
                .arguments
                .iter()
                .find(|a| a.name == name)
                .map(|a| &a.value)
        });

        let _span = tracing::trace_span!("field", path = %field_path).entered();
        let context = FieldContext {
            schema: self.schema,
            parent_type,
            definition,
            response_key: key,
            path: &field_path,
            parent,
            arguments: &arguments,
        };
        let value = match self.resolver.resolve(&context)? {
            MockValue::Null => return Ok(Json::Null),
            MockValue::Leaf(json) => json,
            MockValue::Object => {
                let Some(declared) = self.schema.get(definition.ty.named_type()) else {
                    return Ok(Json::Null);
                };
                let object_type = self.runtime_type(declared);
                let sets: Vec<&'a SelectionSet> =
                    fields.iter().filter_map(|f| f.selection_set.as_ref()).collect();
                let this = ParentField {
                    definition,
                    path: field_path.clone(),
                };
                Json::Object(self.selection_sets(object_type, &sets, &field_path, Some(&this))?)
            }
        };
        Ok(if is_list && !value.is_array() {
            Json::Array(vec![value])
        } else {
            value
        })
    }

    /// Interfaces resolve to their first implementation.
    fn runtime_type(&self, declared: &'a TypeDef) -> &'a TypeDef {
        if declared.kind() == TypeKind::Interface {
            self.schema
                .implementations(&declared.name)
                .next()
                .unwrap_or(declared)
        } else {
            declared
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]

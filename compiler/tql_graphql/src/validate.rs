//! Query validation against a compiled schema.
//!
//! [`validate`] walks the selected operation and reports every problem it
//! finds instead of stopping at the first one, so a caller can show the
//! complete list.

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use tql_stack::ensure_sufficient_stack;

use crate::ast::{
    Argument, Directive, Document, Field, FragmentDefinition, OperationDefinition, Selection,
    SelectionSet, TypeRef, Value, VariableDefinition,
};
use crate::schema::{InputValue, Schema, TypeBody, TypeDef};

/// One validation failure, located by the response path of the offending
/// field (`book.authors`), argument (`book(where).constraints[0]`) or
/// variable (`$id`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
    pub path: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>, path: impl Into<String>) -> Self {
        ValidationError {
            message: message.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{} (at {})", self.message, self.path)
        }
    }
}

impl std::error::Error for ValidationError {}

/// Pick the operation to run: the named one, or the only one.
pub fn select_operation<'d>(
    document: &'d Document,
    name: Option<&str>,
) -> Result<&'d OperationDefinition, ValidationError> {
    if let Some(name) = name {
        return document
            .operations()
            .find(|op| op.name.as_deref() == Some(name))
            .ok_or_else(|| ValidationError::new(format!("unknown operation `{name}`"), ""));
    }
    let mut operations = document.operations();
    match (operations.next(), operations.next()) {
        (Some(op), None) => Ok(op),
        (None, _) => Err(ValidationError::new("document contains no operation", "")),
        (Some(_), Some(_)) => Err(ValidationError::new(
            "document contains several operations; an operation name is required",
            "",
        )),
    }
}

/// Validate the selected operation of `document`. Returns all errors found.
pub fn validate<'a>(
    schema: &'a Schema,
    document: &'a Document,
    operation_name: Option<&str>,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut fragments = FxHashMap::default();
    for fragment in document.fragments() {
        if fragments.insert(fragment.name.as_str(), fragment).is_some() {
            errors.push(ValidationError::new(
                format!("fragment `{}` is defined more than once", fragment.name),
                "",
            ));
        }
    }
    check_fragment_cycles(&fragments, &mut errors);

    match select_operation(document, operation_name) {
        Ok(operation) => {
            let mut validator = Validator {
                schema,
                fragments: &fragments,
                variables: &operation.variables,
                visited: FxHashSet::default(),
                errors,
            };
            validator.operation(operation);
            errors = validator.errors;
        }
        Err(error) => errors.push(error),
    }

    if !errors.is_empty() {
        tracing::debug!(count = errors.len(), "query failed validation");
    }
    errors
}

// ── Fragment cycles ─────────────────────────────────────────────────

fn check_fragment_cycles(
    fragments: &FxHashMap<&str, &FragmentDefinition>,
    errors: &mut Vec<ValidationError>,
) {
    let mut names: Vec<&str> = fragments.keys().copied().collect();
    names.sort_unstable();
    for name in names {
        if reaches(fragments, name, name, &mut FxHashSet::default()) {
            errors.push(ValidationError::new(
                format!("fragment `{name}` spreads itself"),
                "",
            ));
        }
    }
}

fn reaches<'d>(
    fragments: &FxHashMap<&str, &'d FragmentDefinition>,
    from: &str,
    target: &str,
    seen: &mut FxHashSet<&'d str>,
) -> bool {
    let Some(&fragment) = fragments.get(from) else {
        return false;
    };
    let mut spreads = Vec::new();
    collect_spreads(&fragment.selection_set, &mut spreads);
    spreads
        .into_iter()
        .any(|name| name == target || (seen.insert(name) && reaches(fragments, name, target, seen)))
}

fn collect_spreads<'d>(set: &'d SelectionSet, out: &mut Vec<&'d str>) {
    ensure_sufficient_stack(|| collect_spreads_inner(set, out));
}

fn collect_spreads_inner<'d>(set: &'d SelectionSet, out: &mut Vec<&'d str>) {
    for item in &set.items {
        match item {
            Selection::Field(field) => {
                if let Some(set) = &field.selection_set {
                    collect_spreads(set, out);
                }
            }
            Selection::FragmentSpread(spread) => out.push(&spread.name),
            Selection::InlineFragment(inline) => collect_spreads(&inline.selection_set, out),
        }
    }
}

// ── Operation walk ──────────────────────────────────────────────────

struct Validator<'a> {
    schema: &'a Schema,
    fragments: &'a FxHashMap<&'a str, &'a FragmentDefinition>,
    variables: &'a [VariableDefinition],
    /// Fragments already checked for this operation.
    visited: FxHashSet<&'a str>,
    errors: Vec<ValidationError>,
}

impl<'a> Validator<'a> {
    fn error(&mut self, message: impl Into<String>, at: &str) {
        self.errors.push(ValidationError::new(message, at));
    }

    fn operation(&mut self, operation: &'a OperationDefinition) {
        let Some(root) = self.schema.root_type(operation.kind) else {
            self.error(
                format!(
                    "schema does not support {} operations",
                    operation.kind.as_str()
                ),
                "",
            );
            return;
        };
        self.variable_definitions(operation);
        self.directives(&operation.directives, "");
        self.selection_set(root, &operation.selection_set, "");
    }

    fn variable_definitions(&mut self, operation: &'a OperationDefinition) {
        let mut seen = FxHashSet::default();
        for variable in &operation.variables {
            let at = format!("${}", variable.name);
            if !seen.insert(variable.name.as_str()) {
                self.error(
                    format!("variable `${}` is defined more than once", variable.name),
                    &at,
                );
            }
            match self.schema.kind_of(&variable.ty) {
                None => self.error(
                    format!("unknown type `{}`", variable.ty.named_type()),
                    &at,
                ),
                Some(kind) if !kind.is_input() => self.error(
                    format!(
                        "variable `${}` must have an input type, found `{}`",
                        variable.name, variable.ty
                    ),
                    &at,
                ),
                Some(_) => {
                    if let Some(default) = &variable.default {
                        self.value(default, &variable.ty, &at);
                    }
                }
            }
        }
    }

    fn selection_set(&mut self, parent: &'a TypeDef, set: &'a SelectionSet, path: &str) {
        ensure_sufficient_stack(|| self.selection_set_inner(parent, set, path));
    }

    fn selection_set_inner(&mut self, parent: &'a TypeDef, set: &'a SelectionSet, path: &str) {
        for item in &set.items {
            match item {
                Selection::Field(field) => self.field(parent, field, path),
                Selection::FragmentSpread(spread) => {
                    self.directives(&spread.directives, path);
                    let Some(fragment) = self.fragments.get(spread.name.as_str()).copied() else {
                        self.error(format!("unknown fragment `{}`", spread.name), path);
                        continue;
                    };
                    if self.visited.insert(fragment.name.as_str()) {
                        if let Some(ty) = self.type_condition(&fragment.type_condition, path) {
                            self.selection_set(ty, &fragment.selection_set, path);
                        }
                    }
                }
                Selection::InlineFragment(inline) => {
                    self.directives(&inline.directives, path);
                    let ty = match &inline.type_condition {
                        Some(name) => self.type_condition(name, path),
                        None => Some(parent),
                    };
                    if let Some(ty) = ty {
                        self.selection_set(ty, &inline.selection_set, path);
                    }
                }
            }
        }
    }

    fn type_condition(&mut self, name: &str, path: &str) -> Option<&'a TypeDef> {
        let schema = self.schema;
        match schema.get(name) {
            Some(ty) if ty.kind().is_composite() => Some(ty),
            Some(_) => {
                self.error(
                    format!("type condition `{name}` is not an object or interface type"),
                    path,
                );
                None
            }
            None => {
                self.error(format!("unknown type `{name}` in type condition"), path);
                None
            }
        }
    }

    fn field(&mut self, parent: &'a TypeDef, field: &'a Field, path: &str) {
        let at = join(path, field.response_key());
        self.directives(&field.directives, &at);

        if field.name == "__typename" {
            if field.selection_set.is_some() {
                self.error("`__typename` cannot have a selection", &at);
            }
            return;
        }
        let Some(definition) = parent.field(&field.name) else {
            self.error(
                format!("unknown field `{}` on type `{}`", field.name, parent.name),
                &at,
            );
            return;
        };
        self.arguments(&definition.args, &field.arguments, &at);

        let schema = self.schema;
        let Some(ty) = schema.get(definition.ty.named_type()) else {
            return;
        };
        match (&field.selection_set, ty.kind().is_leaf()) {
            (Some(_), true) => self.error(
                format!(
                    "field `{}` of type `{}` must not have a selection",
                    field.name, definition.ty
                ),
                &at,
            ),
            (None, false) => self.error(
                format!(
                    "field `{}` of type `{}` must have a selection of subfields",
                    field.name, definition.ty
                ),
                &at,
            ),
            (Some(set), false) => self.selection_set(ty, set, &at),
            (None, true) => {}
        }
    }

    fn arguments(&mut self, declared: &[InputValue], given: &[Argument], at: &str) {
        let mut seen = FxHashSet::default();
        for argument in given {
            if !seen.insert(argument.name.as_str()) {
                self.error(
                    format!("argument `{}` is given more than once", argument.name),
                    at,
                );
                continue;
            }
            match declared.iter().find(|d| d.name == argument.name) {
                Some(declaration) => self.value(
                    &argument.value,
                    &declaration.ty,
                    &format!("{at}({})", argument.name),
                ),
                None => self.error(format!("unknown argument `{}`", argument.name), at),
            }
        }
        for declaration in declared {
            if declaration.is_required() && !seen.contains(declaration.name.as_str()) {
                self.error(
                    format!("missing required argument `{}`", declaration.name),
                    at,
                );
            }
        }
    }

    /// `@skip` and `@include` need a boolean `if`; other directives are
    /// passed through unchecked.
    fn directives(&mut self, directives: &[Directive], at: &str) {
        for directive in directives {
            if matches!(directive.name.as_str(), "skip" | "include") {
                let condition = InputValue {
                    name: "if".to_owned(),
                    ty: TypeRef::NonNull(Box::new(TypeRef::named("Boolean"))),
                    default: None,
                };
                self.arguments(
                    std::slice::from_ref(&condition),
                    &directive.arguments,
                    &format!("{at}@{}", directive.name),
                );
            }
        }
    }

    // ── Values ──────────────────────────────────────────────────────

    fn value(&mut self, value: &Value, ty: &TypeRef, at: &str) {
        ensure_sufficient_stack(|| self.value_inner(value, ty, at));
    }

    fn value_inner(&mut self, value: &Value, ty: &TypeRef, at: &str) {
        if let Value::Variable(name) = value {
            self.variable_usage(name, ty, at);
            return;
        }
        match ty {
            TypeRef::NonNull(inner) => {
                if matches!(value, Value::Null) {
                    self.error(format!("expected `{ty}`, found null"), at);
                } else {
                    self.value(value, inner, at);
                }
            }
            _ if matches!(value, Value::Null) => {}
            TypeRef::List(inner) => match value {
                Value::List(items) => {
                    for (i, item) in items.iter().enumerate() {
                        self.value(item, inner, &format!("{at}[{i}]"));
                    }
                }
                // A single value coerces to a one-element list.
                single => self.value(single, inner, at),
            },
            TypeRef::Named(name) => self.named_value(value, name, at),
        }
    }

    fn named_value(&mut self, value: &Value, name: &str, at: &str) {
        let schema = self.schema;
        let Some(definition) = schema.get(name) else {
            return;
        };
        let accepted = match (&definition.body, value) {
            (TypeBody::Scalar, value) => scalar_accepts(name, value),
            (TypeBody::Enum { values }, Value::Enum(v)) => values.contains(v),
            (TypeBody::InputObject { fields }, Value::Object(given)) => {
                self.input_object(definition, fields, given, at);
                true
            }
            _ => false,
        };
        if !accepted {
            self.error(format!("expected `{name}`, found `{value}`"), at);
        }
    }

    fn input_object(
        &mut self,
        definition: &TypeDef,
        fields: &[InputValue],
        given: &[(String, Value)],
        at: &str,
    ) {
        let mut seen = FxHashSet::default();
        for (name, value) in given {
            if !seen.insert(name.as_str()) {
                self.error(format!("input field `{name}` is given more than once"), at);
                continue;
            }
            match fields.iter().find(|f| f.name == *name) {
                Some(field) => self.value(value, &field.ty, &format!("{at}.{name}")),
                None => self.error(
                    format!(
                        "unknown field `{name}` in input type `{}`",
                        definition.name
                    ),
                    at,
                ),
            }
        }
        for field in fields {
            if field.is_required() && !seen.contains(field.name.as_str()) {
                self.error(
                    format!(
                        "missing required field `{}` in `{}`",
                        field.name, definition.name
                    ),
                    at,
                );
            }
        }
    }

    fn variable_usage(&mut self, name: &str, ty: &TypeRef, at: &str) {
        let Some(variable) = self.variables.iter().find(|v| v.name == name) else {
            self.error(format!("undefined variable `${name}`"), at);
            return;
        };
        if !variable_fits(&variable.ty, ty, variable.default.is_some()) {
            self.error(
                format!(
                    "variable `${name}` of type `{}` cannot be used where `{ty}` is expected",
                    variable.ty
                ),
                at,
            );
        }
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_owned()
    } else {
        format!("{path}.{key}")
    }
}

/// Literal acceptance for the built-in scalars. Custom scalars take any
/// literal.
fn scalar_accepts(name: &str, value: &Value) -> bool {
    match name {
        "Int" => matches!(value, Value::Int(n) if i32::try_from(*n).is_ok()),
        "Float" => matches!(value, Value::Int(_) | Value::Float(_)),
        "String" => matches!(value, Value::String(_)),
        "Boolean" => matches!(value, Value::Boolean(_)),
        "ID" => matches!(value, Value::String(_) | Value::Int(_)),
        _ => true,
    }
}

/// Whether a variable of type `variable` may appear where `location` is
/// expected. A default makes a nullable variable acceptable in a non-null
/// position.
fn variable_fits(variable: &TypeRef, location: &TypeRef, has_default: bool) -> bool {
    match (variable, location) {
        (TypeRef::NonNull(v), TypeRef::NonNull(l)) => variable_fits(v, l, false),
        (TypeRef::NonNull(v), l) => variable_fits(v, l, false),
        (v, TypeRef::NonNull(l)) => has_default && variable_fits(v, l, false),
        (TypeRef::List(v), TypeRef::List(l)) => variable_fits(v, l, false),
        (TypeRef::Named(a), TypeRef::Named(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]

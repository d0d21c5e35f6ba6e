//! Input coercion: GraphQL literals and JSON variables into the JSON
//! argument map handed to resolvers.

use serde_json::{Map, Value as Json};
use tql_stack::ensure_sufficient_stack;

use crate::ast::{TypeRef, Value, VariableDefinition};
use crate::schema::{InputValue, Schema, TypeBody, TypeDef};
use crate::validate::ValidationError;

pub type JsonMap = Map<String, Json>;

/// Check provided variable values against their definitions and apply
/// defaults. Variables neither provided nor defaulted are left out.
pub(crate) fn coerce_variables(
    schema: &Schema,
    definitions: &[VariableDefinition],
    provided: Option<&JsonMap>,
) -> Result<JsonMap, Vec<ValidationError>> {
    let constants = JsonMap::new();
    let literals = Coercer {
        schema,
        variables: &constants,
    };
    let mut coerced = JsonMap::new();
    let mut errors = Vec::new();
    for definition in definitions {
        let at = format!("${}", definition.name);
        match provided.and_then(|p| p.get(&definition.name)) {
            Some(value) if json_fits(schema, value, &definition.ty) => {
                coerced.insert(definition.name.clone(), value.clone());
            }
            Some(value) => errors.push(ValidationError::new(
                format!("expected a value of type `{}`, found `{value}`", definition.ty),
                at,
            )),
            None => match &definition.default {
                Some(default) => {
                    if let Some(value) = literals.coerce(default, &definition.ty) {
                        coerced.insert(definition.name.clone(), value);
                    }
                }
                None if definition.ty.is_non_null() => errors.push(ValidationError::new(
                    format!("missing value for required variable `${}`", definition.name),
                    at,
                )),
                None => {}
            },
        }
    }
    if errors.is_empty() {
        Ok(coerced)
    } else {
        Err(errors)
    }
}

/// Whether a JSON variable value is acceptable for `ty`.
fn json_fits(schema: &Schema, value: &Json, ty: &TypeRef) -> bool {
    match (ty, value) {
        (TypeRef::NonNull(_), Json::Null) => false,
        (TypeRef::NonNull(inner), value) => json_fits(schema, value, inner),
        (_, Json::Null) => true,
        (TypeRef::List(inner), Json::Array(items)) => {
            items.iter().all(|item| json_fits(schema, item, inner))
        }
        (TypeRef::List(inner), value) => json_fits(schema, value, inner),
        (TypeRef::Named(name), value) => match schema.get(name).map(|t| &t.body) {
            Some(TypeBody::Scalar) => match name.as_str() {
                "Int" => value.as_i64().is_some_and(|n| i32::try_from(n).is_ok()),
                "Float" => value.is_number(),
                "String" => value.is_string(),
                "Boolean" => value.is_boolean(),
                "ID" => value.is_string() || value.is_i64(),
                _ => true,
            },
            Some(TypeBody::Enum { values }) => value
                .as_str()
                .is_some_and(|s| values.iter().any(|v| v == s)),
            Some(TypeBody::InputObject { fields }) => value.as_object().is_some_and(|object| {
                object.keys().all(|k| fields.iter().any(|f| f.name == *k))
                    && fields.iter().all(|f| match object.get(&f.name) {
                        Some(v) => json_fits(schema, v, &f.ty),
                        None => !f.is_required(),
                    })
            }),
            _ => false,
        },
    }
}

/// Turns validated literals into JSON, substituting variables and applying
/// declared defaults.
pub(crate) struct Coercer<'a> {
    pub(crate) schema: &'a Schema,
    pub(crate) variables: &'a JsonMap,
}

impl<'a> Coercer<'a> {
    /// Coerce the values for a list of declared inputs (field arguments or
    /// input-object fields). Inputs with no value and no default are
    /// omitted.
    pub(crate) fn fields<'v>(
        &self,
        declared: &[InputValue],
        lookup: impl Fn(&str) -> Option<&'v Value>,
    ) -> JsonMap {
        let mut map = JsonMap::new();
        for input in declared {
            let value = lookup(&input.name)
                .and_then(|v| self.coerce(v, &input.ty))
                .or_else(|| {
                    input
                        .default
                        .as_ref()
                        .and_then(|d| self.coerce(d, &input.ty))
                });
            if let Some(value) = value {
                map.insert(input.name.clone(), value);
            }
        }
        map
    }

    /// `None` when the value is an unset variable.
    pub(crate) fn coerce(&self, value: &Value, ty: &TypeRef) -> Option<Json> {
        ensure_sufficient_stack(|| self.coerce_inner(value, ty))
    }

    fn coerce_inner(&self, value: &Value, ty: &TypeRef) -> Option<Json> {
        if ty.is_list() && !matches!(value, Value::List(_) | Value::Null | Value::Variable(_)) {
            return self
                .coerce(value, item_type(ty))
                .map(|item| Json::Array(vec![item]));
        }
        Some(match value {
            Value::Variable(name) => return self.variables.get(name).cloned(),
            Value::Int(n) => Json::from(*n),
            Value::Float(n) => Json::from(*n),
            Value::String(s) | Value::Enum(s) => Json::String(s.clone()),
            Value::Boolean(b) => Json::Bool(*b),
            Value::Null => Json::Null,
            Value::List(items) => {
                let inner = item_type(ty);
                Json::Array(
                    items
                        .iter()
                        .map(|item| self.coerce(item, inner).unwrap_or(Json::Null))
                        .collect(),
                )
            }
            Value::Object(given) => {
                let declared = self
                    .schema
                    .get(ty.named_type())
                    .map_or(&[][..], TypeDef::input_fields);
                Json::Object(self.fields(declared, |name| {
                    given.iter().find(|(k, _)| k == name).map(|(_, v)| v)
                }))
            }
        })
    }
}

fn item_type(ty: &TypeRef) -> &TypeRef {
    match ty {
        TypeRef::NonNull(inner) => item_type(inner),
        TypeRef::List(inner) => inner,
        named @ TypeRef::Named(_) => named,
    }
}

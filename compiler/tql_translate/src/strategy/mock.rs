//! Placeholder values for leaf fields.

use serde_json::Value as Json;
use tql_graphql::{MockValue, TypeDef, TypeKind};

/// A stand-in value of `ty` for the field `name`.
///
/// Enums answer their first value. Scalars answer something of the right
/// shape; custom scalars answer `null`.
pub(super) fn leaf(ty: &TypeDef, name: &str) -> MockValue {
    match ty.kind() {
        TypeKind::Enum => ty
            .enum_values()
            .first()
            .map_or(MockValue::Null, |v| MockValue::Leaf(Json::String(v.clone()))),
        TypeKind::Scalar => scalar(&ty.name, name).map_or(MockValue::Null, MockValue::Leaf),
        TypeKind::Object | TypeKind::Interface | TypeKind::InputObject => MockValue::Object,
    }
}

fn scalar(scalar: &str, name: &str) -> Option<Json> {
    let value = match scalar {
        "String" => Json::from(name),
        "ID" => Json::from(format!("id_{name}")),
        "Boolean" => Json::Bool(true),
        "Int" | "Long" => Json::from(1),
        "Float" => Json::from(1.0),
        _ => return None,
    };
    Some(value)
}

//! Built-in SDL for filtered queries.
//!
//! Entity fields accept a `where: WhereClause` argument. The prelude declares
//! the input types it uses so user schemas can reference them without
//! redeclaring them.

/// Names of the types the prelude declares.
pub const PRELUDE_TYPES: [&str; 3] = ["WhereOperator", "Constraint", "WhereClause"];

pub const WHERE_PRELUDE: &str = r#"
"Combines the constraints of a where clause."
enum WhereOperator {
    AND
    OR
}

"A single `operand operator expression` test on an entity property."
input Constraint {
    operand: String!
    operator: String!
    expression: String
}

input WhereClause {
    operator: WhereOperator = AND
    constraints: [Constraint!]!
}
"#;

/// Whether `name` is declared by the prelude.
pub fn is_prelude_type(name: &str) -> bool {
    PRELUDE_TYPES.contains(&name)
}

//! Translation failures.
//!
//! Every variant is fatal for its request: translation either yields a
//! complete Traversal IR or one of these, never a partial IR.

use tql_graphql::{SchemaError, SyntaxError, ValidationError};
use tql_ir::BuilderError;
use tql_ontology::OntologyError;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TranslateError {
    /// The query does not fit the schema. Carries every message found.
    #[error("query does not match the schema: {}", messages.join("; "))]
    SchemaValidationFailure { messages: Vec<String> },

    /// A where clause filters on properties the entity does not declare.
    #[error(
        "unknown constraint operand{} {} on entity `{entity}` (at {path})",
        if operands.len() == 1 { "" } else { "s" },
        quoted(operands)
    )]
    UnknownConstraintOperand {
        operands: Vec<String>,
        entity: String,
        path: String,
    },

    #[error("unknown constraint operator `{operator}` (at {path})")]
    UnknownConstraintOperator { operator: String, path: String },

    #[error("malformed where clause at {path}: {reason}")]
    MalformedWhereClause { path: String, reason: String },

    /// A selected field has no counterpart in the ontology.
    #[error("no {kind} `{name}` in the ontology (at {path})")]
    UnknownOntologyElement {
        kind: &'static str,
        name: String,
        path: String,
    },

    /// `translate` was called before a schema was compiled.
    #[error("no schema compiled; call `compile` before translating")]
    PrerequisiteMissing,

    #[error("query does not parse: {0}")]
    QuerySyntax(#[source] SyntaxError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Ontology(#[from] OntologyError),

    /// The strategy misused the builder. Always a bug in the translator.
    #[error("traversal builder misuse: {0}")]
    BuilderInvariantViolation(#[from] BuilderError),
}

impl TranslateError {
    pub(crate) fn validation(errors: &[ValidationError]) -> Self {
        TranslateError::SchemaValidationFailure {
            messages: errors.iter().map(ToString::to_string).collect(),
        }
    }
}

fn quoted(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("`{n}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

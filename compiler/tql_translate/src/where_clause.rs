//! Decoding of `where` arguments.
//!
//! The engine hands arguments over as coerced JSON:
//!
//! ```json
//! { "operator": "AND", "constraints": [ { "operand": "name", "operator": "like", "expression": "jhone" } ] }
//! ```
//!
//! Decoding checks operators against the closed [`ConstraintOp`] set.
//! Operands are checked later, against the filtered entity.

use serde::Deserialize;
use serde_json::Value as Json;
use tql_ir::{Constraint, ConstraintOp, QuantifierKind};

use crate::error::TranslateError;

/// Name of the argument that carries a where clause.
pub const WHERE_ARGUMENT: &str = "where";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
enum WhereOperator {
    #[default]
    And,
    Or,
}

#[derive(Debug, Deserialize)]
struct RawClause {
    #[serde(default)]
    operator: WhereOperator,
    constraints: Vec<RawConstraint>,
}

#[derive(Debug, Deserialize)]
struct RawConstraint {
    operand: String,
    operator: String,
    #[serde(default)]
    expression: Option<String>,
}

/// A decoded where clause: a quantifier over `(operand, constraint)` tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WhereClause {
    pub quantifier: QuantifierKind,
    pub constraints: Vec<(String, Constraint)>,
}

impl WhereClause {
    /// Decode the clause found at `path`.
    ///
    /// # Errors
    ///
    /// [`TranslateError::MalformedWhereClause`] when the value does not have
    /// the clause's shape, [`TranslateError::UnknownConstraintOperator`] for
    /// an operator outside the constraint set.
    pub fn decode(value: &Json, path: &str) -> Result<Self, TranslateError> {
        let raw = RawClause::deserialize(value).map_err(|e| TranslateError::MalformedWhereClause {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;

        let quantifier = match raw.operator {
            WhereOperator::And => QuantifierKind::All,
            WhereOperator::Or => QuantifierKind::Some,
        };
        let constraints = raw
            .constraints
            .into_iter()
            .map(|c| {
                let op: ConstraintOp =
                    c.operator
                        .parse()
                        .map_err(|_| TranslateError::UnknownConstraintOperator {
                            operator: c.operator.clone(),
                            path: path.to_owned(),
                        })?;
                // An empty expression means the same as none.
                let expression = c.expression.filter(|e| !e.is_empty());
                Ok((c.operand, Constraint::new(op, expression)))
            })
            .collect::<Result<Vec<_>, TranslateError>>()?;

        Ok(WhereClause {
            quantifier,
            constraints,
        })
    }

    /// Operands not accepted by `known`, in clause order, without repeats.
    pub fn unknown_operands(&self, mut known: impl FnMut(&str) -> bool) -> Vec<String> {
        let mut unknown: Vec<String> = Vec::new();
        for (operand, _) in &self.constraints {
            if !known(operand) && !unknown.contains(operand) {
                unknown.push(operand.clone());
            }
        }
        unknown
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]

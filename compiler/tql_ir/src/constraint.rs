//! Property payloads: constraints and projections.

use std::fmt;
use std::str::FromStr;

/// Comparison operator carried by a [`Constraint`].
///
/// The string forms are the ones accepted in a `where` clause. Each operator
/// has an identifier spelling (`notEmpty`) and most also have a spaced alias
/// (`not empty`); both parse to the same variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConstraintOp {
    Empty,
    NotEmpty,
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    InSet,
    NotInSet,
    InRange,
    NotInRange,
    Within,
    Contains,
    NotContains,
    Distinct,
    StartsWith,
    NotStartsWith,
    EndsWith,
    NotEndsWith,
    Match,
    MatchPhrase,
    QueryString,
    NotMatch,
    FuzzyEq,
    FuzzyNe,
    Like,
    LikeAny,
}

impl ConstraintOp {
    /// Every operator, in declaration order.
    pub const ALL: [ConstraintOp; 28] = [
        ConstraintOp::Empty,
        ConstraintOp::NotEmpty,
        ConstraintOp::Eq,
        ConstraintOp::Ne,
        ConstraintOp::Gt,
        ConstraintOp::Ge,
        ConstraintOp::Lt,
        ConstraintOp::Le,
        ConstraintOp::InSet,
        ConstraintOp::NotInSet,
        ConstraintOp::InRange,
        ConstraintOp::NotInRange,
        ConstraintOp::Within,
        ConstraintOp::Contains,
        ConstraintOp::NotContains,
        ConstraintOp::Distinct,
        ConstraintOp::StartsWith,
        ConstraintOp::NotStartsWith,
        ConstraintOp::EndsWith,
        ConstraintOp::NotEndsWith,
        ConstraintOp::Match,
        ConstraintOp::MatchPhrase,
        ConstraintOp::QueryString,
        ConstraintOp::NotMatch,
        ConstraintOp::FuzzyEq,
        ConstraintOp::FuzzyNe,
        ConstraintOp::Like,
        ConstraintOp::LikeAny,
    ];

    /// Identifier spelling, as printed in the IR.
    pub fn as_str(self) -> &'static str {
        match self {
            ConstraintOp::Empty => "empty",
            ConstraintOp::NotEmpty => "notEmpty",
            ConstraintOp::Eq => "eq",
            ConstraintOp::Ne => "ne",
            ConstraintOp::Gt => "gt",
            ConstraintOp::Ge => "ge",
            ConstraintOp::Lt => "lt",
            ConstraintOp::Le => "le",
            ConstraintOp::InSet => "inSet",
            ConstraintOp::NotInSet => "notInSet",
            ConstraintOp::InRange => "inRange",
            ConstraintOp::NotInRange => "notInRange",
            ConstraintOp::Within => "within",
            ConstraintOp::Contains => "contains",
            ConstraintOp::NotContains => "notContains",
            ConstraintOp::Distinct => "distinct",
            ConstraintOp::StartsWith => "startsWith",
            ConstraintOp::NotStartsWith => "notStartsWith",
            ConstraintOp::EndsWith => "endsWith",
            ConstraintOp::NotEndsWith => "notEndsWith",
            ConstraintOp::Match => "match",
            ConstraintOp::MatchPhrase => "match_phrase",
            ConstraintOp::QueryString => "query_string",
            ConstraintOp::NotMatch => "notMatch",
            ConstraintOp::FuzzyEq => "fuzzyEq",
            ConstraintOp::FuzzyNe => "fuzzyNe",
            ConstraintOp::Like => "like",
            ConstraintOp::LikeAny => "likeAny",
        }
    }

    /// Spaced alias, if the operator has one.
    pub fn alias(self) -> Option<&'static str> {
        let alias = match self {
            ConstraintOp::NotEmpty => "not empty",
            ConstraintOp::InSet => "in set",
            ConstraintOp::NotInSet => "not in set",
            ConstraintOp::InRange => "in range",
            ConstraintOp::NotInRange => "not in range",
            ConstraintOp::NotContains => "not contains",
            ConstraintOp::StartsWith => "starts with",
            ConstraintOp::NotStartsWith => "not starts with",
            ConstraintOp::EndsWith => "ends with",
            ConstraintOp::NotEndsWith => "not ends with",
            ConstraintOp::MatchPhrase => "match phrase",
            ConstraintOp::QueryString => "query string",
            ConstraintOp::NotMatch => "not match",
            ConstraintOp::FuzzyEq => "fuzzy eq",
            ConstraintOp::FuzzyNe => "fuzzy ne",
            ConstraintOp::LikeAny => "like any",
            _ => return None,
        };
        Some(alias)
    }
}

impl fmt::Display for ConstraintOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operator string that names no [`ConstraintOp`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown constraint operator `{0}`")]
pub struct UnknownOperator(pub String);

impl FromStr for ConstraintOp {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ConstraintOp::ALL
            .into_iter()
            .find(|op| op.as_str() == s || op.alias() == Some(s))
            .ok_or_else(|| UnknownOperator(s.to_owned()))
    }
}

/// A filter on a property value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Constraint {
    pub op: ConstraintOp,
    pub expression: Option<String>,
}

impl Constraint {
    pub fn new(op: ConstraintOp, expression: Option<String>) -> Self {
        Constraint { op, expression }
    }

    /// A constraint that takes no value (`empty`, `notEmpty`, ...).
    pub fn unary(op: ConstraintOp) -> Self {
        Constraint {
            op,
            expression: None,
        }
    }
}

/// How a property is read back when it is not filtered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Projection {
    Identity,
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Projection::Identity => f.write_str("Identity"),
        }
    }
}

/// What a property node carries. A property is either filtered or
/// projected, never both.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropertyPayload {
    Constraint(Constraint),
    Projection(Projection),
}

impl PropertyPayload {
    /// Identity projection, used for every selected-but-unfiltered field.
    pub const IDENTITY: PropertyPayload = PropertyPayload::Projection(Projection::Identity);

    pub fn constraint(&self) -> Option<&Constraint> {
        match self {
            PropertyPayload::Constraint(c) => Some(c),
            PropertyPayload::Projection(_) => None,
        }
    }

    pub fn projection(&self) -> Option<Projection> {
        match self {
            PropertyPayload::Projection(p) => Some(*p),
            PropertyPayload::Constraint(_) => None,
        }
    }
}

impl From<Option<Constraint>> for PropertyPayload {
    fn from(constraint: Option<Constraint>) -> Self {
        constraint.map_or(PropertyPayload::IDENTITY, PropertyPayload::Constraint)
    }
}

impl fmt::Display for PropertyPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyPayload::Projection(p) => write!(f, "{p}"),
            PropertyPayload::Constraint(c) => {
                write!(f, "{},{}", c.op, c.expression.as_deref().unwrap_or(""))
            }
        }
    }
}

#[cfg(test)]
mod tests;

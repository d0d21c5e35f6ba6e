//! Traversal construction by mock execution.
//!
//! [`TraversalStrategy`] is a [`FieldResolver`]: the engine walks the query
//! and calls it once per field, parents before children. Each call
//! repositions the builder from the path memo and then inserts what the field
//! stands for:
//!
//! | Field                              | Inserted                            |
//! |------------------------------------|-------------------------------------|
//! | entity-like, declared relationship | `Relation`, then `Entity`           |
//! | entity-like, id argument given     | concrete `Entity`                   |
//! | entity-like                        | `Entity`                            |
//! | scalar or enum                     | `Property` with identity projection |
//! | `where` argument                   | `PropertyGroup` under a quantifier  |
//!
//! A filter joins the nearest quantifier above its entity. Only an entity
//! with no quantifier anywhere above it gets a new one of its own.
//!
//! An entity's first child splices an `ALL` quantifier after it, so every
//! further child fans out from the same node. Because the position is always
//! looked up again, the shape does not depend on the order siblings arrive
//! in.

mod mock;

use serde_json::Value as Json;
use tql_graphql::{FieldContext, FieldResolver, JsonMap, MockValue, ResultPath, TypeDef, TypeKind};
use tql_ir::{Direction, IrBuilder, NodeId, PropertyPayload, QuantifierKind, TraversalIr};
use tql_ontology::{Accessor, EntityType, RelationshipType};

use crate::error::TranslateError;
use crate::memo::PathMemo;
use crate::where_clause::{WhereClause, WHERE_ARGUMENT};

/// Builds one Traversal IR from the field visits of one execution.
#[derive(Debug)]
pub struct TraversalStrategy<'a> {
    accessor: &'a Accessor,
    builder: IrBuilder,
    memo: PathMemo,
}

impl<'a> TraversalStrategy<'a> {
    /// Start `builder` and anchor the root path on its `Start` node.
    ///
    /// # Errors
    ///
    /// Fails if `builder` was already started.
    pub fn new(accessor: &'a Accessor, mut builder: IrBuilder) -> Result<Self, TranslateError> {
        let start = builder.start()?;
        let mut memo = PathMemo::default();
        memo.record(&ResultPath::root(), start);
        Ok(TraversalStrategy {
            accessor,
            builder,
            memo,
        })
    }

    /// Where the builder stands after entering `path`, if it was entered.
    pub fn position(&self, path: &ResultPath) -> Option<NodeId> {
        self.memo.get(path)
    }

    pub fn finish(self) -> TraversalIr {
        self.builder.build()
    }

    fn visit(&mut self, field: &FieldContext<'_>) -> Result<MockValue, TranslateError> {
        let Some(output) = field.output_type() else {
            return Ok(MockValue::Null);
        };
        let parent_path = field.parent_path();
        self.fan_out(&parent_path, field.parent.is_none())?;
        let Some(anchor) = self.memo.get(&parent_path) else {
            tracing::warn!(path = %field.path, parent = %parent_path, "parent was never entered; skipping");
            return Ok(MockValue::Null);
        };
        self.builder.goto_index(anchor)?;

        match output.kind() {
            TypeKind::Object | TypeKind::Interface => self.enter(field, output),
            TypeKind::Scalar | TypeKind::Enum => self.project(field, output),
            TypeKind::InputObject => Ok(MockValue::Null),
        }
    }

    /// Make the node at `parent_path` a fan-out point.
    ///
    /// The root only becomes one when a second root field arrives, so a
    /// single root field hangs directly off `Start`.
    fn fan_out(&mut self, parent_path: &ResultPath, at_root: bool) -> Result<(), TranslateError> {
        let Some(at) = self.memo.get(parent_path) else {
            return Ok(());
        };
        let Some(node) = self.builder.node(at) else {
            return Ok(());
        };
        if node.is_quantifier() || (at_root && node.next().is_empty()) {
            return Ok(());
        }
        self.builder.goto_index(at)?;
        let quantifier = self.builder.add_quantifier(QuantifierKind::All)?;
        self.memo.record(parent_path, quantifier);
        Ok(())
    }

    fn enter(&mut self, field: &FieldContext<'_>, target: &TypeDef) -> Result<MockValue, TranslateError> {
        let accessor = self.accessor;
        let entity = accessor
            .entity(&target.name)
            .ok_or_else(|| unknown_element("entity type", &target.name, field.path))?;
        let tag = field.definition.name.as_str();

        if field.parent.is_some() {
            if let Some(relation) = accessor.relation(tag) {
                let direction = direction(relation, &field.parent_type.name);
                self.builder.enter_relation(&relation.r_type, direction, tag)?;
            }
        }
        let id = match concrete_id(entity, field.arguments) {
            Some(id) => self.builder.enter_concrete_entity(
                id,
                display_name(entity, field.arguments),
                &entity.name,
                tag,
            )?,
            None => self.builder.enter_entity(tag, &entity.name)?,
        };
        self.memo.record(field.path, id);
        tracing::debug!(path = %field.path, entity = %entity.name, %id, "entered");

        if let Some(clause) = field.arguments.get(WHERE_ARGUMENT).filter(|v| !v.is_null()) {
            self.filter(field, entity, id, clause)?;
        }
        Ok(MockValue::Object)
    }

    fn project(&mut self, field: &FieldContext<'_>, output: &TypeDef) -> Result<MockValue, TranslateError> {
        let name = field.definition.name.as_str();
        let property = self
            .accessor
            .property(name)
            .ok_or_else(|| unknown_element("property", name, field.path))?;
        let id = self.builder.add_property(&property.p_type, PropertyPayload::IDENTITY)?;
        tracing::trace!(path = %field.path, %id, "projected");
        Ok(mock::leaf(output, name))
    }

    /// Attach the where clause `value` to the entity just entered.
    fn filter(
        &mut self,
        field: &FieldContext<'_>,
        entity: &EntityType,
        entered: NodeId,
        value: &Json,
    ) -> Result<(), TranslateError> {
        let site = format!("{}({WHERE_ARGUMENT})", field.path);
        let clause = WhereClause::decode(value, &site)?;
        let unknown = clause.unknown_operands(|operand| entity.has_property(operand));
        if !unknown.is_empty() {
            return Err(TranslateError::UnknownConstraintOperand {
                operands: unknown,
                entity: entity.name.clone(),
                path: field.path.to_string(),
            });
        }

        // Nearest enclosing quantifier, or a new one under the entity.
        self.builder.goto_index(entered)?;
        let scope = match self.builder.ascend_until(|_, node| node.is_quantifier())? {
            Some(quantifier) => quantifier,
            None => {
                self.builder.goto_index(entered)?;
                let quantifier = self.builder.add_quantifier(QuantifierKind::All)?;
                self.memo.record(field.path, quantifier);
                quantifier
            }
        };
        self.builder.goto_index(scope)?;

        let accessor = self.accessor;
        let quantifier = clause.quantifier;
        let fields = clause.constraints.into_iter().map(|(operand, constraint)| {
            let p_type = accessor
                .property(&operand)
                .map_or(operand, |p| p.p_type.clone());
            (p_type, Some(constraint))
        });
        let group = self.builder.add_property_group(fields, quantifier)?;
        tracing::debug!(path = %field.path, %scope, %group, quantifier = quantifier.as_str(), "filtered");
        Ok(())
    }
}

impl FieldResolver for TraversalStrategy<'_> {
    type Error = TranslateError;

    fn resolve(&mut self, field: &FieldContext<'_>) -> Result<MockValue, Self::Error> {
        self.visit(field)
    }
}

/// `R` along the declared direction, `L` when `from` only appears as the
/// target side, `RL` when the relationship has no direction.
pub(crate) fn direction(relation: &RelationshipType, from: &str) -> Direction {
    if !relation.directional {
        return Direction::RL;
    }
    if relation.pair_from(from).is_none() && relation.pair_to(from).is_some() {
        Direction::L
    } else {
        Direction::R
    }
}

fn concrete_id(entity: &EntityType, arguments: &JsonMap) -> Option<String> {
    match arguments.get(entity.id_field())? {
        Json::String(id) => Some(id.clone()),
        Json::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn display_name(entity: &EntityType, arguments: &JsonMap) -> Option<String> {
    entity
        .display
        .iter()
        .find_map(|field| arguments.get(field).and_then(Json::as_str))
        .map(str::to_owned)
}

fn unknown_element(kind: &'static str, name: &str, path: &ResultPath) -> TranslateError {
    TranslateError::UnknownOntologyElement {
        kind,
        name: name.to_owned(),
        path: path.to_string(),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;

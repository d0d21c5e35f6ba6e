//! Cursor-driven construction of a [`TraversalIr`].

use crate::constraint::{Constraint, PropertyPayload};
use crate::node::{
    ConcreteId, Direction, EntityRef, NextSlot, Node, NodeId, Property, PropertyGroup,
    PropertyScope, Quantifier, QuantifierKind, Relation, Start,
};
use crate::traversal::{Slot, TraversalIr};

/// Misuse of the builder. These indicate a bug in the caller, not bad input.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuilderError {
    #[error("`{op}` called before `start()`")]
    NotStarted { op: &'static str },
    #[error("`start()` called twice")]
    AlreadyStarted,
    #[error("no node with id {0}")]
    UnknownNode(NodeId),
    #[error("`{op}` cannot insert below leaf node {at}")]
    LeafCursor { op: &'static str, at: NodeId },
    #[error("node id space exhausted")]
    Exhausted,
}

/// Builder for an in-progress Traversal IR.
///
/// Owns the node arena and the cursor. Consumed by
/// [`build`](IrBuilder::build) to produce the immutable [`TraversalIr`].
///
/// # Design
///
/// Every insertion goes below the cursor. `enter_*` operations move the
/// cursor onto the new step; `add_*` operations attach leaves and leave the
/// cursor where it was. Linking into the forward chain ("populate next") is
/// the same for every chainable node: a quantifier appends the new ID to its
/// fan-out list, anything else takes it as its single successor.
#[derive(Debug, Default)]
pub struct IrBuilder {
    slots: Vec<Slot>,
    current: Option<NodeId>,
    name: Option<String>,
    ontology: Option<String>,
}

impl IrBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Label the IR with the query operation's name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Label the IR with the ontology it is built against.
    #[must_use]
    pub fn with_ontology(mut self, ontology: impl Into<String>) -> Self {
        self.ontology = Some(ontology.into());
        self
    }

    pub fn is_started(&self) -> bool {
        self.current.is_some()
    }

    /// The cursor, once started.
    pub fn current(&self) -> Option<NodeId> {
        self.current
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.index()).map(|slot| &slot.node)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots.get(id.index()).and_then(|slot| slot.parent)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    // ── Steps ───────────────────────────────────────────────────────

    /// Insert the root `Start` node and put the cursor on it.
    pub fn start(&mut self) -> Result<NodeId, BuilderError> {
        if self.is_started() {
            return Err(BuilderError::AlreadyStarted);
        }
        let id = self.alloc(Node::Start(Start::default()), None)?;
        self.current = Some(id);
        Ok(id)
    }

    /// Enter a typed entity step below the cursor.
    pub fn enter_entity(
        &mut self,
        tag: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Result<NodeId, BuilderError> {
        self.enter(
            "enter_entity",
            Node::Entity(EntityRef {
                tag: tag.into(),
                type_name: type_name.into(),
                concrete: None,
                next: None,
            }),
        )
    }

    /// Enter a step addressing one specific entity by ID.
    pub fn enter_concrete_entity(
        &mut self,
        id: impl Into<String>,
        display_name: Option<String>,
        type_name: impl Into<String>,
        tag: impl Into<String>,
    ) -> Result<NodeId, BuilderError> {
        self.enter(
            "enter_concrete_entity",
            Node::Entity(EntityRef {
                tag: tag.into(),
                type_name: type_name.into(),
                concrete: Some(ConcreteId {
                    id: id.into(),
                    display_name,
                }),
                next: None,
            }),
        )
    }

    /// Enter a relationship step below the cursor.
    pub fn enter_relation(
        &mut self,
        rel_type: impl Into<String>,
        direction: Direction,
        tag: impl Into<String>,
    ) -> Result<NodeId, BuilderError> {
        self.enter(
            "enter_relation",
            Node::Relation(Relation {
                rel_type: rel_type.into(),
                direction,
                tag: tag.into(),
                next: None,
            }),
        )
    }

    // ── Leaves ──────────────────────────────────────────────────────

    /// Attach an entity property below the cursor. The cursor stays put.
    pub fn add_property(
        &mut self,
        p_type: impl Into<String>,
        payload: PropertyPayload,
    ) -> Result<NodeId, BuilderError> {
        self.attach_property("add_property", PropertyScope::Entity, p_type.into(), payload)
    }

    /// Attach a relation property below the cursor. The cursor stays put.
    pub fn add_relation_property(
        &mut self,
        p_type: impl Into<String>,
        payload: PropertyPayload,
    ) -> Result<NodeId, BuilderError> {
        self.attach_property(
            "add_relation_property",
            PropertyScope::Relation,
            p_type.into(),
            payload,
        )
    }

    /// Attach a property group below the cursor, one child property per
    /// field. A field without a constraint is projected as-is.
    pub fn add_property_group<I>(
        &mut self,
        fields: I,
        quantifier: QuantifierKind,
    ) -> Result<NodeId, BuilderError>
    where
        I: IntoIterator<Item = (String, Option<Constraint>)>,
    {
        let at = self.insertion_point("add_property_group")?;
        let group = self.alloc(
            Node::PropertyGroup(PropertyGroup {
                quantifier,
                children: Vec::new(),
            }),
            Some(at),
        )?;
        let mut children = Vec::new();
        for (p_type, constraint) in fields {
            let child = self.alloc(
                Node::Property(Property {
                    scope: PropertyScope::Entity,
                    p_type,
                    payload: PropertyPayload::from(constraint),
                }),
                Some(group),
            )?;
            children.push(child);
        }
        if let Node::PropertyGroup(g) = &mut self.slots[group.index()].node {
            g.children = children;
        }
        self.link_fan_out(at, group);
        tracing::trace!(%group, %at, quantifier = quantifier.as_str(), "property group");
        Ok(group)
    }

    // ── Scopes ──────────────────────────────────────────────────────

    /// Splice a quantifier in at the cursor and move the cursor onto it.
    ///
    /// The quantifier becomes the cursor's successor. When the cursor is a
    /// linear step that already had a successor, that successor moves
    /// under the new quantifier, so later insertions fan out next to it.
    pub fn add_quantifier(&mut self, kind: QuantifierKind) -> Result<NodeId, BuilderError> {
        let at = self.insertion_point("add_quantifier")?;
        let displaced = match &self.slots[at.index()].node {
            Node::Quantifier(_) => None,
            node => node.next().first().copied(),
        };
        let id = self.alloc(
            Node::Quantifier(Quantifier {
                kind,
                next: displaced.into_iter().collect(),
            }),
            Some(at),
        )?;
        self.populate_next(at, id);
        if let Some(moved) = displaced {
            self.slots[moved.index()].parent = Some(id);
            tracing::debug!(%id, %moved, "quantifier spliced above existing successor");
        }
        self.current = Some(id);
        Ok(id)
    }

    // ── Cursor ──────────────────────────────────────────────────────

    /// Move the cursor to an existing node.
    pub fn goto_index(&mut self, id: NodeId) -> Result<(), BuilderError> {
        if !self.is_started() {
            return Err(BuilderError::NotStarted { op: "goto_index" });
        }
        if self.node(id).is_none() {
            return Err(BuilderError::UnknownNode(id));
        }
        self.current = Some(id);
        Ok(())
    }

    /// Walk from the cursor up through parent links and return the first
    /// node satisfying `predicate`. `Ok(None)` once the root is passed.
    pub fn ascend_until<P>(&self, mut predicate: P) -> Result<Option<NodeId>, BuilderError>
    where
        P: FnMut(NodeId, &Node) -> bool,
    {
        let mut cursor = Some(
            self.current
                .ok_or(BuilderError::NotStarted { op: "ascend_until" })?,
        );
        while let Some(id) = cursor {
            let slot = &self.slots[id.index()];
            if predicate(id, &slot.node) {
                return Ok(Some(id));
            }
            cursor = slot.parent;
        }
        Ok(None)
    }

    /// Freeze the arena.
    pub fn build(self) -> TraversalIr {
        let ir = TraversalIr::new(self.name, self.ontology, self.slots);
        debug_assert!(
            crate::validate::check(&ir).is_empty(),
            "builder produced a malformed IR: {:?}",
            crate::validate::check(&ir)
        );
        ir
    }

    // ── Internals ───────────────────────────────────────────────────

    fn enter(&mut self, op: &'static str, node: Node) -> Result<NodeId, BuilderError> {
        let at = self.insertion_point(op)?;
        let id = self.alloc(node, Some(at))?;
        self.populate_next(at, id);
        self.current = Some(id);
        Ok(id)
    }

    fn attach_property(
        &mut self,
        op: &'static str,
        scope: PropertyScope,
        p_type: String,
        payload: PropertyPayload,
    ) -> Result<NodeId, BuilderError> {
        let at = self.insertion_point(op)?;
        let id = self.alloc(
            Node::Property(Property {
                scope,
                p_type,
                payload,
            }),
            Some(at),
        )?;
        self.link_fan_out(at, id);
        Ok(id)
    }

    /// The cursor, if it can take children.
    fn insertion_point(&self, op: &'static str) -> Result<NodeId, BuilderError> {
        let at = self.current.ok_or(BuilderError::NotStarted { op })?;
        match self.slots[at.index()].node {
            Node::Property(_) | Node::PropertyGroup(_) => Err(BuilderError::LeafCursor { op, at }),
            _ => Ok(at),
        }
    }

    fn alloc(&mut self, node: Node, parent: Option<NodeId>) -> Result<NodeId, BuilderError> {
        let raw = u32::try_from(self.slots.len()).map_err(|_| BuilderError::Exhausted)?;
        let id = NodeId::new(raw);
        tracing::trace!(%id, kind = node.kind_name(), parent = ?parent, "insert");
        self.slots.push(Slot { node, parent });
        Ok(id)
    }

    fn populate_next(&mut self, at: NodeId, id: NodeId) {
        match self.slots[at.index()].node.next_slot() {
            Some(NextSlot::Fan(next)) => next.push(id),
            Some(NextSlot::Single(next)) => *next = Some(id),
            None => {}
        }
    }

    /// Leaves only join the forward chain of a quantifier.
    fn link_fan_out(&mut self, at: NodeId, id: NodeId) {
        if let Some(NextSlot::Fan(next)) = self.slots[at.index()].node.next_slot() {
            next.push(id);
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]

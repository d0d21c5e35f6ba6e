//! Traversal IR nodes.
//!
//! One closed sum type, [`Node`], with a payload struct per variant. Nodes
//! never own each other: every edge is a [`NodeId`] into the arena that owns
//! them (see [`TraversalIr`](crate::TraversalIr)).

use std::fmt;

use crate::constraint::PropertyPayload;

// ── ID newtype ──────────────────────────────────────────────────────

/// Node ID within one Traversal IR.
///
/// IDs are issued sequentially from 0 (the `Start` node) by the builder and
/// double as the node's arena index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// The root `Start` node of every IR.
    pub const START: NodeId = NodeId(0);

    /// Create a node ID from a raw index.
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw `u32` value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as `usize` (for indexing into `Vec`s).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Enumerations ────────────────────────────────────────────────────

/// Direction a relation is traversed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Against the declared direction (side B to side A).
    L,
    /// Along the declared direction (side A to side B).
    R,
    /// Either way.
    RL,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::L => "L",
            Direction::R => "R",
            Direction::RL => "RL",
        }
    }
}

/// Boolean semantics of a quantifier or property group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QuantifierKind {
    /// Conjunction: every branch must match.
    All,
    /// Disjunction: at least one branch must match.
    Some,
}

impl QuantifierKind {
    pub fn as_str(self) -> &'static str {
        match self {
            QuantifierKind::All => "ALL",
            QuantifierKind::Some => "SOME",
        }
    }
}

/// Which kind of step a property hangs off.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropertyScope {
    Entity,
    Relation,
}

// ── Node payloads ───────────────────────────────────────────────────

/// Root of the traversal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Start {
    pub next: Option<NodeId>,
}

/// Identity of a concrete (id-addressed) entity.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConcreteId {
    pub id: String,
    pub display_name: Option<String>,
}

/// An entity step: "an entity of type `type_name`", or a specific one when
/// `concrete` is set.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityRef {
    pub tag: String,
    pub type_name: String,
    pub concrete: Option<ConcreteId>,
    pub next: Option<NodeId>,
}

impl EntityRef {
    pub fn is_concrete(&self) -> bool {
        self.concrete.is_some()
    }
}

/// A relationship step between two entity steps.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Relation {
    pub rel_type: String,
    pub direction: Direction,
    pub tag: String,
    pub next: Option<NodeId>,
}

/// A property of the enclosing entity or relation, filtered or projected.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Property {
    pub scope: PropertyScope,
    pub p_type: String,
    pub payload: PropertyPayload,
}

/// A set of properties evaluated together under one quantifier.
///
/// `children` are `Property` nodes whose IDs directly follow the group's.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PropertyGroup {
    pub quantifier: QuantifierKind,
    pub children: Vec<NodeId>,
}

/// Fan-out point: the traversal continues through every node in `next`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quantifier {
    pub kind: QuantifierKind,
    pub next: Vec<NodeId>,
}

// ── Node ────────────────────────────────────────────────────────────

/// A Traversal IR node.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Node {
    Start(Start),
    Entity(EntityRef),
    Relation(Relation),
    Property(Property),
    PropertyGroup(PropertyGroup),
    Quantifier(Quantifier),
}

/// Mutable view of a node's `next` slot.
pub(crate) enum NextSlot<'a> {
    Single(&'a mut Option<NodeId>),
    Fan(&'a mut Vec<NodeId>),
}

impl Node {
    /// Short variant name, used in logs and the printer.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Start(_) => "Start",
            Node::Entity(e) if e.is_concrete() => "Concrete",
            Node::Entity(_) => "Entity",
            Node::Relation(_) => "Rel",
            Node::Property(p) if p.scope == PropertyScope::Relation => "RelProp",
            Node::Property(_) => "Prop",
            Node::PropertyGroup(_) => "Group",
            Node::Quantifier(_) => "Quant",
        }
    }

    pub fn is_quantifier(&self) -> bool {
        matches!(self, Node::Quantifier(_))
    }

    /// Entity and relation nodes: the steps of a traversal.
    pub fn is_step(&self) -> bool {
        matches!(self, Node::Entity(_) | Node::Relation(_))
    }

    pub fn as_entity(&self) -> Option<&EntityRef> {
        match self {
            Node::Entity(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_quantifier(&self) -> Option<&Quantifier> {
        match self {
            Node::Quantifier(q) => Some(q),
            _ => None,
        }
    }

    /// The declared tag of entity and relation steps.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Node::Entity(e) => Some(&e.tag),
            Node::Relation(r) => Some(&r.tag),
            _ => None,
        }
    }

    /// Continuations reachable through `next`, in order.
    pub fn next(&self) -> &[NodeId] {
        match self {
            Node::Start(Start { next })
            | Node::Entity(EntityRef { next, .. })
            | Node::Relation(Relation { next, .. }) => next.as_slice(),
            Node::Quantifier(q) => &q.next,
            Node::Property(_) | Node::PropertyGroup(_) => &[],
        }
    }

    /// `None` for leaves (properties and groups).
    pub(crate) fn next_slot(&mut self) -> Option<NextSlot<'_>> {
        match self {
            Node::Start(Start { next })
            | Node::Entity(EntityRef { next, .. })
            | Node::Relation(Relation { next, .. }) => Some(NextSlot::Single(next)),
            Node::Quantifier(q) => Some(NextSlot::Fan(&mut q.next)),
            Node::Property(_) | Node::PropertyGroup(_) => None,
        }
    }
}

//! The frozen Traversal IR.

use rustc_hash::FxHashMap;

use crate::node::{Node, NodeId};

/// One arena entry: a node and its parent edge.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Slot {
    pub node: Node,
    /// `None` only for the `Start` node.
    pub parent: Option<NodeId>,
}

/// An immutable Traversal IR, produced by
/// [`IrBuilder::build`](crate::IrBuilder::build).
///
/// The arena is indexed by [`NodeId`]; node 0 is always `Start`. Nodes are
/// never removed, so every ID handed out by the builder resolves.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TraversalIr {
    name: Option<String>,
    ontology: Option<String>,
    slots: Vec<Slot>,
    #[cfg_attr(feature = "serde", serde(skip))]
    tags: FxHashMap<String, NodeId>,
}

impl TraversalIr {
    pub(crate) fn new(name: Option<String>, ontology: Option<String>, slots: Vec<Slot>) -> Self {
        let mut tags = FxHashMap::default();
        for (index, slot) in slots.iter().enumerate() {
            if let Some(tag) = slot.node.tag() {
                // First declaration wins; later steps reusing a tag stay reachable by ID.
                tags.entry(tag.to_owned())
                    .or_insert_with(|| NodeId::new(index_to_raw(index)));
            }
        }
        TraversalIr {
            name,
            ontology,
            slots,
            tags,
        }
    }

    /// Name of the query operation this IR was built from, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name of the ontology the IR is labelled against.
    pub fn ontology(&self) -> Option<&str> {
        self.ontology.as_deref()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn root(&self) -> NodeId {
        NodeId::START
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.index()).map(|slot| &slot.node)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots.get(id.index()).and_then(|slot| slot.parent)
    }

    /// The first entity or relation step declared with `tag`.
    pub fn find_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.tags.get(tag).copied()
    }

    /// Children of `id` through parent links, in ID order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.iter()
            .filter(|&(child, _)| self.parent(child) == Some(id))
            .map(|(child, _)| child)
            .collect()
    }

    /// `id` followed by each ancestor up to and including `Start`.
    ///
    /// Empty when `id` does not exist.
    pub fn path_to_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut cursor = self.node(id).map(|_| id);
        while let Some(current) = cursor {
            path.push(current);
            // No path is longer than the arena unless the parent links cycle.
            if path.len() > self.slots.len() {
                break;
            }
            cursor = self.parent(current);
        }
        path
    }

    /// Nodes in ID order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, slot)| (NodeId::new(index_to_raw(index)), &slot.node))
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }
}

/// Arena indices always fit: the builder refuses to grow past `u32::MAX`.
#[expect(
    clippy::cast_possible_truncation,
    reason = "arena length is bounded by the builder's u32 counter"
)]
pub(crate) fn index_to_raw(index: usize) -> u32 {
    index as u32
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]

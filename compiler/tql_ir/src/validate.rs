//! Structural invariant checks for a built [`TraversalIr`].
//!
//! Run by [`IrBuilder::build`](crate::IrBuilder::build) in debug builds and
//! by the test suites. Collects every violation instead of stopping at the
//! first one.

use crate::node::{Node, NodeId};
use crate::traversal::TraversalIr;

/// A broken IR invariant.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("node 0 is not a parentless Start node")]
    MissingStart,
    #[error("node {0} is a second Start node")]
    ExtraStart(NodeId),
    #[error("node {0} has no parent")]
    Orphan(NodeId),
    #[error("node {0} does not reach Start through its parents")]
    Unrooted(NodeId),
    #[error("node {from} links to missing node {to}")]
    DanglingLink { from: NodeId, to: NodeId },
    #[error("node {from} links to {to}, whose parent is {actual:?}")]
    LinkParentMismatch {
        from: NodeId,
        to: NodeId,
        actual: Option<NodeId>,
    },
    #[error("group {0} members do not directly follow it")]
    GroupNotContiguous(NodeId),
    #[error("group {group} member {member} is not a property owned by the group")]
    GroupMember { group: NodeId, member: NodeId },
    #[error("leaf {leaf} has child {child}")]
    LeafWithChild { leaf: NodeId, child: NodeId },
}

/// Check every invariant; an empty result means the IR is well formed.
pub fn check(ir: &TraversalIr) -> Vec<Violation> {
    let mut violations = Vec::new();

    match ir.node(NodeId::START) {
        Some(Node::Start(_)) if ir.parent(NodeId::START).is_none() => {}
        _ => violations.push(Violation::MissingStart),
    }

    for (id, node) in ir.iter().skip(1) {
        if matches!(node, Node::Start(_)) {
            violations.push(Violation::ExtraStart(id));
        }
        match ir.parent(id) {
            None => violations.push(Violation::Orphan(id)),
            Some(parent) => {
                check_parent_kind(ir, parent, id, &mut violations);
                if ir.path_to_root(id).last() != Some(&NodeId::START) {
                    violations.push(Violation::Unrooted(id));
                }
            }
        }
    }

    for (id, node) in ir.iter() {
        for &to in node.next() {
            check_link(ir, id, to, &mut violations);
        }
        if let Node::PropertyGroup(group) = node {
            let contiguous = group
                .children
                .iter()
                .enumerate()
                .all(|(offset, child)| child.index() == id.index() + offset + 1);
            if !contiguous {
                violations.push(Violation::GroupNotContiguous(id));
            }
            for &member in &group.children {
                let owned = matches!(ir.node(member), Some(Node::Property(_)))
                    && ir.parent(member) == Some(id);
                if !owned {
                    violations.push(Violation::GroupMember { group: id, member });
                }
            }
        }
    }

    violations
}

fn check_parent_kind(ir: &TraversalIr, parent: NodeId, child: NodeId, out: &mut Vec<Violation>) {
    match ir.node(parent) {
        Some(Node::Property(_)) => out.push(Violation::LeafWithChild {
            leaf: parent,
            child,
        }),
        Some(Node::PropertyGroup(group)) if !group.children.contains(&child) => {
            out.push(Violation::GroupMember {
                group: parent,
                member: child,
            });
        }
        Some(_) => {}
        None => out.push(Violation::DanglingLink {
            from: child,
            to: parent,
        }),
    }
}

fn check_link(ir: &TraversalIr, from: NodeId, to: NodeId, out: &mut Vec<Violation>) {
    if ir.node(to).is_none() {
        out.push(Violation::DanglingLink { from, to });
        return;
    }
    let actual = ir.parent(to);
    if actual != Some(from) {
        out.push(Violation::LinkParentMismatch { from, to, actual });
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]

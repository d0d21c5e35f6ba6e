//! Structural pretty-printer for the Traversal IR.
//!
//! [`describe`] turns an IR into a [`Description`]: a tree of labelled nodes
//! following parent links. A description prints as an indented tree and
//! parses back from that text, so expected IR shapes in tests can be written
//! as plain strings:
//!
//! ```text
//! Start[0]
//! └── Entity[1]:Book#book
//!     └── Quant[2]:ALL{3,4}
//!         ├── Prop[3]:title<Identity>
//!         └── Group[4]:SOME{5,6}
//!             ├── Prop[5]:name<like,jhone>
//!             └── Prop[6]:description<notEmpty,>
//! ```
//!
//! An empty constraint expression prints the same as a missing one and
//! parses back as missing.

use std::fmt;
use std::str::FromStr;

use tql_stack::ensure_sufficient_stack;

use crate::constraint::{Constraint, ConstraintOp, Projection, PropertyPayload};
use crate::node::{ConcreteId, Direction, Node, NodeId, PropertyScope, QuantifierKind};
use crate::traversal::TraversalIr;

/// Node content as shown by the printer (everything but the edges, which the
/// tree shape carries).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Label {
    Start,
    Entity {
        type_name: String,
        tag: String,
        concrete: Option<ConcreteId>,
    },
    Relation {
        rel_type: String,
        direction: Direction,
        tag: String,
    },
    Property {
        scope: PropertyScope,
        p_type: String,
        payload: PropertyPayload,
    },
    Group {
        kind: QuantifierKind,
        members: Vec<NodeId>,
    },
    Quantifier {
        kind: QuantifierKind,
        next: Vec<NodeId>,
    },
}

impl From<&Node> for Label {
    fn from(node: &Node) -> Self {
        match node {
            Node::Start(_) => Label::Start,
            Node::Entity(e) => Label::Entity {
                type_name: e.type_name.clone(),
                tag: e.tag.clone(),
                concrete: e.concrete.clone(),
            },
            Node::Relation(r) => Label::Relation {
                rel_type: r.rel_type.clone(),
                direction: r.direction,
                tag: r.tag.clone(),
            },
            Node::Property(p) => Label::Property {
                scope: p.scope,
                p_type: p.p_type.clone(),
                payload: normalize(&p.payload),
            },
            Node::PropertyGroup(g) => Label::Group {
                kind: g.quantifier,
                members: g.children.clone(),
            },
            Node::Quantifier(q) => Label::Quantifier {
                kind: q.kind,
                next: q.next.clone(),
            },
        }
    }
}

fn normalize(payload: &PropertyPayload) -> PropertyPayload {
    match payload {
        PropertyPayload::Constraint(c) if c.expression.as_deref() == Some("") => {
            PropertyPayload::Constraint(Constraint::unary(c.op))
        }
        other => other.clone(),
    }
}

/// One node of a [`Description`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Described {
    pub id: NodeId,
    pub label: Label,
    pub children: Vec<Described>,
}

/// Printable, parseable structural view of a Traversal IR.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Description {
    pub root: Described,
}

/// Describe `ir`, children ordered by ID.
///
/// Returns `None` for an empty arena.
pub fn describe(ir: &TraversalIr) -> Option<Description> {
    let mut children: Vec<Vec<NodeId>> = vec![Vec::new(); ir.len()];
    for (id, _) in ir.iter() {
        if let Some(parent) = ir.parent(id) {
            if let Some(list) = children.get_mut(parent.index()) {
                list.push(id);
            }
        }
    }
    let root = describe_node(ir, &children, ir.root(), 0)?;
    Some(Description { root })
}

fn describe_node(
    ir: &TraversalIr,
    children: &[Vec<NodeId>],
    id: NodeId,
    depth: usize,
) -> Option<Described> {
    ensure_sufficient_stack(|| describe_node_inner(ir, children, id, depth))
}

fn describe_node_inner(
    ir: &TraversalIr,
    children: &[Vec<NodeId>],
    id: NodeId,
    depth: usize,
) -> Option<Described> {
    let node = ir.node(id)?;
    // Parents precede children, so depth can never exceed the arena size.
    if depth > ir.len() {
        return None;
    }
    let kids = children
        .get(id.index())
        .map(|ids| {
            ids.iter()
                .filter_map(|&child| describe_node(ir, children, child, depth + 1))
                .collect()
        })
        .unwrap_or_default();
    Some(Described {
        id,
        label: Label::from(node),
        children: kids,
    })
}

// ── Printing ────────────────────────────────────────────────────────

fn write_ids(f: &mut fmt::Formatter<'_>, ids: &[NodeId]) -> fmt::Result {
    f.write_str("{")?;
    for (i, id) in ids.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{id}")?;
    }
    f.write_str("}")
}

impl fmt::Display for Described {
    /// The node's own label line, without children.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.id;
        match &self.label {
            Label::Start => write!(f, "Start[{id}]"),
            Label::Entity {
                type_name,
                tag,
                concrete: None,
            } => write!(f, "Entity[{id}]:{type_name}#{tag}"),
            Label::Entity {
                type_name,
                tag,
                concrete: Some(concrete),
            } => {
                write!(f, "Concrete[{id}]:{type_name}#{tag}({}", concrete.id)?;
                if let Some(name) = &concrete.display_name {
                    write!(f, "|{name}")?;
                }
                f.write_str(")")
            }
            Label::Relation {
                rel_type,
                direction,
                tag,
            } => write!(f, "Rel[{id}]:{rel_type}({})#{tag}", direction.as_str()),
            Label::Property {
                scope,
                p_type,
                payload,
            } => {
                let kind = match scope {
                    PropertyScope::Entity => "Prop",
                    PropertyScope::Relation => "RelProp",
                };
                write!(f, "{kind}[{id}]:{p_type}<{payload}>")
            }
            Label::Group { kind, members } => {
                write!(f, "Group[{id}]:{}", kind.as_str())?;
                write_ids(f, members)
            }
            Label::Quantifier { kind, next } => {
                write!(f, "Quant[{id}]:{}", kind.as_str())?;
                write_ids(f, next)
            }
        }
    }
}

fn write_tree(f: &mut fmt::Formatter<'_>, node: &Described, prefix: &str) -> fmt::Result {
    ensure_sufficient_stack(|| write_tree_inner(f, node, prefix))
}

fn write_tree_inner(f: &mut fmt::Formatter<'_>, node: &Described, prefix: &str) -> fmt::Result {
    let count = node.children.len();
    for (i, child) in node.children.iter().enumerate() {
        let last = i + 1 == count;
        let (branch, indent) = if last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        writeln!(f, "{prefix}{branch}{child}")?;
        write_tree(f, child, &format!("{prefix}{indent}"))?;
    }
    Ok(())
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.root)?;
        write_tree(f, &self.root, "")
    }
}

// ── Parsing ─────────────────────────────────────────────────────────

/// A printed description that could not be read back.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct ParseDescriptionError {
    pub line: usize,
    pub message: String,
}

impl FromStr for Description {
    type Err = ParseDescriptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Open nodes along the current branch; entry `i` sits at depth `i`.
        let mut open: Vec<Described> = Vec::new();
        let mut seen_root = false;

        for (index, raw) in s.lines().enumerate() {
            if raw.trim().is_empty() {
                continue;
            }
            let err = |message: String| ParseDescriptionError {
                line: index + 1,
                message,
            };
            let (depth, text) = split_indent(raw);
            if depth == 0 {
                if seen_root {
                    return Err(err("more than one root".to_owned()));
                }
                seen_root = true;
            } else if !seen_root || depth > open.len() {
                return Err(err(format!("unexpected indentation depth {depth}")));
            }
            close_to(&mut open, depth);
            open.push(parse_label(text).map_err(err)?);
        }

        close_to(&mut open, 1);
        open.pop()
            .map(|root| Description { root })
            .ok_or(ParseDescriptionError {
                line: 0,
                message: "empty description".to_owned(),
            })
    }
}

/// Pop nodes at `depth` or deeper, attaching each to its parent.
fn close_to(open: &mut Vec<Described>, depth: usize) {
    while open.len() > depth {
        let Some(done) = open.pop() else { break };
        match open.last_mut() {
            Some(parent) => parent.children.push(done),
            None => {
                open.push(done);
                break;
            }
        }
    }
}

/// Strip the tree-drawing prefix; returns the node depth and its label.
fn split_indent(raw: &str) -> (usize, &str) {
    let mut rest = raw;
    let mut depth = 0;
    loop {
        if let Some(r) = rest.strip_prefix("│   ").or_else(|| rest.strip_prefix("    ")) {
            rest = r;
            depth += 1;
        } else if let Some(r) = rest
            .strip_prefix("├── ")
            .or_else(|| rest.strip_prefix("└── "))
        {
            return (depth + 1, r.trim_end());
        } else {
            return (depth, rest.trim());
        }
    }
}

fn parse_label(text: &str) -> Result<Described, String> {
    let open = text.find('[').ok_or_else(|| format!("missing `[` in `{text}`"))?;
    let close = text.find(']').ok_or_else(|| format!("missing `]` in `{text}`"))?;
    let kind = &text[..open];
    let raw_id = &text[open + 1..close];
    let id = raw_id
        .parse::<u32>()
        .map(NodeId::new)
        .map_err(|_| format!("bad node id `{raw_id}`"))?;
    let body = text[close + 1..].strip_prefix(':').unwrap_or("");

    let label = match kind {
        "Start" => Label::Start,
        "Entity" => {
            let (type_name, tag) = split_once(body, '#')?;
            Label::Entity {
                type_name: type_name.to_owned(),
                tag: tag.to_owned(),
                concrete: None,
            }
        }
        "Concrete" => {
            let (type_name, rest) = split_once(body, '#')?;
            let (tag, inner) = split_once(rest, '(')?;
            let inner = inner
                .strip_suffix(')')
                .ok_or_else(|| format!("missing `)` in `{body}`"))?;
            let (id, display_name) = match inner.split_once('|') {
                Some((id, name)) => (id, Some(name.to_owned())),
                None => (inner, None),
            };
            Label::Entity {
                type_name: type_name.to_owned(),
                tag: tag.to_owned(),
                concrete: Some(ConcreteId {
                    id: id.to_owned(),
                    display_name,
                }),
            }
        }
        "Rel" => {
            let (head, tag) = body
                .rsplit_once('#')
                .ok_or_else(|| format!("missing `#` in `{body}`"))?;
            let (rel_type, dir) = head
                .rsplit_once('(')
                .ok_or_else(|| format!("missing direction in `{body}`"))?;
            let direction = match dir.strip_suffix(')') {
                Some("L") => Direction::L,
                Some("R") => Direction::R,
                Some("RL") => Direction::RL,
                _ => return Err(format!("bad direction in `{body}`")),
            };
            Label::Relation {
                rel_type: rel_type.to_owned(),
                direction,
                tag: tag.to_owned(),
            }
        }
        "Prop" | "RelProp" => {
            let (p_type, rest) = split_once(body, '<')?;
            let payload = rest
                .strip_suffix('>')
                .ok_or_else(|| format!("missing `>` in `{body}`"))?;
            Label::Property {
                scope: if kind == "Prop" {
                    PropertyScope::Entity
                } else {
                    PropertyScope::Relation
                },
                p_type: p_type.to_owned(),
                payload: parse_payload(payload)?,
            }
        }
        "Group" => {
            let (kind, members) = parse_scope(body)?;
            Label::Group { kind, members }
        }
        "Quant" => {
            let (kind, next) = parse_scope(body)?;
            Label::Quantifier { kind, next }
        }
        other => return Err(format!("unknown node kind `{other}`")),
    };

    Ok(Described {
        id,
        label,
        children: Vec::new(),
    })
}

fn split_once(s: &str, at: char) -> Result<(&str, &str), String> {
    s.split_once(at)
        .ok_or_else(|| format!("missing `{at}` in `{s}`"))
}

fn parse_payload(s: &str) -> Result<PropertyPayload, String> {
    if s == "Identity" {
        return Ok(PropertyPayload::Projection(Projection::Identity));
    }
    let (op, expression) = split_once(s, ',')?;
    let op = op.parse::<ConstraintOp>().map_err(|e| e.to_string())?;
    let expression = (!expression.is_empty()).then(|| expression.to_owned());
    Ok(PropertyPayload::Constraint(Constraint::new(op, expression)))
}

fn parse_scope(s: &str) -> Result<(QuantifierKind, Vec<NodeId>), String> {
    let (kind, ids) = split_once(s, '{')?;
    let kind = match kind {
        "ALL" => QuantifierKind::All,
        "SOME" => QuantifierKind::Some,
        other => return Err(format!("unknown quantifier `{other}`")),
    };
    let ids = ids
        .strip_suffix('}')
        .ok_or_else(|| format!("missing `}}` in `{s}`"))?;
    let ids = ids
        .split(',')
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.trim()
                .parse::<u32>()
                .map(NodeId::new)
                .map_err(|_| format!("bad node id `{part}`"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok((kind, ids))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;

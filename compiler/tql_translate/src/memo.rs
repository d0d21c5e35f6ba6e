//! Field path to IR position.

use rustc_hash::FxHashMap;
use tql_graphql::{PathSegment, ResultPath};
use tql_ir::NodeId;

/// Where the builder stands after entering each entity-like field.
///
/// Keys are result paths with list indices dropped, so `/author/books[0]`
/// and `/author/books` share one entry. The root path `/` is the `Start`
/// node until a second root field puts a quantifier there.
#[derive(Debug, Default)]
pub(crate) struct PathMemo {
    positions: FxHashMap<String, NodeId>,
}

impl PathMemo {
    pub(crate) fn get(&self, path: &ResultPath) -> Option<NodeId> {
        self.positions.get(&memo_key(path)).copied()
    }

    pub(crate) fn record(&mut self, path: &ResultPath, id: NodeId) {
        let key = memo_key(path);
        tracing::trace!(path = %key, %id, "memo");
        self.positions.insert(key, id);
    }
}

/// `/author/books[0]/title` becomes `/author/books/title`.
pub(crate) fn memo_key(path: &ResultPath) -> String {
    let mut key = String::new();
    for segment in path.segments() {
        if let PathSegment::Field(name) = segment {
            key.push('/');
            key.push_str(name);
        }
    }
    if key.is_empty() {
        key.push('/');
    }
    key
}

#[cfg(test)]
mod tests;

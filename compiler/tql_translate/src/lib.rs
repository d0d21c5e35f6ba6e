//! GraphQL to Traversal IR translation.
//!
//! A [`TranslationContext`] compiles a GraphQL schema, derives its ontology,
//! and translates queries against both. Translation does not read the query
//! text itself: it runs a mock execution of the query and lets a
//! [`TraversalStrategy`] build the IR from the engine's field callbacks.
//!
//! ```
//! use tql_translate::TranslationContext;
//!
//! let mut context = TranslationContext::new();
//! context.compile(["type Book { title: String } type Query { book: Book }"], "library")?;
//! let ir = context.translate("{ book { title } }")?;
//!
//! let printed = tql_ir::describe(&ir).map(|d| d.to_string()).unwrap_or_default();
//! assert_eq!(
//!     printed,
//!     "Start[0]\n\
//!      └── Entity[1]:Book#book\n    \
//!          └── Quant[2]:ALL{3}\n        \
//!              └── Prop[3]:title<Identity>\n"
//! );
//! # Ok::<(), tql_translate::TranslateError>(())
//! ```

mod context;
mod error;
mod memo;
mod strategy;
mod where_clause;

pub use context::{Compiled, TranslationContext};
pub use error::TranslateError;
pub use strategy::TraversalStrategy;
pub use where_clause::{WhereClause, WHERE_ARGUMENT};

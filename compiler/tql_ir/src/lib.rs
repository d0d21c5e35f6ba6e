//! Traversal IR for the TQL query translator.
//!
//! The Traversal IR is the backend-facing form of a graph query: a forward
//! graph of entity steps, relation steps, properties and quantifiers,
//! rooted at a single `Start` node.
//!
//! # Design Philosophy
//!
//! - **Flatten Everything**: nodes live in one append-only arena and refer
//!   to each other only through [`NodeId`] indices. There are no owning
//!   references between nodes, so cycles cannot be expressed.
//! - **Closed node set**: [`Node`] is a single enum; consumers match on it
//!   exhaustively.
//! - **Build, then freeze**: [`IrBuilder`] is the only way to grow an arena;
//!   [`IrBuilder::build`] consumes it and returns an immutable
//!   [`TraversalIr`].
//!
//! # Example
//!
//! ```
//! use tql_ir::{describe, IrBuilder, PropertyPayload, QuantifierKind};
//!
//! let mut builder = IrBuilder::new();
//! builder.start()?;
//! builder.enter_entity("book", "Book")?;
//! builder.add_quantifier(QuantifierKind::All)?;
//! builder.add_property("title", PropertyPayload::IDENTITY)?;
//! let ir = builder.build();
//!
//! let printed = describe(&ir).map(|d| d.to_string()).unwrap_or_default();
//! assert_eq!(
//!     printed,
//!     "Start[0]\n\
//!      └── Entity[1]:Book#book\n    \
//!          └── Quant[2]:ALL{3}\n        \
//!              └── Prop[3]:title<Identity>\n"
//! );
//! # Ok::<(), tql_ir::BuilderError>(())
//! ```

mod builder;
mod constraint;
mod node;
mod print;
mod traversal;
pub mod validate;

pub use builder::{BuilderError, IrBuilder};
pub use constraint::{Constraint, ConstraintOp, Projection, PropertyPayload, UnknownOperator};
pub use node::{
    ConcreteId, Direction, EntityRef, Node, NodeId, Property, PropertyGroup, PropertyScope,
    Quantifier, QuantifierKind, Relation, Start,
};
pub use print::{describe, Described, Description, Label, ParseDescriptionError};
pub use traversal::{Slot, TraversalIr};

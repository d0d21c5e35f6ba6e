//! GraphQL front end for TQL.
//!
//! Everything a query needs before translation:
//!
//! - [`lexer`] and [`parser`]: source text to [`ast::Document`], for both
//!   schema (SDL) and executable documents.
//! - [`schema`]: merge SDL sources into a checked, indexed [`Schema`].
//! - [`validate`]: report every problem with a query at once.
//! - [`execute`]: walk a query depth first, calling a [`FieldResolver`]
//!   for each field with its definition, path, parent and coerced
//!   arguments.
//!
//! ```
//! use tql_graphql::{Engine, FieldContext, FieldResolver, MockValue, Request, Schema};
//!
//! struct Paths(Vec<String>);
//!
//! impl FieldResolver for Paths {
//!     type Error = std::convert::Infallible;
//!
//!     fn resolve(&mut self, field: &FieldContext<'_>) -> Result<MockValue, Self::Error> {
//!         self.0.push(field.path.to_string());
//!         let leaf = field.output_type().is_some_and(|t| t.kind().is_leaf());
//!         Ok(if leaf { MockValue::Leaf("x".into()) } else { MockValue::Object })
//!     }
//! }
//!
//! let schema = Schema::compile(["type Book { title: String } type Query { book: Book }"]).unwrap();
//! let mut paths = Paths(Vec::new());
//! Engine::new(&schema)
//!     .execute(&Request::new("{ book { title } }"), &mut paths)
//!     .unwrap();
//! assert_eq!(paths.0, ["/book", "/book/title"]);
//! ```

pub mod ast;
pub mod execute;
pub mod lexer;
pub mod parser;
pub mod prelude;
pub mod schema;
pub mod validate;

pub use ast::{Document, OperationKind, TypeRef};
pub use execute::{
    Engine, ExecuteError, FieldContext, FieldResolver, JsonMap, MockValue, ParentField,
    PathSegment, Request, ResultPath,
};
pub use lexer::{Span, SyntaxError};
pub use parser::parse_document;
pub use schema::{FieldDef, InputValue, Schema, SchemaError, TypeBody, TypeDef, TypeKind};
pub use validate::ValidationError;

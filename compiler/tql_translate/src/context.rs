//! Translation context: compiled schema and ontology, shared by requests.
//!
//! Compiling takes `&mut self`; translating takes `&self`. The compiled
//! state is immutable and reference counted, so a caller that needs to
//! translate from several threads takes [`TranslationContext::shared`] and
//! hands the `Arc` out.

use std::sync::Arc;

use tql_graphql::{Engine, ExecuteError, JsonMap, Request, Schema};
use tql_ir::{IrBuilder, TraversalIr};
use tql_ontology::{derive_ontology, Accessor, Ontology};

use crate::error::TranslateError;
use crate::strategy::TraversalStrategy;

/// A schema and the ontology queries against it are translated with.
#[derive(Debug)]
pub struct Compiled {
    schema: Schema,
    accessor: Accessor,
}

impl Compiled {
    /// Compile `sources` (plus the where-clause prelude) and derive an
    /// ontology named `ontology_name` from the result.
    pub fn new<'s, I>(sources: I, ontology_name: &str) -> Result<Self, TranslateError>
    where
        I: IntoIterator<Item = &'s str>,
    {
        let schema = Schema::with_prelude(sources)?;
        let ontology = derive_ontology(ontology_name, &schema)?;
        Ok(Compiled {
            schema,
            accessor: Accessor::new(ontology),
        })
    }

    /// Compile `sources` and pair them with a ready-made ontology.
    pub fn with_ontology<'s, I>(sources: I, ontology: Ontology) -> Result<Self, TranslateError>
    where
        I: IntoIterator<Item = &'s str>,
    {
        Ok(Compiled {
            schema: Schema::with_prelude(sources)?,
            accessor: Accessor::new(ontology),
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn accessor(&self) -> &Accessor {
        &self.accessor
    }

    pub fn ontology(&self) -> &Ontology {
        self.accessor.ontology()
    }

    /// Translate one query into a Traversal IR.
    ///
    /// `operation_name` picks the operation in a document with several and
    /// also names the IR.
    pub fn translate(
        &self,
        query: &str,
        variables: Option<&JsonMap>,
        operation_name: Option<&str>,
    ) -> Result<TraversalIr, TranslateError> {
        let mut builder = IrBuilder::new().with_ontology(self.accessor.name());
        if let Some(name) = operation_name {
            builder = builder.with_name(name);
        }
        let mut strategy = TraversalStrategy::new(&self.accessor, builder)?;

        let request = Request::new(query)
            .with_operation(operation_name)
            .with_variables(variables);
        Engine::new(&self.schema)
            .execute(&request, &mut strategy)
            .map_err(|e| match e {
                ExecuteError::Syntax(e) => TranslateError::QuerySyntax(e),
                ExecuteError::Validation(errors) => TranslateError::validation(&errors),
                ExecuteError::Resolver(e) => e,
            })?;

        let ir = strategy.finish();
        tracing::debug!(nodes = ir.len(), ontology = %self.accessor.name(), "translated");
        Ok(ir)
    }
}

/// Entry point for translation. Holds at most one compiled schema.
#[derive(Debug, Default)]
pub struct TranslationContext {
    compiled: Option<Arc<Compiled>>,
}

impl TranslationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a schema and derive its ontology, replacing whatever was
    /// compiled before. On failure the previous state is kept.
    pub fn compile<'s, I>(&mut self, sources: I, ontology_name: &str) -> Result<(), TranslateError>
    where
        I: IntoIterator<Item = &'s str>,
    {
        self.compiled = Some(Arc::new(Compiled::new(sources, ontology_name)?));
        Ok(())
    }

    /// Like [`compile`](Self::compile), with an ontology loaded elsewhere.
    pub fn compile_with_ontology<'s, I>(
        &mut self,
        sources: I,
        ontology: Ontology,
    ) -> Result<(), TranslateError>
    where
        I: IntoIterator<Item = &'s str>,
    {
        self.compiled = Some(Arc::new(Compiled::with_ontology(sources, ontology)?));
        Ok(())
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }

    /// The compiled state, for translating off this context.
    pub fn shared(&self) -> Option<Arc<Compiled>> {
        self.compiled.clone()
    }

    /// Drop the compiled state.
    pub fn reset(&mut self) {
        self.compiled = None;
    }

    pub fn translate(&self, query: &str) -> Result<TraversalIr, TranslateError> {
        self.translate_with(query, None, None)
    }

    pub fn translate_with(
        &self,
        query: &str,
        variables: Option<&JsonMap>,
        operation_name: Option<&str>,
    ) -> Result<TraversalIr, TranslateError> {
        self.compiled
            .as_deref()
            .ok_or(TranslateError::PrerequisiteMissing)?
            .translate(query, variables, operation_name)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;

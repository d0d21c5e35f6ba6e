//! The `translate` command: one query to one Traversal IR.

use tql_graphql::JsonMap;
use tql_ir::TraversalIr;
use tql_ontology::Ontology;
use tql_translate::TranslationContext;

use super::options::{OutputFormat, TranslateOptions};
use super::{read_json, read_schemas};
use crate::report::{diagnose, CommandError, SourceFile};

/// Translate the `--query` file against the schema inputs and print the IR.
pub fn translate(options: &TranslateOptions) -> Result<String, CommandError> {
    let Some(query_path) = &options.query else {
        return Err(CommandError::Usage(
            "missing query file (--query=<file>)".to_owned(),
        ));
    };
    let schemas = read_schemas(&options.inputs)?;
    let query = SourceFile::read(query_path)?;
    let variables = match &options.variables {
        Some(path) => Some(read_variables(path)?),
        None => None,
    };

    let context = compile(options, &schemas)?;
    let ir = context
        .translate_with(&query.text, variables.as_ref(), options.operation.as_deref())
        .map_err(|e| diagnose(e, &schemas, Some(&query)))?;
    print_ir(&ir, options.format)
}

/// Compile the schema inputs, with the `--ontology` file if one is given.
pub(super) fn compile(
    options: &TranslateOptions,
    schemas: &[SourceFile],
) -> Result<TranslationContext, CommandError> {
    let sources = schemas.iter().map(|s| s.text.as_str());
    let mut context = TranslationContext::new();
    let compiled = match &options.ontology {
        Some(path) => {
            let ontology: Ontology = read_json(path)?;
            context.compile_with_ontology(sources, ontology)
        }
        None => context.compile(sources, options.ontology_name()),
    };
    compiled.map_err(|e| diagnose(e, schemas, None))?;
    Ok(context)
}

pub(super) fn print_ir(ir: &TraversalIr, format: OutputFormat) -> Result<String, CommandError> {
    match format {
        OutputFormat::Tree => Ok(tql_ir::describe(ir)
            .map(|d| d.to_string())
            .unwrap_or_default()),
        OutputFormat::Json => serde_json::to_string_pretty(ir).map_err(CommandError::Encode),
    }
}

fn read_variables(path: &std::path::Path) -> Result<JsonMap, CommandError> {
    match read_json(path)? {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(CommandError::NotAnObject {
            path: path.display().to_string(),
        }),
    }
}

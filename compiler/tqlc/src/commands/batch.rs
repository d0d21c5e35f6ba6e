//! The `batch` command: many queries against one compiled schema.

use rayon::prelude::*;
use tql_translate::TranslateError;

use super::options::TranslateOptions;
use super::read_schemas;
use super::translate::{compile, print_ir};
use crate::report::{diagnose, CommandError, SourceFile};

/// Per-query results of a batch, in input order.
#[derive(Debug)]
pub struct BatchOutcome {
    pub entries: Vec<(String, Result<String, CommandError>)>,
}

impl BatchOutcome {
    pub fn failures(&self) -> usize {
        self.entries.iter().filter(|(_, r)| r.is_err()).count()
    }

    /// Every query's output under a `== path ==` header.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (path, result) in &self.entries {
            out.push_str(&format!("== {path} ==\n"));
            match result {
                Ok(ir) => out.push_str(ir),
                Err(e) => out.push_str(&format!("error: {e}\n")),
            }
        }
        out
    }
}

/// Translate every query input against the first input, the schema.
///
/// The schema is compiled once; queries are translated in parallel against
/// the shared compiled state. A failing query does not stop the others.
pub fn batch(options: &TranslateOptions) -> Result<BatchOutcome, CommandError> {
    let [schema, queries @ ..] = options.inputs.as_slice() else {
        return Err(CommandError::Usage("missing schema file".to_owned()));
    };
    if queries.is_empty() {
        return Err(CommandError::Usage("no query files given".to_owned()));
    }

    let schemas = read_schemas(std::slice::from_ref(schema))?;
    let shared = compile(options, &schemas)?
        .shared()
        .ok_or(TranslateError::PrerequisiteMissing)?;
    let operation = options.operation.as_deref();

    let entries = queries
        .par_iter()
        .map(|path| {
            let result = SourceFile::read(path).and_then(|query| {
                let ir = shared
                    .translate(&query.text, None, operation)
                    .map_err(|e| diagnose(e, &schemas, Some(&query)))?;
                print_ir(&ir, options.format)
            });
            (path.display().to_string(), result)
        })
        .collect();

    let outcome = BatchOutcome { entries };
    tracing::debug!(
        queries = outcome.entries.len(),
        failures = outcome.failures(),
        "batch translated"
    );
    Ok(outcome)
}

//! The `ontology` command: print the ontology derived from a schema.

use tql_translate::Compiled;

use super::options::TranslateOptions;
use super::read_schemas;
use crate::report::{diagnose, CommandError};

pub fn ontology(options: &TranslateOptions) -> Result<String, CommandError> {
    let schemas = read_schemas(&options.inputs)?;
    let compiled = Compiled::new(
        schemas.iter().map(|s| s.text.as_str()),
        options.ontology_name(),
    )
    .map_err(|e| diagnose(e, &schemas, None))?;
    serde_json::to_string_pretty(compiled.ontology()).map_err(CommandError::Encode)
}

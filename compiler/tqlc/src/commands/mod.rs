//! Command handlers for the `tqlc` CLI.
//!
//! Each submodule implements one command. Reading inputs is shared and lives
//! here in the module root.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::report::{CommandError, SourceFile};

mod batch;
mod ontology;
mod options;
mod translate;

pub use batch::{batch, BatchOutcome};
pub use ontology::ontology;
pub use options::{parse_translate_options, OutputFormat, TranslateOptions};
pub use translate::translate;

/// Read the schema files, in order. At least one is required.
fn read_schemas(paths: &[PathBuf]) -> Result<Vec<SourceFile>, CommandError> {
    if paths.is_empty() {
        return Err(CommandError::Usage("missing schema file".to_owned()));
    }
    paths.iter().map(|p| SourceFile::read(p)).collect()
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CommandError> {
    let file = SourceFile::read(path)?;
    serde_json::from_str(&file.text).map_err(|source| CommandError::Json {
        path: file.path,
        source,
    })
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;

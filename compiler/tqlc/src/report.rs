//! Driver errors and source diagnostics.

use std::path::Path;

use ariadne::{Config, Label, Report, ReportKind, Source};
use tql_graphql::{SchemaError, SyntaxError};
use tql_translate::TranslateError;

/// A file read by the driver, kept for rendering diagnostics against it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    pub path: String,
    pub text: String,
}

impl SourceFile {
    pub fn read(path: &Path) -> Result<Self, CommandError> {
        let text = std::fs::read_to_string(path).map_err(|source| CommandError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(SourceFile {
            path: path.display().to_string(),
            text,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    Usage(String),

    #[error("cannot read `{path}`: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{path}` is not valid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("`{path}` must hold a JSON object")]
    NotAnObject { path: String },

    /// A syntax error, already rendered against its source.
    #[error("{rendered}")]
    Syntax { rendered: String },

    #[error(transparent)]
    Translate(#[from] TranslateError),

    #[error("cannot encode output: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Attach source context to `error` when it points into one of the files.
///
/// Schema source 0 is the built-in prelude, so `schemas[i]` is source
/// `i + 1`.
pub(crate) fn diagnose(
    error: TranslateError,
    schemas: &[SourceFile],
    query: Option<&SourceFile>,
) -> CommandError {
    let located = match &error {
        TranslateError::QuerySyntax(syntax) => query.map(|file| (file, syntax)),
        TranslateError::Schema(SchemaError::Syntax {
            source_index,
            error: syntax,
        }) => source_index
            .checked_sub(1)
            .and_then(|i| schemas.get(i))
            .map(|file| (file, syntax)),
        _ => None,
    };
    match located {
        Some((file, syntax)) => CommandError::Syntax {
            rendered: render_syntax_error(file, syntax),
        },
        None => CommandError::Translate(error),
    }
}

/// Render `error` as an annotated excerpt of `file`.
pub fn render_syntax_error(file: &SourceFile, error: &SyntaxError) -> String {
    let range = error.span.to_range();
    // Labels are positioned in characters, spans in bytes.
    let chars = |byte: usize| {
        file.text
            .get(..byte)
            .map_or(byte, |prefix| prefix.chars().count())
    };
    let start = chars(range.start);
    let end = chars(range.end).max(start);

    let path = file.path.as_str();
    let mut out = Vec::new();
    let written = Report::build(ReportKind::Error, path, start)
        .with_config(Config::default().with_color(false))
        .with_message(&error.message)
        .with_label(Label::new((path, start..end)).with_message(&error.message))
        .finish()
        .write((path, Source::from(file.text.clone())), &mut out);
    match written {
        Ok(()) => String::from_utf8_lossy(&out).into_owned(),
        Err(_) => format!("{path}: {error}"),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]

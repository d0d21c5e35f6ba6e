//! Command line options shared by the commands.

use std::path::PathBuf;

/// How a translated IR is printed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// The indented tree of `tql_ir::describe`.
    #[default]
    Tree,
    /// The IR arena as JSON.
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tree" => Some(OutputFormat::Tree),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Options for `translate`, `ontology` and `batch`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TranslateOptions {
    /// Positional arguments: schema files, then (for `batch`) query files.
    pub inputs: Vec<PathBuf>,
    /// Query file (--query=<file>)
    pub query: Option<PathBuf>,
    /// Query variables as a JSON object (--vars=<file>)
    pub variables: Option<PathBuf>,
    /// Ontology JSON to use instead of deriving one (--ontology=<file>)
    pub ontology: Option<PathBuf>,
    /// Operation to run in a multi-operation document (--operation=<name>)
    pub operation: Option<String>,
    /// Name given to a derived ontology (--name=<name>)
    pub name: Option<String>,
    /// Output format: tree, json (--format=<fmt>)
    pub format: OutputFormat,
}

impl TranslateOptions {
    /// Name of a derived ontology when none is given.
    pub const DEFAULT_ONTOLOGY_NAME: &'static str = "default";

    /// Merge another `TranslateOptions` into this one.
    ///
    /// Inputs accumulate; options set in `other` override ours.
    pub fn merge(&mut self, other: &Self) {
        self.inputs.extend(other.inputs.iter().cloned());
        if other.query.is_some() {
            self.query.clone_from(&other.query);
        }
        if other.variables.is_some() {
            self.variables.clone_from(&other.variables);
        }
        if other.ontology.is_some() {
            self.ontology.clone_from(&other.ontology);
        }
        if other.operation.is_some() {
            self.operation.clone_from(&other.operation);
        }
        if other.name.is_some() {
            self.name.clone_from(&other.name);
        }
        if other.format != OutputFormat::default() {
            self.format = other.format;
        }
    }

    pub fn ontology_name(&self) -> &str {
        self.name.as_deref().unwrap_or(Self::DEFAULT_ONTOLOGY_NAME)
    }
}

/// Parse `--key=value` options and positional inputs.
///
/// Unknown options and values are reported on stderr and skipped.
pub fn parse_translate_options(args: &[String]) -> TranslateOptions {
    let mut options = TranslateOptions::default();

    for arg in args {
        if let Some(query) = arg.strip_prefix("--query=") {
            options.query = Some(PathBuf::from(query));
        } else if let Some(vars) = arg.strip_prefix("--vars=") {
            options.variables = Some(PathBuf::from(vars));
        } else if let Some(ontology) = arg.strip_prefix("--ontology=") {
            options.ontology = Some(PathBuf::from(ontology));
        } else if let Some(operation) = arg.strip_prefix("--operation=") {
            options.operation = Some(operation.to_string());
        } else if let Some(name) = arg.strip_prefix("--name=") {
            options.name = Some(name.to_string());
        } else if let Some(format) = arg.strip_prefix("--format=") {
            if let Some(f) = OutputFormat::parse(format) {
                options.format = f;
            } else {
                eprintln!("warning: unknown output format '{format}', using tree");
            }
        } else if arg.starts_with('-') {
            eprintln!("warning: unknown option '{arg}'");
        } else {
            options.inputs.push(PathBuf::from(arg));
        }
    }

    options
}

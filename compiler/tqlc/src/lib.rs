//! TQL driver library.
//!
//! The `tqlc` binary is a thin argument parser over [`commands`]. Every
//! command returns its output as a string, or a [`CommandError`] whose
//! `Display` is the message to print.

pub mod commands;
pub mod report;

pub use commands::{
    batch, ontology, parse_translate_options, translate, BatchOutcome, OutputFormat,
    TranslateOptions,
};
pub use report::{CommandError, SourceFile};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a tracing subscriber when `RUST_LOG` is set.
///
/// `TQL_LOG_TREE` switches to an indented tree of spans, one per visited
/// query field. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        if std::env::var("TQL_LOG_TREE").is_ok() {
            tracing_subscriber::registry()
                .with(tracing_tree::HierarchicalLayer::new(2).with_targets(true))
                .with(filter)
                .init();
        } else {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

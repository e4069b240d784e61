//! swift-surgeon: diagnostics and structural edits for Swift sources.
//!
//! Source text is parsed into a lossless, immutable syntax tree. On top of
//! that tree sit three operations:
//!
//! - **Addressing**: deterministic paths into one tree snapshot, either by
//!   declaration (`"1.2"`, hierarchical) or by token (`"7"`, flat).
//! - **Diagnostic extraction**: raw parser diagnostics become records with
//!   verified line/column positions, context lines and consolidated fix-its.
//! - **Mutation**: replace, delete, insert and documentation rewrites, each
//!   returning a new tree that shares every untouched subtree with the old.
//!
//! Writing a result back to disk goes through [`Edit`], a verified byte-span
//! replacement applied atomically.
//!
//! # Example
//!
//! ```
//! use swift_surgeon::{parse, AddressingScheme, MutationEngine, NodePath};
//!
//! let tree = parse("s.swift", "struct S {\n    let x: Int\n}\n").tree;
//! let path = NodePath::parse(AddressingScheme::Declaration, "1.1").unwrap();
//! let documented = MutationEngine::default()
//!     .modify_documentation(&tree, &path, Some("The x value."))
//!     .unwrap();
//! assert_eq!(
//!     documented.render(),
//!     "struct S {\n    /// The x value.\n    let x: Int\n}\n"
//! );
//! ```

pub mod config;
pub mod diagnostics;
pub mod edit;
pub mod mutation;
pub mod parser;
pub mod path;
pub mod report;
pub mod source;
pub mod syntax;

// Re-exports
pub use config::{
    apply_script, load_config, load_script, ApplicationError, ConfigError, EditScript,
    SurgeonConfig,
};
pub use diagnostics::{DiagnosticExtractor, DiagnosticRecord, ExtractorOptions, PositionQuality};
pub use edit::{Edit, EditError, EditResult, EditVerification};
pub use mutation::{InsertPosition, MutationEngine, NodeOperationError, ReplacementPolicy};
pub use parser::{parse, Parsed};
pub use path::{AddressingScheme, NodePath, Path};
pub use report::OutputFormat;
pub use source::{Location, LocationConverter, SourceDocument};
pub use syntax::{SyntaxNode, SyntaxTree};

/// Install the tracing subscriber: `RUST_LOG` when set, otherwise warnings
/// from this crate (`debug` with `verbose`). Logs go to stderr.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default = if verbose {
        "swift_surgeon=debug"
    } else {
        "swift_surgeon=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

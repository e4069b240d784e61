//! Reference parser producing lossless trees and raw diagnostics.

pub mod fragment;
mod grammar;
pub mod lexer;

pub use fragment::{
    parse_expression, parse_items, parse_token, parse_tokens, FragmentContext, FragmentError,
};

use crate::diagnostics::raw::RawDiagnostic;
use crate::syntax::SyntaxTree;
use grammar::Parser;
use std::sync::Arc;
use tracing::{debug, warn};

/// A parsed document and everything the parser had to say about it.
#[derive(Debug, Clone)]
pub struct Parsed {
    pub tree: SyntaxTree,
    pub diagnostics: Vec<RawDiagnostic>,
}

impl Parsed {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Parse `text`. Never fails: recovery nodes absorb anything malformed.
pub fn parse(identity: impl Into<Arc<str>>, text: &str) -> Parsed {
    let identity: Arc<str> = identity.into();
    let lexed = lexer::lex(text);
    let token_count = lexed.tokens.len();
    let (tree, diagnostics) = Parser::new(lexed).parse_source_file(&identity);
    if tree.root().full_width() != text.len() {
        warn!(
            identity = %identity,
            expected = text.len(),
            actual = tree.root().full_width(),
            "parsed tree does not cover the whole document"
        );
    }
    debug!(
        identity = %identity,
        bytes = text.len(),
        tokens = token_count,
        diagnostics = diagnostics.len(),
        "parsed document"
    );
    Parsed { tree, diagnostics }
}

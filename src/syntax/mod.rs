//! Lossless, immutable syntax trees.
//!
//! Rendering a tree (every token's leading trivia, text and trailing trivia
//! in document order) reproduces the parsed source byte-for-byte.

pub mod kind;
pub mod node;
pub mod tree;
pub mod trivia;

pub use kind::{NodeCategory, NodeKind, TokenKind};
pub use node::{Composite, SyntaxNode, Token};
pub use tree::{ChildIndices, SyntaxTree, Walk};
pub use trivia::{TriviaKind, TriviaPiece};

//! Structural edits: replace, delete, insert and documentation rewrites.
//!
//! Each operation is a single resolve, validate, rebuild pass over an
//! immutable [`SyntaxTree`](crate::syntax::SyntaxTree).

pub mod docs;
pub mod engine;
pub mod errors;
pub mod policy;
mod rebuild;

pub use engine::{InsertPosition, MutationEngine};
pub use errors::NodeOperationError;
pub use policy::{check_insertion, ReplacementPolicy};

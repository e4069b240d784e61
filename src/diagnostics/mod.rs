//! Diagnostic extraction: raw parser diagnostics in, position-verified
//! records with consolidated fix-its out.

pub mod extractor;
pub mod fixit;
pub mod raw;
pub mod record;
pub mod reposition;

pub use extractor::{DiagnosticExtractor, ExtractorOptions};
pub use raw::{RawDiagnostic, RawFixIt, RawFixItChange, RawNote, Severity};
pub use record::{
    ContextLine, DiagnosticRecord, FixItChange, FixItSuggestion, Note, PositionQuality, Span,
};

//! Position-verified diagnostic records.
//!
//! These are the extractor's output and serialize to camelCase JSON.

use crate::diagnostics::raw::Severity;
use crate::source::Location;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    pub start_line: usize,
    pub start_column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_column: Option<usize>,
}

impl Span {
    pub fn point(at: Location) -> Self {
        Self {
            start_line: at.line,
            start_column: at.column,
            end_line: None,
            end_column: None,
        }
    }

    pub fn between(start: Location, end: Location) -> Self {
        Self {
            start_line: start.line,
            start_column: start.column,
            end_line: Some(end.line),
            end_column: Some(end.column),
        }
    }

    pub fn start(&self) -> Location {
        Location::new(self.start_line, self.start_column)
    }

    pub fn end(&self) -> Option<Location> {
        Some(Location::new(self.end_line?, self.end_column?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextLine {
    pub line_number: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FixItChange {
    #[serde(rename_all = "camelCase")]
    Replace { span: Span, new_text: String },
    #[serde(rename_all = "camelCase")]
    Insert { position: Location, new_text: String },
    Delete { span: Span },
    Generic { description: String, details: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixItSuggestion {
    pub message: String,
    pub changes: Vec<FixItChange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// How much the reported location can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionQuality {
    /// Converted from the parser's offset as-is.
    Exact,
    /// Moved onto the code the message quotes.
    Corrected,
    /// Clipped or guessed; the parser gave nothing usable.
    Approximate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticRecord {
    pub message: String,
    pub severity: Severity,
    pub location: Location,
    pub span: Span,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offending_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_location: Option<Location>,
    pub context_lines: Vec<ContextLine>,
    pub fix_its: Vec<FixItSuggestion>,
    pub notes: Vec<Note>,
    pub position: PositionQuality,
}

impl DiagnosticRecord {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

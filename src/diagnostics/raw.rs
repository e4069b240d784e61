//! Parser-side diagnostics, before position verification and fix-it
//! consolidation.

use crate::syntax::ChildIndices;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
    Remark,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
            Severity::Remark => "remark",
        };
        f.write_str(name)
    }
}

/// One primitive edit proposed by the parser. Offsets are byte offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawFixItChange {
    Replace { range: Range<usize>, new_text: String },
    Insert { offset: usize, new_text: String },
    Delete { range: Range<usize> },
    Generic { description: String, details: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFixIt {
    pub message: String,
    pub changes: Vec<RawFixItChange>,
}

impl RawFixIt {
    pub fn new(message: impl Into<String>, changes: Vec<RawFixItChange>) -> Self {
        Self {
            message: message.into(),
            changes,
        }
    }

    pub fn insert(message: impl Into<String>, offset: usize, new_text: impl Into<String>) -> Self {
        Self::new(
            message,
            vec![RawFixItChange::Insert {
                offset,
                new_text: new_text.into(),
            }],
        )
    }

    pub fn replace(
        message: impl Into<String>,
        range: Range<usize>,
        new_text: impl Into<String>,
    ) -> Self {
        Self::new(
            message,
            vec![RawFixItChange::Replace {
                range,
                new_text: new_text.into(),
            }],
        )
    }

    pub fn delete(message: impl Into<String>, range: Range<usize>) -> Self {
        Self::new(message, vec![RawFixItChange::Delete { range }])
    }
}

/// A secondary location attached to a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNote {
    pub message: String,
    pub offset: Option<usize>,
    pub node: Option<ChildIndices>,
}

impl RawNote {
    pub fn at(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset: Some(offset),
            node: None,
        }
    }
}

/// A diagnostic as reported by the parser.
///
/// Either `offset` or `node` locates it; when both are absent the extractor
/// falls back to an approximate position instead of dropping it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDiagnostic {
    pub message: String,
    pub severity: Severity,
    pub offset: Option<usize>,
    pub node: Option<ChildIndices>,
    pub fix_its: Vec<RawFixIt>,
    pub notes: Vec<RawNote>,
}

impl RawDiagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity,
            offset: None,
            node: None,
            fix_its: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    #[must_use]
    pub fn at(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    #[must_use]
    pub fn with_node(mut self, node: ChildIndices) -> Self {
        self.node = Some(node);
        self
    }

    #[must_use]
    pub fn with_fix_it(mut self, fix_it: RawFixIt) -> Self {
        self.fix_its.push(fix_it);
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: RawNote) -> Self {
        self.notes.push(note);
        self
    }
}

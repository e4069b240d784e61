//! Trivia: the non-semantic text attached to tokens.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriviaKind {
    Whitespace,
    Newline,
    LineComment,
    DocLineComment,
    BlockComment,
    DocBlockComment,
}

impl TriviaKind {
    /// `///` and `/** */` comments.
    pub fn is_documentation(self) -> bool {
        matches!(self, TriviaKind::DocLineComment | TriviaKind::DocBlockComment)
    }

    pub fn is_comment(self) -> bool {
        !matches!(self, TriviaKind::Whitespace | TriviaKind::Newline)
    }

    /// Classify comment text starting with `//` or `/*`.
    pub fn of_comment(text: &str) -> TriviaKind {
        if text.starts_with("//") {
            if text.starts_with("///") && !text.starts_with("////") {
                TriviaKind::DocLineComment
            } else {
                TriviaKind::LineComment
            }
        } else if text.starts_with("/**") && !text.starts_with("/**/") && !text.starts_with("/***")
        {
            TriviaKind::DocBlockComment
        } else {
            TriviaKind::BlockComment
        }
    }
}

/// One piece of trivia: a whitespace run, one line break, or one comment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TriviaPiece {
    pub kind: TriviaKind,
    pub text: String,
}

impl TriviaPiece {
    pub fn new(kind: TriviaKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn whitespace(text: impl Into<String>) -> Self {
        Self::new(TriviaKind::Whitespace, text)
    }

    pub fn newline(text: impl Into<String>) -> Self {
        Self::new(TriviaKind::Newline, text)
    }

    pub fn is_documentation(&self) -> bool {
        self.kind.is_documentation()
    }

    pub fn is_newline(&self) -> bool {
        self.kind == TriviaKind::Newline
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind == TriviaKind::Whitespace
    }
}

impl fmt::Display for TriviaPiece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

pub fn trivia_width(pieces: &[TriviaPiece]) -> usize {
    pieces.iter().map(|p| p.text.len()).sum()
}

pub fn write_trivia(pieces: &[TriviaPiece], out: &mut String) {
    for piece in pieces {
        out.push_str(&piece.text);
    }
}

pub fn contains_newline(pieces: &[TriviaPiece]) -> bool {
    pieces.iter().any(|p| p.is_newline() || p.text.contains('\n'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_classification() {
        assert_eq!(TriviaKind::of_comment("// x"), TriviaKind::LineComment);
        assert_eq!(TriviaKind::of_comment("/// x"), TriviaKind::DocLineComment);
        assert_eq!(TriviaKind::of_comment("//// x"), TriviaKind::LineComment);
        assert_eq!(TriviaKind::of_comment("/* x */"), TriviaKind::BlockComment);
        assert_eq!(TriviaKind::of_comment("/** x */"), TriviaKind::DocBlockComment);
        assert_eq!(TriviaKind::of_comment("/**/"), TriviaKind::BlockComment);
    }

    #[test]
    fn documentation_kinds() {
        assert!(TriviaKind::DocLineComment.is_documentation());
        assert!(TriviaKind::DocBlockComment.is_documentation());
        assert!(!TriviaKind::LineComment.is_documentation());
        assert!(!TriviaKind::Whitespace.is_comment());
    }
}

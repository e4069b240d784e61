//! Documentation comments in a token's leading trivia.
//!
//! Leading trivia is handled as lines, each ending in a newline piece; the
//! last, unterminated line holds whatever sits before the token on its own
//! line (usually indentation).

use crate::syntax::{TriviaKind, TriviaPiece};

/// Split trivia into newline-terminated lines plus the token's own line.
fn split_lines(leading: &[TriviaPiece]) -> (Vec<&[TriviaPiece]>, &[TriviaPiece]) {
    let mut lines = Vec::new();
    let mut start = 0;
    for (i, piece) in leading.iter().enumerate() {
        if piece.is_newline() {
            lines.push(&leading[start..=i]);
            start = i + 1;
        }
    }
    (lines, &leading[start..])
}

/// Drop doc pieces from a line, along with the whitespace that separated a
/// removed doc comment from what follows it.
fn strip_docs(line: &[TriviaPiece], out: &mut Vec<TriviaPiece>) {
    let mut after_doc = false;
    for piece in line {
        if piece.is_documentation() {
            after_doc = true;
            continue;
        }
        if after_doc && piece.is_whitespace() {
            after_doc = false;
            continue;
        }
        after_doc = false;
        out.push(piece.clone());
    }
}

/// Lines of documentation text, split on every break the lexer knows.
fn text_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .flat_map(|line| line.strip_suffix('\r').unwrap_or(line).split('\r'))
}

enum BlockShape {
    /// The comment closes exactly at the end of the text.
    Closed,
    /// Still open at the end, this many levels deep.
    Open(usize),
    /// Closes before the end; the rest would be code.
    ClosedEarly,
}

/// Nesting scan matching how the lexer delimits block comments.
fn block_shape(text: &str) -> BlockShape {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'*') {
            depth += 1;
            i += 2;
        } else if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') && depth > 0 {
            depth -= 1;
            i += 2;
            if depth == 0 {
                return if i == bytes.len() {
                    BlockShape::Closed
                } else {
                    BlockShape::ClosedEarly
                };
            }
        } else {
            i += 1;
        }
    }
    BlockShape::Open(depth)
}

/// Doc comment pieces for `text`: one block when it starts with `/**`,
/// otherwise one `///` line per input line.
///
/// An unclosed block is closed; a block that ends before the text does is
/// written as `///` lines instead.
pub fn documentation_pieces(text: &str) -> Vec<TriviaPiece> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if trimmed.starts_with("/**") {
        match block_shape(trimmed) {
            BlockShape::Closed => {
                return vec![TriviaPiece::new(TriviaKind::DocBlockComment, trimmed)];
            }
            BlockShape::Open(depth) => {
                let closed = format!("{trimmed}{}", " */".repeat(depth));
                return vec![TriviaPiece::new(TriviaKind::DocBlockComment, closed)];
            }
            BlockShape::ClosedEarly => {}
        }
    }
    text_lines(trimmed)
        .map(|line| {
            let line = line.trim_end();
            let stripped = line.trim_start();
            let comment = if stripped.starts_with("///") {
                stripped.to_string()
            } else if line.is_empty() {
                "///".to_string()
            } else {
                format!("/// {line}")
            };
            TriviaPiece::new(TriviaKind::DocLineComment, comment)
        })
        .collect()
}

/// Rewrite `leading` so it carries exactly the documentation in `new_text`.
///
/// Lines holding only indentation and documentation are removed with their
/// line break; documentation mixed into other lines is removed piece by
/// piece. New documentation goes right before the token's own line, indented
/// like the token. `starts_line` tells whether the token begins a line; when
/// it does not, a line break is added so the comment cannot swallow code.
pub fn rewrite_documentation(
    leading: &[TriviaPiece],
    new_text: Option<&str>,
    newline: &str,
    starts_line: bool,
) -> Vec<TriviaPiece> {
    let (lines, own_line) = split_lines(leading);
    let mut out = Vec::with_capacity(leading.len() + 4);
    for line in lines {
        let body = &line[..line.len() - 1];
        let has_doc = body.iter().any(TriviaPiece::is_documentation);
        let only_docs = body
            .iter()
            .all(|piece| piece.is_whitespace() || piece.is_documentation());
        if has_doc && only_docs {
            continue;
        }
        strip_docs(line, &mut out);
    }

    let mut own = Vec::new();
    strip_docs(own_line, &mut own);

    let docs = new_text.map(documentation_pieces).unwrap_or_default();
    if !docs.is_empty() {
        let indentation: String = own
            .iter()
            .take_while(|piece| piece.is_whitespace())
            .map(|piece| piece.text.as_str())
            .collect();
        if !starts_line {
            out.push(TriviaPiece::newline(newline));
        }
        for doc in docs {
            if !indentation.is_empty() {
                out.push(TriviaPiece::whitespace(indentation.clone()));
            }
            out.push(doc);
            out.push(TriviaPiece::newline(newline));
        }
    }
    out.extend(own);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::lex;
    use crate::syntax::trivia::write_trivia;

    /// Leading trivia of the first token of `text`.
    fn leading(text: &str) -> Vec<TriviaPiece> {
        lex(text).tokens[0].leading_trivia().to_vec()
    }

    fn render(pieces: &[TriviaPiece]) -> String {
        let mut out = String::new();
        write_trivia(pieces, &mut out);
        out
    }

    #[test]
    fn replaces_existing_doc_lines() {
        let pieces = leading("\n    /// Old.\n    /// More.\n    func f() {}");
        let rewritten = rewrite_documentation(&pieces, Some("New."), "\n", true);
        assert_eq!(render(&rewritten), "\n    /// New.\n    ");
    }

    #[test]
    fn removal_keeps_regular_comments() {
        let pieces = leading("\n// keep\n/// drop\nfunc f() {}");
        let rewritten = rewrite_documentation(&pieces, None, "\n", true);
        assert_eq!(render(&rewritten), "\n// keep\n");
    }

    #[test]
    fn inline_block_doc_is_removed_with_its_space() {
        let pieces = leading("\n  /** inline */ func f() {}");
        let rewritten = rewrite_documentation(&pieces, Some(""), "\n", true);
        assert_eq!(render(&rewritten), "\n  ");
    }

    #[test]
    fn block_documentation_is_one_piece() {
        let rewritten = rewrite_documentation(&[], Some("/** Block. */"), "\n", true);
        assert_eq!(rewritten.len(), 2);
        assert_eq!(rewritten[0].kind, TriviaKind::DocBlockComment);
        assert_eq!(render(&rewritten), "/** Block. */\n");
    }

    #[test]
    fn multi_line_text_and_crlf() {
        let pieces = leading("\r\n\tfunc f() {}");
        let rewritten = rewrite_documentation(&pieces, Some("First.\n\n/// Third."), "\r\n", true);
        assert_eq!(render(&rewritten), "\r\n\t/// First.\r\n\t///\r\n\t/// Third.\r\n\t");
    }

    #[test]
    fn unclosed_block_is_closed() {
        let pieces = documentation_pieces("/** Oops");
        assert_eq!(pieces, vec![TriviaPiece::new(TriviaKind::DocBlockComment, "/** Oops */")]);
        let nested = documentation_pieces("/** outer /* inner");
        assert_eq!(render(&nested), "/** outer /* inner */ */");
    }

    #[test]
    fn block_closed_early_becomes_line_docs() {
        let pieces = documentation_pieces("/** a */ let z = 1");
        assert_eq!(
            pieces,
            vec![TriviaPiece::new(TriviaKind::DocLineComment, "/// /** a */ let z = 1")]
        );
    }

    #[test]
    fn every_line_break_starts_a_doc_line() {
        let lines: Vec<_> = documentation_pieces("a\rb\r\nc\nd")
            .into_iter()
            .map(|piece| piece.text)
            .collect();
        assert_eq!(lines, vec!["/// a", "/// b", "/// c", "/// d"]);
    }

    #[test]
    fn token_mid_line_gets_a_line_break() {
        let rewritten = rewrite_documentation(&[], Some("Doc."), "\n", false);
        assert_eq!(render(&rewritten), "\n/// Doc.\n");
    }

    #[test]
    fn pure_function_of_inputs() {
        let pieces = leading("\n    /// Old.\n    let x = 1");
        let once = rewrite_documentation(&pieces, Some("Same."), "\n", true);
        let twice = rewrite_documentation(&pieces, Some("Same."), "\n", true);
        assert_eq!(once, twice);
        // Applying the rewrite to its own output is stable too.
        assert_eq!(rewrite_documentation(&once, Some("Same."), "\n", true), once);
    }
}

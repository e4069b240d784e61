//! Lossless tokenizer.
//!
//! Trivia attachment: a token's trailing trivia runs up to, but not
//! including, the next line break; everything else before a token is its
//! leading trivia. The final trivia of the file hangs off a synthetic
//! end-of-file token.

use crate::diagnostics::raw::{RawDiagnostic, RawFixIt, RawNote};
use crate::syntax::kind::{is_keyword, TokenKind};
use crate::syntax::trivia::{TriviaKind, TriviaPiece};
use crate::syntax::Token;

/// Tokens with the offset where each one starts (leading trivia included).
#[derive(Debug, Clone)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    pub starts: Vec<usize>,
    pub diagnostics: Vec<RawDiagnostic>,
}

pub fn lex(text: &str) -> Lexed {
    Lexer {
        text,
        pos: 0,
        diagnostics: Vec::new(),
    }
    .run()
}

struct Lexer<'a> {
    text: &'a str,
    pos: usize,
    diagnostics: Vec<RawDiagnostic>,
}

const OPERATOR_CHARS: &str = "/=-+!*%<>&|^~?";

fn is_horizontal_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{0B}' | '\u{0C}')
}

fn is_identifier_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_identifier_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

impl<'a> Lexer<'a> {
    fn run(mut self) -> Lexed {
        let mut tokens = Vec::new();
        let mut starts = Vec::new();
        loop {
            let start = self.pos;
            let leading = self.trivia(false);
            if self.pos >= self.text.len() {
                tokens.push(Token::new(TokenKind::EndOfFile, "", leading, Vec::new()));
                starts.push(start);
                break;
            }
            let content_start = self.pos;
            let kind = self.token();
            let text = &self.text[content_start..self.pos];
            let trailing = self.trivia(true);
            tokens.push(Token::new(kind, text, leading, trailing));
            starts.push(start);
        }
        Lexed {
            tokens,
            starts,
            diagnostics: self.diagnostics,
        }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn trivia(&mut self, trailing: bool) -> Vec<TriviaPiece> {
        let mut pieces = Vec::new();
        loop {
            let rest = self.rest();
            let Some(c) = rest.chars().next() else {
                break;
            };
            if is_horizontal_space(c) {
                let len = rest
                    .find(|ch: char| !is_horizontal_space(ch))
                    .unwrap_or(rest.len());
                pieces.push(TriviaPiece::whitespace(&rest[..len]));
                self.pos += len;
            } else if c == '\n' || c == '\r' {
                if trailing {
                    break;
                }
                let len = if rest.starts_with("\r\n") { 2 } else { 1 };
                pieces.push(TriviaPiece::newline(&rest[..len]));
                self.pos += len;
            } else if rest.starts_with("//") || (self.pos == 0 && rest.starts_with("#!")) {
                let len = rest
                    .find(|ch: char| ch == '\n' || ch == '\r')
                    .unwrap_or(rest.len());
                let text = &rest[..len];
                let kind = if text.starts_with("#!") {
                    TriviaKind::LineComment
                } else {
                    TriviaKind::of_comment(text)
                };
                pieces.push(TriviaPiece::new(kind, text));
                self.pos += len;
            } else if rest.starts_with("/*") {
                let len = self.block_comment_len();
                let text = &rest[..len];
                pieces.push(TriviaPiece::new(TriviaKind::of_comment(text), text));
                self.pos += len;
            } else {
                break;
            }
        }
        pieces
    }

    /// Length of the (possibly nested) block comment at the cursor.
    fn block_comment_len(&mut self) -> usize {
        let bytes = self.rest().as_bytes();
        let mut depth = 0usize;
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'*') {
                depth += 1;
                i += 2;
            } else if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
                depth -= 1;
                i += 2;
                if depth == 0 {
                    return i;
                }
            } else {
                i += 1;
            }
        }
        let end = self.pos + bytes.len();
        self.diagnostics.push(
            RawDiagnostic::error("unterminated '/*' comment")
                .at(self.pos)
                .with_fix_it(RawFixIt::insert("insert '*/'", end, "*/")),
        );
        bytes.len()
    }

    fn token(&mut self) -> TokenKind {
        let rest = self.rest();
        let mut chars = rest.chars();
        let Some(c) = chars.next() else {
            return TokenKind::EndOfFile;
        };
        let next = chars.next();

        let (kind, len) = match c {
            c if is_identifier_start(c) => {
                let len = identifier_len(rest);
                let kind = if is_keyword(&rest[..len]) {
                    TokenKind::Keyword
                } else {
                    TokenKind::Identifier
                };
                (kind, len)
            }
            '`' => match rest[1..].find(|ch: char| ch == '`' || ch == '\n' || ch == '\r') {
                Some(idx) if rest[1 + idx..].starts_with('`') => (TokenKind::Identifier, idx + 2),
                _ => (TokenKind::Unknown, 1),
            },
            '$' => (TokenKind::Identifier, 1 + identifier_len(&rest[1..])),
            '0'..='9' => number_len(rest),
            '"' => (TokenKind::StringLiteral, self.string_literal_len()),
            '#' => {
                let hashes = rest.bytes().take_while(|&b| b == b'#').count();
                if rest[hashes..].starts_with('"') {
                    (TokenKind::StringLiteral, self.string_literal_len())
                } else {
                    (TokenKind::Pound, 1)
                }
            }
            '(' => (TokenKind::LeftParen, 1),
            ')' => (TokenKind::RightParen, 1),
            '{' => (TokenKind::LeftBrace, 1),
            '}' => (TokenKind::RightBrace, 1),
            '[' => (TokenKind::LeftSquare, 1),
            ']' => (TokenKind::RightSquare, 1),
            ',' => (TokenKind::Comma, 1),
            ':' => (TokenKind::Colon, 1),
            ';' => (TokenKind::Semicolon, 1),
            '@' => (TokenKind::AtSign, 1),
            '\\' => (TokenKind::Operator, 1),
            '.' => {
                if rest.starts_with("...") || rest.starts_with("..<") {
                    (TokenKind::Operator, 3)
                } else {
                    (TokenKind::Period, 1)
                }
            }
            '<' => match next {
                Some('=') | Some('<') => (TokenKind::Operator, operator_len(rest)),
                _ => (TokenKind::LeftAngle, 1),
            },
            '>' => match next {
                Some('=') => (TokenKind::Operator, 2),
                _ => (TokenKind::RightAngle, 1),
            },
            '-' if next == Some('>') => (TokenKind::Arrow, 2),
            '?' => match next {
                Some('?') => (TokenKind::Operator, if rest.starts_with("??=") { 3 } else { 2 }),
                _ => (TokenKind::QuestionMark, 1),
            },
            '!' => match next {
                Some('=') => (TokenKind::Operator, if rest.starts_with("!==") { 3 } else { 2 }),
                _ => (TokenKind::ExclamationMark, 1),
            },
            '=' => match operator_len(rest) {
                1 => (TokenKind::Equal, 1),
                len => (TokenKind::Operator, len),
            },
            c if OPERATOR_CHARS.contains(c) => (TokenKind::Operator, operator_len(rest)),
            other => {
                self.diagnostics.push(
                    RawDiagnostic::error(format!("unexpected character '{}'", other.escape_default()))
                        .at(self.pos),
                );
                (TokenKind::Unknown, other.len_utf8())
            }
        };
        self.pos += len;
        kind
    }

    /// Length of the string literal at the cursor (optional `#` delimiters,
    /// single or triple quotes, escapes and interpolations).
    fn string_literal_len(&mut self) -> usize {
        let rest = self.rest();
        let hashes = rest.bytes().take_while(|&b| b == b'#').count();
        let multiline = rest[hashes..].starts_with("\"\"\"");
        let open_len = hashes + if multiline { 3 } else { 1 };
        let delimiter = "#".repeat(hashes);
        let closing = format!("{}{}", if multiline { "\"\"\"" } else { "\"" }, delimiter);
        let escape = format!("\\{delimiter}");

        let body = &rest[open_len..];
        let mut i = 0;
        while i < body.len() {
            let tail = &body[i..];
            if tail.starts_with(&closing) {
                return open_len + i + closing.len();
            }
            if tail.starts_with(&escape) {
                let j = i + escape.len();
                i = if body[j..].starts_with('(') {
                    interpolation_end(body, j, multiline)
                } else {
                    j + body[j..].chars().next().map_or(0, char::len_utf8)
                };
                continue;
            }
            let Some(ch) = tail.chars().next() else {
                break;
            };
            if !multiline && (ch == '\n' || ch == '\r') {
                break;
            }
            i += ch.len_utf8();
        }

        let end = self.pos + open_len + i;
        self.diagnostics.push(
            RawDiagnostic::error("unterminated string literal")
                .at(self.pos)
                .with_fix_it(RawFixIt::insert(
                    format!("insert '{}'", closing.replace('"', "\\\"")),
                    end,
                    closing.clone(),
                ))
                .with_note(RawNote::at("string literal starts here", self.pos)),
        );
        open_len + i
    }
}

/// Index just past the `)` closing an interpolation that opens at `start`.
fn interpolation_end(body: &str, start: usize, multiline: bool) -> usize {
    let mut depth = 0usize;
    for (offset, ch) in body[start..].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return start + offset + 1;
                }
            }
            '\n' | '\r' if !multiline => return start + offset,
            _ => {}
        }
    }
    body.len()
}

fn identifier_len(text: &str) -> usize {
    text.find(|ch: char| !is_identifier_continue(ch))
        .unwrap_or(text.len())
}

fn operator_len(text: &str) -> usize {
    let mut len = 0;
    for (idx, ch) in text.char_indices() {
        let tail = &text[idx..];
        if idx > 0 && (tail.starts_with("//") || tail.starts_with("/*")) {
            break;
        }
        if !OPERATOR_CHARS.contains(ch) {
            break;
        }
        len = idx + ch.len_utf8();
    }
    len.max(1)
}

fn number_len(text: &str) -> (TokenKind, usize) {
    let bytes = text.as_bytes();
    let digits = |from: usize, hex: bool| {
        let mut i = from;
        while i < bytes.len()
            && (bytes[i] == b'_'
                || bytes[i].is_ascii_digit()
                || (hex && bytes[i].is_ascii_hexdigit()))
        {
            i += 1;
        }
        i
    };

    if bytes.len() > 1 && bytes[0] == b'0' && matches!(bytes[1], b'x' | b'X' | b'b' | b'o') {
        return (TokenKind::IntegerLiteral, digits(2, true));
    }

    let mut kind = TokenKind::IntegerLiteral;
    let mut i = digits(0, false);
    if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
        i = digits(i + 1, false);
        kind = TokenKind::FloatLiteral;
    }
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            i = digits(j, false);
            kind = TokenKind::FloatLiteral;
        }
    }
    (kind, i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<(TokenKind, String)> {
        lex(text)
            .tokens
            .into_iter()
            .map(|t| (t.kind(), t.text().to_string()))
            .collect()
    }

    fn render(lexed: &Lexed) -> String {
        let mut out = String::new();
        for token in &lexed.tokens {
            for piece in token.leading_trivia() {
                out.push_str(&piece.text);
            }
            out.push_str(token.text());
            for piece in token.trailing_trivia() {
                out.push_str(&piece.text);
            }
        }
        out
    }

    #[test]
    fn trailing_trivia_stops_at_newline() {
        let lexed = lex("let x // note\n    y");
        let x = &lexed.tokens[1];
        assert_eq!(x.text(), "x");
        assert_eq!(x.trailing_trivia().len(), 2);
        assert_eq!(x.trailing_trivia()[1].kind, TriviaKind::LineComment);
        let y = &lexed.tokens[2];
        assert_eq!(y.leading_trivia()[0].kind, TriviaKind::Newline);
        assert_eq!(y.leading_trivia()[1].text, "    ");
    }

    #[test]
    fn doc_comments_are_leading_trivia() {
        let lexed = lex("/// Doc\nfunc f() {}");
        let func = &lexed.tokens[0];
        assert!(func.is_keyword("func"));
        assert_eq!(func.leading_trivia()[0].kind, TriviaKind::DocLineComment);
    }

    #[test]
    fn generic_angles_and_arrows() {
        let tokens = kinds("<T>(value: T) -> T");
        assert_eq!(tokens[0].0, TokenKind::LeftAngle);
        assert_eq!(tokens[2].0, TokenKind::RightAngle);
        assert_eq!(tokens[3].0, TokenKind::LeftParen);
        assert_eq!(tokens[8].0, TokenKind::Arrow);
    }

    #[test]
    fn operators_munch() {
        let tokens = kinds("a == b != c ?? d += 1");
        let ops: Vec<_> = tokens
            .iter()
            .filter(|(k, _)| *k == TokenKind::Operator)
            .map(|(_, t)| t.as_str())
            .collect();
        assert_eq!(ops, vec!["==", "!=", "??", "+="]);
    }

    #[test]
    fn numbers() {
        assert_eq!(kinds("42")[0], (TokenKind::IntegerLiteral, "42".into()));
        assert_eq!(kinds("1_000.5e-3")[0], (TokenKind::FloatLiteral, "1_000.5e-3".into()));
        assert_eq!(kinds("0xFF")[0], (TokenKind::IntegerLiteral, "0xFF".into()));
        // Member access on an integer is not a float.
        assert_eq!(kinds("1.description")[0], (TokenKind::IntegerLiteral, "1".into()));
    }

    #[test]
    fn strings_with_escapes_and_interpolation() {
        let tokens = kinds(r#""a \"b\" \(x + (y))" rest"#);
        assert_eq!(tokens[0].0, TokenKind::StringLiteral);
        assert_eq!(tokens[0].1, r#""a \"b\" \(x + (y))""#);
        assert_eq!(tokens[1].1, "rest");
    }

    #[test]
    fn raw_and_multiline_strings() {
        let tokens = kinds("#\"a\"b\"# \"\"\"\nline\n\"\"\"");
        assert_eq!(tokens[0].1, "#\"a\"b\"#");
        assert_eq!(tokens[1].1, "\"\"\"\nline\n\"\"\"");
    }

    #[test]
    fn unterminated_string_reports_and_stays_lossless() {
        let text = "let s = \"abc\nlet t = 1";
        let lexed = lex(text);
        assert_eq!(render(&lexed), text);
        assert_eq!(lexed.diagnostics.len(), 1);
        assert_eq!(lexed.diagnostics[0].message, "unterminated string literal");
        assert_eq!(lexed.diagnostics[0].offset, Some(8));
    }

    #[test]
    fn unterminated_block_comment() {
        let text = "/* open /* nested */ still";
        let lexed = lex(text);
        assert_eq!(render(&lexed), text);
        assert_eq!(lexed.diagnostics[0].message, "unterminated '/*' comment");
    }

    #[test]
    fn unknown_characters_are_kept() {
        let text = "let a = 1 § 2";
        let lexed = lex(text);
        assert_eq!(render(&lexed), text);
        assert!(lexed.tokens.iter().any(|t| t.kind() == TokenKind::Unknown));
    }

    #[test]
    fn starts_track_full_offsets() {
        let lexed = lex("a  b\nc");
        assert_eq!(lexed.starts, vec![0, 3, 4, 6]);
        assert_eq!(lexed.tokens.last().map(Token::kind), Some(TokenKind::EndOfFile));
    }
}

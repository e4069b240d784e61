//! Snippet parsing for building replacement and insertion nodes.
//!
//! Fragments keep their own trivia: whatever follows the last token (the
//! trivia the end-of-file token would carry) is moved onto that token so the
//! fragment renders exactly as written.

use crate::parser::grammar::{ItemContext, Parser};
use crate::parser::lexer::lex;
use crate::syntax::{NodeKind, SyntaxNode};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FragmentError {
    #[error("fragment is empty")]
    Empty,

    #[error("expected exactly one {expected}, found {found}")]
    WrongShape { expected: &'static str, found: usize },

    #[error("fragment does not parse: {message}")]
    Invalid { message: String },
}

/// The item list a fragment is parsed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentContext {
    /// Function bodies and top-level code: declarations, statements and
    /// expressions.
    CodeBlock,
    /// Type bodies: declarations only.
    Members,
}

/// Every token of `text`.
pub fn parse_tokens(text: &str) -> Result<Vec<SyntaxNode>, FragmentError> {
    let lexed = lex(text);
    if let Some(diagnostic) = lexed.diagnostics.first() {
        return Err(FragmentError::Invalid {
            message: diagnostic.message.clone(),
        });
    }
    let mut tokens = lexed.tokens;
    let eof = tokens.pop();
    let Some(last) = tokens.pop() else {
        return Err(FragmentError::Empty);
    };
    let mut nodes: Vec<SyntaxNode> = tokens.into_iter().map(SyntaxNode::from).collect();
    let last = SyntaxNode::from(last);
    nodes.push(match &eof {
        Some(eof) => last.with_trailing_trivia_appended(eof.leading_trivia()),
        None => last,
    });
    Ok(nodes)
}

/// Exactly one token.
pub fn parse_token(text: &str) -> Result<SyntaxNode, FragmentError> {
    let mut tokens = parse_tokens(text)?;
    match tokens.len() {
        1 => Ok(tokens.remove(0)),
        found => Err(FragmentError::WrongShape {
            expected: "token",
            found,
        }),
    }
}

/// Items as they would appear in a list of the given context.
pub fn parse_items(text: &str, context: FragmentContext) -> Result<Vec<SyntaxNode>, FragmentError> {
    let (item_context, owner) = match context {
        FragmentContext::CodeBlock => (ItemContext::CodeBlock, NodeKind::CodeBlock),
        FragmentContext::Members => (ItemContext::Members, NodeKind::MemberBlock),
    };
    let (mut items, eof, diagnostics) = Parser::new(lex(text)).parse_item_list(item_context, owner);
    if let Some(diagnostic) = diagnostics.first() {
        return Err(FragmentError::Invalid {
            message: diagnostic.message.clone(),
        });
    }
    let Some(last) = items.pop() else {
        return Err(FragmentError::Empty);
    };
    let trailing = eof.as_token().map(|t| t.leading_trivia().to_vec()).unwrap_or_default();
    items.push(last.with_trailing_trivia_appended(&trailing));
    Ok(items)
}

/// A single expression, without the statement wrapper.
pub fn parse_expression(text: &str) -> Result<SyntaxNode, FragmentError> {
    let items = parse_items(text, FragmentContext::CodeBlock)?;
    let [item] = items.as_slice() else {
        return Err(FragmentError::WrongShape {
            expected: "expression",
            found: items.len(),
        });
    };
    match (item.node_kind(), item.children()) {
        (Some(NodeKind::ExpressionStmt), [expr]) => Ok(expr.clone()),
        _ => Err(FragmentError::WrongShape {
            expected: "expression",
            found: 0,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::NodeCategory;

    #[test]
    fn single_token_keeps_trivia() {
        let token = parse_token(" y ").unwrap();
        assert!(token.is_token());
        assert_eq!(token.render(), " y ");
        assert_eq!(token.content_text(), "y");
    }

    #[test]
    fn token_count_is_checked() {
        assert_eq!(parse_token(""), Err(FragmentError::Empty));
        assert_eq!(
            parse_token("a b"),
            Err(FragmentError::WrongShape {
                expected: "token",
                found: 2
            })
        );
    }

    #[test]
    fn lexer_errors_reject_fragments() {
        assert!(matches!(parse_tokens("\"open"), Err(FragmentError::Invalid { .. })));
    }

    #[test]
    fn items_keep_trailing_newline() {
        let items = parse_items("\n    let z = 3\n", FragmentContext::Members).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].category(), NodeCategory::Declaration);
        assert_eq!(items[0].render(), "\n    let z = 3\n");
    }

    #[test]
    fn member_context_rejects_statements() {
        assert!(matches!(
            parse_items("print(1)", FragmentContext::Members),
            Err(FragmentError::Invalid { .. })
        ));
        assert_eq!(parse_items("print(1)", FragmentContext::CodeBlock).unwrap().len(), 1);
    }

    #[test]
    fn stray_closer_is_invalid() {
        assert!(matches!(
            parse_items("let a = 1 }", FragmentContext::CodeBlock),
            Err(FragmentError::Invalid { .. })
        ));
    }

    #[test]
    fn expression_fragment() {
        let expr = parse_expression("a + b").unwrap();
        assert_eq!(expr.node_kind(), Some(NodeKind::Expr));
        assert_eq!(expr.render(), "a + b");
        assert!(parse_expression("let a = 1").is_err());
    }
}

//! Immutable syntax nodes.
//!
//! A node is either a [`Token`] (text plus leading/trailing trivia) or a
//! [`Composite`] whose text is the concatenation of its children. Nodes are
//! reference counted so rebuilt trees share every untouched subtree.

use crate::syntax::kind::{NodeCategory, NodeKind, TokenKind};
use crate::syntax::trivia::{trivia_width, write_trivia, TriviaPiece};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    kind: TokenKind,
    text: String,
    leading_trivia: Vec<TriviaPiece>,
    trailing_trivia: Vec<TriviaPiece>,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        text: impl Into<String>,
        leading_trivia: Vec<TriviaPiece>,
        trailing_trivia: Vec<TriviaPiece>,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            leading_trivia,
            trailing_trivia,
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn leading_trivia(&self) -> &[TriviaPiece] {
        &self.leading_trivia
    }

    pub fn trailing_trivia(&self) -> &[TriviaPiece] {
        &self.trailing_trivia
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == keyword
    }

    pub fn leading_width(&self) -> usize {
        trivia_width(&self.leading_trivia)
    }

    pub fn trailing_width(&self) -> usize {
        trivia_width(&self.trailing_trivia)
    }

    pub fn full_width(&self) -> usize {
        self.leading_width() + self.text.len() + self.trailing_width()
    }

    /// Copy of this token with different leading trivia.
    pub fn with_leading_trivia(&self, leading_trivia: Vec<TriviaPiece>) -> Token {
        Token {
            leading_trivia,
            ..self.clone()
        }
    }

    /// Copy of this token with different trailing trivia.
    pub fn with_trailing_trivia(&self, trailing_trivia: Vec<TriviaPiece>) -> Token {
        Token {
            trailing_trivia,
            ..self.clone()
        }
    }

    fn write_to(&self, out: &mut String) {
        write_trivia(&self.leading_trivia, out);
        out.push_str(&self.text);
        write_trivia(&self.trailing_trivia, out);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Composite {
    kind: NodeKind,
    children: Vec<SyntaxNode>,
    width: usize,
}

impl Composite {
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn children(&self) -> &[SyntaxNode] {
        &self.children
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SyntaxNode {
    Token(Arc<Token>),
    Composite(Arc<Composite>),
}

impl From<Token> for SyntaxNode {
    fn from(token: Token) -> Self {
        SyntaxNode::Token(Arc::new(token))
    }
}

impl SyntaxNode {
    pub fn composite(kind: NodeKind, children: Vec<SyntaxNode>) -> Self {
        let width = children.iter().map(SyntaxNode::full_width).sum();
        SyntaxNode::Composite(Arc::new(Composite {
            kind,
            children,
            width,
        }))
    }

    pub fn is_token(&self) -> bool {
        matches!(self, SyntaxNode::Token(_))
    }

    pub fn as_token(&self) -> Option<&Token> {
        match self {
            SyntaxNode::Token(token) => Some(token),
            SyntaxNode::Composite(_) => None,
        }
    }

    pub fn as_composite(&self) -> Option<&Composite> {
        match self {
            SyntaxNode::Token(_) => None,
            SyntaxNode::Composite(composite) => Some(composite),
        }
    }

    /// Kind of a composite node, `None` for tokens.
    pub fn node_kind(&self) -> Option<NodeKind> {
        self.as_composite().map(Composite::kind)
    }

    pub fn category(&self) -> NodeCategory {
        match self {
            SyntaxNode::Token(_) => NodeCategory::Token,
            SyntaxNode::Composite(composite) => composite.kind.category(),
        }
    }

    pub fn is_declaration(&self) -> bool {
        self.category() == NodeCategory::Declaration
    }

    /// Short description for listings and messages.
    pub fn kind_name(&self) -> String {
        match self {
            SyntaxNode::Token(token) => format!("{:?}", token.kind),
            SyntaxNode::Composite(composite) => composite.kind.to_string(),
        }
    }

    /// Children of a composite; tokens have none.
    pub fn children(&self) -> &[SyntaxNode] {
        match self {
            SyntaxNode::Token(_) => &[],
            SyntaxNode::Composite(composite) => &composite.children,
        }
    }

    /// Width in bytes including all trivia.
    pub fn full_width(&self) -> usize {
        match self {
            SyntaxNode::Token(token) => token.full_width(),
            SyntaxNode::Composite(composite) => composite.width,
        }
    }

    pub fn first_token(&self) -> Option<&Token> {
        match self {
            SyntaxNode::Token(token) => Some(token),
            SyntaxNode::Composite(composite) => {
                composite.children.iter().find_map(SyntaxNode::first_token)
            }
        }
    }

    pub fn last_token(&self) -> Option<&Token> {
        match self {
            SyntaxNode::Token(token) => Some(token),
            SyntaxNode::Composite(composite) => {
                composite.children.iter().rev().find_map(SyntaxNode::last_token)
            }
        }
    }

    /// Width of the first token's leading trivia.
    pub fn leading_trivia_width(&self) -> usize {
        self.first_token().map_or(0, Token::leading_width)
    }

    /// Width of the last token's trailing trivia.
    pub fn trailing_trivia_width(&self) -> usize {
        self.last_token().map_or(0, Token::trailing_width)
    }

    /// Full text including trivia.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.full_width());
        self.write_to(&mut out);
        out
    }

    pub fn write_to(&self, out: &mut String) {
        match self {
            SyntaxNode::Token(token) => token.write_to(out),
            SyntaxNode::Composite(composite) => {
                for child in &composite.children {
                    child.write_to(out);
                }
            }
        }
    }

    /// Text without the outer leading and trailing trivia.
    pub fn content_text(&self) -> String {
        let full = self.render();
        let start = self.leading_trivia_width();
        let end = full.len().saturating_sub(self.trailing_trivia_width()).max(start);
        full[start..end].to_string()
    }

    /// Rebuild with `pieces` appended to the last token's trailing trivia.
    pub fn with_trailing_trivia_appended(&self, pieces: &[TriviaPiece]) -> SyntaxNode {
        if pieces.is_empty() {
            return self.clone();
        }
        match self {
            SyntaxNode::Token(token) => {
                let mut trailing = token.trailing_trivia.clone();
                trailing.extend_from_slice(pieces);
                token.with_trailing_trivia(trailing).into()
            }
            SyntaxNode::Composite(composite) => {
                let mut children = composite.children.clone();
                match children.iter().rposition(|c| c.last_token().is_some()) {
                    Some(idx) => {
                        children[idx] = children[idx].with_trailing_trivia_appended(pieces);
                        SyntaxNode::composite(composite.kind, children)
                    }
                    None => self.clone(),
                }
            }
        }
    }

    /// Rebuild with the first token's leading trivia replaced.
    pub fn with_leading_trivia(&self, pieces: Vec<TriviaPiece>) -> SyntaxNode {
        match self {
            SyntaxNode::Token(token) => token.with_leading_trivia(pieces).into(),
            SyntaxNode::Composite(composite) => {
                let mut children = composite.children.clone();
                match children.iter().position(|c| c.first_token().is_some()) {
                    Some(idx) => {
                        children[idx] = children[idx].with_leading_trivia(pieces);
                        SyntaxNode::composite(composite.kind, children)
                    }
                    None => self.clone(),
                }
            }
        }
    }

    /// Rebuild with `child` appended to a composite's children.
    pub(crate) fn with_child_appended(&self, child: SyntaxNode) -> SyntaxNode {
        match self {
            SyntaxNode::Token(_) => self.clone(),
            SyntaxNode::Composite(composite) => {
                let mut children = composite.children.clone();
                children.push(child);
                SyntaxNode::composite(composite.kind, children)
            }
        }
    }
}

impl fmt::Display for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

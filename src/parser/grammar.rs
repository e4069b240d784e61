//! Recursive-descent parser over the lexed token stream.
//!
//! The parser never fails. Anything it cannot place lands in an
//! `UnexpectedNodes` composite with a diagnostic, so the tree always renders
//! back to the input.

use crate::diagnostics::raw::{RawDiagnostic, RawFixIt, RawNote};
use crate::parser::lexer::Lexed;
use crate::syntax::kind::{
    is_declaration_keyword, is_modifier_keyword, NodeKind, TokenKind, DECLARATION_KEYWORDS,
};
use crate::syntax::trivia::contains_newline;
use crate::syntax::{SyntaxNode, SyntaxTree, Token};
use std::ops::Range;
use std::sync::Arc;
use tracing::trace;

/// Which item list is being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ItemContext {
    TopLevel,
    CodeBlock,
    Members,
    SwitchCase,
    Closure,
}

/// Tokens that end an expression besides the usual closers.
#[derive(Debug, Clone, Copy)]
struct ExprStop {
    comma: bool,
    brace: bool,
    colon: bool,
}

const STATEMENT: ExprStop = ExprStop {
    comma: false,
    brace: false,
    colon: false,
};
const CONDITION: ExprStop = ExprStop {
    comma: true,
    brace: true,
    colon: false,
};
const LIST_ITEM: ExprStop = ExprStop {
    comma: true,
    brace: false,
    colon: false,
};
const CASE_LABEL: ExprStop = ExprStop {
    comma: false,
    brace: false,
    colon: true,
};

/// Diagnostic whose node reference is filled in once the tree exists.
struct PendingNode {
    diagnostic: usize,
    kind: NodeKind,
    offset: usize,
}

pub(crate) struct Parser {
    tokens: Vec<Arc<Token>>,
    starts: Vec<usize>,
    pos: usize,
    diagnostics: Vec<RawDiagnostic>,
    pending: Vec<PendingNode>,
}

impl Parser {
    pub(crate) fn new(lexed: Lexed) -> Self {
        Self {
            tokens: lexed.tokens.into_iter().map(Arc::new).collect(),
            starts: lexed.starts,
            pos: 0,
            diagnostics: lexed.diagnostics,
            pending: Vec::new(),
        }
    }

    pub(crate) fn parse_source_file(mut self, identity: &str) -> (SyntaxTree, Vec<RawDiagnostic>) {
        let items = self.item_list(ItemContext::TopLevel, NodeKind::SourceFile);
        let eof = self.bump();
        let tree = SyntaxTree::new(identity, SyntaxNode::composite(NodeKind::SourceFile, vec![items, eof]));
        let diagnostics = self.finish(&tree);
        (tree, diagnostics)
    }

    /// Parse a whole item list and return its items plus the end-of-file token.
    pub(crate) fn parse_item_list(
        mut self,
        context: ItemContext,
        owner: NodeKind,
    ) -> (Vec<SyntaxNode>, SyntaxNode, Vec<RawDiagnostic>) {
        let mut items = Vec::new();
        while !self.at_eof() {
            let list = self.item_list(context, owner);
            items.extend(list.children().iter().cloned());
            if !self.at_eof() {
                // A closer the list refuses; keep it so nothing is lost.
                let token = self.bump();
                self.diagnostics.push(
                    RawDiagnostic::error(format!("unexpected '{}' in fragment", token.content_text()))
                        .at(self.prev_content_end()),
                );
                items.push(SyntaxNode::composite(NodeKind::UnexpectedNodes, vec![token]));
            }
        }
        let eof = self.bump();
        (items, eof, self.diagnostics)
    }

    /// Attach node references now that offsets map to real composites.
    fn finish(mut self, tree: &SyntaxTree) -> Vec<RawDiagnostic> {
        for pending in std::mem::take(&mut self.pending) {
            if let Some(indices) = tree.find_composite(pending.kind, pending.offset) {
                trace!(%indices, kind = ?pending.kind, "resolved diagnostic node");
                self.diagnostics[pending.diagnostic].node = Some(indices);
            }
        }
        self.diagnostics
    }

    // ---- cursor -------------------------------------------------------

    fn nth(&self, n: usize) -> &Token {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn current(&self) -> &Token {
        self.nth(0)
    }

    fn kind(&self) -> TokenKind {
        self.current().kind()
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        self.current().is_keyword(keyword)
    }

    fn at_eof(&self) -> bool {
        self.at(TokenKind::EndOfFile)
    }

    /// Whether a line break separates the current token from the previous one.
    fn at_line_start(&self) -> bool {
        if self.pos == 0 {
            return true;
        }
        contains_newline(self.current().leading_trivia())
            || contains_newline(self.tokens[self.pos - 1].trailing_trivia())
    }

    /// No trivia between the previous token and the current one.
    fn glued(&self) -> bool {
        self.pos > 0
            && self.current().leading_trivia().is_empty()
            && self.tokens[self.pos - 1].trailing_trivia().is_empty()
    }

    fn bump(&mut self) -> SyntaxNode {
        let idx = self.pos.min(self.tokens.len() - 1);
        let node = SyntaxNode::Token(self.tokens[idx].clone());
        if self.tokens[idx].kind() != TokenKind::EndOfFile {
            self.pos += 1;
        }
        node
    }

    fn eat(&mut self, kind: TokenKind) -> Option<SyntaxNode> {
        self.at(kind).then(|| self.bump())
    }

    fn full_start(&self) -> usize {
        self.starts[self.pos.min(self.starts.len() - 1)]
    }

    fn content_start(&self) -> usize {
        self.full_start() + self.current().leading_width()
    }

    fn content_range(&self) -> Range<usize> {
        let start = self.content_start();
        start..start + self.current().text().len()
    }

    fn prev_content_end(&self) -> usize {
        if self.pos == 0 {
            return 0;
        }
        let prev = &self.tokens[self.pos - 1];
        self.starts[self.pos - 1] + prev.leading_width() + prev.text().len()
    }

    // ---- diagnostics --------------------------------------------------

    fn report(&mut self, diagnostic: RawDiagnostic) {
        self.diagnostics.push(diagnostic);
    }

    fn report_for_node(&mut self, diagnostic: RawDiagnostic, kind: NodeKind, offset: usize) {
        self.pending.push(PendingNode {
            diagnostic: self.diagnostics.len(),
            kind,
            offset,
        });
        self.diagnostics.push(diagnostic);
    }

    /// Report something missing right after the previous token, with an
    /// insertion fix-it.
    fn missing(&mut self, message: impl Into<String>, fix_message: &str, insert: &str) {
        let at = self.prev_content_end();
        self.report(
            RawDiagnostic::error(message)
                .at(at)
                .with_fix_it(RawFixIt::insert(fix_message, at, insert)),
        );
    }

    fn expect_closing(
        &mut self,
        kind: TokenKind,
        context: &str,
        open_offset: usize,
    ) -> Option<SyntaxNode> {
        if let Some(token) = self.eat(kind) {
            return Some(token);
        }
        let (close, open, insert) = match kind {
            TokenKind::RightParen => (")", "(", ")"),
            TokenKind::RightSquare => ("]", "[", "]"),
            TokenKind::RightAngle => (">", "<", ">"),
            _ => ("}", "{", "\n}"),
        };
        let at = self.prev_content_end();
        self.report(
            RawDiagnostic::error(format!("expected '{close}' to end {context}"))
                .at(at)
                .with_fix_it(RawFixIt::insert(format!("insert '{close}'"), at, insert))
                .with_note(RawNote::at(format!("to match this opening '{open}'"), open_offset)),
        );
        None
    }

    /// Collect tokens into an `UnexpectedNodes` composite until `stop` holds
    /// outside any bracket pair, and report them as unexpected code.
    fn unexpected_until(
        &mut self,
        stop: impl Fn(&Parser) -> bool,
        context: &str,
        force_first: bool,
    ) -> Option<SyntaxNode> {
        let start = self.full_start();
        let mut tokens = Vec::new();
        let mut depth = 0usize;
        while !self.at_eof() {
            let forced = force_first && tokens.is_empty();
            if !forced && depth == 0 && stop(self) {
                break;
            }
            match self.kind() {
                TokenKind::LeftParen | TokenKind::LeftSquare | TokenKind::LeftBrace => depth += 1,
                TokenKind::RightParen | TokenKind::RightSquare | TokenKind::RightBrace => {
                    if depth > 0 {
                        depth -= 1;
                    } else if !forced {
                        break;
                    }
                }
                _ => {}
            }
            tokens.push(self.bump());
        }
        if tokens.is_empty() {
            return None;
        }
        let node = SyntaxNode::composite(NodeKind::UnexpectedNodes, tokens);
        let message = format!("unexpected code '{}' {context}", node.content_text());
        self.report_for_node(
            RawDiagnostic::error(message).at(start),
            NodeKind::UnexpectedNodes,
            start,
        );
        Some(node)
    }

    // ---- item lists ---------------------------------------------------

    fn item_list(&mut self, context: ItemContext, owner: NodeKind) -> SyntaxNode {
        let list_kind = match context {
            ItemContext::Members => NodeKind::MemberBlockItemList,
            _ => NodeKind::CodeBlockItemList,
        };
        let mut items: Vec<SyntaxNode> = Vec::new();
        loop {
            if self.at_eof() || (self.at(TokenKind::RightBrace) && context != ItemContext::TopLevel) {
                break;
            }
            if context == ItemContext::SwitchCase && self.at_switch_label() {
                break;
            }
            if self.at(TokenKind::Semicolon) {
                let semi = self.bump();
                match items.pop() {
                    Some(prev) => items.push(prev.with_child_appended(semi)),
                    None => items.push(SyntaxNode::composite(NodeKind::UnexpectedNodes, vec![semi])),
                }
                continue;
            }
            let before = self.pos;
            items.push(self.item(context, owner));
            if self.pos == before {
                let token = self.bump();
                items.push(SyntaxNode::composite(NodeKind::UnexpectedNodes, vec![token]));
            }
        }
        SyntaxNode::composite(list_kind, items)
    }

    fn at_switch_label(&self) -> bool {
        self.at_keyword("case")
            || self.at_keyword("default")
            || (self.at(TokenKind::AtSign) && self.nth(1).text() == "unknown")
    }

    fn item(&mut self, context: ItemContext, owner: NodeKind) -> SyntaxNode {
        if context == ItemContext::TopLevel && self.at(TokenKind::RightBrace) {
            return self.extraneous_brace();
        }
        if self.at_declaration_start(context) {
            return self.declaration();
        }
        if context == ItemContext::Members {
            return self.unexpected_member_code(owner);
        }
        self.statement(context, owner)
    }

    fn extraneous_brace(&mut self) -> SyntaxNode {
        let start = self.full_start();
        let range = self.content_range();
        let node = SyntaxNode::composite(NodeKind::UnexpectedNodes, vec![self.bump()]);
        self.report_for_node(
            RawDiagnostic::error("extraneous '}' at top level")
                .at(range.start)
                .with_fix_it(RawFixIt::delete("remove '}'", range)),
            NodeKind::UnexpectedNodes,
            start,
        );
        node
    }

    fn unexpected_member_code(&mut self, owner: NodeKind) -> SyntaxNode {
        let first = self.current().clone();
        let first_range = self.content_range();
        let context = format!("in {}", owner.display_name());
        let node = self.unexpected_until(
            |p| p.at_line_start() || p.at_declaration_start(ItemContext::Members),
            &context,
            true,
        );
        if first.kind() == TokenKind::Identifier {
            if let Some(keyword) = keyword_suggestion(first.text()) {
                if let Some(diagnostic) = self.diagnostics.last_mut() {
                    diagnostic.fix_its.push(RawFixIt::replace(
                        format!("replace '{}' with '{keyword}'", first.text()),
                        first_range,
                        keyword,
                    ));
                }
            }
        }
        node.unwrap_or_else(|| SyntaxNode::composite(NodeKind::UnexpectedNodes, Vec::new()))
    }

    // ---- declarations -------------------------------------------------

    fn at_declaration_start(&self, context: ItemContext) -> bool {
        let mut i = 0;
        loop {
            let token = self.nth(i);
            match token.kind() {
                TokenKind::AtSign => return true,
                TokenKind::Keyword => {}
                _ => return false,
            }
            let text = token.text();
            match text {
                "case" => return context == ItemContext::Members,
                "init" | "deinit" | "subscript" | "associatedtype" => {
                    return context == ItemContext::Members
                }
                "class" if self.nth(i + 1).kind() != TokenKind::Keyword => return true,
                _ => {}
            }
            if is_modifier_keyword(text) {
                i += 1;
                if self.nth(i).kind() == TokenKind::LeftParen {
                    i += 3;
                }
                continue;
            }
            return is_declaration_keyword(text);
        }
    }

    fn at_modifier(&self) -> bool {
        let token = self.current();
        if token.kind() != TokenKind::Keyword || !is_modifier_keyword(token.text()) {
            return false;
        }
        if token.text() == "class" {
            let next = self.nth(1);
            return next.kind() == TokenKind::Keyword
                && (is_declaration_keyword(next.text()) || is_modifier_keyword(next.text()));
        }
        true
    }

    fn declaration(&mut self) -> SyntaxNode {
        let mut children = Vec::new();
        if self.at(TokenKind::AtSign) {
            children.push(self.attribute_list());
        }
        if self.at_modifier() {
            children.push(self.modifier_list());
        }
        let keyword = if self.at(TokenKind::Keyword) {
            self.current().text().to_string()
        } else {
            String::new()
        };
        match keyword.as_str() {
            "import" => self.import_decl(children),
            "struct" => self.nominal_decl(children, NodeKind::StructDecl),
            "class" => self.nominal_decl(children, NodeKind::ClassDecl),
            "enum" => self.nominal_decl(children, NodeKind::EnumDecl),
            "protocol" => self.nominal_decl(children, NodeKind::ProtocolDecl),
            "actor" => self.nominal_decl(children, NodeKind::ActorDecl),
            "extension" => self.nominal_decl(children, NodeKind::ExtensionDecl),
            "func" => self.function_decl(children),
            "init" => self.initializer_decl(children),
            "deinit" => self.deinitializer_decl(children),
            "subscript" => self.subscript_decl(children),
            "let" | "var" => self.variable_decl(children),
            "case" => self.enum_case_decl(children),
            "typealias" => self.typealias_decl(children),
            "associatedtype" => self.associated_type_decl(children),
            _ => {
                let at = self.prev_content_end();
                if children.is_empty() && !self.at_eof() {
                    children.push(self.bump());
                }
                self.report(RawDiagnostic::error("expected declaration").at(at));
                SyntaxNode::composite(NodeKind::UnexpectedNodes, children)
            }
        }
    }

    fn attribute_list(&mut self) -> SyntaxNode {
        let mut attributes = Vec::new();
        while self.at(TokenKind::AtSign) {
            let mut children = vec![self.bump()];
            if matches!(self.kind(), TokenKind::Identifier | TokenKind::Keyword) && self.glued() {
                children.push(self.bump());
                if self.at(TokenKind::LeftParen) && self.glued() {
                    self.group_into(&mut children, TokenKind::RightParen, "attribute");
                }
            }
            attributes.push(SyntaxNode::composite(NodeKind::Attribute, children));
        }
        SyntaxNode::composite(NodeKind::AttributeList, attributes)
    }

    fn modifier_list(&mut self) -> SyntaxNode {
        let mut modifiers = Vec::new();
        while self.at_modifier() {
            modifiers.push(self.bump());
            if self.at(TokenKind::LeftParen)
                && self.nth(1).kind() == TokenKind::Identifier
                && self.nth(2).kind() == TokenKind::RightParen
            {
                for _ in 0..3 {
                    modifiers.push(self.bump());
                }
            }
        }
        SyntaxNode::composite(NodeKind::DeclModifierList, modifiers)
    }

    fn import_decl(&mut self, mut children: Vec<SyntaxNode>) -> SyntaxNode {
        children.push(self.bump());
        if self.at(TokenKind::Keyword)
            && matches!(
                self.current().text(),
                "struct" | "class" | "enum" | "protocol" | "func" | "var" | "let" | "typealias"
            )
        {
            children.push(self.bump());
        }
        let mut has_path = false;
        while !self.at_eof()
            && !self.at_line_start()
            && matches!(
                self.kind(),
                TokenKind::Identifier | TokenKind::Keyword | TokenKind::Period
            )
        {
            has_path = true;
            children.push(self.bump());
        }
        if !has_path {
            self.missing("expected module name in import declaration", "insert module name", " <#module#>");
        }
        SyntaxNode::composite(NodeKind::ImportDecl, children)
    }

    fn name_into(&mut self, children: &mut Vec<SyntaxNode>, kind: NodeKind) {
        if self.at(TokenKind::Identifier) && !self.at_line_start() {
            children.push(self.bump());
        } else {
            self.missing(
                format!("expected name in {}", kind.display_name()),
                "insert name",
                " <#name#>",
            );
        }
    }

    fn nominal_decl(&mut self, mut children: Vec<SyntaxNode>, kind: NodeKind) -> SyntaxNode {
        children.push(self.bump());
        if kind == NodeKind::ExtensionDecl {
            match self.type_() {
                Some(ty) => children.push(ty),
                None => self.missing("expected type in extension", "insert type", " <#type#>"),
            }
        } else {
            self.name_into(&mut children, kind);
        }
        if self.at(TokenKind::LeftAngle) {
            children.push(self.generic_parameter_clause());
        }
        if self.at(TokenKind::Colon) {
            children.push(self.inheritance_clause());
        }
        if self.at_keyword("where") {
            children.push(self.where_clause());
        }
        if self.at(TokenKind::LeftBrace) {
            children.push(self.member_block(kind));
        } else {
            self.missing(
                format!("expected member block in {}", kind.display_name()),
                "insert member block",
                " {}",
            );
        }
        SyntaxNode::composite(kind, children)
    }

    fn member_block(&mut self, owner: NodeKind) -> SyntaxNode {
        let open_offset = self.content_start();
        let mut children = vec![self.bump()];
        children.push(self.item_list(ItemContext::Members, owner));
        if let Some(close) = self.expect_closing(TokenKind::RightBrace, owner.display_name(), open_offset) {
            children.push(close);
        }
        SyntaxNode::composite(NodeKind::MemberBlock, children)
    }

    fn function_decl(&mut self, mut children: Vec<SyntaxNode>) -> SyntaxNode {
        children.push(self.bump());
        if matches!(self.kind(), TokenKind::Identifier | TokenKind::Operator) && !self.at_line_start() {
            children.push(self.bump());
        } else {
            self.missing("expected identifier in function", "insert identifier", " <#identifier#>");
        }
        if self.at(TokenKind::LeftAngle) {
            children.push(self.generic_parameter_clause());
        }
        if self.at(TokenKind::LeftParen) {
            children.push(self.function_signature());
        } else {
            self.missing(
                "expected parameter clause in function signature",
                "insert parameter clause",
                "()",
            );
            let unexpected = self.unexpected_until(
                |p| p.at(TokenKind::LeftBrace) || p.at_line_start(),
                "in function",
                false,
            );
            children.extend(unexpected);
        }
        if self.at_keyword("where") {
            children.push(self.where_clause());
        }
        if self.at(TokenKind::LeftBrace) {
            children.push(self.code_block(NodeKind::FunctionDecl));
        }
        SyntaxNode::composite(NodeKind::FunctionDecl, children)
    }

    fn initializer_decl(&mut self, mut children: Vec<SyntaxNode>) -> SyntaxNode {
        children.push(self.bump());
        if matches!(self.kind(), TokenKind::QuestionMark | TokenKind::ExclamationMark) && self.glued() {
            children.push(self.bump());
        }
        if self.at(TokenKind::LeftAngle) {
            children.push(self.generic_parameter_clause());
        }
        if self.at(TokenKind::LeftParen) {
            children.push(self.function_signature());
        } else {
            self.missing(
                "expected parameter clause in initializer",
                "insert parameter clause",
                "()",
            );
        }
        if self.at_keyword("where") {
            children.push(self.where_clause());
        }
        if self.at(TokenKind::LeftBrace) {
            children.push(self.code_block(NodeKind::InitializerDecl));
        }
        SyntaxNode::composite(NodeKind::InitializerDecl, children)
    }

    fn deinitializer_decl(&mut self, mut children: Vec<SyntaxNode>) -> SyntaxNode {
        children.push(self.bump());
        if self.at(TokenKind::LeftBrace) {
            children.push(self.code_block(NodeKind::DeinitializerDecl));
        }
        SyntaxNode::composite(NodeKind::DeinitializerDecl, children)
    }

    fn subscript_decl(&mut self, mut children: Vec<SyntaxNode>) -> SyntaxNode {
        children.push(self.bump());
        if self.at(TokenKind::LeftAngle) {
            children.push(self.generic_parameter_clause());
        }
        if self.at(TokenKind::LeftParen) {
            children.push(self.function_signature());
        } else {
            self.missing(
                "expected parameter clause in subscript",
                "insert parameter clause",
                "()",
            );
        }
        if self.at_keyword("where") {
            children.push(self.where_clause());
        }
        if self.at(TokenKind::LeftBrace) {
            children.push(self.accessor_block());
        }
        SyntaxNode::composite(NodeKind::SubscriptDecl, children)
    }

    fn variable_decl(&mut self, mut children: Vec<SyntaxNode>) -> SyntaxNode {
        children.push(self.bump());
        loop {
            let mut binding = Vec::new();
            match self.kind() {
                TokenKind::Identifier if !self.at_line_start() => binding.push(self.bump()),
                TokenKind::LeftParen if !self.at_line_start() => {
                    self.group_into(&mut binding, TokenKind::RightParen, "pattern")
                }
                _ => self.missing("expected pattern in variable", "insert pattern", " <#pattern#>"),
            }
            if self.at(TokenKind::Colon) {
                let mut annotation = vec![self.bump()];
                match self.type_() {
                    Some(ty) => annotation.push(ty),
                    None => self.missing("expected type in type annotation", "insert type", " <#type#>"),
                }
                binding.push(SyntaxNode::composite(NodeKind::TypeAnnotation, annotation));
            }
            if self.at(TokenKind::Equal) {
                binding.push(self.initializer_clause());
            }
            if self.at(TokenKind::LeftBrace) && !self.at_line_start() {
                binding.push(self.accessor_block());
            }
            let comma = self.eat(TokenKind::Comma);
            let more = comma.is_some();
            binding.extend(comma);
            children.push(SyntaxNode::composite(NodeKind::PatternBinding, binding));
            if !more {
                break;
            }
        }
        SyntaxNode::composite(NodeKind::VariableDecl, children)
    }

    fn initializer_clause(&mut self) -> SyntaxNode {
        let mut children = vec![self.bump()];
        match self.expression(LIST_ITEM) {
            Some(expr) => children.push(expr),
            None => self.missing("expected expression in initializer", "insert expression", " <#expression#>"),
        }
        SyntaxNode::composite(NodeKind::InitializerClause, children)
    }

    fn accessor_block(&mut self) -> SyntaxNode {
        let open_offset = self.content_start();
        let mut children = vec![self.bump()];
        children.push(self.item_list(ItemContext::CodeBlock, NodeKind::AccessorBlock));
        if let Some(close) = self.expect_closing(TokenKind::RightBrace, "accessor block", open_offset) {
            children.push(close);
        }
        SyntaxNode::composite(NodeKind::AccessorBlock, children)
    }

    fn enum_case_decl(&mut self, mut children: Vec<SyntaxNode>) -> SyntaxNode {
        children.push(self.bump());
        loop {
            let mut element = Vec::new();
            if self.at(TokenKind::Identifier) && !self.at_line_start() {
                element.push(self.bump());
            } else {
                self.missing("expected identifier in enum case", "insert identifier", " <#identifier#>");
            }
            if self.at(TokenKind::LeftParen) {
                let mut values = Vec::new();
                self.group_into(&mut values, TokenKind::RightParen, "associated values");
                element.push(SyntaxNode::composite(NodeKind::ParameterClause, values));
            }
            if self.at(TokenKind::Equal) {
                element.push(self.initializer_clause());
            }
            let comma = self.eat(TokenKind::Comma);
            let more = comma.is_some();
            element.extend(comma);
            children.push(SyntaxNode::composite(NodeKind::EnumCaseElement, element));
            if !more {
                break;
            }
        }
        SyntaxNode::composite(NodeKind::EnumCaseDecl, children)
    }

    fn typealias_decl(&mut self, mut children: Vec<SyntaxNode>) -> SyntaxNode {
        children.push(self.bump());
        self.name_into(&mut children, NodeKind::TypeAliasDecl);
        if self.at(TokenKind::LeftAngle) {
            children.push(self.generic_parameter_clause());
        }
        if self.at(TokenKind::Equal) {
            let mut initializer = vec![self.bump()];
            match self.type_() {
                Some(ty) => initializer.push(ty),
                None => self.missing("expected type in typealias", "insert type", " <#type#>"),
            }
            children.push(SyntaxNode::composite(NodeKind::InitializerClause, initializer));
        } else {
            self.missing("expected '=' in typealias", "insert '='", " = <#type#>");
        }
        if self.at_keyword("where") {
            children.push(self.where_clause());
        }
        SyntaxNode::composite(NodeKind::TypeAliasDecl, children)
    }

    fn associated_type_decl(&mut self, mut children: Vec<SyntaxNode>) -> SyntaxNode {
        children.push(self.bump());
        self.name_into(&mut children, NodeKind::AssociatedTypeDecl);
        if self.at(TokenKind::Colon) {
            children.push(self.inheritance_clause());
        }
        if self.at(TokenKind::Equal) {
            let mut initializer = vec![self.bump()];
            match self.type_() {
                Some(ty) => initializer.push(ty),
                None => self.missing("expected type in associatedtype", "insert type", " <#type#>"),
            }
            children.push(SyntaxNode::composite(NodeKind::InitializerClause, initializer));
        }
        if self.at_keyword("where") {
            children.push(self.where_clause());
        }
        SyntaxNode::composite(NodeKind::AssociatedTypeDecl, children)
    }

    // ---- clauses ------------------------------------------------------

    fn generic_parameter_clause(&mut self) -> SyntaxNode {
        let mut children = Vec::new();
        self.angle_group_into(&mut children, "generic parameter clause");
        SyntaxNode::composite(NodeKind::GenericParameterClause, children)
    }

    fn inheritance_clause(&mut self) -> SyntaxNode {
        let mut children = vec![self.bump()];
        loop {
            match self.type_() {
                Some(ty) => children.push(ty),
                None => {
                    self.missing("expected type in inheritance clause", "insert type", " <#type#>");
                    break;
                }
            }
            match self.eat(TokenKind::Comma) {
                Some(comma) => children.push(comma),
                None => break,
            }
        }
        SyntaxNode::composite(NodeKind::InheritanceClause, children)
    }

    fn where_clause(&mut self) -> SyntaxNode {
        let mut children = vec![self.bump()];
        while !self.at_eof()
            && !matches!(
                self.kind(),
                TokenKind::LeftBrace | TokenKind::RightBrace | TokenKind::Semicolon | TokenKind::Equal
            )
        {
            let continues = self.pos > 0 && self.tokens[self.pos - 1].kind() == TokenKind::Comma;
            if self.at_line_start() && !continues {
                break;
            }
            match self.kind() {
                TokenKind::LeftParen => self.group_into(&mut children, TokenKind::RightParen, "where clause"),
                TokenKind::LeftSquare => self.group_into(&mut children, TokenKind::RightSquare, "where clause"),
                _ => children.push(self.bump()),
            }
        }
        SyntaxNode::composite(NodeKind::GenericWhereClause, children)
    }

    fn function_signature(&mut self) -> SyntaxNode {
        let mut children = vec![self.parameter_clause()];
        while self.at_keyword("async") || self.at_keyword("throws") || self.at_keyword("rethrows") {
            children.push(self.bump());
        }
        if self.at(TokenKind::Arrow) {
            let mut clause = vec![self.bump()];
            match self.type_() {
                Some(ty) => clause.push(ty),
                None => self.missing("expected return type in function signature", "insert return type", " <#type#>"),
            }
            children.push(SyntaxNode::composite(NodeKind::ReturnClause, clause));
        }
        SyntaxNode::composite(NodeKind::FunctionSignature, children)
    }

    fn parameter_clause(&mut self) -> SyntaxNode {
        let open_offset = self.content_start();
        let mut children = vec![self.bump()];
        loop {
            if let Some(close) = self.eat(TokenKind::RightParen) {
                children.push(close);
                break;
            }
            if self.at_eof() || self.at(TokenKind::LeftBrace) || self.at(TokenKind::RightBrace) {
                self.expect_closing(TokenKind::RightParen, "parameter clause", open_offset);
                break;
            }
            if matches!(
                self.kind(),
                TokenKind::Identifier | TokenKind::Keyword | TokenKind::AtSign
            ) {
                children.push(self.function_parameter());
            } else {
                let unexpected = self.unexpected_until(
                    |p| p.at(TokenKind::Comma) || p.at(TokenKind::LeftBrace),
                    "in parameter clause",
                    true,
                );
                children.extend(unexpected);
                children.extend(self.eat(TokenKind::Comma));
            }
        }
        SyntaxNode::composite(NodeKind::ParameterClause, children)
    }

    fn function_parameter(&mut self) -> SyntaxNode {
        let mut children = Vec::new();
        if self.at(TokenKind::AtSign) {
            children.push(self.attribute_list());
        }
        for _ in 0..2 {
            if matches!(self.kind(), TokenKind::Identifier | TokenKind::Keyword) {
                children.push(self.bump());
            }
        }
        if self.at(TokenKind::Colon) {
            children.push(self.bump());
            match self.type_() {
                Some(ty) => children.push(ty),
                None => self.missing("expected type in parameter", "insert type", " <#type#>"),
            }
        } else {
            let at = self.prev_content_end();
            self.report(
                RawDiagnostic::error("expected ':' and type in parameter")
                    .at(at)
                    .with_fix_it(RawFixIt::insert("insert ':'", at, ": "))
                    .with_fix_it(RawFixIt::insert("insert type", at, "<#type#>")),
            );
        }
        if self.at(TokenKind::Operator) && self.current().text() == "..." {
            children.push(self.bump());
        }
        if self.at(TokenKind::Equal) {
            children.push(self.initializer_clause());
        }
        children.extend(self.eat(TokenKind::Comma));
        SyntaxNode::composite(NodeKind::FunctionParameter, children)
    }

    /// A type, kept as a flat run of tokens. `None` when nothing type-like
    /// follows.
    fn type_(&mut self) -> Option<SyntaxNode> {
        let mut children = Vec::new();
        loop {
            while self.at(TokenKind::AtSign) {
                children.push(self.bump());
                if matches!(self.kind(), TokenKind::Identifier | TokenKind::Keyword) && self.glued() {
                    children.push(self.bump());
                }
            }
            while ["inout", "some", "any"].iter().any(|kw| self.at_keyword(kw)) {
                children.push(self.bump());
            }
            match self.kind() {
                TokenKind::Identifier => children.push(self.bump()),
                TokenKind::Keyword if matches!(self.current().text(), "Any" | "Self") => {
                    children.push(self.bump())
                }
                TokenKind::LeftParen => self.group_into(&mut children, TokenKind::RightParen, "tuple type"),
                TokenKind::LeftSquare => self.group_into(&mut children, TokenKind::RightSquare, "array type"),
                _ => break,
            }
            if self.at(TokenKind::LeftAngle) && self.glued() {
                self.angle_group_into(&mut children, "generic argument clause");
            }
            while matches!(self.kind(), TokenKind::QuestionMark | TokenKind::ExclamationMark) && self.glued() {
                children.push(self.bump());
            }
            if self.at(TokenKind::Operator) && self.current().text() == "..." {
                children.push(self.bump());
            }
            if self.at(TokenKind::Period)
                && matches!(self.nth(1).kind(), TokenKind::Identifier | TokenKind::Keyword)
            {
                children.push(self.bump());
                continue;
            }
            if self.at(TokenKind::Operator) && self.current().text() == "&" {
                children.push(self.bump());
                continue;
            }
            while self.at_keyword("async") || self.at_keyword("throws") || self.at_keyword("rethrows") {
                children.push(self.bump());
            }
            if self.at(TokenKind::Arrow) {
                children.push(self.bump());
                continue;
            }
            break;
        }
        (!children.is_empty()).then(|| SyntaxNode::composite(NodeKind::Type, children))
    }

    /// `<` ... `>` with nesting, tokens pushed flat into `children`.
    fn angle_group_into(&mut self, children: &mut Vec<SyntaxNode>, context: &str) {
        let open_offset = self.content_start();
        children.push(self.bump());
        let mut depth = 1usize;
        loop {
            match self.kind() {
                TokenKind::LeftAngle => {
                    depth += 1;
                    children.push(self.bump());
                }
                TokenKind::RightAngle => {
                    depth -= 1;
                    children.push(self.bump());
                    if depth == 0 {
                        return;
                    }
                }
                TokenKind::LeftParen => self.group_into(children, TokenKind::RightParen, context),
                TokenKind::LeftSquare => self.group_into(children, TokenKind::RightSquare, context),
                TokenKind::LeftBrace
                | TokenKind::RightBrace
                | TokenKind::RightParen
                | TokenKind::RightSquare
                | TokenKind::Semicolon
                | TokenKind::Equal
                | TokenKind::EndOfFile => break,
                _ => children.push(self.bump()),
            }
        }
        self.expect_closing(TokenKind::RightAngle, context, open_offset);
    }

    /// A balanced `(`/`[` group, tokens pushed flat; braces inside become
    /// closures.
    fn group_into(&mut self, children: &mut Vec<SyntaxNode>, close: TokenKind, context: &str) {
        let open_offset = self.content_start();
        children.push(self.bump());
        loop {
            match self.kind() {
                kind if kind == close => {
                    children.push(self.bump());
                    return;
                }
                TokenKind::LeftParen => self.group_into(children, TokenKind::RightParen, context),
                TokenKind::LeftSquare => self.group_into(children, TokenKind::RightSquare, context),
                TokenKind::LeftBrace => children.push(self.closure()),
                TokenKind::RightParen
                | TokenKind::RightSquare
                | TokenKind::RightBrace
                | TokenKind::EndOfFile => break,
                _ => children.push(self.bump()),
            }
        }
        self.expect_closing(close, context, open_offset);
    }

    // ---- statements ---------------------------------------------------

    fn code_block(&mut self, owner: NodeKind) -> SyntaxNode {
        let open_offset = self.content_start();
        let mut children = vec![self.bump()];
        children.push(self.item_list(ItemContext::CodeBlock, owner));
        if let Some(close) = self.expect_closing(TokenKind::RightBrace, owner.display_name(), open_offset) {
            children.push(close);
        }
        SyntaxNode::composite(NodeKind::CodeBlock, children)
    }

    fn block_into(&mut self, children: &mut Vec<SyntaxNode>, owner: NodeKind) {
        if self.at(TokenKind::LeftBrace) {
            children.push(self.code_block(owner));
        } else {
            self.missing(
                format!("expected '{{' in {}", owner.display_name()),
                "insert '{'",
                " {}",
            );
        }
    }

    fn closure(&mut self) -> SyntaxNode {
        let open_offset = self.content_start();
        let mut children = vec![self.bump()];
        children.push(self.item_list(ItemContext::Closure, NodeKind::ClosureExpr));
        if let Some(close) = self.expect_closing(TokenKind::RightBrace, "closure", open_offset) {
            children.push(close);
        }
        SyntaxNode::composite(NodeKind::ClosureExpr, children)
    }

    fn statement(&mut self, context: ItemContext, owner: NodeKind) -> SyntaxNode {
        if self.at(TokenKind::Keyword) {
            match self.current().text() {
                "return" => return self.return_stmt(),
                "throw" => return self.throw_stmt(),
                "break" => return self.jump_stmt(NodeKind::BreakStmt),
                "continue" => return self.jump_stmt(NodeKind::ContinueStmt),
                "if" => return self.if_expr(),
                "guard" => return self.guard_stmt(),
                "while" => return self.while_stmt(),
                "repeat" => return self.repeat_stmt(),
                "for" => return self.for_stmt(),
                "switch" => return self.switch_expr(),
                "do" => return self.do_stmt(),
                "defer" => return self.defer_stmt(),
                _ => {}
            }
        }
        if let Some(expr) = self.expression(STATEMENT) {
            return SyntaxNode::composite(NodeKind::ExpressionStmt, vec![expr]);
        }
        let phrase = match context {
            ItemContext::TopLevel => "at top level".to_string(),
            _ => format!("in {}", owner.display_name()),
        };
        self.unexpected_until(|p| p.at_line_start(), &phrase, true)
            .unwrap_or_else(|| SyntaxNode::composite(NodeKind::UnexpectedNodes, Vec::new()))
    }

    fn at_statement_end(&self) -> bool {
        self.at_eof()
            || self.at_line_start()
            || matches!(self.kind(), TokenKind::RightBrace | TokenKind::Semicolon)
    }

    fn return_stmt(&mut self) -> SyntaxNode {
        let mut children = vec![self.bump()];
        if !self.at_statement_end() {
            children.extend(self.expression(STATEMENT));
        }
        SyntaxNode::composite(NodeKind::ReturnStmt, children)
    }

    fn throw_stmt(&mut self) -> SyntaxNode {
        let mut children = vec![self.bump()];
        let expr = if self.at_statement_end() {
            None
        } else {
            self.expression(STATEMENT)
        };
        match expr {
            Some(expr) => children.push(expr),
            None => self.missing("expected expression in 'throw' statement", "insert expression", " <#expression#>"),
        }
        SyntaxNode::composite(NodeKind::ThrowStmt, children)
    }

    fn jump_stmt(&mut self, kind: NodeKind) -> SyntaxNode {
        let mut children = vec![self.bump()];
        if self.at(TokenKind::Identifier) && !self.at_line_start() {
            children.push(self.bump());
        }
        SyntaxNode::composite(kind, children)
    }

    fn condition_list(&mut self) -> SyntaxNode {
        let mut children = Vec::new();
        loop {
            let mut prefix = Vec::new();
            if ["let", "var", "case"].iter().any(|kw| self.at_keyword(kw)) {
                prefix.push(self.bump());
            }
            match self.expression_from(prefix, CONDITION) {
                Some(condition) => children.push(condition),
                None => {
                    self.missing("expected expression in condition", "insert condition", " <#condition#>");
                    break;
                }
            }
            match self.eat(TokenKind::Comma) {
                Some(comma) => children.push(comma),
                None => break,
            }
        }
        SyntaxNode::composite(NodeKind::ConditionList, children)
    }

    fn if_expr(&mut self) -> SyntaxNode {
        let mut children = vec![self.bump()];
        children.push(self.condition_list());
        self.block_into(&mut children, NodeKind::IfExpr);
        if self.at_keyword("else") {
            children.push(self.bump());
            if self.at_keyword("if") {
                children.push(self.if_expr());
            } else {
                self.block_into(&mut children, NodeKind::IfExpr);
            }
        }
        SyntaxNode::composite(NodeKind::IfExpr, children)
    }

    fn guard_stmt(&mut self) -> SyntaxNode {
        let mut children = vec![self.bump()];
        children.push(self.condition_list());
        if self.at_keyword("else") {
            children.push(self.bump());
        } else {
            self.missing("expected 'else' after 'guard' condition", "insert 'else'", " else");
        }
        self.block_into(&mut children, NodeKind::GuardStmt);
        SyntaxNode::composite(NodeKind::GuardStmt, children)
    }

    fn while_stmt(&mut self) -> SyntaxNode {
        let mut children = vec![self.bump()];
        children.push(self.condition_list());
        self.block_into(&mut children, NodeKind::WhileStmt);
        SyntaxNode::composite(NodeKind::WhileStmt, children)
    }

    fn repeat_stmt(&mut self) -> SyntaxNode {
        let mut children = vec![self.bump()];
        self.block_into(&mut children, NodeKind::RepeatStmt);
        if self.at_keyword("while") {
            children.push(self.bump());
            match self.expression(STATEMENT) {
                Some(expr) => children.push(expr),
                None => self.missing("expected expression in 'repeat-while' condition", "insert condition", " <#condition#>"),
            }
        } else {
            self.missing("expected 'while' after 'repeat' body", "insert 'while'", " while <#condition#>");
        }
        SyntaxNode::composite(NodeKind::RepeatStmt, children)
    }

    fn for_stmt(&mut self) -> SyntaxNode {
        let mut children = vec![self.bump()];
        let header = ExprStop {
            comma: false,
            ..CONDITION
        };
        let mut prefix = Vec::new();
        if self.at_keyword("case") || self.at_keyword("try") || self.at_keyword("await") {
            prefix.push(self.bump());
        }
        match self.expression_from(prefix, header) {
            Some(expr) => children.push(expr),
            None => self.missing("expected pattern in 'for' statement", "insert pattern", " <#pattern#>"),
        }
        self.block_into(&mut children, NodeKind::ForStmt);
        SyntaxNode::composite(NodeKind::ForStmt, children)
    }

    fn switch_expr(&mut self) -> SyntaxNode {
        let mut children = vec![self.bump()];
        match self.expression(ExprStop { brace: true, ..STATEMENT }) {
            Some(subject) => children.push(subject),
            None => self.missing("expected expression in 'switch' statement", "insert expression", " <#expression#>"),
        }
        if !self.at(TokenKind::LeftBrace) {
            self.missing("expected '{' in 'switch' statement", "insert '{'", " {}");
            return SyntaxNode::composite(NodeKind::SwitchExpr, children);
        }
        let open_offset = self.content_start();
        children.push(self.bump());
        let mut cases = Vec::new();
        while !self.at_eof() && !self.at(TokenKind::RightBrace) {
            if self.at_switch_label() {
                cases.push(self.switch_case());
            } else {
                let unexpected = self.unexpected_until(
                    |p| p.at_switch_label() || p.at_line_start(),
                    "in 'switch' statement",
                    true,
                );
                cases.extend(unexpected);
            }
        }
        children.push(SyntaxNode::composite(NodeKind::SwitchCaseList, cases));
        if let Some(close) = self.expect_closing(TokenKind::RightBrace, "'switch' statement", open_offset) {
            children.push(close);
        }
        SyntaxNode::composite(NodeKind::SwitchExpr, children)
    }

    fn switch_case(&mut self) -> SyntaxNode {
        let mut children = Vec::new();
        if self.at(TokenKind::AtSign) {
            children.push(self.attribute_list());
        }
        let is_case = self.at_keyword("case");
        if self.at_keyword("case") || self.at_keyword("default") {
            children.push(self.bump());
        }
        if is_case {
            match self.expression(CASE_LABEL) {
                Some(label) => children.push(label),
                None => self.missing("expected pattern in 'case' label", "insert pattern", " <#pattern#>"),
            }
        }
        match self.eat(TokenKind::Colon) {
            Some(colon) => children.push(colon),
            None => self.missing("expected ':' after switch label", "insert ':'", ":"),
        }
        children.push(self.item_list(ItemContext::SwitchCase, NodeKind::SwitchCase));
        SyntaxNode::composite(NodeKind::SwitchCase, children)
    }

    fn do_stmt(&mut self) -> SyntaxNode {
        let mut children = vec![self.bump()];
        self.block_into(&mut children, NodeKind::DoStmt);
        while self.at_keyword("catch") {
            children.push(self.bump());
            if !self.at(TokenKind::LeftBrace) {
                let mut prefix = Vec::new();
                if self.at_keyword("let") || self.at_keyword("var") {
                    prefix.push(self.bump());
                }
                children.extend(self.expression_from(prefix, CONDITION));
            }
            self.block_into(&mut children, NodeKind::DoStmt);
        }
        SyntaxNode::composite(NodeKind::DoStmt, children)
    }

    fn defer_stmt(&mut self) -> SyntaxNode {
        let mut children = vec![self.bump()];
        self.block_into(&mut children, NodeKind::DeferStmt);
        SyntaxNode::composite(NodeKind::DeferStmt, children)
    }

    // ---- expressions --------------------------------------------------

    fn can_start_expression(&self) -> bool {
        match self.kind() {
            TokenKind::RightParen
            | TokenKind::RightSquare
            | TokenKind::RightBrace
            | TokenKind::RightAngle
            | TokenKind::Comma
            | TokenKind::Colon
            | TokenKind::Semicolon
            | TokenKind::Equal
            | TokenKind::Arrow
            | TokenKind::EndOfFile => false,
            TokenKind::Keyword => !matches!(
                self.current().text(),
                "else" | "case" | "default" | "catch" | "in" | "where" | "throws" | "rethrows"
            ),
            _ => true,
        }
    }

    /// Keywords that begin the next statement rather than continue an
    /// expression.
    fn at_statement_keyword(&self) -> bool {
        self.at(TokenKind::Keyword)
            && matches!(
                self.current().text(),
                "return"
                    | "let"
                    | "var"
                    | "func"
                    | "if"
                    | "guard"
                    | "while"
                    | "for"
                    | "switch"
                    | "case"
                    | "default"
                    | "else"
                    | "catch"
                    | "do"
                    | "defer"
                    | "repeat"
                    | "break"
                    | "continue"
                    | "throw"
                    | "struct"
                    | "class"
                    | "enum"
                    | "protocol"
                    | "extension"
                    | "import"
                    | "typealias"
            )
    }

    /// Whether a token at the start of a line still belongs to the
    /// expression on the previous line.
    fn continues_expression(&self) -> bool {
        let continuing = |kind: TokenKind| {
            matches!(
                kind,
                TokenKind::Operator | TokenKind::Equal | TokenKind::Period | TokenKind::Arrow
            )
        };
        continuing(self.kind()) || (self.pos > 0 && continuing(self.tokens[self.pos - 1].kind()))
    }

    fn expression(&mut self, stop: ExprStop) -> Option<SyntaxNode> {
        self.expression_from(Vec::new(), stop)
    }

    fn expression_from(&mut self, mut children: Vec<SyntaxNode>, stop: ExprStop) -> Option<SyntaxNode> {
        if children.is_empty() && !self.can_start_expression() {
            return None;
        }
        while !self.at_eof() {
            if !children.is_empty() && self.at_line_start() && !self.continues_expression() {
                break;
            }
            match self.kind() {
                TokenKind::RightParen
                | TokenKind::RightSquare
                | TokenKind::RightBrace
                | TokenKind::Semicolon => break,
                TokenKind::Comma if stop.comma => break,
                TokenKind::Colon if stop.colon => break,
                TokenKind::LeftBrace if stop.brace => break,
                TokenKind::LeftBrace => children.push(self.closure()),
                TokenKind::LeftParen => self.group_into(&mut children, TokenKind::RightParen, "expression"),
                TokenKind::LeftSquare => self.group_into(&mut children, TokenKind::RightSquare, "expression"),
                TokenKind::Pound => {
                    children.push(self.bump());
                    if matches!(self.kind(), TokenKind::Identifier | TokenKind::Keyword) && self.glued() {
                        children.push(self.bump());
                    }
                }
                TokenKind::Keyword if !children.is_empty() && self.at_statement_keyword() => break,
                _ => children.push(self.bump()),
            }
        }
        (!children.is_empty()).then(|| SyntaxNode::composite(NodeKind::Expr, children))
    }
}

/// Closest declaration keyword for a misspelled identifier, if any.
fn keyword_suggestion(word: &str) -> Option<&'static str> {
    let max_distance = match word.chars().count() {
        0..=3 => return None,
        4 => 1,
        _ => 2,
    };
    DECLARATION_KEYWORDS
        .iter()
        .map(|keyword| (*keyword, strsim::damerau_levenshtein(word, keyword)))
        .filter(|(_, distance)| (1..=max_distance).contains(distance))
        .min_by_key(|(_, distance)| *distance)
        .map(|(keyword, _)| keyword)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::syntax::Walk;

    fn kinds_in(text: &str) -> Vec<NodeKind> {
        let tree = parse("t.swift", text).tree;
        let mut kinds = Vec::new();
        tree.walk(|node, _, _| {
            kinds.extend(node.node_kind());
            Walk::Continue
        });
        kinds
    }

    #[test]
    fn struct_with_members() {
        let parsed = parse("t.swift", "public struct S {\n    public let x: Int\n    var y = 2\n}\n");
        assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
        let kinds = kinds_in("public struct S {\n    public let x: Int\n    var y = 2\n}\n");
        assert!(kinds.contains(&NodeKind::StructDecl));
        assert!(kinds.contains(&NodeKind::MemberBlockItemList));
        assert_eq!(kinds.iter().filter(|k| **k == NodeKind::VariableDecl).count(), 2);
        assert!(kinds.contains(&NodeKind::DeclModifierList));
    }

    #[test]
    fn function_with_statements() {
        let text = "func f(a: Int, _ b: [String] = []) async throws -> Int? {\n    guard a > 0 else { return nil }\n    for x in b where !x.isEmpty {\n        print(x)\n    }\n    return a\n}\n";
        let parsed = parse("t.swift", text);
        assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
        let kinds = kinds_in(text);
        for kind in [
            NodeKind::FunctionDecl,
            NodeKind::FunctionSignature,
            NodeKind::ReturnClause,
            NodeKind::GuardStmt,
            NodeKind::ForStmt,
            NodeKind::ReturnStmt,
        ] {
            assert!(kinds.contains(&kind), "missing {kind:?}");
        }
        assert_eq!(kinds.iter().filter(|k| **k == NodeKind::FunctionParameter).count(), 2);
    }

    #[test]
    fn switch_and_enum() {
        let text = "enum E { case a, b(Int) }\nswitch e {\ncase .a:\n    break\ncase .b(let n):\n    print(n)\ndefault:\n    break\n}\n";
        let parsed = parse("t.swift", text);
        assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
        let kinds = kinds_in(text);
        assert_eq!(kinds.iter().filter(|k| **k == NodeKind::SwitchCase).count(), 3);
        assert_eq!(kinds.iter().filter(|k| **k == NodeKind::EnumCaseElement).count(), 2);
    }

    #[test]
    fn trailing_closures_and_multiline_calls() {
        let text = "let xs = items\n    .map { $0 * 2 }\n    .filter { value in value > 1 }\nprint(xs)\n";
        let parsed = parse("t.swift", text);
        assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
        let kinds = kinds_in(text);
        assert_eq!(kinds.iter().filter(|k| **k == NodeKind::ClosureExpr).count(), 2);
        // One per closure body plus the top-level call.
        assert_eq!(kinds.iter().filter(|k| **k == NodeKind::ExpressionStmt).count(), 3);
    }

    #[test]
    fn missing_parameter_clause_reports_unexpected_code() {
        let text = "func bad: <T>(value: T) -> T { return value }";
        let parsed = parse("t.swift", text);
        let messages: Vec<_> = parsed.diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert!(messages.contains(&"expected parameter clause in function signature"));
        let unexpected = parsed
            .diagnostics
            .iter()
            .find(|d| d.message.starts_with("unexpected code"))
            .unwrap();
        assert_eq!(unexpected.message, "unexpected code ': <T>(value: T) -> T' in function");
        assert_eq!(unexpected.offset, Some(8));
        let node = parsed.tree.node_at(unexpected.node.as_ref().unwrap()).unwrap();
        assert_eq!(node.node_kind(), Some(NodeKind::UnexpectedNodes));
        assert_eq!(parsed.tree.render(), text);
    }

    #[test]
    fn unexpected_member_offset_includes_leading_trivia() {
        let text = "struct S {\n    let a = 1\n    ) oops\n}\n";
        let parsed = parse("t.swift", text);
        let diagnostic = parsed
            .diagnostics
            .iter()
            .find(|d| d.message.starts_with("unexpected code"))
            .unwrap();
        assert_eq!(diagnostic.message, "unexpected code ') oops' in struct");
        // Full start of ')' is right after "let a = 1".
        assert_eq!(diagnostic.offset, Some(text.find("1\n").unwrap() + 1));
    }

    #[test]
    fn misspelled_keyword_gets_suggestion() {
        let parsed = parse("t.swift", "struct S {\n    fucn go() {}\n}\n");
        let diagnostic = parsed
            .diagnostics
            .iter()
            .find(|d| d.message.starts_with("unexpected code"))
            .unwrap();
        assert_eq!(diagnostic.fix_its.len(), 1);
        assert_eq!(diagnostic.fix_its[0].message, "replace 'fucn' with 'func'");
    }

    #[test]
    fn parameter_without_type_has_two_fix_its() {
        let parsed = parse("t.swift", "func f(x) {}");
        let diagnostic = parsed
            .diagnostics
            .iter()
            .find(|d| d.message == "expected ':' and type in parameter")
            .unwrap();
        assert_eq!(diagnostic.offset, Some(8));
        assert_eq!(diagnostic.fix_its.len(), 2);
    }

    #[test]
    fn missing_closing_brace_has_note() {
        let parsed = parse("t.swift", "struct S {\n    let a = 1\n");
        let diagnostic = parsed
            .diagnostics
            .iter()
            .find(|d| d.message == "expected '}' to end struct")
            .unwrap();
        assert_eq!(diagnostic.notes[0].message, "to match this opening '{'");
        assert_eq!(diagnostic.notes[0].offset, Some(9));
    }

    #[test]
    fn extraneous_brace_at_top_level() {
        let parsed = parse("t.swift", "let a = 1\n}\n");
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(parsed.diagnostics[0].message, "extraneous '}' at top level");
        assert_eq!(parsed.tree.render(), "let a = 1\n}\n");
    }

    #[test]
    fn guard_without_else() {
        let parsed = parse("t.swift", "func f() {\n    guard ok { return }\n}\n");
        assert!(parsed
            .diagnostics
            .iter()
            .any(|d| d.message == "expected 'else' after 'guard' condition"));
    }

    #[test]
    fn keyword_suggestions() {
        assert_eq!(keyword_suggestion("fucn"), Some("func"));
        assert_eq!(keyword_suggestion("stuct"), Some("struct"));
        assert_eq!(keyword_suggestion("get"), None);
        assert_eq!(keyword_suggestion("completelyDifferent"), None);
    }
}

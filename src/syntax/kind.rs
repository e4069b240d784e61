//! Token and node kinds.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Identifier,
    Keyword,
    IntegerLiteral,
    FloatLiteral,
    StringLiteral,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftSquare,
    RightSquare,
    LeftAngle,
    RightAngle,
    Comma,
    Colon,
    Semicolon,
    Period,
    Equal,
    Arrow,
    AtSign,
    Pound,
    QuestionMark,
    ExclamationMark,
    Operator,
    Unknown,
    EndOfFile,
}

impl TokenKind {
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Keyword => "keyword",
            TokenKind::IntegerLiteral => "integer literal",
            TokenKind::FloatLiteral => "float literal",
            TokenKind::StringLiteral => "string literal",
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::LeftBrace => "'{'",
            TokenKind::RightBrace => "'}'",
            TokenKind::LeftSquare => "'['",
            TokenKind::RightSquare => "']'",
            TokenKind::LeftAngle => "'<'",
            TokenKind::RightAngle => "'>'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Semicolon => "';'",
            TokenKind::Period => "'.'",
            TokenKind::Equal => "'='",
            TokenKind::Arrow => "'->'",
            TokenKind::AtSign => "'@'",
            TokenKind::Pound => "'#'",
            TokenKind::QuestionMark => "'?'",
            TokenKind::ExclamationMark => "'!'",
            TokenKind::Operator => "operator",
            TokenKind::Unknown => "unknown",
            TokenKind::EndOfFile => "end of file",
        }
    }
}

const KEYWORDS: &[&str] = &[
    "actor",
    "any",
    "Any",
    "as",
    "associatedtype",
    "async",
    "await",
    "break",
    "case",
    "catch",
    "class",
    "continue",
    "convenience",
    "default",
    "defer",
    "deinit",
    "do",
    "dynamic",
    "else",
    "enum",
    "extension",
    "fallthrough",
    "false",
    "fileprivate",
    "final",
    "for",
    "func",
    "guard",
    "if",
    "import",
    "in",
    "indirect",
    "init",
    "inout",
    "internal",
    "is",
    "lazy",
    "let",
    "mutating",
    "nil",
    "nonmutating",
    "open",
    "operator",
    "optional",
    "override",
    "private",
    "protocol",
    "public",
    "repeat",
    "required",
    "rethrows",
    "return",
    "self",
    "Self",
    "some",
    "static",
    "struct",
    "subscript",
    "super",
    "switch",
    "throw",
    "throws",
    "true",
    "try",
    "typealias",
    "unowned",
    "var",
    "weak",
    "where",
    "while",
];

/// Keywords that introduce a declaration.
pub const DECLARATION_KEYWORDS: &[&str] = &[
    "actor",
    "associatedtype",
    "case",
    "class",
    "deinit",
    "enum",
    "extension",
    "func",
    "import",
    "init",
    "let",
    "protocol",
    "struct",
    "subscript",
    "typealias",
    "var",
];

/// Keywords that may precede a declaration keyword.
pub const MODIFIER_KEYWORDS: &[&str] = &[
    "class",
    "convenience",
    "dynamic",
    "fileprivate",
    "final",
    "indirect",
    "internal",
    "lazy",
    "mutating",
    "nonmutating",
    "open",
    "optional",
    "override",
    "private",
    "public",
    "required",
    "static",
    "unowned",
    "weak",
];

pub fn is_keyword(text: &str) -> bool {
    KEYWORDS.contains(&text)
}

pub fn is_declaration_keyword(text: &str) -> bool {
    DECLARATION_KEYWORDS.contains(&text)
}

pub fn is_modifier_keyword(text: &str) -> bool {
    MODIFIER_KEYWORDS.contains(&text)
}

/// Kind of a composite node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    SourceFile,
    CodeBlockItemList,
    CodeBlock,
    MemberBlock,
    MemberBlockItemList,
    AttributeList,
    Attribute,
    DeclModifierList,
    ImportDecl,
    StructDecl,
    ClassDecl,
    EnumDecl,
    ProtocolDecl,
    ExtensionDecl,
    ActorDecl,
    FunctionDecl,
    InitializerDecl,
    DeinitializerDecl,
    SubscriptDecl,
    VariableDecl,
    EnumCaseDecl,
    EnumCaseElement,
    TypeAliasDecl,
    AssociatedTypeDecl,
    GenericParameterClause,
    InheritanceClause,
    GenericWhereClause,
    FunctionSignature,
    ParameterClause,
    FunctionParameter,
    ReturnClause,
    PatternBinding,
    TypeAnnotation,
    InitializerClause,
    AccessorBlock,
    Type,
    Expr,
    ClosureExpr,
    ConditionList,
    ReturnStmt,
    ThrowStmt,
    BreakStmt,
    ContinueStmt,
    IfExpr,
    GuardStmt,
    WhileStmt,
    RepeatStmt,
    ForStmt,
    SwitchExpr,
    SwitchCaseList,
    SwitchCase,
    DoStmt,
    DeferStmt,
    ExpressionStmt,
    UnexpectedNodes,
}

/// Grammatical role of a node, used by the mutation policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeCategory {
    Token,
    Declaration,
    Statement,
    Expression,
    Type,
    Clause,
    List,
    Unexpected,
    SourceFile,
}

impl fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeCategory::Token => "token",
            NodeCategory::Declaration => "declaration",
            NodeCategory::Statement => "statement",
            NodeCategory::Expression => "expression",
            NodeCategory::Type => "type",
            NodeCategory::Clause => "clause",
            NodeCategory::List => "list",
            NodeCategory::Unexpected => "unexpected code",
            NodeCategory::SourceFile => "source file",
        };
        f.write_str(name)
    }
}

impl NodeKind {
    pub fn category(self) -> NodeCategory {
        use NodeKind::*;
        match self {
            SourceFile => NodeCategory::SourceFile,
            CodeBlockItemList | MemberBlockItemList | SwitchCaseList | AttributeList
            | DeclModifierList | ConditionList => NodeCategory::List,
            ImportDecl | StructDecl | ClassDecl | EnumDecl | ProtocolDecl | ExtensionDecl
            | ActorDecl | FunctionDecl | InitializerDecl | DeinitializerDecl | SubscriptDecl
            | VariableDecl | EnumCaseDecl | TypeAliasDecl | AssociatedTypeDecl => {
                NodeCategory::Declaration
            }
            ReturnStmt | ThrowStmt | BreakStmt | ContinueStmt | GuardStmt | WhileStmt
            | RepeatStmt | ForStmt | DoStmt | DeferStmt | ExpressionStmt => NodeCategory::Statement,
            Expr | ClosureExpr | IfExpr | SwitchExpr => NodeCategory::Expression,
            Type => NodeCategory::Type,
            UnexpectedNodes => NodeCategory::Unexpected,
            CodeBlock | MemberBlock | Attribute | EnumCaseElement | GenericParameterClause
            | InheritanceClause | GenericWhereClause | FunctionSignature | ParameterClause
            | FunctionParameter | ReturnClause | PatternBinding | TypeAnnotation
            | InitializerClause | AccessorBlock | SwitchCase => NodeCategory::Clause,
        }
    }

    pub fn is_declaration(self) -> bool {
        self.category() == NodeCategory::Declaration
    }

    /// Short human name used in diagnostics ("struct", "function", ...).
    pub fn display_name(self) -> &'static str {
        use NodeKind::*;
        match self {
            SourceFile => "source file",
            CodeBlockItemList => "code block item list",
            CodeBlock => "code block",
            MemberBlock => "member block",
            MemberBlockItemList => "member block item list",
            AttributeList => "attribute list",
            Attribute => "attribute",
            DeclModifierList => "modifier list",
            ImportDecl => "import",
            StructDecl => "struct",
            ClassDecl => "class",
            EnumDecl => "enum",
            ProtocolDecl => "protocol",
            ExtensionDecl => "extension",
            ActorDecl => "actor",
            FunctionDecl => "function",
            InitializerDecl => "initializer",
            DeinitializerDecl => "deinitializer",
            SubscriptDecl => "subscript",
            VariableDecl => "variable",
            EnumCaseDecl => "enum case",
            EnumCaseElement => "enum case element",
            TypeAliasDecl => "typealias",
            AssociatedTypeDecl => "associatedtype",
            GenericParameterClause => "generic parameter clause",
            InheritanceClause => "inheritance clause",
            GenericWhereClause => "where clause",
            FunctionSignature => "function signature",
            ParameterClause => "parameter clause",
            FunctionParameter => "parameter",
            ReturnClause => "return clause",
            PatternBinding => "pattern binding",
            TypeAnnotation => "type annotation",
            InitializerClause => "initializer clause",
            AccessorBlock => "accessor block",
            Type => "type",
            Expr => "expression",
            ClosureExpr => "closure",
            ConditionList => "condition list",
            ReturnStmt => "'return' statement",
            ThrowStmt => "'throw' statement",
            BreakStmt => "'break' statement",
            ContinueStmt => "'continue' statement",
            IfExpr => "'if' statement",
            GuardStmt => "'guard' statement",
            WhileStmt => "'while' statement",
            RepeatStmt => "'repeat' statement",
            ForStmt => "'for' statement",
            SwitchExpr => "'switch' statement",
            SwitchCaseList => "switch case list",
            SwitchCase => "switch case",
            DoStmt => "'do' statement",
            DeferStmt => "'defer' statement",
            ExpressionStmt => "expression statement",
            UnexpectedNodes => "unexpected code",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declaration_kinds_are_declarations() {
        assert!(NodeKind::StructDecl.is_declaration());
        assert!(NodeKind::VariableDecl.is_declaration());
        assert!(!NodeKind::CodeBlock.is_declaration());
        assert_eq!(NodeKind::ReturnStmt.category(), NodeCategory::Statement);
        assert_eq!(NodeKind::IfExpr.category(), NodeCategory::Expression);
    }

    #[test]
    fn keyword_tables() {
        assert!(is_keyword("func"));
        assert!(!is_keyword("get"));
        assert!(is_declaration_keyword("struct"));
        assert!(is_modifier_keyword("public"));
        for kw in DECLARATION_KEYWORDS.iter().chain(MODIFIER_KEYWORDS) {
            assert!(is_keyword(kw), "{kw} missing from keyword table");
        }
    }
}

//! Which nodes may stand where.

use crate::mutation::NodeOperationError;
use crate::syntax::{NodeCategory, NodeKind, SyntaxNode};

/// Replacement rules. Tokens only replace tokens; composites need a
/// compatible role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplacementPolicy {
    /// Inside a code block item list, let declarations, statements and
    /// expressions replace one another.
    pub allow_item_swap: bool,
}

impl Default for ReplacementPolicy {
    fn default() -> Self {
        Self {
            allow_item_swap: true,
        }
    }
}

fn describe(node: &SyntaxNode) -> String {
    match node.node_kind() {
        Some(kind) => kind.display_name().to_string(),
        None => "token".to_string(),
    }
}

fn is_code_item(category: NodeCategory) -> bool {
    matches!(
        category,
        NodeCategory::Declaration | NodeCategory::Statement | NodeCategory::Expression
    )
}

impl ReplacementPolicy {
    pub fn check_replacement(
        &self,
        target: &SyntaxNode,
        parent: Option<NodeKind>,
        replacement: &SyntaxNode,
    ) -> Result<(), NodeOperationError> {
        use NodeCategory as C;
        let (from, to) = (target.category(), replacement.category());
        match (from, to) {
            (C::Token, C::Token) => Ok(()),
            (C::Token, _) => Err(NodeOperationError::replacement(
                "replacement node is not a token",
            )),
            (_, C::Token) => Err(NodeOperationError::replacement(format!(
                "a token cannot replace a {}",
                describe(target)
            ))),
            (_, C::SourceFile) | (C::SourceFile, _) => Err(NodeOperationError::replacement(
                "a source file cannot be nested",
            )),
            (C::Unexpected, _) => {
                accepts(parent, replacement).map_err(NodeOperationError::replacement)
            }
            (C::Clause | C::List, _) => {
                if target.node_kind() == replacement.node_kind() {
                    Ok(())
                } else {
                    Err(NodeOperationError::replacement(format!(
                        "a {} cannot replace a {}",
                        describe(replacement),
                        describe(target)
                    )))
                }
            }
            (a, b) if a == b => Ok(()),
            (a, b)
                if self.allow_item_swap
                    && parent == Some(NodeKind::CodeBlockItemList)
                    && is_code_item(a)
                    && is_code_item(b) =>
            {
                Ok(())
            }
            (a, b) => Err(NodeOperationError::replacement(format!(
                "a {b} cannot replace a {a}"
            ))),
        }
    }
}

/// Whether a child list of `parent` may hold `node`. The error is the reason.
fn accepts(parent: Option<NodeKind>, node: &SyntaxNode) -> Result<(), String> {
    let category = node.category();
    let Some(parent) = parent else {
        return Err("the root has no parent".to_string());
    };
    let (ok, expected) = match parent {
        NodeKind::CodeBlockItemList => (
            is_code_item(category),
            "declarations, statements and expressions",
        ),
        NodeKind::MemberBlockItemList => (category == NodeCategory::Declaration, "declarations"),
        NodeKind::SwitchCaseList => (node.node_kind() == Some(NodeKind::SwitchCase), "switch cases"),
        _ => (node.is_token(), "tokens"),
    };
    if ok {
        Ok(())
    } else {
        Err(format!(
            "a {} accepts only {expected}, not a {}",
            parent.display_name(),
            describe(node)
        ))
    }
}

/// Check that every node may be spliced next to an anchor whose parent is
/// `parent`.
pub fn check_insertion(parent: Option<NodeKind>, nodes: &[SyntaxNode]) -> Result<(), NodeOperationError> {
    for node in nodes {
        accepts(parent, node).map_err(NodeOperationError::insertion)?;
    }
    Ok(())
}

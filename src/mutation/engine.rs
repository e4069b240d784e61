use crate::mutation::docs::rewrite_documentation;
use crate::mutation::policy::{check_insertion, ReplacementPolicy};
use crate::mutation::rebuild::{rebuild_parent, replace_at};
use crate::mutation::NodeOperationError;
use crate::path::{compute, resolve, AddressingScheme, NodePath, ResolvedNode};
use crate::syntax::trivia::contains_newline;
use crate::syntax::{ChildIndices, NodeKind, SyntaxNode, SyntaxTree};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace};

/// Where inserted nodes go relative to the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    Before,
    #[default]
    After,
}

impl fmt::Display for InsertPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertPosition::Before => f.write_str("before"),
            InsertPosition::After => f.write_str("after"),
        }
    }
}

/// Structural edits over immutable trees.
///
/// Every operation resolves its path first, so a path that does not resolve
/// always fails with [`NodeOperationError::NodeNotFound`] whatever else is
/// wrong with the request. The input tree is never modified; the returned
/// tree shares every subtree off the edited ancestor chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct MutationEngine {
    policy: ReplacementPolicy,
}

impl MutationEngine {
    pub fn new(policy: ReplacementPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ReplacementPolicy {
        self.policy
    }

    pub fn replace(
        &self,
        tree: &SyntaxTree,
        path: &NodePath,
        new_node: SyntaxNode,
    ) -> Result<SyntaxTree, NodeOperationError> {
        let target = resolve(tree, path)?;
        if target.indices.is_root() {
            return Err(NodeOperationError::modification(
                "the root cannot be replaced",
            ));
        }
        let parent = parent_kind(tree, &target.indices);
        self.policy.check_replacement(&target.node, parent, &new_node)?;
        trace!(
            %path,
            from = %target.node.kind_name(),
            to = %new_node.kind_name(),
            "replacing node"
        );
        let root = replace_at(tree.root(), &target.indices, new_node)?;
        debug!(%path, offset = target.offset, "replaced node");
        Ok(tree.with_root(root))
    }

    /// Remove the node at `path`, returning its full rendering (own trivia
    /// included) and the new tree. Neighbouring trivia is left alone.
    pub fn delete(
        &self,
        tree: &SyntaxTree,
        path: &NodePath,
    ) -> Result<(String, SyntaxTree), NodeOperationError> {
        let target = resolve(tree, path)?;
        let Some((parent, slot)) = target.indices.split_last() else {
            return Err(NodeOperationError::modification(
                "the root cannot be deleted",
            ));
        };
        let removed = target.node.render();
        let root = rebuild_parent(tree.root(), parent.as_slice(), |children| {
            if slot >= children.len() {
                return Err(NodeOperationError::modification(format!(
                    "child index {slot} is out of range"
                )));
            }
            children.remove(slot);
            Ok(())
        })?;
        debug!(%path, offset = target.offset, bytes = removed.len(), "deleted node");
        Ok((removed, tree.with_root(root)))
    }

    /// Splice `nodes` next to the anchor at `anchor`.
    pub fn insert(
        &self,
        tree: &SyntaxTree,
        nodes: Vec<SyntaxNode>,
        anchor: &NodePath,
        position: InsertPosition,
    ) -> Result<SyntaxTree, NodeOperationError> {
        let target = resolve(tree, anchor)?;
        if nodes.is_empty() {
            return Err(NodeOperationError::modification("nothing to insert"));
        }
        let Some((parent, slot)) = target.indices.split_last() else {
            return Err(NodeOperationError::insertion(
                "the root has no siblings",
            ));
        };
        check_insertion(parent_kind(tree, &target.indices), &nodes)?;
        let at = match position {
            InsertPosition::Before => slot,
            InsertPosition::After => slot + 1,
        };
        let count = nodes.len();
        let root = rebuild_parent(tree.root(), parent.as_slice(), |children| {
            if at > children.len() {
                return Err(NodeOperationError::modification(format!(
                    "child index {at} is out of range"
                )));
            }
            for (i, node) in nodes.into_iter().enumerate() {
                children.insert(at + i, node);
            }
            Ok(())
        })?;
        debug!(%anchor, %position, count, "inserted nodes");
        Ok(tree.with_root(root))
    }

    /// Replace the documentation in a token's leading trivia with `new_text`,
    /// or only remove it when `new_text` is empty or absent.
    pub fn modify_leading_trivia(
        &self,
        tree: &SyntaxTree,
        path: &NodePath,
        new_text: Option<&str>,
    ) -> Result<SyntaxTree, NodeOperationError> {
        let target = resolve(tree, path)?;
        let token = target.node.as_token().ok_or_else(|| path.not_found())?;
        let leading = token.leading_trivia();
        let starts_line = target.offset == 0 || contains_newline(leading);
        let newline = newline_style(tree);
        let trivia = rewrite_documentation(leading, new_text, newline, starts_line);
        trace!(%path, before = leading.len(), after = trivia.len(), "rewrote leading trivia");
        let root = replace_at(
            tree.root(),
            &target.indices,
            token.with_leading_trivia(trivia).into(),
        )?;
        debug!(%path, documented = new_text.is_some_and(|t| !t.trim().is_empty()), "updated documentation");
        Ok(tree.with_root(root))
    }

    /// [`Self::modify_leading_trivia`] on the first token of the declaration
    /// at `path`. Token paths are used as they are.
    pub fn modify_documentation(
        &self,
        tree: &SyntaxTree,
        path: &NodePath,
        new_text: Option<&str>,
    ) -> Result<SyntaxTree, NodeOperationError> {
        if path.scheme == AddressingScheme::Token {
            return self.modify_leading_trivia(tree, path, new_text);
        }
        let declaration = resolve(tree, path)?;
        let first = first_token_indices(&declaration).ok_or_else(|| path.not_found())?;
        let token_path = compute(tree, &first, AddressingScheme::Token)
            .map(NodePath::token)
            .ok_or_else(|| path.not_found())?;
        self.modify_leading_trivia(tree, &token_path, new_text)
    }
}

fn parent_kind(tree: &SyntaxTree, indices: &ChildIndices) -> Option<NodeKind> {
    let (parent, _) = indices.split_last()?;
    tree.node_at(&parent)?.node_kind()
}

/// Indices of the first token under a resolved node.
fn first_token_indices(resolved: &ResolvedNode) -> Option<ChildIndices> {
    let mut indices = resolved.indices.clone();
    let mut node = &resolved.node;
    while let SyntaxNode::Composite(composite) = node {
        let (i, child) = composite
            .children()
            .iter()
            .enumerate()
            .find(|(_, child)| child.first_token().is_some())?;
        indices = indices.child(i);
        node = child;
    }
    Some(indices)
}

/// `"\r\n"` when the document already uses it, `"\n"` otherwise.
fn newline_style(tree: &SyntaxTree) -> &'static str {
    let mut crlf = false;
    tree.walk(|node, _, _| {
        if crlf {
            return crate::syntax::Walk::SkipChildren;
        }
        if let Some(token) = node.as_token() {
            crlf = token
                .leading_trivia()
                .iter()
                .any(|piece| piece.is_newline() && piece.text == "\r\n");
        }
        crate::syntax::Walk::Continue
    });
    if crlf {
        "\r\n"
    } else {
        "\n"
    }
}

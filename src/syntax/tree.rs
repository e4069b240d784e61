//! Tree snapshots, child-index addresses and pre-order walks.

use crate::source::SourceDocument;
use crate::syntax::kind::NodeKind;
use crate::syntax::node::SyntaxNode;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// 0-based child index trail from the root to a node.
///
/// This is the structural address used internally (raw diagnostic node
/// references, rebuilding). Like paths, it is only meaningful for the tree
/// snapshot it was taken from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub struct ChildIndices(Vec<usize>);

impl ChildIndices {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Parent trail and this node's slot within the parent.
    pub fn split_last(&self) -> Option<(ChildIndices, usize)> {
        let (last, rest) = self.0.split_last()?;
        Some((ChildIndices(rest.to_vec()), *last))
    }

    /// Whether `self` is a proper prefix of `other`.
    pub fn is_ancestor_of(&self, other: &ChildIndices) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }
}

impl From<Vec<usize>> for ChildIndices {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for ChildIndices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, idx) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{idx}")?;
        }
        write!(f, "]")
    }
}

/// Controls a pre-order walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    Continue,
    SkipChildren,
}

/// An immutable syntax tree plus the identity of the document it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    identity: Arc<str>,
    root: SyntaxNode,
}

impl SyntaxTree {
    pub fn new(identity: impl Into<Arc<str>>, root: SyntaxNode) -> Self {
        Self {
            identity: identity.into(),
            root,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    /// Same identity, different root. Used by the mutation engine.
    pub(crate) fn with_root(&self, root: SyntaxNode) -> SyntaxTree {
        SyntaxTree {
            identity: self.identity.clone(),
            root,
        }
    }

    /// Concatenation of every token and its trivia.
    pub fn render(&self) -> String {
        self.root.render()
    }

    /// The document this tree renders to.
    pub fn source(&self) -> SourceDocument {
        SourceDocument::new(self.identity.clone(), self.render())
    }

    pub fn node_at(&self, indices: &ChildIndices) -> Option<&SyntaxNode> {
        let mut node = &self.root;
        for &idx in indices.as_slice() {
            node = node.children().get(idx)?;
        }
        Some(node)
    }

    /// Byte offset where the node at `indices` starts, leading trivia included.
    pub fn offset_of(&self, indices: &ChildIndices) -> Option<usize> {
        let mut node = &self.root;
        let mut offset = 0;
        for &idx in indices.as_slice() {
            let children = node.children();
            let child = children.get(idx)?;
            offset += children[..idx].iter().map(SyntaxNode::full_width).sum::<usize>();
            node = child;
        }
        Some(offset)
    }

    /// Pre-order walk over every node with its indices and start offset.
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(&SyntaxNode, &ChildIndices, usize) -> Walk,
    {
        walk_node(&self.root, &ChildIndices::root(), 0, &mut visit);
    }

    /// Deepest composite of `kind` whose full range starts at `offset`.
    pub fn find_composite(&self, kind: NodeKind, offset: usize) -> Option<ChildIndices> {
        let mut found = None;
        self.walk(|node, indices, start| {
            let end = start + node.full_width();
            if offset < start || offset > end {
                return Walk::SkipChildren;
            }
            if start == offset && node.node_kind() == Some(kind) {
                found = Some(indices.clone());
            }
            Walk::Continue
        });
        found
    }
}

pub(crate) fn walk_node<F>(node: &SyntaxNode, indices: &ChildIndices, offset: usize, visit: &mut F)
where
    F: FnMut(&SyntaxNode, &ChildIndices, usize) -> Walk,
{
    if visit(node, indices, offset) == Walk::SkipChildren {
        return;
    }
    let mut child_offset = offset;
    for (i, child) in node.children().iter().enumerate() {
        walk_node(child, &indices.child(i), child_offset, visit);
        child_offset += child.full_width();
    }
}

impl fmt::Display for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn offsets_follow_children() {
        let tree = parse("t.swift", "let a = 1\nlet b = 2\n").tree;
        let mut starts = Vec::new();
        tree.walk(|node, indices, offset| {
            if node.is_declaration() {
                starts.push(offset);
                assert_eq!(tree.offset_of(indices), Some(offset));
                return Walk::SkipChildren;
            }
            Walk::Continue
        });
        assert_eq!(starts, vec![0, 9]);
    }

    #[test]
    fn node_at_follows_indices() {
        let tree = parse("t.swift", "let a = 1").tree;
        assert_eq!(tree.node_at(&ChildIndices::root()), Some(tree.root()));
        assert!(tree.node_at(&ChildIndices::from(vec![7])).is_none());
    }

    #[test]
    fn child_indices_relations() {
        let parent = ChildIndices::from(vec![0, 1]);
        let child = parent.child(3);
        assert!(parent.is_ancestor_of(&child));
        assert!(!child.is_ancestor_of(&parent));
        assert_eq!(child.split_last(), Some((parent, 3)));
        assert_eq!(ChildIndices::root().split_last(), None);
    }
}

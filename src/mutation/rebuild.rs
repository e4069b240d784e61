//! Path copying: only the composites between the root and the edited slot
//! are reallocated. Every other subtree is shared with the input tree.

use crate::mutation::NodeOperationError;
use crate::syntax::{ChildIndices, SyntaxNode};

/// Rebuild `root` with `splice` applied to the children of the composite at
/// `parent`.
pub(crate) fn rebuild_parent<F>(
    root: &SyntaxNode,
    parent: &[usize],
    splice: F,
) -> Result<SyntaxNode, NodeOperationError>
where
    F: FnOnce(&mut Vec<SyntaxNode>) -> Result<(), NodeOperationError>,
{
    let composite = root
        .as_composite()
        .ok_or_else(|| NodeOperationError::modification("cannot edit the children of a token"))?;
    let mut children = composite.children().to_vec();
    match parent.split_first() {
        None => splice(&mut children)?,
        Some((&first, rest)) => {
            let child = children.get(first).ok_or_else(|| {
                NodeOperationError::modification(format!("child index {first} is out of range"))
            })?;
            children[first] = rebuild_parent(child, rest, splice)?;
        }
    }
    Ok(SyntaxNode::composite(composite.kind(), children))
}

/// Rebuild `root` with the node at `indices` swapped for `node`.
pub(crate) fn replace_at(
    root: &SyntaxNode,
    indices: &ChildIndices,
    node: SyntaxNode,
) -> Result<SyntaxNode, NodeOperationError> {
    let Some((parent, slot)) = indices.split_last() else {
        return Ok(node);
    };
    rebuild_parent(root, parent.as_slice(), |children| {
        let target = children.get_mut(slot).ok_or_else(|| {
            NodeOperationError::modification(format!("child index {slot} is out of range"))
        })?;
        *target = node;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::syntax::{SyntaxNode, Token, TokenKind};

    #[test]
    fn untouched_siblings_are_shared() {
        let tree = parse("t.swift", "let a = 1\nlet b = 2\n").tree;
        let list = &tree.root().children()[0];
        let replacement: SyntaxNode = Token::new(TokenKind::Identifier, "z", vec![], vec![]).into();
        let root = replace_at(tree.root(), &ChildIndices::from(vec![0, 0, 0]), replacement).unwrap();
        // The replaced keyword carried the space as trailing trivia.
        assert_eq!(root.render(), "za = 1\nlet b = 2\n");

        let (SyntaxNode::Composite(before), SyntaxNode::Composite(after)) =
            (&list.children()[1], &root.children()[0].children()[1])
        else {
            panic!("expected declarations");
        };
        assert!(std::sync::Arc::ptr_eq(before, after));
    }

    #[test]
    fn out_of_range_indices_fail() {
        let tree = parse("t.swift", "let a = 1").tree;
        let node: SyntaxNode = Token::new(TokenKind::Identifier, "z", vec![], vec![]).into();
        assert!(matches!(
            replace_at(tree.root(), &ChildIndices::from(vec![0, 9]), node),
            Err(NodeOperationError::AstModificationFailed { .. })
        ));
    }
}

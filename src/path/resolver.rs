use crate::mutation::NodeOperationError;
use crate::path::{AddressingScheme, NodePath, Path};
use crate::syntax::tree::walk_node;
use crate::syntax::{ChildIndices, SyntaxNode, SyntaxTree, TokenKind, Walk};

/// A node located in a specific tree snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNode {
    pub node: SyntaxNode,
    pub indices: ChildIndices,
    /// Start offset including leading trivia.
    pub offset: usize,
}

impl ResolvedNode {
    fn root(tree: &SyntaxTree) -> Self {
        Self {
            node: tree.root().clone(),
            indices: ChildIndices::root(),
            offset: 0,
        }
    }

    /// Offset of the node's text, leading trivia excluded.
    pub fn content_offset(&self) -> usize {
        self.offset + self.node.leading_trivia_width()
    }
}

fn is_addressable_token(node: &SyntaxNode) -> bool {
    node.as_token()
        .is_some_and(|token| token.kind() != TokenKind::EndOfFile)
}

/// Declarations reachable from `parent` without crossing another
/// declaration, in pre-order.
fn nested_declarations(parent: &ResolvedNode) -> Vec<ResolvedNode> {
    let depth = parent.indices.len();
    let mut found = Vec::new();
    walk_node(&parent.node, &parent.indices, parent.offset, &mut |node, indices, offset| {
        if indices.len() == depth {
            return Walk::Continue;
        }
        if node.is_declaration() {
            found.push(ResolvedNode {
                node: node.clone(),
                indices: indices.clone(),
                offset,
            });
            return Walk::SkipChildren;
        }
        Walk::Continue
    });
    found
}

/// Every addressable token in pre-order.
fn tokens(tree: &SyntaxTree) -> Vec<ResolvedNode> {
    let mut found = Vec::new();
    tree.walk(|node, indices, offset| {
        if is_addressable_token(node) {
            found.push(ResolvedNode {
                node: node.clone(),
                indices: indices.clone(),
                offset,
            });
        }
        Walk::Continue
    });
    found
}

/// Path of the node at `indices`, or `None` when that node is not numbered
/// in `scheme`.
pub fn compute(tree: &SyntaxTree, indices: &ChildIndices, scheme: AddressingScheme) -> Option<Path> {
    match scheme {
        AddressingScheme::Token => {
            let target = tree.node_at(indices)?;
            if !is_addressable_token(target) {
                return None;
            }
            let mut number = 0;
            let mut found = None;
            tree.walk(|node, at, _| {
                if found.is_some() {
                    return Walk::SkipChildren;
                }
                if is_addressable_token(node) {
                    number += 1;
                    if at == indices {
                        found = Some(number);
                    }
                }
                Walk::Continue
            });
            Path::single(found?)
        }
        AddressingScheme::Declaration => {
            if !tree.node_at(indices)?.is_declaration() {
                return None;
            }
            let mut segments = Vec::new();
            let mut current = ResolvedNode::root(tree);
            loop {
                let (position, next) = nested_declarations(&current)
                    .into_iter()
                    .enumerate()
                    .find(|(_, d)| d.indices == *indices || d.indices.is_ancestor_of(indices))?;
                segments.push(position + 1);
                if next.indices == *indices {
                    return Path::new(segments);
                }
                current = next;
            }
        }
    }
}

/// The node `path` addresses. Pure: equal inputs give equal nodes.
pub fn resolve(tree: &SyntaxTree, path: &NodePath) -> Result<ResolvedNode, NodeOperationError> {
    match path.scheme {
        AddressingScheme::Token => {
            let [number] = path.path.segments() else {
                return Err(path.not_found());
            };
            let mut seen = 0;
            let mut found = None;
            tree.walk(|node, indices, offset| {
                if found.is_some() {
                    return Walk::SkipChildren;
                }
                if is_addressable_token(node) {
                    seen += 1;
                    if seen == *number {
                        found = Some(ResolvedNode {
                            node: node.clone(),
                            indices: indices.clone(),
                            offset,
                        });
                    }
                }
                Walk::Continue
            });
            found.ok_or_else(|| path.not_found())
        }
        AddressingScheme::Declaration => {
            let mut current = ResolvedNode::root(tree);
            for &segment in path.path.segments() {
                current = nested_declarations(&current)
                    .into_iter()
                    .nth(segment - 1)
                    .ok_or_else(|| path.not_found())?;
            }
            Ok(current)
        }
    }
}

/// Every numbered node with its path, in pre-order.
pub fn enumerate(tree: &SyntaxTree, scheme: AddressingScheme) -> Vec<(Path, ResolvedNode)> {
    match scheme {
        AddressingScheme::Token => tokens(tree)
            .into_iter()
            .enumerate()
            .filter_map(|(i, node)| Some((Path::single(i + 1)?, node)))
            .collect(),
        AddressingScheme::Declaration => {
            let mut out = Vec::new();
            enumerate_declarations(&ResolvedNode::root(tree), &[], &mut out);
            out
        }
    }
}

fn enumerate_declarations(parent: &ResolvedNode, prefix: &[usize], out: &mut Vec<(Path, ResolvedNode)>) {
    for (i, declaration) in nested_declarations(parent).into_iter().enumerate() {
        let mut segments = prefix.to_vec();
        segments.push(i + 1);
        let Some(path) = Path::new(segments.clone()) else {
            continue;
        };
        out.push((path, declaration.clone()));
        enumerate_declarations(&declaration, &segments, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::syntax::NodeKind;

    const SOURCE: &str = "public struct S {\n    public let x: Int\n    func f() {\n        struct Inner {}\n    }\n}\nlet top = 1\n";

    fn token_path(n: &str) -> NodePath {
        NodePath::parse(AddressingScheme::Token, n).unwrap()
    }

    fn decl_path(p: &str) -> NodePath {
        NodePath::parse(AddressingScheme::Declaration, p).unwrap()
    }

    #[test]
    fn tokens_are_numbered_flat() {
        let tree = parse("t.swift", SOURCE).tree;
        let x = resolve(&tree, &token_path("7")).unwrap();
        assert_eq!(x.node.as_token().map(|t| t.text()), Some("x"));
        assert_eq!(x.content_offset(), SOURCE.find("x:").unwrap());
    }

    #[test]
    fn token_paths_have_one_segment() {
        let tree = parse("t.swift", SOURCE).tree;
        assert_eq!(
            resolve(&tree, &token_path("1.1")),
            Err(NodeOperationError::not_found("1.1"))
        );
    }

    #[test]
    fn end_of_file_is_not_addressable() {
        let tree = parse("t.swift", "a b").tree;
        assert!(resolve(&tree, &token_path("2")).is_ok());
        assert_eq!(
            resolve(&tree, &token_path("3")),
            Err(NodeOperationError::not_found("3"))
        );
        assert_eq!(enumerate(&tree, AddressingScheme::Token).len(), 2);
    }

    #[test]
    fn declarations_are_hierarchical() {
        let tree = parse("t.swift", SOURCE).tree;
        let kind = |p: &str| resolve(&tree, &decl_path(p)).unwrap().node.node_kind();
        assert_eq!(kind("1"), Some(NodeKind::StructDecl));
        assert_eq!(kind("1.1"), Some(NodeKind::VariableDecl));
        assert_eq!(kind("1.2"), Some(NodeKind::FunctionDecl));
        assert_eq!(kind("1.2.1"), Some(NodeKind::StructDecl));
        assert_eq!(kind("2"), Some(NodeKind::VariableDecl));
        assert!(resolve(&tree, &decl_path("3")).is_err());
        assert!(resolve(&tree, &decl_path("1.1.1")).is_err());
    }

    #[test]
    fn enumerate_lists_in_pre_order() {
        let tree = parse("t.swift", SOURCE).tree;
        let paths: Vec<String> = enumerate(&tree, AddressingScheme::Declaration)
            .into_iter()
            .map(|(p, _)| p.to_string())
            .collect();
        assert_eq!(paths, vec!["1", "1.1", "1.2", "1.2.1", "2"]);
    }

    #[test]
    fn compute_inverts_resolve() {
        let tree = parse("t.swift", SOURCE).tree;
        for scheme in [AddressingScheme::Token, AddressingScheme::Declaration] {
            for (path, resolved) in enumerate(&tree, scheme) {
                assert_eq!(compute(&tree, &resolved.indices, scheme), Some(path.clone()));
                let again = resolve(&tree, &NodePath::new(scheme, path)).unwrap();
                assert_eq!(again, resolved);
            }
        }
    }

    #[test]
    fn compute_rejects_unnumbered_nodes() {
        let tree = parse("t.swift", SOURCE).tree;
        assert_eq!(compute(&tree, &ChildIndices::root(), AddressingScheme::Declaration), None);
        assert_eq!(compute(&tree, &ChildIndices::root(), AddressingScheme::Token), None);
        let eof = ChildIndices::from(vec![1]);
        assert_eq!(compute(&tree, &eof, AddressingScheme::Token), None);
    }
}

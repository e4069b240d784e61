//! Edit script application.
//!
//! Steps run in order. Every step addresses the tree produced by the step
//! before it, so paths in a script are written against the intermediate
//! result, not the original document. The first failing step stops the run.

use crate::config::schema::{EditScript, Operation, Step};
use crate::mutation::{InsertPosition, MutationEngine, NodeOperationError};
use crate::parser::{parse_expression, parse_items, parse_token, parse_tokens, FragmentContext, FragmentError};
use crate::path::{resolve, NodePath};
use crate::syntax::{NodeCategory, NodeKind, SyntaxNode, SyntaxTree, TriviaPiece};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info_span};

#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "StepResult should be checked"]
pub enum StepResult {
    Replaced { id: String, target: NodePath },
    Deleted { id: String, target: NodePath, removed: String },
    Inserted { id: String, anchor: NodePath, count: usize },
    Documented { id: String, target: NodePath },
}

impl fmt::Display for StepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepResult::Replaced { id, target } => write!(f, "{id}: replaced {target}"),
            StepResult::Deleted { id, target, removed } => {
                write!(f, "{id}: deleted {target} ({} bytes)", removed.len())
            }
            StepResult::Inserted { id, anchor, count } => {
                write!(f, "{id}: inserted {count} node(s) next to {anchor}")
            }
            StepResult::Documented { id, target } => write!(f, "{id}: documented {target}"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApplicationError {
    #[error("step '{id}': {source}")]
    Operation {
        id: String,
        #[source]
        source: NodeOperationError,
    },

    #[error("step '{id}': {source}")]
    Fragment {
        id: String,
        #[source]
        source: FragmentError,
    },

    #[error("step '{id}': cannot build a {operation} for a {target}")]
    Unsupported {
        id: String,
        operation: &'static str,
        target: String,
    },
}

impl ApplicationError {
    fn with_id(self, id: &str) -> Self {
        match self {
            ApplicationError::Operation { source, .. } => ApplicationError::Operation {
                id: id.to_string(),
                source,
            },
            ApplicationError::Fragment { source, .. } => ApplicationError::Fragment {
                id: id.to_string(),
                source,
            },
            ApplicationError::Unsupported {
                operation, target, ..
            } => ApplicationError::Unsupported {
                id: id.to_string(),
                operation,
                target,
            },
        }
    }
}

impl From<NodeOperationError> for ApplicationError {
    fn from(source: NodeOperationError) -> Self {
        ApplicationError::Operation {
            id: String::new(),
            source,
        }
    }
}

impl From<FragmentError> for ApplicationError {
    fn from(source: FragmentError) -> Self {
        ApplicationError::Fragment {
            id: String::new(),
            source,
        }
    }
}

/// The final tree and one result per step.
#[derive(Debug, Clone)]
pub struct ScriptOutcome {
    pub tree: SyntaxTree,
    pub results: Vec<StepResult>,
}

pub fn apply_script(
    tree: &SyntaxTree,
    script: &EditScript,
    engine: &MutationEngine,
) -> Result<ScriptOutcome, ApplicationError> {
    let mut current = tree.clone();
    let mut results = Vec::with_capacity(script.steps.len());
    for step in &script.steps {
        let span = info_span!("step", id = %step.id, operation = step.operation.name());
        let _guard = span.enter();
        let (next, result) = apply_step(&current, step, engine).map_err(|e| e.with_id(&step.id))?;
        debug!(%result, "applied step");
        current = next;
        results.push(result);
    }
    Ok(ScriptOutcome {
        tree: current,
        results,
    })
}

fn apply_step(
    tree: &SyntaxTree,
    step: &Step,
    engine: &MutationEngine,
) -> Result<(SyntaxTree, StepResult), ApplicationError> {
    let target = step.target()?;
    let id = step.id.clone();
    match &step.operation {
        Operation::Replace { text } => {
            let node = replacement_for(tree, &target, text)?;
            let tree = engine.replace(tree, &target, node)?;
            Ok((tree, StepResult::Replaced { id, target }))
        }
        Operation::Delete => {
            let (removed, tree) = engine.delete(tree, &target)?;
            Ok((tree, StepResult::Deleted { id, target, removed }))
        }
        Operation::Insert { text, position } => {
            let nodes = insertion_for(tree, &target, text, *position)?;
            let count = nodes.len();
            let tree = engine.insert(tree, nodes, &target, *position)?;
            Ok((
                tree,
                StepResult::Inserted {
                    id,
                    anchor: target,
                    count,
                },
            ))
        }
        Operation::Document { text } => {
            let tree = engine.modify_documentation(tree, &target, text.as_deref())?;
            Ok((tree, StepResult::Documented { id, target }))
        }
    }
}

fn parent_kind(tree: &SyntaxTree, target: &crate::path::ResolvedNode) -> Option<NodeKind> {
    let (parent, _) = target.indices.split_last()?;
    tree.node_at(&parent)?.node_kind()
}

fn has_leading_trivia(node: &SyntaxNode) -> bool {
    node.leading_trivia_width() > 0
}

/// Parse `text` into a node that can stand where `target` is.
///
/// Tokens written without trivia take over the target's trivia, and items
/// written without leading trivia take over the target's leading trivia, so
/// `x` → `width` keeps spacing and line structure intact.
pub fn replacement_for(
    tree: &SyntaxTree,
    target: &NodePath,
    text: &str,
) -> Result<SyntaxNode, ApplicationError> {
    let resolved = resolve(tree, target)?;
    let old = &resolved.node;
    let node = match old.category() {
        NodeCategory::Token => {
            let node = parse_token(text)?;
            match (node.as_token(), old.as_token()) {
                (Some(new), Some(old)) if new.full_width() == new.text().len() => {
                    SyntaxNode::from(
                        new.with_leading_trivia(old.leading_trivia().to_vec())
                            .with_trailing_trivia(old.trailing_trivia().to_vec()),
                    )
                }
                _ => node,
            }
        }
        NodeCategory::Expression if parent_kind(tree, &resolved) != Some(NodeKind::CodeBlockItemList) => {
            parse_expression(text)?
        }
        _ => {
            let context = match parent_kind(tree, &resolved) {
                Some(NodeKind::MemberBlockItemList) => FragmentContext::Members,
                Some(NodeKind::CodeBlockItemList) => FragmentContext::CodeBlock,
                _ => {
                    return Err(ApplicationError::Unsupported {
                        id: String::new(),
                        operation: "replacement",
                        target: old.kind_name(),
                    })
                }
            };
            let mut items = parse_items(text, context)?;
            if items.len() != 1 {
                return Err(FragmentError::WrongShape {
                    expected: "item",
                    found: items.len(),
                }
                .into());
            }
            items.remove(0)
        }
    };
    Ok(inherit_leading_trivia(node, old))
}

/// Parse `text` into nodes that can be spliced next to `anchor`.
///
/// Items written without leading trivia borrow the anchor's, so they land on
/// their own line with the anchor's indentation.
pub fn insertion_for(
    tree: &SyntaxTree,
    anchor: &NodePath,
    text: &str,
    position: InsertPosition,
) -> Result<Vec<SyntaxNode>, ApplicationError> {
    let resolved = resolve(tree, anchor)?;
    let context = match parent_kind(tree, &resolved) {
        Some(NodeKind::MemberBlockItemList) => FragmentContext::Members,
        Some(NodeKind::CodeBlockItemList) => FragmentContext::CodeBlock,
        _ => {
            let mut tokens = parse_tokens(text)?;
            if let (InsertPosition::After, Some(first)) = (position, tokens.first_mut()) {
                if !has_leading_trivia(first) && resolved.node.trailing_trivia_width() == 0 {
                    *first = first.with_leading_trivia(vec![TriviaPiece::whitespace(" ")]);
                }
            }
            return Ok(tokens);
        }
    };
    let mut items = parse_items(text, context)?;
    let anchor_leading = resolved
        .node
        .first_token()
        .map(|t| t.leading_trivia().to_vec())
        .unwrap_or_default();
    for item in &mut items {
        if !has_leading_trivia(item) {
            *item = item.with_leading_trivia(anchor_leading.clone());
        }
    }
    // An anchor at the very start of the document has no line break to
    // lend; the inserted items end with one instead.
    if position == InsertPosition::Before && anchor_leading.is_empty() {
        if let Some(last) = items.last_mut() {
            if last.trailing_trivia_width() == 0 {
                *last = last.with_trailing_trivia_appended(&[TriviaPiece::newline("\n")]);
            }
        }
    }
    Ok(items)
}

fn inherit_leading_trivia(node: SyntaxNode, old: &SyntaxNode) -> SyntaxNode {
    if node.is_token() || has_leading_trivia(&node) {
        return node;
    }
    match old.first_token() {
        Some(first) if !first.leading_trivia().is_empty() => {
            node.with_leading_trivia(first.leading_trivia().to_vec())
        }
        _ => node,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_from_str;
    use crate::parser::parse;

    const SOURCE: &str = "struct Point {\n    let x: Int\n    let y: Int\n}\n";

    fn run(script: &str) -> Result<ScriptOutcome, ApplicationError> {
        let tree = parse("p.swift", SOURCE).tree;
        let script: EditScript = load_from_str(script).unwrap();
        apply_script(&tree, &script, &MutationEngine::default())
    }

    #[test]
    fn steps_see_the_previous_result() {
        let outcome = run(r#"
[[steps]]
id = "drop-x"
declaration = "1.1"
operation = { type = "delete" }

[[steps]]
id = "document-y"
declaration = "1.1"
operation = { type = "document", text = "The only coordinate." }
"#)
        .unwrap();
        assert_eq!(
            outcome.tree.render(),
            "struct Point {\n    /// The only coordinate.\n    let y: Int\n}\n"
        );
        assert_eq!(outcome.results.len(), 2);
        assert!(matches!(&outcome.results[0], StepResult::Deleted { removed, .. } if removed == "\n    let x: Int"));
    }

    #[test]
    fn token_replacement_keeps_spacing() {
        let outcome = run(r#"
[[steps]]
id = "rename"
path = "5"
operation = { type = "replace", text = "width" }
"#)
        .unwrap();
        assert_eq!(outcome.tree.render(), SOURCE.replacen("x:", "width:", 1));
    }

    #[test]
    fn inserted_members_get_a_line_of_their_own() {
        let outcome = run(r#"
[[steps]]
id = "add-z"
declaration = "1.2"
operation = { type = "insert", text = "let z: Int" }
"#)
        .unwrap();
        assert_eq!(
            outcome.tree.render(),
            "struct Point {\n    let x: Int\n    let y: Int\n    let z: Int\n}\n"
        );
    }

    #[test]
    fn declaration_replacement_inherits_indentation() {
        let outcome = run(r#"
[[steps]]
id = "swap"
declaration = "1.1"
operation = { type = "replace", text = "var x = 0" }
"#)
        .unwrap();
        assert_eq!(
            outcome.tree.render(),
            "struct Point {\n    var x = 0\n    let y: Int\n}\n"
        );
    }

    #[test]
    fn failing_step_names_itself() {
        let err = run(r#"
[[steps]]
id = "missing"
declaration = "4"
operation = { type = "delete" }
"#)
        .unwrap_err();
        assert_eq!(
            err,
            ApplicationError::Operation {
                id: "missing".into(),
                source: NodeOperationError::not_found("4"),
            }
        );
        assert_eq!(err.to_string(), "step 'missing': no node at path '4'");
    }

    #[test]
    fn statements_are_refused_in_type_bodies() {
        let err = run(r#"
[[steps]]
id = "bad"
declaration = "1.1"
operation = { type = "insert", text = "return 1" }
"#)
        .unwrap_err();
        assert!(matches!(err, ApplicationError::Fragment { .. }), "{err}");
    }
}

use serde::Serialize;
use thiserror::Error;

/// Why a structural edit was refused.
///
/// Reasons are human-readable and meant to be shown to users verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeOperationError {
    #[error("no node at path '{path}'")]
    NodeNotFound { path: String },

    #[error("invalid insertion point: {reason}")]
    InvalidInsertionPoint { reason: String },

    #[error("invalid replacement: {reason}")]
    InvalidReplacementContext { reason: String },

    #[error("tree modification failed: {reason}")]
    AstModificationFailed { reason: String },
}

impl NodeOperationError {
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NodeNotFound { path: path.into() }
    }

    pub fn insertion(reason: impl Into<String>) -> Self {
        Self::InvalidInsertionPoint {
            reason: reason.into(),
        }
    }

    pub fn replacement(reason: impl Into<String>) -> Self {
        Self::InvalidReplacementContext {
            reason: reason.into(),
        }
    }

    pub fn modification(reason: impl Into<String>) -> Self {
        Self::AstModificationFailed {
            reason: reason.into(),
        }
    }

    /// The reason text without the kind prefix.
    pub fn reason(&self) -> String {
        match self {
            Self::NodeNotFound { path } => format!("no node at path '{path}'"),
            Self::InvalidInsertionPoint { reason }
            | Self::InvalidReplacementContext { reason }
            | Self::AstModificationFailed { reason } => reason.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_reasons() {
        let err = NodeOperationError::replacement("replacement node is not a token");
        assert_eq!(err.to_string(), "invalid replacement: replacement node is not a token");
        assert_eq!(err.reason(), "replacement node is not a token");
        assert_eq!(NodeOperationError::not_found("1.x").to_string(), "no node at path '1.x'");
    }

    #[test]
    fn serializes_tagged() {
        let value = serde_json::to_value(NodeOperationError::insertion("tokens only")).unwrap();
        assert_eq!(value["type"], "invalidInsertionPoint");
        assert_eq!(value["reason"], "tokens only");
    }
}

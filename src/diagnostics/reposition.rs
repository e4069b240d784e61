//! Position correction for "unexpected code '…'" diagnostics.
//!
//! Recovery nodes are reported at their full start, which includes leading
//! trivia and can sit on the line above the code the message quotes. This
//! is the only message shape that gets moved.

use crate::source::floor_char_boundary;

const UNEXPECTED_CODE_PREFIX: &str = "unexpected code '";

/// The code quoted by an "unexpected code '…'" message.
pub fn quoted_unexpected_code(message: &str) -> Option<&str> {
    let rest = message.strip_prefix(UNEXPECTED_CODE_PREFIX)?;
    let end = match rest.find("' ") {
        Some(end) => end,
        None => rest.strip_suffix('\'')?.len(),
    };
    let quoted = &rest[..end];
    (!quoted.is_empty()).then_some(quoted)
}

/// Offset of the first occurrence of the quoted code at or after both
/// `reported` and `not_before`, when it differs from `reported`.
///
/// `not_before` is where the recovery node's own text begins; searching from
/// there keeps comments in its leading trivia out of the match.
pub fn corrected_offset(
    source: &str,
    reported: usize,
    not_before: usize,
    message: &str,
) -> Option<usize> {
    let quoted = quoted_unexpected_code(message)?;
    let from = floor_char_boundary(source, reported.max(not_before));
    let found = from + source[from..].find(quoted)?;
    (found != reported).then_some(found)
}

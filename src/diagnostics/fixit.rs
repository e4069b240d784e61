//! Fix-it consolidation and display escaping.
//!
//! Parsers often express one logical edit as several primitive ones
//! ("insert ':'" then "insert type" at the same offset). Changes of the same
//! kind at contiguous positions merge into one change with the concatenated
//! text, and the merged suggestion gets a single generated message.

use crate::diagnostics::raw::{RawFixIt, RawFixItChange};
use crate::diagnostics::record::{FixItChange, FixItSuggestion, Span};
use crate::source::LocationConverter;

/// A fix-it after merging, still in byte offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolidatedFixIt {
    pub message: String,
    pub changes: Vec<RawFixItChange>,
}

/// Merge `next` onto `prev` when both are the same kind and `next` starts
/// where `prev` ends.
pub fn merge_changes(prev: &RawFixItChange, next: &RawFixItChange) -> Option<RawFixItChange> {
    use RawFixItChange::*;
    match (prev, next) {
        (
            Insert { offset: a, new_text: first },
            Insert { offset: b, new_text: second },
        ) if a == b => Some(Insert {
            offset: *a,
            new_text: format!("{first}{second}"),
        }),
        (
            Replace { range: a, new_text: first },
            Replace { range: b, new_text: second },
        ) if a.end == b.start => Some(Replace {
            range: a.start..b.end,
            new_text: format!("{first}{second}"),
        }),
        (Delete { range: a }, Delete { range: b }) if a.end == b.start => Some(Delete {
            range: a.start..b.end,
        }),
        _ => None,
    }
}

/// Merge runs of contiguous changes. Returns whether anything merged.
fn coalesce(changes: &[RawFixItChange]) -> (Vec<RawFixItChange>, bool) {
    let mut out: Vec<RawFixItChange> = Vec::with_capacity(changes.len());
    let mut merged = false;
    for change in changes {
        if let Some(last) = out.last_mut() {
            if let Some(combined) = merge_changes(last, change) {
                *last = combined;
                merged = true;
                continue;
            }
        }
        out.push(change.clone());
    }
    (out, merged)
}

/// Merge within each fix-it, then across consecutive single-change fix-its.
pub fn consolidate(fix_its: &[RawFixIt]) -> Vec<ConsolidatedFixIt> {
    let mut out: Vec<(ConsolidatedFixIt, bool)> = Vec::with_capacity(fix_its.len());
    for fix_it in fix_its {
        let (changes, merged) = coalesce(&fix_it.changes);
        if let ([change], Some((prev, prev_merged))) = (changes.as_slice(), out.last_mut()) {
            if let [prev_change] = prev.changes.as_mut_slice() {
                if let Some(combined) = merge_changes(prev_change, change) {
                    *prev_change = combined;
                    *prev_merged = true;
                    continue;
                }
            }
        }
        let message = escape_message(&fix_it.message);
        out.push((ConsolidatedFixIt { message, changes }, merged));
    }
    out.into_iter()
        .map(|(mut fix_it, merged)| {
            if merged {
                fix_it.message = describe(&fix_it.changes);
            }
            fix_it
        })
        .collect()
}

/// Generated message for a merged suggestion.
pub fn describe(changes: &[RawFixItChange]) -> String {
    let parts: Vec<String> = changes
        .iter()
        .map(|change| match change {
            RawFixItChange::Insert { new_text, .. } => {
                format!("insert '{}'", escape_for_display(new_text))
            }
            RawFixItChange::Replace { new_text, .. } => {
                format!("replace with '{}'", escape_for_display(new_text))
            }
            RawFixItChange::Delete { .. } => "remove code".to_string(),
            RawFixItChange::Generic { description, .. } => escape_message(description),
        })
        .collect();
    parts.join("; ")
}

/// Escape text for single-line display: line breaks, tabs, backslashes and
/// quotes.
pub fn escape_for_display(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            c if c.is_control() => out.push_str(&c.escape_unicode().to_string()),
            c => out.push(c),
        }
    }
    out
}

/// Escape control characters only, keeping quotes of an authored message.
pub fn escape_message(message: &str) -> String {
    if !message.chars().any(char::is_control) {
        return message.to_string();
    }
    let mut out = String::with_capacity(message.len() + 4);
    for ch in message.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&c.escape_unicode().to_string()),
            c => out.push(c),
        }
    }
    out
}

/// Convert byte offsets to positions, clipping out-of-range offsets.
pub fn to_suggestion(fix_it: &ConsolidatedFixIt, converter: &LocationConverter) -> FixItSuggestion {
    let at = |offset: usize| converter.location_clamped(offset).0;
    let changes = fix_it
        .changes
        .iter()
        .map(|change| match change {
            RawFixItChange::Replace { range, new_text } => FixItChange::Replace {
                span: Span::between(at(range.start), at(range.end)),
                new_text: new_text.clone(),
            },
            RawFixItChange::Insert { offset, new_text } => FixItChange::Insert {
                position: at(*offset),
                new_text: new_text.clone(),
            },
            RawFixItChange::Delete { range } => FixItChange::Delete {
                span: Span::between(at(range.start), at(range.end)),
            },
            RawFixItChange::Generic {
                description,
                details,
            } => FixItChange::Generic {
                description: escape_message(description),
                details: escape_message(details),
            },
        })
        .collect();
    FixItSuggestion {
        message: fix_it.message.clone(),
        changes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Location;

    fn insert(offset: usize, text: &str) -> RawFixItChange {
        RawFixItChange::Insert {
            offset,
            new_text: text.into(),
        }
    }

    #[test]
    fn adjacent_single_inserts_merge_across_fix_its() {
        let fix_its = vec![
            RawFixIt::insert("insert ':'", 8, ": "),
            RawFixIt::insert("insert type", 8, "<#type#>"),
        ];
        let merged = consolidate(&fix_its);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].changes, vec![insert(8, ": <#type#>")]);
        assert_eq!(merged[0].message, "insert ': <#type#>'");
    }

    #[test]
    fn changes_within_one_fix_it_merge() {
        let fix_it = RawFixIt::new(
            "fix",
            vec![
                RawFixItChange::Delete { range: 0..2 },
                RawFixItChange::Delete { range: 2..5 },
            ],
        );
        let merged = consolidate(&[fix_it]);
        assert_eq!(merged[0].changes, vec![RawFixItChange::Delete { range: 0..5 }]);
        assert_eq!(merged[0].message, "remove code");
    }

    #[test]
    fn contiguous_replaces_merge() {
        let a = RawFixItChange::Replace {
            range: 0..1,
            new_text: "a".into(),
        };
        let b = RawFixItChange::Replace {
            range: 1..3,
            new_text: "\n".into(),
        };
        let merged = merge_changes(&a, &b).unwrap();
        assert_eq!(
            merged,
            RawFixItChange::Replace {
                range: 0..3,
                new_text: "a\n".into()
            }
        );
        assert_eq!(describe(&[merged]), "replace with 'a\\n'");
    }

    #[test]
    fn distinct_kinds_and_gaps_do_not_merge() {
        let fix_its = vec![
            RawFixIt::insert("insert 'a'", 1, "a"),
            RawFixIt::insert("insert 'b'", 2, "b"),
            RawFixIt::delete("remove 'c'", 2..3),
        ];
        let merged = consolidate(&fix_its);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].message, "insert 'a'");
        assert_eq!(merged[2].message, "remove 'c'");
    }

    #[test]
    fn multi_change_fix_its_are_not_merged_across() {
        let fix_its = vec![
            RawFixIt::new("both", vec![insert(0, "a"), insert(4, "b")]),
            RawFixIt::insert("more", 4, "c"),
        ];
        let merged = consolidate(&fix_its);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].message, "both");
    }

    #[test]
    fn display_escaping() {
        assert_eq!(escape_for_display("a\n\tb\r"), "a\\n\\tb\\r");
        assert_eq!(escape_for_display(r#"say "hi" it's \ok"#), r#"say \"hi\" it\'s \\ok"#);
        assert_eq!(escape_message("line\nbreak 'kept'"), "line\\nbreak 'kept'");
    }

    #[test]
    fn conversion_clips_offsets() {
        let converter = LocationConverter::from_text("ab\ncd");
        let fix_it = ConsolidatedFixIt {
            message: "m".into(),
            changes: vec![insert(4, "x"), RawFixItChange::Delete { range: 0..99 }],
        };
        let suggestion = to_suggestion(&fix_it, &converter);
        assert_eq!(
            suggestion.changes[0],
            FixItChange::Insert {
                position: Location::new(2, 2),
                new_text: "x".into()
            }
        );
        assert_eq!(
            suggestion.changes[1],
            FixItChange::Delete {
                span: Span::between(Location::new(1, 1), Location::new(2, 3))
            }
        );
    }
}

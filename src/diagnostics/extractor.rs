use crate::diagnostics::fixit::{consolidate, escape_message, to_suggestion};
use crate::diagnostics::raw::{RawDiagnostic, RawNote};
use crate::diagnostics::record::{ContextLine, DiagnosticRecord, Note, PositionQuality, Span};
use crate::diagnostics::reposition::{corrected_offset, quoted_unexpected_code};
use crate::source::{Location, LocationConverter};
use crate::syntax::{ChildIndices, NodeKind, SyntaxNode, SyntaxTree};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractorOptions {
    /// Lines of context on each side of the reported line.
    pub context_radius: usize,
    /// Move "unexpected code '…'" diagnostics onto the quoted code.
    pub reposition: bool,
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self {
            context_radius: 1,
            reposition: true,
        }
    }
}

/// Turns raw parser diagnostics into position-verified records.
///
/// Extraction never fails and never drops a diagnostic: anything that
/// cannot be placed is clipped to the document and marked approximate.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticExtractor {
    options: ExtractorOptions,
}

/// A referenced node with the offsets of its text, trivia excluded.
struct NodeExtent<'a> {
    node: &'a SyntaxNode,
    content_start: usize,
    content_end: usize,
}

impl DiagnosticExtractor {
    pub fn new(options: ExtractorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ExtractorOptions {
        self.options
    }

    /// Records in source order (stable for equal locations).
    pub fn extract(&self, tree: &SyntaxTree, raw: &[RawDiagnostic]) -> Vec<DiagnosticRecord> {
        let source = tree.source();
        let converter = source.converter();
        let mut records: Vec<DiagnosticRecord> = raw
            .iter()
            .map(|diagnostic| self.record(tree, &converter, diagnostic))
            .collect();
        records.sort_by_key(|record| record.location);
        debug!(
            identity = tree.identity(),
            records = records.len(),
            "extracted diagnostics"
        );
        records
    }

    fn record(
        &self,
        tree: &SyntaxTree,
        converter: &LocationConverter,
        raw: &RawDiagnostic,
    ) -> DiagnosticRecord {
        let text = converter.text();
        let extent = raw.node.as_ref().and_then(|indices| node_extent(tree, indices));

        let mut position = PositionQuality::Exact;
        let reported = match raw.offset.or(extent.as_ref().map(|e| e.content_start)) {
            Some(offset) => offset,
            None => {
                warn!(message = %raw.message, "diagnostic has no position, reporting at start of document");
                position = PositionQuality::Approximate;
                0
            }
        };

        let mut offset = reported;
        if self.options.reposition {
            let not_before = extent
                .as_ref()
                .filter(|e| e.node.node_kind() == Some(NodeKind::UnexpectedNodes))
                .map_or(reported, |e| e.content_start);
            if let Some(corrected) = corrected_offset(text, reported, not_before, &raw.message) {
                debug!(message = %raw.message, reported, corrected, "repositioned unexpected code");
                offset = corrected;
                position = PositionQuality::Corrected;
            }
        }

        let (location, clipped) = converter.location_clamped(offset);
        if clipped {
            warn!(
                message = %raw.message,
                offset,
                len = text.len(),
                "diagnostic offset outside document, clipping"
            );
            position = PositionQuality::Approximate;
        }

        let quoted_end = quoted_unexpected_code(&raw.message)
            .filter(|quoted| !clipped && text.get(offset..).is_some_and(|rest| rest.starts_with(quoted)))
            .map(|quoted| offset + quoted.len());
        let end = quoted_end.or_else(|| {
            extent
                .as_ref()
                .map(|e| e.content_end)
                .filter(|&end| !clipped && end > offset)
        });
        let span = match end.and_then(|end| converter.location(end)) {
            Some(end) => Span::between(location, end),
            None => Span::point(location),
        };

        DiagnosticRecord {
            message: escape_message(&raw.message),
            severity: raw.severity,
            location,
            span,
            offending_text: extent.as_ref().map(|e| e.node.render()),
            node_location: extent
                .as_ref()
                .and_then(|e| converter.location(e.content_start)),
            context_lines: self.context_lines(converter, location),
            fix_its: consolidate(&raw.fix_its)
                .iter()
                .map(|fix_it| to_suggestion(fix_it, converter))
                .collect(),
            notes: raw
                .notes
                .iter()
                .map(|note| self.note(tree, converter, note))
                .collect(),
            position,
        }
    }

    fn context_lines(&self, converter: &LocationConverter, at: Location) -> Vec<ContextLine> {
        let radius = self.options.context_radius;
        let first = at.line.saturating_sub(radius).max(1);
        let last = at.line.saturating_add(radius).min(converter.line_count());
        (first..=last)
            .filter_map(|line_number| {
                converter.line_text(line_number).map(|text| ContextLine {
                    line_number,
                    text: text.to_string(),
                })
            })
            .collect()
    }

    fn note(&self, tree: &SyntaxTree, converter: &LocationConverter, note: &RawNote) -> Note {
        let offset = note.offset.or_else(|| {
            note.node
                .as_ref()
                .and_then(|indices| node_extent(tree, indices))
                .map(|e| e.content_start)
        });
        Note {
            message: escape_message(&note.message),
            location: offset.and_then(|offset| converter.location(offset)),
        }
    }
}

fn node_extent<'a>(tree: &'a SyntaxTree, indices: &ChildIndices) -> Option<NodeExtent<'a>> {
    let node = tree.node_at(indices)?;
    let start = tree.offset_of(indices)?;
    let content_start = start + node.leading_trivia_width();
    let content_end = (start + node.full_width())
        .saturating_sub(node.trailing_trivia_width())
        .max(content_start);
    Some(NodeExtent {
        node,
        content_start,
        content_end,
    })
}

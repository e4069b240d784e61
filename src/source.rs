//! Source documents and offset-to-position conversion.
//!
//! Offsets are byte offsets into UTF-8 text. Lines and columns are 1-based;
//! columns count characters from the start of the line.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Immutable source text plus the identity used in messages (usually a path).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    identity: Arc<str>,
    text: Arc<str>,
}

impl SourceDocument {
    pub fn new(identity: impl Into<Arc<str>>, text: impl Into<Arc<str>>) -> Self {
        Self {
            identity: identity.into(),
            text: text.into(),
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Build a location converter for this document.
    pub fn converter(&self) -> LocationConverter {
        LocationConverter::new(self)
    }
}

/// A 1-based line/column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Converts byte offsets into line/column positions.
///
/// Built once per document by scanning for line breaks (`\n`, `\r\n` and a
/// lone `\r`). Lookups binary-search the line table; columns on ASCII lines
/// are computed without rescanning the line.
#[derive(Debug, Clone)]
pub struct LocationConverter {
    text: Arc<str>,
    line_starts: Vec<usize>,
    ascii_lines: Vec<bool>,
}

impl LocationConverter {
    pub fn new(document: &SourceDocument) -> Self {
        Self::from_shared(document.text.clone())
    }

    pub fn from_text(text: &str) -> Self {
        Self::from_shared(Arc::from(text))
    }

    fn from_shared(text: Arc<str>) -> Self {
        let bytes = text.as_bytes();
        let mut line_starts = vec![0];
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => line_starts.push(i + 1),
                b'\r' => {
                    if bytes.get(i + 1) == Some(&b'\n') {
                        i += 1;
                    }
                    line_starts.push(i + 1);
                }
                _ => {}
            }
            i += 1;
        }

        let ascii_lines = line_starts
            .iter()
            .enumerate()
            .map(|(idx, &start)| {
                let end = line_starts.get(idx + 1).copied().unwrap_or(bytes.len());
                bytes[start..end].is_ascii()
            })
            .collect();

        Self {
            text,
            line_starts,
            ascii_lines,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Position of `offset`, or `None` when it lies past the end of the text.
    ///
    /// `offset == len` is the end-of-file position.
    pub fn location(&self, offset: usize) -> Option<Location> {
        if offset > self.text.len() {
            return None;
        }
        let offset = floor_char_boundary(&self.text, offset);
        let line_idx = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let start = self.line_starts[line_idx];
        let column = if self.ascii_lines[line_idx] {
            offset - start + 1
        } else {
            self.text[start..offset].chars().count() + 1
        };
        Some(Location::new(line_idx + 1, column))
    }

    /// Position of `offset` clipped to the document. The flag is `true` when
    /// clipping was needed.
    pub fn location_clamped(&self, offset: usize) -> (Location, bool) {
        match self.location(offset) {
            Some(location) => (location, false),
            None => {
                let end = self.text.len();
                let location = self
                    .location(end)
                    .unwrap_or_else(|| Location::new(1, 1));
                (location, true)
            }
        }
    }

    /// Byte offset of a 1-based position, if it exists in the document.
    pub fn offset_of(&self, location: Location) -> Option<usize> {
        let range = self.line_range(location.line)?;
        let line = &self.text[range.clone()];
        if location.column == 0 {
            return None;
        }
        if location.column == 1 {
            return Some(range.start);
        }
        line.char_indices()
            .map(|(idx, _)| idx)
            .chain(std::iter::once(line.len()))
            .nth(location.column - 1)
            .map(|idx| range.start + idx)
    }

    /// Text of a 1-based line without its terminator.
    pub fn line_text(&self, line: usize) -> Option<&str> {
        self.line_range(line).map(|range| &self.text[range])
    }

    /// Byte range of a 1-based line without its terminator.
    pub fn line_range(&self, line: usize) -> Option<std::ops::Range<usize>> {
        if line == 0 || line > self.line_starts.len() {
            return None;
        }
        let start = self.line_starts[line - 1];
        let next = self
            .line_starts
            .get(line)
            .copied()
            .unwrap_or(self.text.len());
        let raw = &self.text[start..next];
        let content = raw
            .strip_suffix("\r\n")
            .or_else(|| raw.strip_suffix('\n'))
            .or_else(|| raw.strip_suffix('\r'))
            .unwrap_or(raw);
        Some(start..start + content.len())
    }
}

/// Largest char boundary at or below `offset` (clamped to the text length).
pub(crate) fn floor_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_position_is_one_one() {
        let conv = LocationConverter::from_text("let x = 1\n");
        assert_eq!(conv.location(0), Some(Location::new(1, 1)));
        assert_eq!(conv.location(4), Some(Location::new(1, 5)));
    }

    #[test]
    fn end_of_file_offset_is_valid() {
        let text = "a\nbc";
        let conv = LocationConverter::from_text(text);
        assert_eq!(conv.location(text.len()), Some(Location::new(2, 3)));
        assert_eq!(conv.location(text.len() + 1), None);
    }

    #[test]
    fn trailing_newline_opens_empty_line() {
        let text = "a\n";
        let conv = LocationConverter::from_text(text);
        assert_eq!(conv.line_count(), 2);
        assert_eq!(conv.location(2), Some(Location::new(2, 1)));
        assert_eq!(conv.line_text(2), Some(""));
    }

    #[test]
    fn crlf_and_lone_cr_are_single_breaks() {
        let text = "a\r\nb\rc";
        let conv = LocationConverter::from_text(text);
        assert_eq!(conv.line_count(), 3);
        assert_eq!(conv.location(3), Some(Location::new(2, 1)));
        assert_eq!(conv.location(5), Some(Location::new(3, 1)));
        assert_eq!(conv.line_text(1), Some("a"));
        assert_eq!(conv.line_text(2), Some("b"));
    }

    #[test]
    fn columns_count_characters() {
        let text = "let é = \"ü\"";
        let conv = LocationConverter::from_text(text);
        let eq = text.find('=').unwrap();
        assert_eq!(conv.location(eq), Some(Location::new(1, 7)));
        // Inside a multi-byte character floors to its start.
        assert_eq!(conv.location(5), Some(Location::new(1, 5)));
    }

    #[test]
    fn offset_of_inverts_location() {
        let text = "struct S {\n    let é: Int\n}\n";
        let conv = LocationConverter::from_text(text);
        for (offset, _) in text.char_indices() {
            let location = conv.location(offset).unwrap();
            assert_eq!(conv.offset_of(location), Some(offset));
        }
    }

    #[test]
    fn clamped_location_reports_clipping() {
        let conv = LocationConverter::from_text("abc");
        assert_eq!(conv.location_clamped(1), (Location::new(1, 2), false));
        assert_eq!(conv.location_clamped(99), (Location::new(1, 4), true));
    }

    #[test]
    fn line_text_out_of_range() {
        let conv = LocationConverter::from_text("a");
        assert_eq!(conv.line_text(0), None);
        assert_eq!(conv.line_text(2), None);
    }
}

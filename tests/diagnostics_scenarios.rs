//! Diagnostic extraction over real parser output.

use swift_surgeon::diagnostics::reposition::quoted_unexpected_code;
use swift_surgeon::diagnostics::{FixItChange, Severity};
use swift_surgeon::{
    parse, DiagnosticExtractor, DiagnosticRecord, ExtractorOptions, Location, LocationConverter,
    PositionQuality,
};

fn extract(source: &str) -> Vec<DiagnosticRecord> {
    let parsed = parse("test.swift", source);
    DiagnosticExtractor::default().extract(&parsed.tree, &parsed.diagnostics)
}

/// Every "unexpected code" record must sit exactly on the code it quotes.
fn assert_quotes_are_positioned(source: &str, records: &[DiagnosticRecord]) {
    let converter = LocationConverter::from_text(source);
    for record in records {
        let Some(quoted) = quoted_unexpected_code(&record.message) else {
            continue;
        };
        let offset = converter
            .offset_of(record.location)
            .unwrap_or_else(|| panic!("{} has no offset", record.location));
        assert!(
            source[offset..].starts_with(quoted),
            "'{quoted}' is not at {} in {source:?}",
            record.location
        );
    }
}

#[test]
fn test_generic_clause_after_colon() {
    let source = "func bad: <T>(value: T) -> T { return value }";
    let records = extract(source);
    let record = records
        .iter()
        .find(|r| r.message.contains("unexpected code ': <T>(value: T) -> T'"))
        .expect("unexpected code diagnostic");
    assert_eq!(record.location, Location::new(1, 9));
    assert_eq!(&source[8..9], ":");
    assert_eq!(record.severity, Severity::Error);
    assert_quotes_are_positioned(source, &records);
}

#[test]
fn test_misspelled_member_keyword() {
    let source = "struct Point {\n    let x: Int\n    fucn move() {}\n}\n";
    let records = extract(source);
    let record = records
        .iter()
        .find(|r| r.message.starts_with("unexpected code 'fucn"))
        .expect("unexpected member code");
    assert_eq!(record.location, Location::new(3, 5));
    assert_eq!(record.position, PositionQuality::Corrected);
    assert_eq!(record.context_lines.len(), 3);
    assert_eq!(record.context_lines[1].text, "    fucn move() {}");
    assert!(record
        .fix_its
        .iter()
        .any(|f| f.message == "replace 'fucn' with 'func'"));
    assert_quotes_are_positioned(source, &records);
}

#[test]
fn test_missing_closing_brace_has_note_and_fix_it() {
    let source = "func f() {\n    let a = 1\n";
    let records = extract(source);
    let record = records
        .iter()
        .find(|r| r.message.starts_with("expected '}'"))
        .expect("missing brace");
    assert_eq!(record.notes.len(), 1);
    assert_eq!(record.notes[0].message, "to match this opening '{'");
    assert_eq!(record.notes[0].location, Some(Location::new(1, 10)));
    let change = &record.fix_its[0].changes[0];
    assert!(matches!(change, FixItChange::Insert { new_text, .. } if new_text == "\n}"));
    assert_eq!(record.fix_its[0].message, "insert '}'");
}

#[test]
fn test_clean_source_has_no_records() {
    let source = "import Foundation\n\n/// A point.\npublic struct S: Equatable {\n    public let x: Int\n    var y = 2\n}\n\nfunc f(a: Int, _ b: [String] = []) async throws -> Int? {\n    guard a > 0 else { return nil }\n    for x in b where !x.isEmpty {\n        print(x)\n    }\n    return a\n}\n";
    assert!(extract(source).is_empty(), "{:#?}", extract(source));
}

#[test]
fn test_context_radius_option() {
    let source = "let a = 1\nlet b = 2\nfunc f(x) {}\nlet c = 3\nlet d = 4\n";
    let parsed = parse("test.swift", source);
    let extractor = DiagnosticExtractor::new(ExtractorOptions {
        context_radius: 2,
        ..ExtractorOptions::default()
    });
    let records = extractor.extract(&parsed.tree, &parsed.diagnostics);
    let record = records
        .iter()
        .find(|r| r.message == "expected ':' and type in parameter")
        .expect("parameter diagnostic");
    let lines: Vec<usize> = record.context_lines.iter().map(|l| l.line_number).collect();
    assert_eq!(lines, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_multibyte_columns_count_characters() {
    let source = "let café = \"ü\"; fucn\n";
    let records = extract(source);
    for record in &records {
        assert!(record.location.column <= source.chars().count() + 1);
    }
    assert_quotes_are_positioned(source, &records);
}

#[test]
fn test_json_shape() {
    let records = extract("func f(x) {}");
    let json = serde_json::to_value(&records).unwrap();
    let record = &json[0];
    assert!(record["location"]["line"].is_number());
    assert!(record["contextLines"].is_array());
    assert_eq!(record["fixIts"][0]["changes"][0]["type"], "insert");
    assert_eq!(record["fixIts"][0]["changes"][0]["newText"], ": <#type#>");
}

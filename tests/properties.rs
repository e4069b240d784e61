//! Property tests: losslessness, addressing determinism and positioning.

use proptest::prelude::*;
use swift_surgeon::diagnostics::reposition::quoted_unexpected_code;
use swift_surgeon::path::{compute, enumerate, resolve};
use swift_surgeon::{
    parse, AddressingScheme, DiagnosticExtractor, Edit, LocationConverter, NodePath,
};

const FRAGMENTS: &[&str] = &[
    "struct S {\n",
    "func f(x: Int) -> Int {",
    "}\n",
    "    let a = 1\n",
    "/// docs\n",
    "// note\r\n",
    "/* block */",
    "enum E { case a, b }",
    "func bad: <T>(v: T) {}",
    "fucn g() {}\n",
    "\"str\\(x)\"",
    "café",
];

/// Source-ish text: Swift fragments glued together with arbitrary noise.
fn swiftish() -> impl Strategy<Value = String> {
    let fragment = prop_oneof![
        3 => prop::sample::select(FRAGMENTS).prop_map(String::from),
        1 => "[ -~\t\n]{0,12}",
    ];
    prop::collection::vec(fragment, 0..12).prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn parse_is_lossless(text in swiftish()) {
        let parsed = parse("p.swift", &text);
        prop_assert_eq!(parsed.tree.render(), text);
    }

    #[test]
    fn parse_is_lossless_for_any_string(text in "\\PC{0,64}") {
        let parsed = parse("p.swift", &text);
        prop_assert_eq!(parsed.tree.render(), text);
    }

    #[test]
    fn enumerated_paths_resolve_and_compute_back(text in swiftish()) {
        let tree = parse("p.swift", &text).tree;
        for scheme in [AddressingScheme::Token, AddressingScheme::Declaration] {
            let first = enumerate(&tree, scheme);
            prop_assert_eq!(&first, &enumerate(&tree, scheme));
            for (path, node) in first {
                let node_path = NodePath::new(scheme, path.clone());
                let resolved = resolve(&tree, &node_path).unwrap();
                prop_assert_eq!(&resolved, &node);
                prop_assert_eq!(compute(&tree, &resolved.indices, scheme), Some(path));
            }
        }
    }

    #[test]
    fn token_paths_cover_every_token(text in swiftish()) {
        let tree = parse("p.swift", &text).tree;
        let tokens = enumerate(&tree, AddressingScheme::Token);
        let joined: String = tokens.iter().map(|(_, t)| t.node.render()).collect();
        // Only the end-of-file token (and its trivia) is left out.
        prop_assert!(text.starts_with(&joined));
        for (n, (path, _)) in tokens.iter().enumerate() {
            prop_assert_eq!(path.segments(), &[n + 1][..]);
        }
    }

    #[test]
    fn quoted_code_sits_at_the_reported_location(text in swiftish()) {
        let parsed = parse("p.swift", &text);
        let records = DiagnosticExtractor::default().extract(&parsed.tree, &parsed.diagnostics);
        let converter = LocationConverter::from_text(&text);
        for record in records {
            let Some(quoted) = quoted_unexpected_code(&record.message) else {
                continue;
            };
            // Escaped control characters no longer match the source.
            if quoted.contains('\\') {
                continue;
            }
            let offset = converter.offset_of(record.location).unwrap();
            prop_assert!(
                text[offset..].starts_with(quoted),
                "{:?} not at {} in {:?}",
                quoted,
                record.location,
                text
            );
        }
    }

    #[test]
    fn locations_round_trip_through_offsets(text in swiftish(), at in any::<prop::sample::Index>()) {
        let converter = LocationConverter::from_text(&text);
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let offset = boundaries[at.index(boundaries.len())];
        // The byte between '\r' and '\n' is not a position of its own.
        prop_assume!(!(text[..offset].ends_with('\r') && text[offset..].starts_with('\n')));
        let location = converter.location(offset).unwrap();
        prop_assert_eq!(converter.offset_of(location), Some(offset));
    }

    #[test]
    fn rewrite_edits_reproduce_the_target(before in swiftish(), after in swiftish()) {
        match Edit::from_rewrite("p.swift", &before, &after) {
            Some(edit) => prop_assert_eq!(edit.apply_to_str(&before).unwrap(), after),
            None => prop_assert_eq!(before, after),
        }
    }
}

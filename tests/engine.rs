//! End-to-end checks of the public engine API: validate, complete,
//! publish, and config-driven rule sets.

use std::io::Write;

use lsp_types::{DiagnosticSeverity, Position, Range};
use yaml_lsp::lsp::SOURCE;
use yaml_lsp::{EngineConfig, LanguageService, Snapshot, YamlService};

const URI: &str = "file:///workspace/server.yaml";

fn svc() -> YamlService {
    YamlService::default()
}

fn range(sl: u32, sc: u32, el: u32, ec: u32) -> Range {
    Range::new(Position::new(sl, sc), Position::new(el, ec))
}

/// Every range must lie inside the document's lines.
fn assert_in_bounds(text: &str, r: &Range) {
    let lines: Vec<&str> = text.split('\n').collect();
    for p in [r.start, r.end] {
        let line = lines
            .get(p.line as usize)
            .unwrap_or_else(|| panic!("line {} out of bounds in {text:?}", p.line));
        let len = line.trim_end_matches('\r').encode_utf16().count() as u32;
        assert!(p.character <= len, "character {} > {len} in {text:?}", p.character);
    }
}

#[test]
fn wrong_type_number_covers_key_line() {
    let text = "servername: 5\n";
    let diags = svc().validate(URI, text).diagnostics;
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].severity, Some(DiagnosticSeverity::ERROR));
    assert!(diags[0].message.contains("must be a string"), "got: {}", diags[0].message);
    assert_eq!(diags[0].range, range(0, 0, 0, 13));
    assert!(svc().complete(URI, text, Position::new(0, 0)).is_empty());
}

#[test]
fn wrong_type_sequence_and_mapping() {
    for text in [
        "name: x\nservername:\n  - a\n  - b\n",
        "name: x\nservername: {host: a}\n",
    ] {
        let diags = svc().validate(URI, text).diagnostics;
        assert_eq!(diags.len(), 1, "text: {text:?}");
        assert_eq!(diags[0].range.start, Position::new(1, 0));
        assert_in_bounds(text, &diags[0].range);
        assert!(svc().complete(URI, text, Position::new(0, 0)).is_empty());
    }
}

#[test]
fn missing_key_error_and_candidate() {
    let text = "foo: bar\n";
    let diags = svc().validate(URI, text).diagnostics;
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].range, range(0, 0, 0, 0));
    assert_eq!(diags[0].source.as_deref(), Some(SOURCE));

    let items = svc().complete(URI, text, Position::new(1, 0));
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].insert_text.as_deref(), Some("servername: "));
}

#[test]
fn valid_document_is_clean() {
    let text = "servername: web-01\nport: 8080\n";
    assert!(svc().validate(URI, text).diagnostics.is_empty());
    assert!(svc().complete(URI, text, Position::new(0, 0)).is_empty());
}

#[test]
fn syntax_error_yields_single_positioned_finding() {
    for text in ["key: [invalid\n", "a: 1\n  b: 2\n", "servername: web\nservername: db\n", "\t- :\n  ]"] {
        let diags = svc().validate(URI, text).diagnostics;
        assert_eq!(diags.len(), 1, "text: {text:?} got: {diags:?}");
        assert!(diags[0].message.starts_with("YAML syntax error: "));
        assert_in_bounds(text, &diags[0].range);
    }
}

#[test]
fn syntax_error_position_is_zero_based() {
    let text = "a: 1\nb: c: d\n";
    let diags = svc().validate(URI, text).diagnostics;
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].range, range(1, 4, 1, 5));
}

#[test]
fn syntax_error_after_wide_characters_lands_on_offending_char() {
    let text = "k: \"😀😀\" x: [\n";
    let diags = svc().validate(URI, text).diagnostics;
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].range, range(0, 10, 0, 11));
}

#[test]
fn tagged_root_and_merge_keys_are_validated() {
    let service = svc();
    let tagged = "--- !cfg\nfoo: bar\n";
    assert_eq!(service.validate(URI, tagged).diagnostics.len(), 1);
    assert_eq!(service.complete(URI, tagged, Position::new(0, 0)).len(), 1);

    let merged = "base: &b\n  servername: web\n<<: *b\n";
    assert!(service.validate(URI, merged).diagnostics.is_empty());
    assert!(service.complete(URI, merged, Position::new(0, 0)).is_empty());
}

#[test]
fn syntax_error_message_embeds_parser_message() {
    let text = "key: [invalid\n";
    let parser_message = serde_yaml::from_str::<serde_yaml::Value>(text)
        .unwrap_err()
        .to_string();
    let diags = svc().validate(URI, text).diagnostics;
    assert!(diags[0].message.contains(&parser_message));
}

#[test]
fn comment_and_nested_mentions_do_not_count() {
    let text = "# servername: commented\nouter:\n  servername: nested\n";
    let diags = svc().validate(URI, text).diagnostics;
    assert_eq!(diags.len(), 1);
    assert!(diags[0].message.contains("missing"));
    assert_eq!(svc().complete(URI, text, Position::new(0, 0)).len(), 1);
}

#[test]
fn non_mapping_documents_are_outside_rules() {
    for text in ["- servername\n", "plain scalar\n", "42"] {
        assert!(svc().validate(URI, text).diagnostics.is_empty(), "text: {text:?}");
        assert!(svc().complete(URI, text, Position::new(0, 0)).is_empty());
    }
}

#[test]
fn empty_document_never_fails() {
    let publication = svc().validate(URI, "");
    assert!(publication.diagnostics.is_empty(), "got: {:?}", publication.diagnostics);
    let items = svc().complete(URI, "", Position::new(0, 0));
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].label, "servername");
}

#[test]
fn repeated_calls_are_identical() {
    let service = svc();
    for text in ["servername: 5\n", "foo: bar\n", "bad: [\n", "servername: ok\n"] {
        assert_eq!(service.validate(URI, text), service.validate(URI, text));
        assert_eq!(
            service.complete(URI, text, Position::new(0, 0)),
            service.complete(URI, text, Position::new(0, 0))
        );
    }
}

#[test]
fn publication_replaces_previous_set() {
    let service = svc();
    let first = service.publish(&Snapshot::new(URI, "foo: bar\n").with_version(1));
    let second = service.publish(&Snapshot::new(URI, "servername: x\n").with_version(2));
    assert_eq!(first.diagnostics.len(), 1);
    assert!(second.diagnostics.is_empty());
    assert_eq!(second.version, Some(2));
}

#[test]
fn crlf_documents_anchor_without_carriage_return() {
    let text = "foo: 1\r\nservername: 5\r\n";
    let diags = svc().validate(URI, text).diagnostics;
    assert_eq!(diags[0].range, range(1, 0, 1, 13));
}

#[test]
fn service_is_shareable_across_threads() {
    let service = std::sync::Arc::new(svc());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let service = service.clone();
            std::thread::spawn(move || {
                let text = if i % 2 == 0 { "foo: 1\n" } else { "servername: a\n" };
                service.diagnostics(text).len()
            })
        })
        .collect();
    let counts: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(counts, vec![1, 0, 1, 0]);
}

#[test]
fn config_file_drives_rules_and_completions() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
required_keys:
  - key: servername
    type: string
  - key: port
    type: number
    severity: warning
    detail: "Listening port"
"#
    )
    .unwrap();

    let config = EngineConfig::load(Some(file.path())).unwrap();
    let service = YamlService::new(config);

    let text = "servername: web\nport: \"eighty\"\n";
    let diags = service.validate(URI, text).diagnostics;
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].severity, Some(DiagnosticSeverity::WARNING));
    assert_eq!(diags[0].range, range(1, 0, 1, 14));

    let items = service.complete(URI, "other: 1\n", Position::new(0, 0));
    let inserts: Vec<_> = items.iter().filter_map(|i| i.insert_text.as_deref()).collect();
    assert_eq!(inserts, vec!["servername: ", "port: "]);
    assert_eq!(items[1].detail.as_deref(), Some("Listening port"));
}

#[test]
fn invalid_config_file_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "required_keys:\n  - key: a\n  - key: a\n").unwrap();
    assert!(EngineConfig::load(Some(file.path())).is_err());
}

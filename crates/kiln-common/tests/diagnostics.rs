use super::*;

#[test]
fn test_format_message_substitutes_positional_args() {
    let text = format_message("Identifier '{0}' in '{1}' ('{0}')", &["x", "f"]);
    assert_eq!(text, "Identifier 'x' in 'f' ('x')");
}

#[test]
fn test_every_code_has_a_template() {
    for code in [
        diagnostic_codes::DUPLICATE_DECLARATION,
        diagnostic_codes::CONST_ENUM_NOT_SUPPORTED,
        diagnostic_codes::AMBIENT_ENUM_ELIDED,
        diagnostic_codes::NON_CONSTANT_ENUM_INITIALIZER,
        diagnostic_codes::UNRESOLVED_BUNDLE_IMPORT,
        diagnostic_codes::EXPORT_STAR_NOT_BUNDLED,
    ] {
        assert!(get_message_template(code).is_some(), "missing template for {code}");
    }
    assert!(get_message_template(1).is_none());
}

#[test]
fn test_sink_records_file_span_and_category() {
    let mut diagnostics = Diagnostics::new("input.ts");
    let message = get_message(diagnostic_codes::AMBIENT_ENUM_ELIDED).unwrap();
    diagnostics.add(
        Some(Span::new(0, 12)),
        DiagnosticDescription::from_message(message, &["E"]),
    );

    assert_eq!(diagnostics.len(), 1);
    assert!(!diagnostics.has_errors());
    let diag = diagnostics.iter().next().unwrap();
    assert_eq!(diag.file, "input.ts");
    assert_eq!(diag.span, Some(Span::new(0, 12)));
    assert_eq!(diag.category, DiagnosticCategory::Warning);
    assert!(diag.message_text.contains("'E'"));
}

#[test]
fn test_has_errors_sees_error_category() {
    let mut diagnostics = Diagnostics::new("a.js");
    diagnostics.push(Diagnostic::warning("a.js", None, "w", 1));
    assert!(!diagnostics.has_errors());
    diagnostics.push(Diagnostic::error("a.js", None, "e", 2));
    assert!(diagnostics.has_errors());
    assert_eq!(diagnostics.codes(), vec![1, 2]);
}

#[test]
fn test_diagnostic_serializes_for_external_sinks() {
    let diag = Diagnostic::error("m.js", Some(Span::new(1, 4)), "boom", 9201);
    let json = serde_json::to_value(&diag).unwrap();
    assert_eq!(json["code"], 9201);
    assert_eq!(json["category"], "Error");
    assert_eq!(json["span"]["start"], 1);
    assert_eq!(json["file"], "m.js");
}

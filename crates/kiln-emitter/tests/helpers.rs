use super::*;

#[test]
fn test_format_number() {
    assert_eq!(format_number(0.0), "0");
    assert_eq!(format_number(-0.0), "0");
    assert_eq!(format_number(6.0), "6");
    assert_eq!(format_number(-3.0), "-3");
    assert_eq!(format_number(1.5), "1.5");
    assert_eq!(format_number(f64::NAN), "NaN");
    assert_eq!(format_number(f64::INFINITY), "Infinity");
}

#[test]
fn test_quote_string_escapes() {
    assert_eq!(quote_string("A"), "\"A\"");
    assert_eq!(quote_string("say \"hi\"\n"), "\"say \\\"hi\\\"\\n\"");
    assert_eq!(quote_string("a\\b"), "\"a\\\\b\"");
    assert_eq!(quote_string("\u{1}"), "\"\\x01\"");
}

#[test]
fn test_escape_template() {
    assert_eq!(escape_template("a`b${c}"), "a\\`b\\${c}");
}

use super::*;

#[test]
fn test_string_literal_escaping() {
    assert_eq!(java_string_literal("plain"), "\"plain\"");
    assert_eq!(java_string_literal("a\"b\\c\n"), "\"a\\\"b\\\\c\\n\"");
    assert_eq!(java_string_literal("\u{1}"), "\"\\u0001\"");
}

#[test]
fn test_block_nests_statements() {
    let text = block("while (x)", &["a();".to_string(), "b();".to_string()]);
    assert_eq!(text, "while (x) {\n    a();\n    b();\n}");
}

#[test]
fn test_method_render() {
    let method = JavaMethod::new("private", "boolean", "__pattern0")
        .param("Object", "__objx")
        .body(vec!["return true;".to_string()]);

    assert_eq!(
        method.render(),
        "private boolean __pattern0(Object __objx) {\n    return true;\n}"
    );
}

#[test]
fn test_class_render_separates_members() {
    let mut class = JavaClass::new("public", "Unit").extends("jadescript.core.Agent");
    class.member("int a;".to_string());
    class.member("int b;".to_string());

    assert_eq!(
        class.render(),
        "public class Unit extends jadescript.core.Agent {\n    int a;\n\n    int b;\n}"
    );
}

use super::*;

#[test]
fn test_indents_every_line_of_multiline_text() {
    let mut writer = SourceWriter::new();
    writer.increase_indent();
    writer.write_line_text("if (a) {\n    b();\n}");

    assert_eq!(writer.output(), "    if (a) {\n        b();\n    }\n");
}

#[test]
fn test_blank_lines_are_not_indented() {
    let mut writer = SourceWriter::new();
    writer.increase_indent();
    writer.write("a\n\nb");

    assert_eq!(writer.output(), "    a\n\n    b");
}

#[test]
fn test_decrease_indent_saturates() {
    let mut writer = SourceWriter::new();
    writer.decrease_indent();
    writer.write_usize(42);

    assert_eq!(writer.into_output(), "42");
}

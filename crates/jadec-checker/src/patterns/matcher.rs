//! Java shapes a compiled pattern term takes.

use jadec_emitter::JavaMethod;

/// How an equality test against a ground value is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Equality {
    /// Java `==`: both sides are numbers or booleans and the value is a
    /// primitive literal.
    Primitive { numeric: bool },
    /// `java.util.Objects.equals`.
    Objects,
}

/// A compiled term.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatternMatcher {
    /// A condition that does not read the value (`true`, `false`).
    Inline(String),
    /// Equality with a ground value.
    SingleCondition { value: String, equality: Equality },
    /// Stores the value into a binding field; always succeeds.
    FieldAssigning { field: String, host_type: String },
    /// Guarded downcast followed by a conjunction of conditions over `__x`.
    Composite {
        guard_class: String,
        cast_type: String,
        conditions: Vec<String>,
    },
}

impl PatternMatcher {
    pub fn failing() -> Self {
        PatternMatcher::Inline("false".to_string())
    }

    pub fn succeeding() -> Self {
        PatternMatcher::Inline("true".to_string())
    }

    /// `true` when the term is tested by its own procedure.
    pub const fn needs_method(&self) -> bool {
        matches!(
            self,
            PatternMatcher::FieldAssigning { .. } | PatternMatcher::Composite { .. }
        )
    }

    /// Condition testing `projection` inside the parent's procedure.
    pub fn condition_on(&self, projection: &str, method: &str) -> String {
        match self {
            PatternMatcher::Inline(text) => text.clone(),
            PatternMatcher::SingleCondition {
                value,
                equality: Equality::Primitive { .. },
            } => format!("{projection}=={value}"),
            PatternMatcher::SingleCondition {
                value,
                equality: Equality::Objects,
            } => format!("java.util.Objects.equals({projection}, {value})"),
            PatternMatcher::FieldAssigning { .. } | PatternMatcher::Composite { .. } => {
                format!("{method}({projection})")
            }
        }
    }

    /// Procedure `boolean method(Object __objx)` testing the term.
    /// `prelude` statements come first in the body.
    pub fn render_method(&self, method: &str, prelude: Vec<String>) -> String {
        let mut body = prelude;
        match self {
            PatternMatcher::Inline(text) => body.push(format!("return {text};")),
            PatternMatcher::SingleCondition {
                value,
                equality: Equality::Primitive { numeric: true },
            } => body.push(format!(
                "return __objx instanceof java.lang.Number && ((java.lang.Number) __objx).doubleValue() == ({value});"
            )),
            PatternMatcher::SingleCondition { value, .. } => {
                body.push(format!("return java.util.Objects.equals(__objx, {value});"));
            }
            PatternMatcher::FieldAssigning { field, host_type } => {
                body.push(format!("{field} = ({host_type}) __objx;"));
                body.push("return true;".to_string());
            }
            PatternMatcher::Composite {
                guard_class,
                cast_type,
                conditions,
            } => {
                let conjunction = if conditions.is_empty() {
                    "true".to_string()
                } else {
                    conditions.join(" && ")
                };
                body.push(jadec_emitter::block(
                    &format!("if (__objx instanceof {guard_class})"),
                    &[
                        format!("{cast_type} __x = ({cast_type}) __objx;"),
                        format!("return {conjunction};"),
                    ],
                ));
                body.push("return false;".to_string());
            }
        }
        JavaMethod::new("public", "boolean", method)
            .param("java.lang.Object", "__objx")
            .body(body)
            .render()
    }
}

/// Render the holder class of a root pattern.
pub fn render_holder(class_name: &str, fields: &[(String, String)], methods: &[String]) -> String {
    let mut holder = jadec_emitter::JavaClass::new("private", class_name);
    for (name, host_type) in fields {
        holder.member(format!("public {host_type} {name};"));
    }
    for method in methods {
        holder.member(method.clone());
    }
    holder.render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_condition_inline_forms() {
        let primitive = PatternMatcher::SingleCondition {
            value: "2".to_string(),
            equality: Equality::Primitive { numeric: true },
        };
        assert_eq!(primitive.condition_on("__x.get(1)", "unused"), "__x.get(1)==2");

        let objects = PatternMatcher::SingleCondition {
            value: "\"a\"".to_string(),
            equality: Equality::Objects,
        };
        assert_eq!(
            objects.condition_on("__x.get(0)", "unused"),
            "java.util.Objects.equals(__x.get(0), \"a\")"
        );
    }

    #[test]
    fn method_backed_terms_are_called() {
        let field = PatternMatcher::FieldAssigning {
            field: "x".to_string(),
            host_type: "java.lang.Integer".to_string(),
        };
        assert!(field.needs_method());
        assert_eq!(field.condition_on("__x.get(0)", "__pattern0_0"), "__pattern0_0(__x.get(0))");
        let rendered = field.render_method("__pattern0_0", Vec::new());
        assert!(rendered.contains("x = (java.lang.Integer) __objx;"));
        assert!(rendered.contains("return true;"));
    }

    #[test]
    fn composite_guards_and_casts() {
        let composite = PatternMatcher::Composite {
            guard_class: "jadescript.util.types.Tuple2".to_string(),
            cast_type: "jadescript.util.types.Tuple2<java.lang.Integer, java.lang.Integer>".to_string(),
            conditions: vec!["__x.getLength()==2".to_string()],
        };
        let rendered = composite.render_method("__pattern0", Vec::new());
        assert!(rendered.starts_with("public boolean __pattern0(java.lang.Object __objx) {"));
        assert!(rendered.contains("if (__objx instanceof jadescript.util.types.Tuple2) {"));
        assert!(rendered.contains("return __x.getLength()==2;"));
        assert!(rendered.trim_end().ends_with('}'));
    }
}

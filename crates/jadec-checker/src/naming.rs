//! Java names derived from source names.

/// `name` with its first character in upper case.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn getter_name(property: &str) -> String {
    format!("get{}", capitalize(property))
}

pub fn setter_name(property: &str) -> String {
    format!("set{}", capitalize(property))
}

/// Java class name for a unit: non-identifier characters are dropped and
/// each remaining word is capitalized (`my-agent.jade` → `MyAgentJade`).
pub fn unit_class_name(prefix: &str, unit_name: &str) -> String {
    let stem = unit_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(unit_name);
    let stem = stem.strip_suffix(".json").unwrap_or(stem);
    let mut out = String::from(prefix);
    for word in stem.split(|c: char| !c.is_ascii_alphanumeric()) {
        out.push_str(&capitalize(word));
    }
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert_str(0, "Unit");
    }
    out
}

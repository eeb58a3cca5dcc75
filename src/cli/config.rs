use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub use jadec_checker::CheckerOptions;

/// File name looked up next to the inputs when no `--project` is given.
pub const CONFIG_FILE_NAME: &str = "jadec.json";

/// Accepts `true` as well as `"true"`, `"yes"`, `"on"` and `"1"` (and their
/// negative counterparts) for boolean options.
fn deserialize_bool_or_string<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    match Option::<BoolOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(BoolOrString::Bool(b)) => Ok(Some(b)),
        Some(BoolOrString::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(Error::custom(format!(
                "invalid boolean value: '{}'. Expected true, false, 'true', or 'false'",
                s
            ))),
        },
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct JadecConfig {
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub compiler_options: Option<CompilerOptions>,
    #[serde(default)]
    pub files: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    /// Turns on every optional check.
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub strict: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub strict_purity: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub report_unreachable_code: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub report_inferred_top: Option<bool>,
    #[serde(default)]
    pub unit_class_prefix: Option<String>,
    #[serde(default)]
    pub out_dir: Option<String>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub no_emit: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub no_emit_on_error: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct ResolvedCompilerOptions {
    pub checker: CheckerOptions,
    pub out_dir: Option<PathBuf>,
    pub no_emit: bool,
    pub no_emit_on_error: bool,
}

pub fn resolve_compiler_options(
    options: Option<&CompilerOptions>,
) -> Result<ResolvedCompilerOptions> {
    let mut resolved = ResolvedCompilerOptions::default();
    let Some(options) = options else {
        return Ok(resolved);
    };

    // Individual flags below override what `strict` turned on.
    if options.strict == Some(true) {
        resolved.checker = resolved.checker.apply_strict_defaults();
    }

    if let Some(strict_purity) = options.strict_purity {
        resolved.checker.strict_purity = strict_purity;
    }

    if let Some(report) = options.report_unreachable_code {
        resolved.checker.report_unreachable_code = report;
    }

    if let Some(report) = options.report_inferred_top {
        resolved.checker.report_inferred_top = report;
    }

    if let Some(prefix) = options.unit_class_prefix.as_deref() {
        let prefix = prefix.trim();
        if !prefix.is_empty() {
            if !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                || prefix.starts_with(|c: char| c.is_ascii_digit())
            {
                bail!("compilerOptions.unitClassPrefix is not a valid Java identifier: '{prefix}'");
            }
            resolved.checker.unit_class_prefix = prefix.to_string();
        }
    }

    if let Some(out_dir) = options.out_dir.as_deref()
        && !out_dir.is_empty()
    {
        resolved.out_dir = Some(PathBuf::from(out_dir));
    }

    if let Some(no_emit) = options.no_emit {
        resolved.no_emit = no_emit;
    }

    if let Some(no_emit_on_error) = options.no_emit_on_error {
        resolved.no_emit_on_error = no_emit_on_error;
    }

    Ok(resolved)
}

pub fn parse_config(source: &str) -> Result<JadecConfig> {
    let stripped = strip_comments(source);
    let config = serde_json::from_str(&stripped).context("failed to parse jadec.json")?;
    Ok(config)
}

/// Load `path`, following `extends` chains; child options win.
pub fn load_config(path: &Path) -> Result<JadecConfig> {
    let mut visited = HashSet::new();
    load_config_inner(path, &mut visited)
}

fn load_config_inner(path: &Path, visited: &mut HashSet<PathBuf>) -> Result<JadecConfig> {
    let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(canonical.clone()) {
        bail!("config extends cycle detected at {}", canonical.display());
    }

    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let mut config =
        parse_config(&source).with_context(|| format!("failed to parse config: {}", path.display()))?;

    if let Some(extends) = config.extends.take() {
        let base_dir = path
            .parent()
            .ok_or_else(|| anyhow!("config has no parent directory"))?;
        let mut base_path = PathBuf::from(extends);
        if base_path.extension().is_none() {
            base_path.set_extension("json");
        }
        let base_path = if base_path.is_absolute() {
            base_path
        } else {
            base_dir.join(base_path)
        };
        let base = load_config_inner(&base_path, visited)?;
        config = merge_configs(base, config);
    }

    visited.remove(&canonical);
    Ok(config)
}

fn merge_configs(base: JadecConfig, mut child: JadecConfig) -> JadecConfig {
    let compiler_options = match (base.compiler_options, child.compiler_options.take()) {
        (Some(base), Some(child)) => Some(CompilerOptions {
            strict: child.strict.or(base.strict),
            strict_purity: child.strict_purity.or(base.strict_purity),
            report_unreachable_code: child
                .report_unreachable_code
                .or(base.report_unreachable_code),
            report_inferred_top: child.report_inferred_top.or(base.report_inferred_top),
            unit_class_prefix: child.unit_class_prefix.or(base.unit_class_prefix),
            out_dir: child.out_dir.or(base.out_dir),
            no_emit: child.no_emit.or(base.no_emit),
            no_emit_on_error: child.no_emit_on_error.or(base.no_emit_on_error),
        }),
        (base, child) => child.or(base),
    };

    JadecConfig {
        extends: None,
        compiler_options,
        files: child.files.or(base.files),
    }
}

/// Remove `//` and `/* */` comments outside string literals.
fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape = false;

    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match (ch, chars.peek().copied()) {
            ('"', _) => {
                in_string = true;
                out.push(ch);
            }
            ('/', Some('/')) => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut previous = '\0';
                for next in chars.by_ref() {
                    if previous == '*' && next == '/' {
                        break;
                    }
                    if next == '\n' {
                        out.push('\n');
                    }
                    previous = next;
                }
            }
            _ => out.push(ch),
        }
    }

    out
}

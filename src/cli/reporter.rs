use anyhow::{Context, Result};
use colored::Colorize;

use jadec_common::{Diagnostic, DiagnosticCategory, DiagnosticRelatedInformation, Span};

pub struct Reporter {
    color: bool,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter { color }
    }

    /// One block per diagnostic, each ending in a newline.
    pub fn render(&self, diagnostics: &[Diagnostic]) -> String {
        let mut out = String::new();
        for diagnostic in diagnostics {
            out.push_str(&self.format_diagnostic(diagnostic));
            out.push('\n');
        }
        if !diagnostics.is_empty() {
            out.push('\n');
            out.push_str(&self.format_summary(diagnostics));
            out.push('\n');
        }
        out
    }

    /// Machine-readable rendering used by `--format json`.
    pub fn render_json(diagnostics: &[Diagnostic]) -> Result<String> {
        serde_json::to_string_pretty(diagnostics).context("failed to serialize diagnostics")
    }

    pub fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String {
        let mut output = format_location(&diagnostic.file, diagnostic.span);
        output.push_str(" - ");
        output.push_str(&self.format_category(diagnostic.category));
        output.push(' ');
        output.push_str(&self.format_code(diagnostic.code.as_str()));
        output.push_str(": ");
        output.push_str(&diagnostic.message_text);

        if let Some(feature) = diagnostic.feature {
            let feature = match diagnostic.index {
                Some(index) => format!("[{feature}#{index}]"),
                None => format!("[{feature}]"),
            };
            output.push(' ');
            if self.color {
                output.push_str(&feature.dimmed().to_string());
            } else {
                output.push_str(&feature);
            }
        }

        for related in &diagnostic.related_information {
            output.push('\n');
            output.push_str(&self.format_related(related));
        }

        output
    }

    fn format_related(&self, related: &DiagnosticRelatedInformation) -> String {
        let prefix = if self.color {
            "  Related".dimmed().to_string()
        } else {
            "  Related".to_string()
        };
        format!(
            "{}: {} - {}",
            prefix,
            format_location(&related.file, related.span),
            related.message_text
        )
    }

    fn format_summary(&self, diagnostics: &[Diagnostic]) -> String {
        let errors = diagnostics.iter().filter(|d| d.is_error()).count();
        let summary = match errors {
            0 => "Found 0 errors.".to_string(),
            1 => "Found 1 error.".to_string(),
            n => format!("Found {n} errors."),
        };
        if self.color && errors > 0 {
            summary.red().bold().to_string()
        } else {
            summary
        }
    }

    fn format_category(&self, category: DiagnosticCategory) -> String {
        let label = match category {
            DiagnosticCategory::Error => "error",
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Info => "info",
        };

        if !self.color {
            return label.to_string();
        }

        match category {
            DiagnosticCategory::Error => label.red().bold().to_string(),
            DiagnosticCategory::Warning => label.yellow().bold().to_string(),
            DiagnosticCategory::Info => label.cyan().bold().to_string(),
        }
    }

    fn format_code(&self, code: &str) -> String {
        if self.color {
            code.bright_blue().to_string()
        } else {
            code.to_string()
        }
    }
}

/// `file(start,end)`, or just the file for synthesized spans.
fn format_location(file: &str, span: Span) -> String {
    let file = if file.is_empty() { "<unknown>" } else { file };
    if span.is_empty() {
        file.to_string()
    } else {
        format!("{}({},{})", file, span.start, span.end)
    }
}

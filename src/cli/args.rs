use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the jadec binary.
#[derive(Parser, Debug)]
#[command(
    name = "jadec",
    version,
    about = "Type checker and Java compiler for JADE agent programs"
)]
pub struct CliArgs {
    /// Path to jadec.json or a directory containing it.
    #[arg(short = 'p', long = "project")]
    pub project: Option<PathBuf>,

    /// Directory receiving the generated Java sources.
    #[arg(long = "outDir", alias = "out-dir")]
    pub out_dir: Option<PathBuf>,

    /// Only type check; do not write Java sources.
    #[arg(long = "noEmit", alias = "no-emit")]
    pub no_emit: bool,

    /// Do not write Java sources when any unit reports an error.
    #[arg(long = "noEmitOnError", alias = "no-emit-on-error")]
    pub no_emit_on_error: bool,

    /// Enable every optional check.
    #[arg(long)]
    pub strict: bool,

    /// Require side-effect-free patterns everywhere, not only in handler headers.
    #[arg(long = "strictPurity", alias = "strict-purity")]
    pub strict_purity: bool,

    /// Suppress info diagnostics for unreachable statements.
    #[arg(long = "noUnreachableReport", alias = "no-unreachable-report")]
    pub no_unreachable_report: bool,

    /// Prefix prepended to every generated class name.
    #[arg(long = "classPrefix", alias = "class-prefix")]
    pub class_prefix: Option<String>,

    /// Diagnostic output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Enable color and formatting in output.
    #[arg(long)]
    pub pretty: Option<bool>,

    /// Print the generated Java class of each unit instead of writing files.
    #[arg(long = "printJava", alias = "print-java")]
    pub print_java: bool,

    /// Program files or directories to compile.
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

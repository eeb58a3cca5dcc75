use clap::Parser;

use super::args::{CliArgs, OutputFormat};

#[test]
fn parses_defaults() {
    let args = CliArgs::try_parse_from(["jadec"]).expect("default args should parse");

    assert!(args.project.is_none());
    assert!(args.out_dir.is_none());
    assert!(!args.no_emit);
    assert!(!args.strict);
    assert!(!args.strict_purity);
    assert_eq!(args.format, OutputFormat::Text);
    assert!(args.pretty.is_none());
    assert!(args.files.is_empty());
}

#[test]
fn parses_common_flags() {
    let args = CliArgs::try_parse_from([
        "jadec",
        "--project",
        "agents/jadec.json",
        "--outDir",
        "gen",
        "--noEmit",
        "--strictPurity",
        "--classPrefix",
        "Jade",
        "--format",
        "json",
        "agents/ping.json",
        "agents/pong.json",
    ])
    .expect("flagged args should parse");

    assert_eq!(
        args.project.as_deref(),
        Some(std::path::Path::new("agents/jadec.json"))
    );
    assert_eq!(args.out_dir.as_deref(), Some(std::path::Path::new("gen")));
    assert!(args.no_emit);
    assert!(args.strict_purity);
    assert_eq!(args.class_prefix.as_deref(), Some("Jade"));
    assert_eq!(args.format, OutputFormat::Json);
    assert_eq!(args.files.len(), 2);
}

#[test]
fn accepts_kebab_case_aliases() {
    let args = CliArgs::try_parse_from(["jadec", "--out-dir", "gen", "--no-emit-on-error"])
        .expect("aliases should parse");

    assert_eq!(args.out_dir.as_deref(), Some(std::path::Path::new("gen")));
    assert!(args.no_emit_on_error);
}

#[test]
fn rejects_unknown_format() {
    assert!(CliArgs::try_parse_from(["jadec", "--format", "xml"]).is_err());
}

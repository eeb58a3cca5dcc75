#![allow(clippy::print_stderr)]

use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;

use jadec::cli::args::{CliArgs, OutputFormat};
use jadec::cli::{driver, reporter::Reporter};

const EXIT_SUCCESS: i32 = 0;
const EXIT_DIAGNOSTICS_OUTPUTS_SKIPPED: i32 = 1;
const EXIT_DIAGNOSTICS_OUTPUTS_GENERATED: i32 = 2;

fn main() -> Result<()> {
    // JADEC_LOG / JADEC_LOG_FORMAT, see src/tracing_config.rs.
    jadec::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    let result = driver::compile(&args, &cwd)?;

    if args.print_java {
        for class in &result.classes {
            println!("// {}", class.input.display());
            println!("{}", class.java_source);
        }
    }

    match args.format {
        OutputFormat::Json => println!("{}", Reporter::render_json(&result.diagnostics)?),
        OutputFormat::Text => {
            if !result.diagnostics.is_empty() {
                let pretty = args
                    .pretty
                    .unwrap_or_else(|| std::io::stderr().is_terminal());
                eprint!("{}", Reporter::new(pretty).render(&result.diagnostics));
            }
        }
    }

    if result.has_errors() {
        if args.no_emit || !result.emitted_files.is_empty() {
            std::process::exit(EXIT_DIAGNOSTICS_OUTPUTS_GENERATED);
        } else {
            std::process::exit(EXIT_DIAGNOSTICS_OUTPUTS_SKIPPED);
        }
    }

    std::process::exit(EXIT_SUCCESS);
}

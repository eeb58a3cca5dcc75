use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info_span};
use walkdir::WalkDir;

use jadec_ast::SourceUnit;
use jadec_checker::{check_unit, compile_unit};
use jadec_common::Diagnostic;

use crate::cli::args::CliArgs;
use crate::cli::config::{
    CONFIG_FILE_NAME, JadecConfig, ResolvedCompilerOptions, load_config, resolve_compiler_options,
};
use crate::program::load_program;

#[derive(Debug, Clone)]
pub struct CompilationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub emitted_files: Vec<PathBuf>,
    pub files_read: Vec<PathBuf>,
    /// Generated classes in input order, also when nothing was written.
    pub classes: Vec<GeneratedClass>,
}

impl CompilationResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedClass {
    pub input: PathBuf,
    pub class_name: String,
    pub java_source: String,
}

struct OutputFile {
    path: PathBuf,
    contents: String,
}

pub fn compile(args: &CliArgs, cwd: &Path) -> Result<CompilationResult> {
    let _span = info_span!("compile").entered();

    let (config, config_dir) = match locate_config(args, cwd)? {
        Some(path) => {
            let config = load_config(&path)?;
            let dir = path.parent().map(Path::to_path_buf).unwrap_or_else(|| cwd.to_path_buf());
            (config, dir)
        }
        None => (JadecConfig::default(), cwd.to_path_buf()),
    };

    let mut options = resolve_compiler_options(config.compiler_options.as_ref())?;
    apply_cli_overrides(&mut options, args);

    let inputs: Vec<PathBuf> = if args.files.is_empty() {
        config
            .files
            .iter()
            .flatten()
            .map(|file| config_dir.join(file))
            .collect()
    } else {
        args.files.iter().map(|file| cwd.join(file)).collect()
    };
    let files = discover_program_files(&inputs)?;
    if files.is_empty() {
        bail!("no input files");
    }
    debug!(files = files.len(), "discovered program files");

    let units: Vec<SourceUnit> = files
        .par_iter()
        .map(|path| load_program(path))
        .collect::<Result<_>>()?;

    let emit = !args.no_emit && !options.no_emit;
    let classes: Vec<(Vec<Diagnostic>, Option<GeneratedClass>)> = units
        .par_iter()
        .zip(files.par_iter())
        .map(|(unit, path)| {
            if emit || args.print_java {
                let compiled = compile_unit(unit, &options.checker);
                let class = GeneratedClass {
                    input: path.clone(),
                    class_name: compiled.class_name,
                    java_source: compiled.java_source,
                };
                (compiled.diagnostics, Some(class))
            } else {
                (check_unit(unit, &options.checker), None)
            }
        })
        .collect();

    let mut diagnostics = Vec::new();
    let mut generated = Vec::new();
    for (unit_diagnostics, class) in classes {
        diagnostics.extend(unit_diagnostics);
        generated.extend(class);
    }

    let has_errors = diagnostics.iter().any(Diagnostic::is_error);
    let emitted_files = if emit && !(options.no_emit_on_error && has_errors) {
        let outputs: Vec<OutputFile> = generated
            .iter()
            .map(|class| OutputFile {
                path: java_output_path(options.out_dir.as_deref(), &config_dir, class),
                contents: class.java_source.clone(),
            })
            .collect();
        write_outputs(&outputs)?
    } else {
        Vec::new()
    };

    Ok(CompilationResult {
        diagnostics,
        emitted_files,
        files_read: files,
        classes: generated,
    })
}

fn apply_cli_overrides(options: &mut ResolvedCompilerOptions, args: &CliArgs) {
    if args.strict {
        options.checker = std::mem::take(&mut options.checker).apply_strict_defaults();
    }
    if args.strict_purity {
        options.checker.strict_purity = true;
    }
    if args.no_unreachable_report {
        options.checker.report_unreachable_code = false;
    }
    if let Some(prefix) = &args.class_prefix {
        options.checker.unit_class_prefix = prefix.clone();
    }
    if let Some(out_dir) = &args.out_dir {
        options.out_dir = Some(out_dir.clone());
    }
    if args.no_emit_on_error {
        options.no_emit_on_error = true;
    }
}

/// `--project` may name the config file or its directory; without it a
/// `jadec.json` in `cwd` is used when present.
fn locate_config(args: &CliArgs, cwd: &Path) -> Result<Option<PathBuf>> {
    match &args.project {
        Some(project) => {
            let project = cwd.join(project);
            let path = if project.is_dir() {
                project.join(CONFIG_FILE_NAME)
            } else {
                project
            };
            if !path.is_file() {
                bail!("config file not found: {}", path.display());
            }
            Ok(Some(path))
        }
        None => {
            let path = cwd.join(CONFIG_FILE_NAME);
            Ok(path.is_file().then_some(path))
        }
    }
}

/// Expand directories to the `.json` program files below them, skipping
/// config files. Explicit file arguments are kept as given.
pub fn discover_program_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_file() {
            files.push(input.clone());
            continue;
        }
        if !input.is_dir() {
            bail!("input not found: {}", input.display());
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(input)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            let is_program = path.extension().is_some_and(|ext| ext == "json")
                && path.file_name().is_some_and(|name| name != CONFIG_FILE_NAME);
            if is_program {
                found.push(path.to_path_buf());
            }
        }
        found.sort();
        files.extend(found);
    }
    files.dedup();
    Ok(files)
}

fn java_output_path(out_dir: Option<&Path>, base_dir: &Path, class: &GeneratedClass) -> PathBuf {
    let file_name = format!("{}.java", class.class_name);
    match out_dir {
        Some(dir) if dir.is_absolute() => dir.join(file_name),
        Some(dir) => base_dir.join(dir).join(file_name),
        None => class
            .input
            .parent()
            .map(|parent| parent.join(&file_name))
            .unwrap_or_else(|| PathBuf::from(file_name)),
    }
}

fn write_outputs(outputs: &[OutputFile]) -> Result<Vec<PathBuf>> {
    outputs.par_iter().try_for_each(|output| -> Result<()> {
        if let Some(parent) = output.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        std::fs::write(&output.path, &output.contents)
            .with_context(|| format!("failed to write {}", output.path.display()))?;
        Ok(())
    })?;

    Ok(outputs.iter().map(|output| output.path.clone()).collect())
}

//! Minimal CLI: declaration tree (JSON) → (TypeScript decoders | emission tree)
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;

use crate::assemble::{assemble, GeneratedModule};
use crate::config::CompileConfig;
use crate::descriptor::SourceModule;
use crate::error::{Error, Result};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate runtime decoders from parsed TypeScript type declarations
#[derive(Parser, Debug)]
#[command(name = "decoder-gen")]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// compile and print the TypeScript decoder module
    Generate(GenerateOut),
    /// compile and print the emission tree and diagnostics as JSON
    Inspect(InspectOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON), one module per line
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select the module in each document (e.g. /program/types)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document; every output is one module
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths, quoted glob patterns, or `-` for stdin
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct CompileSettings {
    /// JSON file with `tagField` / `namedImportStyle`
    #[arg(long)]
    config: Option<PathBuf>,

    /// discriminator field that enables tagged-union decoders
    #[arg(long)]
    tag_field: Option<String>,

    /// import each used builtin by name instead of `import * as decoders`
    #[arg(long, default_value_t = false)]
    named_imports: bool,

    /// what to do when a node cannot be compiled
    #[arg(long, value_enum, default_value_t = SkipPolicy::Warn)]
    on_skip: SkipPolicy,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipPolicy {
    /// keep going silently
    Ignore,
    /// log every diagnostic
    Warn,
    /// log every diagnostic, then fail if any node was skipped
    Deny,
}

#[derive(clap::Parser, Debug)]
struct GenerateOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    compile_settings: CompileSettings,

    /// output .ts file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct InspectOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    compile_settings: CompileSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    /// Every declaration from every input document, in input order.
    fn load_module(&self) -> Result<SourceModule> {
        let mut module = SourceModule::default();
        for source_path in resolve_file_path_patterns(&self.input)? {
            let source = read_input(&source_path)?;
            let documents = if self.ndjson {
                source
                    .lines()
                    .filter(|line| !line.trim().is_empty())
                    .map(|line| self.load_document(line))
                    .collect::<Result<Vec<Vec<_>>>>()
                    .map(|lines| lines.into_iter().flatten().collect::<Vec<_>>())
            } else {
                self.load_document(&source)
            };
            let documents = documents.map_err(|error| error.in_file(&display_path(&source_path)))?;
            for document in documents {
                module.declarations.extend(document.declarations);
            }
            tracing::debug!(path = %display_path(&source_path).display(), "loaded input");
        }
        Ok(module)
    }

    fn load_document(&self, source: &str) -> Result<Vec<SourceModule>> {
        if self.json_pointer.is_none() && self.jq_expr.is_none() {
            return Ok(vec![crate::path_de::from_str_with_path(source)?]);
        }
        let mut value = crate::path_de::from_str_with_path::<serde_json::Value>(source)?;
        if let Some(pointer) = self.json_pointer.as_ref() {
            value = value
                .pointer(pointer)
                .cloned()
                .ok_or_else(|| Error::JsonPointer { file: None, pointer: pointer.clone() })?;
        }
        let values = match self.jq_expr.as_ref() {
            None => vec![value],
            Some(jq_expr) => crate::jq_exec::run_jaq(jq_expr, &value)?,
        };
        values.into_iter().map(crate::path_de::from_value_with_path).collect()
    }
}

impl CompileSettings {
    fn resolve(&self) -> Result<CompileConfig> {
        let base = match self.config.as_ref() {
            Some(path) => CompileConfig::from_file(path)?,
            None => CompileConfig::default(),
        };
        Ok(base.with_overrides(self.tag_field.clone(), self.named_imports))
    }

    fn compile(&self, input: &InputSettings) -> anyhow::Result<GeneratedModule> {
        let config = self.resolve().context("failed to load configuration")?;
        let source = input.load_module().context("failed to load declarations")?;
        let generated = assemble(&source, &config);
        tracing::info!(
            declarations = source.declarations.len(),
            skipped = generated.skipped_nodes(),
            "generated decoders"
        );
        apply_skip_policy(self.on_skip, &generated)?;
        Ok(generated)
    }
}

pub fn apply_skip_policy(policy: SkipPolicy, generated: &GeneratedModule) -> Result<()> {
    if policy == SkipPolicy::Ignore {
        return Ok(());
    }
    for diagnostic in &generated.diagnostics {
        tracing::warn!("{diagnostic}");
    }
    if !generated.diagnostics.is_empty() {
        eprintln!("{}", crate::diagnostics::summary_line(&generated.diagnostics));
    }
    let skipped = generated.skipped_nodes();
    if policy == SkipPolicy::Deny && skipped > 0 {
        return Err(Error::SkippedNodes { count: skipped });
    }
    Ok(())
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Generate(target) => {
                let generated = target.compile_settings.compile(&target.input_settings)?;
                let ts_src = crate::printer::render_module(&generated);
                write_output(target.out.as_deref(), &ts_src)
            }
            Command::Inspect(target) => {
                let generated = target.compile_settings.compile(&target.input_settings)?;
                let json_src = serde_json::to_string_pretty(&generated)?;
                write_output(target.out.as_deref(), &json_src)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_output(out: Option<&Path>, contents: &str) -> anyhow::Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, contents).with_context(|| format!("failed to write {}", out.display()))?;
            eprintln!("{} {}", "wrote".green().bold(), out.display());
        }
        None => print!("{contents}"),
    }
    Ok(())
}

/// Input path that reads standard input.
const STDIN_PATH: &str = "-";

fn read_input(path: &Path) -> Result<String> {
    let source = if path == Path::new(STDIN_PATH) {
        std::io::read_to_string(std::io::stdin())
    } else {
        std::fs::read_to_string(path)
    };
    source.map_err(|source| Error::Io { path: display_path(path), source })
}

/// How an input is named in messages.
fn display_path(path: &Path) -> PathBuf {
    if path == Path::new(STDIN_PATH) {
        PathBuf::from("<stdin>")
    } else {
        path.to_path_buf()
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                matched_any = true;
                out.push(entry?);
            }
            if !matched_any {
                return Err(Error::NoGlobMatch(pattern.to_string()));
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

//! docspec — generate an API specification from jsdoc doclets.
//!
//! Two subcommands:
//!
//! - **spec**: `jsdoc -X src | docspec spec -o spec.json`, or
//!   `docspec spec -o spec.json doclets/*.json`
//! - **markdown**: `docspec markdown spec.json -o API.md`

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use docspec::doclet::{self, Doclet};
use docspec::{render, spec, Overrides, Specification};
use std::collections::BTreeSet;
use std::fs;
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "docspec",
    about = "Generate an API specification from jsdoc doclets and render it as markdown"
)]
struct Cli {
    /// More output (-v for verbose diagnostics, -vv for trace)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only report errors
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a specification document from doclet JSON (`jsdoc -X` output).
    Spec {
        /// Doclet files, directories or glob patterns. Reads stdin when omitted or `-`.
        inputs: Vec<String>,

        /// Output file (default: stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// JSON file with name/description/version/license overrides
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,

        /// API name (overrides the package doclet)
        #[arg(long)]
        name: Option<String>,

        /// API description (overrides the package doclet)
        #[arg(long)]
        description: Option<String>,

        /// API version (overrides the package doclet)
        #[arg(long)]
        version: Option<String>,

        /// License (overrides the package doclet)
        #[arg(long)]
        license: Option<String>,
    },
    /// Render a specification document as markdown.
    Markdown {
        /// Specification file. Reads stdin when omitted or `-`.
        input: Option<String>,

        /// Output file (default: stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Spec {
            inputs,
            output,
            config,
            name,
            description,
            version,
            license,
        } => {
            let flags = Overrides {
                name,
                description,
                version,
                license,
            };
            let overrides = match config {
                Some(path) => Overrides::load(&path)?.merged_with(flags),
                None => flags,
            };
            spec_command(&inputs, output.as_deref(), &overrides)
        }
        Command::Markdown { input, output } => markdown_command(input.as_deref(), output.as_deref()),
    }
}

/// Log to stderr; `RUST_LOG` wins over the flags.
fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr)
        .init();
}

fn spec_command(inputs: &[String], output: Option<&Path>, overrides: &Overrides) -> Result<()> {
    let doclets = read_doclets(inputs)?;
    debug!(count = doclets.len(), "doclets read");

    let generated = spec::generate(doclets, overrides);
    if !generated.skipped.is_empty() {
        info!(count = generated.skipped.len(), "doclets skipped");
    }

    let json = generated.spec.to_json()?;
    emit(&json, output)
}

fn markdown_command(input: Option<&str>, output: Option<&Path>) -> Result<()> {
    let text = match input {
        None | Some("-") => read_stdin()?,
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path))?
        }
    };
    let document = Specification::from_json(&text)?;
    let markdown = render::to_markdown(&document);
    emit(&markdown.document(), output)
}

/// Write to `output`, or to stdout when no file is given.
fn emit(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => spec::write(text, path),
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .context("failed to write stdout")?;
            if !text.ends_with('\n') {
                stdout.write_all(b"\n").context("failed to write stdout")?;
            }
            Ok(())
        }
    }
}

fn read_stdin() -> Result<String> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;
    Ok(input)
}

/// Read and concatenate doclet arrays from every input, in sorted path order.
fn read_doclets(inputs: &[String]) -> Result<Vec<Doclet>> {
    if inputs.is_empty() || inputs.iter().all(|i| i == "-") {
        return doclet::parse_doclets(&read_stdin()?, "<stdin>");
    }

    let mut doclets = Vec::new();
    for path in input_files(inputs)? {
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        doclets.extend(doclet::parse_doclets(&text, &path.display().to_string())?);
    }
    Ok(doclets)
}

/// Resolve file paths, directories (their `*.json` files) and glob patterns
/// into one sorted, duplicate-free list of doclet files.
fn input_files(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = BTreeSet::new();
    for input in inputs {
        let path = Path::new(input);
        if path.is_dir() {
            files.extend(doclet_files_in(path)?);
        } else if path.is_file() {
            files.insert(path.to_path_buf());
        } else {
            let matched = glob_files(input)?;
            if matched.is_empty() {
                warn!(pattern = %input, "no files matched");
            }
            files.extend(matched);
        }
    }
    Ok(files.into_iter().collect())
}

fn doclet_files_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?;
    Ok(entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect())
}

fn glob_files(pattern: &str) -> Result<Vec<PathBuf>> {
    Ok(glob::glob(pattern)
        .with_context(|| format!("invalid glob pattern {}", pattern))?
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .collect())
}

//! `retrace` - parses TypoScript-flavoured files and prints the syntax tree,
//! the raw event log or the diagnostics.

mod config;
mod render;

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use retrace_syntax::parser::{assemble, grammar_events};
use retrace_syntax::{lex, EmptyLoopPolicy, EntryPoint, ParserConfig};
use tracing::{debug, info};

use render::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "retrace",
    version,
    about = "Parse files with the backtracking tree builder",
    after_help = "Examples:\n  retrace setup.typoscript\n  retrace --output errors --deny-errors site/*.typoscript\n  echo 'a && !b' | retrace --entry expr"
)]
struct Cli {
    /// Files to parse. Reads standard input when none are given.
    files: Vec<PathBuf>,
    /// Grammar entry point (file, path, expr, condition).
    #[arg(long, short, default_value = "file")]
    entry: EntryPoint,
    /// What to print for each input.
    #[arg(long, short, value_enum, default_value_t)]
    output: OutputFormat,
    /// Config file (defaults to retrace.toml in the working directory).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the recursion limit.
    #[arg(long)]
    max_depth: Option<usize>,
    /// Override the empty loop policy (ignore, warn, report).
    #[arg(long)]
    empty_loop: Option<EmptyLoopPolicy>,
    /// Exit with an error when any input has parse errors.
    #[arg(long)]
    deny_errors: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    debug!(?config, entry = %cli.entry, "parser settings");

    let mut failed = 0;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if cli.files.is_empty() {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read standard input")?;
        failed += usize::from(!run(&cli, &config, "<stdin>", &text, &mut out)?);
    } else {
        for path in &cli.files {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let name = path.display().to_string();
            failed += usize::from(!run(&cli, &config, &name, &text, &mut out)?);
        }
    }

    if failed > 0 {
        info!(failed, "inputs with parse errors");
        if cli.deny_errors {
            anyhow::bail!("{failed} input(s) with parse errors");
        }
    }
    Ok(())
}

fn resolve_config(cli: &Cli) -> anyhow::Result<ParserConfig> {
    let mut config = match &cli.config {
        Some(path) => config::load_from(path)?,
        None => config::discover(Path::new(".")),
    };
    if let Some(max_depth) = cli.max_depth {
        anyhow::ensure!(max_depth > 0, "--max-depth must be at least 1");
        config.max_depth = max_depth;
    }
    if let Some(policy) = cli.empty_loop {
        config.empty_loop = policy;
    }
    Ok(config)
}

/// Parses one input and prints it. Returns `false` if it had errors.
fn run(
    cli: &Cli,
    config: &ParserConfig,
    name: &str,
    text: &str,
    out: &mut impl Write,
) -> anyhow::Result<bool> {
    let tokens = lex(text);
    let events = grammar_events(&tokens, text, cli.entry, config);
    let listing = (cli.output == OutputFormat::Events).then(|| render::events(&events));
    let parse = assemble(&tokens, text, events)
        .with_context(|| format!("malformed event log for {name}"))?;
    debug!(name, errors = parse.errors().len(), "parsed");

    let rendered = match cli.output {
        OutputFormat::Tree => render::tree(name, text, &parse),
        OutputFormat::Events => listing.unwrap_or_default(),
        OutputFormat::Errors => render::errors(name, text, parse.errors()),
    };
    out.write_all(rendered.as_bytes())
        .context("failed to write output")?;
    Ok(parse.ok())
}

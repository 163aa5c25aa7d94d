use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use deepgrep_core::{BudgetPolicy, CompiledPattern, Engine, EngineConfig, Match, OffsetMode};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Search text for lines matching a regular expression
#[derive(Parser)]
#[command(name = "deepgrep")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Pattern to search for
    pattern: String,

    /// Files to search (standard input when omitted)
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Use specific config file
    #[arg(short = 'C', long = "config", env = "DEEPGREP_CONFIG")]
    config: Option<PathBuf>,

    /// Maximum number of compiled patterns kept in the cache
    #[arg(long, value_name = "N")]
    cache_capacity: Option<usize>,

    /// Maximum steps allowed for a single match attempt
    #[arg(long, value_name = "N")]
    step_budget: Option<u64>,

    /// Report offsets relative to the line instead of the whole input
    #[arg(long)]
    line_offsets: bool,

    /// Stop with an error when a match attempt exhausts its step budget
    #[arg(long)]
    abort_on_budget: bool,

    /// Print only the number of matches per input
    #[arg(short, long)]
    count: bool,

    /// Print capture groups after each match
    #[arg(short, long)]
    groups: bool,

    /// Emit one JSON object per match
    #[arg(long, conflicts_with = "count")]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn engine_config(&self) -> anyhow::Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig::default(),
        };
        if let Some(capacity) = self.cache_capacity {
            config.cache_capacity = capacity;
        }
        if let Some(budget) = self.step_budget {
            config.step_budget = budget;
        }
        if self.line_offsets {
            config.offsets = OffsetMode::Line;
        }
        if self.abort_on_budget {
            config.on_budget_exceeded = BudgetPolicy::Abort;
        }
        Ok(config)
    }
}

#[derive(Serialize)]
struct JsonMatch<'a> {
    path: &'a str,
    #[serde(flatten)]
    found: &'a Match,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("deepgrep: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Returns whether anything matched.
fn run(cli: &Cli) -> anyhow::Result<bool> {
    let engine = Engine::new(cli.engine_config()?)?;
    let compiled = engine.compile(&cli.pattern)?;

    let mut inputs = Vec::new();
    if cli.files.is_empty() {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read standard input")?;
        inputs.push(("<stdin>".to_string(), text));
    }
    for path in &cli.files {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        inputs.push((path.display().to_string(), text));
    }

    let mut out = io::stdout().lock();
    let mut any = false;
    for (path, text) in &inputs {
        let found = engine.find_all(&compiled, text)?;
        tracing::debug!("{}: {} matches", path, found.len());
        any |= !found.is_empty();
        if cli.count {
            writeln!(out, "{path}:{}", found.len())?;
            continue;
        }
        for m in &found {
            if cli.json {
                let record = JsonMatch { path, found: m };
                writeln!(out, "{}", serde_json::to_string(&record)?)?;
            } else {
                print_match(&mut out, path, m, &compiled, cli.groups)?;
            }
        }
    }
    out.flush()?;
    Ok(any)
}

fn print_match(
    out: &mut impl Write,
    path: &str,
    m: &Match,
    compiled: &CompiledPattern,
    groups: bool,
) -> io::Result<()> {
    writeln!(out, "{path}:{}:{}", m.line + 1, m.text)?;
    if !groups {
        return Ok(());
    }
    for i in 1..=compiled.group_count() {
        let text = m.group(i).map(|c| c.text.as_str()).unwrap_or("");
        writeln!(out, "GROUP {i}:{text}")?;
    }
    Ok(())
}

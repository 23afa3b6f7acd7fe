//! Command-line front end for `jpatch-core`.
//!
//! In diff mode the binary prints the JSON Patch turning FILE1 into FILE2
//! and exits with status 1 when the documents differ. With `-p` it applies
//! the patch in FILE1 to the document in FILE2 and prints the result.

use std::fs;
use std::io::{self, IsTerminal, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use jpatch_core::{ArrayStrategy, DiffOptions, Patch, Value};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const EXIT_SAME: i32 = 0;
const EXIT_DIFFERENT: i32 = 1;
const EXIT_ERROR: i32 = 2;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
enum StrategyArg {
    #[default]
    Lcs,
    Replace,
}

impl From<StrategyArg> for ArrayStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Lcs => Self::Lcs,
            StrategyArg::Replace => Self::Replace,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "jpatch",
    version,
    about = "Diff JSON documents as RFC 6902 patches and apply them.",
    override_usage = "jpatch [OPTIONS] FILE1 [FILE2]\n       jpatch -p PATCH [DOC]"
)]
struct Cli {
    /// Apply the patch in FILE1 to FILE2 (or STDIN).
    #[arg(short = 'p', long = "patch")]
    patch: bool,

    /// Write output to FILE instead of STDOUT.
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Pretty-print JSON output.
    #[arg(long = "pretty")]
    pretty: bool,

    /// Precede every remove and replace with a test of the old value.
    #[arg(long = "test-guards")]
    test_guards: bool,

    /// How differing arrays are patched.
    #[arg(long = "array-strategy", value_enum, default_value_t = StrategyArg::Lcs)]
    array_strategy: StrategyArg,

    /// Skip array alignment when an array pair exceeds N compared elements.
    #[arg(long = "lcs-limit", value_name = "N")]
    lcs_limit: Option<usize>,

    /// Log line format on STDERR; verbosity comes from RUST_LOG.
    #[arg(long = "log-format", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// FILE1 [FILE2]
    #[arg(value_name = "FILE", required = true, num_args = 1..=2)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug)]
enum InputSource {
    File(PathBuf),
    Stdin,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format);
    match try_main(&cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            let _ = writeln!(io::stderr(), "jpatch: {err:#}");
            std::process::exit(EXIT_ERROR);
        }
    }
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let ansi = io::stderr().is_terminal();
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry.with(fmt::layer().with_writer(io::stderr).with_ansi(ansi)).init(),
        LogFormat::Json => registry.with(fmt::layer().json().with_writer(io::stderr)).init(),
    }
}

fn try_main(cli: &Cli) -> Result<i32> {
    let (first, second) = sources(&cli.inputs)?;
    if cli.patch {
        run_patch(cli, &first, &second)
    } else {
        run_diff(cli, &first, &second)
    }
}

fn sources(inputs: &[PathBuf]) -> Result<(InputSource, InputSource)> {
    match inputs {
        [first] => Ok((InputSource::File(first.clone()), InputSource::Stdin)),
        [first, second] => Ok((InputSource::File(first.clone()), InputSource::File(second.clone()))),
        _ => bail!("expected FILE1 and optionally FILE2"),
    }
}

fn run_diff(cli: &Cli, first: &InputSource, second: &InputSource) -> Result<i32> {
    let src = parse_value(&read_input(first)?).context("failed to parse first input")?;
    let dst = parse_value(&read_input(second)?).context("failed to parse second input")?;
    let options = build_options(cli)?;

    let patch = jpatch_core::diff_with_options(&src, &dst, &options);
    debug!(operations = patch.len(), "diff complete");
    let rendered = render(&patch, cli.pretty)?;
    write_output(cli, &rendered)?;
    Ok(if patch.is_empty() { EXIT_SAME } else { EXIT_DIFFERENT })
}

fn run_patch(cli: &Cli, first: &InputSource, second: &InputSource) -> Result<i32> {
    let patch = Patch::from_json_str(&read_input(first)?).context("failed to parse patch")?;
    let doc = parse_value(&read_input(second)?).context("failed to parse document")?;

    let patched = patch.apply(&doc).context("failed to apply patch")?;
    let rendered = render(&patched, cli.pretty)?;
    write_output(cli, &rendered)?;
    Ok(EXIT_SAME)
}

fn build_options(cli: &Cli) -> Result<DiffOptions> {
    let mut options = DiffOptions::default()
        .with_array_strategy(cli.array_strategy.into())?
        .with_test_guards(cli.test_guards);
    if let Some(limit) = cli.lcs_limit {
        options = options.with_lcs_cell_limit(limit).context("invalid --lcs-limit")?;
    }
    Ok(options)
}

fn read_input(source: &InputSource) -> Result<String> {
    match source {
        InputSource::File(path) => {
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
        }
        InputSource::Stdin => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).context("failed to read STDIN")?;
            Ok(buffer)
        }
    }
}

fn parse_value(input: &str) -> Result<Value> {
    Ok(Value::from_json_str(input)?)
}

fn render<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let mut rendered =
        if pretty { serde_json::to_string_pretty(value)? } else { serde_json::to_string(value)? };
    rendered.push('\n');
    Ok(rendered)
}

fn write_output(cli: &Cli, rendered: &str) -> Result<()> {
    if let Some(path) = &cli.output {
        fs::write(path, rendered.as_bytes())
            .with_context(|| format!("failed to write output to {}", path.display()))?;
    } else {
        let mut stdout = io::stdout().lock();
        stdout.write_all(rendered.as_bytes())?;
        stdout.flush()?;
    }
    Ok(())
}

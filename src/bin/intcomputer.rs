// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Run an Intcode program from a file, or brute-force its noun and verb

use std::fs::read_to_string;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use itertools::Itertools;
use tracing_subscriber::EnvFilter;

use intcomputer::parse::parse_program;
use intcomputer::search::find_noun_verb;
use intcomputer::{Interpreter, RunConfig};

const VERSION: &str = concat!(env!("CARGO_CRATE_NAME"), '-', env!("CARGO_PKG_VERSION"));

#[derive(Parser)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_version = VERSION)]
#[command(about = "Bounded Intcode interpreter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the program once, printing its outputs and slot 0
    Run(RunArgs),
    /// Find the noun and verb which leave a target value in slot 0
    Search(SearchArgs),
}

#[derive(Args)]
struct Common {
    #[arg(help = "File containing comma-separated intcode")]
    source: PathBuf,
    #[arg(long = "max-steps")]
    #[arg(help = "Abort any run after this many instructions")]
    max_steps: Option<u64>,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    common: Common,
    #[arg(short, long = "input", allow_negative_numbers = true)]
    #[arg(help = "Value to feed to IN instructions, in order; may be repeated")]
    inputs: Vec<i64>,
    #[arg(long, allow_negative_numbers = true)]
    #[arg(help = "Value written to slot 1 before running")]
    noun: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    #[arg(help = "Value written to slot 2 before running")]
    verb: Option<i64>,
    #[arg(long)]
    #[arg(help = "Print each executed instruction to stderr")]
    trace: bool,
}

#[derive(Args)]
struct SearchArgs {
    #[command(flatten)]
    common: Common,
    #[arg(short, long, allow_negative_numbers = true)]
    #[arg(help = "Value slot 0 must hold once the program halts")]
    target: i64,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    min: i64,
    #[arg(long, default_value_t = 99, allow_negative_numbers = true)]
    max: i64,
    #[arg(short, long)]
    #[arg(help = "Number of worker threads [default: available parallelism]")]
    workers: Option<NonZeroUsize>,
}

fn load(path: &Path, config: &RunConfig) -> anyhow::Result<Interpreter> {
    let src =
        read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let code = parse_program(&src).with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(Interpreter::from_config(code, config))
}

fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = RunConfig {
        max_steps: args.common.max_steps,
        trace: args.trace,
    };
    let mut interp = load(&args.common.source, &config)?;
    for (slot, value) in [(1, args.noun), (2, args.verb)] {
        if let Some(value) = value {
            if interp.mem_override(slot, value).is_none() {
                bail!("program is too short to write slot {slot}");
            }
        }
    }

    let result = interp.run_collecting(args.inputs);
    if let Some(trace) = interp.end_trace() {
        for instr in trace.0 {
            eprintln!("{instr}");
        }
    }
    let outputs = match result {
        Ok(outputs) => outputs,
        Err((fault, outputs)) => {
            if !outputs.is_empty() {
                println!("{}", outputs.iter().join("\n"));
            }
            return Err(fault).context("program faulted");
        }
    };
    if !outputs.is_empty() {
        println!("{}", outputs.iter().join("\n"));
    }
    if let Some(slot0) = interp.mem_get(0) {
        println!("slot 0: {slot0}");
    }
    Ok(())
}

fn search(args: SearchArgs) -> anyhow::Result<()> {
    let config = RunConfig {
        max_steps: args.common.max_steps,
        trace: false,
    };
    let template = load(&args.common.source, &config)?;
    let workers = args
        .workers
        .or_else(|| thread::available_parallelism().ok())
        .unwrap_or(NonZeroUsize::MIN);
    let found = find_noun_verb(&template, args.target, args.min..=args.max, workers)
        .context("search aborted")?;
    let Some((noun, verb)) = found else {
        bail!(
            "no noun and verb in {}..={} produce {}",
            args.min,
            args.max,
            args.target
        );
    };
    println!("noun={noun} verb={verb} answer={}", 100 * noun + verb);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Run(args) => run(args),
        Command::Search(args) => search(args),
    }
}

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::{fs, io};
use tapemachine::{
    to_csv, to_json, word_program, HaltReason, Program, ProgramLoader, StepRecord, TapeAutomaton,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Number of trace rows shown in the preview.
const PREVIEW_ROWS: usize = 10;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Csv,
    Json,
}

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  tape-cli --word MATEO --output trace.csv
  tape-cli --program write-a.json --format json --output trace.json
  tape-cli --dir programs/ --output traces/
  cat write-a.json | tape-cli")]
struct Cli {
    /// The program file (.json) to execute
    #[clap(short, long, conflicts_with_all = ["word", "dir"])]
    program: Option<PathBuf>,

    /// Generate a program that writes this word on a blank tape
    #[clap(short, long, conflicts_with = "dir")]
    word: Option<String>,

    /// Run every program (.json) in this directory; --output names a directory
    #[clap(long)]
    dir: Option<PathBuf>,

    /// Maximum number of steps, overrides the program's own bound
    #[clap(short, long)]
    max_steps: Option<usize>,

    /// Cells rendered on each side of the written range in the trace
    #[clap(long)]
    padding: Option<usize>,

    /// Write the trace to this file (or directory with --dir)
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Trace file format
    #[clap(short, long, value_enum, default_value = "csv")]
    format: Format,

    /// Print each step of the execution
    #[clap(short = 'd', long)]
    debug: bool,

    /// Enable debug logging
    #[clap(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[clap(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    if let Some(dir) = &cli.dir {
        return run_directory(&cli, dir);
    }

    let program = load_program(&cli)?;
    let max_steps = cli.max_steps.unwrap_or(program.max_steps);
    let padding = cli.padding.unwrap_or(program.padding);

    info!(name = %program.name, rules = program.rules.len(), max_steps, "Loaded program");

    let mut machine = TapeAutomaton::from_program(&program)
        .with_context(|| format!("Program '{}' is malformed", program.name))?
        .with_padding(padding);

    let records = if cli.debug {
        run_verbose(&mut machine, max_steps)
    } else {
        machine.run(max_steps)
    };

    if let Some(path) = &cli.output {
        save_trace(path, cli.format, &records)?;
        println!("Trace saved to: {}", path.display());
    }

    if !cli.debug {
        print_preview(&program.name, &records);
    }

    println!("\nFinal tape:");
    println!("{}", machine.snapshot(0));
    println!("\nFinal text:");
    println!("{}", machine.text());
    println!("\n{}", outcome(&machine, max_steps));

    Ok(())
}

/// Runs each program in `dir` and prints one summary line per program.
fn run_directory(cli: &Cli, dir: &Path) -> Result<()> {
    let programs = ProgramLoader::load_programs(dir)?;

    if let Some(out_dir) = &cli.output {
        fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    }

    let mut failed = 0;
    for (path, program) in programs {
        let loaded = program.and_then(|p| TapeAutomaton::from_program(&p).map(|m| (p, m)));
        let (program, machine) = match loaded {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping program");
                println!("{}: {}", path.display(), e);
                failed += 1;
                continue;
            }
        };

        let max_steps = cli.max_steps.unwrap_or(program.max_steps);
        let mut machine = machine.with_padding(cli.padding.unwrap_or(program.padding));
        let records = machine.run(max_steps);

        if let Some(out_dir) = &cli.output {
            let extension = match cli.format {
                Format::Csv => "csv",
                Format::Json => "json",
            };
            let stem = path.file_stem().unwrap_or_default();
            let trace_path = out_dir.join(stem).with_extension(extension);
            save_trace(&trace_path, cli.format, &records)?;
        }

        println!(
            "{}: '{}' {}",
            program.name,
            machine.text(),
            outcome(&machine, max_steps)
        );
    }

    if failed > 0 {
        bail!("{failed} program(s) in {} could not be loaded", dir.display());
    }

    Ok(())
}

/// Describes how a run ended.
fn outcome(machine: &TapeAutomaton, max_steps: usize) -> String {
    match machine.halt_reason() {
        Some(HaltReason::Accepted) => format!(
            "Halted in state {} after {} steps.",
            machine.state(),
            machine.step_count()
        ),
        Some(HaltReason::NoTransition) => format!(
            "Halted after {} steps: no transition defined.",
            machine.step_count()
        ),
        None => {
            warn!(max_steps, state = %machine.state(), "Step limit reached before halting");
            format!("Stopped at the step limit ({max_steps}) without halting.")
        }
    }
}

/// Loads the program from a file, a word, or stdin, in that order.
fn load_program(cli: &Cli) -> Result<Program> {
    if let Some(path) = &cli.program {
        return Ok(ProgramLoader::load_program(path)?);
    }

    if let Some(word) = &cli.word {
        return Ok(word_program(word)?);
    }

    if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        return Ok(ProgramLoader::load_program_from_string(&buffer)?);
    }

    bail!("No program given: use --program, --word, or pipe a program on stdin")
}

/// Steps the machine one transition at a time, printing each record.
fn run_verbose(machine: &mut TapeAutomaton, max_steps: usize) -> Vec<StepRecord> {
    println!("Step: 0, State: {}, Tape: {}", machine.state(), machine.snapshot(2));

    if !machine.is_halted() {
        for _ in 0..max_steps {
            let step = machine.step();
            if let Some(record) = machine.history().last() {
                println!(
                    "Step: {}, State: {} -> {}, Head: {}, Tape: {}",
                    record.step,
                    record.state_before,
                    record.state_after,
                    record.head_after,
                    record.tape
                );
            }

            if step.is_halt() {
                break;
            }
        }
    }

    machine.history().to_vec()
}

fn save_trace(path: &Path, format: Format, records: &[StepRecord]) -> Result<()> {
    let content = match format {
        Format::Csv => to_csv(records),
        Format::Json => to_json(records)?,
    };

    fs::write(path, content)
        .with_context(|| format!("Failed to write trace to {}", path.display()))
}

fn print_preview(name: &str, records: &[StepRecord]) {
    let shown = records.len().min(PREVIEW_ROWS);
    let csv = to_csv(&records[..shown]);

    println!("\n{name} ({} steps)", records.len());
    for line in csv.lines() {
        println!("{line}");
    }
}

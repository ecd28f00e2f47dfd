//! CLI tool to run dated-line pipelines against input data.
//!
//! Usage:
//!   datepipe <input> [-d Monday,Friday] [-i FMT] [-f FMT] [-o output]
//!   datepipe <input> -p <pipeline.pipe> [-o output]
//!
//! Input may be `-` for stdin. If no output file is specified, writes to stdout.

use clap::Parser;
use datepipe::{DEFAULT_INPUT_PATTERN, DEFAULT_OUTPUT_PATTERN, Pipeline, build_pipeline, run_traced};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

/// Extract dated lines, keep the allowed weekdays, and reformat the dates.
#[derive(Parser)]
#[command(name = "datepipe")]
struct Cli {
    /// Input file of "<date>: <text>" lines, or - for stdin
    input: String,

    /// Pipeline definition file (.pipe); overrides the format and day flags
    #[arg(short, long)]
    pipeline: Option<String>,

    /// Date pattern of the input lines (strftime syntax)
    #[arg(short, long, default_value = DEFAULT_INPUT_PATTERN)]
    input_format: String,

    /// Weekdays to keep, comma separated (e.g. Monday,Friday); keeps all if omitted
    #[arg(short, long, value_delimiter = ',')]
    days: Vec<String>,

    /// Date pattern of the output lines (strftime syntax)
    #[arg(short = 'f', long, default_value = DEFAULT_OUTPUT_PATTERN)]
    output_format: String,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Show record counts and per-stage trace on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

fn read_input(path: &str) -> io::Result<String> {
    if path == "-" {
        io::read_to_string(io::stdin())
    } else {
        fs::read_to_string(path)
    }
}

/// Write the rendered lines to `path`, or to stdout with a trailing newline.
fn write_output(path: Option<&str>, output: &str) -> Result<(), String> {
    let Some(path) = path else {
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(output.as_bytes())
            .and_then(|()| {
                if output.is_empty() || output.ends_with('\n') {
                    Ok(())
                } else {
                    stdout.write_all(b"\n")
                }
            })
            .map_err(|e| format!("Error writing output: {e}"))?;
        return Ok(());
    };

    let parent = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(dir) = parent {
        fs::create_dir_all(dir)
            .map_err(|e| format!("Error creating output directory for '{path}': {e}"))?;
    }
    fs::write(path, output).map_err(|e| format!("Error writing output file '{path}': {e}"))
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let pipeline = match &cli.pipeline {
        Some(pipe_file) => {
            let pipeline_text = match fs::read_to_string(pipe_file) {
                Ok(content) => content,
                Err(e) => {
                    eprintln!("Error reading pipeline file '{pipe_file}': {e}");
                    process::exit(1);
                }
            };
            build_pipeline(&pipeline_text)
        }
        None => Pipeline::standard(&cli.input_format, cli.days.clone(), &cli.output_format),
    };
    let pipeline = match pipeline {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Pipeline error: {e}");
            process::exit(1);
        }
    };

    let input_text = match read_input(&cli.input) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading input file '{}': {e}", cli.input);
            process::exit(1);
        }
    };

    if cli.verbose {
        eprintln!("Pipeline: {}", cli.pipeline.as_deref().unwrap_or("(flags)"));
        eprintln!("Stages:   {}", pipeline.stage_names().join(" | "));
        eprintln!("Input:    {}", cli.input);
        eprintln!("Output:   {}", cli.output.as_deref().unwrap_or("(stdout)"));
    }

    match run_traced(&pipeline, &input_text) {
        Ok((output, input_count, output_count, traces)) => {
            if let Err(e) = write_output(cli.output.as_deref(), &output) {
                eprintln!("{e}");
                process::exit(1);
            }
            if cli.verbose {
                for trace in &traces {
                    eprintln!(
                        "  {:<8} {} -> {}",
                        trace.stage_name, trace.input_count, trace.output_count
                    );
                }
                eprintln!("Records:  {input_count} in -> {output_count} out");
            }
        }
        Err(e) => {
            eprintln!("Pipeline error: {e}");
            process::exit(1);
        }
    }
}

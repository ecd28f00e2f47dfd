//! DSL parser and executor for pipeline definitions.
//!
//! Pipeline format (CMS Pipelines style):
//! ```text
//! PIPE EXTRACT "%Y-%m-%d"
//! | WEEKDAY Monday Friday
//! | FORMAT "%B %d, %Y"
//! ?
//! ```
//!
//! - `PIPE <stage>` starts the pipeline
//! - `| <stage>` continues to the next stage
//! - `?` on its own line marks end of pipeline
//! - Lines starting with `#` are comments
//!
//! Supported stages:
//! - `EXTRACT` / `EXTRACT "pattern"` - Parse `"<date>: <text>"` lines into records
//! - `WEEKDAY day [day ...]` - Keep records on the named days (comma or space separated)
//! - `FORMAT` / `FORMAT "pattern"` - Render records as `"<date>: <text>"`
//!
//! Patterns use CMS delimited strings: the first non-blank character is the
//! delimiter, so `EXTRACT /%Y-%m-%d/` and `EXTRACT "%Y-%m-%d"` are the same.

use crate::error::{PipelineError, Result};
use crate::pipeline::{Pipeline, StageTrace};
use crate::record::Batch;
use crate::stage::{
    DEFAULT_INPUT_PATTERN, DEFAULT_OUTPUT_PATTERN, DELIMITER, DateExtractor, DateFormatter, Stage,
    WeekdayFilter,
};

/// Parsed pipeline command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// EXTRACT "pattern"
    Extract { pattern: String },
    /// WEEKDAY day [day ...]
    Weekday { days: Vec<String> },
    /// FORMAT "pattern"
    Format { pattern: String },
}

impl Command {
    /// Get the stage name for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Extract { .. } => "EXTRACT",
            Command::Weekday { .. } => "WEEKDAY",
            Command::Format { .. } => "FORMAT",
        }
    }
}

/// Parse DSL text into commands.
pub fn parse_commands(text: &str) -> Result<Vec<Command>> {
    let mut commands = Vec::new();

    for (line_num, line) in text.lines().enumerate() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (first_word, after_first) = split_keyword(line);
        let line = if first_word.eq_ignore_ascii_case("PIPE") {
            after_first
        } else {
            line
        };

        let line = match line.strip_prefix('|') {
            Some(stripped) => stripped.trim(),
            None => line,
        };

        // Trailing pipe delimiter and end-of-pipeline marker
        let line = line.trim_end_matches('|').trim();
        let line = line.trim_end_matches('?').trim();

        if line.is_empty() {
            continue;
        }

        let cmd = parse_command(line).map_err(|message| PipelineError::Parse {
            line: line_num + 1,
            message,
        })?;
        commands.push(cmd);
    }

    Ok(commands)
}

/// Split off the leading keyword; the rest is trimmed.
fn split_keyword(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (line, ""),
    }
}

/// Parse a single command line.
fn parse_command(line: &str) -> std::result::Result<Command, String> {
    let (keyword, rest) = split_keyword(line);

    match keyword.to_ascii_uppercase().as_str() {
        "EXTRACT" => Ok(Command::Extract {
            pattern: parse_optional_pattern(rest, DEFAULT_INPUT_PATTERN)?,
        }),
        "WEEKDAY" => parse_weekday(rest),
        "FORMAT" => Ok(Command::Format {
            pattern: parse_optional_pattern(rest, DEFAULT_OUTPUT_PATTERN)?,
        }),
        _ => Err(format!("Unknown command: {keyword}")),
    }
}

/// Parse a delimited string using CMS Pipelines convention.
/// The first non-blank character is the delimiter, and the string
/// continues until the next occurrence of that delimiter.
/// Returns (extracted_string, rest_of_input).
fn parse_delimited_string(s: &str) -> std::result::Result<(String, &str), String> {
    let s = s.trim_start();
    let Some(delim) = s.chars().next() else {
        return Err("Expected delimited string".to_string());
    };
    let after_delim = &s[delim.len_utf8()..];

    match after_delim.find(delim) {
        Some(end) => Ok((
            after_delim[..end].to_string(),
            &after_delim[end + delim.len_utf8()..],
        )),
        None => Err(format!("Unclosed delimiter '{delim}'")),
    }
}

fn parse_optional_pattern(rest: &str, default: &str) -> std::result::Result<String, String> {
    if rest.is_empty() {
        return Ok(default.to_string());
    }
    let (pattern, trailing) = parse_delimited_string(rest)?;
    if !trailing.trim().is_empty() {
        return Err(format!("Unexpected text after pattern: {}", trailing.trim()));
    }
    if pattern.is_empty() {
        return Err("Pattern must not be empty".to_string());
    }
    Ok(pattern)
}

/// Parse WEEKDAY command.
/// Format: WEEKDAY Monday Friday or WEEKDAY Monday,Friday
fn parse_weekday(rest: &str) -> std::result::Result<Command, String> {
    let days: Vec<String> = rest
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|day| !day.is_empty())
        .map(str::to_string)
        .collect();
    if days.is_empty() {
        return Err("WEEKDAY requires at least one day name".to_string());
    }
    Ok(Command::Weekday { days })
}

/// Create a `Stage` from a parsed `Command`.
pub fn command_to_stage(cmd: &Command) -> Result<Box<dyn Stage>> {
    let stage: Box<dyn Stage> = match cmd {
        Command::Extract { pattern } => Box::new(DateExtractor::new(pattern.as_str())?),
        Command::Weekday { days } => Box::new(WeekdayFilter::new(days.iter().cloned())),
        Command::Format { pattern } => Box::new(DateFormatter::new(pattern.as_str())?),
    };
    Ok(stage)
}

/// Parse DSL text and build the pipeline it describes.
pub fn build_pipeline(pipeline_text: &str) -> Result<Pipeline> {
    let commands = parse_commands(pipeline_text)?;
    if commands.is_empty() {
        return Err(PipelineError::EmptyPipeline);
    }
    let stages = commands
        .iter()
        .map(command_to_stage)
        .collect::<Result<Vec<_>>>()?;
    Ok(Pipeline::new(stages))
}

/// Execute a pipeline defined by DSL text on input lines.
///
/// Returns (output_text, input_count, output_count) on success.
pub fn execute_pipeline(input_text: &str, pipeline_text: &str) -> Result<(String, usize, usize)> {
    let (output, input_count, output_count, _) = execute_pipeline_debug(input_text, pipeline_text)?;
    Ok((output, input_count, output_count))
}

/// Execute a pipeline defined by DSL text, also returning per-stage counts.
///
/// Returns (output_text, input_count, output_count, traces) on success.
pub fn execute_pipeline_debug(
    input_text: &str,
    pipeline_text: &str,
) -> Result<(String, usize, usize, Vec<StageTrace>)> {
    let pipeline = build_pipeline(pipeline_text)?;
    run_traced(&pipeline, input_text)
}

/// Run an already-built pipeline over the non-empty lines of `input_text`.
///
/// Returns (output_text, input_count, output_count, traces) on success.
pub fn run_traced(
    pipeline: &Pipeline,
    input_text: &str,
) -> Result<(String, usize, usize, Vec<StageTrace>)> {
    let input = Batch::from_text(input_text);
    let input_count = input.len();

    let (output, traces) = pipeline.process_traced(input)?;
    let output_count = output.len();

    Ok((render_batch(&output), input_count, output_count, traces))
}

/// Join a batch into output text, one entry per line.
///
/// Records that never reached a FORMAT stage are shown with their full
/// date-time.
fn render_batch(batch: &Batch) -> String {
    match batch {
        Batch::Lines(lines) => lines.join("\n"),
        Batch::Records(records) => records
            .iter()
            .map(|r| format!("{}{DELIMITER}{}", r.date.format("%Y-%m-%d %H:%M:%S"), r.text))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

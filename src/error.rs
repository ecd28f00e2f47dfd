//! Error types for pipeline construction and execution.

use thiserror::Error;

use crate::record::BatchKind;

/// Errors raised while building or running a pipeline.
///
/// Malformed input lines are not errors: the extractor skips them.
/// Everything here aborts the whole invocation.
#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
    /// A stage was handed a batch it cannot process.
    #[error("{stage} expects {expected} but received {found}")]
    UnexpectedInput {
        stage: String,
        expected: BatchKind,
        found: BatchKind,
    },

    /// A strftime pattern contains an unknown or malformed specifier.
    #[error("invalid date pattern '{pattern}'")]
    InvalidPattern { pattern: String },

    /// A valid pattern could not be rendered for a record's date.
    #[error("cannot format {date} with pattern '{pattern}'")]
    Format { pattern: String, date: String },

    /// The pipeline definition text could not be parsed.
    #[error("Line {line}: {message}")]
    Parse { line: usize, message: String },

    /// The pipeline definition contains no stages.
    #[error("Pipeline is empty")]
    EmptyPipeline,
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_input_message() {
        let err = PipelineError::UnexpectedInput {
            stage: "FORMAT".to_string(),
            expected: BatchKind::Records,
            found: BatchKind::Lines,
        };
        assert_eq!(err.to_string(), "FORMAT expects records but received lines");
    }

    #[test]
    fn test_parse_message_has_line_number() {
        let err = PipelineError::Parse {
            line: 3,
            message: "Unknown command: SORT".to_string(),
        };
        assert_eq!(err.to_string(), "Line 3: Unknown command: SORT");
    }
}

//! # datepipe
//!
//! A small batch pipeline for dated text lines.
//!
//! ## Overview
//!
//! Input lines look like `"<date>: <text>"`. Three stages work on them:
//! - **EXTRACT** ([`DateExtractor`]): parse lines into [`Record`]s, skipping
//!   lines that do not have a parsable date
//! - **WEEKDAY** ([`WeekdayFilter`]): keep records falling on allowed days
//! - **FORMAT** ([`DateFormatter`]): render records back into strings
//!
//! A [`Pipeline`] runs stages in order, each one consuming the whole
//! [`Batch`] produced by the previous one.
//!
//! ## Example
//!
//! ```
//! use datepipe::{Batch, DateExtractor, DateFormatter, Pipeline, WeekdayFilter};
//!
//! let pipeline = Pipeline::default()
//!     .stage(DateExtractor::default())
//!     .stage(WeekdayFilter::new(["Tuesday"]))
//!     .stage(DateFormatter::default());
//!
//! let output = pipeline
//!     .process(Batch::from(vec!["2024-10-15: Event 1", "2024-10-16: Event 2"]))
//!     .unwrap();
//!
//! assert_eq!(output, Batch::from(vec!["October 15, 2024: Event 1"]));
//! ```

pub mod dsl;
pub mod error;
pub mod pipeline;
pub mod record;
pub mod stage;

pub use dsl::{
    Command, build_pipeline, command_to_stage, execute_pipeline, execute_pipeline_debug,
    parse_commands, run_traced,
};
pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, StageTrace};
pub use record::{Batch, BatchKind, Record};
pub use stage::{
    DEFAULT_INPUT_PATTERN, DEFAULT_OUTPUT_PATTERN, DELIMITER, DateExtractor, DateFormatter, Stage,
    WEEKDAY_NAMES, WeekdayFilter,
};

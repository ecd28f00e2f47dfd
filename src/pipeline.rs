//! Batch pipeline: an ordered list of stages run one after another.
//!
//! Each stage receives the previous stage's entire output and finishes
//! before the next one starts. Nothing checks that adjacent stages fit
//! together up front; a mismatched stage fails when it runs, and the error
//! aborts the whole run.

use tracing::debug;

use crate::error::Result;
use crate::record::Batch;
use crate::stage::{DateExtractor, DateFormatter, Stage, WeekdayFilter};

/// Per-stage record counts captured by [`Pipeline::process_traced`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTrace {
    pub stage_name: String,
    pub input_count: usize,
    pub output_count: usize,
}

/// An owned, ordered sequence of stages.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// Assemble the usual extract → weekday → format chain.
    ///
    /// An empty `days` list leaves out the weekday stage entirely.
    pub fn standard<S: Into<String>>(
        input_pattern: &str,
        days: Vec<S>,
        output_pattern: &str,
    ) -> Result<Self> {
        let mut pipeline = Self::default().stage(DateExtractor::new(input_pattern)?);
        if !days.is_empty() {
            pipeline = pipeline.stage(WeekdayFilter::new(days));
        }
        Ok(pipeline.stage(DateFormatter::new(output_pattern)?))
    }

    /// Append a stage.
    pub fn stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run `input` through every stage in order.
    ///
    /// With no stages the input is returned unchanged.
    pub fn process(&self, input: Batch) -> Result<Batch> {
        let mut current = input;
        for stage in &self.stages {
            current = stage.process(current)?;
        }
        Ok(current)
    }

    /// Like [`process`](Self::process), also reporting counts per stage.
    pub fn process_traced(&self, input: Batch) -> Result<(Batch, Vec<StageTrace>)> {
        let mut traces = Vec::with_capacity(self.stages.len());
        let mut current = input;

        for stage in &self.stages {
            let input_count = current.len();
            current = stage.process(current)?;
            let output_count = current.len();
            debug!(stage = stage.name(), input_count, output_count, "stage complete");
            traces.push(StageTrace {
                stage_name: stage.name().to_string(),
                input_count,
                output_count,
            });
        }

        Ok((current, traces))
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

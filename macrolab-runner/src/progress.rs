//! Progress reporting for pipeline runs.

use std::error::Error;

use crate::pipeline::PipelineError;

/// A pipeline step, numbered as printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Extract,
    Transform,
}

impl Step {
    pub fn number(self) -> u8 {
        match self {
            Step::Extract => 1,
            Step::Transform => 2,
        }
    }
}

/// Progress callback for pipeline runs.
pub trait PipelineProgress {
    /// Called once before any step, with the banner title and context lines
    /// (period, ticker).
    fn on_pipeline_start(&self, title: &str, details: &[String]);

    fn on_step_start(&self, step: Step);

    /// Called instead of `on_step_start` when a step is skipped.
    fn on_step_skipped(&self, step: Step);

    /// Called when a step succeeds, with the number of records it produced.
    fn on_step_complete(&self, step: Step, records: usize);

    fn on_step_failed(&self, step: Step, error: &PipelineError);

    /// Called only when every step succeeded.
    fn on_pipeline_complete(&self, title: &str);

    /// Called when a run fails outside any step (options, window, date range).
    fn on_pipeline_failed(&self, title: &str, error: &PipelineError);
}

/// `error` followed by each of its sources, joined with `": "`.
pub fn error_chain(error: &dyn Error) -> String {
    let mut out = error.to_string();
    let mut source = error.source();
    while let Some(e) = source {
        out.push_str(": ");
        out.push_str(&e.to_string());
        source = e.source();
    }
    out
}

/// Progress reporter that prints to stdout.
pub struct StdoutProgress;

impl StdoutProgress {
    fn banner(text: &str, width: usize) {
        let rule = "=".repeat(width);
        println!("{rule}");
        println!("   {text}");
        println!("{rule}");
    }

    fn width(title: &str) -> usize {
        title.len() + 6
    }
}

impl PipelineProgress for StdoutProgress {
    fn on_pipeline_start(&self, title: &str, details: &[String]) {
        Self::banner(title, Self::width(title));
        for line in details {
            println!("{line}");
        }
    }

    fn on_step_start(&self, step: Step) {
        let action = match step {
            Step::Extract => "Extracting data...",
            Step::Transform => "Transforming data...",
        };
        println!("\nStep {}: {action}", step.number());
    }

    fn on_step_skipped(&self, step: Step) {
        let action = match step {
            Step::Extract => "Skipping extraction",
            Step::Transform => "Skipping transformation",
        };
        println!("\nStep {}: {action}", step.number());
    }

    fn on_step_complete(&self, step: Step, records: usize) {
        match step {
            Step::Extract => println!("  Extracted {records} records"),
            Step::Transform => println!("  Processed {records} records"),
        }
    }

    fn on_step_failed(&self, step: Step, error: &PipelineError) {
        match step {
            Step::Extract => println!("  Extraction failed: {}", error_chain(error)),
            Step::Transform => println!("  Transformation failed: {}", error_chain(error)),
        }
    }

    fn on_pipeline_complete(&self, title: &str) {
        println!();
        Self::banner("Pipeline Complete", Self::width(title));
    }

    fn on_pipeline_failed(&self, _title: &str, error: &PipelineError) {
        println!("  Pipeline failed: {}", error_chain(error));
    }
}

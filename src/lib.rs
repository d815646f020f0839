pub mod core;
pub mod dataset;
pub mod export;
pub mod metrics;
pub mod ocr;
pub mod pipeline;

pub use crate::core::errors::BenchError;
pub use crate::core::model::{EngineSummary, EvaluationRow, ResultTable};
pub use pipeline::{run_benchmark, BenchReport, PipelineConfig};

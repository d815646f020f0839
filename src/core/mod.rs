pub mod errors;
pub mod model;

pub use errors::BenchError;
pub use model::{EngineSummary, EvaluationRow, ResultTable};

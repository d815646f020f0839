use thiserror::Error;

/// Configuration failures that abort a benchmark before any image is read.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BenchError {
    #[error("unknown OCR engine '{key}' (known engines: {known})")]
    UnknownEngine { key: String, known: String },

    #[error("no OCR engines configured")]
    NoEngines,
}

impl BenchError {
    pub fn unknown_engine<S: AsRef<str>>(key: &str, known: &[S]) -> Self {
        BenchError::UnknownEngine {
            key: key.to_string(),
            known: known.iter().map(|k| k.as_ref()).collect::<Vec<_>>().join(", "),
        }
    }
}

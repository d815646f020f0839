use std::fmt;
use std::str::FromStr;

use crate::core::errors::BenchError;

/// The OCR engines the benchmark knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    EasyOcr,
    Doctr,
    Donut,
    Smol,
}

const DONUT_MODEL: &str = "naver-clova-ix/donut-base-finetuned-cord-v2";
const SMOL_MODEL: &str = "ds4sd/SmolDocling-256M-preview";

impl EngineKind {
    pub const ALL: [EngineKind; 4] = [
        EngineKind::EasyOcr,
        EngineKind::Doctr,
        EngineKind::Donut,
        EngineKind::Smol,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            EngineKind::EasyOcr => "easyocr",
            EngineKind::Doctr => "doctr",
            EngineKind::Donut => "donut",
            EngineKind::Smol => "smol",
        }
    }

    pub fn default_keys() -> Vec<String> {
        Self::ALL.iter().map(|kind| kind.key().to_string()).collect()
    }

    /// Engine-specific arguments for the bridge worker.
    pub fn bridge_args(&self) -> Vec<String> {
        let args: &[&str] = match self {
            EngineKind::EasyOcr => &["--lang", "en"],
            EngineKind::Doctr => &[],
            EngineKind::Donut => &["--model", DONUT_MODEL, "--max-length", "1024"],
            EngineKind::Smol => &["--model", SMOL_MODEL, "--max-new-tokens", "256"],
        };
        args.iter().map(|s| s.to_string()).collect()
    }

    /// Turns a bridge reply into the engine's final text.
    pub fn decode(&self, text: Option<String>, segments: Option<Vec<String>>) -> Option<String> {
        match self {
            // detector output arrives as separate boxes
            EngineKind::EasyOcr => segments
                .map(|parts| parts.join(" "))
                .or(text),
            EngineKind::Doctr => text
                .or_else(|| segments.map(|parts| parts.join(" ")))
                .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" ")),
            EngineKind::Donut | EngineKind::Smol => text,
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for EngineKind {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EngineKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.key() == s)
            .ok_or_else(|| BenchError::unknown_engine(s, &EngineKind::default_keys()))
    }
}

pub mod bridge;
pub mod engines;
pub mod registry;

use anyhow::Result;
use log::debug;
use std::path::Path;

pub use bridge::{BridgeConfig, BridgeStrategy, Device};
pub use engines::EngineKind;
pub use registry::StrategyRegistry;

/// Result of asking a strategy for the text of one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OcrOutcome {
    Recognized(String),
    Failed(String),
}

impl OcrOutcome {
    /// Recognized text, or the empty string on failure.
    pub fn text(&self) -> &str {
        match self {
            OcrOutcome::Recognized(text) => text,
            OcrOutcome::Failed(_) => "",
        }
    }

    pub fn recognized(&self) -> Option<&str> {
        match self {
            OcrOutcome::Recognized(text) => Some(text),
            OcrOutcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            OcrOutcome::Recognized(_) => None,
            OcrOutcome::Failed(reason) => Some(reason),
        }
    }
}

/// An OCR engine that owns its (expensive) model state.
///
/// `Idle -> Loaded` happens on the first `run`; the harness calls `unload`
/// once it is finished with the engine.
pub trait OcrStrategy {
    fn key(&self) -> &str;

    fn load(&mut self) -> Result<()>;

    fn is_loaded(&self) -> bool;

    fn recognize(&mut self, image: &Path) -> Result<String>;

    /// Drops the model state. Calling it on an idle strategy is a no-op.
    fn unload(&mut self);

    fn run(&mut self, image: &Path) -> OcrOutcome {
        if !self.is_loaded() {
            debug!("{}: loading model", self.key());
            if let Err(err) = self.load() {
                return OcrOutcome::Failed(format!("failed to load model: {err:#}"));
            }
        }
        match self.recognize(image) {
            Ok(text) => OcrOutcome::Recognized(text),
            Err(err) => OcrOutcome::Failed(format!("{err:#}")),
        }
    }
}

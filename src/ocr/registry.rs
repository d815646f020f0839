use crate::core::errors::BenchError;
use crate::ocr::bridge::{BridgeConfig, BridgeStrategy};
use crate::ocr::engines::EngineKind;
use crate::ocr::OcrStrategy;

/// Lookup table from engine key to strategy, in registration order.
#[derive(Default)]
pub struct StrategyRegistry {
    strategies: Vec<Box<dyn OcrStrategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// One bridge-backed strategy per requested engine key. Nothing is
    /// spawned here; workers start on first use.
    pub fn for_engines(keys: &[String], config: &BridgeConfig) -> Result<Self, BenchError> {
        let mut registry = Self::new();
        for key in keys {
            let kind: EngineKind = key.parse()?;
            registry.register(Box::new(BridgeStrategy::new(kind, config.clone())));
        }
        Ok(registry)
    }

    /// Registers a strategy, replacing any previous one with the same key.
    pub fn register(&mut self, strategy: Box<dyn OcrStrategy>) {
        match self.strategies.iter().position(|s| s.key() == strategy.key()) {
            Some(idx) => self.strategies[idx] = strategy,
            None => self.strategies.push(strategy),
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.key().to_string()).collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.strategies.iter().any(|s| s.key() == key)
    }

    /// Checks every requested key up front so that a typo never leaves a
    /// half-finished run behind.
    ///
    /// An empty key list is a configuration error (`BenchError::NoEngines`),
    /// not an empty run: no report is written for it.
    pub fn resolve(&self, keys: &[String]) -> Result<(), BenchError> {
        if keys.is_empty() {
            return Err(BenchError::NoEngines);
        }
        match keys.iter().find(|key| !self.contains(key)) {
            Some(key) => Err(BenchError::unknown_engine(key, &self.keys())),
            None => Ok(()),
        }
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut dyn OcrStrategy> {
        for strategy in self.strategies.iter_mut() {
            if strategy.key() == key {
                return Some(&mut **strategy);
            }
        }
        None
    }

    /// Number of strategies currently holding model state.
    pub fn loaded_count(&self) -> usize {
        self.strategies.iter().filter(|s| s.is_loaded()).count()
    }
}

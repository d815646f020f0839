use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::core::model::ResultTable;
use crate::export::Exporter;

pub const SUMMARY_FILE: &str = "ocr_summary.json";

/// Per-engine mean scores as pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct JsonSummaryExporter {
    out_dir: PathBuf,
}

impl JsonSummaryExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }
}

impl Exporter for JsonSummaryExporter {
    fn export(&self, table: &ResultTable) -> Result<PathBuf> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(SUMMARY_FILE);
        let data = serde_json::to_string_pretty(&table.summarize())?;
        fs::write(&path, data).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }
}

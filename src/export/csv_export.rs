use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::core::model::ResultTable;
use crate::export::Exporter;

pub const REPORT_FILE: &str = "ocr_results.csv";
pub const REPORT_COLUMNS: [&str; 8] = ["image", "engine", "gt", "ocr_raw", "wer", "cer", "bleu", "rouge_l"];

/// One CSV row per evaluated (image, engine) pair.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    out_dir: PathBuf,
}

impl CsvExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }
}

impl Exporter for CsvExporter {
    fn export(&self, table: &ResultTable) -> Result<PathBuf> {
        fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(REPORT_FILE);
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;

        // written explicitly so an empty table still yields a header
        writer.write_record(REPORT_COLUMNS)?;
        for row in table.rows() {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(path)
    }
}

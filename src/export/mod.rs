pub mod csv_export;
pub mod json_export;

use anyhow::Result;
use std::path::PathBuf;

use crate::core::model::ResultTable;

pub use csv_export::CsvExporter;
pub use json_export::JsonSummaryExporter;

pub trait Exporter {
    /// Writes the table and returns the path of the written file.
    fn export(&self, table: &ResultTable) -> Result<PathBuf>;
}

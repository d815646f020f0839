use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};

use crate::core::model::{EvaluationRow, ResultTable};
use crate::dataset::{self, ImageEntry};
use crate::export::{CsvExporter, Exporter, JsonSummaryExporter};
use crate::metrics::{normalize_opt, MetricScores, NormalizedText};
use crate::ocr::{OcrOutcome, OcrStrategy, StrategyRegistry};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub images: PathBuf,
    pub ground_truth: PathBuf,
    pub results: PathBuf,
    pub engines: Vec<String>,
}

impl PipelineConfig {
    pub fn new(images: PathBuf, ground_truth: PathBuf, results: PathBuf, engines: Vec<String>) -> Self {
        Self {
            images,
            ground_truth,
            results,
            engines,
        }
    }
}

/// Splits a comma separated engine list, dropping blank entries.
pub fn parse_engine_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct BenchReport {
    pub table: ResultTable,
    /// `None` when the run stopped early because no images were found.
    pub report_path: Option<PathBuf>,
    pub summary_path: Option<PathBuf>,
}

/// Runs every configured engine over every image and writes the report.
///
/// Engines are processed one at a time and unloaded before the next one
/// starts, so at most one model is resident.
pub fn run_benchmark(config: &PipelineConfig, registry: &mut StrategyRegistry) -> Result<BenchReport> {
    registry.resolve(&config.engines)?;

    let images = dataset::list_images(&config.images)?;
    if images.is_empty() {
        info!("No images found in {}", config.images.display());
        return Ok(BenchReport::default());
    }

    fs::create_dir_all(&config.results)
        .with_context(|| format!("failed to create results directory {}", config.results.display()))?;

    let mut table = ResultTable::new();
    for engine in &config.engines {
        info!("--- Starting tests for engine: {engine} ---");
        let Some(strategy) = registry.get_mut(engine) else {
            // resolve() has already vetted every key
            continue;
        };

        let outcome = evaluate_engine(config, strategy, &images, &mut table);
        strategy.unload();
        info!("--- Cleared memory after running {engine} ---");
        outcome?;
    }

    let report_path = CsvExporter::new(config.results.clone()).export(&table)?;
    let summary_path = JsonSummaryExporter::new(config.results.clone()).export(&table)?;
    info!("Saved final results to {}", report_path.display());

    Ok(BenchReport {
        table,
        report_path: Some(report_path),
        summary_path: Some(summary_path),
    })
}

fn evaluate_engine(
    config: &PipelineConfig,
    strategy: &mut dyn OcrStrategy,
    images: &[ImageEntry],
    table: &mut ResultTable,
) -> Result<()> {
    for image in images {
        let gt_path = dataset::ground_truth_path(&config.ground_truth, image);
        if !gt_path.exists() {
            info!("Skipping {} (no GT file)", image.name);
            continue;
        }
        let gt_raw = match dataset::read_ground_truth(&gt_path) {
            Ok(text) => text,
            Err(err) => {
                warn!("Skipping {}: {err:#}", image.name);
                continue;
            }
        };

        let row = evaluate_pair(strategy, image, gt_raw);
        write_raw_output(&config.results, image, &row)?;
        table.push(row);
    }
    Ok(())
}

fn evaluate_pair(strategy: &mut dyn OcrStrategy, image: &ImageEntry, gt_raw: String) -> EvaluationRow {
    let engine = strategy.key().to_string();
    info!("Running {engine} on {} ...", image.name);

    let outcome = strategy.run(&image.path);
    if let OcrOutcome::Failed(reason) = &outcome {
        warn!("Error running {engine} on {}: {reason}", image.name);
    }

    let reference = NormalizedText::new(&gt_raw);
    let hypothesis = normalize_opt(outcome.recognized());
    let scores = MetricScores::compute(&reference, &hypothesis);
    info!("   {engine} {}", scores.summary_line());

    let row = EvaluationRow::new(image.name.clone(), engine, gt_raw, outcome.text(), scores);
    match outcome {
        OcrOutcome::Failed(reason) => row.with_failure(reason),
        OcrOutcome::Recognized(_) => row,
    }
}

fn write_raw_output(results: &Path, image: &ImageEntry, row: &EvaluationRow) -> Result<()> {
    let path = dataset::raw_output_path(results, image, &row.engine);
    fs::write(&path, &row.ocr_raw).with_context(|| format!("failed to write {}", path.display()))
}

use serde::{Deserialize, Serialize};

use crate::metrics::MetricScores;

/// One scored (image, engine) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRow {
    pub image: String,
    pub engine: String,
    pub gt: String,
    pub ocr_raw: String,
    pub wer: f64,
    pub cer: f64,
    pub bleu: f64,
    pub rouge_l: f64,
    #[serde(skip)]
    pub failure: Option<String>,
}

impl EvaluationRow {
    pub fn new(
        image: impl Into<String>,
        engine: impl Into<String>,
        gt: impl Into<String>,
        ocr_raw: impl Into<String>,
        scores: MetricScores,
    ) -> Self {
        Self {
            image: image.into(),
            engine: engine.into(),
            gt: gt.into(),
            ocr_raw: ocr_raw.into(),
            wer: scores.wer,
            cer: scores.cer,
            bleu: scores.bleu,
            rouge_l: scores.rouge_l,
            failure: None,
        }
    }

    pub fn with_failure(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }

    pub fn scores(&self) -> MetricScores {
        MetricScores {
            wer: self.wer,
            cer: self.cer,
            bleu: self.bleu,
            rouge_l: self.rouge_l,
        }
    }
}

/// Rows in engine-outer, image-inner order. Append-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    rows: Vec<EvaluationRow>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: EvaluationRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[EvaluationRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Per-engine means, in the order engines first appear in the table.
    pub fn summarize(&self) -> Vec<EngineSummary> {
        let mut summaries: Vec<EngineSummary> = Vec::new();
        for row in &self.rows {
            let idx = match summaries.iter().position(|s| s.engine == row.engine) {
                Some(idx) => idx,
                None => {
                    summaries.push(EngineSummary::empty(&row.engine));
                    summaries.len() - 1
                }
            };
            summaries[idx].accumulate(row);
        }
        for summary in &mut summaries {
            summary.finish();
        }
        summaries
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSummary {
    pub engine: String,
    pub pairs: usize,
    pub failures: usize,
    pub mean_wer: f64,
    pub mean_cer: f64,
    pub mean_bleu: f64,
    pub mean_rouge_l: f64,
}

impl EngineSummary {
    fn empty(engine: &str) -> Self {
        Self {
            engine: engine.to_string(),
            pairs: 0,
            failures: 0,
            mean_wer: 0.0,
            mean_cer: 0.0,
            mean_bleu: 0.0,
            mean_rouge_l: 0.0,
        }
    }

    fn accumulate(&mut self, row: &EvaluationRow) {
        self.pairs += 1;
        if row.failure.is_some() {
            self.failures += 1;
        }
        self.mean_wer += row.wer;
        self.mean_cer += row.cer;
        self.mean_bleu += row.bleu;
        self.mean_rouge_l += row.rouge_l;
    }

    fn finish(&mut self) {
        if self.pairs == 0 {
            return;
        }
        let n = self.pairs as f64;
        self.mean_wer /= n;
        self.mean_cer /= n;
        self.mean_bleu /= n;
        self.mean_rouge_l /= n;
    }
}

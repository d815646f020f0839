pub mod bleu;
pub mod distance;
pub mod normalize;
pub mod rouge;

use serde::{Deserialize, Serialize};

pub use bleu::{bleu_simple, bleu_tokens};
pub use distance::{cer, edit_distance, error_rate, wer};
pub use normalize::{normalize_opt, normalize_text, NormalizedText};
pub use rouge::{lcs_len, rouge_l, rouge_l_tokens};

/// The four scores recorded for one (image, engine) pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricScores {
    pub wer: f64,
    pub cer: f64,
    pub bleu: f64,
    pub rouge_l: f64,
}

impl MetricScores {
    /// Each sequence is split once and shared by the word-level metrics.
    pub fn compute(reference: &NormalizedText, hypothesis: &NormalizedText) -> Self {
        let (r_tokens, h_tokens) = (reference.tokens(), hypothesis.tokens());
        Self {
            wer: error_rate(&r_tokens, &h_tokens),
            cer: error_rate(&reference.chars(), &hypothesis.chars()),
            bleu: bleu_tokens(&r_tokens, &h_tokens),
            rouge_l: rouge_l_tokens(&r_tokens, &h_tokens),
        }
    }

    pub fn summary_line(&self) -> String {
        format!(
            "WER={:.3} CER={:.3} BLEU={:.3} ROUGE_L={:.3}",
            self.wer, self.cer, self.bleu, self.rouge_l
        )
    }
}

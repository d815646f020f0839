use std::collections::HashMap;

/// Unigram BLEU with clipped counts and a brevity penalty.
///
/// Single reference, single hypothesis; no higher n-gram orders and no
/// smoothing.
pub fn bleu_simple(reference: &str, hypothesis: &str) -> f64 {
    let r: Vec<&str> = reference.split_whitespace().collect();
    let h: Vec<&str> = hypothesis.split_whitespace().collect();
    bleu_tokens(&r, &h)
}

pub fn bleu_tokens(r: &[&str], h: &[&str]) -> f64 {
    if h.is_empty() {
        return 0.0;
    }

    let mut ref_counts: HashMap<&str, usize> = HashMap::new();
    for &token in r {
        *ref_counts.entry(token).or_insert(0) += 1;
    }

    let mut matches = 0usize;
    for token in h {
        if let Some(count) = ref_counts.get_mut(token) {
            if *count > 0 {
                matches += 1;
                *count -= 1;
            }
        }
    }

    let precision = matches as f64 / h.len() as f64;
    let bp = if h.len() < r.len() {
        (1.0 - r.len() as f64 / h.len() as f64).exp()
    } else {
        1.0
    };
    bp * precision
}

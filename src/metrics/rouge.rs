pub const ROUGE_BETA: f64 = 1.2;
const EPSILON: f64 = 1e-12;

/// Longest common subsequence length.
///
/// Fills the table from the end of both sequences backwards so that
/// `dp[i][j]` holds the LCS of `a[i..]` and `b[j..]`; only the row below the
/// current one is kept.
pub fn lcs_len<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    let m = b.len();
    let mut below = vec![0usize; m + 1];
    let mut row = vec![0usize; m + 1];

    for i in (0..a.len()).rev() {
        row[m] = 0;
        for j in (0..m).rev() {
            row[j] = if a[i] == b[j] {
                1 + below[j + 1]
            } else {
                below[j].max(row[j + 1])
            };
        }
        std::mem::swap(&mut below, &mut row);
    }

    below[0]
}

/// ROUGE-L F-measure with recall weighted by `ROUGE_BETA`.
pub fn rouge_l(reference: &str, hypothesis: &str) -> f64 {
    let r: Vec<&str> = reference.split_whitespace().collect();
    let h: Vec<&str> = hypothesis.split_whitespace().collect();
    rouge_l_tokens(&r, &h)
}

pub fn rouge_l_tokens(r: &[&str], h: &[&str]) -> f64 {
    if r.is_empty() || h.is_empty() {
        return 0.0;
    }

    let lcs = lcs_len(r, h) as f64;
    let precision = lcs / h.len() as f64;
    let recall = lcs / r.len() as f64;
    let beta2 = ROUGE_BETA * ROUGE_BETA;
    ((1.0 + beta2) * precision * recall) / (recall + beta2 * precision + EPSILON)
}

// ============================================================
// Layer 5 — Corpus BLEU
// ============================================================
// Corpus-level BLEU (Papineni et al., 2002) without smoothing.
//
// For every n in 1..=4:
//   p_n = Σ clipped n-gram matches / Σ hypothesis n-grams
// where a hypothesis n-gram count is clipped to the largest count
// of that n-gram in any single reference of the same image.
//
//   BP   = 1                  if c > r
//          exp(1 - r / c)     otherwise
//   BLEU = BP · exp(Σ w_n · ln p_n)
//
// c is the total hypothesis length, r the sum over images of the
// reference length closest to the hypothesis (shorter on ties).
// An order with positive weight and no matches makes the score 0.
//
// Reference: Papineni et al. (2002) BLEU

use std::collections::HashMap;

use anyhow::{ensure, Result};

/// n-gram weights for orders 1..=4.
pub type BleuWeights = [f64; 4];

pub const BLEU_1: BleuWeights = [1.0, 0.0, 0.0, 0.0];
pub const BLEU_2: BleuWeights = [0.5, 0.5, 0.0, 0.0];
pub const BLEU_3: BleuWeights = [1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0, 0.0];
pub const BLEU_4: BleuWeights = [0.25, 0.25, 0.25, 0.25];

fn ngram_counts<'a>(tokens: &'a [String], n: usize) -> HashMap<&'a [String], usize> {
    let mut counts = HashMap::new();
    if n == 0 || tokens.len() < n {
        return counts;
    }
    for gram in tokens.windows(n) {
        *counts.entry(gram).or_insert(0) += 1;
    }
    counts
}

/// Clipped matches and total hypothesis n-grams for one image.
fn modified_precision(references: &[Vec<String>], hypothesis: &[String], n: usize) -> (usize, usize) {
    let hyp_counts = ngram_counts(hypothesis, n);

    let mut max_ref_counts: HashMap<&[String], usize> = HashMap::new();
    for reference in references {
        for (gram, count) in ngram_counts(reference, n) {
            let entry = max_ref_counts.entry(gram).or_insert(0);
            *entry = (*entry).max(count);
        }
    }

    let clipped: usize = hyp_counts
        .iter()
        .map(|(gram, &count)| count.min(max_ref_counts.get(gram).copied().unwrap_or(0)))
        .sum();
    let total: usize = hyp_counts.values().sum();

    // An empty hypothesis still contributes a denominator of 1
    (clipped, total.max(1))
}

/// Reference length closest to `hyp_len`, preferring the shorter.
fn closest_ref_length(references: &[Vec<String>], hyp_len: usize) -> usize {
    references
        .iter()
        .map(Vec::len)
        .min_by_key(|&len| (len.abs_diff(hyp_len), len))
        .unwrap_or(0)
}

/// Corpus BLEU of `hypotheses[i]` against `references[i]`.
pub fn corpus_bleu(
    references: &[Vec<Vec<String>>],
    hypotheses: &[Vec<String>],
    weights:    &BleuWeights,
) -> Result<f64> {
    ensure!(
        references.len() == hypotheses.len(),
        "BLEU needs one reference list per hypothesis ({} references, {} hypotheses)",
        references.len(),
        hypotheses.len()
    );

    let mut numerators   = [0usize; 4];
    let mut denominators = [0usize; 4];
    let mut hyp_len = 0usize;
    let mut ref_len = 0usize;

    for (refs, hyp) in references.iter().zip(hypotheses) {
        for n in 1..=4 {
            let (num, den) = modified_precision(refs, hyp, n);
            numerators[n - 1]   += num;
            denominators[n - 1] += den;
        }
        hyp_len += hyp.len();
        ref_len += closest_ref_length(refs, hyp.len());
    }

    if hyp_len == 0 || numerators[0] == 0 {
        return Ok(0.0);
    }

    let mut log_sum = 0.0;
    for n in 0..4 {
        if weights[n] == 0.0 {
            continue;
        }
        if numerators[n] == 0 {
            return Ok(0.0);
        }
        log_sum += weights[n] * (numerators[n] as f64 / denominators[n] as f64).ln();
    }

    Ok(brevity_penalty(ref_len, hyp_len) * log_sum.exp())
}

fn brevity_penalty(ref_len: usize, hyp_len: usize) -> f64 {
    if hyp_len > ref_len {
        1.0
    } else if hyp_len == 0 {
        0.0
    } else {
        (1.0 - ref_len as f64 / hyp_len as f64).exp()
    }
}

/// Whitespace tokenisation used for both references and predictions.
pub fn split_tokens(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<String> {
        split_tokens(s)
    }

    #[test]
    fn test_perfect_match_scores_one() {
        let refs = vec![
            vec![toks("startseq cat sat endseq"), toks("startseq dog ran away endseq")],
            vec![toks("startseq two birds fly over water endseq")],
        ];
        let hyps = vec![
            toks("startseq cat sat endseq"),
            toks("startseq two birds fly over water endseq"),
        ];

        for weights in [BLEU_1, BLEU_2, BLEU_3, BLEU_4] {
            let score = corpus_bleu(&refs, &hyps, &weights).unwrap();
            assert!((score - 1.0).abs() < 1e-9, "{weights:?} gave {score}");
        }
    }

    #[test]
    fn test_no_overlap_scores_zero() {
        let refs = vec![vec![toks("the cat sat on the mat")]];
        let hyps = vec![toks("dogs run fast")];
        assert_eq!(corpus_bleu(&refs, &hyps, &BLEU_1).unwrap(), 0.0);
        assert_eq!(corpus_bleu(&refs, &hyps, &BLEU_4).unwrap(), 0.0);
    }

    #[test]
    fn test_missing_higher_order_scores_zero() {
        // Unigrams overlap but no bigram does
        let refs = vec![vec![toks("cat the sat")]];
        let hyps = vec![toks("the cat")];
        assert!(corpus_bleu(&refs, &hyps, &BLEU_1).unwrap() > 0.0);
        assert_eq!(corpus_bleu(&refs, &hyps, &BLEU_2).unwrap(), 0.0);
    }

    #[test]
    fn test_brevity_penalty_and_bigrams() {
        let refs = vec![vec![toks("the cat sat on the mat")]];
        let hyps = vec![toks("the cat sat on mat")];

        // unigrams 5/5, bigrams 3/4, BP = exp(1 - 6/5)
        let bp = (-0.2f64).exp();
        assert!((corpus_bleu(&refs, &hyps, &BLEU_1).unwrap() - bp).abs() < 1e-9);
        assert!((corpus_bleu(&refs, &hyps, &BLEU_2).unwrap() - bp * 0.75f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_counts_are_clipped() {
        let refs = vec![vec![toks("the cat is on the mat"), toks("there is a cat on the mat")]];
        let hyps = vec![toks("the the the the the the the")];
        // "the" appears at most twice in one reference
        let expected = 2.0 / 7.0;
        assert!((corpus_bleu(&refs, &hyps, &BLEU_1).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_closest_reference_prefers_shorter() {
        let refs = vec![toks("a b"), toks("a b c d")];
        assert_eq!(closest_ref_length(&refs, 3), 2);
        assert_eq!(closest_ref_length(&refs, 4), 4);
    }

    #[test]
    fn test_empty_corpus_scores_zero() {
        assert_eq!(corpus_bleu(&[], &[], &BLEU_4).unwrap(), 0.0);
        let refs = vec![Vec::new()];
        let hyps = vec![toks("cat")];
        assert_eq!(corpus_bleu(&refs, &hyps, &BLEU_1).unwrap(), 0.0);
    }

    #[test]
    fn test_mismatched_corpus_lengths_error() {
        let refs = vec![vec![toks("a cat")], vec![toks("a dog")]];
        let hyps = vec![toks("a cat")];
        assert!(corpus_bleu(&refs, &hyps, &BLEU_1).is_err());
    }
}

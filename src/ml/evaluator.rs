// ============================================================
// Layer 5 — BLEU Evaluation
// ============================================================
// Generates one caption per image (sequentially, one image at a
// time) and scores the whole set with corpus BLEU-1..4.

use anyhow::{Context, Result};
use std::fmt;

use crate::domain::caption::CaptionSet;
use crate::domain::features::FeatureMap;
use crate::domain::traits::{NextWordPredictor, WordIndex};
use crate::ml::bleu::{corpus_bleu, split_tokens, BLEU_1, BLEU_2, BLEU_3, BLEU_4};
use crate::ml::decoding::generate_caption;

/// Corpus BLEU scores for one evaluation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BleuReport {
    pub bleu1: f64,
    pub bleu2: f64,
    pub bleu3: f64,
    pub bleu4: f64,
}

impl fmt::Display for BleuReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BLEU Scores :")?;
        writeln!(
            f,
            "A perfect match results in a score of 1.0, whereas a perfect mismatch results in a score of 0.0."
        )?;
        writeln!(f, "BLEU-1: {:.6}", self.bleu1)?;
        writeln!(f, "BLEU-2: {:.6}", self.bleu2)?;
        writeln!(f, "BLEU-3: {:.6}", self.bleu3)?;
        write!(f, "BLEU-4: {:.6}", self.bleu4)
    }
}

/// Caption every image in `captions`, score against its references,
/// print the report and return it.
pub fn evaluate_model<P, T>(
    model:      &P,
    images:     &FeatureMap,
    captions:   &CaptionSet,
    tokenizer:  &T,
    max_length: usize,
) -> Result<BleuReport>
where
    P: NextWordPredictor + ?Sized,
    T: WordIndex + ?Sized,
{
    let mut actual    = Vec::with_capacity(captions.len());
    let mut predicted = Vec::with_capacity(captions.len());

    for (done, (image_id, caption_list)) in captions.iter().enumerate() {
        let image = images
            .get(image_id)
            .with_context(|| format!("No features for image '{image_id}'"))?;

        let yhat = generate_caption(model, tokenizer, image, max_length)
            .with_context(|| format!("Caption generation failed for '{image_id}'"))?;
        tracing::debug!("[{}/{}] {} → {}", done + 1, captions.len(), image_id, yhat);

        actual.push(caption_list.iter().map(|c| split_tokens(c)).collect::<Vec<_>>());
        predicted.push(split_tokens(&yhat));

        if (done + 1) % 100 == 0 {
            tracing::info!("Captioned {}/{} images", done + 1, captions.len());
        }
    }

    let report = BleuReport {
        bleu1: corpus_bleu(&actual, &predicted, &BLEU_1)?,
        bleu2: corpus_bleu(&actual, &predicted, &BLEU_2)?,
        bleu3: corpus_bleu(&actual, &predicted, &BLEU_3)?,
        bleu4: corpus_bleu(&actual, &predicted, &BLEU_4)?,
    };

    println!("{report}");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::decoding::tests::{cat_tokenizer, ScriptedPredictor};

    #[test]
    fn test_perfect_captions_score_one() {
        let mut images = FeatureMap::new();
        images.insert("img".to_string(), vec![0.0; 4]);

        let mut captions = CaptionSet::new();
        captions.insert("img", "startseq cat sat endseq");
        captions.insert("img", "startseq sat cat endseq");

        let model = ScriptedPredictor::new(5, &[2, 3, 4]);
        let report = evaluate_model(&model, &images, &captions, &cat_tokenizer(), 4).unwrap();

        for score in [report.bleu1, report.bleu2, report.bleu3, report.bleu4] {
            assert!((score - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_missing_features_is_an_error() {
        let images = FeatureMap::new();
        let mut captions = CaptionSet::new();
        captions.insert("img", "startseq cat endseq");

        let model = ScriptedPredictor::new(5, &[4]);
        assert!(evaluate_model(&model, &images, &captions, &cat_tokenizer(), 4).is_err());
    }

    #[test]
    fn test_empty_set_scores_zero() {
        let model = ScriptedPredictor::new(5, &[]);
        let report = evaluate_model(&model, &FeatureMap::new(), &CaptionSet::new(), &cat_tokenizer(), 4)
            .unwrap();
        assert_eq!(report.bleu4, 0.0);
    }

    #[test]
    fn test_report_format() {
        let report = BleuReport { bleu1: 0.5, bleu2: 0.25, bleu3: 0.125, bleu4: 0.0625 };
        let text = report.to_string();
        assert!(text.starts_with("BLEU Scores :"));
        assert!(text.contains("BLEU-1: 0.500000"));
        assert!(text.ends_with("BLEU-4: 0.062500"));
    }
}

// ============================================================
// Layer 4 — Sequence Preparation
// ============================================================
// Turns wrapped captions into supervised next-word examples.
//
// For a caption encoded as [1, 7, 9, 2] (startseq dog runs endseq)
// and max_len = 4, create_sequences emits one item per prefix:
//
//   input            target
//   [0, 0, 0, 1]  →  7
//   [0, 0, 1, 7]  →  9
//   [0, 1, 7, 9]  →  2
//
// Padding is on the left so the most recent word always sits in
// the last position; index 0 is the padding/mask value.
//
// Reference: Rust Book §8 (Vectors and Slices)

use anyhow::Result;

use crate::domain::caption::CaptionSet;
use crate::domain::traits::WordIndex;

/// Left-pad `sequence` with zeros to exactly `max_len` ids.
/// Longer sequences keep their last `max_len` ids.
pub fn pad_sequence(sequence: &[u32], max_len: usize) -> Vec<u32> {
    if sequence.len() >= max_len {
        return sequence[sequence.len() - max_len..].to_vec();
    }
    let mut padded = vec![0u32; max_len - sequence.len()];
    padded.extend_from_slice(sequence);
    padded
}

/// One next-word training example. Features are looked up by
/// `image_id` when the dataset materialises a sample.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceItem {
    pub image_id:  String,
    pub input_ids: Vec<u32>,
    pub target:    u32,
}

/// Expand every caption in `captions` into prefix → next-word items.
pub fn create_sequences<T: WordIndex + ?Sized>(
    tokenizer: &T,
    captions:  &CaptionSet,
    max_len:   usize,
) -> Result<Vec<SequenceItem>> {
    let mut items = Vec::new();

    for (image_id, caps) in captions.iter() {
        for caption in caps {
            let seq = tokenizer.texts_to_sequence(caption)?;
            for i in 1..seq.len() {
                items.push(SequenceItem {
                    image_id:  image_id.to_string(),
                    input_ids: pad_sequence(&seq[..i], max_len),
                    target:    seq[i],
                });
            }
        }
    }

    tracing::debug!(
        "Created {} sequences from {} captions",
        items.len(),
        captions.caption_count()
    );
    Ok(items)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::tokenizer_store::CaptionTokenizer;

    fn tokenizer() -> CaptionTokenizer {
        CaptionTokenizer::from_word_index(
            [("startseq", 1), ("dog", 2), ("runs", 3), ("endseq", 4)]
                .into_iter()
                .map(|(w, i)| (w.to_string(), i))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_pad_left() {
        assert_eq!(pad_sequence(&[5, 6], 4), vec![0, 0, 5, 6]);
        assert_eq!(pad_sequence(&[], 3), vec![0, 0, 0]);
    }

    #[test]
    fn test_truncate_keeps_tail() {
        assert_eq!(pad_sequence(&[1, 2, 3, 4, 5], 3), vec![3, 4, 5]);
        assert_eq!(pad_sequence(&[1, 2, 3], 3), vec![1, 2, 3]);
    }

    #[test]
    fn test_create_sequences() {
        let mut captions = CaptionSet::new();
        captions.insert("img", "startseq dog runs endseq");

        let items = create_sequences(&tokenizer(), &captions, 4).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].input_ids, vec![0, 0, 0, 1]);
        assert_eq!(items[0].target, 2);
        assert_eq!(items[2].input_ids, vec![0, 1, 2, 3]);
        assert_eq!(items[2].target, 4);
        assert!(items.iter().all(|i| i.image_id == "img"));
    }

    #[test]
    fn test_unknown_words_are_skipped() {
        let mut captions = CaptionSet::new();
        captions.insert("img", "startseq zebra runs endseq");

        // "zebra" is dropped, leaving startseq runs endseq
        let items = create_sequences(&tokenizer(), &captions, 3).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].target, 3);
    }
}

// ============================================================
// Layer 5 — Greedy Caption Decoding
// ============================================================
// Starting from "startseq", repeatedly:
//   1. encode the caption so far
//   2. left-pad it to max_length
//   3. ask the model for the next-word distribution
//   4. take the most probable index (first one on ties)
//   5. map it back to a word and append it
//
// Stops when the index has no word (nothing appended), when
// "endseq" is produced (appended), or after max_length steps.

use anyhow::Result;

use crate::data::sequences::pad_sequence;
use crate::domain::caption::{END_TOKEN, START_TOKEN};
use crate::domain::traits::{NextWordPredictor, WordIndex};

/// Map a predicted index back to its word.
pub fn int_to_word<T: WordIndex + ?Sized>(integer: u32, tokenizer: &T) -> Option<&str> {
    tokenizer.index_word(integer)
}

/// Index of the largest value; the first one wins on ties.
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Generate one caption for `image` by greedy decoding.
///
/// The result keeps the leading `startseq` and, when produced,
/// the trailing `endseq`; see [`strip_markers`] for display.
///
/// [`strip_markers`]: crate::domain::caption::strip_markers
pub fn generate_caption<P, T>(
    model:      &P,
    tokenizer:  &T,
    image:      &[f32],
    max_length: usize,
) -> Result<String>
where
    P: NextWordPredictor + ?Sized,
    T: WordIndex + ?Sized,
{
    let mut in_text = START_TOKEN.to_string();

    for _ in 0..max_length {
        let sequence = tokenizer.texts_to_sequence(&in_text)?;
        let sequence = pad_sequence(&sequence, max_length);

        let probs = model.predict(image, &sequence)?;
        let word = argmax(&probs)
            .and_then(|i| u32::try_from(i).ok())
            .and_then(|i| int_to_word(i, tokenizer));

        let Some(word) = word else { break };

        in_text.push(' ');
        in_text.push_str(word);

        if word == END_TOKEN {
            break;
        }
    }

    Ok(in_text)
}

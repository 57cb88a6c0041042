// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Builds, saves and loads the caption vocabulary.
//
// The word index is built from the cleaned training captions:
//   - most frequent word gets index 1, the next index 2, ...
//   - ties keep the order in which words were first seen
//   - index 0 is never a word; it is the padding value
//
// The vocabulary is stored as a HuggingFace tokenizer JSON with
// a WordLevel model. "[PAD]" sits at id 0 and doubles as the
// unknown token, so out-of-vocabulary words encode to 0 and are
// filtered out of the sequence.
//
// Reference: tokenizers crate documentation (WordLevel model)

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use tokenizers::Tokenizer;

use crate::domain::traits::WordIndex;

pub const PAD_TOKEN: &str = "[PAD]";
pub const PAD_ID: u32 = 0;

// ─── CaptionTokenizer ─────────────────────────────────────────────────────────
/// Word-level tokenizer plus the reverse index → word map,
/// built once so decoding never scans the vocabulary.
pub struct CaptionTokenizer {
    inner:      Tokenizer,
    index_word: HashMap<u32, String>,
    vocab_size: usize,
}

impl CaptionTokenizer {
    /// Wrap an already-built tokenizer.
    pub fn new(inner: Tokenizer) -> Self {
        let index_word: HashMap<u32, String> = inner
            .get_vocab(false)
            .into_iter()
            .filter(|&(_, id)| id != PAD_ID)
            .map(|(word, id)| (id, word))
            .collect();
        let vocab_size = index_word.keys().max().map_or(1, |&max| max as usize + 1);
        Self { inner, index_word, vocab_size }
    }

    /// Build a tokenizer from an explicit word → index map.
    pub fn from_word_index(word_index: HashMap<String, u32>) -> Result<Self> {
        let json = tokenizer_json(&word_index);
        let inner = Tokenizer::from_bytes(serde_json::to_vec(&json)?)
            .map_err(|e| anyhow::anyhow!("Cannot build tokenizer: {e}"))?;
        Ok(Self::new(inner))
    }

    /// The word → index map (padding excluded).
    #[cfg(test)]
    pub fn word_index(&self) -> HashMap<String, u32> {
        self.index_word
            .iter()
            .map(|(&id, word)| (word.clone(), id))
            .collect()
    }
}

impl WordIndex for CaptionTokenizer {
    fn texts_to_sequence(&self, text: &str) -> Result<Vec<u32>> {
        let enc = self
            .inner
            .encode(text, false)
            .map_err(|e| anyhow::anyhow!("Tokenisation error: {e}"))?;
        Ok(enc.get_ids().iter().copied().filter(|&id| id != PAD_ID).collect())
    }

    fn index_word(&self, index: u32) -> Option<&str> {
        self.index_word.get(&index).map(String::as_str)
    }

    fn vocab_size(&self) -> usize {
        self.vocab_size
    }
}

// ─── Word index construction ──────────────────────────────────────────────────
/// Rank words by frequency (descending, ties by first appearance)
/// and assign indices from 1.
pub fn build_word_index<'a, I>(texts: I) -> HashMap<String, u32>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut order: Vec<String> = Vec::new();
    let mut freq:  HashMap<String, usize> = HashMap::new();

    for text in texts {
        for word in text.split_whitespace() {
            let w = word.to_lowercase();
            let count = freq.entry(w.clone()).or_insert(0);
            if *count == 0 {
                order.push(w);
            }
            *count += 1;
        }
    }

    // sort_by is stable, so equal counts keep first-seen order
    order.sort_by(|a, b| freq[b].cmp(&freq[a]));

    order
        .into_iter()
        .zip(1u32..)
        .collect()
}

/// HuggingFace tokenizer JSON for a word-level vocabulary.
fn tokenizer_json(word_index: &HashMap<String, u32>) -> serde_json::Value {
    let mut vocab = serde_json::Map::new();
    vocab.insert(PAD_TOKEN.to_string(), serde_json::json!(PAD_ID));
    for (word, id) in word_index {
        vocab.insert(word.clone(), serde_json::json!(id));
    }

    serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [
            {"id": PAD_ID, "content": PAD_TOKEN, "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
        ],
        "normalizer": { "type": "Lowercase" },
        "pre_tokenizer": { "type": "WhitespaceSplit" },
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": vocab,
            "unk_token": PAD_TOKEN
        }
    })
}

// ─── TokenizerStore ───────────────────────────────────────────────────────────
pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: PathBuf::from(dir.into()) }
    }

    /// Load a previously saved tokenizer from JSON file
    pub fn load(&self) -> Result<CaptionTokenizer> {
        let path = self.dir.join("tokenizer.json");
        let inner = Tokenizer::from_file(&path)
            .map_err(|e| anyhow::anyhow!(
                "Cannot load tokenizer from '{}': {}", path.display(), e
            ))?;
        Ok(CaptionTokenizer::new(inner))
    }

    /// Build the vocabulary from cleaned captions and write it to
    /// tokenizer.json.
    pub fn build_and_save<'a, I>(&self, captions: I) -> Result<CaptionTokenizer>
    where
        I: IntoIterator<Item = &'a str>,
    {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        let word_index = build_word_index(captions);
        let word_count = word_index.len();
        let tokenizer  = CaptionTokenizer::from_word_index(word_index)?;

        let tok_path = self.dir.join("tokenizer.json");
        tokenizer
            .inner
            .save(&tok_path, true)
            .map_err(|e| anyhow::anyhow!("Cannot write '{}': {e}", tok_path.display()))?;

        tracing::info!(
            "Vocabulary of {} words saved to '{}'",
            word_count,
            tok_path.display()
        );

        Ok(tokenizer)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn example_tokenizer() -> CaptionTokenizer {
        let word_index = [("startseq", 1), ("cat", 2), ("sat", 3), ("endseq", 4)]
            .into_iter()
            .map(|(w, i)| (w.to_string(), i))
            .collect();
        CaptionTokenizer::from_word_index(word_index).unwrap()
    }

    #[test]
    fn test_word_index_orders_by_frequency() {
        let captions = [
            "startseq dog runs endseq",
            "startseq cat runs endseq",
            "startseq cat sits endseq",
        ];
        let index = build_word_index(captions);

        assert_eq!(index["startseq"], 1);
        assert_eq!(index["endseq"], 2);
        // runs and cat both appear twice; runs was seen first
        assert_eq!(index["runs"], 3);
        assert_eq!(index["cat"], 4);
        assert_eq!(index["dog"], 5);
        assert_eq!(index["sits"], 6);
        assert_eq!(index.len(), 6);
    }

    #[test]
    fn test_encode_drops_unknown_words() {
        let tok = example_tokenizer();
        assert_eq!(tok.texts_to_sequence("startseq cat sat").unwrap(), vec![1, 2, 3]);
        assert_eq!(tok.texts_to_sequence("startseq dog sat").unwrap(), vec![1, 3]);
        assert_eq!(tok.texts_to_sequence("StartSeq CAT").unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_index_word_inverts_word_index() {
        let tok = example_tokenizer();
        for (word, index) in tok.word_index() {
            assert_eq!(tok.index_word(index), Some(word.as_str()));
        }
        assert_eq!(tok.index_word(0), None);
        assert_eq!(tok.index_word(99), None);
        assert_eq!(tok.vocab_size(), 5);
    }

    #[test]
    fn test_build_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenizerStore::new(dir.path().to_string_lossy());

        let built = store.build_and_save(["startseq dog runs endseq"]).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(built.word_index(), loaded.word_index());
        assert_eq!(loaded.vocab_size(), 5);
    }
}

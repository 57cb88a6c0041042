// ============================================================
// Layer 4 — Caption Preprocessor
// ============================================================
// Cleans raw reference captions before they are wrapped in
// boundary tokens and fed to the tokenizer.
//
// Raw captions look like:
//   "A child in a pink dress is climbing up a set of stairs ."
//
// Cleaning steps (applied per word, in order):
//   1. Lowercase
//   2. Strip ASCII punctuation
//   3. Drop words of a single character ("a", leftover "s")
//   4. Drop words containing anything but letters ("2", "3rd")
//
// Result for the example above:
//   "child in pink dress is climbing up set of stairs"
//
// Reference: Rust Book §8 (Strings in Rust)
//            Rust Book §13 (Iterators)

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Clean one caption. Words are re-joined with single spaces.
    pub fn clean(&self, caption: &str) -> String {
        caption
            .split_whitespace()
            .map(|word| {
                word.chars()
                    .flat_map(char::to_lowercase)
                    .filter(|c| !c.is_ascii_punctuation())
                    .collect::<String>()
            })
            .filter(|word| word.chars().count() > 1)
            .filter(|word| word.chars().all(char::is_alphabetic))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

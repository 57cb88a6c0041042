// ============================================================
// Layer 3 — Caption Domain Types
// ============================================================
// A CaptionSet maps an image id to every reference caption
// written for that image. Ordering is by image id so that
// evaluation and sequence generation are deterministic.
//
// Every caption that reaches the model is wrapped in the two
// boundary tokens:
//
//   "dog runs on grass"  →  "startseq dog runs on grass endseq"
//
// Reference: Rust Book §8 (Collections)

use std::collections::{BTreeMap, HashSet};

/// Marks the beginning of every caption; decoding starts from it.
pub const START_TOKEN: &str = "startseq";

/// Marks the end of a caption; decoding stops once it is produced.
pub const END_TOKEN: &str = "endseq";

/// Surround an already-cleaned caption with the boundary tokens.
pub fn wrap_caption(clean: &str) -> String {
    format!("{START_TOKEN} {clean} {END_TOKEN}")
}

/// Remove a leading `startseq` and trailing `endseq` for display.
pub fn strip_markers(caption: &str) -> String {
    let mut words: Vec<&str> = caption.split_whitespace().collect();
    if words.first() == Some(&START_TOKEN) {
        words.remove(0);
    }
    if words.last() == Some(&END_TOKEN) {
        words.pop();
    }
    words.join(" ")
}

/// Image id → reference captions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptionSet {
    captions: BTreeMap<String, Vec<String>>,
}

impl CaptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one caption for `image_id`.
    pub fn insert(&mut self, image_id: impl Into<String>, caption: impl Into<String>) {
        self.captions
            .entry(image_id.into())
            .or_default()
            .push(caption.into());
    }

    #[cfg(test)]
    pub fn get(&self, image_id: &str) -> Option<&[String]> {
        self.captions.get(image_id).map(Vec::as_slice)
    }

    /// Iterate (image id, captions) in image-id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.captions
            .iter()
            .map(|(id, caps)| (id.as_str(), caps.as_slice()))
    }

    pub fn image_ids(&self) -> Vec<String> {
        self.captions.keys().cloned().collect()
    }

    /// Every caption in the set, flattened.
    pub fn all_captions(&self) -> impl Iterator<Item = &str> {
        self.captions.values().flatten().map(String::as_str)
    }

    /// Keep only the images whose id is in `ids`.
    pub fn restrict_to(&self, ids: &[String]) -> CaptionSet {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let captions = self
            .captions
            .iter()
            .filter(|(id, _)| wanted.contains(id.as_str()))
            .map(|(id, caps)| (id.clone(), caps.clone()))
            .collect();
        CaptionSet { captions }
    }

    /// Apply `f` to every caption, keeping image ids.
    pub fn map_captions<F>(&self, mut f: F) -> CaptionSet
    where
        F: FnMut(&str) -> String,
    {
        let captions = self
            .captions
            .iter()
            .map(|(id, caps)| (id.clone(), caps.iter().map(|c| f(c)).collect()))
            .collect();
        CaptionSet { captions }
    }

    /// Length in words of the longest caption (0 when empty).
    pub fn max_length(&self) -> usize {
        self.all_captions()
            .map(|c| c.split_whitespace().count())
            .max()
            .unwrap_or(0)
    }

    /// Number of images.
    pub fn len(&self) -> usize {
        self.captions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captions.is_empty()
    }

    pub fn caption_count(&self) -> usize {
        self.captions.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set() -> CaptionSet {
        let mut set = CaptionSet::new();
        set.insert("img2", "startseq dog runs endseq");
        set.insert("img1", "startseq cat sat on mat endseq");
        set.insert("img1", "startseq cat endseq");
        set
    }

    #[test]
    fn test_wrap_and_strip() {
        let wrapped = wrap_caption("dog runs");
        assert_eq!(wrapped, "startseq dog runs endseq");
        assert_eq!(strip_markers(&wrapped), "dog runs");
        // Only boundary tokens are removed
        assert_eq!(strip_markers("startseq dog runs"), "dog runs");
        assert_eq!(strip_markers("startseq"), "");
    }

    #[test]
    fn test_iteration_is_ordered_by_id() {
        let set = sample_set();
        let ids: Vec<&str> = set.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["img1", "img2"]);
        assert_eq!(set.get("img1").map(|c| c.len()), Some(2));
        assert_eq!(set.caption_count(), 3);
    }

    #[test]
    fn test_max_length_counts_words() {
        assert_eq!(sample_set().max_length(), 6);
        assert_eq!(CaptionSet::new().max_length(), 0);
    }

    #[test]
    fn test_restrict_to() {
        let set = sample_set().restrict_to(&["img2".to_string(), "missing".to_string()]);
        assert_eq!(set.len(), 1);
        assert!(set.get("img1").is_none());
    }
}

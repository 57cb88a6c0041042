// ============================================================
// Layer 4 — Caption, Image-List and Feature Loaders
// ============================================================
// Three on-disk inputs feed the pipeline:
//
//   Flickr8k.token.txt        one caption per line
//     1000268201_693b08cb0e.jpg#0	A child in a pink dress ...
//
//   Flickr_8k.trainImages.txt one image file name per line
//     2513260012_03d33305cf.jpg
//
//   features.json             precomputed CNN features
//     { "1000268201_693b08cb0e": [0.0, 1.3, ...], ... }
//
// Image ids are the file names cut at the first '.', so
// "1000268201_693b08cb0e.jpg#0" → "1000268201_693b08cb0e".
//
// Reference: Rust Book §9 (Error Handling)
//            serde_json crate documentation

use anyhow::{bail, Context, Result};
use std::{fs, path::Path};

use crate::domain::caption::CaptionSet;
use crate::domain::features::{FeatureMap, FEATURE_SIZE};
use crate::domain::traits::CaptionSource;

/// Derive an image id from a file name or a `file#n` caption key.
pub fn image_id(token: &str) -> &str {
    let token = token.split('#').next().unwrap_or(token);
    token.split('.').next().unwrap_or(token)
}

/// Loads raw captions from a Flickr8k-style token file.
/// Implements the CaptionSource trait from Layer 3.
pub struct TokenFileLoader {
    path: String,
}

impl TokenFileLoader {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl CaptionSource for TokenFileLoader {
    fn load_all(&self) -> Result<CaptionSet> {
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read caption file '{}'", self.path))?;
        let set = parse_token_file(&text);
        tracing::info!(
            "Loaded {} captions for {} images from '{}'",
            set.caption_count(),
            set.len(),
            self.path
        );
        Ok(set)
    }
}

/// Parse the contents of a token file.
/// Lines without a caption are skipped with a warning.
pub fn parse_token_file(text: &str) -> CaptionSet {
    let mut set = CaptionSet::new();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // Key and caption are separated by a tab in the original
        // files; fall back to the first run of whitespace.
        let split = line
            .split_once('\t')
            .or_else(|| line.split_once(char::is_whitespace));

        match split {
            Some((key, caption)) if !caption.trim().is_empty() => {
                set.insert(image_id(key.trim()), caption.trim());
            }
            _ => tracing::warn!("Skipping malformed caption line {}: '{}'", line_no + 1, line),
        }
    }

    set
}

/// Load an image-list file and return the image ids it names.
pub fn load_image_list(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read image list '{}'", path.display()))?;

    let ids: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| image_id(l).to_string())
        .collect();

    tracing::debug!("Image list '{}' names {} images", path.display(), ids.len());
    Ok(ids)
}

/// Load precomputed image features from a JSON object.
pub fn load_features(path: impl AsRef<Path>) -> Result<FeatureMap> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read feature file '{}'", path.display()))?;
    let features = parse_features(&json)
        .with_context(|| format!("Invalid feature file '{}'", path.display()))?;

    tracing::info!("Loaded features for {} images", features.len());
    Ok(features)
}

/// Parse a feature JSON document, checking every vector's length.
pub fn parse_features(json: &str) -> Result<FeatureMap> {
    let features: FeatureMap = serde_json::from_str(json)?;

    for (id, vector) in &features {
        if vector.len() != FEATURE_SIZE {
            bail!(
                "features for '{}' have length {}, expected {}",
                id,
                vector.len(),
                FEATURE_SIZE
            );
        }
    }

    Ok(features)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_id() {
        assert_eq!(image_id("1000268201_693b08cb0e.jpg#0"), "1000268201_693b08cb0e");
        assert_eq!(image_id("2513260012_03d33305cf.jpg"), "2513260012_03d33305cf");
        assert_eq!(image_id("plain"), "plain");
    }

    #[test]
    fn test_parse_token_file() {
        let text = "\
1000268201_693b08cb0e.jpg#0\tA child in a pink dress .
1000268201_693b08cb0e.jpg#1\tA girl going into a wooden building .

1001773457_577c3a7d70.jpg#0 A black dog and a spotted dog are fighting
broken_line_without_caption
";
        let set = parse_token_file(text);
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.get("1000268201_693b08cb0e").unwrap(),
            &[
                "A child in a pink dress .".to_string(),
                "A girl going into a wooden building .".to_string()
            ]
        );
        assert_eq!(set.get("1001773457_577c3a7d70").map(|c| c.len()), Some(1));
    }

    #[test]
    fn test_parse_features_checks_length() {
        let good = format!("{{\"img\": {:?}}}", vec![0.5f32; FEATURE_SIZE]);
        let features = parse_features(&good).unwrap();
        assert_eq!(features["img"].len(), FEATURE_SIZE);

        let bad = "{\"img\": [1.0, 2.0]}";
        assert!(parse_features(bad).is_err());
    }
}

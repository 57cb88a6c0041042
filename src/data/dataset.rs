use std::sync::Arc;

use burn::data::dataset::Dataset;

use crate::data::sequences::SequenceItem;
use crate::domain::features::FeatureMap;

/// One fully materialised training sample: image features,
/// left-padded word prefix, and the index of the next word.
#[derive(Debug, Clone)]
pub struct CaptionSample {
    pub features:  Vec<f32>,
    pub input_ids: Vec<u32>,
    pub target:    u32,
}

/// Next-word examples over a shared feature map. Features are
/// copied into a sample only when the data loader asks for it.
pub struct CaptionDataset {
    features: Arc<FeatureMap>,
    items:    Vec<SequenceItem>,
}

impl CaptionDataset {
    /// Items whose image has no features are dropped.
    pub fn new(features: Arc<FeatureMap>, items: Vec<SequenceItem>) -> Self {
        let before = items.len();
        let items: Vec<SequenceItem> = items
            .into_iter()
            .filter(|item| features.contains_key(&item.image_id))
            .collect();
        if items.len() < before {
            tracing::warn!(
                "Dropped {} sequences whose image has no features",
                before - items.len()
            );
        }
        Self { features, items }
    }

    pub fn sample_count(&self) -> usize { self.items.len() }
}

impl Dataset<CaptionSample> for CaptionDataset {
    fn get(&self, index: usize) -> Option<CaptionSample> {
        let item = self.items.get(index)?;
        let features = self.features.get(&item.image_id)?;
        Some(CaptionSample {
            features:  features.clone(),
            input_ids: item.input_ids.clone(),
            target:    item.target,
        })
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_without_features_are_dropped() {
        let mut features = FeatureMap::new();
        features.insert("a".to_string(), vec![1.0, 2.0]);

        let items = vec![
            SequenceItem { image_id: "a".into(), input_ids: vec![0, 1], target: 2 },
            SequenceItem { image_id: "b".into(), input_ids: vec![0, 1], target: 3 },
        ];
        let dataset = CaptionDataset::new(Arc::new(features), items);

        assert_eq!(dataset.len(), 1);
        let sample = dataset.get(0).unwrap();
        assert_eq!(sample.features, vec![1.0, 2.0]);
        assert_eq!(sample.target, 2);
        assert!(dataset.get(1).is_none());
    }
}

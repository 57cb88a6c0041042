// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Used when no explicit train/validation image lists are given.
// Splitting happens on image ids, not on individual captions or
// sequences, so all five captions of an image land on the same
// side and validation images are genuinely unseen.
//
// The shuffle is seeded so repeated runs over the same caption
// file produce the same split.
//
// Reference: rand crate documentation

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Seed used for the train/validation shuffle.
pub const SPLIT_SEED: u64 = 42;

/// Shuffle `items` with `seed` and split into (train, validation).
/// `train_fraction` is the share kept for training, e.g. 0.8.
pub fn split_train_val<T>(mut items: Vec<T>, train_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    items.shuffle(&mut rng);

    let total    = items.len();
    let split_at = ((total as f64) * train_fraction).round() as usize;
    let split_at = split_at.min(total);

    let val = items.split_off(split_at);

    tracing::debug!("Split {} items: {} train, {} validation", total, items.len(), val.len());

    (items, val)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_split_sizes() {
        let items: Vec<usize> = (0..100).collect();
        let (train, val)      = split_train_val(items, 0.8, SPLIT_SEED);
        assert_eq!(train.len(), 80);
        assert_eq!(val.len(),   20);
    }

    #[test]
    fn test_same_seed_same_split() {
        let a = split_train_val((0..30).collect::<Vec<usize>>(), 0.7, 7);
        let b = split_train_val((0..30).collect::<Vec<usize>>(), 0.7, 7);
        assert_eq!(a, b);
    }

    #[test]
    fn test_all_items_preserved() {
        let (mut train, val) = split_train_val((0..50).collect::<Vec<usize>>(), 0.7, SPLIT_SEED);
        train.extend(val);
        train.sort_unstable();
        assert_eq!(train, (0..50).collect::<Vec<usize>>());
    }

    #[test]
    fn test_empty_input() {
        let (train, val) = split_train_val(Vec::<usize>::new(), 0.8, SPLIT_SEED);
        assert!(train.is_empty());
        assert!(val.is_empty());
    }
}

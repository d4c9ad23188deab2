//! Seeded stratified partitioning of row indices.
//!
//! All partitioning is done over indices into the training matrix so callers
//! can slice features and labels consistently. Every function shuffles with
//! a caller-provided seed and returns sorted index lists, so the same seed
//! always produces the same partition.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

fn class_buckets(labels: &[usize], n_classes: usize) -> Vec<Vec<usize>> {
    let mut buckets = vec![Vec::new(); n_classes];
    for (row, &label) in labels.iter().enumerate() {
        if label < n_classes {
            buckets[label].push(row);
        }
    }
    buckets
}

/// Stratified train/test split. Each class contributes `test_size` of its
/// rows to the test side, with at least one row kept on each side.
pub fn stratified_split(
    labels: &[usize],
    n_classes: usize,
    test_size: f64,
    seed: u64,
) -> (Vec<usize>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();
    for mut bucket in class_buckets(labels, n_classes) {
        if bucket.is_empty() {
            continue;
        }
        bucket.shuffle(&mut rng);
        if bucket.len() == 1 {
            train.push(bucket[0]);
            continue;
        }
        let n_test = ((bucket.len() as f64 * test_size).round() as usize)
            .clamp(1, bucket.len() - 1);
        test.extend_from_slice(&bucket[..n_test]);
        train.extend_from_slice(&bucket[n_test..]);
    }
    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}

/// Stratified k folds: each class is shuffled and dealt round-robin so every
/// fold preserves the class proportions as closely as integer counts allow.
pub fn stratified_folds(
    labels: &[usize],
    n_classes: usize,
    k: usize,
    seed: u64,
) -> Vec<Vec<usize>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let n_folds = k.max(1);
    let mut folds = vec![Vec::new(); n_folds];
    for mut bucket in class_buckets(labels, n_classes) {
        bucket.shuffle(&mut rng);
        for (position, row) in bucket.into_iter().enumerate() {
            folds[position % n_folds].push(row);
        }
    }
    for fold in &mut folds {
        fold.sort_unstable();
    }
    folds
}

/// Downsample majority classes to the smallest class count. Returns the
/// kept row indices, sorted.
pub fn balance_downsample(labels: &[usize], n_classes: usize, seed: u64) -> Vec<usize> {
    let buckets = class_buckets(labels, n_classes);
    let min_count = buckets
        .iter()
        .filter(|bucket| !bucket.is_empty())
        .map(Vec::len)
        .min()
        .unwrap_or(0);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut kept = Vec::new();
    for mut bucket in buckets {
        bucket.shuffle(&mut rng);
        bucket.truncate(min_count);
        kept.extend(bucket);
    }
    kept.sort_unstable();
    kept
}

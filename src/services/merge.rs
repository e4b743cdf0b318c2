use std::collections::HashSet;
use std::hash::Hash;

/// Order-preserving keyed merge: items from `base` then `extra`, keeping
/// only the first occurrence of each key. Used to merge unit and modality
/// lists coming from independent sources without duplicates.
pub fn merge_by_key<T, K, F>(base: Vec<T>, extra: impl IntoIterator<Item = T>, mut key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let mut seen: HashSet<K> = HashSet::new();
    let mut merged = Vec::new();
    for item in base.into_iter().chain(extra) {
        if seen.insert(key(&item)) {
            merged.push(item);
        }
    }
    merged
}

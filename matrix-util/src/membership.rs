use fnv::FnvHashSet as HashSet;
use std::hash::Hash;

/// Unique elements in the order of their first appearance
/// * `membership` - a vector of membership (E.g., cluster assignment)
pub fn unique_in_order<T>(membership: &[T]) -> Vec<T>
where
    T: Eq + Hash + Clone,
{
    let mut seen = HashSet::default();
    membership
        .iter()
        .filter(|&k| seen.insert(k.clone()))
        .cloned()
        .collect()
}

/// 0/1 indicator vector of `membership == group`
pub fn indicator_vector<T>(membership: &[T], group: &T) -> Vec<f64>
where
    T: Eq,
{
    membership
        .iter()
        .map(|k| if k == group { 1.0 } else { 0.0 })
        .collect()
}

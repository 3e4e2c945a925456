//! Memoized component sets for subset queries.

use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use pattern_component::ComponentTypeId;

/// A materialized, shareable set of component types.
pub type ComponentSet = Rc<BTreeSet<ComponentTypeId>>;

/// Maps component-type lists to their set form.
///
/// Keys are the list content in the order given, so `[A, B]` and `[B, A]` are
/// separate entries even though they materialize to equal sets. Entries are
/// never evicted; the key space is bounded by the entity types and query
/// shapes a program actually uses.
#[derive(Debug, Default)]
pub struct SubsetQueryCache {
    sets: HashMap<Vec<ComponentTypeId>, ComponentSet>,
}

impl SubsetQueryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the set for `components`, building and remembering it on the
    /// first call. Identical content always returns the same `Rc`.
    pub fn materialize(&mut self, components: &[ComponentTypeId]) -> ComponentSet {
        if let Some(set) = self.sets.get(components) {
            return Rc::clone(set);
        }
        let set: ComponentSet = Rc::new(components.iter().copied().collect());
        self.sets.insert(components.to_vec(), Rc::clone(&set));
        set
    }

    /// Returns the set for `components` if it was materialized before.
    #[must_use]
    pub fn get(&self, components: &[ComponentTypeId]) -> Option<ComponentSet> {
        self.sets.get(components).cloned()
    }

    /// Number of distinct lists materialized so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Returns `true` if nothing has been materialized yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<ComponentTypeId> {
        names.iter().map(|name| ComponentTypeId::from_name(name)).collect()
    }

    #[test]
    fn test_same_content_yields_same_set() {
        let mut cache = SubsetQueryCache::new();
        let first = cache.materialize(&ids(&["Motion", "Visible"]));
        let second = cache.materialize(&ids(&["Motion", "Visible"]));
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_order_is_part_of_the_key() {
        let mut cache = SubsetQueryCache::new();
        let forward = cache.materialize(&ids(&["Motion", "Visible"]));
        let reverse = cache.materialize(&ids(&["Visible", "Motion"]));
        assert_eq!(forward, reverse);
        assert!(!Rc::ptr_eq(&forward, &reverse));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_duplicates_collapse_in_the_set() {
        let mut cache = SubsetQueryCache::new();
        let set = cache.materialize(&ids(&["Motion", "Motion"]));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_get_before_and_after_materialize() {
        let mut cache = SubsetQueryCache::new();
        assert!(cache.is_empty());
        assert!(cache.get(&ids(&["Motion"])).is_none());
        let set = cache.materialize(&ids(&["Motion"]));
        let cached = cache.get(&ids(&["Motion"])).unwrap();
        assert!(Rc::ptr_eq(&set, &cached));
    }

    #[test]
    fn test_empty_list_is_a_valid_key() {
        let mut cache = SubsetQueryCache::new();
        let set = cache.materialize(&[]);
        assert!(set.is_empty());
        assert_eq!(cache.len(), 1);
    }
}

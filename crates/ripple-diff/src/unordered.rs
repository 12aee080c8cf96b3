//! Diffs of keyed collections: sets and maps.
//!
//! Without an order there are no moves and no index spaces; a key names
//! the same member before and after the change.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{DiffError, DiffResult};

/// An elementary edit of a keyed collection.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum UnorderedOperation<E, K> {
    Insert { element: E, at: K },
    Delete { at: K },
    Update { at: K, element: E },
}

impl<E, K> UnorderedOperation<E, K> {
    pub fn key(&self) -> &K {
        match self {
            UnorderedOperation::Insert { at, .. }
            | UnorderedOperation::Delete { at }
            | UnorderedOperation::Update { at, .. } => at,
        }
    }
}

impl<E: fmt::Debug, K: fmt::Debug> fmt::Debug for UnorderedOperation<E, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnorderedOperation::Insert { element, at } => write!(f, "I({element:?}, at: {at:?})"),
            UnorderedOperation::Delete { at } => write!(f, "D({at:?})"),
            UnorderedOperation::Update { at, element } => write!(f, "U(at: {at:?}, with: {element:?})"),
        }
    }
}

/// Net effect of a change to a keyed collection.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnorderedDiff<K> {
    pub inserts: Vec<K>,
    pub deletes: Vec<K>,
    pub updates: Vec<K>,
}

impl<K> Default for UnorderedDiff<K> {
    fn default() -> Self {
        Self {
            inserts: Vec::new(),
            deletes: Vec::new(),
            updates: Vec::new(),
        }
    }
}

impl<K> UnorderedDiff<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inserts.len() + self.deletes.len() + self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn map<J>(self, mut f: impl FnMut(K) -> J) -> UnorderedDiff<J> {
        UnorderedDiff {
            inserts: self.inserts.into_iter().map(&mut f).collect(),
            deletes: self.deletes.into_iter().map(&mut f).collect(),
            updates: self.updates.into_iter().map(&mut f).collect(),
        }
    }
}

impl<K: Ord + Clone> UnorderedDiff<K> {
    /// A copy with every list sorted.
    pub fn canonical(&self) -> Self {
        let mut diff = self.clone();
        diff.inserts.sort();
        diff.deletes.sort();
        diff.updates.sort();
        diff
    }
}

impl<K: PartialEq + Clone + fmt::Debug> UnorderedDiff<K> {
    /// Aggregate a patch into its net effect.
    ///
    /// Edits of the same key fold together: deleting and re-inserting a key
    /// is an update, inserting and then deleting it is nothing.
    pub fn from_patch<E>(patch: &[UnorderedOperation<E, K>]) -> Self {
        let mut diff = Self::new();
        for op in patch {
            match op {
                UnorderedOperation::Insert { at, .. } => {
                    if take(&mut diff.deletes, at) {
                        diff.updates.push(at.clone());
                    } else if !diff.inserts.contains(at) && !diff.updates.contains(at) {
                        diff.inserts.push(at.clone());
                    }
                }
                UnorderedOperation::Delete { at } => {
                    if take(&mut diff.inserts, at) {
                        continue;
                    }
                    take(&mut diff.updates, at);
                    if !diff.deletes.contains(at) {
                        diff.deletes.push(at.clone());
                    }
                }
                UnorderedOperation::Update { at, .. } => {
                    if !diff.inserts.contains(at)
                        && !diff.updates.contains(at)
                        && !diff.deletes.contains(at)
                    {
                        diff.updates.push(at.clone());
                    }
                }
            }
        }
        trace!(operations = patch.len(), entries = diff.len(), "unordered diff from patch");
        diff
    }

    /// Generate a patch that turns the source collection into `collection`:
    /// updates, then deletions, then insertions.
    pub fn generate_patch<C>(&self, collection: &C) -> DiffResult<Vec<UnorderedOperation<C::Element, K>>>
    where
        C: UnorderedCollection<Key = K>,
    {
        let lookup = |key: &K| {
            collection.element(key).ok_or_else(|| DiffError::MissingElement {
                index: format!("{key:?}"),
            })
        };
        let mut patch = Vec::with_capacity(self.len());
        for key in &self.updates {
            patch.push(UnorderedOperation::Update {
                at: key.clone(),
                element: lookup(key)?,
            });
        }
        for key in &self.deletes {
            patch.push(UnorderedOperation::Delete { at: key.clone() });
        }
        for key in &self.inserts {
            patch.push(UnorderedOperation::Insert {
                element: lookup(key)?,
                at: key.clone(),
            });
        }
        Ok(patch)
    }
}

impl<K: fmt::Debug> fmt::Debug for UnorderedDiff<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Inserts: {:?}, Deletes: {:?}, Updates: {:?}",
            self.inserts, self.deletes, self.updates
        )
    }
}

fn take<K: PartialEq>(keys: &mut Vec<K>, key: &K) -> bool {
    match keys.iter().position(|k| k == key) {
        Some(i) => {
            keys.remove(i);
            true
        }
        None => false,
    }
}

/// A collection addressed by key.
///
/// For sets the key is the member itself; for maps it is the map key and
/// the element is the value stored under it.
pub trait UnorderedCollection {
    type Key: Clone + PartialEq + fmt::Debug;
    type Element: Clone;

    fn element(&self, key: &Self::Key) -> Option<Self::Element>;

    fn contains_key(&self, key: &Self::Key) -> bool {
        self.element(key).is_some()
    }

    /// Every key, in iteration order.
    fn keys(&self) -> Vec<Self::Key>;

    /// Replay a single operation. Deleting an absent key does nothing.
    fn apply(&mut self, op: UnorderedOperation<Self::Element, Self::Key>);

    fn apply_patch(&mut self, patch: impl IntoIterator<Item = UnorderedOperation<Self::Element, Self::Key>>) {
        for op in patch {
            self.apply(op);
        }
    }
}

impl<T: Ord + Clone + fmt::Debug> UnorderedCollection for BTreeSet<T> {
    type Key = T;
    type Element = T;

    fn element(&self, key: &T) -> Option<T> {
        self.get(key).cloned()
    }

    fn keys(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    fn apply(&mut self, op: UnorderedOperation<T, T>) {
        match op {
            UnorderedOperation::Insert { element, .. } => {
                self.insert(element);
            }
            UnorderedOperation::Delete { at } => {
                self.remove(&at);
            }
            UnorderedOperation::Update { at, element } => {
                self.remove(&at);
                self.insert(element);
            }
        }
    }
}

impl<T: Eq + Hash + Clone + fmt::Debug> UnorderedCollection for HashSet<T> {
    type Key = T;
    type Element = T;

    fn element(&self, key: &T) -> Option<T> {
        self.get(key).cloned()
    }

    fn keys(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    fn apply(&mut self, op: UnorderedOperation<T, T>) {
        match op {
            UnorderedOperation::Insert { element, .. } => {
                self.insert(element);
            }
            UnorderedOperation::Delete { at } => {
                self.remove(&at);
            }
            UnorderedOperation::Update { at, element } => {
                self.remove(&at);
                self.insert(element);
            }
        }
    }
}

impl<K: Ord + Clone + fmt::Debug, V: Clone> UnorderedCollection for BTreeMap<K, V> {
    type Key = K;
    type Element = V;

    fn element(&self, key: &K) -> Option<V> {
        self.get(key).cloned()
    }

    fn keys(&self) -> Vec<K> {
        BTreeMap::keys(self).cloned().collect()
    }

    fn apply(&mut self, op: UnorderedOperation<V, K>) {
        match op {
            UnorderedOperation::Insert { element, at } | UnorderedOperation::Update { at, element } => {
                self.insert(at, element);
            }
            UnorderedOperation::Delete { at } => {
                self.remove(&at);
            }
        }
    }
}

impl<K: Eq + Hash + Clone + fmt::Debug, V: Clone> UnorderedCollection for HashMap<K, V> {
    type Key = K;
    type Element = V;

    fn element(&self, key: &K) -> Option<V> {
        self.get(key).cloned()
    }

    fn keys(&self) -> Vec<K> {
        HashMap::keys(self).cloned().collect()
    }

    fn apply(&mut self, op: UnorderedOperation<V, K>) {
        match op {
            UnorderedOperation::Insert { element, at } | UnorderedOperation::Update { at, element } => {
                self.insert(at, element);
            }
            UnorderedOperation::Delete { at } => {
                self.remove(&at);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    type MapOp = UnorderedOperation<i32, &'static str>;

    fn insert(key: &'static str, value: i32) -> MapOp {
        UnorderedOperation::Insert { element: value, at: key }
    }

    fn update(key: &'static str, value: i32) -> MapOp {
        UnorderedOperation::Update { at: key, element: value }
    }

    fn delete(key: &'static str) -> MapOp {
        UnorderedOperation::Delete { at: key }
    }

    #[test]
    fn edits_of_one_key_fold_together() {
        let diff = UnorderedDiff::from_patch(&[insert("a", 1), delete("a")]);
        assert!(diff.is_empty());

        let diff = UnorderedDiff::from_patch(&[delete("a"), insert("a", 2)]);
        assert_eq!(diff.updates, vec!["a"]);
        assert!(diff.inserts.is_empty() && diff.deletes.is_empty());

        let diff = UnorderedDiff::from_patch(&[update("a", 2), delete("a")]);
        assert_eq!(diff.deletes, vec!["a"]);
        assert!(diff.updates.is_empty());

        let diff = UnorderedDiff::from_patch(&[insert("a", 1), update("a", 2)]);
        assert_eq!(diff.inserts, vec!["a"]);
        assert!(diff.updates.is_empty());
    }

    #[test]
    fn map_patch_roundtrip() {
        let initial: BTreeMap<&str, i32> = [("a", 1), ("b", 2), ("c", 3)].into_iter().collect();
        let ops = vec![update("a", 10), delete("b"), insert("d", 4), delete("c"), insert("c", 30)];

        let mut expected = initial.clone();
        expected.apply_patch(ops.clone());

        let diff = UnorderedDiff::from_patch(&ops);
        assert_eq!(diff.canonical(), UnorderedDiff {
            inserts: vec!["d"],
            deletes: vec!["b"],
            updates: vec!["a", "c"],
        });

        let mut replayed = initial;
        replayed.apply_patch(diff.generate_patch(&expected).unwrap());
        assert_eq!(replayed, expected);
    }

    #[test]
    fn set_patch_roundtrip() {
        let initial: HashSet<i32> = [1, 2, 3].into_iter().collect();
        let ops = vec![
            UnorderedOperation::Delete { at: 2 },
            UnorderedOperation::Insert { element: 7, at: 7 },
        ];
        let mut expected = initial.clone();
        expected.apply_patch(ops.clone());

        let diff = UnorderedDiff::from_patch(&ops);
        let mut replayed = initial;
        replayed.apply_patch(diff.generate_patch(&expected).unwrap());
        assert_eq!(replayed, expected);
    }

    #[test]
    fn missing_element_is_an_error() {
        let diff = UnorderedDiff {
            inserts: vec![9],
            deletes: vec![],
            updates: vec![],
        };
        let set: BTreeSet<i32> = BTreeSet::new();
        assert!(matches!(diff.generate_patch(&set), Err(DiffError::MissingElement { .. })));
    }

    #[test]
    fn operation_serde_shape() {
        let json = serde_json::to_value(insert("a", 1)).unwrap();
        assert_eq!(json, serde_json::json!({"op": "insert", "element": 1, "at": "a"}));
    }

    proptest! {
        #[test]
        fn random_map_patches_roundtrip(raw in prop::collection::vec((0u8..3, 0usize..4, 0i32..100), 0..12)) {
            const KEYS: [&str; 4] = ["a", "b", "c", "d"];
            let initial: BTreeMap<&str, i32> = [("a", 1), ("b", 2)].into_iter().collect();
            let mut map = initial.clone();
            let mut ops = Vec::new();
            for (kind, key, value) in raw {
                let key = KEYS[key];
                let op = match (kind, map.contains_key(key)) {
                    (0, false) => insert(key, value),
                    (1, true) => delete(key),
                    (_, true) => update(key, value),
                    _ => continue,
                };
                map.apply(op.clone());
                ops.push(op);
            }
            let diff = UnorderedDiff::from_patch(&ops);
            let mut replayed = initial;
            replayed.apply_patch(diff.generate_patch(&map).unwrap());
            prop_assert_eq!(replayed, map);
        }
    }
}

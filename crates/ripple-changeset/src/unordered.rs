//! Mutators for tracked sets and maps.
//!
//! Removing an absent key or inserting a member a set already holds is a
//! no-op: nothing is published.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use ripple_diff::{UnorderedCollection, UnorderedOperation};

use crate::container::ChangesetContainer;
use crate::error::ChangesetResult;
use crate::trackable::Trackable;

type KeyedOperation<C> = UnorderedOperation<<C as UnorderedCollection>::Element, <C as UnorderedCollection>::Key>;

/// Insert `element` under `key`. An existing entry is updated when
/// `overwrite` is set and left alone otherwise.
fn insert_keyed<C>(
    container: &ChangesetContainer<C>,
    key: C::Key,
    element: C::Element,
    overwrite: bool,
) -> ChangesetResult<Option<C::Element>>
where
    C: UnorderedCollection + Trackable<Operation = KeyedOperation<C>>,
{
    container.descriptive_update(|collection| {
        let previous = collection.element(&key);
        let op = match previous {
            Some(_) if !overwrite => return Ok((Vec::new(), previous)),
            Some(_) => UnorderedOperation::Update { at: key, element },
            None => UnorderedOperation::Insert { element, at: key },
        };
        collection.apply_operation(op.clone())?;
        Ok((vec![op], previous))
    })
}

fn remove_keyed<C>(container: &ChangesetContainer<C>, key: &C::Key) -> ChangesetResult<Option<C::Element>>
where
    C: UnorderedCollection + Trackable<Operation = KeyedOperation<C>>,
{
    container.descriptive_update(|collection| {
        let Some(element) = collection.element(key) else {
            return Ok((Vec::new(), None));
        };
        let op = UnorderedOperation::Delete { at: key.clone() };
        collection.apply_operation(op.clone())?;
        Ok((vec![op], Some(element)))
    })
}

fn remove_all_keyed<C>(container: &ChangesetContainer<C>) -> ChangesetResult<Vec<(C::Key, C::Element)>>
where
    C: UnorderedCollection + Trackable<Operation = KeyedOperation<C>>,
{
    container.descriptive_update(|collection| {
        let mut patch = Vec::new();
        let mut removed = Vec::new();
        for key in collection.keys() {
            if let Some(element) = collection.element(&key) {
                patch.push(UnorderedOperation::Delete { at: key.clone() });
                removed.push((key, element));
            }
        }
        for op in &patch {
            collection.apply_operation(op.clone())?;
        }
        Ok((patch, removed))
    })
}

impl<T> ChangesetContainer<BTreeSet<T>>
where
    T: Ord + Clone + fmt::Debug + Send + Sync + 'static,
{
    pub fn len(&self) -> usize {
        self.with_collection(BTreeSet::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, member: &T) -> bool {
        self.with_collection(|set| set.contains(member))
    }

    /// Add `member`. Returns `false` if it was already present.
    pub fn insert(&self, member: T) -> ChangesetResult<bool> {
        insert_keyed(self, member.clone(), member, false).map(|previous| previous.is_none())
    }

    pub fn remove(&self, member: &T) -> ChangesetResult<Option<T>> {
        remove_keyed(self, member)
    }

    pub fn remove_all(&self) -> ChangesetResult<Vec<T>> {
        remove_all_keyed(self).map(|removed| removed.into_iter().map(|(member, _)| member).collect())
    }
}

impl<T> ChangesetContainer<HashSet<T>>
where
    T: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
{
    pub fn len(&self) -> usize {
        self.with_collection(HashSet::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, member: &T) -> bool {
        self.with_collection(|set| set.contains(member))
    }

    /// Add `member`. Returns `false` if it was already present.
    pub fn insert(&self, member: T) -> ChangesetResult<bool> {
        insert_keyed(self, member.clone(), member, false).map(|previous| previous.is_none())
    }

    pub fn remove(&self, member: &T) -> ChangesetResult<Option<T>> {
        remove_keyed(self, member)
    }

    pub fn remove_all(&self) -> ChangesetResult<Vec<T>> {
        remove_all_keyed(self).map(|removed| removed.into_iter().map(|(member, _)| member).collect())
    }
}

impl<K, V> ChangesetContainer<BTreeMap<K, V>>
where
    K: Ord + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + fmt::Debug + Send + Sync + 'static,
{
    pub fn len(&self) -> usize {
        self.with_collection(BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.with_collection(|map| map.get(key).cloned())
    }

    /// Store `value` under `key`, returning the value it replaced. Replacing
    /// is published as an update.
    pub fn insert(&self, key: K, value: V) -> ChangesetResult<Option<V>> {
        insert_keyed(self, key, value, true)
    }

    pub fn remove(&self, key: &K) -> ChangesetResult<Option<V>> {
        remove_keyed(self, key)
    }

    pub fn remove_all(&self) -> ChangesetResult<Vec<(K, V)>> {
        remove_all_keyed(self)
    }
}

impl<K, V> ChangesetContainer<HashMap<K, V>>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + fmt::Debug + Send + Sync + 'static,
{
    pub fn len(&self) -> usize {
        self.with_collection(HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.with_collection(|map| map.get(key).cloned())
    }

    /// Store `value` under `key`, returning the value it replaced. Replacing
    /// is published as an update.
    pub fn insert(&self, key: K, value: V) -> ChangesetResult<Option<V>> {
        insert_keyed(self, key, value, true)
    }

    pub fn remove(&self, key: &K) -> ChangesetResult<Option<V>> {
        remove_keyed(self, key)
    }

    pub fn remove_all(&self) -> ChangesetResult<Vec<(K, V)>> {
        remove_all_keyed(self)
    }
}

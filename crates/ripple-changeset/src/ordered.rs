//! Mutators for tracked lists.

use std::fmt;
use std::ops::Range;

use ripple_diff::{diff_slices_by, Move, OrderedDiff};
use ripple_types::{IndexError, Operation};

use crate::container::ChangesetContainer;
use crate::error::ChangesetResult;

fn check(index: usize, bound: usize, len: usize) -> Result<(), IndexError> {
    if index < bound {
        Ok(())
    } else {
        Err(IndexError::OutOfBounds { index, len })
    }
}

impl<T> ChangesetContainer<Vec<T>>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    pub fn len(&self) -> usize {
        self.with_collection(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, at: usize) -> Option<T> {
        self.with_collection(|items| items.get(at).cloned())
    }

    pub fn append(&self, value: T) -> ChangesetResult<()> {
        self.descriptive_update(|items| {
            let at = items.len();
            items.push(value.clone());
            Ok((vec![Operation::Insert { element: value, at }], ()))
        })
    }

    pub fn insert(&self, value: T, at: usize) -> ChangesetResult<()> {
        self.descriptive_update(|items| {
            check(at, items.len() + 1, items.len())?;
            items.insert(at, value.clone());
            Ok((vec![Operation::Insert { element: value, at }], ()))
        })
    }

    /// Insert `values` as consecutive elements starting at `at`.
    pub fn insert_many(&self, values: Vec<T>, at: usize) -> ChangesetResult<()> {
        self.descriptive_update(|items| {
            check(at, items.len() + 1, items.len())?;
            let patch = values
                .iter()
                .enumerate()
                .map(|(k, value)| Operation::Insert {
                    element: value.clone(),
                    at: at + k,
                })
                .collect();
            items.splice(at..at, values);
            Ok((patch, ()))
        })
    }

    /// Remove and return the element at `at`.
    pub fn remove(&self, at: usize) -> ChangesetResult<T> {
        self.descriptive_update(|items| {
            check(at, items.len(), items.len())?;
            let element = items.remove(at);
            Ok((vec![Operation::Delete { at }], element))
        })
    }

    /// Remove and return the last element, if any.
    pub fn remove_last(&self) -> ChangesetResult<Option<T>> {
        self.descriptive_update(|items| match items.pop() {
            Some(element) => Ok((vec![Operation::Delete { at: items.len() }], Some(element))),
            None => Ok((Vec::new(), None)),
        })
    }

    pub fn remove_all(&self) -> ChangesetResult<Vec<T>> {
        self.descriptive_update(|items| {
            let patch = (0..items.len()).rev().map(|at| Operation::Delete { at }).collect();
            Ok((patch, std::mem::take(items)))
        })
    }

    /// Remove and return the elements in `range`. An empty range is a no-op.
    pub fn remove_range(&self, range: Range<usize>) -> ChangesetResult<Vec<T>> {
        self.descriptive_update(|items| {
            if range.start > range.end {
                return Err(IndexError::OutOfBounds {
                    index: range.start,
                    len: items.len(),
                }
                .into());
            }
            check(range.end, items.len() + 1, items.len())?;
            let patch = range.clone().rev().map(|at| Operation::Delete { at }).collect();
            Ok((patch, items.drain(range).collect()))
        })
    }

    /// Move the element at `from` so it ends up at `to`.
    pub fn move_item(&self, from: usize, to: usize) -> ChangesetResult<()> {
        self.descriptive_update(|items| {
            check(from, items.len(), items.len())?;
            check(to, items.len(), items.len())?;
            let element = items.remove(from);
            items.insert(to, element);
            Ok((vec![Operation::Move { from, to }], ()))
        })
    }

    /// Move the elements at `from` so they end up consecutively, in the
    /// given order, starting at `to`.
    pub fn move_many(&self, from: &[usize], to: usize) -> ChangesetResult<()> {
        self.descriptive_update(|items| {
            let len = items.len();
            for (i, &index) in from.iter().enumerate() {
                check(index, len, len)?;
                if from[..i].contains(&index) {
                    return Err(IndexError::OverlappingSources(format!("{from:?}")).into());
                }
            }
            check(to + from.len(), len + 1, len)?;

            let moved: Vec<T> = from.iter().map(|&index| items[index].clone()).collect();
            let mut sorted = from.to_vec();
            sorted.sort_unstable();
            for &index in sorted.iter().rev() {
                items.remove(index);
            }
            items.splice(to..to, moved);

            let diff = OrderedDiff::with_moves(
                from.iter()
                    .enumerate()
                    .map(|(k, &index)| Move::new(index, to + k))
                    .collect(),
            );
            Ok((diff.generate_patch(&*items)?, ()))
        })
    }

    /// Replace the element at `at`, returning the previous one.
    pub fn set(&self, at: usize, value: T) -> ChangesetResult<T> {
        self.descriptive_update(|items| {
            check(at, items.len(), items.len())?;
            let previous = std::mem::replace(&mut items[at], value.clone());
            Ok((vec![Operation::Update { at, element: value }], previous))
        })
    }

    /// Replace the whole list. With `perform_diff` observers receive the
    /// difference between the two lists instead of a reload.
    pub fn replace_with_diff(&self, with: Vec<T>, perform_diff: bool) -> ChangesetResult<()>
    where
        T: PartialEq,
    {
        if perform_diff {
            self.replace_with_diff_by(with, |a, b| a == b)
        } else {
            self.replace(with)
        }
    }

    /// Replace the whole list, diffing with a caller-supplied equality.
    pub fn replace_with_diff_by(&self, with: Vec<T>, eq: impl Fn(&T, &T) -> bool) -> ChangesetResult<()> {
        let diff = self.with_collection(|items| diff_slices_by(items, &with, eq, &self.config().diff));
        self.replace_described(with, diff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChangesetError;
    use crate::router::ChangesetStream;
    use crate::trackable::Trackable;
    use proptest::prelude::*;
    use ripple_types::OrderedCollection;

    fn container<T: Clone + fmt::Debug + Send + Sync + 'static>(
        items: Vec<T>,
    ) -> (ChangesetContainer<Vec<T>>, ChangesetStream<Vec<T>>) {
        let container = ChangesetContainer::new(items);
        let mut stream = container.subscribe();
        let _ = stream.try_recv();
        (container, stream)
    }

    /// The published patch replays `before` into the published collection.
    fn assert_replays<T: Clone + PartialEq + fmt::Debug + Send + Sync + 'static>(
        before: &[T],
        stream: &mut ChangesetStream<Vec<T>>,
    ) {
        let changeset = stream.try_recv().unwrap();
        let mut replayed = before.to_vec();
        replayed.apply_patch(changeset.patch().unwrap().to_vec()).unwrap();
        assert_eq!(&replayed, changeset.collection());
    }

    #[test]
    fn insert_in_the_middle() {
        let (list, mut stream) = container(vec![1, 2, 3]);
        list.insert(9, 1).unwrap();
        let changeset = stream.try_recv().unwrap();
        assert_eq!(changeset.patch().unwrap(), &[Operation::Insert { element: 9, at: 1 }]);
        assert_eq!(changeset.diff().unwrap().inserts, vec![1]);
        assert_eq!(changeset.collection(), &vec![1, 9, 2, 3]);
    }

    #[test]
    fn replace_element_by_delete_and_insert() {
        let list = ChangesetContainer::new(vec![1, 2, 3]);
        list.batch_update(|list| {
            list.remove(1)?;
            list.insert(5, 1)
        })
        .unwrap();
        let changeset = list.changeset();
        let diff = changeset.diff().unwrap();
        assert_eq!(diff.deletes, vec![1]);
        assert_eq!(diff.inserts, vec![1]);
        assert_eq!(changeset.collection(), &vec![1, 5, 3]);
    }

    #[test]
    fn move_first_to_last() {
        let (list, mut stream) = container(vec!['A', 'B', 'C']);
        list.move_item(0, 2).unwrap();
        let changeset = stream.try_recv().unwrap();
        assert_eq!(changeset.diff().unwrap(), &OrderedDiff::with_moves(vec![Move::new(0, 2)]));
        assert_eq!(changeset.collection(), &vec!['B', 'C', 'A']);

        let regenerated = changeset.collection().patch_from_diff(changeset.diff().unwrap()).unwrap();
        let mut replayed = vec!['A', 'B', 'C'];
        replayed.apply_patch(regenerated).unwrap();
        assert_eq!(replayed, vec!['B', 'C', 'A']);
    }

    #[test]
    fn update_of_moved_element_is_delete_and_insert() {
        let list = ChangesetContainer::new(vec!['a', 'b', 'c']);
        list.batch_update(|list| {
            list.move_item(2, 0)?;
            list.set(0, 'x').map(|_| ())
        })
        .unwrap();
        let changeset = list.changeset();
        let diff = changeset.diff().unwrap();
        assert_eq!(diff.deletes, vec![2]);
        assert_eq!(diff.inserts, vec![0]);
        assert!(diff.moves.is_empty() && diff.updates.is_empty());
    }

    #[test]
    fn removals_return_elements() {
        let (list, mut stream) = container(vec![1, 2, 3, 4, 5]);
        assert_eq!(list.remove(0).unwrap(), 1);
        assert_replays(&[1, 2, 3, 4, 5], &mut stream);
        assert_eq!(list.remove_last().unwrap(), Some(5));
        assert_replays(&[2, 3, 4, 5], &mut stream);
        assert_eq!(list.remove_range(1..3).unwrap(), vec![3, 4]);
        assert_replays(&[2, 3, 4], &mut stream);
        assert_eq!(list.remove_all().unwrap(), vec![2]);
        assert_replays(&[2], &mut stream);
        assert!(list.is_empty());
    }

    #[test]
    fn no_op_removals_publish_nothing() {
        let (list, mut stream) = container(vec![1, 2]);
        assert_eq!(list.remove_range(1..1).unwrap(), Vec::<i32>::new());
        let (empty, mut empty_stream) = container(Vec::<i32>::new());
        assert_eq!(empty.remove_last().unwrap(), None);
        assert_eq!(empty.remove_all().unwrap(), Vec::<i32>::new());
        assert!(stream.try_recv().is_err());
        assert!(empty_stream.try_recv().is_err());
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn out_of_range_fails_without_mutation() {
        let (list, mut stream) = container(vec![1, 2, 3]);
        assert_eq!(
            list.insert(0, 4).unwrap_err(),
            ChangesetError::Index(IndexError::OutOfBounds { index: 4, len: 3 })
        );
        assert!(list.remove(3).is_err());
        assert!(list.move_item(0, 3).is_err());
        assert!(list.set(5, 0).is_err());
        assert!(list.remove_range(2..5).is_err());
        assert!(list.insert_many(vec![7], 9).is_err());
        assert!(list.move_many(&[0, 0], 1).is_err());
        assert!(list.move_many(&[0, 1], 2).is_err());
        assert!(stream.try_recv().is_err());
        assert_eq!(list.collection(), vec![1, 2, 3]);
    }

    #[test]
    fn insert_many_and_append() {
        let (list, mut stream) = container(vec!['a', 'd']);
        list.insert_many(vec!['b', 'c'], 1).unwrap();
        assert_replays(&['a', 'd'], &mut stream);
        list.append('e').unwrap();
        assert_replays(&['a', 'b', 'c', 'd'], &mut stream);
        assert_eq!(list.collection(), vec!['a', 'b', 'c', 'd', 'e']);
        assert_eq!(list.get(4), Some('e'));
    }

    #[test]
    fn move_many_keeps_given_order() {
        let (list, mut stream) = container(vec!['a', 'b', 'c', 'd', 'e']);
        list.move_many(&[4, 0], 1).unwrap();
        assert_eq!(list.collection(), vec!['b', 'e', 'a', 'c', 'd']);
        assert_replays(&['a', 'b', 'c', 'd', 'e'], &mut stream);
    }

    #[test]
    fn set_returns_previous() {
        let (list, mut stream) = container(vec![1, 2]);
        assert_eq!(list.set(1, 7).unwrap(), 2);
        let changeset = stream.try_recv().unwrap();
        assert_eq!(changeset.diff().unwrap().updates, vec![1]);
    }

    #[test]
    fn replace_with_and_without_diff() {
        let (list, mut stream) = container(vec![1, 2, 3]);
        list.replace_with_diff(vec![3, 1, 2, 4], true).unwrap();
        assert_replays(&[1, 2, 3], &mut stream);

        list.replace_with_diff(vec![3, 1, 2, 4], true).unwrap();
        assert!(stream.try_recv().is_err());

        list.replace_with_diff(vec![0], false).unwrap();
        assert!(stream.try_recv().unwrap().is_reload());
    }

    #[test]
    fn replace_with_custom_equality() {
        let (list, mut stream) = container(vec![(1, "a"), (2, "b")]);
        list.replace_with_diff_by(vec![(2, "B"), (1, "a")], |x, y| x.0 == y.0).unwrap();
        let changeset = stream.try_recv().unwrap();
        assert!(changeset.diff().unwrap().inserts.is_empty());
        assert_eq!(list.get(0), Some((2, "B")));
    }

    proptest! {
        #[test]
        fn random_mutations_publish_replayable_patches(raw in prop::collection::vec((0u8..6, 0usize..8, 0usize..8, 0i32..50), 1..20)) {
            let (list, mut stream) = container(vec![1, 2, 3]);
            for (kind, a, b, value) in raw {
                let before = list.collection();
                let len = before.len();
                let result = match kind {
                    0 => list.insert(value, a % (len + 1)),
                    1 if len > 0 => list.remove(a % len).map(|_| ()),
                    2 if len > 0 => list.move_item(a % len, b % len),
                    3 if len > 0 => list.set(a % len, value).map(|_| ()),
                    4 => list.append(value),
                    _ => list.remove_last().map(|_| ()),
                };
                prop_assert!(result.is_ok());
                if let Ok(changeset) = stream.try_recv() {
                    let mut replayed = before.clone();
                    replayed.apply_patch(changeset.patch().unwrap().to_vec()).unwrap();
                    prop_assert_eq!(&replayed, changeset.collection());
                }
            }
        }
    }
}

//! Collections a container can track.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use ripple_diff::{DiffIndex, DiffResult, OrderedDiff, UnorderedCollection, UnorderedDiff, UnorderedOperation};
use ripple_types::{Array2D, IndexPath, IndexResult, Operation, OrderedCollection, Tree, TreeArray, TreeNode};

/// A collection whose changes can be described both as a patch and as a
/// diff, and converted from one description to the other.
pub trait Trackable: Clone + Send + Sync + 'static {
    /// Elementary edit of the collection.
    type Operation: Clone + fmt::Debug + Send + Sync + 'static;
    /// Aggregated description of a change.
    type Diff: Clone + fmt::Debug + Send + Sync + 'static;

    /// Replay one operation. Fails without touching the collection.
    fn apply_operation(&mut self, op: Self::Operation) -> IndexResult<()>;

    /// Aggregate a patch into a diff.
    fn diff_from_patch(patch: &[Self::Operation]) -> DiffResult<Self::Diff>;

    /// Generate a patch from `diff`; `self` is the collection after the
    /// change.
    fn patch_from_diff(&self, diff: &Self::Diff) -> DiffResult<Vec<Self::Operation>>;

    fn diff_is_empty(diff: &Self::Diff) -> bool;
}

/// Tree collections with the plain tree mutator surface.
///
/// [`Array2D`] is a tree as well but gets its own section/item surface.
pub trait TrackedTree: Tree {}

impl<V> TrackedTree for TreeNode<V> {}
impl<V> TrackedTree for TreeArray<V> {}

fn ordered_diff<C>(patch: &[Operation<C::Element, C::Index>]) -> DiffResult<OrderedDiff<C::Index>>
where
    C: OrderedCollection,
    C::Index: DiffIndex,
{
    OrderedDiff::from_patch(patch)
}

impl<T> Trackable for Vec<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    type Operation = Operation<T, usize>;
    type Diff = OrderedDiff<usize>;

    fn apply_operation(&mut self, op: Self::Operation) -> IndexResult<()> {
        self.apply(op)
    }

    fn diff_from_patch(patch: &[Self::Operation]) -> DiffResult<Self::Diff> {
        ordered_diff::<Self>(patch)
    }

    fn patch_from_diff(&self, diff: &Self::Diff) -> DiffResult<Vec<Self::Operation>> {
        diff.generate_patch(self)
    }

    fn diff_is_empty(diff: &Self::Diff) -> bool {
        diff.is_empty()
    }
}

impl<V> Trackable for TreeNode<V>
where
    V: Clone + fmt::Debug + Send + Sync + 'static,
{
    type Operation = Operation<TreeNode<V>, IndexPath>;
    type Diff = OrderedDiff<IndexPath>;

    fn apply_operation(&mut self, op: Self::Operation) -> IndexResult<()> {
        self.apply(op)
    }

    fn diff_from_patch(patch: &[Self::Operation]) -> DiffResult<Self::Diff> {
        ordered_diff::<Self>(patch)
    }

    fn patch_from_diff(&self, diff: &Self::Diff) -> DiffResult<Vec<Self::Operation>> {
        diff.generate_patch(self)
    }

    fn diff_is_empty(diff: &Self::Diff) -> bool {
        diff.is_empty()
    }
}

impl<V> Trackable for TreeArray<V>
where
    V: Clone + fmt::Debug + Send + Sync + 'static,
{
    type Operation = Operation<TreeNode<V>, IndexPath>;
    type Diff = OrderedDiff<IndexPath>;

    fn apply_operation(&mut self, op: Self::Operation) -> IndexResult<()> {
        self.apply(op)
    }

    fn diff_from_patch(patch: &[Self::Operation]) -> DiffResult<Self::Diff> {
        ordered_diff::<Self>(patch)
    }

    fn patch_from_diff(&self, diff: &Self::Diff) -> DiffResult<Vec<Self::Operation>> {
        diff.generate_patch(self)
    }

    fn diff_is_empty(diff: &Self::Diff) -> bool {
        diff.is_empty()
    }
}

impl<S, T> Trackable for Array2D<S, T>
where
    S: Clone + fmt::Debug + Send + Sync + 'static,
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    type Operation = Operation<ripple_types::Array2DNode<S, T>, IndexPath>;
    type Diff = OrderedDiff<IndexPath>;

    fn apply_operation(&mut self, op: Self::Operation) -> IndexResult<()> {
        self.apply(op)
    }

    fn diff_from_patch(patch: &[Self::Operation]) -> DiffResult<Self::Diff> {
        ordered_diff::<Self>(patch)
    }

    fn patch_from_diff(&self, diff: &Self::Diff) -> DiffResult<Vec<Self::Operation>> {
        diff.generate_patch(self)
    }

    fn diff_is_empty(diff: &Self::Diff) -> bool {
        diff.is_empty()
    }
}

fn keyed_apply<C: UnorderedCollection>(collection: &mut C, op: UnorderedOperation<C::Element, C::Key>) -> IndexResult<()> {
    UnorderedCollection::apply(collection, op);
    Ok(())
}

impl<T> Trackable for BTreeSet<T>
where
    T: Ord + Clone + fmt::Debug + Send + Sync + 'static,
{
    type Operation = UnorderedOperation<T, T>;
    type Diff = UnorderedDiff<T>;

    fn apply_operation(&mut self, op: Self::Operation) -> IndexResult<()> {
        keyed_apply(self, op)
    }

    fn diff_from_patch(patch: &[Self::Operation]) -> DiffResult<Self::Diff> {
        Ok(UnorderedDiff::from_patch(patch))
    }

    fn patch_from_diff(&self, diff: &Self::Diff) -> DiffResult<Vec<Self::Operation>> {
        diff.generate_patch(self)
    }

    fn diff_is_empty(diff: &Self::Diff) -> bool {
        diff.is_empty()
    }
}

impl<T> Trackable for HashSet<T>
where
    T: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
{
    type Operation = UnorderedOperation<T, T>;
    type Diff = UnorderedDiff<T>;

    fn apply_operation(&mut self, op: Self::Operation) -> IndexResult<()> {
        keyed_apply(self, op)
    }

    fn diff_from_patch(patch: &[Self::Operation]) -> DiffResult<Self::Diff> {
        Ok(UnorderedDiff::from_patch(patch))
    }

    fn patch_from_diff(&self, diff: &Self::Diff) -> DiffResult<Vec<Self::Operation>> {
        diff.generate_patch(self)
    }

    fn diff_is_empty(diff: &Self::Diff) -> bool {
        diff.is_empty()
    }
}

impl<K, V> Trackable for BTreeMap<K, V>
where
    K: Ord + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + fmt::Debug + Send + Sync + 'static,
{
    type Operation = UnorderedOperation<V, K>;
    type Diff = UnorderedDiff<K>;

    fn apply_operation(&mut self, op: Self::Operation) -> IndexResult<()> {
        keyed_apply(self, op)
    }

    fn diff_from_patch(patch: &[Self::Operation]) -> DiffResult<Self::Diff> {
        Ok(UnorderedDiff::from_patch(patch))
    }

    fn patch_from_diff(&self, diff: &Self::Diff) -> DiffResult<Vec<Self::Operation>> {
        diff.generate_patch(self)
    }

    fn diff_is_empty(diff: &Self::Diff) -> bool {
        diff.is_empty()
    }
}

impl<K, V> Trackable for HashMap<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + fmt::Debug + Send + Sync + 'static,
{
    type Operation = UnorderedOperation<V, K>;
    type Diff = UnorderedDiff<K>;

    fn apply_operation(&mut self, op: Self::Operation) -> IndexResult<()> {
        keyed_apply(self, op)
    }

    fn diff_from_patch(patch: &[Self::Operation]) -> DiffResult<Self::Diff> {
        Ok(UnorderedDiff::from_patch(patch))
    }

    fn patch_from_diff(&self, diff: &Self::Diff) -> DiffResult<Vec<Self::Operation>> {
        diff.generate_patch(self)
    }

    fn diff_is_empty(diff: &Self::Diff) -> bool {
        diff.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_conversions() {
        let patch = vec![Operation::Insert { element: 'x', at: 1 }];
        let diff = Vec::<char>::diff_from_patch(&patch).unwrap();
        assert_eq!(diff.inserts, vec![1]);
        let regenerated = vec!['a', 'x', 'b'].patch_from_diff(&diff).unwrap();
        assert_eq!(regenerated, patch);
    }

    #[test]
    fn map_conversions() {
        let patch = vec![UnorderedOperation::Insert { element: 1, at: "a" }];
        let diff = BTreeMap::<&str, i32>::diff_from_patch(&patch).unwrap();
        assert_eq!(diff.inserts, vec!["a"]);
        let map: BTreeMap<&str, i32> = [("a", 1)].into_iter().collect();
        assert_eq!(map.patch_from_diff(&diff).unwrap(), patch);
    }

    #[test]
    fn failed_operation_leaves_collection() {
        let mut tree = TreeArray::new(vec![TreeNode::new(1)]);
        let err = tree.apply_operation(Operation::Delete {
            at: IndexPath::from([3]),
        });
        assert!(err.is_err());
        assert_eq!(tree.node_count(), 1);
    }
}

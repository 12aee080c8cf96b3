//! Aggregated diff of an ordered collection and the generic half of the
//! patch/diff converter.
//!
//! The index-specific algorithms live in [`crate::linear`] and
//! [`crate::tree`]; this module turns their index-only results into
//! element-carrying patches.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use ripple_types::{index_ops, simulate_patch, IndexOp, Operation, OrderedCollection, Position};

use crate::error::{DiffError, DiffResult};

/// A moved element: `from` in source space, `to` in final space.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Move<I> {
    pub from: I,
    pub to: I,
}

impl<I> Move<I> {
    pub fn new(from: I, to: I) -> Self {
        Self { from, to }
    }
}

impl<I: fmt::Debug> fmt::Debug for Move<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?} -> {:?})", self.from, self.to)
    }
}

/// Net effect of a change to an ordered collection.
///
/// Index spaces are never mixed: `inserts` are final-collection indices,
/// `deletes` and `updates` are source-collection indices, and each move maps
/// a source index to a final index. Entry order carries no meaning.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderedDiff<I> {
    pub inserts: Vec<I>,
    pub deletes: Vec<I>,
    pub updates: Vec<I>,
    pub moves: Vec<Move<I>>,
}

impl<I> Default for OrderedDiff<I> {
    fn default() -> Self {
        Self {
            inserts: Vec::new(),
            deletes: Vec::new(),
            updates: Vec::new(),
            moves: Vec::new(),
        }
    }
}

impl<I> OrderedDiff<I> {
    /// Create an empty diff.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inserts(inserts: Vec<I>) -> Self {
        Self {
            inserts,
            ..Self::default()
        }
    }

    pub fn with_deletes(deletes: Vec<I>) -> Self {
        Self {
            deletes,
            ..Self::default()
        }
    }

    pub fn with_updates(updates: Vec<I>) -> Self {
        Self {
            updates,
            ..Self::default()
        }
    }

    pub fn with_moves(moves: Vec<Move<I>>) -> Self {
        Self {
            moves,
            ..Self::default()
        }
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.inserts.len() + self.deletes.len() + self.updates.len() + self.moves.len()
    }

    /// Returns `true` if the diff describes no change.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append every entry of `other`.
    ///
    /// Only meaningful when both diffs describe disjoint parts of the same
    /// change, as the tree differ produces them.
    pub fn merge(&mut self, other: OrderedDiff<I>) {
        self.inserts.extend(other.inserts);
        self.deletes.extend(other.deletes);
        self.updates.extend(other.updates);
        self.moves.extend(other.moves);
    }

    /// Rewrite every index.
    pub fn map<J>(self, mut f: impl FnMut(I) -> J) -> OrderedDiff<J> {
        OrderedDiff {
            inserts: self.inserts.into_iter().map(&mut f).collect(),
            deletes: self.deletes.into_iter().map(&mut f).collect(),
            updates: self.updates.into_iter().map(&mut f).collect(),
            moves: self
                .moves
                .into_iter()
                .map(|m| Move::new(f(m.from), f(m.to)))
                .collect(),
        }
    }
}

impl<I: Ord + Clone> OrderedDiff<I> {
    /// A copy with every list sorted, for order-independent comparison.
    pub fn canonical(&self) -> Self {
        let mut diff = self.clone();
        diff.inserts.sort();
        diff.deletes.sort();
        diff.updates.sort();
        diff.moves.sort();
        diff
    }
}

impl<I: fmt::Debug> fmt::Debug for OrderedDiff<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Inserts: {:?}, Deletes: {:?}, Updates: {:?}, Moves: {:?}",
            self.inserts, self.deletes, self.updates, self.moves
        )
    }
}

/// One step of a generated script: a delete, an insert, or both (a move).
///
/// `source` is the diff's own final-space index of an inserted element; the
/// script's insertion index may differ from it while earlier steps are still
/// pending, so elements are always read through `source`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edit<I> {
    pub deletion: Option<I>,
    pub insertion: Option<I>,
    pub source: Option<I>,
}

impl<I: Clone + fmt::Debug> Edit<I> {
    pub(crate) fn delete(at: I) -> Self {
        Self {
            deletion: Some(at),
            insertion: None,
            source: None,
        }
    }

    pub(crate) fn insert(at: I) -> Self {
        Self {
            deletion: None,
            insertion: Some(at.clone()),
            source: Some(at),
        }
    }

    pub(crate) fn movement(from: I, to: I) -> Self {
        Self {
            deletion: Some(from),
            insertion: Some(to),
            source: None,
        }
    }

    /// The operation this step performs.
    pub fn index_op(&self) -> DiffResult<IndexOp<I>> {
        match (&self.deletion, &self.insertion) {
            (Some(from), Some(to)) => Ok(IndexOp::Move(from.clone(), to.clone())),
            (Some(at), None) => Ok(IndexOp::Delete(at.clone())),
            (None, Some(at)) => Ok(IndexOp::Insert(at.clone())),
            (None, None) => Err(DiffError::Inconsistent(format!("empty edit {self:?}"))),
        }
    }
}

/// Index kinds with a patch/diff converter.
pub trait DiffIndex: Position {
    /// Aggregate an element-free patch into a diff.
    fn diff_from_patch(patch: &[IndexOp<Self>]) -> DiffResult<OrderedDiff<Self>>;

    /// Order the deletes, moves and inserts of `diff` into a replayable
    /// script. Updates are handled by the caller.
    fn edit_script(diff: &OrderedDiff<Self>) -> Vec<Edit<Self>>;
}

impl<I: DiffIndex> OrderedDiff<I> {
    /// Calculate the diff described by a patch.
    ///
    /// O(n²) in the number of operations.
    pub fn from_patch<E>(patch: &[Operation<E, I>]) -> DiffResult<Self> {
        Self::from_index_patch(&index_ops(patch))
    }

    /// Calculate the diff described by an element-free patch.
    pub fn from_index_patch(patch: &[IndexOp<I>]) -> DiffResult<Self> {
        let diff = I::diff_from_patch(patch)?;
        trace!(operations = patch.len(), entries = diff.len(), "diff from patch");
        Ok(diff)
    }

    /// Generate a patch that turns the source collection into `collection`.
    ///
    /// `collection` must be the final collection: inserted and updated
    /// elements are read from it. Updates come first, addressed in source
    /// space, followed by deletions, moves and insertions.
    pub fn generate_patch<C>(&self, collection: &C) -> DiffResult<Vec<Operation<C::Element, I>>>
    where
        C: OrderedCollection<Index = I>,
    {
        self.check_distinct()?;
        let script = I::edit_script(self);
        let steps = script
            .iter()
            .map(Edit::index_op)
            .collect::<DiffResult<Vec<_>>>()?;

        let mut patch = Vec::with_capacity(self.updates.len() + script.len());
        for update in &self.updates {
            let at = simulate_patch(&steps, update).ok_or_else(|| DiffError::UnresolvedUpdate {
                index: format!("{update:?}"),
            })?;
            let element = element_at(collection, &at)?;
            patch.push(Operation::Update {
                at: update.clone(),
                element,
            });
        }
        for (edit, step) in script.iter().zip(steps) {
            patch.push(match step {
                IndexOp::Insert(at) => {
                    let source = edit.source.as_ref().unwrap_or(&at);
                    Operation::Insert {
                        element: element_at(collection, source)?,
                        at,
                    }
                }
                IndexOp::Delete(at) => Operation::Delete { at },
                IndexOp::Move(from, to) => Operation::Move { from, to },
                IndexOp::Update(at) => {
                    return Err(DiffError::Inconsistent(format!("update {at:?} in edit script")))
                }
            });
        }
        trace!(entries = self.len(), operations = patch.len(), "patch from diff");
        Ok(patch)
    }

    /// Generate the element-free form of [`OrderedDiff::generate_patch`].
    pub fn generate_index_patch(&self) -> DiffResult<Vec<IndexOp<I>>> {
        self.check_distinct()?;
        let mut patch: Vec<IndexOp<I>> = self.updates.iter().cloned().map(IndexOp::Update).collect();
        for edit in I::edit_script(self) {
            patch.push(edit.index_op()?);
        }
        Ok(patch)
    }
}

impl<I: DiffIndex> OrderedDiff<I> {
    /// Every source index may be deleted or moved at most once, every final
    /// index inserted or moved into at most once, and every source index
    /// updated at most once.
    fn check_distinct(&self) -> DiffResult<()> {
        let sources = self.deletes.iter().chain(self.moves.iter().map(|m| &m.from));
        let targets = self.inserts.iter().chain(self.moves.iter().map(|m| &m.to));
        for (space, indices) in [
            ("source", sources.collect::<Vec<_>>()),
            ("final", targets.collect()),
            ("update", self.updates.iter().collect()),
        ] {
            let mut seen = HashSet::with_capacity(indices.len());
            if let Some(repeated) = indices.into_iter().find(|&index| !seen.insert(index)) {
                return Err(DiffError::Inconsistent(format!(
                    "{space} index {repeated:?} appears more than once"
                )));
            }
        }
        Ok(())
    }
}

fn element_at<C: OrderedCollection>(collection: &C, index: &C::Index) -> DiffResult<C::Element> {
    collection
        .element_at(index)
        .ok_or_else(|| DiffError::MissingElement {
            index: format!("{index:?}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len_counts_every_entry() {
        let diff = OrderedDiff {
            inserts: vec![1, 2],
            deletes: vec![0],
            updates: vec![],
            moves: vec![Move::new(3, 0)],
        };
        assert_eq!(diff.len(), 4);
        assert!(!diff.is_empty());
        assert!(OrderedDiff::<usize>::new().is_empty());
    }

    #[test]
    fn canonical_ignores_entry_order() {
        let a = OrderedDiff {
            inserts: vec![2, 1],
            deletes: vec![4, 0],
            updates: vec![],
            moves: vec![Move::new(3, 0), Move::new(1, 2)],
        };
        let b = OrderedDiff {
            inserts: vec![1, 2],
            deletes: vec![0, 4],
            updates: vec![],
            moves: vec![Move::new(1, 2), Move::new(3, 0)],
        };
        assert_ne!(a, b);
        assert_eq!(a.canonical(), b.canonical());
    }

    #[test]
    fn map_prefixes_indices() {
        let diff = OrderedDiff {
            inserts: vec![0usize],
            deletes: vec![],
            updates: vec![1],
            moves: vec![Move::new(2, 3)],
        };
        let mapped = diff.map(|i| vec![7, i]);
        assert_eq!(mapped.inserts, vec![vec![7, 0]]);
        assert_eq!(mapped.updates, vec![vec![7, 1]]);
        assert_eq!(mapped.moves, vec![Move::new(vec![7, 2], vec![7, 3])]);
    }

    #[test]
    fn merge_appends() {
        let mut diff = OrderedDiff::with_inserts(vec![0usize]);
        diff.merge(OrderedDiff::with_deletes(vec![3]));
        assert_eq!(diff.inserts, vec![0]);
        assert_eq!(diff.deletes, vec![3]);
    }

    #[test]
    fn debug_lists_all_parts() {
        let diff = OrderedDiff::with_moves(vec![Move::new(0usize, 2usize)]);
        assert_eq!(
            format!("{diff:?}"),
            "Inserts: [], Deletes: [], Updates: [], Moves: [(0 -> 2)]"
        );
    }

    #[test]
    fn empty_edit_is_inconsistent() {
        let edit: Edit<usize> = Edit {
            deletion: None,
            insertion: None,
            source: None,
        };
        assert!(matches!(edit.index_op(), Err(DiffError::Inconsistent(_))));
    }

    #[test]
    fn repeated_indices_are_inconsistent() {
        let deletes = OrderedDiff::with_deletes(vec![0usize, 0]);
        assert!(matches!(deletes.generate_patch(&vec![1]), Err(DiffError::Inconsistent(_))));
        assert!(matches!(deletes.generate_index_patch(), Err(DiffError::Inconsistent(_))));

        let deleted_and_moved = OrderedDiff {
            deletes: vec![1usize],
            moves: vec![Move::new(1, 0)],
            ..OrderedDiff::default()
        };
        assert!(matches!(
            deleted_and_moved.generate_patch(&vec![5, 6]),
            Err(DiffError::Inconsistent(_))
        ));

        let two_moves_into_one_slot = OrderedDiff::with_moves(vec![
            ripple_types::IndexPath::from([0]),
            ripple_types::IndexPath::from([1]),
        ]
        .into_iter()
        .map(|from| Move::new(from, ripple_types::IndexPath::from([2])))
        .collect());
        assert!(matches!(
            two_moves_into_one_slot.generate_index_patch(),
            Err(DiffError::Inconsistent(_))
        ));
    }
}

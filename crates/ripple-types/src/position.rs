//! Replay transforms over indices.
//!
//! `simulate` answers "where is this element after the operation", `undo`
//! answers "where was it before". Both return `None` when the operation
//! created, removed or replaced the element (or, for trees, an ancestor).

use std::fmt;
use std::hash::Hash;

use crate::operation::IndexOp;
use crate::path::IndexPath;

/// Index capability used by the diff/patch machinery.
pub trait Position: Clone + Eq + Ord + Hash + fmt::Debug {
    /// Position of `self` before `op` was applied.
    fn undo(&self, op: &IndexOp<Self>) -> Option<Self>;

    /// Position of `self` after `op` is applied.
    fn simulate(&self, op: &IndexOp<Self>) -> Option<Self>;
}

/// Undo a whole patch (right fold).
pub fn undo_patch<I: Position>(patch: &[IndexOp<I>], index: &I) -> Option<I> {
    patch
        .iter()
        .rev()
        .try_fold(index.clone(), |index, op| index.undo(op))
}

/// Simulate a whole patch (left fold).
pub fn simulate_patch<I: Position>(patch: &[IndexOp<I>], index: &I) -> Option<I> {
    patch
        .iter()
        .try_fold(index.clone(), |index, op| index.simulate(op))
}

impl Position for usize {
    fn undo(&self, op: &IndexOp<usize>) -> Option<usize> {
        let index = *self;
        match *op {
            IndexOp::Insert(at) if at == index => None,
            IndexOp::Insert(at) if at < index => Some(index - 1),
            IndexOp::Insert(_) => Some(index),
            IndexOp::Delete(at) if at <= index => Some(index + 1),
            IndexOp::Delete(_) => Some(index),
            IndexOp::Update(_) => Some(index),
            IndexOp::Move(from, to) => {
                if to == index {
                    return Some(from);
                }
                let mut index = index;
                if to < index {
                    index -= 1;
                }
                if from <= index {
                    index += 1;
                }
                Some(index)
            }
        }
    }

    fn simulate(&self, op: &IndexOp<usize>) -> Option<usize> {
        let index = *self;
        match *op {
            IndexOp::Insert(at) if at <= index => Some(index + 1),
            IndexOp::Insert(_) => Some(index),
            IndexOp::Delete(at) if at == index => None,
            IndexOp::Delete(at) if at < index => Some(index - 1),
            IndexOp::Delete(_) => Some(index),
            IndexOp::Update(_) => Some(index),
            IndexOp::Move(from, to) => {
                if from == index {
                    return Some(to);
                }
                let mut index = index;
                if from < index {
                    index -= 1;
                }
                if to <= index {
                    index += 1;
                }
                Some(index)
            }
        }
    }
}

impl Position for IndexPath {
    fn undo(&self, op: &IndexOp<IndexPath>) -> Option<IndexPath> {
        match op {
            IndexOp::Insert(at) => {
                if at == self || at.is_ancestor_of(self) {
                    None
                } else if self.is_affected_by(at) {
                    Some(self.shifted(-1, at))
                } else {
                    Some(self.clone())
                }
            }
            IndexOp::Delete(at) => {
                if self.is_affected_by(at) {
                    Some(self.shifted(1, at))
                } else {
                    Some(self.clone())
                }
            }
            IndexOp::Update(at) => {
                if at.is_ancestor_of(self) {
                    None
                } else {
                    Some(self.clone())
                }
            }
            IndexOp::Move(from, to) => {
                if to == self {
                    Some(from.clone())
                } else if to.is_ancestor_of(self) {
                    Some(self.replacing_ancestor(to, from))
                } else {
                    let mut index = self.clone();
                    if index.is_affected_by(to) {
                        index = index.shifted(-1, to);
                    }
                    if index.is_affected_by(from) {
                        index = index.shifted(1, from);
                    }
                    Some(index)
                }
            }
        }
    }

    fn simulate(&self, op: &IndexOp<IndexPath>) -> Option<IndexPath> {
        match op {
            IndexOp::Insert(at) => {
                if self.is_affected_by(at) {
                    Some(self.shifted(1, at))
                } else {
                    Some(self.clone())
                }
            }
            IndexOp::Delete(at) => {
                if at == self || at.is_ancestor_of(self) {
                    None
                } else if self.is_affected_by(at) {
                    Some(self.shifted(-1, at))
                } else {
                    Some(self.clone())
                }
            }
            IndexOp::Update(at) => {
                if at.is_ancestor_of(self) {
                    None
                } else {
                    Some(self.clone())
                }
            }
            IndexOp::Move(from, to) => {
                if from == self {
                    Some(to.clone())
                } else if from.is_ancestor_of(self) {
                    Some(self.replacing_ancestor(from, to))
                } else {
                    let mut index = self.clone();
                    if index.is_affected_by(from) {
                        index = index.shifted(-1, from);
                    }
                    if index.is_affected_by(to) {
                        index = index.shifted(1, to);
                    }
                    Some(index)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn p(offsets: &[usize]) -> IndexPath {
        IndexPath::from_slice(offsets)
    }

    #[test]
    fn linear_insert() {
        let op = IndexOp::Insert(2usize);
        assert_eq!(1usize.simulate(&op), Some(1));
        assert_eq!(2usize.simulate(&op), Some(3));
        assert_eq!(2usize.undo(&op), None);
        assert_eq!(3usize.undo(&op), Some(2));
    }

    #[test]
    fn linear_delete() {
        let op = IndexOp::Delete(1usize);
        assert_eq!(1usize.simulate(&op), None);
        assert_eq!(2usize.simulate(&op), Some(1));
        assert_eq!(0usize.simulate(&op), Some(0));
        assert_eq!(1usize.undo(&op), Some(2));
        assert_eq!(0usize.undo(&op), Some(0));
    }

    #[test]
    fn linear_move() {
        let op = IndexOp::Move(0usize, 2usize);
        // [A, B, C] -> [B, C, A]
        assert_eq!(0usize.simulate(&op), Some(2));
        assert_eq!(1usize.simulate(&op), Some(0));
        assert_eq!(2usize.simulate(&op), Some(1));
        assert_eq!(2usize.undo(&op), Some(0));
        assert_eq!(0usize.undo(&op), Some(1));
        assert_eq!(1usize.undo(&op), Some(2));
    }

    #[test]
    fn patch_folds_in_order() {
        let patch = vec![IndexOp::Delete(0usize), IndexOp::Insert(0usize)];
        assert_eq!(simulate_patch(&patch, &1), Some(1));
        assert_eq!(simulate_patch(&patch, &0), None);
        assert_eq!(undo_patch(&patch, &0), None);
        assert_eq!(undo_patch(&patch, &2), Some(2));
    }

    #[test]
    fn tree_delete_of_ancestor_removes_descendants() {
        let op = IndexOp::Delete(p(&[1]));
        assert_eq!(p(&[1, 0]).simulate(&op), None);
        assert_eq!(p(&[2, 0]).simulate(&op), Some(p(&[1, 0])));
        assert_eq!(p(&[0, 3]).simulate(&op), Some(p(&[0, 3])));
    }

    #[test]
    fn tree_move_relocates_subtree() {
        let op = IndexOp::Move(p(&[0]), p(&[1, 0]));
        assert_eq!(p(&[0, 2]).simulate(&op), Some(p(&[1, 0, 2])));
        assert_eq!(p(&[1, 0, 2]).undo(&op), Some(p(&[0, 2])));
        assert_eq!(p(&[2]).simulate(&op), Some(p(&[1])));
    }

    #[test]
    fn tree_update_replaces_subtree() {
        let op = IndexOp::Update(p(&[0]));
        assert_eq!(p(&[0]).simulate(&op), Some(p(&[0])));
        assert_eq!(p(&[0, 1]).simulate(&op), None);
        assert_eq!(p(&[0, 1]).undo(&op), None);
    }

    fn arb_linear_op() -> impl Strategy<Value = IndexOp<usize>> {
        prop_oneof![
            (0usize..6).prop_map(IndexOp::Insert),
            (0usize..6).prop_map(IndexOp::Delete),
            (0usize..6).prop_map(IndexOp::Update),
            (0usize..6, 0usize..6).prop_map(|(f, t)| IndexOp::Move(f, t)),
        ]
    }

    proptest! {
        #[test]
        fn linear_undo_inverts_simulate(op in arb_linear_op(), index in 0usize..8) {
            if let Some(after) = index.simulate(&op) {
                prop_assert_eq!(after.undo(&op), Some(index));
            }
        }

        #[test]
        fn linear_simulate_inverts_undo(op in arb_linear_op(), index in 0usize..8) {
            if let Some(before) = index.undo(&op) {
                prop_assert_eq!(before.simulate(&op), Some(index));
            }
        }
    }
}

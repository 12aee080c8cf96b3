//! Elementary edit operations.
//!
//! Insert and update positions are expressed in the collection *after* the
//! operation, delete and move-source positions in the collection *before* it,
//! and a move destination again in the collection after it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One atomic edit of an ordered collection.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "op")]
pub enum Operation<E, I> {
    Insert { element: E, at: I },
    Delete { at: I },
    Update { at: I, element: E },
    Move { from: I, to: I },
}

impl<E, I: Clone> Operation<E, I> {
    /// The same operation without its element.
    pub fn index_op(&self) -> IndexOp<I> {
        match self {
            Operation::Insert { at, .. } => IndexOp::Insert(at.clone()),
            Operation::Delete { at } => IndexOp::Delete(at.clone()),
            Operation::Update { at, .. } => IndexOp::Update(at.clone()),
            Operation::Move { from, to } => IndexOp::Move(from.clone(), to.clone()),
        }
    }

    /// Map both the element and the indices of this operation.
    pub fn map<F, J>(self, mut element: impl FnMut(E) -> F, mut index: impl FnMut(I) -> J) -> Operation<F, J> {
        match self {
            Operation::Insert { element: e, at } => Operation::Insert {
                element: element(e),
                at: index(at),
            },
            Operation::Delete { at } => Operation::Delete { at: index(at) },
            Operation::Update { at, element: e } => Operation::Update {
                at: index(at),
                element: element(e),
            },
            Operation::Move { from, to } => Operation::Move {
                from: index(from),
                to: index(to),
            },
        }
    }
}

/// Strip the elements from every operation of a patch.
pub fn index_ops<E, I: Clone>(patch: &[Operation<E, I>]) -> Vec<IndexOp<I>> {
    patch.iter().map(Operation::index_op).collect()
}

impl<E: fmt::Debug, I: fmt::Debug> fmt::Debug for Operation<E, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Insert { element, at } => write!(f, "I({element:?}, at: {at:?})"),
            Operation::Delete { at } => write!(f, "D(at: {at:?})"),
            Operation::Update { at, element } => write!(f, "U(at: {at:?}, with: {element:?})"),
            Operation::Move { from, to } => write!(f, "M(from: {from:?}, to: {to:?})"),
        }
    }
}

/// An [`Operation`] with its element erased.
///
/// All index bookkeeping (undo, simulate, patch/diff conversion) works on
/// this form.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexOp<I> {
    Insert(I),
    Delete(I),
    Update(I),
    Move(I, I),
}

impl<I: fmt::Debug> fmt::Debug for IndexOp<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexOp::Insert(at) => write!(f, "I(at: {at:?})"),
            IndexOp::Delete(at) => write!(f, "D(at: {at:?})"),
            IndexOp::Update(at) => write!(f, "U(at: {at:?})"),
            IndexOp::Move(from, to) => write!(f, "M(from: {from:?}, to: {to:?})"),
        }
    }
}

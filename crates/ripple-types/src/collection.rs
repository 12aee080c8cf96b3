use crate::error::{IndexError, IndexResult};
use crate::operation::Operation;
use crate::position::Position;

/// An ordered collection a patch can be replayed against.
///
/// Every operation validates its indices before touching the collection, so
/// a failed `apply` leaves the collection unchanged.
pub trait OrderedCollection {
    /// Element stored at an index (for trees: a whole subtree).
    type Element: Clone;
    /// Index kind addressing elements.
    type Index: Position;

    /// A copy of the element at `index`, if it exists.
    fn element_at(&self, index: &Self::Index) -> Option<Self::Element>;

    /// Apply a single operation.
    fn apply(&mut self, op: Operation<Self::Element, Self::Index>) -> IndexResult<()>;

    /// Apply a patch operation by operation.
    ///
    /// Stops at the first failing operation; earlier operations stay applied.
    fn apply_patch<P>(&mut self, patch: P) -> IndexResult<()>
    where
        P: IntoIterator<Item = Operation<Self::Element, Self::Index>>,
    {
        for op in patch {
            self.apply(op)?;
        }
        Ok(())
    }
}

impl<T: Clone> OrderedCollection for Vec<T> {
    type Element = T;
    type Index = usize;

    fn element_at(&self, index: &usize) -> Option<T> {
        self.get(*index).cloned()
    }

    fn apply(&mut self, op: Operation<T, usize>) -> IndexResult<()> {
        let len = self.len();
        let check = |index: usize, bound: usize| {
            if index < bound {
                Ok(())
            } else {
                Err(IndexError::OutOfBounds { index, len })
            }
        };
        match op {
            Operation::Insert { element, at } => {
                check(at, len + 1)?;
                self.insert(at, element);
            }
            Operation::Delete { at } => {
                check(at, len)?;
                self.remove(at);
            }
            Operation::Update { at, element } => {
                check(at, len)?;
                self[at] = element;
            }
            Operation::Move { from, to } => {
                check(from, len)?;
                check(to, len)?;
                let element = self.remove(from);
                self.insert(to, element);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replay_patch_on_vec() {
        let mut v = vec!['a', 'b', 'c'];
        v.apply_patch(vec![
            Operation::Insert { element: 'x', at: 1 },
            Operation::Delete { at: 3 },
            Operation::Move { from: 0, to: 2 },
            Operation::Update { at: 0, element: 'y' },
        ])
        .unwrap();
        assert_eq!(v, vec!['y', 'b', 'a']);
    }

    #[test]
    fn out_of_bounds_leaves_vec_untouched() {
        let mut v = vec![1, 2, 3];
        let err = v.apply(Operation::Delete { at: 3 }).unwrap_err();
        assert_eq!(err, IndexError::OutOfBounds { index: 3, len: 3 });
        let err = v.apply(Operation::Move { from: 0, to: 3 }).unwrap_err();
        assert_eq!(err, IndexError::OutOfBounds { index: 3, len: 3 });
        assert_eq!(v, vec![1, 2, 3]);
    }

    #[test]
    fn insert_at_end_is_allowed() {
        let mut v = vec![1];
        v.apply(Operation::Insert { element: 2, at: 1 }).unwrap();
        assert_eq!(v, vec![1, 2]);
    }
}

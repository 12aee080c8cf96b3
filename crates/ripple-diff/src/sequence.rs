//! Diff two snapshots of a flat ordered collection.

use std::convert::Infallible;

use similar::algorithms::{lcs, myers, DiffHook};
use tracing::trace;

use crate::config::{DiffAlgorithm, DiffConfig};
use crate::ordered::{Move, OrderedDiff};

/// Element paired with the predicate used to compare it.
struct Compared<'a, T> {
    value: &'a T,
    eq: &'a dyn Fn(&T, &T) -> bool,
}

impl<T> PartialEq for Compared<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        (self.eq)(self.value, other.value)
    }
}

/// Collects the edit script as index lists.
#[derive(Default)]
pub(crate) struct Script {
    pub(crate) equal: Vec<(usize, usize)>,
    pub(crate) deletes: Vec<usize>,
    pub(crate) inserts: Vec<usize>,
}

impl DiffHook for Script {
    type Error = Infallible;

    fn equal(&mut self, old_index: usize, new_index: usize, len: usize) -> Result<(), Infallible> {
        self.equal
            .extend((0..len).map(|k| (old_index + k, new_index + k)));
        Ok(())
    }

    fn delete(&mut self, old_index: usize, old_len: usize, _new_index: usize) -> Result<(), Infallible> {
        self.deletes.extend(old_index..old_index + old_len);
        Ok(())
    }

    fn insert(&mut self, _old_index: usize, new_index: usize, new_len: usize) -> Result<(), Infallible> {
        self.inserts.extend(new_index..new_index + new_len);
        Ok(())
    }
}

/// Run the configured edit-script algorithm over `old` and `new`.
pub(crate) fn script<T>(old: &[T], new: &[T], eq: &dyn Fn(&T, &T) -> bool, algorithm: DiffAlgorithm) -> Script {
    let old: Vec<Compared<'_, T>> = old.iter().map(|value| Compared { value, eq }).collect();
    let new: Vec<Compared<'_, T>> = new.iter().map(|value| Compared { value, eq }).collect();

    let mut script = Script::default();
    let outcome = match algorithm {
        DiffAlgorithm::Myers => myers::diff(&mut script, &old, 0..old.len(), &new, 0..new.len()),
        DiffAlgorithm::Lcs => lcs::diff(&mut script, &old, 0..old.len(), &new, 0..new.len()),
    };
    match outcome {
        Ok(()) => {}
        Err(never) => match never {},
    }
    script
}

/// Diff two slices using `PartialEq`.
pub fn diff_slices<T: PartialEq>(old: &[T], new: &[T], config: &DiffConfig) -> OrderedDiff<usize> {
    diff_slices_by(old, new, |a, b| a == b, config)
}

/// Diff two slices using a caller-supplied equality predicate.
///
/// The result holds inserts, deletes and (when `config.detect_moves` is set)
/// moves; an element that changed is a delete plus an insert.
pub fn diff_slices_by<T>(
    old: &[T],
    new: &[T],
    eq: impl Fn(&T, &T) -> bool,
    config: &DiffConfig,
) -> OrderedDiff<usize> {
    let script = script(old, new, &eq, config.algorithm);

    let mut diff = OrderedDiff::new();
    let mut inserts = script.inserts;
    for from in script.deletes {
        let paired = if config.detect_moves {
            inserts.iter().position(|&to| eq(&old[from], &new[to]))
        } else {
            None
        };
        match paired {
            Some(k) => diff.moves.push(Move::new(from, inserts.remove(k))),
            None => diff.deletes.push(from),
        }
    }
    diff.inserts = inserts;

    trace!(
        old = old.len(),
        new = new.len(),
        entries = diff.len(),
        algorithm = ?config.algorithm,
        "sequence diff"
    );
    diff
}

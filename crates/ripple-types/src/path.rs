use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Path of child offsets addressing a node in a tree.
///
/// The empty path is the root; its length is the depth of the addressed
/// node. Paths compare lexicographically, so a path orders before all of its
/// descendants and siblings order by offset.
///
/// Paths are immutable values: every transformation returns a new path.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexPath(SmallVec<[usize; 4]>);

impl IndexPath {
    /// The root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Create a path from a slice of offsets.
    pub fn from_slice(offsets: &[usize]) -> Self {
        Self(SmallVec::from_slice(offsets))
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Depth of the addressed node (zero for the root).
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Path of the parent node, or `None` for the root.
    pub fn parent(&self) -> Option<IndexPath> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self::from_slice(&self.0[..self.0.len() - 1]))
        }
    }

    /// A copy of this path extended by one child offset.
    pub fn appending(&self, offset: usize) -> IndexPath {
        let mut copy = self.clone();
        copy.0.push(offset);
        copy
    }

    /// Returns `true` if `self` is a strict prefix of `other`.
    ///
    /// Irreflexive and transitive.
    pub fn is_ancestor_of(&self, other: &IndexPath) -> bool {
        self.0.len() < other.0.len() && self.0[..] == other.0[..self.0.len()]
    }

    /// Returns `true` if an insertion or deletion at `edited_at` changes this
    /// path's component at `edited_at`'s level.
    ///
    /// That is the case when `edited_at` is not deeper than `self`, both share
    /// the parent prefix of `edited_at`, and the edited offset is at or before
    /// this path's offset on that level.
    pub fn is_affected_by(&self, edited_at: &IndexPath) -> bool {
        if edited_at.0.is_empty() || edited_at.0.len() > self.0.len() {
            return false;
        }
        let level = edited_at.0.len() - 1;
        edited_at.0[..level] == self.0[..level] && edited_at.0[level] <= self.0[level]
    }

    /// Shift the component at `reference`'s level by `by`.
    ///
    /// A no-op when `self` is shallower than `reference`.
    pub fn shifted(&self, by: isize, at_level_of: &IndexPath) -> IndexPath {
        match at_level_of.0.len().checked_sub(1) {
            Some(level) if level < self.0.len() => self.advanced(by, level),
            _ => self.clone(),
        }
    }

    /// Shift the component at `level` by `by`, or `None` if it would become
    /// negative or `level` is out of range.
    pub fn checked_advanced(&self, by: isize, level: usize) -> Option<IndexPath> {
        let mut copy = self.clone();
        let component = copy.0.get_mut(level)?;
        *component = component.checked_add_signed(by)?;
        Some(copy)
    }

    /// Shift the component at `level` by `by`.
    ///
    /// Callers only shift a path back when an edit sits at or before it on
    /// that level and is not the path itself, so the component is never
    /// zero then. Use [`IndexPath::checked_advanced`] for offsets that come
    /// from outside such bookkeeping.
    ///
    /// # Panics
    ///
    /// Panics if the component would become negative or `level` is out of
    /// range.
    pub fn advanced(&self, by: isize, level: usize) -> IndexPath {
        self.checked_advanced(by, level)
            .expect("index path component underflow")
    }

    /// Substitute the prefix `ancestor` with `replacement`.
    pub fn replacing_ancestor(&self, ancestor: &IndexPath, replacement: &IndexPath) -> IndexPath {
        let mut path = replacement.clone();
        path.0.extend_from_slice(&self.0[ancestor.0.len()..]);
        path
    }
}

impl Deref for IndexPath {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for IndexPath {
    fn from(offsets: Vec<usize>) -> Self {
        Self(SmallVec::from_vec(offsets))
    }
}

impl From<&[usize]> for IndexPath {
    fn from(offsets: &[usize]) -> Self {
        Self::from_slice(offsets)
    }
}

impl<const N: usize> From<[usize; N]> for IndexPath {
    fn from(offsets: [usize; N]) -> Self {
        Self::from_slice(&offsets)
    }
}

impl FromIterator<usize> for IndexPath {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Debug for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, offset) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{offset}")?;
        }
        write!(f, "]")
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
    fn ancestor_is_strict_prefix() {
        assert!(p(&[1]).is_ancestor_of(&p(&[1, 0])));
        assert!(p(&[]).is_ancestor_of(&p(&[3])));
        assert!(!p(&[1]).is_ancestor_of(&p(&[1])));
        assert!(!p(&[1, 0]).is_ancestor_of(&p(&[1])));
        assert!(!p(&[2]).is_ancestor_of(&p(&[1, 0])));
    }

    #[test]
    fn affected_by_same_level_edit() {
        assert!(p(&[1, 2]).is_affected_by(&p(&[1, 2])));
        assert!(p(&[1, 2]).is_affected_by(&p(&[1, 0])));
        assert!(!p(&[1, 2]).is_affected_by(&p(&[1, 3])));
        assert!(!p(&[1, 2]).is_affected_by(&p(&[0, 0])));
    }

    #[test]
    fn affected_by_ancestor_level_edit() {
        assert!(p(&[1, 2]).is_affected_by(&p(&[0])));
        assert!(p(&[1, 2]).is_affected_by(&p(&[1])));
        assert!(!p(&[1, 2]).is_affected_by(&p(&[2])));
    }

    #[test]
    fn deeper_edit_does_not_affect_shallower_path() {
        assert!(!p(&[1]).is_affected_by(&p(&[0, 0])));
        assert!(!p(&[1]).is_affected_by(&p(&[])));
    }

    #[test]
    fn shifted_only_touches_reference_level() {
        assert_eq!(p(&[1, 2, 3]).shifted(1, &p(&[0, 0])), p(&[1, 3, 3]));
        assert_eq!(p(&[1, 2, 3]).shifted(-1, &p(&[0])), p(&[0, 2, 3]));
        assert_eq!(p(&[1]).shifted(1, &p(&[0, 0])), p(&[1]));
    }

    #[test]
    #[should_panic(expected = "underflow")]
    fn shifted_below_zero_panics() {
        let _ = p(&[0]).shifted(-1, &p(&[0]));
    }

    #[test]
    fn checked_advanced_reports_underflow() {
        assert_eq!(p(&[2, 1]).checked_advanced(-1, 1), Some(p(&[2, 0])));
        assert_eq!(p(&[2, 0]).checked_advanced(-1, 1), None);
        assert_eq!(p(&[2]).checked_advanced(1, 3), None);
    }

    #[test]
    fn replacing_ancestor_relocates_subtree() {
        let path = p(&[1, 0, 2]);
        assert_eq!(path.replacing_ancestor(&p(&[1]), &p(&[3, 4])), p(&[3, 4, 0, 2]));
        assert_eq!(path.replacing_ancestor(&p(&[1, 0]), &p(&[0])), p(&[0, 2]));
    }

    #[test]
    fn lexicographic_order() {
        let mut paths = vec![p(&[1]), p(&[0, 5]), p(&[0]), p(&[1, 0]), p(&[])];
        paths.sort();
        assert_eq!(paths, vec![p(&[]), p(&[0]), p(&[0, 5]), p(&[1]), p(&[1, 0])]);
    }

    #[test]
    fn parent_and_appending() {
        assert_eq!(p(&[2, 1]).parent(), Some(p(&[2])));
        assert_eq!(p(&[]).parent(), None);
        assert_eq!(p(&[2]).appending(7), p(&[2, 7]));
    }

    #[test]
    fn display_and_serde() {
        let path = p(&[0, 12]);
        assert_eq!(path.to_string(), "[0, 12]");
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "[0,12]");
        let back: IndexPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }

    fn arb_path() -> impl Strategy<Value = IndexPath> {
        prop::collection::vec(0usize..3, 0..4).prop_map(IndexPath::from)
    }

    proptest! {
        #[test]
        fn ancestry_is_irreflexive(a in arb_path()) {
            prop_assert!(!a.is_ancestor_of(&a));
        }

        #[test]
        fn ancestry_is_transitive(a in arb_path(), b in arb_path(), c in arb_path()) {
            if a.is_ancestor_of(&b) && b.is_ancestor_of(&c) {
                prop_assert!(a.is_ancestor_of(&c));
            }
        }

        #[test]
        fn ancestor_orders_first(a in arb_path(), b in arb_path()) {
            if a.is_ancestor_of(&b) {
                prop_assert!(a < b);
            }
        }
    }
}

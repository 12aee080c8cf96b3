//! Mutators for tracked trees.
//!
//! Every method takes node paths relative to the tree root; `[i]` is the
//! i-th top-level node.

use std::fmt;

use ripple_diff::{diff_trees, diff_trees_by, Move, OrderedDiff};
use ripple_types::{IndexError, IndexPath, Operation, Tree, TreeNode};

use crate::container::ChangesetContainer;
use crate::error::ChangesetResult;
use crate::trackable::{Trackable, TrackedTree};

impl<C> ChangesetContainer<C>
where
    C: TrackedTree + Trackable<Operation = Operation<TreeNode<<C as Tree>::Value>, IndexPath>, Diff = OrderedDiff<IndexPath>>,
    <C as Tree>::Value: Clone + fmt::Debug,
{
    /// A copy of the subtree at `at`.
    pub fn node(&self, at: &IndexPath) -> Option<TreeNode<C::Value>> {
        self.with_collection(|tree| tree.node(at).cloned())
    }

    /// Append `node` after the last top-level node.
    pub fn append(&self, node: TreeNode<C::Value>) -> ChangesetResult<()> {
        self.descriptive_update(|tree| {
            let at = IndexPath::from([tree.children().len()]);
            tree.insert_node(node.clone(), &at)?;
            Ok((vec![Operation::Insert { element: node, at }], ()))
        })
    }

    pub fn insert(&self, node: TreeNode<C::Value>, at: &IndexPath) -> ChangesetResult<()> {
        self.descriptive_update(|tree| {
            tree.insert_node(node.clone(), at)?;
            Ok((vec![Operation::Insert { element: node, at: at.clone() }], ()))
        })
    }

    /// Insert `nodes` as consecutive siblings starting at `at`.
    pub fn insert_many(&self, nodes: Vec<TreeNode<C::Value>>, at: &IndexPath) -> ChangesetResult<()> {
        self.descriptive_update(|tree| {
            let level = at.depth().checked_sub(1).ok_or(IndexError::EmptyPath)?;
            let patch = nodes
                .iter()
                .enumerate()
                .map(|(k, node)| Operation::Insert {
                    element: node.clone(),
                    at: at.advanced(k as isize, level),
                })
                .collect();
            tree.insert_nodes(nodes, at)?;
            Ok((patch, ()))
        })
    }

    /// Remove and return the subtree at `at`.
    pub fn remove(&self, at: &IndexPath) -> ChangesetResult<TreeNode<C::Value>> {
        self.descriptive_update(|tree| {
            let node = tree.remove_node(at)?;
            Ok((vec![Operation::Delete { at: at.clone() }], node))
        })
    }

    /// Remove every top-level node.
    pub fn remove_all(&self) -> ChangesetResult<Vec<TreeNode<C::Value>>> {
        self.descriptive_update(|tree| {
            let patch = (0..tree.children().len())
                .rev()
                .map(|i| Operation::Delete { at: IndexPath::from([i]) })
                .collect();
            Ok((patch, std::mem::take(tree.children_mut())))
        })
    }

    /// Move the subtree at `from` so it ends up at `to`.
    pub fn move_node(&self, from: &IndexPath, to: &IndexPath) -> ChangesetResult<()> {
        self.descriptive_update(|tree| {
            tree.move_node(from, to)?;
            Ok((
                vec![Operation::Move {
                    from: from.clone(),
                    to: to.clone(),
                }],
                (),
            ))
        })
    }

    /// Move several subtrees so they end up as consecutive siblings, in the
    /// given order, starting at `to`.
    pub fn move_many(&self, from: &[IndexPath], to: &IndexPath) -> ChangesetResult<()> {
        self.descriptive_update(|tree| {
            let level = to.depth().checked_sub(1).ok_or(IndexError::EmptyPath)?;
            tree.move_nodes(from, to)?;
            let diff = OrderedDiff::with_moves(
                from.iter()
                    .enumerate()
                    .map(|(k, source)| Move::new(source.clone(), to.advanced(k as isize, level)))
                    .collect(),
            );
            Ok((tree.patch_from_diff(&diff)?, ()))
        })
    }

    /// Replace the subtree at `at`, returning the previous one.
    pub fn set(&self, at: &IndexPath, node: TreeNode<C::Value>) -> ChangesetResult<TreeNode<C::Value>> {
        self.descriptive_update(|tree| {
            let previous = tree.replace_node(at, node.clone())?;
            Ok((
                vec![Operation::Update {
                    at: at.clone(),
                    element: node,
                }],
                previous,
            ))
        })
    }

    /// Replace the whole tree. With `perform_diff` observers receive the
    /// level-by-level difference instead of a reload.
    pub fn replace_with_diff(&self, with: C, perform_diff: bool) -> ChangesetResult<()>
    where
        C::Value: PartialEq,
    {
        if !perform_diff {
            return self.replace(with);
        }
        let diff = self.with_collection(|tree| diff_trees(tree, &with, &self.config().diff));
        self.replace_described(with, diff)
    }

    /// Replace the whole tree, comparing node values with `eq`.
    pub fn replace_with_diff_by(&self, with: C, eq: impl Fn(&C::Value, &C::Value) -> bool) -> ChangesetResult<()> {
        let diff = self.with_collection(|tree| diff_trees_by(tree, &with, eq, &self.config().diff));
        self.replace_described(with, diff)
    }
}

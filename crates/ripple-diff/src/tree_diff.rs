//! Diff two snapshots of a tree, level by level.

use tracing::trace;

use ripple_types::{IndexPath, Tree, TreeNode};

use crate::config::DiffConfig;
use crate::ordered::OrderedDiff;
use crate::sequence::script;

/// Diff two trees using `PartialEq` on node values.
pub fn diff_trees<T>(old: &T, new: &T, config: &DiffConfig) -> OrderedDiff<IndexPath>
where
    T: Tree,
    T::Value: PartialEq,
{
    diff_trees_by(old, new, |a, b| a == b, config)
}

/// Diff two trees using a caller-supplied equality on node values.
///
/// Children of aligned nodes are diffed recursively. A node whose value
/// changed is deleted and inserted again together with its subtree; tree
/// diffs carry no moves and no updates. The root value itself is not
/// compared.
pub fn diff_trees_by<T>(
    old: &T,
    new: &T,
    eq: impl Fn(&T::Value, &T::Value) -> bool,
    config: &DiffConfig,
) -> OrderedDiff<IndexPath>
where
    T: Tree,
{
    let node_eq = |a: &TreeNode<T::Value>, b: &TreeNode<T::Value>| eq(&a.value, &b.value);
    let diff = diff_level(
        old.children(),
        new.children(),
        &IndexPath::root(),
        &IndexPath::root(),
        &node_eq,
        config,
    );
    trace!(entries = diff.len(), "tree diff");
    diff
}

fn diff_level<V>(
    old: &[TreeNode<V>],
    new: &[TreeNode<V>],
    source_root: &IndexPath,
    destination_root: &IndexPath,
    eq: &dyn Fn(&TreeNode<V>, &TreeNode<V>) -> bool,
    config: &DiffConfig,
) -> OrderedDiff<IndexPath> {
    let script = script(old, new, eq, config.algorithm);

    let mut diff = OrderedDiff::new();
    diff.deletes = script.deletes.iter().map(|&x| source_root.appending(x)).collect();
    diff.inserts = script
        .inserts
        .iter()
        .map(|&y| destination_root.appending(y))
        .collect();

    for (x, y) in script.equal {
        diff.merge(diff_level(
            &old[x].children,
            &new[y].children,
            &source_root.appending(x),
            &destination_root.appending(y),
            eq,
            config,
        ));
    }
    diff
}

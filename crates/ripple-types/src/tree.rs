//! Tree-shaped collections addressed by [`IndexPath`].
//!
//! A [`TreeNode`] is a rooted tree whose root value is not addressable by
//! operations: paths start at the root's children. A [`TreeArray`] is a
//! rootless forest with the same addressing. Both share their navigation and
//! editing through the [`Tree`] trait.

use serde::{Deserialize, Serialize};

use crate::collection::OrderedCollection;
use crate::error::{IndexError, IndexResult};
use crate::operation::Operation;
use crate::path::IndexPath;

/// A node holding a value and an ordered list of child nodes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(bound(deserialize = "V: Deserialize<'de>"))]
pub struct TreeNode<V> {
    pub value: V,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode<V>>,
}

impl<V> TreeNode<V> {
    /// A leaf node.
    pub fn new(value: V) -> Self {
        Self {
            value,
            children: Vec::new(),
        }
    }

    pub fn with_children(value: V, children: Vec<TreeNode<V>>) -> Self {
        Self { value, children }
    }
}

/// A rootless forest of [`TreeNode`]s.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreeArray<V> {
    pub children: Vec<TreeNode<V>>,
}

impl<V> TreeArray<V> {
    pub fn new(children: Vec<TreeNode<V>>) -> Self {
        Self { children }
    }
}

impl<V> Default for TreeArray<V> {
    fn default() -> Self {
        Self {
            children: Vec::new(),
        }
    }
}

/// Navigation and editing shared by the tree collections.
///
/// Editing methods validate the path first and leave the tree unchanged on
/// error.
pub trait Tree {
    type Value;

    /// Top-level nodes.
    fn children(&self) -> &[TreeNode<Self::Value>];

    fn children_mut(&mut self) -> &mut Vec<TreeNode<Self::Value>>;

    /// Node at `path`, or `None` for the root and for paths that address
    /// nothing.
    fn node(&self, path: &IndexPath) -> Option<&TreeNode<Self::Value>> {
        let (first, rest) = path.split_first()?;
        let mut node = self.children().get(*first)?;
        for &offset in rest {
            node = node.children.get(offset)?;
        }
        Some(node)
    }

    fn node_mut(&mut self, path: &IndexPath) -> Option<&mut TreeNode<Self::Value>> {
        let (last, parent) = path.split_last()?;
        self.children_at_mut(parent)?.get_mut(*last)
    }

    /// Children of the node at `parent` (top-level nodes for the root).
    fn children_at(&self, parent: &[usize]) -> Option<&[TreeNode<Self::Value>]> {
        let mut children = self.children();
        for &offset in parent {
            children = children.get(offset)?.children.as_slice();
        }
        Some(children)
    }

    fn children_at_mut(&mut self, parent: &[usize]) -> Option<&mut Vec<TreeNode<Self::Value>>> {
        let mut children = self.children_mut();
        for &offset in parent {
            children = &mut children.get_mut(offset)?.children;
        }
        Some(children)
    }

    /// Insert `node` so that it ends up at `at`.
    fn insert_node(&mut self, node: TreeNode<Self::Value>, at: &IndexPath) -> IndexResult<()> {
        let (last, parent) = at.split_last().ok_or(IndexError::EmptyPath)?;
        let children = self
            .children_at_mut(parent)
            .filter(|children| *last <= children.len())
            .ok_or_else(|| IndexError::InvalidPath(at.clone()))?;
        children.insert(*last, node);
        Ok(())
    }

    /// Insert `nodes` as consecutive siblings starting at `at`.
    fn insert_nodes(&mut self, nodes: Vec<TreeNode<Self::Value>>, at: &IndexPath) -> IndexResult<()> {
        let (last, parent) = at.split_last().ok_or(IndexError::EmptyPath)?;
        let children = self
            .children_at_mut(parent)
            .filter(|children| *last <= children.len())
            .ok_or_else(|| IndexError::InvalidPath(at.clone()))?;
        children.splice(*last..*last, nodes);
        Ok(())
    }

    /// Remove and return the subtree at `at`.
    fn remove_node(&mut self, at: &IndexPath) -> IndexResult<TreeNode<Self::Value>> {
        let (last, parent) = at.split_last().ok_or(IndexError::EmptyPath)?;
        let children = self
            .children_at_mut(parent)
            .filter(|children| *last < children.len())
            .ok_or_else(|| IndexError::InvalidPath(at.clone()))?;
        Ok(children.remove(*last))
    }

    /// Replace the subtree at `at`, returning the old one.
    fn replace_node(&mut self, at: &IndexPath, node: TreeNode<Self::Value>) -> IndexResult<TreeNode<Self::Value>> {
        if at.is_empty() {
            return Err(IndexError::EmptyPath);
        }
        let slot = self
            .node_mut(at)
            .ok_or_else(|| IndexError::InvalidPath(at.clone()))?;
        Ok(std::mem::replace(slot, node))
    }

    /// Move the subtree at `from` so that it ends up at `to`.
    ///
    /// `to` is interpreted after the removal. On error the tree is restored.
    fn move_node(&mut self, from: &IndexPath, to: &IndexPath) -> IndexResult<()> {
        let node = self.remove_node(from)?;
        if let Err((node, err)) = self.insert_node_checked(node, to) {
            self.insert_node(node, from)?;
            return Err(err);
        }
        Ok(())
    }

    /// Like [`Tree::insert_node`], but hands the node back on failure.
    #[allow(clippy::type_complexity)]
    fn insert_node_checked(
        &mut self,
        node: TreeNode<Self::Value>,
        at: &IndexPath,
    ) -> Result<(), (TreeNode<Self::Value>, IndexError)> {
        let Some((last, parent)) = at.split_last() else {
            return Err((node, IndexError::EmptyPath));
        };
        match self.children_at_mut(parent) {
            Some(children) if *last <= children.len() => {
                children.insert(*last, node);
                Ok(())
            }
            _ => Err((node, IndexError::InvalidPath(at.clone()))),
        }
    }

    /// Move several subtrees so they end up as consecutive siblings starting
    /// at `to`, in the order given.
    ///
    /// `to` is interpreted after all sources were removed. On error the tree
    /// is restored.
    fn move_nodes(&mut self, from: &[IndexPath], to: &IndexPath) -> IndexResult<()>
    where
        Self::Value: Clone,
    {
        for (i, a) in from.iter().enumerate() {
            if from[i + 1..]
                .iter()
                .any(|b| a == b || a.is_ancestor_of(b) || b.is_ancestor_of(a))
            {
                return Err(IndexError::OverlappingSources(format!("{from:?}")));
            }
        }
        let nodes = from
            .iter()
            .map(|path| {
                self.node(path)
                    .cloned()
                    .ok_or_else(|| IndexError::InvalidPath(path.clone()))
            })
            .collect::<IndexResult<Vec<_>>>()?;
        let snapshot = self.children().to_vec();
        let mut sorted: Vec<&IndexPath> = from.iter().collect();
        sorted.sort();
        sorted.dedup();
        for path in sorted.into_iter().rev() {
            if let Err(err) = self.remove_node(path) {
                *self.children_mut() = snapshot;
                return Err(err);
            }
        }
        if let Err(err) = self.insert_nodes(nodes, to) {
            *self.children_mut() = snapshot;
            return Err(err);
        }
        Ok(())
    }

    /// Number of nodes below the root.
    fn node_count(&self) -> usize {
        fn count<V>(nodes: &[TreeNode<V>]) -> usize {
            nodes.iter().map(|n| 1 + count(&n.children)).sum()
        }
        count(self.children())
    }

    /// Paths of every node below the root in depth-first pre-order.
    fn depth_first_paths(&self) -> Vec<IndexPath> {
        fn walk<V>(nodes: &[TreeNode<V>], prefix: &IndexPath, out: &mut Vec<IndexPath>) {
            for (i, node) in nodes.iter().enumerate() {
                let path = prefix.appending(i);
                out.push(path.clone());
                walk(&node.children, &path, out);
            }
        }
        let mut out = Vec::new();
        walk(self.children(), &IndexPath::root(), &mut out);
        out
    }
}

impl<V> Tree for TreeNode<V> {
    type Value = V;

    fn children(&self) -> &[TreeNode<V>] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut Vec<TreeNode<V>> {
        &mut self.children
    }
}

impl<V> Tree for TreeArray<V> {
    type Value = V;

    fn children(&self) -> &[TreeNode<V>] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut Vec<TreeNode<V>> {
        &mut self.children
    }
}

/// Replay one operation against a tree.
pub(crate) fn apply_to_tree<T: Tree>(tree: &mut T, op: Operation<TreeNode<T::Value>, IndexPath>) -> IndexResult<()> {
    match op {
        Operation::Insert { element, at } => tree.insert_node(element, &at),
        Operation::Delete { at } => tree.remove_node(&at).map(|_| ()),
        Operation::Update { at, element } => tree.replace_node(&at, element).map(|_| ()),
        Operation::Move { from, to } => tree.move_node(&from, &to),
    }
}

impl<V: Clone> OrderedCollection for TreeNode<V> {
    type Element = TreeNode<V>;
    type Index = IndexPath;

    fn element_at(&self, index: &IndexPath) -> Option<TreeNode<V>> {
        self.node(index).cloned()
    }

    fn apply(&mut self, op: Operation<TreeNode<V>, IndexPath>) -> IndexResult<()> {
        apply_to_tree(self, op)
    }
}

impl<V: Clone> OrderedCollection for TreeArray<V> {
    type Element = TreeNode<V>;
    type Index = IndexPath;

    fn element_at(&self, index: &IndexPath) -> Option<TreeNode<V>> {
        self.node(index).cloned()
    }

    fn apply(&mut self, op: Operation<TreeNode<V>, IndexPath>) -> IndexResult<()> {
        apply_to_tree(self, op)
    }
}

//! Sectioned collections.
//!
//! An [`Array2D`] is a two-level tree: section nodes at depth one and item
//! nodes at depth two. It reuses the tree machinery unmodified, so section
//! `s` lives at path `[s]` and item `i` of that section at `[s, i]`.

use serde::{Deserialize, Serialize};

use crate::collection::OrderedCollection;
use crate::error::IndexResult;
use crate::operation::Operation;
use crate::path::IndexPath;
use crate::tree::{apply_to_tree, Tree, TreeNode};

/// Value of an [`Array2D`] node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Array2DElement<S, T> {
    Section(S),
    Item(T),
}

impl<S, T> Array2DElement<S, T> {
    pub fn section(&self) -> Option<&S> {
        match self {
            Array2DElement::Section(s) => Some(s),
            Array2DElement::Item(_) => None,
        }
    }

    pub fn item(&self) -> Option<&T> {
        match self {
            Array2DElement::Item(t) => Some(t),
            Array2DElement::Section(_) => None,
        }
    }
}

/// Node type stored in an [`Array2D`].
pub type Array2DNode<S, T> = TreeNode<Array2DElement<S, T>>;

/// Sections of items.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Array2D<S, T> {
    nodes: Vec<Array2DNode<S, T>>,
}

impl<S, T> Default for Array2D<S, T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<S, T> Array2D<S, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(section metadata, items)` pairs.
    pub fn from_sections(sections: impl IntoIterator<Item = (S, Vec<T>)>) -> Self {
        Self {
            nodes: sections
                .into_iter()
                .map(|(metadata, items)| Self::section_node(metadata, items))
                .collect(),
        }
    }

    /// A section node holding `items`.
    pub fn section_node(metadata: S, items: Vec<T>) -> Array2DNode<S, T> {
        TreeNode::with_children(
            Array2DElement::Section(metadata),
            items.into_iter().map(Self::item_node).collect(),
        )
    }

    pub fn item_node(item: T) -> Array2DNode<S, T> {
        TreeNode::new(Array2DElement::Item(item))
    }

    pub fn section_count(&self) -> usize {
        self.nodes.len()
    }

    /// Metadata of section `index`.
    pub fn section(&self, index: usize) -> Option<&S> {
        self.nodes.get(index)?.value.section()
    }

    /// Number of items in section `index`.
    pub fn item_count(&self, section: usize) -> Option<usize> {
        self.nodes.get(section).map(|node| node.children.len())
    }

    /// Item at `[section, item]`.
    pub fn item(&self, path: &IndexPath) -> Option<&T> {
        match path.as_slice() {
            [_, _] => self.node(path)?.value.item(),
            _ => None,
        }
    }

    /// Items of section `index`, in order.
    pub fn items(&self, section: usize) -> impl Iterator<Item = &T> + '_ {
        self.nodes
            .get(section)
            .into_iter()
            .flat_map(|node| node.children.iter())
            .filter_map(|node| node.value.item())
    }
}

impl<S, T> Tree for Array2D<S, T> {
    type Value = Array2DElement<S, T>;

    fn children(&self) -> &[Array2DNode<S, T>] {
        &self.nodes
    }

    fn children_mut(&mut self) -> &mut Vec<Array2DNode<S, T>> {
        &mut self.nodes
    }
}

impl<S: Clone, T: Clone> OrderedCollection for Array2D<S, T> {
    type Element = Array2DNode<S, T>;
    type Index = IndexPath;

    fn element_at(&self, index: &IndexPath) -> Option<Array2DNode<S, T>> {
        self.node(index).cloned()
    }

    fn apply(&mut self, op: Operation<Array2DNode<S, T>, IndexPath>) -> IndexResult<()> {
        apply_to_tree(self, op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Array2D<&'static str, i32> {
        Array2D::from_sections(vec![("first", vec![1, 2]), ("second", vec![3])])
    }

    #[test]
    fn sections_and_items_are_paths() {
        let array = sample();
        assert_eq!(array.section_count(), 2);
        assert_eq!(array.section(1), Some(&"second"));
        assert_eq!(array.item(&IndexPath::from([0, 1])), Some(&2));
        assert_eq!(array.item(&IndexPath::from([1])), None);
        assert_eq!(array.items(0).copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(array.item_count(1), Some(1));
        assert_eq!(array.node_count(), 5);
    }

    #[test]
    fn replay_moves_item_between_sections() {
        let mut array = sample();
        array
            .apply(Operation::Move {
                from: IndexPath::from([0, 0]),
                to: IndexPath::from([1, 0]),
            })
            .unwrap();
        assert_eq!(array.items(0).copied().collect::<Vec<_>>(), vec![2]);
        assert_eq!(array.items(1).copied().collect::<Vec<_>>(), vec![1, 3]);
    }
}

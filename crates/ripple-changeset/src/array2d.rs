//! Mutators for tracked sectioned collections.
//!
//! Sections are addressed by their offset, items by a two-component path
//! `[section, item]`.

use std::fmt;

use ripple_diff::{diff_slices_by, OrderedDiff};
use ripple_types::{Array2D, Array2DElement, Array2DNode, IndexError, IndexPath, IndexResult, Operation, Tree};

use crate::container::ChangesetContainer;
use crate::error::ChangesetResult;

fn section_path(index: usize) -> IndexPath {
    IndexPath::from([index])
}

fn item_slot(at: &IndexPath) -> IndexResult<()> {
    if at.depth() == 2 {
        Ok(())
    } else {
        Err(IndexError::KindMismatch(at.clone(), "item"))
    }
}

fn into_item<S, T>(node: Array2DNode<S, T>, at: &IndexPath) -> IndexResult<T> {
    match node.value {
        Array2DElement::Item(item) => Ok(item),
        Array2DElement::Section(_) => Err(IndexError::KindMismatch(at.clone(), "item")),
    }
}

fn into_section<S, T>(node: Array2DNode<S, T>, at: &IndexPath) -> IndexResult<(S, Vec<T>)> {
    let metadata = match node.value {
        Array2DElement::Section(metadata) => metadata,
        Array2DElement::Item(_) => return Err(IndexError::KindMismatch(at.clone(), "section")),
    };
    let items = node
        .children
        .into_iter()
        .enumerate()
        .map(|(i, child)| into_item(child, &at.appending(i)))
        .collect::<IndexResult<Vec<_>>>()?;
    Ok((metadata, items))
}

impl<S, T> ChangesetContainer<Array2D<S, T>>
where
    S: Clone + fmt::Debug + Send + Sync + 'static,
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    pub fn section_count(&self) -> usize {
        self.with_collection(Array2D::section_count)
    }

    pub fn section(&self, index: usize) -> Option<S> {
        self.with_collection(|array| array.section(index).cloned())
    }

    pub fn item(&self, at: &IndexPath) -> Option<T> {
        self.with_collection(|array| array.item(at).cloned())
    }

    /// Append a section holding `items`.
    pub fn append_section(&self, metadata: S, items: Vec<T>) -> ChangesetResult<()> {
        let at = self.section_count();
        self.insert_section(metadata, items, at)
    }

    pub fn insert_section(&self, metadata: S, items: Vec<T>, at: usize) -> ChangesetResult<()> {
        self.descriptive_update(|array| {
            let node = Array2D::section_node(metadata, items);
            let at = section_path(at);
            array.insert_node(node.clone(), &at)?;
            Ok((vec![Operation::Insert { element: node, at }], ()))
        })
    }

    /// Append `item` to the end of `section`.
    pub fn append_item(&self, item: T, section: usize) -> ChangesetResult<()> {
        let len = self
            .with_collection(|array| array.item_count(section))
            .ok_or_else(|| IndexError::InvalidPath(section_path(section)))?;
        self.insert_item(item, &IndexPath::from([section, len]))
    }

    pub fn insert_item(&self, item: T, at: &IndexPath) -> ChangesetResult<()> {
        self.insert_items(vec![item], at)
    }

    /// Insert `items` consecutively starting at `at`.
    pub fn insert_items(&self, items: Vec<T>, at: &IndexPath) -> ChangesetResult<()> {
        self.descriptive_update(|array| {
            item_slot(at)?;
            let nodes: Vec<_> = items.into_iter().map(Array2D::item_node).collect();
            let patch = nodes
                .iter()
                .enumerate()
                .map(|(k, node)| Operation::Insert {
                    element: node.clone(),
                    at: at.advanced(k as isize, 1),
                })
                .collect();
            array.insert_nodes(nodes, at)?;
            Ok((patch, ()))
        })
    }

    pub fn move_section(&self, from: usize, to: usize) -> ChangesetResult<()> {
        self.descriptive_update(|array| {
            let (from, to) = (section_path(from), section_path(to));
            array.move_node(&from, &to)?;
            Ok((vec![Operation::Move { from, to }], ()))
        })
    }

    /// Move an item, possibly into another section.
    pub fn move_item(&self, from: &IndexPath, to: &IndexPath) -> ChangesetResult<()> {
        self.descriptive_update(|array| {
            item_slot(from)?;
            item_slot(to)?;
            array.move_node(from, to)?;
            Ok((
                vec![Operation::Move {
                    from: from.clone(),
                    to: to.clone(),
                }],
                (),
            ))
        })
    }

    /// Remove a section, returning its metadata and items.
    pub fn remove_section(&self, at: usize) -> ChangesetResult<(S, Vec<T>)> {
        self.descriptive_update(|array| {
            let at = section_path(at);
            let removed = into_section(array.remove_node(&at)?, &at)?;
            Ok((vec![Operation::Delete { at }], removed))
        })
    }

    pub fn remove_item(&self, at: &IndexPath) -> ChangesetResult<T> {
        self.descriptive_update(|array| {
            item_slot(at)?;
            let item = into_item(array.remove_node(at)?, at)?;
            Ok((vec![Operation::Delete { at: at.clone() }], item))
        })
    }

    /// Empty every section. The sections themselves stay.
    pub fn remove_all_items(&self) -> ChangesetResult<Vec<Vec<T>>> {
        self.descriptive_update(|array| {
            let mut patch = Vec::new();
            let mut removed = Vec::with_capacity(array.section_count());
            for (s, section) in array.children_mut().iter_mut().enumerate().rev() {
                patch.extend(
                    (0..section.children.len())
                        .rev()
                        .map(|i| Operation::Delete { at: IndexPath::from([s, i]) }),
                );
                let at = section_path(s);
                let items = std::mem::take(&mut section.children)
                    .into_iter()
                    .enumerate()
                    .map(|(i, node)| into_item(node, &at.appending(i)))
                    .collect::<IndexResult<Vec<_>>>()?;
                removed.push(items);
            }
            removed.reverse();
            Ok((patch, removed))
        })
    }

    /// Remove every section and item.
    pub fn remove_all_sections(&self) -> ChangesetResult<Vec<(S, Vec<T>)>> {
        self.descriptive_update(|array| {
            let count = array.section_count();
            let patch = (0..count).rev().map(|s| Operation::Delete { at: section_path(s) }).collect();
            let removed = std::mem::take(array.children_mut())
                .into_iter()
                .enumerate()
                .map(|(s, node)| into_section(node, &section_path(s)))
                .collect::<IndexResult<Vec<_>>>()?;
            Ok((patch, removed))
        })
    }

    /// Replace the item at `at`, returning the previous one.
    pub fn set_item(&self, at: &IndexPath, item: T) -> ChangesetResult<T> {
        self.descriptive_update(|array| {
            item_slot(at)?;
            let node = Array2D::item_node(item);
            let previous = into_item(array.replace_node(at, node.clone())?, at)?;
            Ok((
                vec![Operation::Update {
                    at: at.clone(),
                    element: node,
                }],
                previous,
            ))
        })
    }

    /// Replace the metadata of section `at`, keeping its items.
    pub fn set_section(&self, at: usize, metadata: S) -> ChangesetResult<S> {
        self.descriptive_update(|array| {
            let at = section_path(at);
            let node = array
                .node_mut(&at)
                .ok_or_else(|| IndexError::InvalidPath(at.clone()))?;
            let previous = match std::mem::replace(&mut node.value, Array2DElement::Section(metadata)) {
                Array2DElement::Section(previous) => previous,
                Array2DElement::Item(_) => return Err(IndexError::KindMismatch(at, "section").into()),
            };
            let element = node.clone();
            Ok((vec![Operation::Update { at, element }], previous))
        })
    }

    /// Replace the items of `section`. With `perform_diff` observers receive
    /// item-level inserts, deletes and moves; otherwise the section is
    /// reported as updated.
    pub fn replace_items(&self, section: usize, items: Vec<T>, perform_diff: bool) -> ChangesetResult<()>
    where
        T: PartialEq,
    {
        if perform_diff {
            self.replace_items_by(section, items, |a, b| a == b)
        } else {
            self.descriptive_update(|array| {
                let at = section_path(section);
                let node = array
                    .node_mut(&at)
                    .ok_or_else(|| IndexError::InvalidPath(at.clone()))?;
                node.children = items.into_iter().map(Array2D::item_node).collect();
                let element = node.clone();
                Ok((vec![Operation::Update { at, element }], ()))
            })
        }
    }

    /// Replace the items of `section`, diffing them with `eq`.
    pub fn replace_items_by(&self, section: usize, items: Vec<T>, eq: impl Fn(&T, &T) -> bool) -> ChangesetResult<()> {
        let mut array = self.collection();
        let at = section_path(section);
        let node = array
            .node_mut(&at)
            .ok_or_else(|| IndexError::InvalidPath(at.clone()))?;
        let old: Vec<T> = node.children.iter().filter_map(|n| n.value.item().cloned()).collect();
        let diff: OrderedDiff<IndexPath> =
            diff_slices_by(&old, &items, eq, &self.config().diff).map(|i| IndexPath::from([section, i]));
        node.children = items.into_iter().map(Array2D::item_node).collect();
        self.replace_described(array, diff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChangesetError;
    use crate::router::ChangesetStream;
    use ripple_diff::Move;
    use ripple_types::OrderedCollection;

    type Grid = Array2D<&'static str, &'static str>;

    fn p(offsets: &[usize]) -> IndexPath {
        IndexPath::from_slice(offsets)
    }

    fn grid() -> Grid {
        Array2D::from_sections([("first", vec!["a"]), ("second", vec!["b", "c"])])
    }

    fn container() -> (ChangesetContainer<Grid>, ChangesetStream<Grid>) {
        let container = ChangesetContainer::new(grid());
        let mut stream = container.subscribe();
        let _ = stream.try_recv();
        (container, stream)
    }

    fn assert_replays(before: &Grid, stream: &mut ChangesetStream<Grid>) {
        let changeset = stream.try_recv().unwrap();
        let mut replayed = before.clone();
        replayed.apply_patch(changeset.patch().unwrap().to_vec()).unwrap();
        assert_eq!(&replayed, changeset.collection());
    }

    #[test]
    fn append_item_to_second_section() {
        let (array, mut stream) = container();
        array.append_item("d", 1).unwrap();
        let changeset = stream.try_recv().unwrap();
        assert_eq!(changeset.diff().unwrap().inserts, vec![p(&[1, 2])]);
        assert_eq!(array.item(&p(&[1, 2])), Some("d"));
    }

    #[test]
    fn moving_item_across_sections_is_one_move() {
        let (array, mut stream) = container();
        array.move_item(&p(&[0, 0]), &p(&[1, 0])).unwrap();
        let changeset = stream.try_recv().unwrap();
        assert_eq!(
            changeset.diff().unwrap(),
            &OrderedDiff::with_moves(vec![Move::new(p(&[0, 0]), p(&[1, 0]))])
        );
        assert_eq!(array.with_collection(|grid| grid.item_count(0)), Some(0));
    }

    #[test]
    fn sections_insert_move_remove() {
        let (array, mut stream) = container();
        array.append_section("third", vec!["x"]).unwrap();
        assert_replays(&grid(), &mut stream);

        let before = array.collection();
        array.move_section(2, 0).unwrap();
        assert_replays(&before, &mut stream);
        assert_eq!(array.section(0), Some("third"));

        let (metadata, items) = array.remove_section(0).unwrap();
        assert_eq!((metadata, items), ("third", vec!["x"]));
        assert_eq!(array.collection(), grid());
    }

    #[test]
    fn items_insert_set_remove() {
        let (array, mut stream) = container();
        array.insert_items(vec!["y", "z"], &p(&[0, 0])).unwrap();
        assert_replays(&grid(), &mut stream);

        assert_eq!(array.set_item(&p(&[0, 2]), "A").unwrap(), "a");
        assert_eq!(stream.try_recv().unwrap().diff().unwrap().updates, vec![p(&[0, 2])]);

        assert_eq!(array.remove_item(&p(&[0, 0])).unwrap(), "y");
        assert_eq!(stream.try_recv().unwrap().diff().unwrap().deletes, vec![p(&[0, 0])]);
    }

    #[test]
    fn set_section_keeps_items() {
        let (array, mut stream) = container();
        assert_eq!(array.set_section(1, "renamed").unwrap(), "second");
        assert_replays(&grid(), &mut stream);
        assert_eq!(array.item(&p(&[1, 1])), Some("c"));
    }

    #[test]
    fn remove_all_items_keeps_sections() {
        let (array, mut stream) = container();
        let removed = array.remove_all_items().unwrap();
        assert_eq!(removed, vec![vec!["a"], vec!["b", "c"]]);
        assert_replays(&grid(), &mut stream);
        assert_eq!(array.section_count(), 2);

        assert_eq!(array.remove_all_sections().unwrap(), vec![("first", vec![]), ("second", vec![])]);
        assert_eq!(array.section_count(), 0);
    }

    #[test]
    fn kind_mismatches_are_rejected() {
        let (array, mut stream) = container();
        assert_eq!(
            array.remove_item(&p(&[0])).unwrap_err(),
            ChangesetError::Index(IndexError::KindMismatch(p(&[0]), "item"))
        );
        assert!(array.insert_item("q", &p(&[0, 0, 0])).is_err());
        assert!(array.move_item(&p(&[0, 0]), &p(&[1])).is_err());
        assert!(array.set_item(&p(&[1, 5]), "q").is_err());
        assert!(array.append_item("q", 4).is_err());
        assert!(array.set_section(3, "q").is_err());
        assert!(stream.try_recv().is_err());
        assert_eq!(array.collection(), grid());
    }

    #[test]
    fn replace_items_with_diff() {
        let (array, mut stream) = container();
        array.replace_items(1, vec!["c", "b", "d"], true).unwrap();
        let changeset = stream.try_recv().unwrap();
        let diff = changeset.diff().unwrap();
        assert!(diff.inserts.contains(&p(&[1, 2])));
        assert!(diff.deletes.is_empty());
        let mut replayed = grid();
        replayed.apply_patch(changeset.patch().unwrap().to_vec()).unwrap();
        assert_eq!(&replayed, changeset.collection());
    }

    #[test]
    fn replace_items_without_diff_updates_section() {
        let (array, mut stream) = container();
        array.replace_items(0, vec!["k"], false).unwrap();
        let changeset = stream.try_recv().unwrap();
        assert_eq!(changeset.diff().unwrap().updates, vec![p(&[0])]);
        assert_eq!(array.item(&p(&[0, 0])), Some("k"));
    }
}

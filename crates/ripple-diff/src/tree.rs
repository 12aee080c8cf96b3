//! Patch/diff conversion for trees indexed by [`IndexPath`].
//!
//! On top of the flat rules, every record cascades through containment: an
//! edit of a path drops, collapses or relocates the recorded entries that
//! live in its subtree. Updates replace whole subtrees, so nothing is
//! tracked inside an updated (or inserted) subtree.

use ripple_types::{simulate_patch, undo_patch, IndexOp, IndexPath, TreeNode};

use crate::error::{DiffError, DiffResult};
use crate::ordered::{DiffIndex, Edit, Move, OrderedDiff};

type PathOp = IndexOp<IndexPath>;

impl DiffIndex for IndexPath {
    fn diff_from_patch(patch: &[PathOp]) -> DiffResult<OrderedDiff<IndexPath>> {
        let mut diff = OrderedDiff::new();
        for (k, op) in patch.iter().enumerate() {
            let prior = &patch[..k];
            match op {
                IndexOp::Insert(at) => diff.record_insertion(at, prior),
                IndexOp::Delete(at) => diff.record_deletion(at, undo_patch(prior, at), prior, op)?,
                IndexOp::Update(at) => diff.record_update(at, undo_patch(prior, at), prior, op)?,
                IndexOp::Move(from, to) => {
                    diff.record_move(from, to, undo_patch(prior, from), prior, op)?
                }
            }
        }
        Ok(diff)
    }

    fn edit_script(diff: &OrderedDiff<IndexPath>) -> Vec<Edit<IndexPath>> {
        // Deletions and move sources, innermost and last first, so every
        // path is still valid when its turn comes. Moved subtrees are parked
        // at the front of the root level.
        let removals: Vec<Edit<IndexPath>> = diff
            .deletes
            .iter()
            .map(|at| Edit::delete(at.clone()))
            .chain(diff.moves.iter().map(|m| Edit::movement(m.from.clone(), m.to.clone())))
            .collect();
        let keys: Vec<IndexPath> = removals.iter().filter_map(|e| e.deletion.clone()).collect();
        let mut deletion_script: Vec<Edit<IndexPath>> = preorder(&containment_forest(&keys))
            .into_iter()
            .rev()
            .map(|i| removals[i].clone())
            .collect();

        let mut seeds = deletion_script.clone();
        let mut parked = 0usize;
        for (edit, seed) in deletion_script.iter_mut().zip(seeds.iter_mut()) {
            if let Some(at) = edit.deletion.as_mut() {
                *at = at.advanced(parked as isize, 0);
                seed.deletion = Some(IndexPath::from([parked]));
            }
            if edit.insertion.is_some() {
                edit.insertion = Some(IndexPath::from([parked]));
                parked += 1;
            }
        }

        // Insertions and move targets, outermost and first first, pulling
        // moved subtrees back out of the park.
        let placements: Vec<Edit<IndexPath>> = seeds
            .into_iter()
            .filter(|e| e.insertion.is_some())
            .chain(diff.inserts.iter().map(|at| Edit::insert(at.clone())))
            .collect();
        let keys: Vec<IndexPath> = placements.iter().filter_map(|e| e.insertion.clone()).collect();
        let mut insertion_script: Vec<Edit<IndexPath>> = preorder(&containment_forest(&keys))
            .into_iter()
            .map(|i| placements[i].clone())
            .collect();

        for i in 0..insertion_script.len() {
            if let Some(prior) = insertion_script[i].deletion.clone() {
                for later in &mut insertion_script[i + 1..] {
                    if let Some(at) = later.deletion.as_mut() {
                        if at.is_affected_by(&prior) {
                            *at = at.shifted(-1, &prior);
                        }
                    }
                }
            }
            let unparks = insertion_script[i].deletion.is_some();
            if let Some(at) = insertion_script[i].insertion.as_mut() {
                if unparks {
                    parked -= 1;
                }
                *at = at.advanced(parked as isize, 0);
            }
        }

        deletion_script.extend(insertion_script);
        deletion_script
    }
}

/// Group `keys` by path containment: every key becomes a node (holding its
/// position in `keys`) below the closest key that is its ancestor. Siblings
/// are kept sorted by path.
fn containment_forest(keys: &[IndexPath]) -> Vec<TreeNode<usize>> {
    fn place(nodes: &mut Vec<TreeNode<usize>>, value: usize, keys: &[IndexPath]) {
        let key = &keys[value];
        if let Some(parent) = nodes.iter_mut().find(|n| keys[n.value].is_ancestor_of(key)) {
            place(&mut parent.children, value, keys);
            return;
        }
        let mut node = TreeNode::new(value);
        let mut i = nodes.len();
        while i > 0 {
            i -= 1;
            if key.is_ancestor_of(&keys[nodes[i].value]) {
                node.children.push(nodes.remove(i));
            }
        }
        node.children.reverse();
        let at = nodes.partition_point(|n| keys[n.value] < *key);
        nodes.insert(at, node);
    }

    let mut forest = Vec::new();
    for value in 0..keys.len() {
        place(&mut forest, value, keys);
    }
    forest
}

fn preorder(nodes: &[TreeNode<usize>]) -> Vec<usize> {
    fn walk(nodes: &[TreeNode<usize>], out: &mut Vec<usize>) {
        for node in nodes {
            out.push(node.value);
            walk(&node.children, out);
        }
    }
    let mut out = Vec::new();
    walk(nodes, &mut out);
    out
}

fn unresolved(op: &PathOp) -> DiffError {
    DiffError::UnresolvedSource {
        op: format!("{op:?}"),
    }
}

impl OrderedDiff<IndexPath> {
    fn updates_in_final(&self, patch: &[PathOp]) -> Vec<Option<IndexPath>> {
        self.updates
            .iter()
            .map(|u| simulate_patch(patch, u))
            .collect()
    }

    fn any_update_contains(&self, patch: &[PathOp], at: &IndexPath) -> bool {
        self.updates_in_final(patch)
            .iter()
            .flatten()
            .any(|u| u.is_ancestor_of(at))
    }

    fn for_each_destination(
        &mut self,
        skip_inserts: &[usize],
        skip_moves: &[usize],
        mut apply: impl FnMut(&mut IndexPath),
    ) {
        for (i, index) in self.inserts.iter_mut().enumerate() {
            if !skip_inserts.contains(&i) {
                apply(index);
            }
        }
        for (i, m) in self.moves.iter_mut().enumerate() {
            if !skip_moves.contains(&i) {
                apply(&mut m.to);
            }
        }
    }

    fn shift_destinations(&mut self, at: &IndexPath, by: isize) {
        self.for_each_destination(&[], &[], |index| {
            if index.is_affected_by(at) {
                *index = index.shifted(by, at);
            }
        });
    }

    fn record_insertion(&mut self, at: &IndexPath, patch: &[PathOp]) {
        if self.inserts.iter().any(|i| i.is_ancestor_of(at)) {
            return;
        }
        if self.any_update_contains(patch, at) {
            return;
        }
        self.shift_destinations(at, 1);
        self.inserts.push(at.clone());
    }

    fn record_deletion(
        &mut self,
        at: &IndexPath,
        source: Option<IndexPath>,
        patch: &[PathOp],
        op: &PathOp,
    ) -> DiffResult<()> {
        let updates_in_final = self.updates_in_final(patch);

        // Inside a replaced subtree: nothing to track.
        if updates_in_final.iter().flatten().any(|u| u.is_ancestor_of(at)) {
            return Ok(());
        }
        if self.inserts.iter().any(|i| i.is_ancestor_of(at)) {
            return Ok(());
        }

        if let Some(i) = self.inserts.iter().position(|i| i == at) {
            self.inserts.remove(i);
            self.shift_destinations(at, -1);
            return Ok(());
        }

        let source = source.ok_or_else(|| unresolved(op))?;

        // Moves into the deleted subtree now delete their source.
        let mut i = self.moves.len();
        while i > 0 {
            i -= 1;
            if at.is_ancestor_of(&self.moves[i].to) {
                let moved = self.moves.remove(i);
                self.deletes.push(moved.from);
            }
        }

        let doomed: Vec<usize> = updates_in_final
            .iter()
            .enumerate()
            .filter(|(_, u)| u.as_ref().is_some_and(|u| u == at || at.is_ancestor_of(u)))
            .map(|(i, _)| i)
            .collect();
        for i in doomed.into_iter().rev() {
            self.updates.remove(i);
        }

        self.inserts.retain(|i| !at.is_ancestor_of(i));

        if let Some(i) = self.moves.iter().position(|m| m.to == *at) {
            let moved = self.moves.remove(i);
            self.deletes.push(moved.from);
            self.shift_destinations(at, -1);
            return Ok(());
        }

        self.deletes.push(source);
        self.shift_destinations(at, -1);
        Ok(())
    }

    fn record_update(
        &mut self,
        at: &IndexPath,
        source: Option<IndexPath>,
        patch: &[PathOp],
        op: &PathOp,
    ) -> DiffResult<()> {
        if self.inserts.iter().any(|i| i == at || i.is_ancestor_of(at)) {
            return Ok(());
        }
        if self
            .updates_in_final(patch)
            .iter()
            .flatten()
            .any(|u| u == at || u.is_ancestor_of(at))
        {
            return Ok(());
        }

        self.inserts.retain(|i| !at.is_ancestor_of(i));

        // Moves into the replaced subtree collapse into deletions of their
        // sources.
        let mut replayed = patch.to_vec();
        while let Some(moved) = self.moves.iter().find(|m| at.is_ancestor_of(&m.to)).cloned() {
            self.record_deletion(&moved.to, Some(moved.from.clone()), &replayed, op)?;
            if self.moves.contains(&moved) {
                return Err(DiffError::Inconsistent(format!(
                    "move {moved:?} into updated subtree {at} could not be collapsed"
                )));
            }
            replayed.push(IndexOp::Delete(moved.to));
        }

        if let Some(i) = self.moves.iter().position(|m| m.to == *at) {
            self.replace_move_with_delete_insert(i);
            return Ok(());
        }

        let source = source.ok_or_else(|| unresolved(op))?;

        self.updates.retain(|u| !source.is_ancestor_of(u));
        self.deletes.retain(|d| !source.is_ancestor_of(d));

        // Moves out of the replaced subtree: their targets become plain
        // insertions, and whatever was moved into those targets is gone.
        let mut obliterated = false;
        while let Some(i) = self.moves.iter().position(|m| source.is_ancestor_of(&m.from)) {
            let moved = self.moves.remove(i);
            if !self.inserts.iter().any(|x| x.is_ancestor_of(&moved.to)) {
                self.inserts.push(moved.to.clone());
                self.inserts.retain(|x| !moved.to.is_ancestor_of(x));
            }
            while let Some(j) = self.moves.iter().position(|n| moved.to.is_ancestor_of(&n.to)) {
                let nested = self.moves.remove(j);
                if !source.is_ancestor_of(&nested.from) {
                    self.updates.retain(|u| !nested.from.is_ancestor_of(u));
                    obliterated |= nested.from.is_ancestor_of(&source);
                    self.deletes.push(nested.from);
                }
            }
        }

        if !obliterated {
            self.updates.push(source);
        }
        Ok(())
    }

    fn record_move(
        &mut self,
        from: &IndexPath,
        to: &IndexPath,
        source: Option<IndexPath>,
        patch: &[PathOp],
        op: &PathOp,
    ) -> DiffResult<()> {
        if from == to {
            return Ok(());
        }

        let updates_in_final = self.updates_in_final(patch);
        let mut after_removal = patch.to_vec();
        after_removal.push(IndexOp::Delete(from.clone()));

        // Moving an inserted or updated subtree: delete here, insert there.
        if self.inserts.contains(from) || updates_in_final.iter().flatten().any(|u| u == from) {
            self.record_deletion(from, source, patch, op)?;
            self.record_insertion(to, &after_removal);
            return Ok(());
        }

        // Moving out of an inserted or updated subtree: an insertion.
        if self.inserts.iter().any(|i| i.is_ancestor_of(from))
            || updates_in_final.iter().flatten().any(|u| u.is_ancestor_of(from))
        {
            self.record_insertion(to, patch);
            return Ok(());
        }

        // Moving into an updated subtree: a deletion.
        if self.any_update_contains(&after_removal, to) {
            return self.record_deletion(from, source, patch, op);
        }

        // Moving into an inserted subtree (as it will be once the move's own
        // removal is accounted for): a deletion.
        let offset_inserts_contain_target = self.inserts.iter().any(|index| {
            let offset = if from.is_ancestor_of(index) {
                index.replacing_ancestor(from, to)
            } else if index.is_affected_by(from) {
                index.shifted(-1, from)
            } else {
                index.clone()
            };
            offset.is_ancestor_of(to)
        });
        if offset_inserts_contain_target {
            return self.record_deletion(from, source, patch, op);
        }

        // Entries inside the moved subtree travel with it.
        let mut inserts_into_subtree = Vec::new();
        for (i, index) in self.inserts.iter_mut().enumerate() {
            if from.is_ancestor_of(index) {
                *index = index.replacing_ancestor(from, to);
                inserts_into_subtree.push(i);
            }
        }
        let mut moves_into_subtree = Vec::new();
        for (i, m) in self.moves.iter_mut().enumerate() {
            if from.is_ancestor_of(&m.to) {
                m.to = m.to.replacing_ancestor(from, to);
                moves_into_subtree.push(i);
            }
        }

        let retarget = self
            .moves
            .iter()
            .enumerate()
            .find(|(i, m)| m.to == *from && !moves_into_subtree.contains(i))
            .map(|(i, _)| i);
        let mut unshifted_moves = moves_into_subtree.clone();
        unshifted_moves.extend(retarget);

        self.for_each_destination(&inserts_into_subtree, &unshifted_moves, |index| {
            if index.is_affected_by(from) {
                *index = index.shifted(-1, from);
            }
        });
        self.for_each_destination(&inserts_into_subtree, &unshifted_moves, |index| {
            if index.is_affected_by(to) {
                *index = index.shifted(1, to);
            }
        });

        if let Some(i) = retarget {
            self.moves[i].to = to.clone();
            return Ok(());
        }

        let source = source.ok_or_else(|| unresolved(op))?;
        self.moves.push(Move::new(source, to.clone()));
        Ok(())
    }

    fn replace_move_with_delete_insert(&mut self, index: usize) {
        let moved = self.moves.remove(index);

        while let Some(i) = self
            .moves
            .iter()
            .position(|m| moved.from.is_ancestor_of(&m.from) || moved.to.is_ancestor_of(&m.to))
        {
            self.replace_move_with_delete_insert(i);
        }

        self.updates.retain(|u| !moved.from.is_ancestor_of(u));
        self.deletes.retain(|d| !moved.from.is_ancestor_of(d));
        self.inserts.retain(|i| !moved.to.is_ancestor_of(i));

        if !self.inserts.iter().any(|i| i.is_ancestor_of(&moved.to)) {
            self.inserts.push(moved.to);
        }
        self.deletes.push(moved.from);
    }
}

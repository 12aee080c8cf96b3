//! Patch/diff conversion for flat collections indexed by `usize`.

use ripple_types::{undo_patch, IndexOp};

use crate::error::{DiffError, DiffResult};
use crate::ordered::{DiffIndex, Edit, Move, OrderedDiff};

impl DiffIndex for usize {
    fn diff_from_patch(patch: &[IndexOp<usize>]) -> DiffResult<OrderedDiff<usize>> {
        let mut diff = OrderedDiff::new();
        for (k, op) in patch.iter().enumerate() {
            let prior = &patch[..k];
            match *op {
                IndexOp::Insert(at) => diff.record_insertion(at),
                IndexOp::Delete(at) => diff.record_deletion(at, undo_patch(prior, &at), op)?,
                IndexOp::Update(at) => diff.record_update(at, undo_patch(prior, &at), op)?,
                IndexOp::Move(from, to) => diff.record_move(from, to, undo_patch(prior, &from), op)?,
            }
        }
        Ok(diff)
    }

    fn edit_script(diff: &OrderedDiff<usize>) -> Vec<Edit<usize>> {
        let mut script: Vec<Edit<usize>> = diff
            .deletes
            .iter()
            .map(|&at| Edit::delete(at))
            .chain(diff.moves.iter().map(|m| Edit::movement(m.from, m.to)))
            .chain(diff.inserts.iter().map(|&at| Edit::insert(at)))
            .collect();
        let n = script.len();

        // Deletions run first to last: each one closes the gap for later
        // deletions behind it.
        for i in 0..n {
            if let Some(prior) = script[i].deletion {
                for later in &mut script[i + 1..] {
                    if let Some(d) = later.deletion.as_mut() {
                        if *d >= prior {
                            *d -= 1;
                        }
                    }
                }
            }
        }

        // Insertions are final positions: an earlier insertion lands before
        // every later, smaller one is made.
        for i in (0..n).rev() {
            if let Some(later) = script[i].insertion {
                for earlier in &mut script[..i] {
                    if let Some(ins) = earlier.insertion.as_mut() {
                        if *ins > later {
                            *ins -= 1;
                        }
                    }
                }
            }
        }

        // Interleave: pending deletions push insertions back and vice versa.
        for i in 0..n {
            for j in (i + 1..n).rev() {
                if let (Some(ins), Some(del)) = (script[i].insertion, script[j].deletion) {
                    if ins > del {
                        script[i].insertion = Some(ins + 1);
                    }
                }
                if let (Some(del), Some(ins)) = (script[j].deletion, script[i].insertion) {
                    if del >= ins {
                        script[j].deletion = Some(del + 1);
                    }
                }
            }
        }

        script
    }
}

fn unresolved(op: &IndexOp<usize>) -> DiffError {
    DiffError::UnresolvedSource {
        op: format!("{op:?}"),
    }
}

impl OrderedDiff<usize> {
    fn for_each_destination(&mut self, mut apply: impl FnMut(&mut usize)) {
        self.inserts.iter_mut().for_each(&mut apply);
        self.moves.iter_mut().for_each(|m| apply(&mut m.to));
    }

    fn record_insertion(&mut self, at: usize) {
        self.for_each_destination(|index| {
            if at <= *index {
                *index += 1;
            }
        });
        self.inserts.push(at);
    }

    fn record_deletion(&mut self, at: usize, source: Option<usize>, op: &IndexOp<usize>) -> DiffResult<()> {
        if let Some(i) = self.inserts.iter().position(|&x| x == at) {
            // Deleting an inserted element cancels the insertion.
            self.inserts.remove(i);
        } else if let Some(i) = self.moves.iter().position(|m| m.to == at) {
            let moved = self.moves.remove(i);
            self.deletes.push(moved.from);
        } else {
            let source = source.ok_or_else(|| unresolved(op))?;
            self.updates.retain(|&u| u != source);
            self.deletes.push(source);
        }
        self.for_each_destination(|index| {
            if at <= *index {
                *index -= 1;
            }
        });
        Ok(())
    }

    fn record_update(&mut self, at: usize, source: Option<usize>, op: &IndexOp<usize>) -> DiffResult<()> {
        if self.inserts.contains(&at) {
            return Ok(());
        }
        if source.is_some_and(|s| self.updates.contains(&s)) {
            return Ok(());
        }
        if let Some(i) = self.moves.iter().position(|m| m.to == at) {
            let moved = self.moves.remove(i);
            self.deletes.push(moved.from);
            self.inserts.push(moved.to);
            return Ok(());
        }
        self.updates.push(source.ok_or_else(|| unresolved(op))?);
        Ok(())
    }

    fn record_move(&mut self, from: usize, to: usize, source: Option<usize>, op: &IndexOp<usize>) -> DiffResult<()> {
        if from == to {
            return Ok(());
        }

        let shift = |index: &mut usize| {
            if from <= *index {
                *index -= 1;
            }
            if to <= *index {
                *index += 1;
            }
        };

        if self.inserts.contains(&from) {
            self.record_deletion(from, source, op)?;
            self.record_insertion(to);
            return Ok(());
        }

        // The retargeted move sits at `from` and must not take part in the
        // shift.
        if let Some(i) = self.moves.iter().position(|m| m.to == from) {
            let mut moved = self.moves.remove(i);
            self.for_each_destination(shift);
            moved.to = to;
            self.moves.insert(i, moved);
            return Ok(());
        }

        if let Some(i) = source.and_then(|s| self.updates.iter().position(|&u| u == s)) {
            self.updates.remove(i);
            self.record_deletion(from, source, op)?;
            self.record_insertion(to);
            return Ok(());
        }

        let source = source.ok_or_else(|| unresolved(op))?;
        self.for_each_destination(shift);
        self.moves.push(Move::new(source, to));
        Ok(())
    }
}

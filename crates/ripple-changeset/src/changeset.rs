use std::fmt;
use std::sync::OnceLock;

use ripple_diff::DiffResult;

use crate::trackable::Trackable;

/// A collection snapshot together with the change that produced it.
///
/// The change is described by a patch, a diff, or both. Whichever half is
/// missing is derived on first access and memoized.
pub struct Changeset<C: Trackable> {
    collection: C,
    description: Description<C>,
}

enum Description<C: Trackable> {
    PatchOnly {
        patch: Vec<C::Operation>,
        diff: OnceLock<DiffResult<C::Diff>>,
    },
    DiffOnly {
        diff: C::Diff,
        patch: OnceLock<DiffResult<Vec<C::Operation>>>,
    },
    Both {
        patch: Vec<C::Operation>,
        diff: C::Diff,
    },
}

impl<C: Trackable> Changeset<C> {
    /// A changeset described by a patch. An empty patch means the collection
    /// was replaced wholesale.
    pub fn new(collection: C, patch: Vec<C::Operation>) -> Self {
        Self {
            collection,
            description: Description::PatchOnly {
                patch,
                diff: OnceLock::new(),
            },
        }
    }

    /// A changeset described by a diff.
    pub fn from_diff(collection: C, diff: C::Diff) -> Self {
        Self {
            collection,
            description: Description::DiffOnly {
                diff,
                patch: OnceLock::new(),
            },
        }
    }

    /// A changeset with both descriptions supplied. They must agree.
    pub fn with_patch_and_diff(collection: C, patch: Vec<C::Operation>, diff: C::Diff) -> Self {
        Self {
            collection,
            description: Description::Both { patch, diff },
        }
    }

    /// The collection after the change.
    pub fn collection(&self) -> &C {
        &self.collection
    }

    pub fn into_collection(self) -> C {
        self.collection
    }

    /// The change as a patch, generating it from the diff if needed.
    pub fn patch(&self) -> DiffResult<&[C::Operation]> {
        match &self.description {
            Description::PatchOnly { patch, .. } | Description::Both { patch, .. } => Ok(patch.as_slice()),
            Description::DiffOnly { diff, patch } => patch
                .get_or_init(|| self.collection.patch_from_diff(diff))
                .as_ref()
                .map(Vec::as_slice)
                .map_err(Clone::clone),
        }
    }

    /// The change as a diff, aggregating it from the patch if needed.
    pub fn diff(&self) -> DiffResult<&C::Diff> {
        match &self.description {
            Description::DiffOnly { diff, .. } | Description::Both { diff, .. } => Ok(diff),
            Description::PatchOnly { patch, diff } => diff
                .get_or_init(|| C::diff_from_patch(patch))
                .as_ref()
                .map_err(Clone::clone),
        }
    }

    /// Returns `true` if the changeset carries no incremental description:
    /// observers should reload the whole collection.
    pub fn is_reload(&self) -> bool {
        matches!(&self.description, Description::PatchOnly { patch, .. } if patch.is_empty())
    }
}

impl<C: Trackable + fmt::Debug> fmt::Debug for Changeset<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Changeset");
        out.field("collection", &self.collection);
        match &self.description {
            Description::PatchOnly { patch, .. } => out.field("patch", patch),
            Description::DiffOnly { diff, .. } => out.field("diff", diff),
            Description::Both { patch, diff } => out.field("patch", patch).field("diff", diff),
        };
        out.finish()
    }
}

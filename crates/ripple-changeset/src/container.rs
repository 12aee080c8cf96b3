use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex, RwLock};
use tracing::{debug, warn};

use crate::changeset::Changeset;
use crate::config::ContainerConfig;
use crate::error::ChangesetResult;
use crate::router::{ChangesetRouter, ChangesetStream};
use crate::trackable::Trackable;

/// Patches collected while a batch runs.
struct Journal<C: Trackable> {
    patch: Vec<C::Operation>,
    reload: bool,
    touched: bool,
}

impl<C: Trackable> Default for Journal<C> {
    fn default() -> Self {
        Self {
            patch: Vec::new(),
            reload: false,
            touched: false,
        }
    }
}

/// Holder of a collection that publishes a [`Changeset`] for every change.
///
/// Mutators work on a copy of the current collection and replace the held
/// changeset only once the new one is fully built, so a failing mutator
/// leaves the container untouched and publishes nothing.
pub struct ChangesetContainer<C: Trackable> {
    state: RwLock<Arc<Changeset<C>>>,
    router: ChangesetRouter<C>,
    batch_lock: ReentrantMutex<()>,
    journal: Option<Mutex<Journal<C>>>,
    config: ContainerConfig,
}

impl<C: Trackable> ChangesetContainer<C> {
    /// Create a container with the default configuration.
    pub fn new(collection: C) -> Self {
        Self::with_config(collection, ContainerConfig::default())
    }

    /// Create a container with `config`. A zero `channel_capacity` is
    /// raised to one; use [`ContainerConfig::validate`] to reject it instead.
    pub fn with_config(collection: C, mut config: ContainerConfig) -> Self {
        if config.channel_capacity == 0 {
            warn!("channel_capacity of 0 raised to 1");
            config.channel_capacity = 1;
        }
        Self {
            state: RwLock::new(Arc::new(Changeset::new(collection, Vec::new()))),
            router: ChangesetRouter::new(),
            batch_lock: ReentrantMutex::new(()),
            journal: None,
            config,
        }
    }

    fn scratch(collection: C, config: ContainerConfig) -> Self {
        Self {
            journal: Some(Mutex::new(Journal::default())),
            ..Self::with_config(collection, config)
        }
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// The most recently published changeset.
    pub fn changeset(&self) -> Arc<Changeset<C>> {
        Arc::clone(&self.state.read())
    }

    /// A copy of the current collection.
    pub fn collection(&self) -> C {
        self.state.read().collection().clone()
    }

    /// Run `f` against the current collection without copying it.
    pub fn with_collection<R>(&self, f: impl FnOnce(&C) -> R) -> R {
        f(self.state.read().collection())
    }

    /// Subscribe to published changesets. The current changeset is
    /// delivered first.
    pub fn subscribe(&self) -> ChangesetStream<C> {
        let current = self.state.read();
        let stream = self
            .router
            .subscribe(self.config.channel_capacity, Arc::clone(&current));
        debug!(subscribers = self.router.subscriber_count(), "subscribed");
        stream
    }

    pub fn subscriber_count(&self) -> usize {
        self.router.subscriber_count()
    }

    /// Apply a single elementary operation.
    pub fn apply(&self, op: C::Operation) -> ChangesetResult<()> {
        self.descriptive_update(|collection| {
            collection.apply_operation(op.clone())?;
            Ok((vec![op], ()))
        })
    }

    /// Mutate a copy of the collection with `update`, which returns the
    /// operations describing what it did, and publish the result.
    ///
    /// Nothing is published if `update` fails or reports no operations.
    pub fn descriptive_update<R>(
        &self,
        update: impl FnOnce(&mut C) -> ChangesetResult<(Vec<C::Operation>, R)>,
    ) -> ChangesetResult<R> {
        let mut collection = self.collection();
        let (patch, out) = update(&mut collection)?;
        if !patch.is_empty() {
            self.publish(Changeset::new(collection, patch))?;
        }
        Ok(out)
    }

    /// Replace the collection wholesale. Observers receive a reload.
    pub fn replace(&self, collection: C) -> ChangesetResult<()> {
        self.publish(Changeset::new(collection, Vec::new()))
    }

    /// Replace the collection, describing the change with `diff`. With an
    /// empty diff the collection is swapped in but nothing is published.
    pub(crate) fn replace_described(&self, collection: C, diff: C::Diff) -> ChangesetResult<()> {
        if C::diff_is_empty(&diff) {
            self.store(Changeset::from_diff(collection, diff));
            return Ok(());
        }
        self.publish(Changeset::from_diff(collection, diff))
    }

    /// Run `block` against a scratch copy of this container and publish
    /// everything it did as one changeset.
    ///
    /// The published patch is the concatenation of the patches the block
    /// produced; a plain [`replace`](Self::replace) inside the block turns
    /// the whole batch into a reload. If the block fails nothing is
    /// published.
    pub fn batch_update<R>(&self, block: impl FnOnce(&ChangesetContainer<C>) -> ChangesetResult<R>) -> ChangesetResult<R> {
        let _guard = self.batch_lock.lock();
        let scratch = Self::scratch(self.collection(), self.config.clone());
        let out = block(&scratch)?;

        let ChangesetContainer { state, journal, .. } = scratch;
        let journal = journal.map(Mutex::into_inner).unwrap_or_default();
        if !journal.touched {
            return Ok(out);
        }
        let collection = match Arc::try_unwrap(state.into_inner()) {
            Ok(changeset) => changeset.into_collection(),
            Err(shared) => shared.collection().clone(),
        };
        if !journal.reload && journal.patch.is_empty() {
            self.store(Changeset::from_diff(collection, C::diff_from_patch(&[])?));
            return Ok(out);
        }
        let patch = if journal.reload { Vec::new() } else { journal.patch };
        debug!(operations = patch.len(), reload = journal.reload, "batch committed");
        self.publish(Changeset::new(collection, patch))?;
        Ok(out)
    }

    /// Swap in a changeset without notifying subscribers.
    fn store(&self, changeset: Changeset<C>) {
        if let Some(journal) = &self.journal {
            journal.lock().touched = true;
        }
        *self.state.write() = Arc::new(changeset);
    }

    fn publish(&self, changeset: Changeset<C>) -> ChangesetResult<()> {
        if let Some(journal) = &self.journal {
            let mut journal = journal.lock();
            if changeset.is_reload() {
                journal.reload = true;
            } else if !journal.reload {
                journal.patch.extend(changeset.patch()?.iter().cloned());
            }
            journal.touched = true;
            *self.state.write() = Arc::new(changeset);
            return Ok(());
        }

        let changeset = Arc::new(changeset);
        let mut current = self.state.write();
        *current = Arc::clone(&changeset);
        self.router.route(&changeset);
        debug!(
            reload = changeset.is_reload(),
            subscribers = self.router.subscriber_count(),
            "changeset published"
        );
        Ok(())
    }
}

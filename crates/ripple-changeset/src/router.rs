use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::changeset::Changeset;
use crate::trackable::Trackable;

/// A broadcast channel receiver for published changesets.
pub type ChangesetStream<C> = broadcast::Receiver<Arc<Changeset<C>>>;

/// Fan-out router: one broadcast channel per subscriber.
pub(crate) struct ChangesetRouter<C: Trackable> {
    subscribers: RwLock<Vec<broadcast::Sender<Arc<Changeset<C>>>>>,
}

impl<C: Trackable> ChangesetRouter<C> {
    pub(crate) fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Register a subscriber. `current` is delivered before anything else.
    pub(crate) fn subscribe(&self, capacity: usize, current: Arc<Changeset<C>>) -> ChangesetStream<C> {
        let (tx, rx) = broadcast::channel(capacity);
        // The receiver is alive, so the replay cannot fail.
        let _ = tx.send(current);
        self.subscribers.write().push(tx);
        rx
    }

    /// Deliver a changeset to every subscriber.
    /// Subscribers whose receivers were dropped are pruned.
    pub(crate) fn route(&self, changeset: &Arc<Changeset<C>>) {
        self.subscribers
            .write()
            .retain(|tx| tx.send(Arc::clone(changeset)).is_ok());
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ripple_types::Operation;

    fn changeset(values: Vec<i32>) -> Arc<Changeset<Vec<i32>>> {
        Arc::new(Changeset::new(values, Vec::new()))
    }

    #[test]
    fn new_subscriber_sees_current_first() {
        let router = ChangesetRouter::new();
        let mut stream = router.subscribe(4, changeset(vec![1]));
        router.route(&Arc::new(Changeset::new(
            vec![1, 2],
            vec![Operation::Insert { element: 2, at: 1 }],
        )));

        assert_eq!(stream.try_recv().unwrap().collection(), &vec![1]);
        assert_eq!(stream.try_recv().unwrap().collection(), &vec![1, 2]);
        assert!(stream.try_recv().is_err());
    }

    #[test]
    fn dropped_receivers_are_pruned() {
        let router = ChangesetRouter::new();
        let kept = router.subscribe(4, changeset(vec![]));
        let dropped = router.subscribe(4, changeset(vec![]));
        assert_eq!(router.subscriber_count(), 2);

        drop(dropped);
        router.route(&changeset(vec![3]));
        assert_eq!(router.subscriber_count(), 1);
        drop(kept);
    }
}

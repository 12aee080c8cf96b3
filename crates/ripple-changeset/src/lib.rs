//! Observable collections for Ripple.
//!
//! A [`ChangesetContainer`] holds a collection and publishes a
//! [`Changeset`] for every mutation: the new collection together with the
//! patch that produced it. Observers read whichever description they need;
//! the other is derived on first access and cached.
//!
//! # Key Types
//!
//! - [`ChangesetContainer`] -- Holder that mutates, batches and publishes
//! - [`Changeset`] -- Collection snapshot plus patch and/or diff
//! - [`Trackable`] -- Collections a container can hold (`Vec`, trees,
//!   `Array2D`, sets, maps)
//! - [`ChangesetStream`] -- Per-subscriber broadcast receiver
//! - [`ContainerConfig`] -- Channel capacity and snapshot-diff settings
//!
//! # Mutators
//!
//! Each collection kind gets its own mutator surface:
//!
//! - `Vec<T>` -- [`ordered`]
//! - `TreeNode<V>` / `TreeArray<V>` -- [`tree`]
//! - `Array2D<S, T>` -- [`array2d`]
//! - `BTreeSet`, `HashSet`, `BTreeMap`, `HashMap` -- [`unordered`]
//!
//! # Design Rules
//!
//! 1. Index preconditions are checked before anything is mutated.
//! 2. A failing mutator publishes nothing and leaves the container as it was.
//! 3. No-op mutations publish nothing.
//! 4. A batch publishes at most one changeset.
//! 5. A new subscriber receives the current changeset first.

pub mod array2d;
pub mod changeset;
pub mod config;
pub mod container;
pub mod error;
pub mod ordered;
pub mod router;
pub mod trackable;
pub mod tree;
pub mod unordered;

pub use changeset::Changeset;
pub use config::ContainerConfig;
pub use container::ChangesetContainer;
pub use error::{ChangesetError, ChangesetResult};
pub use router::ChangesetStream;
pub use trackable::{Trackable, TrackedTree};

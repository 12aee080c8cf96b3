//! Foundation types for Ripple.
//!
//! This crate provides the index algebra, the elementary edit operations and
//! the concrete collections that every other Ripple crate builds on. Patches
//! are replayed against collections here; converting patches to diffs and
//! back lives in `ripple-diff`.
//!
//! # Key Types
//!
//! - [`IndexPath`] -- Path of child offsets addressing a node in a tree
//! - [`Position`] -- Index capability: undo/simulate a single operation
//! - [`Operation`] / [`IndexOp`] -- Elementary edits, with and without elements
//! - [`OrderedCollection`] -- Collections a patch can be replayed against
//! - [`TreeNode`] / [`TreeArray`] -- Rooted tree and rootless forest
//! - [`Array2D`] -- Sections of items modeled as a two-level tree

pub mod array2d;
pub mod collection;
pub mod error;
pub mod operation;
pub mod path;
pub mod position;
pub mod tree;

pub use array2d::{Array2D, Array2DElement, Array2DNode};
pub use collection::OrderedCollection;
pub use error::{IndexError, IndexResult};
pub use operation::{index_ops, IndexOp, Operation};
pub use path::IndexPath;
pub use position::{simulate_patch, undo_patch, Position};
pub use tree::{Tree, TreeArray, TreeNode};

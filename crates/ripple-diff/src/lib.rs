//! Diff engine for Ripple.
//!
//! Converts between the two descriptions of a collection change: a *patch*
//! (ordered elementary operations, each in the index space left by the
//! previous one) and a *diff* (aggregated net effect, deletes and updates in
//! source space, inserts in final space, moves from source to final). Both
//! directions are lossless for flat (`usize`) and tree ([`IndexPath`])
//! indices.
//!
//! # Key Types
//!
//! - [`OrderedDiff`] / [`Move`] -- Aggregated diff of an ordered collection
//! - [`DiffIndex`] -- Index kinds with a patch/diff converter
//! - [`UnorderedDiff`] / [`UnorderedOperation`] -- Changes to sets and maps
//! - [`UnorderedCollection`] -- Keyed replay target (`BTreeSet`, `HashMap`, ...)
//! - [`diff_slices`] / [`diff_trees`] -- Diff two snapshots with `similar`
//! - [`DiffConfig`] -- Sequence-diff algorithm selection
//!
//! [`IndexPath`]: ripple_types::IndexPath

pub mod config;
pub mod error;
pub mod linear;
pub mod ordered;
pub mod sequence;
pub mod tree;
pub mod tree_diff;
pub mod unordered;

pub use config::{DiffAlgorithm, DiffConfig};
pub use error::{DiffError, DiffResult};
pub use ordered::{DiffIndex, Edit, Move, OrderedDiff};
pub use sequence::{diff_slices, diff_slices_by};
pub use tree_diff::{diff_trees, diff_trees_by};
pub use unordered::{UnorderedCollection, UnorderedDiff, UnorderedOperation};

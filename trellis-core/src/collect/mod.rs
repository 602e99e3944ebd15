//! Shared Collections
//!
//! This module implements the structurally-shared set type that failure
//! aggregation is built on.
//!
//! # Why Sharing Matters
//!
//! When failures propagate up a large DAG, every fan-in point unions the
//! root-cause sets of all its failed children. A build graph can have
//! thousands of such points stacked on top of each other, so copying the
//! ever-growing union at each level would make aggregation quadratic in
//! graph size. [`SharedOrderedSet`] instead retains references to the sets
//! it was unioned from, making each union proportional to the number of
//! children, not the number of elements below them.

mod shared_set;

pub use shared_set::SharedOrderedSet;

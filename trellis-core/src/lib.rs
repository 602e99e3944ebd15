//! Trellis Core
//!
//! This crate provides the error-aggregation core of the Trellis incremental
//! build evaluator. When evaluation of a graph node fails, either because its
//! logic returned an error or because the node sits on a dependency cycle,
//! the failure is summarized into an immutable record and propagated to every
//! dependent node, merging with sibling failures along the way.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `graph`: Identity of nodes in the dependency graph
//! - `collect`: Structurally-shared ordered sets for cheap repeated unions
//! - `error`: Failure summaries and their aggregation rules
//!
//! The evaluator itself (graph walking, scheduling, cycle detection) lives
//! outside this crate. This core only consumes its outputs: a failing node's
//! identity, the error it produced with its classification, or a discovered
//! cycle. In return it exposes `ErrorSummary` values the scheduler reads to
//! decide whether to abort, retry, or report.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::io::{Error, ErrorKind};
//! use std::sync::Arc;
//!
//! use trellis_core::error::{ErrorSummary, FailureClassification};
//! use trellis_core::graph::{FunctionKind, NodeId};
//!
//! // A leaf node failed while evaluating.
//! let leaf = NodeId::new(FunctionKind::new("COMPILE"), 7);
//! let summary = ErrorSummary::from_failure(
//!     leaf,
//!     Arc::new(Error::new(ErrorKind::Other, "compile failed")),
//!     FailureClassification::transient(),
//! );
//!
//! // A parent that depends on the failed leaf aggregates it.
//! let parent = NodeId::new(FunctionKind::new("LINK"), 1);
//! let parent_summary = ErrorSummary::from_children(parent, &[summary]).unwrap();
//! assert!(parent_summary.is_transient());
//! ```

pub mod collect;
pub mod error;
pub mod graph;

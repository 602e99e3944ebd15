//! Failure Summaries
//!
//! This module implements the failure model of the evaluator: how a single
//! node's failure is captured, and how failures merge as they propagate up
//! the dependency graph.
//!
//! # Concepts
//!
//! ## Two layers of "error"
//!
//! A node failing to evaluate is an ordinary, expected outcome of a build.
//! Once captured in an [`ErrorSummary`] it is data, not a fault: the
//! scheduler inspects it to decide whether to abort, retry, or keep going.
//!
//! Violating the construction contract of a summary (aggregating zero
//! children, or assembling parts that explain nothing) is a different
//! matter entirely: that is a bug in the caller, rejected at construction
//! time via [`SummaryError`] and never silently repaired.
//!
//! ## Propagation
//!
//! Failures flow bottom-up. A leaf's failure becomes a summary through
//! [`ErrorSummary::from_failure`] or [`ErrorSummary::from_cycle`]; a parent
//! that did not itself fail but depends on failed children combines their
//! summaries with [`ErrorSummary::from_children`], and its own dependents
//! repeat the step. Root-cause sets are unioned structurally (never copied),
//! cycle paths grow by prepending the current node, transience survives only
//! if every contributing cause is transient, and catastrophe survives if any
//! cause is catastrophic.

mod classification;
mod cycle;
mod summary;

pub use classification::{FailureClassification, NodeError};
pub use cycle::CyclePath;
pub use summary::{ErrorSummary, FailureCause, RootCauseSet, SummaryError};

//! Dependency Graph Identity
//!
//! This module defines how nodes of the dependency graph are identified.
//!
//! # Overview
//!
//! The evaluator's graph is a DAG of memoized computations. Each node is one
//! computation instance, identified by the kind of function it runs plus the
//! argument that function was invoked on. Two requests for the same function
//! over the same argument name the same node.
//!
//! Identities are minted by the evaluator's node registry and flow through
//! this crate unchanged: failure summaries record them as root causes and as
//! members of cycle paths, and the scheduler uses them to report which
//! original inputs are to blame.
//!
//! Graph traversal, dirty propagation, and scheduling are the evaluator's
//! concern, not this crate's; only the identity types live here.

mod node;

pub use node::{FunctionKind, NodeId};

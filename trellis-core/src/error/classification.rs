//! Failure Classification
//!
//! Node evaluation logic that fails hands this crate two things: the error
//! it produced, and a classification saying how the evaluator should treat
//! that failure. The classification is declared explicitly by the failing
//! call site per failure kind; nothing here inspects the error to guess it.

use std::error::Error;
use std::sync::Arc;

/// The error a node's evaluation logic produced, as this crate receives it.
///
/// Evaluation functions are heterogeneous, so the concrete type is erased.
/// The `Arc` lets every ancestor summary that selects this cause as its
/// representative hold the same object.
pub type NodeError = Arc<dyn Error + Send + Sync + 'static>;

/// How the evaluator should treat a failure, declared by the site that
/// produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureClassification {
    /// A retry of the failed node might succeed (environmental flakiness,
    /// transient I/O). Permanent failures retry to the same result.
    pub transient: bool,

    /// The whole evaluation must abort immediately, overriding any
    /// keep-going-past-failures policy.
    pub catastrophic: bool,
}

impl FailureClassification {
    /// A permanent, non-catastrophic failure. The common case.
    pub const fn permanent() -> Self {
        Self {
            transient: false,
            catastrophic: false,
        }
    }

    /// A transient, non-catastrophic failure.
    pub const fn transient() -> Self {
        Self {
            transient: true,
            catastrophic: false,
        }
    }

    /// A catastrophic failure, with transience as declared by the caller.
    pub const fn catastrophic(transient: bool) -> Self {
        Self {
            transient,
            catastrophic: true,
        }
    }
}

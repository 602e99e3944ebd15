//! Error Summary
//!
//! The immutable record of why a node failed, and the rules for merging such
//! records as failures propagate up the dependency graph.
//!
//! # How Summaries Are Built
//!
//! There are exactly three ways a summary comes into existence:
//!
//! 1. A node's evaluation logic returned an error: [`ErrorSummary::from_failure`].
//!
//! 2. The cycle checker found the node on (or above) a dependency cycle:
//!    [`ErrorSummary::from_cycle`].
//!
//! 3. A node did not fail itself, but one or more of its dependencies did:
//!    [`ErrorSummary::from_children`] merges the children's summaries.
//!
//! # Merge Policies
//!
//! The child-aggregation rules are asymmetric:
//!
//! - Root causes are unioned structurally in one step, preserving each
//!   child's iteration order.
//! - The representative failure is the first child's, in input order. Callers
//!   pass children in dependency-declaration order, so the choice is
//!   reproducible; it is a documented tie-break, not a severity ranking.
//! - Cycle paths are prepended with the aggregating node, never unioned.
//! - Transience is the AND of the children: a retry is only worthwhile if
//!   every contributing cause could go differently.
//! - Catastrophe is the OR: one catastrophic cause anywhere below must be
//!   visible at every ancestor.

use std::fmt;

use thiserror::Error;
use tracing::debug;

use super::classification::{FailureClassification, NodeError};
use super::cycle::CyclePath;
use crate::collect::SharedOrderedSet;
use crate::graph::NodeId;

/// The leaf nodes whose direct failures ultimately caused a summary.
///
/// Shared structurally between a summary and every ancestor summary that
/// aggregated it; iteration order is stable for a given construction.
pub type RootCauseSet = SharedOrderedSet<NodeId>;

/// Rejection reasons for summary construction.
///
/// Each of these is a contract violation in the calling evaluator code, not
/// a user-facing build condition. Construction refuses to produce a value
/// rather than repair one.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SummaryError {
    /// Neither a failure nor a cycle path was supplied; the summary would
    /// explain nothing.
    #[error("an error summary must carry a failure or at least one cycle path")]
    Unexplained,

    /// A failure error and its originating node must be supplied together.
    #[error("a failure and its originating node must be supplied together")]
    MismatchedFailurePair,

    /// Child aggregation was requested with no children.
    #[error("aggregating child failures requires at least one child summary")]
    NoChildren,
}

/// The error a node produced, paired with the node that produced it.
///
/// The two travel together by construction: a summary either has both or
/// has neither.
#[derive(Debug, Clone)]
pub struct FailureCause {
    error: NodeError,
    originating_node: NodeId,
}

impl FailureCause {
    fn new(error: NodeError, originating_node: NodeId) -> Self {
        Self {
            error,
            originating_node,
        }
    }

    /// The error as produced by the originating node's evaluation logic.
    pub fn error(&self) -> &NodeError {
        &self.error
    }

    /// The node whose evaluation produced the error.
    pub fn originating_node(&self) -> NodeId {
        self.originating_node
    }
}

/// Immutable summary of why a node failed to evaluate.
///
/// Once constructed, a summary is never mutated. Dependent nodes aggregate
/// it by reference: `Clone` bumps the reference counts of the root-cause set
/// and the representative error, so a summary can be a component of many
/// ancestors' summaries being built concurrently on other threads.
#[derive(Debug, Clone)]
pub struct ErrorSummary {
    root_causes: RootCauseSet,
    failure: Option<FailureCause>,
    cycle_paths: Vec<CyclePath>,
    is_transient: bool,
    is_catastrophic: bool,
}

impl ErrorSummary {
    /// Summarize a node whose evaluation logic produced an error.
    ///
    /// The node is its own (sole) root cause; the flags are copied from the
    /// classification the failing site declared.
    pub fn from_failure(
        originating_node: NodeId,
        error: NodeError,
        classification: FailureClassification,
    ) -> Self {
        let summary = Self {
            root_causes: SharedOrderedSet::singleton(originating_node),
            failure: Some(FailureCause::new(error, originating_node)),
            cycle_paths: Vec::new(),
            is_transient: classification.transient,
            is_catastrophic: classification.catastrophic,
        };
        debug_assert!(summary.check_explains_something().is_ok());
        summary
    }

    /// Summarize a node found on a dependency cycle.
    ///
    /// A pure cycle has no root-cause leaf and no error object: the
    /// dependency structure itself is wrong. It is never transient (a retry
    /// re-walks the same edges) and not by itself catastrophic (catastrophe
    /// is reserved for failures that declare it).
    pub fn from_cycle(cycle: CyclePath) -> Self {
        let summary = Self {
            root_causes: SharedOrderedSet::empty(),
            failure: None,
            cycle_paths: vec![cycle],
            is_transient: false,
            is_catastrophic: false,
        };
        debug_assert!(summary.check_explains_something().is_ok());
        summary
    }

    /// Summarize a node that did not fail itself but depends on failed
    /// children.
    ///
    /// `children` must be non-empty and carries the failed dependencies'
    /// summaries in dependency-declaration order. That order is a contract:
    /// the representative failure is the first non-absent one encountered,
    /// and reordering children changes user-visible diagnostics.
    pub fn from_children(
        current_node: NodeId,
        children: &[ErrorSummary],
    ) -> Result<Self, SummaryError> {
        if children.is_empty() {
            return Err(SummaryError::NoChildren);
        }

        // One structural union over all children, not pairwise: cost stays
        // proportional to the child count at every fan-in point.
        let root_causes = SharedOrderedSet::of(
            std::iter::empty(),
            children.iter().map(|child| child.root_causes.clone()),
        );

        let failure = children.iter().find_map(|child| child.failure.clone());
        if let Some(cause) = &failure {
            debug!(
                node = %current_node,
                representative = %cause.originating_node,
                "selected representative failure for aggregate"
            );
        }

        // Each child's cycles are reached through that child, so the current
        // node goes on the front of every path. Child order is preserved.
        let cycle_paths: Vec<CyclePath> = children
            .iter()
            .flat_map(|child| child.cycle_paths.iter())
            .map(|path| path.prepend(current_node))
            .collect();

        let is_transient = children.iter().all(|child| child.is_transient);
        let is_catastrophic = children.iter().any(|child| child.is_catastrophic);

        let summary = Self {
            root_causes,
            failure,
            cycle_paths,
            is_transient,
            is_catastrophic,
        };
        // Every child explains something, so the aggregate does too.
        summary.check_explains_something()?;
        Ok(summary)
    }

    /// Assemble a summary from raw parts, enforcing the construction
    /// contract.
    ///
    /// This is the boundary constructor for evaluator code that persists or
    /// reconstitutes summaries outside the three factory paths. It rejects a
    /// half-present failure pair and a summary that explains nothing.
    pub fn from_parts(
        root_causes: RootCauseSet,
        error: Option<NodeError>,
        originating_node: Option<NodeId>,
        cycle_paths: Vec<CyclePath>,
        is_transient: bool,
        is_catastrophic: bool,
    ) -> Result<Self, SummaryError> {
        let failure = match (error, originating_node) {
            (Some(error), Some(node)) => Some(FailureCause::new(error, node)),
            (None, None) => None,
            _ => return Err(SummaryError::MismatchedFailurePair),
        };

        let summary = Self {
            root_causes,
            failure,
            cycle_paths,
            is_transient,
            is_catastrophic,
        };
        summary.check_explains_something()?;
        Ok(summary)
    }

    fn check_explains_something(&self) -> Result<(), SummaryError> {
        if self.failure.is_none() && self.cycle_paths.is_empty() {
            return Err(SummaryError::Unexplained);
        }
        Ok(())
    }

    /// The leaf nodes whose direct failures caused this summary, in stable
    /// compile order.
    pub fn root_causes(&self) -> &RootCauseSet {
        &self.root_causes
    }

    /// The representative failure, if any node below produced an error.
    pub fn failure(&self) -> Option<&FailureCause> {
        self.failure.as_ref()
    }

    /// Every cycle reachable from this node, with the full path that
    /// reaches it.
    pub fn cycle_paths(&self) -> &[CyclePath] {
        &self.cycle_paths
    }

    /// Whether retrying the failed subgraph could go differently. True only
    /// when every contributing cause is transient.
    pub fn is_transient(&self) -> bool {
        self.is_transient
    }

    /// Whether the whole evaluation must abort, regardless of keep-going
    /// policy. True when any contributing cause is catastrophic.
    pub fn is_catastrophic(&self) -> bool {
        self.is_catastrophic
    }
}

/// Renders the representative failure, or the first cycle chain when no
/// node produced an error.
impl fmt::Display for ErrorSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(cause) = &self.failure {
            write!(f, "{} failed: {}", cause.originating_node, cause.error)
        } else if let Some(cycle) = self.cycle_paths.first() {
            write!(f, "dependency cycle: {}", cycle)
        } else {
            // Construction guarantees a failure or a cycle path exists.
            unreachable!("summary explains nothing")
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fmt;
    use std::sync::Arc;

    use super::*;
    use crate::graph::FunctionKind;

    #[derive(Debug)]
    struct FakeEvalError(&'static str);

    impl fmt::Display for FakeEvalError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl std::error::Error for FakeEvalError {}

    fn node(name: &'static str, key: u64) -> NodeId {
        NodeId::new(FunctionKind::new(name), key)
    }

    fn eval_error(message: &'static str) -> NodeError {
        Arc::new(FakeEvalError(message))
    }

    #[test]
    fn failure_summary_records_the_failing_node() {
        let cause = node("CAUSE", 1234);
        let error = eval_error("disk hiccup");

        let summary = ErrorSummary::from_failure(
            cause,
            error.clone(),
            FailureClassification::transient(),
        );

        let roots: Vec<NodeId> = summary.root_causes().iter().copied().collect();
        assert_eq!(roots, vec![cause]);

        let failure = summary.failure().expect("failure present");
        assert!(Arc::ptr_eq(failure.error(), &error));
        assert_eq!(failure.originating_node(), cause);

        assert!(summary.cycle_paths().is_empty());
        assert!(summary.is_transient());
        assert!(!summary.is_catastrophic());
    }

    #[test]
    fn failure_summary_copies_the_declared_classification() {
        let summary = ErrorSummary::from_failure(
            node("CAUSE", 1),
            eval_error("boom"),
            FailureClassification::catastrophic(false),
        );
        assert!(!summary.is_transient());
        assert!(summary.is_catastrophic());
    }

    #[test]
    fn cycle_summary_has_no_root_causes_and_no_failure() {
        let cycle = CyclePath::new(vec![node("PATH", 1234)], vec![node("CYCLE", 4321)]);

        let summary = ErrorSummary::from_cycle(cycle.clone());

        assert!(summary.root_causes().is_empty());
        assert!(summary.failure().is_none());
        assert_eq!(summary.cycle_paths(), &[cycle]);
        assert!(!summary.is_transient());
        assert!(!summary.is_catastrophic());
    }

    #[test]
    fn aggregation_rejects_an_empty_child_sequence() {
        let result = ErrorSummary::from_children(node("CURRENT", 1), &[]);
        assert_eq!(result.unwrap_err(), SummaryError::NoChildren);
    }

    #[test]
    fn aggregation_picks_the_first_failure_in_child_order() {
        let first_error = eval_error("first");
        let second_error = eval_error("second");

        let cycle_child = ErrorSummary::from_cycle(CyclePath::new(
            vec![],
            vec![node("CYCLE", 1)],
        ));
        let first = ErrorSummary::from_failure(
            node("CAUSE", 1),
            first_error.clone(),
            FailureClassification::permanent(),
        );
        let second = ErrorSummary::from_failure(
            node("CAUSE", 2),
            second_error,
            FailureClassification::permanent(),
        );

        // A cycle-only child ahead of the failures does not win the
        // tie-break; the first child carrying a failure does.
        let aggregate =
            ErrorSummary::from_children(node("CURRENT", 9), &[cycle_child, first, second])
                .unwrap();

        let failure = aggregate.failure().expect("failure present");
        assert!(Arc::ptr_eq(failure.error(), &first_error));
        assert_eq!(failure.originating_node(), node("CAUSE", 1));
    }

    #[test]
    fn aggregation_prepends_the_current_node_to_cycle_paths() {
        let child = ErrorSummary::from_cycle(CyclePath::new(
            vec![node("X", 1)],
            vec![node("Y", 2)],
        ));
        let parent = node("P", 3);

        let aggregate = ErrorSummary::from_children(parent, &[child]).unwrap();

        assert_eq!(
            aggregate.cycle_paths(),
            &[CyclePath::new(vec![parent, node("X", 1)], vec![node("Y", 2)])]
        );
    }

    #[test]
    fn transience_is_the_conjunction_of_children() {
        // Every combination of transience flags across 2 to 5 children.
        for count in 2u32..=5 {
            for mask in 0..(1u32 << count) {
                let children: Vec<ErrorSummary> = (0..count)
                    .map(|i| {
                        ErrorSummary::from_failure(
                            node("CAUSE", u64::from(i)),
                            eval_error("err"),
                            FailureClassification {
                                transient: mask & (1 << i) != 0,
                                catastrophic: false,
                            },
                        )
                    })
                    .collect();

                let aggregate =
                    ErrorSummary::from_children(node("CURRENT", 9), &children).unwrap();
                assert_eq!(aggregate.is_transient(), mask == (1 << count) - 1);
            }
        }
    }

    #[test]
    fn catastrophe_is_the_disjunction_of_children() {
        // Every combination of catastrophe flags across 2 to 5 children.
        for count in 2u32..=5 {
            for mask in 0..(1u32 << count) {
                let children: Vec<ErrorSummary> = (0..count)
                    .map(|i| {
                        ErrorSummary::from_failure(
                            node("CAUSE", u64::from(i)),
                            eval_error("err"),
                            FailureClassification {
                                transient: false,
                                catastrophic: mask & (1 << i) != 0,
                            },
                        )
                    })
                    .collect();

                let aggregate =
                    ErrorSummary::from_children(node("CURRENT", 9), &children).unwrap();
                assert_eq!(aggregate.is_catastrophic(), mask != 0);
            }
        }
    }

    #[test]
    fn root_causes_union_deduplicates_overlap() {
        let shared_leaf = ErrorSummary::from_failure(
            node("CAUSE", 1),
            eval_error("leaf"),
            FailureClassification::permanent(),
        );
        // Two intermediate nodes both aggregate the same leaf.
        let mid_a =
            ErrorSummary::from_children(node("MID", 1), std::slice::from_ref(&shared_leaf))
                .unwrap();
        let mid_b =
            ErrorSummary::from_children(node("MID", 2), std::slice::from_ref(&shared_leaf))
                .unwrap();

        let top = ErrorSummary::from_children(node("TOP", 1), &[mid_a, mid_b]).unwrap();

        let roots: Vec<NodeId> = top.root_causes().iter().copied().collect();
        assert_eq!(roots, vec![node("CAUSE", 1)]);
    }

    #[test]
    fn aggregation_is_deterministic_for_the_same_input_order() {
        let children = vec![
            ErrorSummary::from_failure(
                node("CAUSE", 2),
                eval_error("b"),
                FailureClassification::transient(),
            ),
            ErrorSummary::from_cycle(CyclePath::new(vec![], vec![node("CYCLE", 1)])),
            ErrorSummary::from_failure(
                node("CAUSE", 1),
                eval_error("a"),
                FailureClassification::permanent(),
            ),
        ];
        let current = node("CURRENT", 9);

        let first = ErrorSummary::from_children(current, &children).unwrap();
        let second = ErrorSummary::from_children(current, &children).unwrap();

        let first_roots: Vec<NodeId> = first.root_causes().iter().copied().collect();
        let second_roots: Vec<NodeId> = second.root_causes().iter().copied().collect();
        assert_eq!(first_roots, second_roots);
        assert_eq!(
            first.failure().unwrap().originating_node(),
            second.failure().unwrap().originating_node()
        );
        assert_eq!(first.cycle_paths(), second.cycle_paths());
    }

    #[test]
    fn parts_reject_a_half_present_failure_pair() {
        let missing_node = ErrorSummary::from_parts(
            SharedOrderedSet::empty(),
            Some(eval_error("orphaned")),
            None,
            vec![],
            false,
            false,
        );
        assert_eq!(
            missing_node.unwrap_err(),
            SummaryError::MismatchedFailurePair
        );

        let missing_error = ErrorSummary::from_parts(
            SharedOrderedSet::empty(),
            None,
            Some(node("CAUSE", 1)),
            vec![],
            false,
            false,
        );
        assert_eq!(
            missing_error.unwrap_err(),
            SummaryError::MismatchedFailurePair
        );
    }

    #[test]
    fn parts_reject_a_summary_that_explains_nothing() {
        let result = ErrorSummary::from_parts(
            SharedOrderedSet::empty(),
            None,
            None,
            vec![],
            false,
            false,
        );
        assert_eq!(result.unwrap_err(), SummaryError::Unexplained);
    }

    #[test]
    fn parts_accept_a_complete_failure_pair() {
        let cause = node("CAUSE", 1);
        let summary = ErrorSummary::from_parts(
            SharedOrderedSet::singleton(cause),
            Some(eval_error("kept")),
            Some(cause),
            vec![],
            true,
            false,
        )
        .unwrap();
        assert_eq!(summary.failure().unwrap().originating_node(), cause);
        assert!(summary.is_transient());
    }

    #[test]
    fn display_prefers_the_representative_failure() {
        let with_failure = ErrorSummary::from_failure(
            node("COMPILE", 7),
            eval_error("missing header"),
            FailureClassification::permanent(),
        );
        assert_eq!(with_failure.to_string(), "COMPILE(7) failed: missing header");

        let with_cycle = ErrorSummary::from_cycle(CyclePath::new(
            vec![node("A", 1)],
            vec![node("B", 2)],
        ));
        assert_eq!(
            with_cycle.to_string(),
            "dependency cycle: A(1) -> [B(2)]"
        );
    }
}

//! Cycle Paths
//!
//! When the evaluator's cycle checker finds that a requested node reaches a
//! dependency cycle, it records the discovery as a [`CyclePath`]: the chain
//! of edges from the node of interest down to the point where the walk
//! re-entered the cycle, plus the members of the cycle itself.
//!
//! As the summary propagates upward, each ancestor prepends itself to the
//! path, so the final diagnostic shows the full chain from a requested root
//! down into the cycle.

use std::fmt;

use crate::graph::NodeId;

/// One discovered dependency cycle, with the path that reaches it.
///
/// `path_to_cycle` is the chain of dependency edges from some node of
/// interest down to a node that is itself part of `cycle`; `cycle` lists the
/// cycle's members starting at that re-entry point. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CyclePath {
    path_to_cycle: Vec<NodeId>,
    cycle: Vec<NodeId>,
}

impl CyclePath {
    /// Record a discovered cycle. The sequences are taken as the cycle
    /// checker reports them; well-formedness of the cycle itself is the
    /// checker's guarantee.
    pub fn new(path_to_cycle: Vec<NodeId>, cycle: Vec<NodeId>) -> Self {
        Self {
            path_to_cycle,
            cycle,
        }
    }

    /// The chain of edges leading to the cycle, outermost node first.
    pub fn path_to_cycle(&self) -> &[NodeId] {
        &self.path_to_cycle
    }

    /// The members of the cycle, starting at the re-entry point.
    pub fn cycle(&self) -> &[NodeId] {
        &self.cycle
    }

    /// A new path recording that `node` reaches this cycle through the
    /// current path's head. Used at every aggregation step on the way up.
    pub fn prepend(&self, node: NodeId) -> Self {
        let mut path = Vec::with_capacity(self.path_to_cycle.len() + 1);
        path.push(node);
        path.extend_from_slice(&self.path_to_cycle);
        Self {
            path_to_cycle: path,
            cycle: self.cycle.clone(),
        }
    }
}

/// Renders `a -> b -> [c -> d]`: the path to the cycle, then the cycle's
/// members bracketed. Surfaced verbatim in build diagnostics.
impl fmt::Display for CyclePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for id in &self.path_to_cycle {
            write!(f, "{} -> ", id)?;
        }
        write!(f, "[")?;
        for (i, id) in self.cycle.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", id)?;
        }
        write!(f, "]")
    }
}

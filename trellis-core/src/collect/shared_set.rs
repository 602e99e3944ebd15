//! Shared Ordered Set
//!
//! An immutable, deduplicated set with cheap unions and a deterministic
//! iteration order.
//!
//! # How It Works
//!
//! 1. A set is built from zero or more direct elements plus zero or more
//!    existing sets to union in. The merged-in sets are retained by
//!    reference, never copied, so construction cost is proportional to the
//!    number of inputs rather than their total size.
//!
//! 2. Iteration flattens the union tree into "compile order": a set's own
//!    direct elements first, then the elements contributed by each merged-in
//!    set in merge order, with the first occurrence of a duplicate winning.
//!
//! 3. The flattened order is computed once, on first iteration, and memoized.
//!    The set is immutable, so the order is fixed for its lifetime and every
//!    later iteration (and `len`/`contains`) reuses it.
//!
//! # Thread Safety
//!
//! Sets are immutable from the instant construction returns and are shared
//! via `Arc`, so any number of threads may iterate or re-union the same set
//! concurrently. The memoized flatten is the only interior state; it is
//! write-once and race-safe.

use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, OnceLock};

use indexmap::IndexSet;
use smallvec::SmallVec;
use tracing::trace;

/// An immutable set that unions by reference and iterates in compile order.
///
/// `Clone` is a reference-count bump; clones share the same underlying node,
/// including its memoized flatten.
pub struct SharedOrderedSet<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    /// Elements added directly at this node of the union tree.
    direct: SmallVec<[T; 4]>,

    /// Sets unioned into this one, retained by reference.
    /// Invariant: none of these are empty (empty inputs are skipped at
    /// construction, which keeps `is_empty` a field check).
    merged: Vec<SharedOrderedSet<T>>,

    /// Deduplicated elements in compile order, filled on first iteration.
    flattened: OnceLock<IndexSet<T>>,
}

impl<T> SharedOrderedSet<T>
where
    T: Clone + Eq + Hash,
{
    /// Create a set with no elements.
    pub fn empty() -> Self {
        Self::from_inner(SmallVec::new(), Vec::new())
    }

    /// Create a set holding exactly one element.
    pub fn singleton(item: T) -> Self {
        let mut direct = SmallVec::new();
        direct.push(item);
        Self::from_inner(direct, Vec::new())
    }

    /// Create a set from direct elements plus existing sets to union in.
    ///
    /// The merged-in sets are retained by reference: cost is proportional to
    /// the number of direct elements plus the number of sets, independent of
    /// how many elements those sets hold. Empty sets contribute nothing and
    /// are skipped.
    pub fn of(
        direct: impl IntoIterator<Item = T>,
        merge_from: impl IntoIterator<Item = Self>,
    ) -> Self {
        let direct: SmallVec<[T; 4]> = direct.into_iter().collect();
        let merged: Vec<Self> = merge_from
            .into_iter()
            .filter(|set| !set.is_empty())
            .collect();
        Self::from_inner(direct, merged)
    }

    fn from_inner(direct: SmallVec<[T; 4]>, merged: Vec<Self>) -> Self {
        Self {
            inner: Arc::new(Inner {
                direct,
                merged,
                flattened: OnceLock::new(),
            }),
        }
    }

    /// Check whether the set holds no elements.
    ///
    /// Does not force a flatten: empty merged-in sets are dropped at
    /// construction, so a set is empty exactly when it has neither direct
    /// elements nor merged-in sets.
    pub fn is_empty(&self) -> bool {
        self.inner.direct.is_empty() && self.inner.merged.is_empty()
    }

    /// Number of distinct elements in the set. Forces the flatten.
    pub fn len(&self) -> usize {
        self.flattened().len()
    }

    /// Check whether the set contains an element. Forces the flatten.
    pub fn contains(&self, item: &T) -> bool {
        self.flattened().contains(item)
    }

    /// Iterate the distinct elements in compile order.
    ///
    /// The iterator is finite and restartable; repeated calls yield the same
    /// elements in the same order for the lifetime of the set.
    pub fn iter(&self) -> indexmap::set::Iter<'_, T> {
        self.flattened().iter()
    }

    /// The memoized compile-order flatten of the union tree.
    fn flattened(&self) -> &IndexSet<T> {
        self.inner.flattened.get_or_init(|| {
            let mut out = IndexSet::new();
            self.collect_into(&mut out);
            trace!(len = out.len(), "flattened shared ordered set");
            out
        })
    }

    /// Walk the union tree depth-first, direct elements before merged-in
    /// sets, inserting into `out`. `IndexSet` keeps the first occurrence of
    /// a duplicate, which is what makes the order stable under overlap.
    ///
    /// The walk is iterative: union trees mirror the depth of the dependency
    /// graph, which can exceed the call stack.
    fn collect_into(&self, out: &mut IndexSet<T>) {
        let mut stack: Vec<&Self> = vec![self];
        while let Some(set) = stack.pop() {
            // A set that already flattened contributes its memo wholesale.
            if let Some(flat) = set.inner.flattened.get() {
                for item in flat {
                    out.insert(item.clone());
                }
                continue;
            }
            for item in &set.inner.direct {
                out.insert(item.clone());
            }
            for merged in set.inner.merged.iter().rev() {
                stack.push(merged);
            }
        }
    }
}

/// Union trees mirror the depth of the dependency graph, so dropping the
/// last reference to a tall tree must not recurse either. Children whose
/// last reference is being dropped are unlinked onto an explicit worklist
/// first, so each level drops with an already-empty merge list.
impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.merged);
        while let Some(mut set) = stack.pop() {
            if let Some(inner) = Arc::get_mut(&mut set.inner) {
                stack.append(&mut std::mem::take(&mut inner.merged));
            }
        }
    }
}

impl<T> Clone for SharedOrderedSet<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> FromIterator<T> for SharedOrderedSet<T>
where
    T: Clone + Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::of(iter, std::iter::empty())
    }
}

/// Sets compare by their flattened contents, order included: two sets are
/// equal exactly when they iterate identically.
impl<T> PartialEq for SharedOrderedSet<T>
where
    T: Clone + Eq + Hash,
{
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.inner, &other.inner) {
            return true;
        }
        self.iter().eq(other.iter())
    }
}

impl<T> Eq for SharedOrderedSet<T> where T: Clone + Eq + Hash {}

impl<T> fmt::Debug for SharedOrderedSet<T>
where
    T: Clone + Eq + Hash + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

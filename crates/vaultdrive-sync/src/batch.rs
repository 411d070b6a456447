//! Bounded-concurrency batch scheduler
//!
//! Runs an ordered sequence of work items in consecutive groups of at
//! most `limit` items. A group's items run concurrently and the whole
//! group is awaited before the next group starts, so peak concurrency is
//! capped at `limit` and throughput is bounded by the slowest item of
//! each group. This is not a refilling worker pool.
//!
//! Item outcomes are plain values collected in input order. The
//! scheduler never inspects them: a failed item is just another result
//! and never cancels its siblings or aborts the group.

use std::future::Future;

use futures_util::future::join_all;
use tracing::debug;

/// Executes work in consecutive concurrent groups of bounded size
///
/// Reused by push transfers, pull transfers, both deletion sweeps, and
/// pull's folder-tree traversal.
#[derive(Debug, Clone, Copy)]
pub struct BatchScheduler {
    limit: usize,
}

impl BatchScheduler {
    /// Creates a scheduler with the given per-group concurrency limit
    ///
    /// A limit of zero is treated as one.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
        }
    }

    /// Returns the per-group concurrency limit
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Runs every item through `op`, at most `limit` concurrently
    ///
    /// Results are returned in input order. Group *i+1* does not start
    /// until every item of group *i* has completed.
    pub async fn run<T, R, F, Fut>(&self, items: Vec<T>, mut op: F) -> Vec<R>
    where
        F: FnMut(T) -> Fut,
        Fut: Future<Output = R>,
    {
        let total = items.len();
        let mut results = Vec::with_capacity(total);
        let mut remaining = items.into_iter();

        loop {
            let group: Vec<Fut> = remaining.by_ref().take(self.limit).map(&mut op).collect();
            if group.is_empty() {
                break;
            }
            debug!(group_size = group.len(), total, "Running batch group");
            results.extend(join_all(group).await);
        }

        results
    }
}

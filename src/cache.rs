//! Live endpoint cache keyed by instance identifier.
//!
//! This module reconciles the instance set reported by a discovery source
//! against the set of live endpoints handed to the load-balancing layer.
//! Endpoints are created through a user-provided [`Factory`] and torn down
//! through their [`Closer`] when the backing instance disappears.
//!
//! # How It Works
//!
//! 1. A discovery source pushes the current full instance set via
//!    [`EndpointCache::update`]
//! 2. Instances no longer listed have their entry removed and resource
//!    released; newly-listed instances go through the factory
//! 3. One fresh endpoint snapshot is published atomically per update
//! 4. Readers call [`EndpointCache::endpoints`] and get the latest snapshot
//!    without touching any lock
//!
//! # Example
//!
//! ```ignore
//! use tonic_lb_cache::{ChannelFactory, EndpointCache};
//!
//! let cache = EndpointCache::new(ChannelFactory::new());
//!
//! // Discovery reports two replicas.
//! cache.update(["10.0.0.1:50051", "10.0.0.2:50051"]);
//! assert_eq!(cache.endpoints().len(), 2);
//!
//! // One replica goes away; its channel is released.
//! cache.update(["10.0.0.2:50051"]);
//! assert_eq!(cache.endpoints().len(), 1);
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use crate::factory::{Closer, Factory};

/// One live endpoint and the resource it holds.
struct Entry<E> {
    endpoint: E,
    closer: Box<dyn Closer>,
}

struct Inner<E> {
    entries: HashMap<String, Entry<E>>,
    closed: bool,
}

/// Concurrent cache of live endpoints, reconciled against instance sets.
///
/// The cache owns every endpoint's releasable resource until the instance
/// disappears from the tracked set; each resource is released exactly once.
/// A factory failure for one instance never affects the others — the
/// instance simply stays absent and is retried on the next update that
/// still lists it.
///
/// # Concurrency
///
/// Updates serialize on an internal lock, so at most one reconciliation is
/// in flight and the factory is never invoked twice concurrently for the
/// same identifier. Factory calls run inside that critical section; a slow
/// factory therefore delays other writers, but never readers —
/// [`endpoints`](Self::endpoints) reads an atomically-swapped snapshot and
/// does not take the lock. Readers observe the state before or after an
/// update, never a partial reconciliation.
///
/// # Shutdown
///
/// [`close`](Self::close) releases all remaining resources; afterwards
/// `update` is a silent no-op and `endpoints` returns an empty vec.
/// Dropping the cache performs the same teardown.
pub struct EndpointCache<E, F> {
    factory: F,
    inner: Mutex<Inner<E>>,
    snapshot: ArcSwap<Vec<E>>,
}

impl<E, F> EndpointCache<E, F>
where
    E: Clone,
    F: Factory<E>,
{
    /// Creates an empty cache around the given factory.
    #[must_use]
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                closed: false,
            }),
            snapshot: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Reconciles the cache to exactly match `instances`.
    ///
    /// Instances not previously cached go through the factory; cached
    /// instances no longer listed have their resource released. The tracked
    /// set is fully replaced — this is not additive. Duplicate identifiers
    /// collapse to a single logical instance.
    pub fn update<I>(&self, instances: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let target: HashSet<String> = instances.into_iter().map(Into::into).collect();

        let mut inner = self.inner.lock();
        if inner.closed {
            return;
        }

        // Departed instances: drop the entry and release its resource.
        // A release failure is reported but the entry is gone regardless.
        inner.entries.retain(|instance, entry| {
            if target.contains(instance) {
                return true;
            }
            tracing::debug!("removing endpoint: {instance}");
            if let Err(e) = entry.closer.close() {
                tracing::warn!("failed to release resource for {instance}: {e}");
            }
            false
        });

        // Newly-seen instances: run the factory. A failed instance stays
        // absent and is retried on the next update that still lists it.
        for instance in target {
            if inner.entries.contains_key(&instance) {
                continue;
            }
            match self.factory.make(&instance) {
                Ok((endpoint, closer)) => {
                    tracing::debug!("adding endpoint: {instance}");
                    inner.entries.insert(instance, Entry { endpoint, closer });
                }
                Err(e) => {
                    tracing::error!("failed to create endpoint for {instance}: {e}");
                }
            }
        }

        self.publish(&inner);
    }

    /// Returns a snapshot of all currently live endpoints, in no particular
    /// order.
    ///
    /// Never blocks on a concurrent [`update`](Self::update). An empty vec is
    /// the normal zero-instance state, not an error. Returned handles remain
    /// valid to call even if their entry is removed mid-call.
    #[must_use]
    pub fn endpoints(&self) -> Vec<E> {
        (**self.snapshot.load()).clone()
    }

    /// Releases every remaining resource and shuts the cache down.
    ///
    /// Idempotent. Subsequent calls to `update` are silent no-ops and
    /// `endpoints` returns an empty vec.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        if inner.closed {
            return;
        }
        release_all(&mut inner);
        self.snapshot.store(Arc::new(Vec::new()));
    }

    fn publish(&self, inner: &Inner<E>) {
        let endpoints = inner.entries.values().map(|e| e.endpoint.clone()).collect();
        self.snapshot.store(Arc::new(endpoints));
    }
}

impl<E, F> Drop for EndpointCache<E, F> {
    fn drop(&mut self) {
        let inner = self.inner.get_mut();
        if !inner.closed {
            release_all(inner);
        }
    }
}

fn release_all<E>(inner: &mut Inner<E>) {
    inner.closed = true;
    for (instance, mut entry) in inner.entries.drain() {
        tracing::debug!("removing endpoint: {instance}");
        if let Err(e) = entry.closer.close() {
            tracing::warn!("failed to release resource for {instance}: {e}");
        }
    }
}

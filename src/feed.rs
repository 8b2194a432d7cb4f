//! Pumps a discovery feed into an [`EndpointCache`].
//!
//! The cache never polls or watches anything itself; some discovery
//! integration (a registry watcher, a DNS prober, a test fixture) produces a
//! stream of full instance sets, and [`drive`] applies each one. Which
//! integration produces the stream is entirely the caller's business.

use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::task::JoinHandle;

use crate::cache::EndpointCache;
use crate::factory::Factory;

/// Spawns a task that applies every instance set yielded by `instances` to
/// the cache, in order, until the stream ends.
///
/// Each stream item is treated as the discovery source's current full
/// instance set — the cache is reconciled to match it exactly. The returned
/// handle resolves once the stream is exhausted.
///
/// # Example
///
/// ```ignore
/// use futures::stream;
/// use tonic_lb_cache::{drive, ChannelFactory, EndpointCache};
///
/// let cache = Arc::new(EndpointCache::new(ChannelFactory::new()));
/// let feed = stream::iter(vec![vec!["10.0.0.1:50051".to_string()]]);
/// drive(Arc::clone(&cache), feed);
/// ```
pub fn drive<E, F, S>(cache: Arc<EndpointCache<E, F>>, instances: S) -> JoinHandle<()>
where
    E: Clone + Send + Sync + 'static,
    F: Factory<E> + Send + Sync + 'static,
    S: Stream<Item = Vec<String>> + Send + 'static,
{
    tokio::spawn(async move {
        tokio::pin!(instances);

        while let Some(set) = instances.next().await {
            tracing::debug!("applying instance set with {} entries", set.len());
            cache.update(set);
        }

        tracing::debug!("instance feed ended");
    })
}

#[cfg(test)]
mod tests {
    use futures::stream;

    use super::*;
    use crate::factory::{Closer, Error, NopCloser};

    fn echo_factory() -> impl Factory<String> + Send + Sync {
        |instance: &str| -> Result<(String, Box<dyn Closer>), Error> {
            Ok((instance.to_string(), Box::new(NopCloser)))
        }
    }

    #[tokio::test]
    async fn drive_applies_each_instance_set() {
        let cache = Arc::new(EndpointCache::new(echo_factory()));
        let feed = stream::iter(vec![
            vec!["a".to_string(), "b".to_string()],
            vec!["b".to_string()],
        ]);

        drive(Arc::clone(&cache), feed).await.unwrap();

        assert_eq!(cache.endpoints(), ["b"]);
    }

    #[tokio::test]
    async fn drive_with_empty_feed_leaves_cache_untouched() {
        let cache = Arc::new(EndpointCache::new(echo_factory()));
        cache.update(["a"]);

        drive(Arc::clone(&cache), stream::empty()).await.unwrap();

        assert_eq!(cache.endpoints(), ["a"]);
    }

    #[tokio::test]
    async fn drive_applies_the_empty_set() {
        let cache = Arc::new(EndpointCache::new(echo_factory()));
        cache.update(["a"]);

        let feed = stream::iter(vec![Vec::new()]);
        drive(Arc::clone(&cache), feed).await.unwrap();

        assert!(cache.endpoints().is_empty());
    }
}

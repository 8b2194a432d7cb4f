//! The capability consumed by the load-balancing layer: "give me the
//! current live endpoint set."
//!
//! [`Subscriber`] is a single-method trait so that balancers can be written
//! once and run against any backing — a static set ([`FixedSubscriber`]),
//! a discovery-fed cache ([`EndpointCache`]), or several sources merged
//! into one ([`MultiSubscriber`]).

use crate::cache::EndpointCache;
use crate::factory::{Error, Factory};

/// Source of the current live endpoint set.
pub trait Subscriber {
    /// The callable endpoint handle this source yields.
    type Endpoint;

    /// Returns the current live endpoints.
    ///
    /// An empty vec means zero live instances, which is a normal state;
    /// an error means the source itself could not answer.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint source is unavailable.
    fn endpoints(&self) -> Result<Vec<Self::Endpoint>, Error>;
}

/// A subscriber that yields a fixed set of endpoints, verbatim, and never
/// fails.
#[derive(Clone, Debug, Default)]
pub struct FixedSubscriber<E>(
    /// The endpoints returned, verbatim, by every call.
    pub Vec<E>,
);

impl<E> From<Vec<E>> for FixedSubscriber<E> {
    fn from(endpoints: Vec<E>) -> Self {
        Self(endpoints)
    }
}

impl<E: Clone> Subscriber for FixedSubscriber<E> {
    type Endpoint = E;

    fn endpoints(&self) -> Result<Vec<E>, Error> {
        Ok(self.0.clone())
    }
}

impl<E, F> Subscriber for EndpointCache<E, F>
where
    E: Clone,
    F: Factory<E>,
{
    type Endpoint = E;

    fn endpoints(&self) -> Result<Vec<E>, Error> {
        Ok(EndpointCache::endpoints(self))
    }
}

/// Merges several endpoint sources into one.
///
/// A source that fails to answer is logged and skipped; one unreachable
/// registry never hides the endpoints the other sources still report.
pub struct MultiSubscriber<E> {
    sources: Vec<Box<dyn Subscriber<Endpoint = E> + Send + Sync>>,
}

impl<E> MultiSubscriber<E> {
    /// Creates a subscriber with no sources.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Adds an endpoint source.
    #[must_use]
    pub fn with<S>(mut self, source: S) -> Self
    where
        S: Subscriber<Endpoint = E> + Send + Sync + 'static,
    {
        self.sources.push(Box::new(source));
        self
    }
}

impl<E> Default for MultiSubscriber<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Subscriber for MultiSubscriber<E> {
    type Endpoint = E;

    fn endpoints(&self) -> Result<Vec<E>, Error> {
        let mut all = Vec::new();
        for source in &self.sources {
            match source.endpoints() {
                Ok(endpoints) => all.extend(endpoints),
                Err(e) => tracing::warn!("skipping failed endpoint source: {e}"),
            }
        }
        Ok(all)
    }
}

//! Contracts between the cache and the transport layer.
//!
//! A [`Factory`] turns an instance identifier (typically a `host:port` string
//! from a service registry) into a callable endpoint plus the [`Closer`] that
//! releases whatever resource backs it. The cache invokes the factory for
//! instances it has not seen before and the closer for instances that have
//! disappeared; everything in between is the transport layer's business.

/// Error type shared by the factory, closer, and subscriber contracts.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// A releasable resource backing a live endpoint.
///
/// The cache calls [`close`](Closer::close) at most once per entry — when the
/// entry's instance disappears from the tracked set, when the cache is closed,
/// or when the cache is dropped. Release must not depend on any cache-internal
/// locking and should be cheap relative to typical instance churn.
pub trait Closer: Send {
    /// Releases the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource did not shut down cleanly. The cache
    /// reports the failure and discards the entry regardless, so the resource
    /// is considered gone either way.
    fn close(&mut self) -> Result<(), Error>;
}

/// A closer for endpoints that hold no releasable resource.
#[derive(Clone, Copy, Debug, Default)]
pub struct NopCloser;

impl Closer for NopCloser {
    fn close(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

/// Builds a callable endpoint for one instance identifier.
///
/// Implementations must be safe to call for different identifiers from
/// different threads; the cache never invokes a factory twice concurrently
/// for the same identifier within one reconciliation pass.
///
/// Any `Fn(&str) -> Result<(E, Box<dyn Closer>), Error>` closure is a factory,
/// so ad hoc transports need no dedicated type:
///
/// ```ignore
/// let factory = |instance: &str| -> Result<(String, Box<dyn Closer>), Error> {
///     Ok((format!("http://{instance}"), Box::new(NopCloser)))
/// };
/// ```
pub trait Factory<E> {
    /// Builds the endpoint and its releasable resource for `instance`.
    ///
    /// # Errors
    ///
    /// Returns an error when no endpoint could be constructed for the
    /// instance. The cache logs the failure, leaves the instance absent,
    /// and retries on the next update that still lists it.
    fn make(&self, instance: &str) -> Result<(E, Box<dyn Closer>), Error>;
}

impl<E, F> Factory<E> for F
where
    F: Fn(&str) -> Result<(E, Box<dyn Closer>), Error>,
{
    fn make(&self, instance: &str) -> Result<(E, Box<dyn Closer>), Error> {
        self(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_factories() {
        let factory = |instance: &str| -> Result<(String, Box<dyn Closer>), Error> {
            Ok((instance.to_uppercase(), Box::new(NopCloser)))
        };

        let (endpoint, _closer) = factory.make("a").unwrap();
        assert_eq!(endpoint, "A");
    }

    #[test]
    fn closure_factory_failures_propagate() {
        let factory = |instance: &str| -> Result<(String, Box<dyn Closer>), Error> {
            Err(format!("no backend for {instance}").into())
        };

        let err = match factory.make("a") {
            Ok(_) => panic!("expected factory failure"),
            Err(err) => err,
        };
        assert_eq!(err.to_string(), "no backend for a");
    }

    #[test]
    fn nop_closer_never_fails() {
        let mut closer = NopCloser;
        assert!(closer.close().is_ok());
    }
}

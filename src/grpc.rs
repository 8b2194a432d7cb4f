//! Factory producing lazily-connecting [Tonic](https://docs.rs/tonic)
//! channels.
//!
//! [`ChannelFactory`] is the one concrete [`Factory`] this crate ships:
//! it turns a `host:port` instance identifier into a
//! [`Channel`](tonic::transport::Channel) that connects on first use, and
//! pairs it with a closer that drops the transport handle when the instance
//! disappears. Connections already in flight on cloned handles finish
//! normally; the balancing layer's calls are short-lived by convention.

use std::time::Duration;

use tonic::transport::{Channel, Endpoint};

use crate::factory::{Closer, Error, Factory};

/// Builds gRPC channels for `host:port` instance identifiers.
///
/// Channels are created with [`connect_lazy`](Endpoint::connect_lazy), so
/// constructing an entry is cheap and never blocks on the network; the
/// connection is established on the first call through the channel.
#[derive(Clone, Debug)]
pub struct ChannelFactory {
    scheme: String,
    connect_timeout: Option<Duration>,
    timeout: Option<Duration>,
}

impl ChannelFactory {
    /// Creates a factory producing plaintext (`http`) channels with no
    /// timeouts.
    #[must_use]
    pub fn new() -> Self {
        Self {
            scheme: "http".to_string(),
            connect_timeout: None,
            timeout: None,
        }
    }

    /// Sets the URI scheme, e.g. `https` for TLS-terminated backends.
    #[must_use]
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Sets the timeout for establishing a connection.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the per-request timeout applied to each call on the channel.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for ChannelFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl Factory<Channel> for ChannelFactory {
    fn make(&self, instance: &str) -> Result<(Channel, Box<dyn Closer>), Error> {
        let mut endpoint = Endpoint::from_shared(format!("{}://{instance}", self.scheme))?;

        if let Some(timeout) = self.connect_timeout {
            endpoint = endpoint.connect_timeout(timeout);
        }

        if let Some(timeout) = self.timeout {
            endpoint = endpoint.timeout(timeout);
        }

        let channel = endpoint.connect_lazy();
        let closer = ChannelCloser(Some(channel.clone()));

        Ok((channel, Box::new(closer)))
    }
}

/// Releases a channel by dropping the factory's handle to it.
///
/// Clones handed out through snapshots keep the transport alive until the
/// consumer drops them too.
struct ChannelCloser(Option<Channel>);

impl Closer for ChannelCloser {
    fn close(&mut self) -> Result<(), Error> {
        self.0.take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builds_channel_for_host_port() {
        let factory = ChannelFactory::new()
            .connect_timeout(Duration::from_secs(1))
            .timeout(Duration::from_secs(1));

        assert!(factory.make("127.0.0.1:50051").is_ok());
    }

    #[tokio::test]
    async fn scheme_is_configurable() {
        let factory = ChannelFactory::new().scheme("https");
        assert!(factory.make("example.com:443").is_ok());
    }

    #[test]
    fn rejects_instance_that_is_not_a_valid_uri() {
        let factory = ChannelFactory::new();
        assert!(factory.make("not a valid authority").is_err());
    }

    #[tokio::test]
    async fn closer_releases_cleanly() {
        let factory = ChannelFactory::new();
        let (_channel, mut closer) = factory.make("127.0.0.1:50051").unwrap();

        assert!(closer.close().is_ok());
    }
}

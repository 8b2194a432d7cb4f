#![deny(missing_docs)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Dynamic endpoint caching for [Tonic](https://docs.rs/tonic) gRPC client-side load balancing.
//!
//! Service discovery hands you instance addresses; a load balancer wants live,
//! ready-to-call channels. This crate provides the piece in between: a
//! concurrent cache that reconciles itself against each reported instance set,
//! building endpoints for instances that appear and releasing their resources
//! when they disappear — without ever exposing a half-constructed or
//! already-closed endpoint to a reader, and without leaking connections.
//!
//! # Features
//!
//! - **Set reconciliation**: each update fully replaces the tracked instance
//!   set; additions go through a pluggable [`Factory`], removals release
//!   their resource exactly once
//! - **Lock-free reads**: [`EndpointCache::endpoints`] reads an
//!   atomically-published snapshot and never blocks on an in-flight update
//! - **Failure isolation**: one instance that fails to construct or release
//!   never affects the others, and is retried on the next update
//! - **Pluggable consumption**: balancers code against the one-method
//!   [`Subscriber`] trait and run unchanged over fixed, cache-backed, or
//!   merged endpoint sources
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use tonic_lb_cache::{ChannelFactory, EndpointCache};
//!
//! // Channels connect lazily; building an entry is cheap.
//! let factory = ChannelFactory::new().connect_timeout(Duration::from_secs(5));
//! let cache = Arc::new(EndpointCache::new(factory));
//!
//! // Apply the current instance set whenever discovery reports one.
//! cache.update(["10.0.0.1:50051", "10.0.0.2:50051"]);
//!
//! // Hand out channels to your load-balancing layer.
//! for channel in cache.endpoints() {
//!     // let client = MyServiceClient::new(channel);
//! }
//! ```
//!
//! To run the cache off a discovery integration, feed it any stream of
//! instance sets via [`drive`]:
//!
//! ```ignore
//! use futures::stream;
//! use tonic_lb_cache::drive;
//!
//! let feed = stream::iter(vec![vec!["10.0.0.1:50051".to_string()]]);
//! drive(Arc::clone(&cache), feed);
//! ```

mod cache;
mod factory;
mod feed;
mod grpc;
mod subscriber;

pub use cache::EndpointCache;
pub use factory::{Closer, Error, Factory, NopCloser};
pub use feed::drive;
pub use grpc::ChannelFactory;
pub use subscriber::{FixedSubscriber, MultiSubscriber, Subscriber};

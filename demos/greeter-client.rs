//! gRPC client example demonstrating tonic-lb-cache load balancing.
//!
//! This client keeps an endpoint cache reconciled against a comma-separated
//! instance list — re-read from the environment periodically, standing in
//! for a real discovery source — and round-robins requests over the cached
//! channels to demonstrate that they are spread across all live backends.
//!
//! Start a couple of greeter-server instances first, then:
//!
//! ```bash
//! INSTANCES=127.0.0.1:50051,127.0.0.1:50052 \
//!     cargo run --example greeter-client --features examples
//! ```
//!
//! # Environment Variables
//!
//! - `INSTANCES`: Comma-separated `host:port` list (default: 127.0.0.1:50051)
//! - `REQUEST_COUNT`: Number of requests to make (default: 10)
//! - `REQUEST_INTERVAL_MS`: Milliseconds between requests (default: 1000)
//! - `REFRESH_INTERVAL_MS`: Milliseconds between instance-list refreshes (default: 5000)

use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use std::time::Duration;

use futures::stream;
use tokio::time::sleep;
use tonic_lb_cache::{ChannelFactory, EndpointCache, drive};
use tracing::{Level, error, info};

pub mod greeter {
    tonic::include_proto!("greeter");
}

use greeter::HelloRequest;
use greeter::greeter_client::GreeterClient;

fn instances_from_env() -> Vec<String> {
    env::var("INSTANCES")
        .unwrap_or_else(|_| "127.0.0.1:50051".to_string())
        .split(',')
        .map(|instance| instance.trim().to_string())
        .filter(|instance| !instance.is_empty())
        .collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()),
        )
        .init();

    // Read configuration from environment
    let request_count: u32 = env::var("REQUEST_COUNT")
        .ok()
        .and_then(|c| c.parse().ok())
        .unwrap_or(10);
    let request_interval_ms: u64 = env::var("REQUEST_INTERVAL_MS")
        .ok()
        .and_then(|i| i.parse().ok())
        .unwrap_or(1000);
    let refresh_interval_ms: u64 = env::var("REFRESH_INTERVAL_MS")
        .ok()
        .and_then(|i| i.parse().ok())
        .unwrap_or(5000);

    info!("Starting greeter client");
    info!("Instances: {}", instances_from_env().join(", "));
    info!("Request count: {request_count}");
    info!("Request interval: {request_interval_ms}ms");
    info!("Refresh interval: {refresh_interval_ms}ms");

    // Build the endpoint cache over lazily-connecting channels
    let factory = ChannelFactory::new()
        .connect_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(10));
    let cache = Arc::new(EndpointCache::new(factory));

    // Apply the initial instance set, then keep refreshing it in the
    // background as a stand-in for a real discovery feed.
    cache.update(instances_from_env());
    let feed = stream::unfold((), move |()| async move {
        sleep(Duration::from_millis(refresh_interval_ms)).await;
        Some((instances_from_env(), ()))
    });
    let _refresh = drive(Arc::clone(&cache), feed);

    // Track which backends serve our requests
    let mut served_by: HashMap<String, u32> = HashMap::new();
    let my_name = env::var("HOSTNAME").unwrap_or_else(|_| "client".to_string());

    info!("Sending {request_count} requests...\n");

    for i in 1..=request_count {
        let endpoints = cache.endpoints();

        if endpoints.is_empty() {
            error!("Request {i}: no live endpoints");
        } else {
            // Rotate over the snapshot; any real balancing strategy would
            // slot in here.
            let channel = endpoints[(i as usize - 1) % endpoints.len()].clone();
            let mut client = GreeterClient::new(channel);

            let request = tonic::Request::new(HelloRequest {
                name: format!("{my_name}-request-{i}"),
            });

            match client.say_hello(request).await {
                Ok(response) => {
                    let reply = response.into_inner();
                    info!(
                        "Request {i}: {} (served by: {})",
                        reply.message, reply.served_by
                    );

                    *served_by.entry(reply.served_by).or_insert(0) += 1;
                }

                Err(e) => {
                    error!("Request {i} failed: {e}");
                }
            }
        }

        if i < request_count {
            sleep(Duration::from_millis(request_interval_ms)).await;
        }
    }

    // Print summary
    info!("\n=== Load Balancing Summary ===");
    for (backend, count) in &served_by {
        let percentage = (*count as f64 / request_count as f64) * 100.0;
        info!("{backend}: {count} requests ({percentage:.1}%)");
    }

    info!("Total backends used: {}", served_by.len());

    cache.close();

    Ok(())
}

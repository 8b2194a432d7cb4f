//! Simple gRPC backend for demonstrating tonic-lb-cache.
//!
//! Implements the Greeter service and labels every response with its
//! instance name, so the greeter-client demo can tally which backends
//! served its requests.
//!
//! Run one copy per instance you want in the client's set:
//!
//! ```bash
//! GRPC_ADDR=127.0.0.1:50051 INSTANCE=one cargo run --example greeter-server --features examples &
//! GRPC_ADDR=127.0.0.1:50052 INSTANCE=two cargo run --example greeter-server --features examples &
//! ```
//!
//! # Environment Variables
//!
//! - `GRPC_ADDR`: Address to listen on (default: 127.0.0.1:50051)
//! - `INSTANCE`: Label included in responses (default: the listen address)

use std::env;
use std::net::SocketAddr;

use tonic::{Request, Response, Status, transport::Server};
use tracing::{Level, info};

pub mod greeter {
    tonic::include_proto!("greeter");
}

use greeter::greeter_server::{Greeter, GreeterServer};
use greeter::{HelloReply, HelloRequest};

#[derive(Debug, Default)]
pub struct GreeterService {
    instance: String,
}

#[tonic::async_trait]
impl Greeter for GreeterService {
    async fn say_hello(
        &self,
        request: Request<HelloRequest>,
    ) -> Result<Response<HelloReply>, Status> {
        let name = &request.into_inner().name;
        info!("Received request from: {name}");

        let reply = HelloReply {
            message: format!("Hello, {name}!"),
            served_by: self.instance.clone(),
        };

        Ok(Response::new(reply))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()),
        )
        .init();

    let addr: SocketAddr = env::var("GRPC_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:50051".to_string())
        .parse()?;
    let instance = env::var("INSTANCE").unwrap_or_else(|_| addr.to_string());

    info!("Greeter server listening on {addr}");
    info!("Instance label: {instance}");

    Server::builder()
        .add_service(GreeterServer::new(GreeterService { instance }))
        .serve(addr)
        .await?;

    Ok(())
}

//! Fallible singleton example for lazy-singleton.
//!
//! Demonstrates:
//! - A singleton whose constructor reads the environment and can fail
//! - The failure being cached: the constructor never runs a second time
//! - Watching construction through a trace callback
//!
//! Run with: `cargo run --example fallible_singleton`
//! Run with: `APP_ENDPOINT=https://api.example.com cargo run --example fallible_singleton`

use lazy_singleton::{define_fallible_singleton, SingletonError};
use tracing_subscriber::EnvFilter;

/// Endpoint the application talks to, read once from the environment.
#[derive(Debug)]
pub struct Endpoint {
    pub url: String,
}

fn load_endpoint() -> Result<Endpoint, SingletonError> {
    println!("   [constructor] reading APP_ENDPOINT");

    let url = std::env::var("APP_ENDPOINT")
        .map_err(|e| SingletonError::construction::<Endpoint>(format!("APP_ENDPOINT: {e}")))?;

    if !url.starts_with("http") {
        return Err(SingletonError::construction::<Endpoint>(format!(
            "not an http(s) url: {url}"
        )));
    }

    Ok(Endpoint { url })
}

define_fallible_singleton!(endpoint: Endpoint = load_endpoint());

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    println!("=== lazy-singleton: Fallible Construction ===\n");

    endpoint::set_trace_callback(|event| println!("   [trace] {event}"));

    println!("1. State before access: {}", endpoint::state());

    println!("\n2. First access...");
    match endpoint::instance() {
        Ok(endpoint) => println!("   Endpoint: {}", endpoint.url),
        Err(e) => println!("   Error: {e}"),
    }

    println!("\n3. Second access (constructor does not run again)...");
    match endpoint::instance() {
        Ok(endpoint) => println!("   Endpoint: {}", endpoint.url),
        Err(e) => println!("   Error: {e}"),
    }

    println!("\n4. State after access: {}", endpoint::state());

    endpoint::clear_trace_callback();

    println!("\n=== Example Complete ===");
}

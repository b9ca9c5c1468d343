//! Logger singleton example for lazy-singleton.
//!
//! Demonstrates:
//! - Lazy construction of the process-wide `Logger` on first access
//! - Two references obtained separately pointing at the same instance
//! - Appends through one reference visible through the other
//!
//! Run with: `cargo run --example logger_singleton`
//! Set `RUST_LOG=info` to also see the `tracing` output.

use lazy_singleton::{get_instance, global_logger};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    println!("Constructed before first access? {}", global_logger::is_initialized());

    // Get the singleton instance
    let logger1 = get_instance();
    log(logger1, "First message");
    log(logger1, "Second message");

    // Get the same instance
    let logger2 = get_instance();
    log(logger2, "Third message");

    // Verify that logger1 and logger2 are the same instance
    if std::ptr::eq(logger1, logger2) {
        println!("Logger1 and Logger2 are the same instance.");
    }

    // Show all logged messages
    print!("{logger2}");
}

fn log(logger: &lazy_singleton::Logger, message: &str) {
    logger.log_message(message);
    println!("Log: {message}");
}

//! # Lazy Singleton
//!
//! Process-wide values that are constructed at most once, on first access, no matter
//! how many threads race to access them first.
//!
//! Every singleton is backed by an init guard (a `std::sync::OnceLock`) with a one-way
//! transition from uninitialized to initialized. Construction happens-before every
//! return of the accessor, concurrent first callers block until it completes, and all
//! callers receive a reference to the same instance.
//!
//! ## Quick Start
//!
//! ```rust
//! use lazy_singleton::get_instance;
//!
//! let logger = get_instance();
//! logger.log_message("First message");
//! logger.log_message("Second message");
//!
//! let same = get_instance();
//! same.log_message("Third message");
//!
//! assert!(std::ptr::eq(logger, same));
//! assert_eq!(
//!     same.logs(),
//!     vec!["First message", "Second message", "Third message"]
//! );
//! ```
//!
//! ## Declaring Your Own
//!
//! ```rust
//! use lazy_singleton::define_singleton;
//! use std::sync::atomic::AtomicU64;
//!
//! define_singleton!(request_counter: AtomicU64 = AtomicU64::new(0));
//!
//! fn main() {
//!     let counter = request_counter::instance();
//!     counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
//! }
//! ```
//!
//! ## Features
//!
//! - **Exactly-once construction**: built on `OnceLock`, never a check-then-set flag
//! - **Cached failure**: fallible singletons return the same error to every caller and never retry
//! - **Isolation**: each declared singleton owns its own guard and trace hook
//! - **Tracing support**: an optional callback per singleton, plus `tracing` events
//!
//! ## Main Items
//!
//! - [`get_instance`] - The process-wide [`Logger`]
//! - [`define_singleton!`] - Declare an infallible singleton
//! - [`define_fallible_singleton!`] - Declare a singleton whose construction can fail
//! - [`SingletonApi`] - The trait behind both macros, for hand-written singletons

mod logger;
mod macros;
mod singleton_error;
mod singleton_event;
mod singleton_trait;

// Re-export the main public API
pub use logger::{get_instance, global_logger, Logger};
pub use singleton_error::SingletonError;
pub use singleton_event::SingletonEvent;
pub use singleton_trait::{InitGuard, InitState, SingletonApi, TraceHook};

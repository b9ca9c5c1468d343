//! Core trait defining singleton behavior.
//!
//! This module provides the `SingletonApi` trait with default implementations for
//! exactly-once construction, non-blocking inspection, and tracing of a process-wide
//! instance.
//!
//! Each implementor owns one init guard (a `OnceLock`). The guard moves from
//! uninitialized to initialized exactly once, on the first `get_instance` call, and
//! never moves back.

use std::fmt;
use std::sync::{Arc, LazyLock, Mutex, OnceLock};

use crate::SingletonEvent;

/// Storage for a singleton's trace callback.
///
/// Note: The `define_singleton!` macro declares its trace static with this type.
pub type TraceHook = LazyLock<Mutex<Option<Arc<dyn Fn(&SingletonEvent) + Send + Sync>>>>;

/// Run-once storage for a singleton: either the constructed value or the cached
/// construction error.
pub type InitGuard<T, E> = OnceLock<Result<T, E>>;

/// Observable state of a singleton's init guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    /// Construction has not completed (it may be in progress on another thread).
    Uninitialized,
    /// Construction completed and the instance is available.
    Ready,
    /// Construction completed with an error. Terminal: construction is never retried.
    Failed,
}

impl fmt::Display for InitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitState::Uninitialized => write!(f, "uninitialized"),
            InitState::Ready => write!(f, "ready"),
            InitState::Failed => write!(f, "failed"),
        }
    }
}

/// Aborts the process if dropped while a constructor unwinds.
///
/// Construction must never unwind out of `get_or_init`: that leaves the guard open for
/// a second construction.
struct AbortOnUnwind {
    type_name: &'static str,
}

impl Drop for AbortOnUnwind {
    fn drop(&mut self) {
        tracing::error!(type_name = self.type_name, "singleton constructor panicked, aborting");
        std::process::abort();
    }
}

/// Core trait defining singleton behavior.
///
/// Provides default implementations for all singleton operations, requiring only
/// the two static accessors (`cell` and `trace`) and the construction routine
/// (`construct`) to be implemented.
///
/// Hand-written implementations whose construction cannot fail may use
/// `std::convert::Infallible` as their `Error`. The singleton macros always use
/// `SingletonError`, so a panicking initializer can be cached.
pub trait SingletonApi {
    /// The process-wide value.
    type Target: Send + Sync + 'static;

    /// Construction error. Cloned out of the init guard for every caller.
    type Error: Clone + fmt::Debug + Send + Sync + 'static;

    // -------------------------------------------------------------------------------------------------
    // Tracing
    // -------------------------------------------------------------------------------------------------

    /// Access the trace callback static.
    fn trace() -> &'static TraceHook;

    /// Set a tracing callback for singleton operations.
    ///
    /// The callback will be invoked for every construction, `get_instance` and `state` call.
    ///
    /// # Lock Poisoning Recovery
    ///
    /// If the trace lock is poisoned (due to a panic while holding the lock),
    /// this method automatically recovers by extracting the inner value.
    fn set_trace_callback(&self, callback: impl Fn(&SingletonEvent) + Send + Sync + 'static) {
        let mut guard = Self::trace().lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(Arc::new(callback));
    }

    /// Clear the tracing callback.
    ///
    /// After calling this, no tracing events will be delivered to a callback.
    /// `tracing` subscriber output is unaffected.
    fn clear_trace_callback(&self) {
        let mut guard = Self::trace().lock().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    /// Emit an event to the `tracing` subscriber and to the current callback.
    ///
    /// The callback is invoked after the trace lock is released, so it may call
    /// `try_get` or `is_initialized` on this singleton. It must not call `get_instance`
    /// or `state` on it: those emit events themselves and would recurse. `Construct` is
    /// delivered while the init guard is held, where `get_instance` would deadlock.
    ///
    /// # Panics
    ///
    /// If the callback itself panics, the panic will propagate to the caller. A panic
    /// while handling `Construct` aborts, like a panic in `construct`.
    fn emit_event(&self, event: &SingletonEvent) {
        tracing::trace!(%event, "singleton event");

        let callback = {
            let guard = Self::trace().lock().unwrap_or_else(|p| p.into_inner());
            guard.clone()
        };

        if let Some(callback) = callback {
            callback(event);
        }
    }

    // -------------------------------------------------------------------------------------------------
    // Instance
    // -------------------------------------------------------------------------------------------------

    /// Access the init guard static.
    fn cell() -> &'static InitGuard<Self::Target, Self::Error>;

    /// The construction routine. Runs at most once per process.
    ///
    /// Must not access this singleton, as the init guard is held while it runs.
    fn construct() -> Result<Self::Target, Self::Error>;

    /// Return the process-wide instance, constructing it on first access.
    ///
    /// Concurrent first callers block until the single construction completes, then
    /// all of them receive a reference to the same instance. Later callers never block
    /// on construction.
    ///
    /// The `Construct` event is emitted before the init guard is released, so no
    /// caller can observe a `Get` for this singleton ahead of it.
    ///
    /// # Errors
    ///
    /// If construction failed, the error is cached and a clone of it is returned to
    /// this and every later caller. Construction is never retried.
    ///
    /// # Aborts
    ///
    /// A panic unwinding out of `construct`, or out of the trace callback handling the
    /// `Construct` event, aborts the process. The singleton macros catch constructor
    /// panics first and cache them as `SingletonError::Panicked`.
    fn get_instance(&self) -> Result<&'static Self::Target, Self::Error> {
        let type_name = std::any::type_name::<Self::Target>();

        let slot = Self::cell().get_or_init(|| {
            tracing::debug!(type_name, "constructing singleton");

            let abort_guard = AbortOnUnwind { type_name };
            let slot = Self::construct();

            if let Err(error) = &slot {
                tracing::warn!(type_name, ?error, "singleton construction failed");
            }
            self.emit_event(&SingletonEvent::Construct {
                type_name,
                ok: slot.is_ok(),
            });

            std::mem::forget(abort_guard);
            slot
        });

        let result = slot.as_ref().map_err(Clone::clone);

        self.emit_event(&SingletonEvent::Get {
            type_name,
            ok: result.is_ok(),
        });

        result
    }

    /// Return the instance if it has already been constructed successfully.
    ///
    /// Never constructs and never blocks.
    fn try_get(&self) -> Option<&'static Self::Target> {
        Self::cell().get().and_then(|slot| slot.as_ref().ok())
    }

    /// Inspect the init guard without constructing.
    fn state(&self) -> InitState {
        let state = match Self::cell().get() {
            None => InitState::Uninitialized,
            Some(Ok(_)) => InitState::Ready,
            Some(Err(_)) => InitState::Failed,
        };

        self.emit_event(&SingletonEvent::Peek {
            type_name: std::any::type_name::<Self::Target>(),
            state,
        });

        state
    }

    /// Whether construction has completed, successfully or not.
    fn is_initialized(&self) -> bool {
        Self::cell().get().is_some()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------

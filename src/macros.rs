//! Macros for declaring process-wide singletons.
//!
//! Each invocation generates a module that owns one init guard and one trace hook,
//! so every declared singleton is isolated from every other one.

/// Declares an infallible, lazily constructed singleton.
///
/// The macro generates a module containing:
/// - Init guard static (hidden)
/// - Trace callback static (hidden)
/// - An `Api` struct that implements `SingletonApi`, and an `API` constant
/// - Free functions `instance`, `try_get`, `state`, `is_initialized`,
///   `set_trace_callback` and `clear_trace_callback`
///
/// The initializer expression is evaluated on the first call to `instance()`, exactly
/// once, even if many threads make that first call at the same time. Paths in the type
/// and the initializer resolve relative to the module containing the invocation, so
/// declare the singleton's type at module level rather than inside a function body.
///
/// A panic in the initializer is caught and cached as `SingletonError::Panicked`. The
/// singleton is then failed for good: the initializer never runs again, and every call
/// to `instance()` panics with the cached error's message.
///
/// # Examples
///
/// ```rust
/// use lazy_singleton::define_singleton;
///
/// pub struct Settings {
///     pub retries: u32,
/// }
///
/// define_singleton!(settings: Settings = Settings { retries: 3 });
///
/// fn main() {
///     let a = settings::instance();
///     let b = settings::instance();
///
///     assert_eq!(a.retries, 3);
///     assert!(std::ptr::eq(a, b));
/// }
/// ```
///
/// # Trait-Based Usage
///
/// ```rust
/// use lazy_singleton::{define_singleton, InitState, SingletonApi};
///
/// define_singleton!(greeting: String = "hello".to_string());
///
/// assert_eq!(greeting::API.state(), InitState::Uninitialized);
/// let value = greeting::API.get_instance().unwrap();
/// assert_eq!(value, "hello");
/// ```
#[macro_export]
macro_rules! define_singleton {
    (@module $name:ident, $ty:ty, $err:ty, $construct:block, $($instance:item)*) => {
        pub mod $name {
            #![allow(unused_imports, dead_code)]
            use super::*;

            // Init guard: the constructed value or the cached construction error
            static CELL: $crate::InitGuard<$ty, $err> = ::std::sync::OnceLock::new();

            // Trace callback storage (module-private)
            static TRACE: $crate::TraceHook =
                ::std::sync::LazyLock::new(|| ::std::sync::Mutex::new(::std::option::Option::None));

            /// Zero-sized type that implements the singleton API.
            ///
            /// All operations are provided by the `SingletonApi` trait's default
            /// implementations. This struct only provides access to the statics and the
            /// construction routine.
            pub struct Api;

            impl $crate::SingletonApi for Api {
                type Target = $ty;
                type Error = $err;

                fn trace() -> &'static $crate::TraceHook {
                    &TRACE
                }

                fn cell() -> &'static $crate::InitGuard<$ty, $err> {
                    &CELL
                }

                fn construct() -> ::std::result::Result<$ty, $err> $construct
            }

            /// Convenient constant for accessing the singleton API.
            pub const API: Api = Api;

            $($instance)*

            /// Return the instance if it has already been constructed successfully.
            pub fn try_get() -> ::std::option::Option<&'static $ty> {
                use $crate::SingletonApi;
                API.try_get()
            }

            /// Inspect the init guard without constructing.
            pub fn state() -> $crate::InitState {
                use $crate::SingletonApi;
                API.state()
            }

            /// Whether construction has completed, successfully or not.
            pub fn is_initialized() -> bool {
                use $crate::SingletonApi;
                API.is_initialized()
            }

            /// Set a tracing callback for this singleton.
            pub fn set_trace_callback(
                callback: impl Fn(&$crate::SingletonEvent) + Send + Sync + 'static,
            ) {
                use $crate::SingletonApi;
                API.set_trace_callback(callback)
            }

            /// Clear the tracing callback.
            pub fn clear_trace_callback() {
                use $crate::SingletonApi;
                API.clear_trace_callback()
            }
        }
    };

    ($name:ident : $ty:ty = $init:expr) => {
        $crate::define_singleton!(@module $name, $ty, $crate::SingletonError, {
            match ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| $init)) {
                ::std::result::Result::Ok(value) => ::std::result::Result::Ok(value),
                ::std::result::Result::Err(payload) => ::std::result::Result::Err(
                    $crate::SingletonError::from_panic::<$ty>(payload),
                ),
            }
        },
            /// Return the process-wide instance, constructing it on first access.
            ///
            /// # Panics
            ///
            /// Panics on every call if the initializer panicked.
            pub fn instance() -> &'static $ty {
                use $crate::SingletonApi;
                match API.get_instance() {
                    ::std::result::Result::Ok(value) => value,
                    ::std::result::Result::Err(error) => ::std::panic!("{}", error),
                }
            }
        );
    };
}

/// Declares a singleton whose construction can fail.
///
/// The initializer must evaluate to `Result<T, SingletonError>`. It runs at most once:
/// an `Err` (or a panic, which is caught and converted into
/// `SingletonError::Panicked`) is cached, and every call to `instance()` returns a
/// clone of it from then on. Construction is never retried.
///
/// Generates the same module items as [`define_singleton!`], except that `instance()`
/// returns `Result<&'static T, SingletonError>`.
///
/// # Examples
///
/// ```rust
/// use lazy_singleton::{define_fallible_singleton, InitState, SingletonError};
///
/// pub struct Endpoint(pub String);
///
/// fn load_endpoint() -> Result<Endpoint, SingletonError> {
///     Err(SingletonError::construction::<Endpoint>("API_ENDPOINT is not set"))
/// }
///
/// define_fallible_singleton!(endpoint: Endpoint = load_endpoint());
///
/// fn main() {
///     let first = endpoint::instance().map(|e| e.0.as_str());
///     let second = endpoint::instance().map(|e| e.0.as_str());
///
///     assert!(first.is_err());
///     assert_eq!(first, second);
///     assert_eq!(endpoint::state(), InitState::Failed);
/// }
/// ```
#[macro_export]
macro_rules! define_fallible_singleton {
    ($name:ident : $ty:ty = $init:expr) => {
        $crate::define_singleton!(@module $name, $ty, $crate::SingletonError, {
            match ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| $init)) {
                ::std::result::Result::Ok(result) => result,
                ::std::result::Result::Err(payload) => ::std::result::Result::Err(
                    $crate::SingletonError::from_panic::<$ty>(payload),
                ),
            }
        },
            /// Return the process-wide instance, constructing it on first access.
            ///
            /// Returns the cached error if construction failed.
            pub fn instance() -> ::std::result::Result<&'static $ty, $crate::SingletonError> {
                use $crate::SingletonApi;
                API.get_instance()
            }
        );
    };
}

#[cfg(test)]
mod tests {
    use crate::{InitState, SingletonError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    pub struct Greeting {
        pub text: String,
    }

    static GREETING_BUILDS: AtomicUsize = AtomicUsize::new(0);

    fn build_greeting() -> Greeting {
        GREETING_BUILDS.fetch_add(1, Ordering::SeqCst);
        Greeting {
            text: "hello".to_string(),
        }
    }

    define_singleton!(greeting: Greeting = build_greeting());

    #[test]
    fn test_define_singleton_macro() {
        let first = greeting::instance();
        let second = greeting::instance();

        assert_eq!(first.text, "hello");
        assert!(std::ptr::eq(first, second));
        assert!(greeting::is_initialized());
        assert_eq!(greeting::state(), InitState::Ready);
        assert!(std::ptr::eq(greeting::try_get().unwrap(), first));
        assert_eq!(GREETING_BUILDS.load(Ordering::SeqCst), 1);
    }

    define_singleton!(left: u64 = 1);
    define_singleton!(right: u64 = 2);

    #[test]
    fn test_multiple_singletons_same_type() {
        assert_eq!(*left::instance(), 1);
        assert_eq!(*right::instance(), 2);
        assert!(!std::ptr::eq(left::instance(), right::instance()));
    }

    define_fallible_singleton!(
        refused: String = Err(SingletonError::construction::<String>("refused"))
    );

    #[test]
    fn test_fallible_singleton_caches_error() {
        let err = refused::instance().unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to construct singleton alloc::string::String: refused"
        );
        assert_eq!(refused::instance().unwrap_err(), err);
        assert_eq!(refused::state(), InitState::Failed);
        assert!(refused::try_get().is_none());
    }

    fn explode() -> Result<Vec<u8>, SingletonError> {
        panic!("exploded during construction")
    }

    define_fallible_singleton!(exploding: Vec<u8> = explode());

    #[test]
    fn test_fallible_singleton_caches_panic() {
        let err = exploding::instance().unwrap_err();
        assert_eq!(
            err,
            SingletonError::Panicked {
                type_name: "alloc::vec::Vec<u8>",
                message: "exploded during construction".to_string(),
            }
        );
        assert_eq!(exploding::instance().unwrap_err(), err);
    }

    static TOUCHY_BUILDS: AtomicUsize = AtomicUsize::new(0);

    fn build_touchy() -> u16 {
        TOUCHY_BUILDS.fetch_add(1, Ordering::SeqCst);
        panic!("touchy refused to build")
    }

    define_singleton!(touchy: u16 = build_touchy());

    #[test]
    fn test_infallible_panic_is_terminal() {
        let expected = "constructor of singleton u16 panicked: touchy refused to build";

        for _ in 0..3 {
            let payload = std::panic::catch_unwind(touchy::instance).unwrap_err();
            assert_eq!(payload.downcast_ref::<String>().unwrap(), expected);
        }

        assert_eq!(touchy::state(), InitState::Failed);
        assert!(touchy::try_get().is_none());
        assert_eq!(TOUCHY_BUILDS.load(Ordering::SeqCst), 1);
    }

    define_singleton!(traced: i32 = 42);

    #[test]
    fn test_tracing() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();

        traced::set_trace_callback(move |event| {
            events_clone.lock().unwrap().push(format!("{}", event));
        });

        let _ = traced::instance();
        let _ = traced::state();

        traced::clear_trace_callback();

        let recorded = events.lock().unwrap();
        assert_eq!(recorded.len(), 3);
        assert!(recorded[0].starts_with("construct"));
        assert!(recorded[1].starts_with("get"));
        assert!(recorded[2].starts_with("peek"));
    }
}

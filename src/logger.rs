//! A process-wide message log.
//!
//! `Logger` is an ordered, append-only buffer of messages whose appends are serialized
//! by an internal lock, so any number of threads can log through the same instance.
//! [`get_instance`] returns the process-wide `Logger`, constructing it on first use.
//!
//! # Examples
//!
//! ```
//! use lazy_singleton::get_instance;
//!
//! let logger = get_instance();
//! logger.log_message("First message");
//!
//! // Every caller observes the same instance.
//! let again = get_instance();
//! assert!(std::ptr::eq(logger, again));
//! assert!(again.logs().contains(&"First message".to_string()));
//! ```

use std::fmt;
use std::sync::Mutex;

crate::define_singleton!(global_logger: Logger = Logger::new());

/// Returns the process-wide `Logger`, constructing it on the first call.
///
/// Concurrent first callers block until the single construction completes; every call
/// returns a reference to the same instance for the rest of the process lifetime.
pub fn get_instance() -> &'static Logger {
    global_logger::instance()
}

/// Ordered, append-only log of messages.
#[derive(Debug, Default)]
pub struct Logger {
    logs: Mutex<Vec<String>>,
}

impl Logger {
    /// Creates an empty log.
    ///
    /// Most code wants the shared instance from [`get_instance`]; separate instances
    /// are useful in tests.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message.
    ///
    /// Appends from different threads are serialized. An append that happens-before a
    /// call to [`Logger::logs`] is visible in its result.
    ///
    /// # Lock Poisoning Recovery
    ///
    /// If the buffer lock is poisoned, the append still goes through. A push either
    /// happened or did not, so the buffer is never left half-written.
    pub fn log_message(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("Log: {}", message);

        self.logs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message);
    }

    /// Returns a snapshot of all messages in insertion order.
    pub fn logs(&self) -> Vec<String> {
        self.logs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of messages logged so far.
    pub fn len(&self) -> usize {
        self.logs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Whether nothing has been logged yet. Once false, it stays false.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Renders the `All Logs:` listing, one message per line.
impl fmt::Display for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "All Logs:")?;
        for log in self.logs() {
            writeln!(f, "{log}")?;
        }
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_log_message_keeps_order() {
        let logger = Logger::new();
        assert!(logger.is_empty());

        logger.log_message("First message");
        logger.log_message(String::from("Second message"));
        logger.log_message("Third message");

        assert_eq!(
            logger.logs(),
            vec!["First message", "Second message", "Third message"]
        );
        assert_eq!(logger.len(), 3);
    }

    #[test]
    fn test_logs_is_a_snapshot() {
        let logger = Logger::new();
        logger.log_message("before");

        let snapshot = logger.logs();
        logger.log_message("after");

        assert_eq!(snapshot, vec!["before"]);
        assert_eq!(logger.len(), 2);
    }

    #[test]
    fn test_concurrent_appends() {
        let logger = Arc::new(Logger::new());
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let logger = logger.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    for i in 0..100 {
                        logger.log_message(format!("thread {t} message {i}"));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let logs = logger.logs();
        assert_eq!(logs.len(), 800);

        // Per-thread order survives interleaving.
        for t in 0..8 {
            let prefix = format!("thread {t} ");
            let own: Vec<_> = logs.iter().filter(|l| l.starts_with(&prefix)).collect();
            let expected: Vec<_> = (0..100).map(|i| format!("thread {t} message {i}")).collect();
            assert_eq!(own, expected.iter().collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_poisoned_lock_recovers() {
        let logger = Arc::new(Logger::new());
        logger.log_message("kept");

        let poisoner = logger.clone();
        let _ = thread::spawn(move || {
            let _guard = poisoner.logs.lock().unwrap();
            panic!("poison the buffer lock");
        })
        .join();

        logger.log_message("still works");
        assert_eq!(logger.logs(), vec!["kept", "still works"]);
    }

    #[test]
    fn test_display() {
        let logger = Logger::new();
        logger.log_message("one");
        logger.log_message("two");
        assert_eq!(logger.to_string(), "All Logs:\none\ntwo\n");
    }

    #[test]
    #[serial]
    fn test_get_instance_identity() {
        let a = get_instance();
        let b = get_instance();
        assert!(std::ptr::eq(a, b));
        assert!(global_logger::is_initialized());
    }

    #[test]
    #[serial]
    fn test_global_log_only_grows() {
        let logger = get_instance();
        logger.log_message("earlier");
        let before = logger.logs();

        logger.log_message("later");
        let after = get_instance().logs();

        assert!(after.starts_with(&before));
        assert_eq!(after.last().map(String::as_str), Some("later"));
        assert!(!logger.is_empty());
    }
}

use std::any::Any;
use std::fmt;

use thiserror::Error;

/// Failure of a singleton's construction routine.
///
/// A fallible singleton caches this value in its init guard the first time
/// construction fails, and every later access returns a clone of it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SingletonError {
    /// The constructor returned an error.
    #[error("failed to construct singleton {type_name}: {reason}")]
    Construction {
        type_name: &'static str,
        reason: String,
    },

    /// The constructor panicked.
    #[error("constructor of singleton {type_name} panicked: {message}")]
    Panicked {
        type_name: &'static str,
        message: String,
    },
}

impl SingletonError {
    /// Construction failure for a singleton of type `T`.
    pub fn construction<T: ?Sized>(reason: impl fmt::Display) -> Self {
        SingletonError::Construction {
            type_name: std::any::type_name::<T>(),
            reason: reason.to_string(),
        }
    }

    /// Converts a payload caught by `std::panic::catch_unwind` into an error for `T`.
    pub fn from_panic<T: ?Sized>(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };

        SingletonError::Panicked {
            type_name: std::any::type_name::<T>(),
            message,
        }
    }

    /// Name of the singleton type whose construction failed.
    pub fn type_name(&self) -> &'static str {
        match self {
            SingletonError::Construction { type_name, .. }
            | SingletonError::Panicked { type_name, .. } => type_name,
        }
    }
}

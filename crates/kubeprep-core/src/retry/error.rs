//! Error types for the retry execution engine

use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Errors that can occur during retry execution
///
/// The error type is generic over `E`, the underlying error type from the
/// operation being retried.
#[derive(Debug)]
pub enum RetryError<E> {
    /// All retry attempts have been exhausted
    Exhausted {
        /// Number of attempts made before giving up
        attempts: u32,
        /// The error from the final attempt
        source: E,
        /// Total duration spent across all attempts
        total_duration: Duration,
    },

    /// The policy allowed no attempt at all
    NoAttempts,
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Exhausted {
                attempts,
                source,
                total_duration,
            } => write!(
                f,
                "retry exhausted after {} attempts over {:.2}s: {}",
                attempts,
                total_duration.as_secs_f64(),
                source
            ),
            RetryError::NoAttempts => write!(f, "retry policy allows zero attempts"),
        }
    }
}

impl<E: Error + 'static> Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RetryError::Exhausted { source, .. } => Some(source),
            RetryError::NoAttempts => None,
        }
    }
}

impl<E> RetryError<E> {
    /// Create a new exhausted error
    pub fn exhausted(attempts: u32, source: E, total_duration: Duration) -> Self {
        RetryError::Exhausted {
            attempts,
            source,
            total_duration,
        }
    }

    /// Get the number of attempts made
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } => *attempts,
            RetryError::NoAttempts => 0,
        }
    }

    /// Check if all attempts were used up
    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }
}

impl From<RetryError<crate::Error>> for crate::Error {
    fn from(err: RetryError<crate::Error>) -> Self {
        match err {
            RetryError::Exhausted {
                attempts, source, ..
            } => crate::Error::Exhausted {
                attempts,
                source: Box::new(source),
            },
            RetryError::NoAttempts => {
                crate::Error::invalid_config("retry policy allows zero attempts")
            }
        }
    }
}

//! Fixed-interval retry execution engine
//!
//! Every flaky cluster-mutating call in the bootstrap goes through this
//! module instead of an ad hoc loop with a counter and a sleep. Failures seen
//! here are eventual-consistency delays (a just-created binding not yet
//! visible, a chart repository still syncing), so the delay between attempts
//! is constant: no backoff growth and no jitter.
//!
//! # Example
//!
//! ```rust,no_run
//! use kubeprep_core::retry::{retry, RetryError};
//! use kubeprep_core::types::RetryPolicy;
//!
//! async fn example() -> Result<String, RetryError<std::io::Error>> {
//!     retry("helm init", &RetryPolicy::HELM_INIT, || async {
//!         Ok("initialised".to_string())
//!     })
//!     .await
//! }
//! ```

mod error;
mod executor;
mod observer;

pub use error::RetryError;
pub use executor::{retry, RetryExecutor};
pub use observer::{NoOpObserver, RetryObserver, TracingObserver};

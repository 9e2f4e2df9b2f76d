//! Reliability patterns for backend communication.
//!
//! Provides retry logic with exponential backoff for transient failures
//! when talking to the plan catalog service or the subscription store.

mod retry;

pub use retry::{RetryPolicy, is_retryable, retry_with_backoff};

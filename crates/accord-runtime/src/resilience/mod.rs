//! Resilience for provider dispatch.
//!
//! Tasks are never retried. The only protection is a per-provider circuit
//! breaker that short-circuits providers which keep failing.

mod circuit_breaker;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};

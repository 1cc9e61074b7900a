//! # Circuit Breaker Module
//!
//! This module implements the circuit breaker pattern for tracking API lookups.
//! When the API fails repeatedly, lookups fail fast for a while instead of
//! making every user wait for the full timeout.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::config::LookupConfig;

#[derive(Debug, Default)]
struct BreakerState {
    failure_count: u32,
    last_failure_time: Option<Instant>,
    /// A trial lookup is running after the reset window elapsed
    trial_in_flight: bool,
}

/// Circuit breaker for tracking API lookups
///
/// # State Machine
///
/// - **Closed**: Normal operation, lookups pass through
/// - **Open**: Failure threshold exceeded, lookups fail fast
/// - **Half-Open**: Reset window elapsed, the next lookup is let through as a
///   trial while others keep failing fast. A failed trial reopens the circuit
///   for a full window; a successful one closes it.
///
/// A lookup that finds no shipment is a success; only remote failures
/// (network, timeout, HTTP status, undecodable body) are counted.
#[derive(Debug)]
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    threshold: u32,
    reset_after: Duration,
}

impl CircuitBreaker {
    /// Create a new circuit breaker
    ///
    /// # Examples
    ///
    /// ```rust
    /// use global_trade_bot::circuit_breaker::CircuitBreaker;
    /// use std::time::Duration;
    ///
    /// let circuit_breaker = CircuitBreaker::new(5, Duration::from_secs(60));
    /// assert!(!circuit_breaker.is_open());
    /// ```
    pub fn new(threshold: u32, reset_after: Duration) -> Self {
        Self {
            state: Mutex::new(BreakerState::default()),
            threshold: threshold.max(1),
            reset_after,
        }
    }

    pub fn from_config(config: &LookupConfig) -> Self {
        Self::new(
            config.circuit_breaker_threshold,
            Duration::from_secs(config.circuit_breaker_reset_secs),
        )
    }

    // A panic while holding the lock cannot leave the counters inconsistent
    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Check if circuit breaker is open (blocking lookups)
    ///
    /// Once the reset window has elapsed, the first caller gets `false` and
    /// must report the outcome with [`record_success`](Self::record_success)
    /// or [`record_failure`](Self::record_failure).
    pub fn is_open(&self) -> bool {
        let mut state = self.lock();

        if state.failure_count < self.threshold {
            return false;
        }
        if state.trial_in_flight {
            return true;
        }
        match state.last_failure_time {
            Some(last_time) if last_time.elapsed() < self.reset_after => true,
            _ => {
                state.trial_in_flight = true;
                false
            }
        }
    }

    /// Whether a half-open trial lookup is running
    pub fn is_half_open(&self) -> bool {
        self.lock().trial_in_flight
    }

    /// Record a failed lookup
    ///
    /// The failure count is kept at or above the threshold after a failed
    /// trial, so the circuit reopens immediately.
    pub fn record_failure(&self) {
        let mut state = self.lock();
        state.failure_count = state.failure_count.saturating_add(1);
        state.last_failure_time = Some(Instant::now());
        state.trial_in_flight = false;
    }

    /// End a trial whose outcome says nothing about the API's health
    pub fn abandon_trial(&self) {
        self.lock().trial_in_flight = false;
    }

    /// Record a successful lookup, closing the circuit
    pub fn record_success(&self) {
        *self.lock() = BreakerState::default();
    }

    pub fn failure_count(&self) -> u32 {
        self.lock().failure_count
    }
}

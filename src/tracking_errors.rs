//! # Tracking Error Types Module
//!
//! This module defines the error types produced while looking up a shipment
//! and rendering its status report. None of them is shown to the user
//! verbatim: the conversation handler logs them and answers with a generic
//! retry-later message.

/// Errors raised by the lookup client, the report formatter and asset loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingError {
    /// Transport-level failure talking to the tracking API
    Network(String),
    /// The lookup did not complete within the configured bound
    Timeout(String),
    /// The tracking API answered with a non-success HTTP status
    Status(u16),
    /// The response body did not match the expected schema
    Decode(String),
    /// The circuit breaker is open and the lookup was not attempted
    CircuitOpen,
    /// A static asset file could not be read
    Asset(String),
    /// The report template is malformed
    Template(String),
}

impl TrackingError {
    /// Whether this error was caused by the remote API and should count
    /// against the circuit breaker
    pub fn is_remote_failure(&self) -> bool {
        matches!(
            self,
            TrackingError::Network(_)
                | TrackingError::Timeout(_)
                | TrackingError::Status(_)
                | TrackingError::Decode(_)
        )
    }
}

impl std::fmt::Display for TrackingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackingError::Network(msg) => write!(f, "Network error: {msg}"),
            TrackingError::Timeout(msg) => write!(f, "Timeout error: {msg}"),
            TrackingError::Status(code) => write!(f, "Tracking API returned HTTP {code}"),
            TrackingError::Decode(msg) => write!(f, "Decode error: {msg}"),
            TrackingError::CircuitOpen => {
                write!(f, "Tracking API circuit breaker is open, lookup skipped")
            }
            TrackingError::Asset(msg) => write!(f, "Asset error: {msg}"),
            TrackingError::Template(msg) => write!(f, "Template error: {msg}"),
        }
    }
}

impl std::error::Error for TrackingError {}

impl From<reqwest::Error> for TrackingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TrackingError::Timeout(err.to_string())
        } else if err.is_decode() {
            TrackingError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            TrackingError::Status(status.as_u16())
        } else {
            TrackingError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TrackingError {
    fn from(err: serde_json::Error) -> Self {
        TrackingError::Decode(err.to_string())
    }
}

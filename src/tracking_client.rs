//! # Tracking Client Module
//!
//! Remote lookup of a shipment by tracking code. One request per lookup,
//! bounded by a timeout and guarded by a [`CircuitBreaker`]; nothing is
//! retried or cached.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::circuit_breaker::CircuitBreaker;
use crate::config::LookupConfig;
use crate::shipment::{LookupEnvelope, ShipmentRecord};
use crate::tracking_errors::TrackingError;

/// Source of shipment records
///
/// `Ok(None)` means the lookup succeeded but the code matches no shipment.
#[async_trait]
pub trait ShipmentLookup: Send + Sync {
    async fn lookup(&self, tracking_code: &str) -> Result<Option<ShipmentRecord>, TrackingError>;
}

/// [`ShipmentLookup`] backed by the logistics provider's HTTP API
#[derive(Debug)]
pub struct HttpShipmentLookup {
    client: reqwest::Client,
    config: LookupConfig,
    circuit_breaker: CircuitBreaker,
}

impl HttpShipmentLookup {
    pub fn new(config: LookupConfig) -> Result<Self, TrackingError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            circuit_breaker: CircuitBreaker::from_config(&config),
            config,
        })
    }

    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.circuit_breaker
    }

    async fn fetch(&self, tracking_code: &str) -> Result<Option<ShipmentRecord>, TrackingError> {
        let response = self
            .client
            .get(self.config.endpoint.clone())
            .query(&[(self.config.query_param.as_str(), tracking_code)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrackingError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let envelope: LookupEnvelope = serde_json::from_slice(&body)?;
        Ok(envelope.into_record())
    }
}

#[async_trait]
impl ShipmentLookup for HttpShipmentLookup {
    async fn lookup(&self, tracking_code: &str) -> Result<Option<ShipmentRecord>, TrackingError> {
        if self.circuit_breaker.is_open() {
            warn!(
                failures = self.circuit_breaker.failure_count(),
                "Tracking API circuit breaker is open, skipping lookup"
            );
            return Err(TrackingError::CircuitOpen);
        }

        let timeout = self.config.timeout();
        let result = match tokio::time::timeout(timeout, self.fetch(tracking_code)).await {
            Ok(result) => result,
            Err(_) => Err(TrackingError::Timeout(format!(
                "lookup exceeded {}s",
                timeout.as_secs()
            ))),
        };

        match &result {
            Ok(record) => {
                debug!(found = record.is_some(), "Tracking API lookup completed");
                self.circuit_breaker.record_success();
            }
            Err(e) if e.is_remote_failure() => {
                warn!(error = %e, "Tracking API lookup failed");
                self.circuit_breaker.record_failure();
            }
            Err(_) => self.circuit_breaker.abandon_trial(),
        }

        result
    }
}

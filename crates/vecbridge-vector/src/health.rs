//! Health reporting for vector backends.

use std::time::Duration;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Represents the operational status of a service.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceStatus {
    /// Service answered the liveness probe.
    #[default]
    Healthy,
    /// Service is unreachable or answered with an unexpected token.
    Unhealthy,
}

/// Health information for a backend.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    /// Current service status
    pub status: ServiceStatus,
    /// Round-trip time of the liveness probe
    pub response: Option<Duration>,
    /// Optional message describing the current state
    pub message: Option<String>,
    /// Timestamp when the health check was performed
    pub checked_at: Timestamp,
}

impl ServiceHealth {
    /// Creates a new healthy service health report.
    pub fn healthy() -> Self {
        Self {
            status: ServiceStatus::Healthy,
            checked_at: Timestamp::now(),
            ..Default::default()
        }
    }

    /// Creates a new unhealthy service health report.
    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: ServiceStatus::Unhealthy,
            message: Some(message.into()),
            checked_at: Timestamp::now(),
            ..Default::default()
        }
    }

    /// Sets the response time for this health check.
    pub fn with_response_time(mut self, response_time: Duration) -> Self {
        self.response = Some(response_time);
        self
    }

    /// Returns `true` if the service is healthy.
    pub fn is_healthy(&self) -> bool {
        self.status == ServiceStatus::Healthy
    }
}

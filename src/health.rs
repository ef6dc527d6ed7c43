//! Health Check Handler
//!
//! `GET /health` reports whether the service can reach its user store.

use crate::user::service::UserService;
use crate::utils::response_handler::ApiResponse;
use crate::{SERVICE_NAME, VERSION};
use actix_web::http::StatusCode;
use actix_web::web;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Service status enumeration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Unhealthy,
}

/// Service health status
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: ServiceStatus,
    pub service: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub store_reachable: bool,
    pub response_time_ms: u64,
}

/// Convert duration to milliseconds, ensuring it fits in u64
fn safe_duration_to_ms(duration: std::time::Duration) -> u64 {
    duration.as_millis().try_into().unwrap_or(u64::MAX)
}

pub async fn health(service: web::Data<UserService>) -> ApiResponse<HealthStatus> {
    let start = Instant::now();
    let probe = service.ping_store().await;
    if let Err(e) = &probe {
        log::warn!("Health check failed: {e}");
    }

    let (http_status, status, message) = match probe {
        Ok(()) => (StatusCode::OK, ServiceStatus::Healthy, "Service is healthy"),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            ServiceStatus::Unhealthy,
            "User store is unreachable",
        ),
    };

    ApiResponse::new(
        http_status,
        HealthStatus {
            store_reachable: status == ServiceStatus::Healthy,
            status,
            service: SERVICE_NAME.to_string(),
            version: VERSION.to_string(),
            timestamp: Utc::now(),
            response_time_ms: safe_duration_to_ms(start.elapsed()),
        },
        message,
    )
}

/// Configure health routes
pub fn configure_health_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health));
}

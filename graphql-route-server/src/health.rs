//! Health check endpoint

use crate::schema::AccountsSchema;
use axum::extract::{Json, State};
use serde::Serialize;
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall health status
    pub status: HealthStatus,
    /// Timestamp of the health check
    pub timestamp: String,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Version information
    pub version: String,
    /// GraphQL engine status
    pub graphql: ComponentStatus,
}

/// Health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Individual component status
#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub status: HealthStatus,
    pub response_time_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Application start time for uptime calculation
static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize the health check system
pub fn init() {
    let _ = START_TIME.set(Instant::now());
}

/// Get health status
pub async fn health_check(State(schema): State<AccountsSchema>) -> Json<HealthResponse> {
    let uptime = START_TIME
        .get()
        .map(Instant::elapsed)
        .unwrap_or_default();

    let graphql = check_graphql(&schema).await;
    let status = graphql.status;

    tracing::debug!(
        "Health check - Status: {:?}, Uptime: {}s",
        status,
        uptime.as_secs()
    );

    Json(HealthResponse {
        status,
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime_seconds: uptime.as_secs(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        graphql,
    })
}

/// Run a trivial operation through the engine
async fn check_graphql(schema: &AccountsSchema) -> ComponentStatus {
    let start = Instant::now();
    let outcome = timeout(Duration::from_secs(5), schema.execute("{ __typename }")).await;
    let response_time_ms = start.elapsed().as_secs_f64() * 1000.0;

    let error = match outcome {
        Ok(response) if response.errors.is_empty() => None,
        Ok(response) => Some(
            response
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        ),
        Err(_) => Some("GraphQL health check timed out".to_string()),
    };

    ComponentStatus {
        status: if error.is_none() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        },
        response_time_ms,
        error,
    }
}

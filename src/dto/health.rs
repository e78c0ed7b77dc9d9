use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded" while the remote store is unreachable).
    pub status: String,
}

impl HealthResponse {
    /// Create a health response indicating the remote store is reachable.
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }

    /// Create a health response indicating the service runs on its local cache only.
    pub fn degraded() -> Self {
        Self {
            status: "degraded".to_string(),
        }
    }
}

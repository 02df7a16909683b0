use serde::Serialize;
use utoipa::ToSchema;

/// Health check response body.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Simple health service usable by any API front end.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Static method to check health without creating an instance.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "depot is alive".into(),
        }
    }
}

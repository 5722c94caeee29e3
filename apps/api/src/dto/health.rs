use serde::Serialize;

/// Health and liveness payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: String,
}

/// Status of one readiness dependency.
#[derive(Debug, Clone, Serialize)]
pub struct DependencyStatus {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl DependencyStatus {
    pub fn ok() -> Self {
        Self {
            status: "ok",
            detail: None,
        }
    }

    pub fn error(detail: String) -> Self {
        Self {
            status: "error",
            detail: Some(detail),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[derive(Debug, Serialize)]
pub struct ReadinessChecks {
    pub audit_log: DependencyStatus,
    pub registry: DependencyStatus,
}

/// Readiness payload.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub version: String,
    pub checks: ReadinessChecks,
}

/// Plain message payload.
#[derive(Debug, Serialize)]
pub struct GenericMessageResponse {
    pub message: String,
}

/// Whether the caller's role may override controllers.
#[derive(Debug, Serialize)]
pub struct OverrideCapabilityResponse {
    pub allowed: bool,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<&'static str>,
}

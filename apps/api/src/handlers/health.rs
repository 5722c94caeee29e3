use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::{DependencyStatus, HealthResponse, ReadinessChecks, ReadinessResponse};
use crate::state::AppState;

mod checks;
mod handlers;

pub use handlers::{health_handler, live_handler, ready_handler};

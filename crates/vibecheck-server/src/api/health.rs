use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use serde::Serialize;

use crate::middleware::RequestId;
use crate::scheduler::SchedulerState;

use super::{ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize, PartialEq, Eq)]
pub(super) struct HealthData {
    status: &'static str,
    database: &'static str,
    scheduler: &'static str,
}

fn scheduler_label(scheduler: &SchedulerState) -> &'static str {
    if scheduler.is_shutting_down() {
        "shutting_down"
    } else if scheduler.health().healthy {
        "ok"
    } else {
        "overdue"
    }
}

pub(super) async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    let database = match vibecheck_db::health_check(&state.pool).await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            "unavailable"
        }
    };
    let scheduler = scheduler_label(&state.scheduler);
    let healthy = database == "ok" && scheduler == "ok";

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse {
            data: HealthData {
                status: if healthy { "ok" } else { "degraded" },
                database,
                scheduler,
            },
            meta,
        }),
    )
}

pub(super) async fn scheduler_health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let health = state.scheduler.health();
    if !health.healthy {
        tracing::warn!("health check: scheduler has overdue jobs");
    }
    let status = if health.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse {
            data: health,
            meta: ResponseMeta::new(req_id.0),
        }),
    )
}

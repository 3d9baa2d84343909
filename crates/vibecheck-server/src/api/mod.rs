mod entities;
mod executions;
mod health;
mod sentiment;

use axum::{
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::middleware::{request_id, REQUEST_ID_HEADER};
use crate::scheduler::SchedulerState;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub scheduler: SchedulerState,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }

    pub(super) fn bad_request(request_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(request_id, "bad_request", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" => StatusCode::BAD_REQUEST,
            "service_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}

pub(super) fn map_db_error(request_id: String, error: &vibecheck_db::DbError) -> ApiError {
    if matches!(error, vibecheck_db::DbError::NotFound) {
        return ApiError::new(request_id, "not_found", "resource not found");
    }
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

/// Parse an entity id path segment.
pub(super) fn parse_entity_id(request_id: &str, raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::bad_request(request_id, format!("invalid entity id: {raw}")))
}

/// Parse a query limit, leaving range handling to the caller.
pub(super) fn parse_limit(request_id: &str, raw: Option<&str>) -> Result<Option<i64>, ApiError> {
    raw.map(|value| {
        value
            .trim()
            .parse::<i64>()
            .map_err(|_| ApiError::bad_request(request_id, format!("invalid limit: {value}")))
    })
    .transpose()
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
pub(super) fn parse_datetime_param(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn build_cors(origins: &str) -> CorsLayer {
    let allow_origin = if origins.trim() == "*" {
        AllowOrigin::any()
    } else {
        let list: Vec<HeaderValue> = origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(list)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(REQUEST_ID_HEADER)])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
}

pub fn build_app(state: AppState, cors_origins: &str) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/scheduler", get(health::scheduler_health))
        .route("/entities", get(entities::list_entities))
        .route("/entities/{id}", get(entities::get_entity))
        .route("/entities/{id}/sentiment", get(sentiment::get_entity_sentiment))
        .route("/executions", get(executions::list_executions))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors(cors_origins))
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use sqlx::PgPool;
    use tower::ServiceExt;

    use super::{build_app, AppState};
    use crate::scheduler::{Clock, ManualClock, SchedulerState, REQUIRED_JOBS};

    pub(crate) fn scheduler_with(clock: &Arc<ManualClock>) -> SchedulerState {
        let state = SchedulerState::new(Arc::clone(clock) as Arc<dyn Clock>);
        for name in REQUIRED_JOBS {
            state.register(name, Duration::from_secs(900));
        }
        state
    }

    pub(crate) fn app(pool: PgPool) -> Router {
        build_app(
            AppState {
                pool,
                scheduler: scheduler_with(&ManualClock::new()),
            },
            "*",
        )
    }

    pub(crate) async fn seeded_app(pool: PgPool) -> Router {
        vibecheck_db::seed_entities(&pool, vibecheck_core::curated_entities())
            .await
            .expect("seed entities");
        app(pool)
    }

    pub(crate) async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        assert!(
            response.headers().contains_key("x-request-id"),
            "every response carries a request id"
        );
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = serde_json::from_slice(&body).expect("json parse");
        (status, json)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn normalize_limit_applies_defaults_and_bounds() {
        assert_eq!(normalize_limit(None), 50);
        assert_eq!(normalize_limit(Some(0)), 1);
        assert_eq!(normalize_limit(Some(1_000)), 200);
        assert_eq!(normalize_limit(Some(25)), 25);
    }

    #[test]
    fn api_error_codes_map_to_statuses() {
        let cases = [
            ("bad_request", StatusCode::BAD_REQUEST),
            ("not_found", StatusCode::NOT_FOUND),
            ("service_unavailable", StatusCode::SERVICE_UNAVAILABLE),
            ("internal_error", StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (code, status) in cases {
            let response = ApiError::new("req-1", code, "message").into_response();
            assert_eq!(response.status(), status, "code {code}");
        }
    }

    #[test]
    fn datetime_params_accept_rfc3339_and_plain_dates() {
        assert_eq!(
            parse_datetime_param("2026-02-05"),
            Some(Utc.with_ymd_and_hms(2026, 2, 5, 0, 0, 0).unwrap())
        );
        assert_eq!(
            parse_datetime_param("2026-02-05T13:00:00+02:00"),
            Some(Utc.with_ymd_and_hms(2026, 2, 5, 11, 0, 0).unwrap())
        );
        assert_eq!(parse_datetime_param("05/02/2026"), None);
        assert_eq!(parse_datetime_param("2026-02-31"), None);
    }

    #[test]
    fn limit_and_id_parsing_reject_garbage() {
        assert_eq!(parse_limit("r", None).unwrap(), None);
        assert_eq!(parse_limit("r", Some("25")).unwrap(), Some(25));
        assert!(parse_limit("r", Some("lots")).is_err());
        assert_eq!(parse_entity_id("r", "7").unwrap(), 7);
        assert!(parse_entity_id("r", "seven").is_err());
    }
}

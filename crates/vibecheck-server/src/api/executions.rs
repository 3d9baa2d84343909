use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use vibecheck_db::JobExecutionRow;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct ExecutionsQuery {
    pub job_name: Option<String>,
    pub limit: Option<i64>,
}

pub(super) async fn list_executions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ExecutionsQuery>,
) -> Result<Json<ApiResponse<Vec<JobExecutionRow>>>, ApiError> {
    let rows = vibecheck_db::list_job_executions(
        &state.pool,
        query.job_name.as_deref(),
        normalize_limit(query.limit),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows,
        meta: ResponseMeta::new(req_id.0),
    }))
}

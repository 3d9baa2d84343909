use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use vibecheck_db::EntityRow;

use crate::middleware::RequestId;

use super::{map_db_error, parse_entity_id, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct EntityItem {
    id: i64,
    name: String,
    category: String,
    created_at: DateTime<Utc>,
}

impl From<EntityRow> for EntityItem {
    fn from(row: EntityRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            category: row.category,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct EntityDetailItem {
    #[serde(flatten)]
    entity: EntityItem,
    /// Mean of the most recent daily point.
    latest_sentiment: Option<f64>,
}

pub(super) async fn list_entities(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<EntityItem>>>, ApiError> {
    let rows = vibecheck_db::list_entities(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(EntityItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_entity(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiResponse<EntityDetailItem>>, ApiError> {
    let id = parse_entity_id(&req_id.0, &raw_id)?;

    let row = vibecheck_db::get_entity(&state.pool, id)
        .await
        .map_err(|e| match e {
            vibecheck_db::DbError::NotFound => {
                ApiError::new(req_id.0.clone(), "not_found", format!("entity {id} not found"))
            }
            other => map_db_error(req_id.0.clone(), &other),
        })?;

    let latest = vibecheck_db::latest_daily_sentiment(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: EntityDetailItem {
            entity: row.into(),
            latest_sentiment: latest.and_then(|point| point.sentiment_mean),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::{TimeZone, Utc};
    use sqlx::PgPool;

    use super::super::test_support::{get_json, seeded_app};

    #[sqlx::test(migrations = "../../migrations")]
    async fn lists_seeded_entities_by_name(pool: PgPool) {
        let (status, json) = get_json(seeded_app(pool).await, "/entities").await;

        assert_eq!(status, StatusCode::OK);
        let data = json["data"].as_array().expect("data array");
        assert_eq!(data.len(), 10);
        assert_eq!(data[0]["name"], "Claude");
        assert_eq!(data[9]["name"], "v0");
        assert!(data.iter().any(|e| e["name"] == "Cursor" && e["category"] == "tool"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn detail_includes_latest_daily_mean(pool: PgPool) {
        vibecheck_db::seed_entities(&pool, vibecheck_core::curated_entities())
            .await
            .expect("seed");
        let claude = vibecheck_db::get_entity_by_name(&pool, "Claude")
            .await
            .expect("claude");
        for (day, mean) in [(3, 0.1), (4, 0.35)] {
            sqlx::query(
                "INSERT INTO sentiment_points \
                 (entity_id, bucket_start, period, sentiment_mean, record_count) \
                 VALUES ($1, $2, 'daily', $3, 1)",
            )
            .bind(claude.id)
            .bind(Utc.with_ymd_and_hms(2026, 2, day, 0, 0, 0).unwrap())
            .bind(mean)
            .execute(&pool)
            .await
            .expect("insert point");
        }

        let app = super::super::test_support::app(pool);
        let (status, json) = get_json(app, &format!("/entities/{}", claude.id)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["name"], "Claude");
        assert_eq!(json["data"]["latest_sentiment"], 0.35);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn unknown_entity_is_404_and_bad_id_is_400(pool: PgPool) {
        let app = seeded_app(pool).await;

        let (status, json) = get_json(app.clone(), "/entities/999999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "not_found");

        let (status, json) = get_json(app, "/entities/claude").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "bad_request");
    }
}

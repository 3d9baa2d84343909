use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vibecheck_core::Period;
use vibecheck_db::{SentimentPointRow, SentimentQuery};

use crate::middleware::RequestId;

use super::{
    map_db_error, parse_datetime_param, parse_entity_id, parse_limit, ApiError, AppState,
    ResponseMeta,
};

// Raw strings so malformed values get the JSON error envelope instead of
// axum's plain-text query rejection.
#[derive(Debug, Deserialize)]
pub(super) struct SentimentParams {
    period: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    cursor: Option<String>,
    limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct SentimentSeriesResponse {
    entity_id: i64,
    period: Period,
    data: Vec<SentimentPointRow>,
    next_cursor: Option<DateTime<Utc>>,
    has_more: bool,
    meta: ResponseMeta,
}

fn parse_query(req_id: &str, params: &SentimentParams) -> Result<SentimentQuery, ApiError> {
    let period = match params.period.as_deref() {
        None => Period::Daily,
        Some(raw) => raw.parse::<Period>().map_err(|_| {
            ApiError::bad_request(req_id, format!("invalid period: {raw} (expected hourly or daily)"))
        })?,
    };

    let timestamp = |name: &str, raw: Option<&str>| {
        raw.map(|value| {
            parse_datetime_param(value).ok_or_else(|| {
                ApiError::bad_request(
                    req_id,
                    format!("invalid {name}: {value} (expected RFC 3339 or YYYY-MM-DD)"),
                )
            })
        })
        .transpose()
    };

    Ok(SentimentQuery {
        period,
        start: timestamp("start_date", params.start_date.as_deref())?,
        end: timestamp("end_date", params.end_date.as_deref())?,
        cursor: timestamp("cursor", params.cursor.as_deref())?,
        limit: vibecheck_db::clamp_sentiment_limit(parse_limit(req_id, params.limit.as_deref())?),
    })
}

pub(super) async fn get_entity_sentiment(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(raw_id): Path<String>,
    Query(params): Query<SentimentParams>,
) -> Result<Json<SentimentSeriesResponse>, ApiError> {
    let entity_id = parse_entity_id(&req_id.0, &raw_id)?;
    let query = parse_query(&req_id.0, &params)?;

    let page = vibecheck_db::get_sentiment(&state.pool, entity_id, &query)
        .await
        .map_err(|e| match e {
            vibecheck_db::DbError::NotFound => ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("entity {entity_id} not found"),
            ),
            other => map_db_error(req_id.0.clone(), &other),
        })?;

    Ok(Json(SentimentSeriesResponse {
        entity_id,
        period: query.period,
        data: page.data,
        next_cursor: page.next_cursor,
        has_more: page.has_more,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use axum::http::StatusCode;
    use chrono::{TimeZone, Utc};
    use sqlx::PgPool;

    use super::super::test_support::{app, get_json};

    async fn seeded_claude(pool: &PgPool) -> i64 {
        vibecheck_db::seed_entities(pool, vibecheck_core::curated_entities())
            .await
            .expect("seed");
        vibecheck_db::get_entity_by_name(pool, "Claude")
            .await
            .expect("claude")
            .id
    }

    async fn insert_daily_points(pool: &PgPool, entity_id: i64, days: &[u32]) {
        for day in days {
            sqlx::query(
                "INSERT INTO sentiment_points \
                 (entity_id, bucket_start, period, sentiment_mean, record_count) \
                 VALUES ($1, $2, 'daily', 0.25, 3)",
            )
            .bind(entity_id)
            .bind(Utc.with_ymd_and_hms(2026, 2, *day, 0, 0, 0).unwrap())
            .execute(pool)
            .await
            .expect("insert point");
        }
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn empty_series_is_ok_with_no_cursor(pool: PgPool) {
        let id = seeded_claude(&pool).await;

        let (status, json) = get_json(app(pool), &format!("/entities/{id}/sentiment")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["entity_id"], id);
        assert_eq!(json["period"], "daily");
        assert_eq!(json["data"], serde_json::json!([]));
        assert!(json["next_cursor"].is_null());
        assert_eq!(json["has_more"], false);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn cursor_pages_cover_the_series_without_gaps(pool: PgPool) {
        let id = seeded_claude(&pool).await;
        insert_daily_points(&pool, id, &[1, 2, 3, 4, 5]).await;
        let app = app(pool);

        let mut seen = Vec::new();
        let mut uri = format!("/entities/{id}/sentiment?period=daily&limit=2");
        let mut pages = 0;
        loop {
            let (status, json) = get_json(app.clone(), &uri).await;
            assert_eq!(status, StatusCode::OK);
            pages += 1;
            for point in json["data"].as_array().expect("data array") {
                seen.push(point["timestamp"].as_str().expect("timestamp").to_string());
            }
            if json["has_more"] == false {
                assert!(json["next_cursor"].is_null());
                break;
            }
            let cursor = json["next_cursor"].as_str().expect("cursor");
            uri = format!("/entities/{id}/sentiment?period=daily&limit=2&cursor={cursor}");
        }

        assert_eq!(pages, 3);
        assert_eq!(seen.len(), 5);
        assert_eq!(seen.iter().collect::<HashSet<_>>().len(), 5);
        let mut newest_first = seen.clone();
        newest_first.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(seen, newest_first);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn date_range_accepts_plain_dates(pool: PgPool) {
        let id = seeded_claude(&pool).await;
        insert_daily_points(&pool, id, &[1, 2, 3, 4, 5]).await;

        let (status, json) = get_json(
            app(pool),
            &format!("/entities/{id}/sentiment?start_date=2026-02-02&end_date=2026-02-04"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let data = json["data"].as_array().expect("data array");
        assert_eq!(data.len(), 3);
        assert_eq!(data[0]["record_count"], 3);
        assert_eq!(data[0]["period"], "daily");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn malformed_parameters_are_400(pool: PgPool) {
        let id = seeded_claude(&pool).await;
        let app = app(pool);

        for query in [
            "period=weekly",
            "start_date=yesterday",
            "end_date=2026-13-01",
            "cursor=not-a-time",
            "limit=many",
        ] {
            let (status, json) =
                get_json(app.clone(), &format!("/entities/{id}/sentiment?{query}")).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "query {query}");
            assert_eq!(json["error"]["code"], "bad_request");
        }
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn unknown_entity_is_404(pool: PgPool) {
        let (status, json) = get_json(app(pool), "/entities/424242/sentiment").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "not_found");
    }
}

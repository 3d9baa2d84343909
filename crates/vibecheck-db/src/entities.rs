//! Database operations for the `entities` table.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use vibecheck_core::Category;

use crate::DbError;

/// A row from the `entities` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EntityRow {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

impl EntityRow {
    /// Parses the stored `category` column.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidStoredValue`] if the column holds a value the
    /// schema check should have rejected.
    pub fn category(&self) -> Result<Category, DbError> {
        self.category
            .parse::<Category>()
            .map_err(|_| DbError::InvalidStoredValue {
                column: "entities.category",
                value: self.category.clone(),
            })
    }
}

/// Fetches an entity by its canonical name.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no entity has that name, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_entity_by_name(pool: &PgPool, name: &str) -> Result<EntityRow, DbError> {
    sqlx::query_as::<_, EntityRow>(
        "SELECT id, name, category, created_at \
         FROM entities \
         WHERE name = $1",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Maps canonical names to entity ids in one round trip.
///
/// Names with no matching row are absent from the returned map.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn resolve_entity_ids(
    pool: &PgPool,
    names: &[&str],
) -> Result<HashMap<String, i64>, DbError> {
    let names: Vec<String> = names.iter().map(|n| (*n).to_string()).collect();

    let rows = sqlx::query_as::<_, (String, i64)>(
        "SELECT name, id \
         FROM entities \
         WHERE name = ANY($1)",
    )
    .bind(&names)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().collect())
}

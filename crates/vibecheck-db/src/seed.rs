use sqlx::PgPool;
use vibecheck_core::TrackedEntity;

use crate::DbError;

/// Insert the curated entities, leaving existing rows in place.
///
/// A row whose stored category differs from the registry is corrected. Rows
/// are never deleted. Returns the number of newly inserted entities.
/// All statements run inside a single transaction.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_entities(pool: &PgPool, entities: &[TrackedEntity]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0usize;

    for entity in entities {
        // xmax = 0 distinguishes a fresh insert from the conflict-update path.
        let was_inserted: bool = sqlx::query_scalar(
            "INSERT INTO entities (name, category) \
             VALUES ($1, $2) \
             ON CONFLICT (name) DO UPDATE SET category = EXCLUDED.category \
             WHERE entities.category IS DISTINCT FROM EXCLUDED.category \
             RETURNING (xmax = 0)",
        )
        .bind(entity.name)
        .bind(entity.category.as_str())
        .fetch_optional(&mut *tx)
        .await?
        .unwrap_or(false);

        if was_inserted {
            inserted += 1;
        }
    }

    tx.commit().await?;

    tracing::info!(
        inserted,
        total = entities.len(),
        "seed: curated entities in place"
    );
    Ok(inserted)
}

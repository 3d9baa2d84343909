//! Read-only listing commands.

/// Print every tracked entity with its latest daily mean.
///
/// # Errors
///
/// Returns an error if a database query fails.
pub(crate) async fn print_entities(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let entities = vibecheck_db::list_entities(pool).await?;

    if entities.is_empty() {
        println!("no entities found; run `db seed` first");
        return Ok(());
    }

    println!("{:<6}{:<18}{:<8}LATEST", "ID", "NAME", "KIND");
    for entity in &entities {
        let latest = vibecheck_db::latest_daily_sentiment(pool, entity.id)
            .await?
            .and_then(|point| point.sentiment_mean)
            .map_or_else(|| "-".to_string(), |mean| format!("{mean:+.3}"));
        println!(
            "{:<6}{:<18}{:<8}{}",
            entity.id, entity.name, entity.category, latest
        );
    }

    Ok(())
}

/// Print the most recent job executions, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn print_executions(
    pool: &sqlx::PgPool,
    job_name: Option<&str>,
    limit: i64,
) -> anyhow::Result<()> {
    let rows = vibecheck_db::list_job_executions(pool, job_name, limit.clamp(1, 200)).await?;

    if rows.is_empty() {
        println!(
            "no executions recorded{}",
            job_name
                .map(|name| format!(" for job '{name}'"))
                .unwrap_or_default()
        );
        return Ok(());
    }

    println!(
        "{:<14}{:<10}{:<18}{:<10}ERROR",
        "JOB", "STATUS", "STARTED", "SECONDS"
    );
    for row in &rows {
        let started = row.started_at.format("%Y-%m-%d %H:%M").to_string();
        let seconds = row
            .duration_seconds
            .map_or_else(|| "-".to_string(), |s| format!("{s:.2}"));
        println!(
            "{:<14}{:<10}{:<18}{:<10}{}",
            row.job_name,
            row.status,
            started,
            seconds,
            row.error_message.as_deref().unwrap_or("")
        );
    }

    Ok(())
}

//! Usage and feedback log — append-only rows consumed by an external
//! dashboard. The core only writes these values; it never reads them back
//! into the matching flow.

pub mod handlers;

use sqlx::PgPool;
use tracing::warn;

/// Records one completed match round. Fire-and-forget: a failed insert is
/// logged and never fails the round that produced the results.
pub async fn log_query(pool: &PgPool, user_id: &str, num_results: usize, avg_distance: f64) {
    let result = sqlx::query(
        "INSERT INTO queries (user_id, num_results, avg_distance) VALUES ($1, $2, $3)",
    )
    .bind(user_id)
    .bind(num_results as i32)
    .bind(avg_distance)
    .execute(pool)
    .await;

    if let Err(e) = result {
        warn!("failed to log query event for {user_id}: {e}");
    }
}

/// Records a like/dislike for one returned match.
pub async fn log_feedback(
    pool: &PgPool,
    user_id: &str,
    job_id: &str,
    liked: bool,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO feedback (user_id, job_id, liked) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(job_id)
        .bind(liked)
        .execute(pool)
        .await?;
    Ok(())
}

/// Aggregate counts read by the dashboard collaborator.
#[derive(Debug, serde::Serialize)]
pub struct DashboardSummary {
    pub total_queries: i64,
    pub total_feedback: i64,
    pub likes: i64,
    pub dislikes: i64,
    pub avg_distance: Option<f64>,
}

pub async fn dashboard_summary(pool: &PgPool) -> Result<DashboardSummary, sqlx::Error> {
    let (total_queries, avg_distance): (i64, Option<f64>) =
        sqlx::query_as("SELECT COUNT(*), AVG(avg_distance) FROM queries")
            .fetch_one(pool)
            .await?;

    let (total_feedback, likes): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(COUNT(*) FILTER (WHERE liked), 0) FROM feedback",
    )
    .fetch_one(pool)
    .await?;

    Ok(DashboardSummary {
        total_queries,
        total_feedback,
        likes,
        dislikes: total_feedback - likes,
        avg_distance,
    })
}

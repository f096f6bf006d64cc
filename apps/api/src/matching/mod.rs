// Matching pipeline.
// Embeds a resume once, retrieves the K nearest vacancies within the
// session scope, and generates one rationale per match. The ascending
// distance order coming back from the store is preserved end-to-end.

pub mod handlers;

use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::matching::{MatchResult, MatchSession};
use crate::providers::{Embedder, Reasoner};
use crate::store::VectorStore;

/// Push-style matching progress: `(status message, fraction in [0, 1])`.
pub type MatchProgressFn = dyn Fn(&str, f32) + Send + Sync;

/// Tunables for one match round.
#[derive(Debug, Clone)]
pub struct MatchParams {
    pub top_k: usize,
    pub prompt_template: Option<String>,
}

/// Runs the full matching round for one resume.
///
/// Steps:
/// 1. Embed the resume text (fails fast on empty text).
/// 2. Query the K nearest vacancies, scoped to the session tag when set.
/// 3. Zero results is a valid empty outcome, not an error.
/// 4. Generate one rationale per result in ranked order, reporting
///    progress linearly from 0.6 to 1.0.
pub async fn find_top_matches(
    embedder: &dyn Embedder,
    store: &dyn VectorStore,
    reasoner: &dyn Reasoner,
    session: &MatchSession,
    resume_text: &str,
    params: &MatchParams,
    progress: Option<&MatchProgressFn>,
) -> Result<Vec<MatchResult>, AppError> {
    if resume_text.trim().is_empty() {
        return Err(AppError::Validation("resume text is empty".to_string()));
    }

    report(progress, "Generating resume embedding...", 0.1);
    let resume_embedding = embedder.embed_one(resume_text).await?;

    report(
        progress,
        &format!("Searching for top {} job matches...", params.top_k),
        0.4,
    );
    let nearest = store
        .find_nearest(
            &resume_embedding,
            params.top_k,
            session.session_tag.as_deref(),
        )
        .await?;

    if nearest.is_empty() {
        info!(
            "no vacancies found for user {} (session {:?})",
            session.user_id, session.session_tag
        );
        return Ok(Vec::new());
    }

    report(progress, "Generating match insights...", 0.6);

    let total = nearest.len();
    let mut matches = Vec::with_capacity(total);

    for (idx, vacancy) in nearest.into_iter().enumerate() {
        let fraction = 0.6 + 0.4 * (idx + 1) as f32 / total as f32;
        report(
            progress,
            &format!("Generating insight {}/{}...", idx + 1, total),
            fraction,
        );

        let reasoning = reasoner
            .explain(
                resume_text,
                &vacancy.description,
                params.prompt_template.as_deref(),
            )
            .await?;

        // Store order is already nearest-first; never re-sorted here.
        matches.push(MatchResult {
            job_id: vacancy.job_id,
            description: vacancy.description,
            distance: vacancy.distance,
            reasoning,
        });
    }

    info!(
        "matched {} vacancies for user {}",
        matches.len(),
        session.user_id
    );
    Ok(matches)
}

/// Best-effort purge of one session's vacancies after a successful round.
/// Failure is logged and never invalidates already-returned results.
pub async fn purge_session(store: &dyn VectorStore, session_tag: &str) {
    match store.delete_by_scope(session_tag).await {
        Ok(count) => info!("purged {count} vacancies for session {session_tag}"),
        Err(e) => warn!("session purge failed for {session_tag}: {e}"),
    }
}

fn report(progress: Option<&MatchProgressFn>, message: &str, fraction: f32) {
    if let Some(callback) = progress {
        callback(message, fraction);
    }
}

use serde::{Deserialize, Serialize};

/// A single ranked match. Ephemeral — produced per query, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub job_id: String,
    pub description: String,
    /// Cosine distance in [0, 2]; 0 = identical direction.
    pub distance: f64,
    pub reasoning: String,
}

/// Caller-held state for one matching round.
///
/// Passed explicitly into every pipeline call so there is no hidden
/// session global. `session_tag` scopes vector queries to the vacancies
/// uploaded in this round; `None` queries the whole store.
#[derive(Debug, Clone)]
pub struct MatchSession {
    pub user_id: String,
    pub session_tag: Option<String>,
}

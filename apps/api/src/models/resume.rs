use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One live resume per user. Re-uploading overwrites the previous record;
/// no history is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub user_id: String,
    pub text: String,
    pub embedding: Vec<f32>,
    pub updated_at: DateTime<Utc>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Comment entity - reader feedback awaiting or past moderation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Create a new comment. Comments always start unapproved.
    pub fn new(post_id: Uuid, author_id: Uuid, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            content,
            approved: false,
            created_at: Utc::now(),
        }
    }
}

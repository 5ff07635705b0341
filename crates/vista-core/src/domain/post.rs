use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Publication state of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft = 0,
    Published = 1,
}

impl PostStatus {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Unknown codes are treated as drafts so they never leak into listings.
    pub fn from_i32(code: i32) -> Self {
        match code {
            1 => PostStatus::Published,
            _ => PostStatus::Draft,
        }
    }
}

/// Post entity - represents a blog post or article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub author_id: Uuid,
    pub content: String,
    pub category_id: Option<Uuid>,
    pub status: PostStatus,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new draft post.
    pub fn new(author_id: Uuid, title: String, slug: String, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            slug,
            author_id,
            content,
            category_id: None,
            status: PostStatus::Draft,
            views: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn published(mut self) -> Self {
        self.status = PostStatus::Published;
        self
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }
}

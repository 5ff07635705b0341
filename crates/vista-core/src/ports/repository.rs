use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Authored, Category, Comment, Post, User};
use crate::error::RepoError;
use crate::pagination::Page;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their exact username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    /// All categories, ordered by name.
    async fn list(&self) -> Result<Vec<Category>, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    /// A page of published posts, newest first, optionally restricted to a
    /// category. `raw_page` is the unparsed `page` query value.
    async fn published_page(
        &self,
        category_id: Option<Uuid>,
        raw_page: Option<&str>,
        page_size: u64,
    ) -> Result<Page<Authored<Post>>, RepoError>;

    /// Add one to the stored view counter and return the new value.
    async fn increment_views(&self, post_id: Uuid) -> Result<i64, RepoError>;

    async fn is_liked_by(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError>;

    /// Like or unlike. Returns whether the post is liked afterwards.
    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError>;

    async fn like_count(&self, post_id: Uuid) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Approved comments on a post, oldest first.
    async fn approved_for_post(&self, post_id: Uuid) -> Result<Vec<Authored<Comment>>, RepoError>;

    /// A user's own comments on a post that still await moderation.
    async fn pending_for_author(
        &self,
        post_id: Uuid,
        author_id: Uuid,
    ) -> Result<Vec<Authored<Comment>>, RepoError>;

    /// Moderation hook used by the approval tooling.
    async fn set_approved(&self, comment_id: Uuid, approved: bool) -> Result<(), RepoError>;
}

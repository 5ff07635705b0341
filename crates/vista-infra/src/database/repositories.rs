//! SeaORM repository implementations.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use vista_core::domain::{Authored, Category, Comment, Post, PostStatus, User};
use vista_core::error::RepoError;
use vista_core::pagination::{Page, resolve_page_number};
use vista_core::ports::{CategoryRepository, CommentRepository, PostRepository, UserRepository};

use super::base::{SeaOrmRepository, query_error, write_error};
use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_like::{self, Entity as PostLikeEntity};
use super::entity::user::{self, Entity as UserEntity};

pub type SeaOrmUserRepository = SeaOrmRepository<UserEntity>;
pub type SeaOrmCategoryRepository = SeaOrmRepository<CategoryEntity>;
pub type SeaOrmPostRepository = SeaOrmRepository<PostEntity>;
pub type SeaOrmCommentRepository = SeaOrmRepository<CommentEntity>;

/// Pair rows with their author. Rows whose author vanished mid-query are
/// dropped rather than rendered anonymously.
fn with_authors<M, T>(rows: Vec<(M, Option<user::Model>)>) -> Vec<Authored<T>>
where
    T: From<M>,
{
    rows.into_iter()
        .filter_map(|(model, author)| author.map(|a| Authored::new(model.into(), a.summary())))
        .collect()
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CategoryRepository for SeaOrmCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let result = CategoryEntity::find()
            .order_by_asc(category::Column::Name)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl PostRepository for SeaOrmPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }

    async fn published_page(
        &self,
        category_id: Option<Uuid>,
        raw_page: Option<&str>,
        page_size: u64,
    ) -> Result<Page<Authored<Post>>, RepoError> {
        let mut query = PostEntity::find()
            .filter(post::Column::Status.eq(PostStatus::Published.as_i32()))
            .order_by_desc(post::Column::CreatedAt)
            // Equal timestamps must not shift posts between pages.
            .order_by_desc(post::Column::Id);

        if let Some(category_id) = category_id {
            query = query.filter(post::Column::CategoryId.eq(category_id));
        }

        let paginator = query
            .find_also_related(UserEntity)
            .paginate(&self.db, page_size);

        let totals = paginator
            .num_items_and_pages()
            .await
            .map_err(query_error)?;
        let number = resolve_page_number(raw_page, totals.number_of_pages);

        let rows = paginator
            .fetch_page(number - 1)
            .await
            .map_err(query_error)?;

        Ok(Page::new(
            with_authors(rows),
            number,
            totals.number_of_items,
            page_size,
        ))
    }

    async fn increment_views(&self, post_id: Uuid) -> Result<i64, RepoError> {
        // Single statement so concurrent visits are never lost.
        let result = PostEntity::update_many()
            .col_expr(post::Column::Views, Expr::col(post::Column::Views).add(1))
            .filter(post::Column::Id.eq(post_id))
            .exec(&self.db)
            .await
            .map_err(query_error)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        let views: Option<i64> = PostEntity::find_by_id(post_id)
            .select_only()
            .column(post::Column::Views)
            .into_tuple()
            .one(&self.db)
            .await
            .map_err(query_error)?;

        views.ok_or(RepoError::NotFound)
    }

    async fn is_liked_by(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        let like = PostLikeEntity::find_by_id((post_id, user_id))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(like.is_some())
    }

    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        if self.is_liked_by(post_id, user_id).await? {
            PostLikeEntity::delete_by_id((post_id, user_id))
                .exec(&self.db)
                .await
                .map_err(query_error)?;
            return Ok(false);
        }

        let like = post_like::ActiveModel {
            post_id: Set(post_id),
            user_id: Set(user_id),
            created_at: Set(Utc::now().into()),
        };
        PostLikeEntity::insert(like)
            .exec_without_returning(&self.db)
            .await
            .map_err(write_error)?;

        Ok(true)
    }

    async fn like_count(&self, post_id: Uuid) -> Result<u64, RepoError> {
        PostLikeEntity::find()
            .filter(post_like::Column::PostId.eq(post_id))
            .count(&self.db)
            .await
            .map_err(query_error)
    }
}

#[async_trait]
impl CommentRepository for SeaOrmCommentRepository {
    async fn approved_for_post(&self, post_id: Uuid) -> Result<Vec<Authored<Comment>>, RepoError> {
        let rows = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .filter(comment::Column::Approved.eq(true))
            .order_by_asc(comment::Column::CreatedAt)
            .find_also_related(UserEntity)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(with_authors(rows))
    }

    async fn pending_for_author(
        &self,
        post_id: Uuid,
        author_id: Uuid,
    ) -> Result<Vec<Authored<Comment>>, RepoError> {
        let rows = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .filter(comment::Column::AuthorId.eq(author_id))
            .filter(comment::Column::Approved.eq(false))
            .order_by_asc(comment::Column::CreatedAt)
            .find_also_related(UserEntity)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(with_authors(rows))
    }

    async fn set_approved(&self, comment_id: Uuid, approved: bool) -> Result<(), RepoError> {
        let result = CommentEntity::update_many()
            .col_expr(comment::Column::Approved, Expr::value(approved))
            .filter(comment::Column::Id.eq(comment_id))
            .exec(&self.db)
            .await
            .map_err(query_error)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        tracing::info!(%comment_id, approved, "Comment moderation state changed");
        Ok(())
    }
}

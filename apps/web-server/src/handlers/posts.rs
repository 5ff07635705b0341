//! Listing and post detail handlers.

use actix_web::{HttpResponse, web};
use serde::Serialize;
use tera::Context;
use uuid::Uuid;

use vista_core::POSTS_PER_PAGE;
use vista_core::domain::{Authored, Comment, Post, Viewer};
use vista_core::forms::CommentForm;
use vista_core::policy;
use vista_shared::dto::{CommentSubmission, ListingQuery};

use super::post_path;
use crate::middleware::context::RequestContext;
use crate::middleware::error::{AppError, AppResult};
use crate::render::render_page;
use crate::state::AppState;

/// An approved comment as listed under a post.
///
/// `is_owner` is computed per comment by comparing its author's username
/// with the viewer's, ignoring case. Anonymous viewers own nothing.
#[derive(Debug, Serialize)]
struct ListedComment {
    mycomment: Authored<Comment>,
    is_owner: bool,
}

/// GET /
pub async fn home(
    state: web::Data<AppState>,
    query: web::Query<ListingQuery>,
    ctx: RequestContext,
) -> AppResult<HttpResponse> {
    listing(&state, None, query.into_inner(), ctx).await
}

/// GET /category/{category_slug}
pub async fn category(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ListingQuery>,
    ctx: RequestContext,
) -> AppResult<HttpResponse> {
    listing(&state, Some(path.as_str()), query.into_inner(), ctx).await
}

async fn listing(
    state: &AppState,
    category_slug: Option<&str>,
    query: ListingQuery,
    mut ctx: RequestContext,
) -> AppResult<HttpResponse> {
    let categories = state.categories.list().await?;

    let category = match category_slug {
        Some(slug) => Some(
            state
                .categories
                .find_by_slug(slug)
                .await?
                .ok_or_else(|| AppError::not_found("category"))?,
        ),
        None => None,
    };

    let page_obj = state
        .posts
        .published_page(
            category.as_ref().map(|c| c.id),
            query.page.as_deref(),
            POSTS_PER_PAGE,
        )
        .await?;

    let mut context = Context::new();
    context.insert("category", &category);
    context.insert("categories", &categories);
    context.insert("page_obj", &page_obj);

    render_page(state, "index.html", context, &mut ctx)
}

/// GET /post/{slug}
pub async fn post_detail(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    mut ctx: RequestContext,
) -> AppResult<HttpResponse> {
    let mut post = find_post(&state, &slug).await?;
    post.views = state.posts.increment_views(post.id).await?;

    let awaiting_comments = match ctx.viewer.id() {
        Some(user_id) => state.comments.pending_for_author(post.id, user_id).await?,
        None => Vec::new(),
    };

    let mut context = detail_context(&state, &post, &ctx.viewer, CommentForm::blank()).await?;
    context.insert("awaiting_comments", &awaiting_comments);

    render_page(&state, "post_detail.html", context, &mut ctx)
}

/// POST /post/{slug}
///
/// The first marker present in the body selects the action: `edit_comment`,
/// then `delete_comment`, otherwise a new comment.
pub async fn post_detail_submit(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    mut ctx: RequestContext,
    body: web::Form<CommentSubmission>,
) -> AppResult<HttpResponse> {
    let post = find_post(&state, &slug).await?;
    let submission = body.into_inner();

    let comment_form = if submission.edit_comment.is_some() {
        let mut comment = find_comment(&state, submission.comment_id.as_deref()).await?;
        let mut form = CommentForm::bound(submission.content);

        match form.clean() {
            Some(content) => {
                comment.content = content;
                let comment = state.comments.update(comment).await?;
                tracing::info!(comment_id = %comment.id, slug = %post.slug, "Comment updated");
                ctx.messages.success("Comment updated successfully.");
            }
            None => ctx.messages.error("Error updating comment."),
        }
        form
    } else if submission.delete_comment.is_some() {
        let comment = find_comment(&state, submission.comment_id.as_deref()).await?;
        state.comments.delete(comment.id).await?;
        tracing::info!(comment_id = %comment.id, slug = %post.slug, "Comment deleted");
        ctx.messages.success("Comment deleted successfully.");
        CommentForm::blank()
    } else {
        let detail = post_path(&post.slug);
        let author_id = ctx.require_login(&detail)?.id;
        let mut form = CommentForm::bound(submission.content);

        if let Some(content) = form.clean() {
            let comment = state
                .comments
                .insert(Comment::new(post.id, author_id, content))
                .await?;
            tracing::info!(
                comment_id = %comment.id,
                user_id = %author_id,
                slug = %post.slug,
                "Comment submitted for approval"
            );
            ctx.messages
                .success("Your comment has been submitted for approval.");
            return Ok(ctx.messages.redirect(&detail));
        }
        form
    };

    let context = detail_context(&state, &post, &ctx.viewer, comment_form).await?;
    render_page(&state, "post_detail.html", context, &mut ctx)
}

async fn find_post(state: &AppState, slug: &str) -> AppResult<Post> {
    state
        .posts
        .find_by_slug(slug)
        .await?
        .ok_or_else(|| AppError::not_found("post"))
}

async fn find_comment(state: &AppState, raw_id: Option<&str>) -> AppResult<Comment> {
    let id = raw_id
        .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
        .ok_or_else(|| AppError::not_found("comment"))?;

    state
        .comments
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("comment"))
}

/// Context shared by both paths of the detail page.
async fn detail_context(
    state: &AppState,
    post: &Post,
    viewer: &Viewer,
    comment_form: CommentForm,
) -> AppResult<Context> {
    let author = state
        .users
        .find_by_id(post.author_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("post {} has no author", post.id)))?;

    let category = match post.category_id {
        Some(id) => state.categories.find_by_id(id).await?,
        None => None,
    };

    let comments: Vec<ListedComment> = state
        .comments
        .approved_for_post(post.id)
        .await?
        .into_iter()
        .map(|mycomment| ListedComment {
            is_owner: policy::is_listed_owner(viewer, &mycomment.author),
            mycomment,
        })
        .collect();

    let liked = match viewer.id() {
        Some(user_id) => state.posts.is_liked_by(post.id, user_id).await?,
        None => false,
    };
    let like_count = state.posts.like_count(post.id).await?;

    let mut context = Context::new();
    context.insert("post", post);
    context.insert("author", &author.summary());
    context.insert("category", &category);
    context.insert("comments", &comments);
    context.insert("comment_form", &comment_form);
    context.insert("liked", &liked);
    context.insert("like_count", &like_count);
    context.insert("is_post_user", &(viewer.id() == Some(post.author_id)));
    Ok(context)
}

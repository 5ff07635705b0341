//! Standalone edit and delete pages for a user's own comments.

use actix_web::{HttpResponse, web};
use tera::Context;
use uuid::Uuid;

use vista_core::domain::{Comment, Post, Viewer};
use vista_core::forms::CommentForm;
use vista_core::policy::{self, Access};
use vista_shared::dto::CommentContent;

use super::post_path;
use crate::middleware::context::RequestContext;
use crate::middleware::error::{AppError, AppResult};
use crate::render::render_page;
use crate::state::AppState;

/// Load a comment the viewer may change, with its post.
///
/// Comments belonging to someone else are reported as missing.
async fn owned_comment(state: &AppState, raw_id: &str, viewer: &Viewer) -> AppResult<(Comment, Post)> {
    let id = Uuid::parse_str(raw_id).map_err(|_| AppError::not_found("comment"))?;
    let comment = state
        .comments
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("comment"))?;

    if let Access::Forbidden = policy::comment_access(viewer, &comment) {
        tracing::warn!(comment_id = %comment.id, user_id = ?viewer.id(), "Comment access refused");
        return Err(AppError::not_found("comment"));
    }

    let post = state
        .posts
        .find_by_id(comment.post_id)
        .await?
        .ok_or_else(|| AppError::not_found("post"))?;

    Ok((comment, post))
}

fn edit_context(form: &CommentForm, post: &Post, comment: &Comment) -> Context {
    let mut context = Context::new();
    context.insert("comment_form", form);
    context.insert("post", post);
    context.insert("comment", comment);
    context
}

/// GET /edit-comment/{id}
pub async fn edit_comment(
    state: web::Data<AppState>,
    id: web::Path<String>,
    mut ctx: RequestContext,
) -> AppResult<HttpResponse> {
    let (comment, post) = owned_comment(&state, &id, &ctx.viewer).await?;
    let context = edit_context(&CommentForm::for_comment(&comment), &post, &comment);

    render_page(&state, "edit_comment.html", context, &mut ctx)
}

/// POST /edit-comment/{id}
pub async fn edit_comment_submit(
    state: web::Data<AppState>,
    id: web::Path<String>,
    mut ctx: RequestContext,
    body: web::Form<CommentContent>,
) -> AppResult<HttpResponse> {
    let (mut comment, post) = owned_comment(&state, &id, &ctx.viewer).await?;
    let mut form = CommentForm::bound(body.into_inner().content);

    let Some(content) = form.clean() else {
        let context = edit_context(&form, &post, &comment);
        return render_page(&state, "edit_comment.html", context, &mut ctx);
    };

    comment.content = content;
    let comment = state.comments.update(comment).await?;
    tracing::info!(comment_id = %comment.id, slug = %post.slug, "Comment edited by author");

    ctx.messages.success("Your comment has been updated.");
    Ok(ctx.messages.redirect(&post_path(&post.slug)))
}

/// GET /delete-comment/{id}
pub async fn delete_comment(
    state: web::Data<AppState>,
    id: web::Path<String>,
    mut ctx: RequestContext,
) -> AppResult<HttpResponse> {
    let (comment, post) = owned_comment(&state, &id, &ctx.viewer).await?;

    let mut context = Context::new();
    context.insert("comment", &comment);
    context.insert("post", &post);

    render_page(&state, "delete_comment.html", context, &mut ctx)
}

/// POST /delete-comment/{id}
pub async fn delete_comment_submit(
    state: web::Data<AppState>,
    id: web::Path<String>,
    mut ctx: RequestContext,
) -> AppResult<HttpResponse> {
    let (comment, post) = owned_comment(&state, &id, &ctx.viewer).await?;

    state.comments.delete(comment.id).await?;
    tracing::info!(comment_id = %comment.id, slug = %post.slug, "Comment deleted by author");

    ctx.messages.success("Your comment has been deleted.");
    Ok(ctx.messages.redirect(&post_path(&post.slug)))
}

use actix_web::{HttpResponse, web};

use super::post_path;
use crate::middleware::context::RequestContext;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /like/{slug}
pub async fn toggle_like(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    ctx: RequestContext,
) -> AppResult<HttpResponse> {
    let detail = post_path(&slug);
    let user_id = ctx.require_login(&detail)?.id;

    let post = state
        .posts
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::not_found("post"))?;

    let liked = state.posts.toggle_like(post.id, user_id).await?;
    tracing::debug!(slug = %post.slug, user_id = %user_id, liked, "Like toggled");

    Ok(ctx.messages.redirect(&detail))
}

//! HTTP handlers and route configuration.

mod accounts;
mod comments;
mod likes;
mod posts;

use actix_web::{HttpResponse, web};

use crate::middleware::error::{AppError, AppResult};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(posts::home))
        .route(
            "/category/{category_slug}",
            web::get().to(posts::category),
        )
        .service(
            web::resource("/post/{slug}")
                .route(web::get().to(posts::post_detail))
                .route(web::post().to(posts::post_detail_submit)),
        )
        .route("/like/{slug}", web::post().to(likes::toggle_like))
        .service(
            web::resource("/edit-comment/{id}")
                .route(web::get().to(comments::edit_comment))
                .route(web::post().to(comments::edit_comment_submit)),
        )
        .service(
            web::resource("/delete-comment/{id}")
                .route(web::get().to(comments::delete_comment))
                .route(web::post().to(comments::delete_comment_submit)),
        )
        .service(
            web::scope("/accounts")
                .service(
                    web::resource("/login")
                        .route(web::get().to(accounts::login_form))
                        .route(web::post().to(accounts::login)),
                )
                .service(
                    web::resource("/signup")
                        .route(web::get().to(accounts::signup_form))
                        .route(web::post().to(accounts::signup)),
                )
                .route("/logout", web::post().to(accounts::logout)),
        )
        .default_service(web::to(not_found));
}

async fn not_found() -> AppResult<HttpResponse> {
    Err(AppError::NotFound(
        "The requested page does not exist.".to_string(),
    ))
}

/// Path of a post's detail page.
pub(crate) fn post_path(slug: &str) -> String {
    format!("/post/{slug}")
}

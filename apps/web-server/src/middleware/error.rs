//! Error handling middleware - HTML error pages and login redirects.

use actix_web::http::header::{self, ContentType};
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::fmt;
use vista_core::error::RepoError;
use vista_core::ports::AuthError;
use vista_shared::ErrorPage;

use crate::render::RenderError;

/// Characters left as-is in the login page's `next` parameter.
const NEXT_PARAM: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Application-level error type rendered as an HTML page.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    /// The view needs a signed-in user; `next` is where to return afterwards.
    LoginRequired { next: String },
    Internal(String),
    Template(RenderError),
}

impl AppError {
    pub fn not_found(what: impl fmt::Display) -> Self {
        AppError::NotFound(format!("No {what} matches the given query."))
    }

    /// Location of the login page for this error's `next` target.
    fn login_location(next: &str) -> String {
        format!(
            "/accounts/login?next={}",
            utf8_percent_encode(next, NEXT_PARAM)
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::LoginRequired { next } => write!(f, "Login required for {}", next),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::Template(err) => write!(f, "Template error: {}", err),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::LoginRequired { .. } => StatusCode::SEE_OTHER,
            AppError::Internal(_) | AppError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let page = match self {
            AppError::LoginRequired { next } => {
                return HttpResponse::SeeOther()
                    .insert_header((header::LOCATION, Self::login_location(next)))
                    .finish();
            }
            AppError::NotFound(detail) => ErrorPage::not_found(detail),
            AppError::BadRequest(detail) => ErrorPage::bad_request(detail),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorPage::internal_error()
            }
            AppError::Template(err) => {
                tracing::error!(template = %err.name, "Template error: {}", err.message);
                ErrorPage::internal_error()
            }
        };

        HttpResponse::build(self.status_code())
            .content_type(ContentType::html())
            .body(page.to_html())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::BadRequest(msg),
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        AppError::Template(err)
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_redirect_encodes_next() {
        let err = AppError::LoginRequired {
            next: "/post/a b?x=1".to_string(),
        };
        let response = err.error_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/accounts/login?next=/post/a%20b%3Fx%3D1"
        );
    }

    #[test]
    fn test_login_redirect_encodes_non_ascii_next() {
        let err = AppError::LoginRequired {
            next: "/category/café#top".to_string(),
        };
        let response = err.error_response();

        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/accounts/login?next=/category/caf%C3%A9%23top"
        );
    }

    #[test]
    fn test_constraint_violation_is_bad_request() {
        let err: AppError = RepoError::Constraint("UNIQUE constraint failed".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_is_html() {
        let response = AppError::not_found("post").error_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html; charset=utf-8"
        );
    }

    #[test]
    fn test_repo_errors_hide_details() {
        let err: AppError = RepoError::Query("syntax error near users".into()).into();
        assert!(matches!(err, AppError::Internal(ref m) if m == "Database error"));
    }
}

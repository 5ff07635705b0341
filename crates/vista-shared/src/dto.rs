//! Data Transfer Objects - urlencoded form bodies and query strings.

use serde::{Deserialize, Serialize};

/// Body posted to a post's detail page.
///
/// `edit_comment` and `delete_comment` are presence markers: any value,
/// including an empty one, selects that branch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentSubmission {
    pub edit_comment: Option<String>,
    pub delete_comment: Option<String>,
    pub comment_id: Option<String>,
    pub content: String,
}

/// Body of the standalone edit-comment form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentContent {
    pub content: String,
}

/// Query string of the listing pages. The page is kept raw so that invalid
/// values can be resolved rather than rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingQuery {
    pub page: Option<String>,
}

/// Request to login.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub next: Option<String>,
}

/// Request to register a new user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// `?next=` query used by the login page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NextQuery {
    pub next: Option<String>,
}

impl NextQuery {
    /// The redirect target, if it is a local absolute path.
    pub fn safe_target(next: Option<&str>) -> &str {
        match next {
            Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => path,
            _ => "/",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_target_accepts_local_paths() {
        assert_eq!(NextQuery::safe_target(Some("/post/test-title")), "/post/test-title");
    }

    #[test]
    fn test_safe_target_rejects_offsite_redirects() {
        assert_eq!(NextQuery::safe_target(None), "/");
        assert_eq!(NextQuery::safe_target(Some("https://evil.example")), "/");
        assert_eq!(NextQuery::safe_target(Some("//evil.example")), "/");
        assert_eq!(NextQuery::safe_target(Some("/\\evil.example")), "/");
    }
}

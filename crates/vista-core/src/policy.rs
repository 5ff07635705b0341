//! Authorization rules, kept apart from data retrieval so callers can tell
//! a missing record from a refused one.

use crate::domain::{Comment, UserSummary, Viewer};

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    Forbidden,
}

/// Only a comment's author may edit or delete it.
pub fn comment_access(viewer: &Viewer, comment: &Comment) -> Access {
    match viewer.id() {
        Some(id) if id == comment.author_id => Access::Granted,
        _ => Access::Forbidden,
    }
}

/// Whether a listed comment is shown as belonging to the viewer.
///
/// Compares usernames case-insensitively, so distinct accounts whose names
/// differ only in case are flagged as owners of each other's comments.
pub fn is_listed_owner(viewer: &Viewer, author: &UserSummary) -> bool {
    author.username.to_lowercase() == viewer.username().to_lowercase()
}

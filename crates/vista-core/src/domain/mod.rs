//! Domain entities - the core business objects.

mod category;
mod comment;
mod post;
mod user;
mod viewer;

pub use category::Category;
pub use comment::Comment;
pub use post::{Post, PostStatus};
pub use user::{User, UserSummary};
pub use viewer::{UserIdentity, Viewer};

use serde::Serialize;

/// An entity paired with the public profile of its author.
#[derive(Debug, Clone, Serialize)]
pub struct Authored<T> {
    #[serde(flatten)]
    pub item: T,
    pub author: UserSummary,
}

impl<T> Authored<T> {
    pub fn new(item: T, author: UserSummary) -> Self {
        Self { item, author }
    }
}

//! Database connection management and repositories.

mod base;
mod connections;
pub mod entity;
pub mod repositories;

pub use base::SeaOrmRepository;
pub use connections::{DatabaseConfig, connect};
pub use repositories::{
    SeaOrmCategoryRepository, SeaOrmCommentRepository, SeaOrmPostRepository,
    SeaOrmUserRepository,
};

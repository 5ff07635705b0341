//! Application state - shared across all handlers.

use std::sync::Arc;

use sea_orm::DbConn;
use vista_core::ports::{
    CategoryRepository, CommentRepository, PasswordService, PostRepository, TokenService,
    UserRepository,
};
use vista_infra::database::{
    SeaOrmCategoryRepository, SeaOrmCommentRepository, SeaOrmPostRepository,
    SeaOrmUserRepository,
};
use vista_infra::migration::MigratorTrait;
use vista_infra::{Argon2PasswordService, JwtTokenService, Migrator};

use crate::config::AppConfig;
use crate::render::{TemplateEngine, TeraTemplates};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub templates: Arc<dyn TemplateEngine>,
}

impl AppState {
    /// Wire the SeaORM repositories over an open connection.
    pub fn new(
        db: DbConn,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
        templates: Arc<dyn TemplateEngine>,
    ) -> Self {
        Self {
            users: Arc::new(SeaOrmUserRepository::new(db.clone())),
            categories: Arc::new(SeaOrmCategoryRepository::new(db.clone())),
            posts: Arc::new(SeaOrmPostRepository::new(db.clone())),
            comments: Arc::new(SeaOrmCommentRepository::new(db)),
            tokens,
            passwords,
            templates,
        }
    }

    /// Build the application state from configuration.
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let db = vista_infra::connect(&config.database).await?;

        if config.run_migrations {
            Migrator::up(&db, None).await?;
            tracing::info!("Database migrations applied");
        }

        let templates = TeraTemplates::load(&config.template_dir)?;

        tracing::info!("Application state initialized");

        Ok(Self::new(
            db,
            Arc::new(JwtTokenService::new(config.jwt.clone())),
            Arc::new(Argon2PasswordService::default()),
            Arc::new(templates),
        ))
    }
}

//! # Vista Infrastructure
//!
//! Concrete implementations of the ports defined in `vista-core`:
//! SeaORM repositories and migrations, JWT session tokens and Argon2
//! password hashing.

pub mod auth;
pub mod database;
pub mod migration;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use database::{DatabaseConfig, connect};
pub use migration::Migrator;

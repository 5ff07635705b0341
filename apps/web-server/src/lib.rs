//! # VoyageVista web server
//!
//! Server-rendered travel blog: category listings, post pages with
//! moderated comments and likes, and user accounts.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod render;
pub mod state;
pub mod telemetry;

pub use handlers::configure_routes;
pub use state::AppState;

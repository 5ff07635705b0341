//! # Vista Core
//!
//! The domain layer of VoyageVista.
//! This crate contains the blog's entities, form validation, pagination and
//! authorization rules with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod policy;
pub mod ports;

pub use error::RepoError;

/// Number of published posts shown per listing page.
pub const POSTS_PER_PAGE: u64 = 4;

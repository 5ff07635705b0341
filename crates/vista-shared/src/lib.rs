//! # Vista Shared
//!
//! Request payloads and presentation types shared by the web server and its
//! tests.

pub mod dto;
pub mod flash;
pub mod response;

pub use flash::{FlashLevel, FlashMessage};
pub use response::ErrorPage;

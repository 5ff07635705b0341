//! One-shot notices shown to the user on the next rendered page.

use serde::{Deserialize, Serialize};

/// Verbosity level of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Debug,
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub value: String,
}

impl FlashMessage {
    pub fn new(level: FlashLevel, value: impl Into<String>) -> Self {
        Self {
            level,
            value: value.into(),
        }
    }

    pub fn success(value: impl Into<String>) -> Self {
        Self::new(FlashLevel::Success, value)
    }

    pub fn error(value: impl Into<String>) -> Self {
        Self::new(FlashLevel::Error, value)
    }
}

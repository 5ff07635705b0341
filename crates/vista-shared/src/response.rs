//! Error pages rendered for failed requests.

use html_escape::encode_safe;
use serde::{Deserialize, Serialize};

/// An HTML problem page.
///
/// Rendered without the template engine so it is available even when the
/// templates themselves are the failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPage {
    /// The HTTP status code.
    pub status: u16,

    /// A short, human-readable summary of the problem.
    pub title: String,

    /// A human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorPage {
    pub fn new(status: u16, title: impl Into<String>) -> Self {
        Self {
            status,
            title: title.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    // Common error constructors
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(400, "Bad Request").with_detail(detail)
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(404, "Not Found").with_detail(detail)
    }

    pub fn internal_error() -> Self {
        Self::new(500, "Server Error")
    }

    pub fn to_html(&self) -> String {
        let detail = self
            .detail
            .as_deref()
            .map(|d| format!("<p>{}</p>", encode_safe(d)))
            .unwrap_or_default();

        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"utf-8\" />\n  <title>{status} {title} | VoyageVista</title>\n</head>\n<body>\n  <h1>{status} {title}</h1>\n  {detail}\n  <p><a href=\"/\">Back to VoyageVista</a></p>\n</body>\n</html>\n",
            status = self.status,
            title = encode_safe(&self.title),
        )
    }
}

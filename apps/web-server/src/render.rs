//! Server-side template rendering.

use actix_web::HttpResponse;
use actix_web::http::header::ContentType;
use tera::{Context, Tera};

use crate::middleware::context::{FLASH_COOKIE, RequestContext, removal_cookie};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// Template collaborator: turns a named template and a context into HTML.
pub trait TemplateEngine: Send + Sync {
    fn render(&self, name: &str, context: &Context) -> Result<String, RenderError>;
}

#[derive(Debug, thiserror::Error)]
#[error("failed to render template `{name}`: {message}")]
pub struct RenderError {
    pub name: String,
    pub message: String,
}

impl RenderError {
    pub fn new(name: impl Into<String>, err: &tera::Error) -> Self {
        // Tera nests the useful part of the message in the source chain.
        let mut message = err.to_string();
        let mut source = std::error::Error::source(err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }

        Self {
            name: name.into(),
            message,
        }
    }
}

/// Tera-backed template engine.
pub struct TeraTemplates {
    tera: Tera,
}

impl TeraTemplates {
    /// Load every `*.html` template under `dir`.
    pub fn load(dir: &str) -> Result<Self, tera::Error> {
        let tera = Tera::new(&format!("{}/**/*.html", dir.trim_end_matches('/')))?;
        tracing::info!(
            templates = tera.get_template_names().count(),
            dir,
            "Templates loaded"
        );
        Ok(Self { tera })
    }
}

impl TemplateEngine for TeraTemplates {
    fn render(&self, name: &str, context: &Context) -> Result<String, RenderError> {
        self.tera
            .render(name, context)
            .map_err(|e| RenderError::new(name, &e))
    }
}

/// Render `name` as a full page for the current request.
///
/// Adds the request-wide keys `messages` and `viewer` to the context and
/// consumes any incoming flash cookie.
pub fn render_page(
    state: &AppState,
    name: &str,
    mut context: Context,
    ctx: &mut RequestContext,
) -> AppResult<HttpResponse> {
    let clear_flash = ctx.messages.has_incoming();
    context.insert("messages", &ctx.messages.drain());
    context.insert("viewer", &ctx.viewer);

    let body = state.templates.render(name, &context)?;

    let mut builder = HttpResponse::Ok();
    builder.content_type(ContentType::html());
    if clear_flash {
        builder.cookie(removal_cookie(FLASH_COOKIE));
    }

    Ok(builder.body(body))
}

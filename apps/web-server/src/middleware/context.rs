//! Per-request context: who is asking, and which flash messages they carry.

use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, HttpResponse, HttpResponseBuilder, dev::Payload, web};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use std::convert::Infallible;
use std::future::{Ready, ready};

use vista_core::domain::{UserIdentity, Viewer};
use vista_core::ports::TokenService;
use vista_shared::FlashMessage;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Cookie holding the session token.
pub const SESSION_COOKIE: &str = "vista_session";

/// Cookie carrying flash messages across a redirect.
pub const FLASH_COOKIE: &str = "vista_flash";

/// Extractor resolving the viewer and the incoming flash messages.
///
/// A missing, invalid or expired session resolves to an anonymous viewer
/// rather than failing the request.
#[derive(Debug, Default)]
pub struct RequestContext {
    pub viewer: Viewer,
    pub messages: Messages,
}

impl RequestContext {
    /// The signed-in user, or a login redirect returning to `next`.
    pub fn require_login(&self, next: &str) -> AppResult<&UserIdentity> {
        self.viewer.identity().ok_or_else(|| AppError::LoginRequired {
            next: next.to_string(),
        })
    }
}

impl FromRequest for RequestContext {
    type Error = Infallible;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let viewer = match req.app_data::<web::Data<AppState>>() {
            Some(state) => resolve_viewer(req, state.tokens.as_ref()),
            None => {
                tracing::warn!("AppState not configured; treating request as anonymous");
                Viewer::Anonymous
            }
        };

        let flash = req.cookie(FLASH_COOKIE);
        let messages = Messages::from_cookie(flash.as_ref().map(Cookie::value));

        ready(Ok(Self { viewer, messages }))
    }
}

fn resolve_viewer(req: &HttpRequest, tokens: &dyn TokenService) -> Viewer {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string);

    let Some(token) = bearer.or_else(|| req.cookie(SESSION_COOKIE).map(|c| c.value().to_string()))
    else {
        return Viewer::Anonymous;
    };

    match tokens.validate_token(&token) {
        Ok(claims) => claims.into(),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring invalid session token");
            Viewer::Anonymous
        }
    }
}

/// Flash messages for the current request.
#[derive(Debug, Default)]
pub struct Messages {
    incoming: Vec<FlashMessage>,
    pending: Vec<FlashMessage>,
    had_cookie: bool,
}

impl Messages {
    /// Messages carried in by a flash cookie value.
    ///
    /// An unreadable cookie yields no messages but is still cleared on the
    /// next response.
    pub fn from_cookie(value: Option<&str>) -> Self {
        match value {
            Some(value) => Self {
                incoming: decode_flash(value),
                pending: Vec::new(),
                had_cookie: true,
            },
            None => Self::default(),
        }
    }

    pub fn push(&mut self, message: FlashMessage) {
        self.pending.push(message);
    }

    pub fn success(&mut self, value: impl Into<String>) {
        self.push(FlashMessage::success(value));
    }

    pub fn error(&mut self, value: impl Into<String>) {
        self.push(FlashMessage::error(value));
    }

    /// Whether the request arrived with a flash cookie that must be cleared.
    pub fn has_incoming(&self) -> bool {
        self.had_cookie
    }

    /// Take every message for display, incoming first.
    pub fn drain(&mut self) -> Vec<FlashMessage> {
        let mut all = std::mem::take(&mut self.incoming);
        all.append(&mut self.pending);
        all
    }

    /// A 303 redirect that carries undisplayed messages to the next page.
    pub fn redirect_builder(mut self, location: &str) -> HttpResponseBuilder {
        let clear = self.has_incoming();
        let carried = self.drain();

        let mut builder = HttpResponse::SeeOther();
        builder.insert_header((header::LOCATION, location.to_string()));
        if !carried.is_empty() {
            builder.cookie(flash_cookie(&carried));
        } else if clear {
            builder.cookie(removal_cookie(FLASH_COOKIE));
        }
        builder
    }

    pub fn redirect(self, location: &str) -> HttpResponse {
        self.redirect_builder(location).finish()
    }
}

fn flash_cookie(messages: &[FlashMessage]) -> Cookie<'static> {
    let json = serde_json::to_vec(messages).unwrap_or_default();
    base_cookie(FLASH_COOKIE, URL_SAFE_NO_PAD.encode(json))
}

fn decode_flash(value: &str) -> Vec<FlashMessage> {
    URL_SAFE_NO_PAD
        .decode(value)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

/// Session cookie for a freshly issued token.
pub fn session_cookie(token: String) -> Cookie<'static> {
    base_cookie(SESSION_COOKIE, token)
}

/// A cookie that instructs the browser to forget `name`.
pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = base_cookie(name, String::new());
    cookie.make_removal();
    cookie
}

fn base_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build(name, value)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}

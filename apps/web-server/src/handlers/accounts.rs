//! Sign-up, sign-in and sign-out.

use actix_web::{HttpResponse, web};
use serde::Serialize;
use tera::Context;

use vista_core::domain::User;
use vista_core::error::RepoError;
use vista_core::forms::{FormErrors, SignupForm};
use vista_shared::dto::{LoginRequest, NextQuery, SignupRequest};

use crate::middleware::context::{RequestContext, SESSION_COOKIE, removal_cookie, session_cookie};
use crate::middleware::error::AppResult;
use crate::render::render_page;
use crate::state::AppState;

const INVALID_LOGIN: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";
const DUPLICATE_USERNAME: &str = "A user with that username already exists.";

/// The login form as rendered. The password is never echoed back.
#[derive(Debug, Default, Serialize)]
struct LoginForm {
    username: String,
    next: String,
    errors: FormErrors,
}

fn login_page(
    state: &AppState,
    form: &LoginForm,
    ctx: &mut RequestContext,
) -> AppResult<HttpResponse> {
    let mut context = Context::new();
    context.insert("form", form);
    render_page(state, "login.html", context, ctx)
}

fn signup_page(
    state: &AppState,
    form: &SignupForm,
    ctx: &mut RequestContext,
) -> AppResult<HttpResponse> {
    let mut context = Context::new();
    context.insert("form", form);
    render_page(state, "signup.html", context, ctx)
}

/// Issue a session for `user` and redirect to `location`.
fn sign_in(
    state: &AppState,
    user: &User,
    ctx: RequestContext,
    location: &str,
) -> AppResult<HttpResponse> {
    let token = state.tokens.generate_token(user.id, &user.username)?;
    let mut messages = ctx.messages;
    messages.success(format!("Successfully signed in as {}.", user.username));

    Ok(messages
        .redirect_builder(location)
        .cookie(session_cookie(token))
        .finish())
}

/// GET /accounts/login
pub async fn login_form(
    state: web::Data<AppState>,
    query: web::Query<NextQuery>,
    mut ctx: RequestContext,
) -> AppResult<HttpResponse> {
    let form = LoginForm {
        next: NextQuery::safe_target(query.next.as_deref()).to_string(),
        ..LoginForm::default()
    };
    login_page(&state, &form, &mut ctx)
}

/// POST /accounts/login
pub async fn login(
    state: web::Data<AppState>,
    mut ctx: RequestContext,
    body: web::Form<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let next = NextQuery::safe_target(req.next.as_deref()).to_string();
    let username = req.username.trim();

    let user = match state.users.find_by_username(username).await? {
        Some(user) if state.passwords.verify(&req.password, &user.password_hash)? => user,
        _ => {
            tracing::debug!(username, "Failed sign-in attempt");
            let mut form = LoginForm {
                username: username.to_string(),
                next,
                errors: FormErrors::default(),
            };
            form.errors.add("non_field", INVALID_LOGIN);
            return login_page(&state, &form, &mut ctx);
        }
    };

    tracing::info!(user_id = %user.id, "User signed in");
    sign_in(&state, &user, ctx, &next)
}

/// GET /accounts/signup
pub async fn signup_form(
    state: web::Data<AppState>,
    mut ctx: RequestContext,
) -> AppResult<HttpResponse> {
    signup_page(&state, &SignupForm::default(), &mut ctx)
}

/// POST /accounts/signup
pub async fn signup(
    state: web::Data<AppState>,
    mut ctx: RequestContext,
    body: web::Form<SignupRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let mut form = SignupForm {
        username: req.username,
        email: req.email,
        password: req.password,
        password_confirm: req.password_confirm,
        errors: FormErrors::default(),
    };

    let Some(account) = form.clean() else {
        return signup_page(&state, &form, &mut ctx);
    };

    if state.users.find_by_username(&account.username).await?.is_some() {
        form.errors.add("username", DUPLICATE_USERNAME);
        return signup_page(&state, &form, &mut ctx);
    }

    let password_hash = state.passwords.hash(&account.password)?;
    let user = User::new(account.username, account.email, password_hash);

    let user = match state.users.insert(user).await {
        Ok(user) => user,
        // Lost a race with a concurrent signup for the same name.
        Err(RepoError::Constraint(_)) => {
            form.errors.add("username", DUPLICATE_USERNAME);
            return signup_page(&state, &form, &mut ctx);
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");
    sign_in(&state, &user, ctx, "/")
}

/// POST /accounts/logout
pub async fn logout(ctx: RequestContext) -> HttpResponse {
    if let Some(identity) = ctx.viewer.identity() {
        tracing::info!(user_id = %identity.id, "User signed out");
    }

    let mut messages = ctx.messages;
    messages.success("You have signed out.");
    messages
        .redirect_builder("/")
        .cookie(removal_cookie(SESSION_COOKIE))
        .finish()
}

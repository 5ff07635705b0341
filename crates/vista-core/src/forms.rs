//! Form validation for user submissions.
//!
//! Forms keep the submitted values alongside field-level errors so that an
//! invalid submission can be rendered back to the user unchanged.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::Comment;

/// Longest comment body accepted, in characters.
pub const MAX_COMMENT_LENGTH: usize = 4000;
/// Longest username accepted, in characters.
pub const MAX_USERNAME_LENGTH: usize = 150;
/// Shortest password accepted, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

const REQUIRED: &str = "This field is required.";

/// Field-level validation errors, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<&'static str, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// The comment form: a single free-text `content` field.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommentForm {
    pub content: String,
    pub errors: FormErrors,
}

impl CommentForm {
    /// An unbound form with no data.
    pub fn blank() -> Self {
        Self::default()
    }

    /// A form bound to submitted data, not yet validated.
    pub fn bound(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            errors: FormErrors::default(),
        }
    }

    /// A form pre-filled from an existing comment.
    pub fn for_comment(comment: &Comment) -> Self {
        Self::bound(comment.content.clone())
    }

    /// Validate the bound data, returning the cleaned content when valid.
    ///
    /// Errors are recorded on the form for re-rendering.
    pub fn clean(&mut self) -> Option<String> {
        self.errors.clear();
        let content = self.content.trim();

        if content.is_empty() {
            self.errors.add("content", REQUIRED);
        } else if content.chars().count() > MAX_COMMENT_LENGTH {
            self.errors.add(
                "content",
                format!("Ensure this value has at most {MAX_COMMENT_LENGTH} characters."),
            );
        }

        self.errors.is_empty().then(|| content.to_string())
    }
}

/// Validated signup data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
}

/// The signup form. Passwords are never rendered back.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    #[serde(skip)]
    pub password: String,
    #[serde(skip)]
    pub password_confirm: String,
    pub errors: FormErrors,
}

impl SignupForm {
    pub fn clean(&mut self) -> Option<NewAccount> {
        self.errors.clear();
        let username = self.username.trim();
        let email = self.email.trim();

        if username.is_empty() {
            self.errors.add("username", REQUIRED);
        } else if username.chars().count() > MAX_USERNAME_LENGTH {
            self.errors.add(
                "username",
                format!("Ensure this value has at most {MAX_USERNAME_LENGTH} characters."),
            );
        } else if !username.chars().all(is_username_char) {
            self.errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }

        if !email.is_empty() && !is_plausible_email(email) {
            self.errors.add("email", "Enter a valid email address.");
        }

        if self.password.is_empty() {
            self.errors.add("password", REQUIRED);
        } else if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            self.errors.add(
                "password",
                format!("This password is too short. It must contain at least {MIN_PASSWORD_LENGTH} characters."),
            );
        }

        if self.password != self.password_confirm {
            self.errors
                .add("password_confirm", "The two password fields didn't match.");
        }

        self.errors.is_empty().then(|| NewAccount {
            username: username.to_string(),
            email: (!email.is_empty()).then(|| email.to_string()),
            password: self.password.clone(),
        })
    }
}

fn is_username_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

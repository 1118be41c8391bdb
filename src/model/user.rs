//! User accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

uuid_id!(
    /// Newtype for user IDs.
    UserId
);

/// A registered user.
///
/// Passwords are compared verbatim on login and are never serialized back
/// out of the API.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Option<String>,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub created_at: DateTime<Utc>,
}

/// Registration request.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
}

impl NewUser {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: None,
            password: password.into(),
        }
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

impl User {
    /// Materialize a registration request with a fresh id.
    pub fn from_new(new: NewUser) -> Self {
        Self {
            id: UserId::new(),
            username: new.username,
            email: new.email,
            password: new.password,
            created_at: Utc::now(),
        }
    }

    /// Plaintext equality check against the stored password.
    pub fn password_matches(&self, password: &str) -> bool {
        self.password == password
    }
}

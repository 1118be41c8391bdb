use crate::error::{Error, Result};
use crate::model::{NewUser, User};
use crate::repo::UserRepository;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.repo.find_by_username(username).await
    }

    /// Register a user. Usernames are unique; the repository enforces it on
    /// insert, so concurrent registrations of one name yield one `Conflict`.
    pub async fn create_user(&self, new: NewUser) -> Result<User> {
        let username = new.username.trim();
        if username.is_empty() {
            return Err(Error::Validation("username must not be empty".to_string()));
        }
        if new.password.is_empty() {
            return Err(Error::Validation("password must not be empty".to_string()));
        }
        let new = NewUser {
            username: username.to_string(),
            ..new
        };
        let user = self.repo.insert(User::from_new(new)).await?;
        info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Plaintext password check. Unknown user and wrong password are the
    /// same error.
    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        match self.repo.find_by_username(username).await? {
            Some(user) if user.password_matches(password) => Ok(user),
            _ => Err(Error::Unauthorized),
        }
    }
}

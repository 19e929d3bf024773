use crate::app::ports::AuthUser;
use crate::domain::{CreateUserInput, User};
use crate::error::{ClaError, Result};
use crate::infra::user_repo::UserRepository;
use crate::types::non_blank;
use std::sync::Arc;
use tracing::{debug, info};

pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User> {
        self.users.get_user(user_id).await
    }

    pub async fn get_user_by_lf_username(&self, lf_username: &str) -> Result<User> {
        self.users
            .get_user_by_lf_username(lf_username)
            .await?
            .ok_or_else(|| ClaError::not_found("user", lf_username))
    }

    pub async fn create_user(&self, input: &CreateUserInput) -> Result<User> {
        if non_blank(input.lf_username.as_deref()).is_none()
            && non_blank(input.username.as_deref()).is_none()
        {
            return Err(ClaError::Validation(
                "either lfUsername or username is required".into(),
            ));
        }
        if let Some(lf_username) = non_blank(input.lf_username.as_deref()) {
            if self.users.get_user_by_lf_username(lf_username).await?.is_some() {
                return Err(ClaError::Conflict(format!(
                    "user with lf username {lf_username} already exists"
                )));
            }
        }
        self.users.create_user(input).await
    }

    /// Make sure an authenticated caller has a user record. Returns the
    /// existing or newly created user.
    pub async fn ensure_user(&self, auth: &AuthUser) -> Result<User> {
        if auth.lf_username.trim().is_empty() {
            return Err(ClaError::Validation("authorized user has no lf username".into()));
        }
        if let Some(user) = self.users.get_user_by_lf_username(&auth.lf_username).await? {
            debug!("user {} already exists", auth.lf_username);
            return Ok(user);
        }
        let input = CreateUserInput {
            lf_username: Some(auth.lf_username.clone()),
            lf_email: non_blank(Some(&auth.lf_email)).map(str::to_string),
            username: non_blank(Some(&auth.name)).map(str::to_string),
            emails: non_blank(Some(&auth.lf_email))
                .map(|email| vec![email.to_string()])
                .unwrap_or_default(),
            github_id: None,
            github_username: None,
        };
        let user = self.users.create_user(&input).await?;
        info!("created user {} for {}", user.user_id, auth.lf_username);
        Ok(user)
    }
}

use crate::app::ports::{AuthUser, Authorizer};
use crate::error::{ClaError, Result};
use async_trait::async_trait;
use std::collections::HashMap;

/// Bearer tokens issued ahead of time and listed in the config file
pub struct StaticTokenAuthorizer {
    tokens: HashMap<String, AuthUser>,
}

impl StaticTokenAuthorizer {
    pub fn new(tokens: HashMap<String, AuthUser>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl Authorizer for StaticTokenAuthorizer {
    async fn authorize(&self, token: &str) -> Result<AuthUser> {
        self.tokens
            .get(token.trim())
            .cloned()
            .ok_or_else(|| ClaError::Unauthorized("unknown bearer token".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_known_and_unknown_tokens() {
        let mut tokens = HashMap::new();
        tokens.insert(
            "t0k3n".to_string(),
            AuthUser {
                lf_username: "jdoe".into(),
                lf_email: "jdoe@example.org".into(),
                name: "John Doe".into(),
            },
        );
        let auth = StaticTokenAuthorizer::new(tokens);
        assert_eq!(auth.authorize("t0k3n").await.unwrap().lf_username, "jdoe");
        assert!(matches!(
            auth.authorize("nope").await,
            Err(ClaError::Unauthorized(_))
        ));
    }
}

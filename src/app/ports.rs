use crate::domain::ExternalProject;
use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;

/// Resolves external (Salesforce) project ids to the project's name and parent
#[async_trait]
pub trait ProjectDirectory: Send + Sync {
    async fn get_project(&self, project_sfid: &str) -> Result<ExternalProject>;
}

/// Resolves a bearer token to the identity it was issued for
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(&self, token: &str) -> Result<AuthUser>;
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthUser {
    pub lf_username: String,
    #[serde(default)]
    pub lf_email: String,
    #[serde(default)]
    pub name: String,
}
